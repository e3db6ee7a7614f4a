/*!
 * Event Collection
 * Bounded in-memory history of decision events with verdict counters
 */

use super::sink::DecisionSink;
use super::types::DecisionEvent;
use crate::core::limits::DEFAULT_EVENT_HISTORY;
use crate::core::types::{ContainerId, Hook, Verdict};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters since creation (or the last clear)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventStats {
    pub total: u64,
    pub allowed: u64,
    pub denied: u64,
    /// Denials per hook, indexed like `Hook::ALL`
    pub denied_by_hook: [u64; 4],
}

struct Counters {
    allowed: AtomicU64,
    denied: AtomicU64,
    denied_by_hook: [AtomicU64; 4],
}

impl Counters {
    fn new() -> Self {
        Self {
            allowed: AtomicU64::new(0),
            denied: AtomicU64::new(0),
            denied_by_hook: std::array::from_fn(|_| AtomicU64::new(0)),
        }
    }

    fn reset(&self) {
        self.allowed.store(0, Ordering::Relaxed);
        self.denied.store(0, Ordering::Relaxed);
        for counter in &self.denied_by_hook {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// Event collector
#[derive(Clone)]
pub struct EventCollector {
    history: Arc<RwLock<VecDeque<DecisionEvent>>>,
    counters: Arc<Counters>,
    capacity: usize,
}

impl EventCollector {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_HISTORY)
    }

    /// `capacity` bounds the history; storage grows on demand up to it
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            history: Arc::new(RwLock::new(VecDeque::with_capacity(
                capacity.min(DEFAULT_EVENT_HISTORY),
            ))),
            counters: Arc::new(Counters::new()),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent events, oldest first
    pub fn recent(&self, limit: usize) -> Vec<DecisionEvent> {
        let history = self.history.read();
        let start = history.len().saturating_sub(limit);
        history.iter().skip(start).cloned().collect()
    }

    /// Most recent events for one hook, newest first
    pub fn by_hook(&self, hook: Hook, limit: usize) -> Vec<DecisionEvent> {
        let history = self.history.read();
        history
            .iter()
            .rev()
            .filter(|e| e.hook == hook)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Most recent events for one container, newest first
    pub fn by_container(&self, container_id: ContainerId, limit: usize) -> Vec<DecisionEvent> {
        let history = self.history.read();
        history
            .iter()
            .rev()
            .filter(|e| e.container_id == Some(container_id))
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> EventStats {
        let allowed = self.counters.allowed.load(Ordering::Relaxed);
        let denied = self.counters.denied.load(Ordering::Relaxed);
        EventStats {
            total: allowed + denied,
            allowed,
            denied,
            denied_by_hook: std::array::from_fn(|i| {
                self.counters.denied_by_hook[i].load(Ordering::Relaxed)
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.history.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.read().is_empty()
    }

    /// Drop history and reset counters
    pub fn clear(&self) {
        self.history.write().clear();
        self.counters.reset();
    }
}

impl Default for EventCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionSink for EventCollector {
    fn record(&self, event: &DecisionEvent) {
        match event.verdict {
            Verdict::Allow => {
                self.counters.allowed.fetch_add(1, Ordering::Relaxed);
            }
            Verdict::Deny => {
                self.counters.denied.fetch_add(1, Ordering::Relaxed);
                self.counters.denied_by_hook[event.hook.index()].fetch_add(1, Ordering::Relaxed);
            }
        }

        if self.capacity == 0 {
            return;
        }
        let mut history = self.history.write();
        if history.len() >= self.capacity {
            history.pop_front();
        }
        history.push_back(event.clone());
    }
}
