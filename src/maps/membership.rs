/*!
 * Membership Store
 * Fixed 64-slot table of monitored container ids
 *
 * Slot values are single atomic words with 0 as the empty sentinel, so a
 * reader never observes a torn slot. Writes are serialized by the control
 * plane's writer lock; readers take no locks. The reverse index is an
 * immutable map swapped in whole (RCU) after each write.
 *
 * Two lookup paths give the same answer:
 * - Indexed: O(1) through a reverse index (container id -> slot bitmask)
 * - Scan: the bounded walk over all 64 slots
 */

use crate::core::errors::{StoreError, StoreResult};
use crate::core::limits::{EMPTY_CONTAINER_ID, MAX_CONTAINER_SLOTS};
use crate::core::types::{ContainerId, SlotIndex};
use ahash::RandomState;
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// container id -> bitmask of slots holding it
type SlotIndexMap = HashMap<u64, u64, RandomState>;

/// Membership lookup strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupMode {
    /// O(1) keyed lookup by container id
    #[default]
    Indexed,
    /// Probe all 64 slots (for hosts with index-only map lookup)
    Scan,
}

impl FromStr for LookupMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "indexed" | "index" => Ok(LookupMode::Indexed),
            "scan" => Ok(LookupMode::Scan),
            _ => Err(()),
        }
    }
}

/// One occupied slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSlot {
    pub slot: SlotIndex,
    pub container_id: ContainerId,
}

/// Outcome of a full slot scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOutcome {
    /// First slot holding the queried id
    pub matched: Option<SlotIndex>,
    /// Slots visited; always MAX_CONTAINER_SLOTS
    pub probes: usize,
}

impl ScanOutcome {
    #[inline]
    pub fn is_member(&self) -> bool {
        self.matched.is_some()
    }
}

/// Bounded membership table
pub struct MembershipStore {
    slots: [AtomicU64; MAX_CONTAINER_SLOTS],
    index: ArcSwap<SlotIndexMap>,
    writer: Mutex<()>,
}

impl MembershipStore {
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| AtomicU64::new(EMPTY_CONTAINER_ID)),
            index: ArcSwap::from_pointee(SlotIndexMap::default()),
            writer: Mutex::new(()),
        }
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        MAX_CONTAINER_SLOTS
    }

    /// Membership through the O(1) index
    #[inline]
    pub fn is_member(&self, id: ContainerId) -> bool {
        self.lookup(id, LookupMode::Indexed).is_some()
    }

    /// Slot holding `id`, using the requested strategy
    pub fn lookup(&self, id: ContainerId, mode: LookupMode) -> Option<SlotIndex> {
        if id.is_empty() {
            return None;
        }
        match mode {
            LookupMode::Indexed => self
                .index
                .load()
                .get(&id.raw())
                .copied()
                .filter(|mask| *mask != 0)
                .map(|mask| mask.trailing_zeros() as SlotIndex),
            LookupMode::Scan => self.scan(id).matched,
        }
    }

    /// Probe every slot; never returns early
    pub fn scan(&self, id: ContainerId) -> ScanOutcome {
        let mut matched = None;
        let mut probes = 0;

        for (slot, cell) in self.slots.iter().enumerate() {
            probes += 1;
            let value = cell.load(Ordering::Acquire);
            if value == EMPTY_CONTAINER_ID {
                continue;
            }
            if value == id.raw() && matched.is_none() {
                matched = Some(slot);
            }
        }

        ScanOutcome { matched, probes }
    }

    /// Read one slot
    pub fn get(&self, slot: SlotIndex) -> StoreResult<Option<ContainerId>> {
        let cell = self.cell(slot)?;
        let value = cell.load(Ordering::Acquire);
        Ok((value != EMPTY_CONTAINER_ID).then_some(ContainerId(value)))
    }

    /// Insert or replace a slot, returning the previous occupant
    pub fn set(&self, slot: SlotIndex, id: ContainerId) -> StoreResult<Option<ContainerId>> {
        let cell = self.cell(slot)?;
        if id.is_empty() {
            return Err(StoreError::ReservedIdentifier);
        }

        let _guard = self.writer.lock();
        let previous = cell.swap(id.raw(), Ordering::AcqRel);
        let mut index = self.index_copy();
        *index.entry(id.raw()).or_insert(0) |= 1u64 << slot;
        if previous != EMPTY_CONTAINER_ID && previous != id.raw() {
            unindex(&mut index, previous, slot);
        }
        self.index.store(Arc::new(index));

        Ok((previous != EMPTY_CONTAINER_ID).then_some(ContainerId(previous)))
    }

    /// Empty a slot, returning the previous occupant
    pub fn clear(&self, slot: SlotIndex) -> StoreResult<Option<ContainerId>> {
        let cell = self.cell(slot)?;

        let _guard = self.writer.lock();
        let previous = cell.swap(EMPTY_CONTAINER_ID, Ordering::AcqRel);
        if previous == EMPTY_CONTAINER_ID {
            return Ok(None);
        }
        let mut index = self.index_copy();
        unindex(&mut index, previous, slot);
        self.index.store(Arc::new(index));
        Ok(Some(ContainerId(previous)))
    }

    /// Empty every slot
    pub fn clear_all(&self) {
        let _guard = self.writer.lock();
        for cell in &self.slots {
            cell.store(EMPTY_CONTAINER_ID, Ordering::Release);
        }
        self.index.store(Arc::new(SlotIndexMap::default()));
    }

    /// Occupied slots in slot order
    pub fn entries(&self) -> Vec<ContainerSlot> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, cell)| {
                let value = cell.load(Ordering::Acquire);
                (value != EMPTY_CONTAINER_ID).then_some(ContainerSlot {
                    slot,
                    container_id: ContainerId(value),
                })
            })
            .collect()
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|cell| cell.load(Ordering::Acquire) != EMPTY_CONTAINER_ID)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cell(&self, slot: SlotIndex) -> StoreResult<&AtomicU64> {
        self.slots.get(slot).ok_or(StoreError::SlotOutOfRange {
            slot,
            capacity: MAX_CONTAINER_SLOTS,
        })
    }

    /// Caller holds the writer lock
    fn index_copy(&self) -> SlotIndexMap {
        (**self.index.load()).clone()
    }
}

fn unindex(index: &mut SlotIndexMap, raw: u64, slot: SlotIndex) {
    if let Some(mask) = index.get_mut(&raw) {
        *mask &= !(1u64 << slot);
        if *mask == 0 {
            index.remove(&raw);
        }
    }
}

impl Default for MembershipStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MembershipStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MembershipStore")
            .field("entries", &self.entries())
            .finish()
    }
}
