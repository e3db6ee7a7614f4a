/*!
 * Hook Table
 * In-process stand-in for the host's attachment mechanism
 *
 * Each interception point holds at most one program. The table is swapped
 * RCU-style on attach/detach, so dispatch reads it without locking.
 * Dispatching to a hook with nothing attached allows the operation.
 */

use crate::context::{FileOperationContext, PacketContext};
use crate::core::errors::{HostError, HostResult};
use crate::core::types::{Hook, Verdict};
use crate::events::DecisionSink;
use crate::maps::PolicyMaps;
use crate::monitoring::span_evaluation;
use crate::policy::{FileEvaluator, PacketEvaluator};
use arc_swap::ArcSwap;
use log::{info, warn};
use parking_lot::Mutex;
use serde::Serialize;
use serde_with::{serde_as, TimestampSeconds};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::SystemTime;
use uuid::Uuid;

/// A loaded evaluator, ready to attach
#[derive(Clone)]
pub enum Program {
    File(Arc<dyn FileEvaluator>),
    Packet(Arc<dyn PacketEvaluator>),
}

impl Program {
    pub fn file<E: FileEvaluator + 'static>(evaluator: E) -> Self {
        Program::File(Arc::new(evaluator))
    }

    pub fn packet<E: PacketEvaluator + 'static>(evaluator: E) -> Self {
        Program::Packet(Arc::new(evaluator))
    }

    pub fn name(&self) -> &str {
        match self {
            Program::File(evaluator) => evaluator.name(),
            Program::Packet(evaluator) => evaluator.name(),
        }
    }

    pub fn hook(&self) -> Hook {
        match self {
            Program::File(evaluator) => evaluator.hook(),
            Program::Packet(evaluator) => evaluator.hook(),
        }
    }

    /// File programs need a filesystem hook, packet programs the ingress hook
    fn fits(&self, hook: Hook) -> bool {
        match self {
            Program::File(_) => hook.is_lsm(),
            Program::Packet(_) => hook == Hook::TcIngress,
        }
    }
}

/// One intercepted operation, as delivered by the host
#[derive(Debug, Clone, Copy)]
pub enum InterceptedOperation<'a> {
    Chmod(FileOperationContext),
    Rmdir(FileOperationContext),
    FilePermission(FileOperationContext),
    Ingress(PacketContext<'a>),
}

impl InterceptedOperation<'_> {
    pub fn hook(&self) -> Hook {
        match self {
            InterceptedOperation::Chmod(_) => Hook::Chmod,
            InterceptedOperation::Rmdir(_) => Hook::Rmdir,
            InterceptedOperation::FilePermission(_) => Hook::FilePermission,
            InterceptedOperation::Ingress(_) => Hook::TcIngress,
        }
    }
}

struct Attachment {
    id: Uuid,
    program: Program,
    attached_at: SystemTime,
}

/// Attachment listing entry
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentInfo {
    pub id: Uuid,
    pub hook: Hook,
    pub program: String,
    #[serde_as(as = "TimestampSeconds<i64>")]
    pub attached_at: SystemTime,
}

impl Attachment {
    fn info(&self) -> AttachmentInfo {
        AttachmentInfo {
            id: self.id,
            hook: self.program.hook(),
            program: self.program.name().to_string(),
            attached_at: self.attached_at,
        }
    }
}

type Slots = [Option<Arc<Attachment>>; 4];

/// Attachment table and dispatcher
pub struct HookTable {
    slots: ArcSwap<Slots>,
    writer: Mutex<()>,
    invocations: [AtomicU64; 4],
    maps: PolicyMaps,
    sink: Arc<dyn DecisionSink>,
}

impl HookTable {
    pub fn new(maps: PolicyMaps, sink: Arc<dyn DecisionSink>) -> Self {
        Self {
            slots: ArcSwap::from_pointee(Default::default()),
            writer: Mutex::new(()),
            invocations: std::array::from_fn(|_| AtomicU64::new(0)),
            maps,
            sink,
        }
    }

    /// Stores handed to every evaluator
    pub fn maps(&self) -> &PolicyMaps {
        &self.maps
    }

    /// Attach a program at the hook it was written for
    pub fn attach(&self, program: Program) -> HostResult<Uuid> {
        let hook = program.hook();
        if !program.fits(hook) {
            return Err(HostError::HookMismatch {
                hook,
                program: program.name().to_string(),
            });
        }

        let _guard = self.writer.lock();
        let current = self.slots.load();
        if current[hook.index()].is_some() {
            return Err(HostError::HookOccupied { hook });
        }

        let id = Uuid::new_v4();
        let name = program.name().to_string();
        let mut next: Slots = (**current).clone();
        next[hook.index()] = Some(Arc::new(Attachment {
            id,
            program,
            attached_at: SystemTime::now(),
        }));
        self.slots.store(Arc::new(next));

        info!("Attached program {} at {}", name, hook);
        Ok(id)
    }

    /// Detach whatever is attached at `hook`
    pub fn detach(&self, hook: Hook) -> HostResult<AttachmentInfo> {
        let _guard = self.writer.lock();
        let current = self.slots.load();
        let attachment = current[hook.index()]
            .clone()
            .ok_or(HostError::NotAttached { hook })?;

        let mut next: Slots = (**current).clone();
        next[hook.index()] = None;
        self.slots.store(Arc::new(next));

        info!("Detached program {} from {}", attachment.program.name(), hook);
        Ok(attachment.info())
    }

    pub fn is_attached(&self, hook: Hook) -> bool {
        self.slots.load()[hook.index()].is_some()
    }

    pub fn get(&self, hook: Hook) -> Option<AttachmentInfo> {
        self.slots.load()[hook.index()].as_ref().map(|a| a.info())
    }

    /// Attachments in hook order
    pub fn list(&self) -> Vec<AttachmentInfo> {
        self.slots
            .load()
            .iter()
            .flatten()
            .map(|attachment| attachment.info())
            .collect()
    }

    /// Times a program was invoked at `hook`
    pub fn invocations(&self, hook: Hook) -> u64 {
        self.invocations[hook.index()].load(Ordering::Relaxed)
    }

    /// Run the program attached at the operation's hook
    pub fn dispatch(&self, operation: InterceptedOperation<'_>) -> Verdict {
        let hook = operation.hook();
        let slots = self.slots.load();
        let Some(attachment) = slots[hook.index()].as_ref() else {
            return Verdict::Allow;
        };
        self.invocations[hook.index()].fetch_add(1, Ordering::Relaxed);
        let _span = span_evaluation(hook).entered();

        let sink = self.sink.as_ref();
        match (&attachment.program, operation) {
            (
                Program::File(evaluator),
                InterceptedOperation::Chmod(ctx)
                | InterceptedOperation::Rmdir(ctx)
                | InterceptedOperation::FilePermission(ctx),
            ) => evaluator.evaluate(&ctx, &self.maps, sink),
            (Program::Packet(evaluator), InterceptedOperation::Ingress(packet)) => {
                evaluator.evaluate(&packet, &self.maps, sink)
            }
            (program, _) => {
                // attach() only admits programs that fit their hook
                warn!("Program {} cannot handle {} operations", program.name(), hook);
                Verdict::Allow
            }
        }
    }
}
