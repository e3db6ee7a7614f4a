/*!
 * Host Module
 * Attachment table and engine facade around the evaluators
 */

mod engine;
mod hooks;

pub use engine::PolicyEngine;
pub use hooks::{AttachmentInfo, HookTable, InterceptedOperation, Program};
