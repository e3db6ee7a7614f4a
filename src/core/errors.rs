/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 *
 * Evaluators never fail: every condition they meet maps to a verdict.
 * These errors belong to the control-plane write path, attachment and
 * configuration loading.
 */

use super::types::{Hook, SlotIndex};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Store errors raised on the control-plane write path
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum StoreError {
    #[error("Slot {slot} is out of range (0..{capacity})")]
    #[diagnostic(
        code(store::slot_out_of_range),
        help("The membership table has a fixed number of slots.")
    )]
    SlotOutOfRange { slot: SlotIndex, capacity: usize },

    #[error("Container id 0 is reserved for empty slots")]
    #[diagnostic(
        code(store::reserved_identifier),
        help("Use clear(slot) to empty a slot instead of writing 0.")
    )]
    ReservedIdentifier,

    #[error("Unknown configuration key: {key}")]
    #[diagnostic(
        code(store::unknown_config_key),
        help("Valid keys are 1 (filter enabled), 2 (lower IP bound) and 3 (upper IP bound).")
    )]
    UnknownConfigKey { key: u32 },

    #[error("Pinned map {name} exists with a different type")]
    #[diagnostic(
        code(store::map_type_mismatch),
        help("Unpin the existing map or choose another name.")
    )]
    MapTypeMismatch { name: String },
}

/// Attachment and dispatch errors raised by the host table
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum HostError {
    #[error("Hook {hook} already has a program attached")]
    #[diagnostic(
        code(host::hook_occupied),
        help("Detach the current program before attaching another one.")
    )]
    HookOccupied { hook: Hook },

    #[error("Program {program} cannot be attached at {hook}")]
    #[diagnostic(code(host::hook_mismatch))]
    HookMismatch { hook: Hook, program: String },

    #[error("No program attached at {hook}")]
    #[diagnostic(code(host::not_attached))]
    NotAttached { hook: Hook },
}

/// Configuration loading errors
#[derive(Error, Debug, Diagnostic)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    #[diagnostic(code(config::io))]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    #[diagnostic(code(config::parse), help("The configuration file must be JSON."))]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value {value:?} for {var}")]
    #[diagnostic(code(config::invalid_value))]
    InvalidValue { var: String, value: String },
}

/// Engine construction errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum EngineError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Host(#[from] HostError),
}

pub type StoreResult<T> = Result<T, StoreError>;
pub type HostResult<T> = Result<T, HostError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type EngineResult<T> = Result<T, EngineError>;
