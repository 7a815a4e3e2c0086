/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coordinator operation result
pub type CoordinatorResult<T> = Result<T, CoordinatorError>;

/// Result of a component's pressure response
pub type ComponentResult<T> = Result<T, CleanupError>;

/// Cache eviction contract result
pub type EvictionResult<T> = Result<T, EvictionError>;

/// Platform usage probe result
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Failure reported by a registered component while responding to pressure
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum CleanupError {
    #[error("Cleanup failed in {component}: {reason}")]
    #[diagnostic(
        code(cleanup::failed),
        help("The component could not release memory; the round continued without it.")
    )]
    Failed { component: String, reason: String },

    #[error("Cleanup in {component} exceeded {timeout_ms}ms")]
    #[diagnostic(
        code(cleanup::timeout),
        help("Pressure responses should be fast. Move slow work out of the cleanup path.")
    )]
    Timeout { component: String, timeout_ms: u64 },

    #[error("Component {component} panicked during cleanup: {message}")]
    #[diagnostic(
        code(cleanup::panicked),
        help("The panic was contained; the round continued with the next component.")
    )]
    Panicked { component: String, message: String },

    #[error("Eviction failed: {0}")]
    #[diagnostic(code(cleanup::eviction))]
    Eviction(#[from] EvictionError),
}

impl CleanupError {
    /// Convenience constructor for the common failure case
    pub fn failed(component: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failed {
            component: component.into(),
            reason: reason.into(),
        }
    }

    /// Build a `Panicked` error from a caught unwind payload
    pub fn panicked(component: impl Into<String>, payload: &(dyn std::any::Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self::Panicked {
            component: component.into(),
            message,
        }
    }
}

/// Failures of the cache eviction contract
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum EvictionError {
    #[error("Could not read size statistics for cache {cache}: {reason}")]
    #[diagnostic(
        code(eviction::stats),
        help("The cache storage engine failed to report its size. Eviction was skipped.")
    )]
    Stats { cache: String, reason: String },

    #[error("Could not clear cache {cache}: {reason}")]
    #[diagnostic(code(eviction::clear))]
    Clear { cache: String, reason: String },

    #[error("Cache {0} does not support selective removal")]
    #[diagnostic(
        code(eviction::unsupported),
        help("Only full clears are available for this cache.")
    )]
    Unsupported(String),
}

/// Failures reading platform memory usage
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ProbeError {
    #[error("I/O error reading {path}: {reason}")]
    #[diagnostic(code(probe::io))]
    Io { path: String, reason: String },

    #[error("Could not parse {field} from {path}")]
    #[diagnostic(code(probe::parse))]
    Parse { path: String, field: String },

    #[error("Usage probe unavailable: {0}")]
    #[diagnostic(
        code(probe::unavailable),
        help("This platform does not expose the required memory counters.")
    )]
    Unavailable(String),
}

/// Coordinator lifecycle and configuration errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum CoordinatorError {
    #[error("No tokio runtime available: {0}")]
    #[diagnostic(
        code(coordinator::runtime_unavailable),
        help("Call initialize() from within a tokio runtime context.")
    )]
    RuntimeUnavailable(String),

    #[error("Coordinator has been shut down")]
    #[diagnostic(
        code(coordinator::shut_down),
        help("Call reset() before initializing the coordinator again.")
    )]
    ShutDown,

    #[error("Invalid configuration: {0}")]
    #[diagnostic(code(coordinator::config))]
    Config(String),
}

impl From<serde_json::Error> for CoordinatorError {
    fn from(err: serde_json::Error) -> Self {
        CoordinatorError::Config(err.to_string())
    }
}
