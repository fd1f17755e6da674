//! Kernel error taxonomy shared by the engine, loader, and CLI.

use crate::model::{ComponentId, NetId, TabId};

/// Fatal kernel error kinds (see SPEC_FULL.md §7).
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// Dangling reference, duplicate identifier, or a malformed sub-circuit.
    #[error("structural error: {0}")]
    Structural(String),

    /// File major version does not match the engine's.
    #[error("incompatible document version: file requires {found}, engine supports {supported}")]
    VersionIncompatible { found: String, supported: String },

    /// API called in the wrong lifecycle state (e.g. `interact` before `start`).
    #[error("invalid operation {operation} in state {state}")]
    InvalidState { operation: String, state: String },

    /// The dirty set failed to shrink within the configured iteration cap.
    #[error("oscillation detected after {iterations} iterations; offending nets: {offenders:?}")]
    Oscillation {
        iterations: usize,
        offenders: Vec<NetId>,
    },

    /// The watchdog fired before the run loop reached stability.
    #[error("simulation timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// File read/write failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Document JSON could not be parsed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SimResult<T> = Result<T, SimError>;

/// A non-fatal condition: logged, surfaced to callers, but never aborts
/// the operation in progress (see SPEC_FULL.md §7).
#[derive(Debug, Clone, serde::Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
    /// The component responsible, if any.
    pub component: Option<ComponentId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum WarningKind {
    UnconnectedLink,
    IsolatedTab,
    ComponentEvaluateFailed,
}

impl Warning {
    pub fn unconnected_link(link_name: &str) -> Self {
        Self {
            kind: WarningKind::UnconnectedLink,
            message: format!("link \"{link_name}\" has only one member"),
            component: None,
        }
    }

    pub fn isolated_tab(component: ComponentId, tab: TabId) -> Self {
        Self {
            kind: WarningKind::IsolatedTab,
            message: format!("tab {tab:?} on component {component:?} has no wire and no link"),
            component: Some(component),
        }
    }

    pub fn component_evaluate_failed(component: ComponentId, detail: &str) -> Self {
        Self {
            kind: WarningKind::ComponentEvaluateFailed,
            message: format!("component {component:?} evaluate failed: {detail}"),
            component: Some(component),
        }
    }
}
