//! Per-component runtime state (SPEC_FULL.md §4.4, §9 "generators/async
//! evaluate" note): the fields that must survive between run-loop
//! iterations but are never persisted, keyed by [`ComponentId`].
//!
//! Lives outside [`crate::model::Component`] since the model is the
//! serializable structural data; this table is purely a simulation
//! artifact, rebuilt by `on_start` every run.

use dashmap::DashMap;

use crate::clock::Tick;
use crate::model::{BridgeId, ComponentId};

#[derive(Debug, Clone, Copy)]
pub struct PendingTransition {
    pub target_energized: bool,
    pub deadline: Tick,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RelayState {
    pub energized: bool,
    pub pending: Option<PendingTransition>,
    pub bridge_pole1: Option<BridgeId>,
    pub bridge_pole2: Option<BridgeId>,
}

#[derive(Debug, Clone)]
pub enum RuntimeState {
    Switch { on: bool },
    Relay(RelayState),
    /// Indicator, Vcc, and SubCircuitInstance carry no mutable state.
    Passive,
}

/// Concurrent map from component to its runtime state. `DashMap`'s
/// per-shard locking gives each component its own critical section
/// without a manager-wide mutex (SPEC_FULL.md §5).
#[derive(Default)]
pub struct RuntimeTable(DashMap<ComponentId, RuntimeState>);

impl RuntimeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn init(&self, id: ComponentId, state: RuntimeState) {
        self.0.insert(id, state);
    }

    pub fn remove(&self, id: ComponentId) {
        self.0.remove(&id);
    }

    pub fn with<R>(&self, id: ComponentId, f: impl FnOnce(&mut RuntimeState) -> R) -> Option<R> {
        self.0.get_mut(&id).map(|mut entry| f(&mut entry))
    }

    pub fn get_clone(&self, id: ComponentId) -> Option<RuntimeState> {
        self.0.get(&id).map(|entry| entry.clone())
    }
}
