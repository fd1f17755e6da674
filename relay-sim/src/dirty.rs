//! Dirty-flag manager (SPEC_FULL.md §4.6): the set of VNETs the evaluate
//! phase must revisit.
//!
//! Backed by `dashmap::DashSet` rather than `Mutex<HashSet<_>>` so mark
//! and clear never contend with each other across the parallel
//! concurrency layer's worker threads.

use dashmap::DashSet;

use crate::model::{ComponentId, NetId};

#[derive(Default)]
pub struct DirtySet {
    members: DashSet<NetId>,
}

impl DirtySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&self, net: NetId) {
        self.members.insert(net);
    }

    pub fn clear(&self, net: NetId) {
        self.members.remove(&net);
    }

    pub fn is_dirty(&self, net: NetId) -> bool {
        self.members.contains(&net)
    }

    pub fn any_dirty(&self) -> bool {
        !self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Snapshots current membership sorted by id, then clears it.
    pub fn drain(&self) -> Vec<NetId> {
        let mut snapshot: Vec<NetId> = self.members.iter().map(|e| *e).collect();
        snapshot.sort();
        for id in &snapshot {
            self.members.remove(id);
        }
        snapshot
    }

    pub fn mark_all(&self, nets: impl IntoIterator<Item = NetId>) {
        for net in nets {
            self.mark(net);
        }
    }
}

/// Components that must be re-evaluated next iteration regardless of
/// whether any net they read actually changed value — used by a kernel
/// with pending internal state (the relay's settling timer, a switch's
/// `interact` before its pin write lands) to force its own re-entry
/// instead of relying on a net-value change it doesn't control.
#[derive(Default)]
pub struct RequeueSet {
    members: DashSet<ComponentId>,
}

impl RequeueSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&self, component: ComponentId) {
        self.members.insert(component);
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Snapshots current membership, then clears it.
    pub fn drain(&self) -> Vec<ComponentId> {
        let snapshot: Vec<ComponentId> = self.members.iter().map(|e| *e).collect();
        for id in &snapshot {
            self.members.remove(id);
        }
        snapshot
    }
}

#[cfg(test)]
mod requeue_tests {
    use super::*;

    #[test]
    fn mark_then_drain_clears() {
        let set = RequeueSet::new();
        let a = ComponentId::generate();
        set.mark(a);
        assert!(!set.is_empty());
        assert_eq!(set.drain(), vec![a]);
        assert!(set.is_empty());
    }
}
