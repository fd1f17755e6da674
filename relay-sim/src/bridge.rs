//! Bridge manager (SPEC_FULL.md §4.3): runtime edges between VNETs, owned
//! by the component that created them.

use std::collections::HashMap;

use crate::model::{BridgeId, ComponentId, NetId};
use crate::vnet::NetTable;

#[derive(Debug, Clone, Copy)]
struct BridgeRecord {
    owner: ComponentId,
    a: NetId,
    b: NetId,
}

/// Owns every bridge in a running simulation. All operations dirty the
/// endpoints they touch so the run loop re-evaluates them next iteration.
#[derive(Default)]
pub struct BridgeManager {
    bridges: HashMap<BridgeId, BridgeRecord>,
}

impl BridgeManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(
        &mut self,
        endpoint_a: NetId,
        endpoint_b: NetId,
        owner: ComponentId,
        nets: &NetTable,
        dirty: &crate::dirty::DirtySet,
    ) -> BridgeId {
        let id = BridgeId::generate();
        self.bridges.insert(
            id,
            BridgeRecord {
                owner,
                a: endpoint_a,
                b: endpoint_b,
            },
        );
        if let Some(net) = nets.get(endpoint_a) {
            net.add_bridge(id);
        }
        if let Some(net) = nets.get(endpoint_b) {
            net.add_bridge(id);
        }
        dirty.mark(endpoint_a);
        dirty.mark(endpoint_b);
        id
    }

    /// Replaces one endpoint of `bridge_id` with `new_endpoint`, dirtying
    /// both the endpoint being replaced and the new one. `old_endpoint`
    /// names which side to move (the caller knows which pole changed).
    pub fn move_endpoint(
        &mut self,
        bridge_id: BridgeId,
        old_endpoint: NetId,
        new_endpoint: NetId,
        nets: &NetTable,
        dirty: &crate::dirty::DirtySet,
    ) {
        let Some(record) = self.bridges.get_mut(&bridge_id) else {
            return;
        };
        if record.a == old_endpoint {
            record.a = new_endpoint;
        } else if record.b == old_endpoint {
            record.b = new_endpoint;
        } else {
            return;
        }
        if let Some(net) = nets.get(old_endpoint) {
            net.remove_bridge(bridge_id);
        }
        if let Some(net) = nets.get(new_endpoint) {
            net.add_bridge(bridge_id);
        }
        dirty.mark(old_endpoint);
        dirty.mark(new_endpoint);
    }

    pub fn destroy(&mut self, bridge_id: BridgeId, nets: &NetTable, dirty: &crate::dirty::DirtySet) {
        let Some(record) = self.bridges.remove(&bridge_id) else {
            return;
        };
        if let Some(net) = nets.get(record.a) {
            net.remove_bridge(bridge_id);
        }
        if let Some(net) = nets.get(record.b) {
            net.remove_bridge(bridge_id);
        }
        dirty.mark(record.a);
        dirty.mark(record.b);
    }

    pub fn bridges_owned_by(&self, owner: ComponentId) -> Vec<BridgeId> {
        self.bridges
            .iter()
            .filter(|(_, r)| r.owner == owner)
            .map(|(id, _)| *id)
            .collect()
    }

    /// The other endpoint of `bridge_id` as seen from `from`, if any.
    pub fn other_endpoint(&self, bridge_id: BridgeId, from: NetId) -> Option<NetId> {
        let record = self.bridges.get(&bridge_id)?;
        if record.a == from {
            Some(record.b)
        } else if record.b == from {
            Some(record.a)
        } else {
            None
        }
    }

    pub fn destroy_all_owned_by(
        &mut self,
        owner: ComponentId,
        nets: &NetTable,
        dirty: &crate::dirty::DirtySet,
    ) {
        for bridge_id in self.bridges_owned_by(owner) {
            self.destroy(bridge_id, nets, dirty);
        }
    }

    pub fn len(&self) -> usize {
        self.bridges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bridges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dirty::DirtySet;
    use crate::vnet::Vnet;
    use std::collections::HashSet;

    fn sample_nets() -> (NetTable, NetId, NetId, NetId) {
        let mut table = NetTable::new();
        let page = crate::model::PageId::generate();
        let a = NetId::generate();
        let b = NetId::generate();
        let c = NetId::generate();
        table.insert(Vnet::new(a, page, HashSet::new()));
        table.insert(Vnet::new(b, page, HashSet::new()));
        table.insert(Vnet::new(c, page, HashSet::new()));
        (table, a, b, c)
    }

    #[test]
    fn create_dirties_both_endpoints_and_registers_on_nets() {
        let (table, a, b, _) = sample_nets();
        let dirty = DirtySet::new();
        let mut mgr = BridgeManager::new();
        let owner = ComponentId::generate();
        let bridge = mgr.create(a, b, owner, &table, &dirty);

        assert!(dirty.is_dirty(a));
        assert!(dirty.is_dirty(b));
        assert_eq!(table.get(a).unwrap().bridges(), vec![bridge]);
        assert_eq!(mgr.bridges_owned_by(owner), vec![bridge]);
    }

    #[test]
    fn move_endpoint_relocates_and_dirties_old_and_new() {
        let (table, a, b, c) = sample_nets();
        let dirty = DirtySet::new();
        let mut mgr = BridgeManager::new();
        let owner = ComponentId::generate();
        let bridge = mgr.create(a, b, owner, &table, &dirty);
        dirty.drain();

        mgr.move_endpoint(bridge, b, c, &table, &dirty);

        assert!(table.get(b).unwrap().bridges().is_empty());
        assert_eq!(table.get(c).unwrap().bridges(), vec![bridge]);
        assert!(dirty.is_dirty(b));
        assert!(dirty.is_dirty(c));
    }

    #[test]
    fn destroy_all_owned_by_removes_every_bridge() {
        let (table, a, b, c) = sample_nets();
        let dirty = DirtySet::new();
        let mut mgr = BridgeManager::new();
        let owner = ComponentId::generate();
        mgr.create(a, b, owner, &table, &dirty);
        mgr.create(a, c, owner, &table, &dirty);

        mgr.destroy_all_owned_by(owner, &table, &dirty);

        assert!(mgr.is_empty());
        assert!(table.get(a).unwrap().bridges().is_empty());
    }
}
