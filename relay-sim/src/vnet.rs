//! The runtime VNET (virtual electrical net) aggregate and the net table
//! that owns every VNET for one simulation run (SPEC_FULL.md §3, §5).
//!
//! VNETs are never serialized; they are rebuilt by [`crate::netbuild`] and
//! [`crate::linker`] on every `Engine::start`. Each VNET carries its own
//! critical section (SPEC_FULL.md §5) so that the parallel concurrency
//! layer can evaluate independent nets without a single global lock.

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;
use serde::Serialize;

use crate::model::{BridgeId, NetId, PageId, SignalState, TabId};

#[derive(Debug, Default)]
struct VnetInner {
    tabs: HashSet<TabId>,
    links: HashSet<String>,
    bridges: HashSet<BridgeId>,
    state: SignalState,
    /// Running count of state flips during the current simulation; used
    /// to rank offenders when oscillation is detected (SPEC_FULL.md §9).
    toggle_count: usize,
}

/// A single virtual electrical net. Cheap to share by reference inside a
/// [`NetTable`] since its mutable fields live behind one lock.
pub struct Vnet {
    pub id: NetId,
    pub page_id: PageId,
    inner: Mutex<VnetInner>,
}

impl Vnet {
    pub fn new(id: NetId, page_id: PageId, tabs: HashSet<TabId>) -> Self {
        Self {
            id,
            page_id,
            inner: Mutex::new(VnetInner {
                tabs,
                ..Default::default()
            }),
        }
    }

    pub fn state(&self) -> SignalState {
        self.inner.lock().state
    }

    pub fn tabs(&self) -> Vec<TabId> {
        self.inner.lock().tabs.iter().copied().collect()
    }

    pub fn links(&self) -> Vec<String> {
        self.inner.lock().links.iter().cloned().collect()
    }

    pub fn bridges(&self) -> Vec<BridgeId> {
        self.inner.lock().bridges.iter().copied().collect()
    }

    pub fn toggle_count(&self) -> usize {
        self.inner.lock().toggle_count
    }

    pub fn add_link(&self, name: String) {
        self.inner.lock().links.insert(name);
    }

    pub fn remove_link(&self, name: &str) {
        self.inner.lock().links.remove(name);
    }

    pub fn add_bridge(&self, bridge: BridgeId) {
        self.inner.lock().bridges.insert(bridge);
    }

    pub fn remove_bridge(&self, bridge: BridgeId) {
        self.inner.lock().bridges.remove(&bridge);
    }

    /// Overwrites the cached state, recording a toggle if it actually
    /// changed. Returns whether the state changed.
    pub fn set_state(&self, new_state: SignalState) -> bool {
        let mut inner = self.inner.lock();
        if inner.state == new_state {
            false
        } else {
            inner.state = new_state;
            inner.toggle_count += 1;
            true
        }
    }
}

impl std::fmt::Debug for Vnet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Vnet")
            .field("id", &self.id)
            .field("page_id", &self.page_id)
            .field("tabs", &inner.tabs)
            .field("links", &inner.links)
            .field("bridges", &inner.bridges)
            .field("state", &inner.state)
            .finish()
    }
}

/// Owns every VNET for one simulation run, plus the indexes used to
/// resolve tab/link membership in O(1).
#[derive(Default)]
pub struct NetTable {
    nets: HashMap<NetId, Vnet>,
    tab_index: HashMap<TabId, NetId>,
    link_index: HashMap<String, Vec<NetId>>,
}

impl NetTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, net: Vnet) {
        let id = net.id;
        for tab in net.tabs() {
            self.tab_index.insert(tab, id);
        }
        self.nets.insert(id, net);
    }

    pub fn get(&self, id: NetId) -> Option<&Vnet> {
        self.nets.get(&id)
    }

    pub fn net_for_tab(&self, tab: TabId) -> Option<NetId> {
        self.tab_index.get(&tab).copied()
    }

    /// Returns the net containing `tab`, creating a singleton VNET for it
    /// if the net builder never reached it (an unwired tab still needs a
    /// VNET to participate in bridge/link operations; SPEC_FULL.md §4.1
    /// "unreferenced tabs form singleton VNETs on demand").
    pub fn ensure_singleton(&mut self, tab: TabId, page_id: PageId) -> NetId {
        if let Some(id) = self.net_for_tab(tab) {
            return id;
        }
        let mut tabs = HashSet::new();
        tabs.insert(tab);
        let net = Vnet::new(NetId::generate(), page_id, tabs);
        let id = net.id;
        self.insert(net);
        id
    }

    pub fn net_ids(&self) -> Vec<NetId> {
        let mut ids: Vec<NetId> = self.nets.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.nets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nets.is_empty()
    }

    /// Rebuilds the link-name index from the current per-VNET link sets.
    /// Called once per link-resolve pass (SPEC_FULL.md §4.2).
    pub fn reindex_links(&mut self) {
        let mut index: HashMap<String, Vec<NetId>> = HashMap::new();
        for net in self.nets.values() {
            for name in net.links() {
                index.entry(name).or_default().push(net.id);
            }
        }
        for nets in index.values_mut() {
            nets.sort();
        }
        self.link_index = index;
    }

    pub fn nets_for_link(&self, name: &str) -> &[NetId] {
        self.link_index.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn link_membership_counts(&self) -> impl Iterator<Item = (&str, usize)> {
        self.link_index.iter().map(|(k, v)| (k.as_str(), v.len()))
    }
}

/// A read-only snapshot of one VNET, used in [`crate::engine::Snapshot`].
#[derive(Debug, Clone, Serialize)]
pub struct VnetSummary {
    pub id: NetId,
    pub state: SignalState,
    pub members: Vec<TabId>,
}

impl From<&Vnet> for VnetSummary {
    fn from(net: &Vnet) -> Self {
        Self {
            id: net.id,
            state: net.state(),
            members: net.tabs(),
        }
    }
}
