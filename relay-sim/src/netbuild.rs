//! Net builder: turns a [`Page`]'s wire/junction forest into VNETs
//! (SPEC_FULL.md §4.1).
//!
//! The traversal is an undirected connectivity search, expressed as a
//! small union-find over tab ids — the same "index-based graph, no
//! pointers" flavor the teacher reaches for with `petgraph`, sized down
//! since nets never need edge weights or directed traversal.

use std::collections::{HashMap, HashSet};

use crate::model::{ComponentId, Document, Junction, Page, PageId, TabId, Wire};
use crate::vnet::{NetTable, Vnet};

/// Disjoint-set over every tab id seen while walking a page's wires.
struct UnionFind {
    parent: HashMap<TabId, TabId>,
}

impl UnionFind {
    fn new() -> Self {
        Self {
            parent: HashMap::new(),
        }
    }

    fn find(&mut self, tab: TabId) -> TabId {
        let parent = *self.parent.entry(tab).or_insert(tab);
        if parent == tab {
            tab
        } else {
            let root = self.find(parent);
            self.parent.insert(tab, root);
            root
        }
    }

    fn union(&mut self, a: TabId, b: TabId) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent.insert(ra, rb);
        }
    }
}

fn walk_wire(wire: &Wire, uf: &mut UnionFind, seen: &mut HashSet<TabId>) {
    seen.insert(wire.start_tab_id);
    uf.find(wire.start_tab_id);
    if let Some(end) = wire.end_tab_id {
        seen.insert(end);
        uf.union(wire.start_tab_id, end);
    }
    for junction in &wire.junctions {
        walk_junction(junction, wire.start_tab_id, uf, seen);
    }
}

fn walk_junction(junction: &Junction, incoming_tab: TabId, uf: &mut UnionFind, seen: &mut HashSet<TabId>) {
    let _ = junction;
    for child in &junction.child_wires {
        seen.insert(child.start_tab_id);
        uf.union(incoming_tab, child.start_tab_id);
        walk_wire(child, uf, seen);
    }
}

/// Builds the VNETs for a single page and inserts them into `table`.
/// Singleton tabs (never referenced by a wire) are not materialized here;
/// callers that need every tab covered should fall back to
/// [`NetTable::net_for_tab`] returning `None` and treat that as a
/// perpetually-Float singleton net.
pub fn build_page_nets(page: &Page, table: &mut NetTable) {
    let mut uf = UnionFind::new();
    let mut seen: HashSet<TabId> = HashSet::new();

    for wire in &page.wires {
        walk_wire(wire, &mut uf, &mut seen);
    }

    let mut groups: HashMap<TabId, HashSet<TabId>> = HashMap::new();
    for tab in seen {
        let root = uf.find(tab);
        groups.entry(root).or_default().insert(tab);
    }

    for (_root, tabs) in groups {
        let net = Vnet::new(crate::model::NetId::generate(), page.page_id, tabs);
        table.insert(net);
    }
}

/// Builds VNETs for every live page in the document. Sub-circuit
/// *template* pages under `document.sub_circuits` are not built here —
/// they are inert until [`crate::instantiate`] clones them into a real
/// page; only clones (marked `is_sub_circuit_page`) participate in a run.
pub fn build_document_nets(document: &crate::model::Document) -> NetTable {
    let mut table = NetTable::new();
    for page in &document.pages {
        build_page_nets(page, &mut table);
    }
    table
}

fn collect_dangling(wire: &Wire, valid: &HashSet<TabId>, dangling: &mut Vec<TabId>) {
    if !valid.contains(&wire.start_tab_id) {
        dangling.push(wire.start_tab_id);
    }
    if let Some(end) = wire.end_tab_id {
        if !valid.contains(&end) {
            dangling.push(end);
        }
    }
    for junction in &wire.junctions {
        for child in &junction.child_wires {
            collect_dangling(child, valid, dangling);
        }
    }
}

/// Tab ids referenced by a wire or junction on `page` that no component
/// pin on that page actually owns (SPEC_FULL.md §4.1 "dangling
/// references"). The whole page is walked regardless of how many
/// violations turn up, so callers see every dangling reference at once
/// rather than just the first.
pub fn dangling_wire_refs(page: &Page) -> Vec<TabId> {
    let valid: HashSet<TabId> = page
        .components
        .iter()
        .flat_map(|c| c.pins.iter())
        .flat_map(|p| p.tabs.iter())
        .map(|t| t.id)
        .collect();
    let mut dangling = Vec::new();
    for wire in &page.wires {
        collect_dangling(wire, &valid, &mut dangling);
    }
    dangling
}

/// Every dangling wire reference in the document, tagged with the page it
/// was found on.
pub fn document_dangling_wire_refs(document: &Document) -> Vec<(PageId, TabId)> {
    document
        .pages
        .iter()
        .flat_map(|page| {
            dangling_wire_refs(page)
                .into_iter()
                .map(move |tab| (page.page_id, tab))
        })
        .collect()
}

/// Tabs belonging to an unlinked component on `page` that ended up in no
/// wire-derived net — isolated from the rest of the circuit on this page
/// (SPEC_FULL.md §7 "isolated tab"). Must be called against `table` after
/// [`build_page_nets`] but before [`NetTable::ensure_singleton`] fills in
/// the remaining tabs, or every tab will already have a net.
pub fn isolated_tabs(page: &Page, table: &NetTable) -> Vec<(ComponentId, TabId)> {
    let mut isolated = Vec::new();
    for component in &page.components {
        if component.link_name.as_deref().is_some_and(|n| !n.is_empty()) {
            continue;
        }
        for tab in component.tab_ids() {
            if table.net_for_tab(tab).is_none() {
                isolated.push((component.id, tab));
            }
        }
    }
    isolated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Position, TabId, WireId};

    fn wire(start: TabId, end: Option<TabId>) -> Wire {
        Wire {
            id: WireId::generate(),
            start_tab_id: start,
            end_tab_id: end,
            waypoints: vec![],
            junctions: vec![],
        }
    }

    #[test]
    fn two_wires_sharing_a_tab_form_one_net() {
        let a = TabId::generate();
        let b = TabId::generate();
        let c = TabId::generate();
        let mut page = Page::new("p");
        page.wires.push(wire(a, Some(b)));
        page.wires.push(wire(b, Some(c)));

        let mut table = NetTable::new();
        build_page_nets(&page, &mut table);

        assert_eq!(table.len(), 1);
        let net_id = table.net_for_tab(a).unwrap();
        assert_eq!(table.net_for_tab(b), Some(net_id));
        assert_eq!(table.net_for_tab(c), Some(net_id));
    }

    #[test]
    fn disjoint_wires_form_separate_nets() {
        let a = TabId::generate();
        let b = TabId::generate();
        let c = TabId::generate();
        let d = TabId::generate();
        let mut page = Page::new("p");
        page.wires.push(wire(a, Some(b)));
        page.wires.push(wire(c, Some(d)));

        let mut table = NetTable::new();
        build_page_nets(&page, &mut table);

        assert_eq!(table.len(), 2);
        assert_ne!(table.net_for_tab(a), table.net_for_tab(c));
    }

    #[test]
    fn junction_joins_all_child_wires() {
        let a = TabId::generate();
        let b = TabId::generate();
        let c = TabId::generate();
        let junction = Junction {
            id: crate::model::JunctionId::generate(),
            position: Position { x: 0.0, y: 0.0 },
            child_wires: vec![wire(b, None), wire(c, None)],
        };
        let mut page = Page::new("p");
        page.wires.push(Wire {
            id: WireId::generate(),
            start_tab_id: a,
            end_tab_id: None,
            waypoints: vec![],
            junctions: vec![junction],
        });

        let mut table = NetTable::new();
        build_page_nets(&page, &mut table);

        assert_eq!(table.len(), 1);
        let net_id = table.net_for_tab(a).unwrap();
        assert_eq!(table.net_for_tab(b), Some(net_id));
        assert_eq!(table.net_for_tab(c), Some(net_id));
    }

    #[test]
    fn unreferenced_tab_has_no_net() {
        let a = TabId::generate();
        let page = Page::new("p");
        let mut table = NetTable::new();
        build_page_nets(&page, &mut table);
        assert!(table.net_for_tab(a).is_none());
    }

    #[test]
    fn wire_to_unowned_tab_is_dangling() {
        let mut page = Page::new("p");
        let owned = crate::model::Tab::new(crate::model::Position { x: 0.0, y: 0.0 });
        let owned_id = owned.id;
        page.components.push(crate::model::Component::new(
            crate::model::ComponentKind::Switch,
            crate::model::Position { x: 0.0, y: 0.0 },
            vec![crate::model::Pin::new(vec![owned])],
        ));
        let stray = TabId::generate();
        page.wires.push(wire(owned_id, Some(stray)));

        let dangling = dangling_wire_refs(&page);
        assert_eq!(dangling, vec![stray]);
    }

    #[test]
    fn wire_between_owned_tabs_has_no_dangling_refs() {
        let a = crate::model::Tab::new(crate::model::Position { x: 0.0, y: 0.0 });
        let b = crate::model::Tab::new(crate::model::Position { x: 1.0, y: 0.0 });
        let (a_id, b_id) = (a.id, b.id);
        let mut page = Page::new("p");
        page.components.push(crate::model::Component::new(
            crate::model::ComponentKind::Switch,
            crate::model::Position { x: 0.0, y: 0.0 },
            vec![crate::model::Pin::new(vec![a])],
        ));
        page.components.push(crate::model::Component::new(
            crate::model::ComponentKind::Indicator,
            crate::model::Position { x: 1.0, y: 0.0 },
            vec![crate::model::Pin::new(vec![b])],
        ));
        page.wires.push(wire(a_id, Some(b_id)));

        assert!(dangling_wire_refs(&page).is_empty());
    }

    #[test]
    fn unwired_unlinked_component_tab_is_isolated() {
        let tab = crate::model::Tab::new(crate::model::Position { x: 0.0, y: 0.0 });
        let tab_id = tab.id;
        let mut page = Page::new("p");
        page.components.push(crate::model::Component::new(
            crate::model::ComponentKind::Indicator,
            crate::model::Position { x: 0.0, y: 0.0 },
            vec![crate::model::Pin::new(vec![tab])],
        ));

        let mut table = NetTable::new();
        build_page_nets(&page, &mut table);
        let isolated = isolated_tabs(&page, &table);
        assert_eq!(isolated.len(), 1);
        assert_eq!(isolated[0].1, tab_id);
    }

    #[test]
    fn linked_component_tab_is_not_isolated() {
        let tab = crate::model::Tab::new(crate::model::Position { x: 0.0, y: 0.0 });
        let mut page = Page::new("p");
        page.components.push(
            crate::model::Component::new(
                crate::model::ComponentKind::Indicator,
                crate::model::Position { x: 0.0, y: 0.0 },
                vec![crate::model::Pin::new(vec![tab])],
            )
            .with_link_name("BUS"),
        );

        let mut table = NetTable::new();
        build_page_nets(&page, &mut table);
        assert!(isolated_tabs(&page, &table).is_empty());
    }
}
