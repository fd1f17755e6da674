//! Cross-page link resolver (SPEC_FULL.md §4.2).
//!
//! Joins VNETs that share a link name without requiring a drawn wire.
//! Link membership is additive on top of the net table built by
//! [`crate::netbuild`]; resolving links never rebuilds a VNET, so a link
//! can be added or removed without touching wire-derived connectivity.

use crate::error::Warning;
use crate::model::{Component, Document, Page};
use crate::vnet::NetTable;

fn resolve_page(page: &Page, table: &NetTable) {
    for component in &page.components {
        let Some(name) = component.link_name.as_deref() else {
            continue;
        };
        if name.is_empty() {
            continue;
        }
        if let Some(net_id) = first_net_for_component(component, table) {
            if let Some(net) = table.get(net_id) {
                net.add_link(name.to_string());
            }
        }
    }
}

fn first_net_for_component(component: &Component, table: &NetTable) -> Option<crate::model::NetId> {
    component.tab_ids().find_map(|tab| table.net_for_tab(tab))
}

/// Resolves every link name in `document` against the nets already present
/// in `table`, then reindexes link membership and returns a warning for
/// every link name with fewer than two members.
pub fn resolve_links(document: &Document, table: &mut NetTable) -> Vec<Warning> {
    for page in &document.pages {
        resolve_page(page, table);
    }

    table.reindex_links();

    table
        .link_membership_counts()
        .filter(|(_, count)| *count < 2)
        .map(|(name, _)| Warning::unconnected_link(name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Component, ComponentKind, Pin, Position, Tab, Wire, WireId};
    use crate::netbuild::build_document_nets;

    fn switch_with_link(page: &mut Page, link: &str) -> crate::model::TabId {
        let tab = Tab::new(Position { x: 0.0, y: 0.0 });
        let tab_id = tab.id;
        let pin = Pin::new(vec![tab]);
        let component =
            Component::new(ComponentKind::Switch, Position { x: 0.0, y: 0.0 }, vec![pin])
                .with_link_name(link);
        page.components.push(component);
        tab_id
    }

    #[test]
    fn two_components_sharing_a_link_name_join_nets() {
        let mut doc = Document::new("1.0.0");
        let mut page_a = Page::new("A");
        let tab_a = switch_with_link(&mut page_a, "BUS1");
        page_a.wires.push(Wire {
            id: WireId::generate(),
            start_tab_id: tab_a,
            end_tab_id: None,
            waypoints: vec![],
            junctions: vec![],
        });

        let mut page_b = Page::new("B");
        let tab_b = switch_with_link(&mut page_b, "BUS1");
        page_b.wires.push(Wire {
            id: WireId::generate(),
            start_tab_id: tab_b,
            end_tab_id: None,
            waypoints: vec![],
            junctions: vec![],
        });

        doc.pages.push(page_a);
        doc.pages.push(page_b);

        let mut table = build_document_nets(&doc);
        let warnings = resolve_links(&doc, &mut table);
        assert!(warnings.is_empty());

        let net_a = table.net_for_tab(tab_a).unwrap();
        let net_b = table.net_for_tab(tab_b).unwrap();
        assert_ne!(net_a, net_b);
        assert_eq!(table.nets_for_link("BUS1").len(), 2);
    }

    #[test]
    fn singleton_link_emits_a_warning() {
        let mut doc = Document::new("1.0.0");
        let mut page = Page::new("A");
        let tab = switch_with_link(&mut page, "LONELY");
        page.wires.push(Wire {
            id: WireId::generate(),
            start_tab_id: tab,
            end_tab_id: None,
            waypoints: vec![],
            junctions: vec![],
        });
        doc.pages.push(page);

        let mut table = build_document_nets(&doc);
        let warnings = resolve_links(&doc, &mut table);
        assert_eq!(warnings.len(), 1);
    }
}
