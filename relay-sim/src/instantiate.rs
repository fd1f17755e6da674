//! Sub-circuit instantiator (SPEC_FULL.md §4.5): clones a template's pages
//! with a fresh identifier for every entity, then builds the
//! `SubCircuitInstance` component whose pins mirror the template's
//! FOOTPRINT Link components.

use std::collections::HashMap;

use crate::error::{SimError, SimResult};
use crate::model::{
    Component, ComponentKind, Document, Id, InstanceId, Page, Pin, Position, SubCircuitDefinition,
    SubCircuitId, SubCircuitInstanceInfo, Tab, Wire,
};

fn remap<T>(mapper: &mut HashMap<Id, Id>, id: T) -> T
where
    T: Into<Id> + From<Id>,
{
    let raw: Id = id.into();
    let new = *mapper.entry(raw).or_insert_with(Id::generate);
    T::from(new)
}

fn remap_wire(wire: &mut Wire, mapper: &mut HashMap<Id, Id>) {
    wire.id = remap(mapper, wire.id);
    wire.start_tab_id = remap(mapper, wire.start_tab_id);
    if let Some(end) = wire.end_tab_id {
        wire.end_tab_id = Some(remap(mapper, end));
    }
    for waypoint in &mut wire.waypoints {
        waypoint.id = remap(mapper, waypoint.id);
    }
    for junction in &mut wire.junctions {
        junction.id = remap(mapper, junction.id);
        for child in &mut junction.child_wires {
            remap_wire(child, mapper);
        }
    }
}

fn remap_component(component: &mut Component, mapper: &mut HashMap<Id, Id>) {
    component.id = remap(mapper, component.id);
    for pin in &mut component.pins {
        pin.id = remap(mapper, pin.id);
        for tab in &mut pin.tabs {
            tab.id = remap(mapper, tab.id);
        }
    }
    if let Some(info) = &mut component.sub_circuit {
        info.instance_id = InstanceId::generate();
        for (pin_id, tab_id) in &mut info.pin_link_tabs {
            *pin_id = remap(mapper, *pin_id);
            *tab_id = remap(mapper, *tab_id);
        }
    }
}

/// Rewrites every id on `page` through `mapper`. Link names are left
/// untouched — SPEC_FULL.md §4.5 requires they survive verbatim so a
/// cross-page link drawn against a template still resolves after cloning.
fn remap_page(page: &mut Page, mapper: &mut HashMap<Id, Id>) {
    page.page_id = remap(mapper, page.page_id);
    for component in &mut page.components {
        remap_component(component, mapper);
    }
    for wire in &mut page.wires {
        remap_wire(wire, mapper);
    }
}

/// Finds an already-embedded definition with the same source path, or
/// deep-clones `template` into `document.sub_circuits` under a fresh id.
fn embed_or_reuse(document: &mut Document, template: &SubCircuitDefinition) -> SubCircuitId {
    if let Some(existing) = document
        .sub_circuits
        .values()
        .find(|def| def.source_path == template.source_path)
    {
        return existing.id;
    }
    let mut def = template.clone();
    def.id = SubCircuitId::generate();
    let id = def.id;
    document.sub_circuits.insert(id, def);
    id
}

/// Instantiates `template` into `document`: embeds (or reuses) the
/// definition, clones its pages with fresh ids, and builds the
/// `SubCircuitInstance` component. The cloned pages are appended to
/// `document.pages`; the caller places the returned component onto
/// whichever host page it belongs on.
pub fn instantiate(
    document: &mut Document,
    template: &SubCircuitDefinition,
    at: Position,
) -> SimResult<Component> {
    let definition_id = embed_or_reuse(document, template);
    let definition = document
        .sub_circuits
        .get(&definition_id)
        .expect("just inserted or found above")
        .clone();

    let mut mapper: HashMap<Id, Id> = HashMap::new();
    let instance_id = InstanceId::generate();

    let mut footprint = definition.footprint_page.clone();
    remap_page(&mut footprint, &mut mapper);
    footprint.is_sub_circuit_page = true;
    footprint.parent_instance_id = Some(instance_id);
    footprint.parent_sub_circuit_id = Some(definition_id);

    let mut internal_pages = Vec::with_capacity(definition.internal_pages.len());
    for page in &definition.internal_pages {
        let mut cloned = page.clone();
        remap_page(&mut cloned, &mut mapper);
        cloned.is_sub_circuit_page = true;
        cloned.parent_instance_id = Some(instance_id);
        cloned.parent_sub_circuit_id = Some(definition_id);
        internal_pages.push(cloned);
    }

    let mut pins = Vec::new();
    let mut pin_link_tabs = Vec::new();
    for link_component in footprint
        .components
        .iter()
        .filter(|c| c.link_name.as_deref().is_some_and(|n| !n.is_empty()))
    {
        let Some(link_tab) = link_component.pins.first().and_then(|p| p.tabs.first()) else {
            continue;
        };
        let tab = Tab::new(link_component.position);
        let pin = Pin::new(vec![tab]);
        pin_link_tabs.push((pin.id, link_tab.id));
        pins.push(pin);
    }

    if pins.is_empty() {
        return Err(SimError::Structural(format!(
            "sub-circuit template {} has no FOOTPRINT link components",
            template.source_path
        )));
    }

    let mut instance = Component::new(ComponentKind::SubCircuitInstance, at, pins);
    instance.sub_circuit = Some(SubCircuitInstanceInfo {
        definition_id,
        instance_id,
        pin_link_tabs,
    });

    document.pages.push(footprint);
    document.pages.append(&mut internal_pages);

    Ok(instance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ComponentKind, Pin, Position, Tab};

    fn latch_template() -> SubCircuitDefinition {
        let mut footprint = Page::new("FOOTPRINT");
        let in_tab = Tab::new(Position { x: 0.0, y: 0.0 });
        let in_pin = Pin::new(vec![in_tab]);
        let link_in =
            Component::new(ComponentKind::Indicator, Position { x: 0.0, y: 0.0 }, vec![in_pin])
                .with_link_name("SUB_IN");
        let out_tab = Tab::new(Position { x: 1.0, y: 0.0 });
        let out_pin = Pin::new(vec![out_tab]);
        let link_out =
            Component::new(ComponentKind::Indicator, Position { x: 1.0, y: 0.0 }, vec![out_pin])
                .with_link_name("SUB_OUT");
        footprint.components.push(link_in);
        footprint.components.push(link_out);

        SubCircuitDefinition {
            id: SubCircuitId::generate(),
            source_path: "Latch.rsub".to_string(),
            footprint_page: footprint,
            internal_pages: vec![Page::new("Internal")],
        }
    }

    #[test]
    fn two_instantiations_produce_disjoint_ids() {
        let mut document = Document::new("1.0.0");
        let template = latch_template();

        let instance_a = instantiate(&mut document, &template, Position { x: 0.0, y: 0.0 }).unwrap();
        let instance_b = instantiate(&mut document, &template, Position { x: 10.0, y: 0.0 }).unwrap();

        assert_ne!(instance_a.id, instance_b.id);
        assert_eq!(document.sub_circuits.len(), 1, "template reused, not duplicated");
        assert_eq!(document.pages.len(), 4, "two footprint + two internal clones");

        let all_ids = document.all_ids();
        let mut seen = std::collections::HashSet::new();
        assert!(all_ids.iter().all(|id| seen.insert(*id)));
    }

    #[test]
    fn link_names_survive_cloning() {
        let mut document = Document::new("1.0.0");
        let template = latch_template();
        let instance = instantiate(&mut document, &template, Position { x: 0.0, y: 0.0 }).unwrap();

        assert_eq!(instance.pins.len(), 2);
        let footprint_index = document.pages.len() - 2;
        let cloned_footprint = &document.pages[footprint_index];
        let names: Vec<_> = cloned_footprint
            .components
            .iter()
            .filter_map(|c| c.link_name.clone())
            .collect();
        assert!(names.contains(&"SUB_IN".to_string()) || names.contains(&"SUB_OUT".to_string()));
    }
}
