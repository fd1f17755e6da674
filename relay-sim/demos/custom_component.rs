//! Example: building a document from the model API directly and
//! instantiating a sub-circuit template, bypassing the `.rsim`/`.rsub`
//! file loader entirely.
//! Run with: cargo run --example custom_component

use relay_sim::instantiate::instantiate;
use relay_sim::model::{
    Component, ComponentKind, Document, Page, Pin, Position, SubCircuitDefinition, SubCircuitId, Tab,
};
use relay_sim::{Engine, EngineOptions};

fn vcc_relay_template() -> SubCircuitDefinition {
    let mut footprint = Page::new("FOOTPRINT");

    let out_tab = Tab::new(Position { x: 1.0, y: 0.0 });
    let out_tab_id = out_tab.id;
    footprint.components.push(
        Component::new(ComponentKind::Indicator, Position { x: 1.0, y: 0.0 }, vec![Pin::new(vec![out_tab])])
            .with_link_name("SUB_OUT"),
    );

    let vcc_tab = Tab::new(Position { x: 0.0, y: 1.0 });
    let vcc_tab_id = vcc_tab.id;
    footprint.components.push(Component::new(
        ComponentKind::Vcc,
        Position { x: 0.0, y: 1.0 },
        vec![Pin::new(vec![vcc_tab])],
    ));
    footprint.wires.push(relay_sim::model::Wire {
        id: relay_sim::model::WireId::generate(),
        start_tab_id: vcc_tab_id,
        end_tab_id: Some(out_tab_id),
        waypoints: vec![],
        junctions: vec![],
    });

    SubCircuitDefinition {
        id: SubCircuitId::generate(),
        source_path: "PowerCell.rsub".to_string(),
        footprint_page: footprint,
        internal_pages: vec![],
    }
}

fn main() {
    let mut document = Document::new(relay_sim::format::ENGINE_VERSION);
    document.pages.push(Page::new("Main"));

    let template = vcc_relay_template();
    let instance_a = instantiate(&mut document, &template, Position { x: 0.0, y: 0.0 }).unwrap();
    let instance_b = instantiate(&mut document, &template, Position { x: 10.0, y: 0.0 }).unwrap();
    document.pages[0].components.push(instance_a);
    document.pages[0].components.push(instance_b);

    let engine = Engine::start(document, EngineOptions::default()).expect("simulation failed to stabilize");
    let snapshot = engine.snapshot().expect("engine is stable");

    println!("{} component(s) total, {} net(s)", snapshot.components.len(), snapshot.vnets.len());
    for vnet in &snapshot.vnets {
        println!("  net {:?}: {:?}", vnet.id, vnet.state);
    }
}
