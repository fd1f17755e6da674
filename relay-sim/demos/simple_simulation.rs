//! Simple simulation example: load a document (or build one in memory)
//! and print its stable snapshot.
//! Run with: cargo run --example simple_simulation [path/to/design.rsim]

use relay_sim::model::{Component, ComponentKind, Document, Page, Pin, Position, Tab, Wire, WireId};
use relay_sim::{Engine, EngineOptions};
use std::path::Path;

fn switch_and_indicator() -> Document {
    let mut page = Page::new("Main");

    let switch_tab = Tab::new(Position { x: 0.0, y: 0.0 });
    let switch_tab_id = switch_tab.id;
    page.components.push(Component::new(
        ComponentKind::Switch,
        Position { x: 0.0, y: 0.0 },
        vec![Pin::new(vec![switch_tab])],
    ));

    let led_tab = Tab::new(Position { x: 5.0, y: 0.0 });
    let led_tab_id = led_tab.id;
    page.components.push(Component::new(
        ComponentKind::Indicator,
        Position { x: 5.0, y: 0.0 },
        vec![Pin::new(vec![led_tab])],
    ));

    page.wires.push(Wire {
        id: WireId::generate(),
        start_tab_id: switch_tab_id,
        end_tab_id: Some(led_tab_id),
        waypoints: vec![],
        junctions: vec![],
    });

    let mut document = Document::new(relay_sim::format::ENGINE_VERSION);
    document.pages.push(page);
    document
}

fn main() {
    let arg = std::env::args().nth(1);
    let document = match arg {
        Some(path) if Path::new(&path).exists() => relay_sim::load(Path::new(&path)).expect("failed to load document"),
        _ => switch_and_indicator(),
    };

    let engine = Engine::start(document, EngineOptions::default()).expect("simulation failed to stabilize");
    let snapshot = engine.snapshot().expect("engine is stable");

    println!("{} component(s), {} net(s)", snapshot.components.len(), snapshot.vnets.len());
    for vnet in &snapshot.vnets {
        println!("  net {:?}: {:?}", vnet.id, vnet.state);
    }

    for warning in engine.warnings() {
        eprintln!("warning: {}", warning.message);
    }
}
