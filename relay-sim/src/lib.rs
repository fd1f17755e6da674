//! relay-sim - a relay-logic circuit simulation kernel
//!
//! This library compiles a user-drawn schematic (switches, indicators,
//! relays, power sources, wires) into an internal electrical graph and
//! steps that graph to a stable state whenever an input changes.
//!
//! # Quick Start
//!
//! ```no_run
//! use relay_sim::{Engine, EngineOptions};
//! use std::path::Path;
//!
//! let document = relay_sim::load(Path::new("design.rsim")).unwrap();
//! let mut engine = Engine::start(document, EngineOptions::default()).unwrap();
//! let snapshot = engine.snapshot().unwrap();
//! for vnet in &snapshot.vnets {
//!     println!("{:?}: {:?}", vnet.id, vnet.state);
//! }
//! engine.stop();
//! ```
//!
//! # Features
//!
//! - **Network compilation**: wires and junctions on a page are compiled
//!   into virtual electrical nets (VNETs).
//! - **Cross-page links**: components can join an equipotential bus by
//!   name without a drawn wire.
//! - **Dynamic bridges**: relays and sub-circuit wrappers reconfigure
//!   connectivity at run time.
//! - **Sub-circuits**: reusable template pages are instantiated with
//!   fresh identifiers and wired in through bridges.

pub mod bridge;
pub mod clock;
pub mod dirty;
pub mod engine;
pub mod error;
pub mod format;
pub mod instantiate;
pub mod kernel;
pub mod linker;
pub mod model;
pub mod netbuild;
pub mod vnet;

pub use engine::{Engine, EngineOptions, EngineState, Snapshot, Statistics};
pub use error::{SimError, SimResult, Warning};
pub use format::{load, load_template, save};
pub use model::{
    Component, ComponentId, ComponentKind, Document, Id, Junction, Page, Pin, PinId, SignalState,
    SubCircuitDefinition, Tab, TabId, Wire, Waypoint,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        Component, ComponentKind, Document, Engine, EngineOptions, EngineState, SignalState,
        SimError, SimResult, Snapshot, Statistics, Warning,
    };
}
