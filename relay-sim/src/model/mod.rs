//! The static schematic data model (SPEC_FULL.md §3).

pub mod component;
pub mod entities;
pub mod ids;
pub mod properties;
pub mod state;

pub use component::{Component, ComponentKind, Rotation, SubCircuitInstanceInfo};
pub use entities::{
    CanvasView, Document, DocumentMetadata, Junction, Page, Pin, Position, SubCircuitDefinition,
    Tab, Waypoint, Wire,
};
pub use ids::{
    check_unique, BridgeId, ComponentId, Id, InstanceId, JunctionId, NetId, PageId, PinId,
    SubCircuitId, TabId, WaypointId, WireId,
};
pub use properties::{validate_properties, PropertyMap, PropertyValue};
pub use state::{combine_all, SignalState};
