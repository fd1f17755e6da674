//! Component structural data (SPEC_FULL.md §3 "Component", §4.4).
//!
//! A [`Component`] only carries the data every variant shares plus its
//! type tag; the behavior that differs per variant (evaluate, on_start,
//! on_stop, interact) is dispatched through [`crate::kernel`] rather than
//! through an inheritance hierarchy (SPEC_FULL.md §9).

use serde::{Deserialize, Serialize};

use super::entities::{Pin, Position};
use super::ids::{ComponentId, InstanceId, PinId, SubCircuitId, TabId};
use super::properties::PropertyMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    R0 = 0,
    R90 = 90,
    R180 = 180,
    R270 = 270,
}

impl Default for Rotation {
    fn default() -> Self {
        Rotation::R0
    }
}

/// The type tag that selects which [`crate::kernel::ComponentKernel`]
/// dispatches for a component. This is the "tagged-variant enum" called
/// for in SPEC_FULL.md §9 in place of a class hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Switch,
    Indicator,
    Vcc,
    DpdtRelay,
    SubCircuitInstance,
}

impl ComponentKind {
    pub fn expected_pin_count(self) -> Option<usize> {
        match self {
            ComponentKind::Switch => Some(1),
            ComponentKind::Indicator => Some(1),
            ComponentKind::Vcc => Some(1),
            ComponentKind::DpdtRelay => Some(7),
            ComponentKind::SubCircuitInstance => None,
        }
    }
}

/// Wiring data specific to a [`ComponentKind::SubCircuitInstance`]
/// (SPEC_FULL.md §4.4, §4.5): for each external pin, which tab on the
/// cloned FOOTPRINT page's matching Link component it bridges to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubCircuitInstanceInfo {
    pub definition_id: SubCircuitId,
    pub instance_id: InstanceId,
    pub pin_link_tabs: Vec<(PinId, TabId)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    pub id: ComponentId,
    pub kind: ComponentKind,
    pub position: Position,
    #[serde(default)]
    pub rotation: Rotation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_name: Option<String>,
    pub pins: Vec<Pin>,
    #[serde(default, skip_serializing_if = "PropertyMap::is_default")]
    pub properties: PropertyMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_circuit: Option<SubCircuitInstanceInfo>,
}

impl Component {
    pub fn new(kind: ComponentKind, position: Position, pins: Vec<Pin>) -> Self {
        Self {
            id: ComponentId::generate(),
            kind,
            position,
            rotation: Rotation::default(),
            link_name: None,
            pins,
            properties: PropertyMap::new(),
            sub_circuit: None,
        }
    }

    pub fn with_link_name(mut self, name: impl Into<String>) -> Self {
        self.link_name = Some(name.into());
        self
    }

    pub fn tab_ids(&self) -> impl Iterator<Item = TabId> + '_ {
        self.pins.iter().flat_map(|p| p.tabs.iter().map(|t| t.id))
    }
}
