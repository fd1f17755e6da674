//! Static topology entities: the parts of a [`Document`] that are edited
//! by hand and persisted to a `.rsim`/`.rsub` file (SPEC_FULL.md §3, §6).
//!
//! Entities reference each other by id rather than by pointer — the
//! "arena-plus-index" pattern called for in SPEC_FULL.md §9 to avoid
//! cyclic/bidirectional references in a systems language.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::component::Component;
use super::ids::{ComponentId, JunctionId, PageId, PinId, SubCircuitId, TabId, WaypointId, WireId};
use super::state::SignalState;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A physical connection point, owned by exactly one [`Pin`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tab {
    pub id: TabId,
    pub position: Position,
    /// Mirrors the owning pin's state; never persisted.
    #[serde(skip)]
    pub state: SignalState,
}

impl Tab {
    pub fn new(position: Position) -> Self {
        Self {
            id: TabId::generate(),
            position,
            state: SignalState::Float,
        }
    }
}

/// A logical electrical terminal. Owns one or more [`Tab`]s, all of which
/// always mirror the pin's state (SPEC_FULL.md §3 "Pin coherence").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pin {
    pub id: PinId,
    pub tabs: Vec<Tab>,
    #[serde(skip)]
    pub state: SignalState,
}

impl Pin {
    pub fn new(tabs: Vec<Tab>) -> Self {
        Self {
            id: PinId::generate(),
            tabs,
            state: SignalState::Float,
        }
    }

    /// Sets the pin's state and propagates it to every owned tab.
    pub fn set_state(&mut self, state: SignalState) {
        self.state = state;
        for tab in &mut self.tabs {
            tab.state = state;
        }
    }
}

/// A visual-only routing point on a [`Wire`]. No electrical effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: WaypointId,
    pub position: Position,
}

/// A branch point: electrically joins every wire reachable through it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Junction {
    pub id: JunctionId,
    pub position: Position,
    pub child_wires: Vec<Wire>,
}

/// A page-local connection between two tabs, possibly routed through
/// waypoints and terminating in a junction instead of a second tab.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wire {
    pub id: WireId,
    pub start_tab_id: TabId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_tab_id: Option<TabId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub waypoints: Vec<Waypoint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub junctions: Vec<Junction>,
}

/// Canvas view state the GUI owns but the kernel round-trips unchanged.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CanvasView {
    #[serde(default)]
    pub canvas_x: f64,
    #[serde(default)]
    pub canvas_y: f64,
    #[serde(default = "default_zoom")]
    pub canvas_zoom: f64,
}

fn default_zoom() -> f64 {
    1.0
}

/// A single schematic sheet: components, wires, and the sub-circuit
/// backlinks used when this page is a clone of a template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub page_id: PageId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Component>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wires: Vec<Wire>,
    #[serde(flatten)]
    pub view: CanvasView,
    #[serde(default)]
    pub is_sub_circuit_page: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_instance_id: Option<super::ids::InstanceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_sub_circuit_id: Option<SubCircuitId>,
}

impl Page {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            page_id: PageId::generate(),
            name: name.into(),
            components: Vec::new(),
            wires: Vec::new(),
            view: CanvasView::default(),
            is_sub_circuit_page: false,
            parent_instance_id: None,
            parent_sub_circuit_id: None,
        }
    }

    /// Looks up a tab anywhere on this page (component pins only; wires
    /// reference tab ids but do not own them).
    pub fn find_tab(&self, tab_id: TabId) -> Option<&Tab> {
        self.components
            .iter()
            .flat_map(|c| c.pins.iter())
            .flat_map(|p| p.tabs.iter())
            .find(|t| t.id == tab_id)
    }

    pub fn find_tab_mut(&mut self, tab_id: TabId) -> Option<&mut Tab> {
        self.components
            .iter_mut()
            .flat_map(|c| c.pins.iter_mut())
            .flat_map(|p| p.tabs.iter_mut())
            .find(|t| t.id == tab_id)
    }

    pub fn component_owning_tab(&self, tab_id: TabId) -> Option<ComponentId> {
        self.components
            .iter()
            .find(|c| c.pins.iter().any(|p| p.tabs.iter().any(|t| t.id == tab_id)))
            .map(|c| c.id)
    }
}

/// A sub-circuit template: the pages cloned into every instantiation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubCircuitDefinition {
    pub id: SubCircuitId,
    pub source_path: String,
    pub footprint_page: Page,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub internal_pages: Vec<Page>,
}

impl SubCircuitDefinition {
    pub fn all_pages(&self) -> impl Iterator<Item = &Page> {
        std::iter::once(&self.footprint_page).chain(self.internal_pages.iter())
    }
}

/// Top-level id-space owner: pages plus embedded sub-circuit definitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DocumentMetadata>,
    pub pages: Vec<Page>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub sub_circuits: HashMap<SubCircuitId, SubCircuitDefinition>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<chrono::DateTime<chrono::Utc>>,
}

impl Document {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            metadata: None,
            pages: Vec::new(),
            sub_circuits: HashMap::new(),
        }
    }

    pub fn page(&self, id: PageId) -> Option<&Page> {
        self.pages.iter().find(|p| p.page_id == id)
    }

    pub fn page_mut(&mut self, id: PageId) -> Option<&mut Page> {
        self.pages.iter_mut().find(|p| p.page_id == id)
    }

    /// Every entity id in the document, used to check the document-wide
    /// uniqueness invariant (SPEC_FULL.md §3).
    pub fn all_ids(&self) -> Vec<super::ids::Id> {
        let mut ids = Vec::new();
        for page in self.pages.iter().chain(
            self.sub_circuits
                .values()
                .flat_map(|def| def.all_pages()),
        ) {
            ids.push(page.page_id.raw());
            collect_page_ids(page, &mut ids);
        }
        ids
    }
}

fn collect_page_ids(page: &Page, ids: &mut Vec<super::ids::Id>) {
    for component in &page.components {
        ids.push(component.id.raw());
        for pin in &component.pins {
            ids.push(pin.id.raw());
            for tab in &pin.tabs {
                ids.push(tab.id.raw());
            }
        }
    }
    for wire in &page.wires {
        collect_wire_ids(wire, ids);
    }
}

fn collect_wire_ids(wire: &Wire, ids: &mut Vec<super::ids::Id>) {
    ids.push(wire.id.raw());
    for waypoint in &wire.waypoints {
        ids.push(waypoint.id.raw());
    }
    for junction in &wire.junctions {
        ids.push(junction.id.raw());
        for child in &junction.child_wires {
            collect_wire_ids(child, ids);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_set_state_propagates_to_tabs() {
        let mut pin = Pin::new(vec![
            Tab::new(Position { x: 0.0, y: 0.0 }),
            Tab::new(Position { x: 1.0, y: 0.0 }),
        ]);
        pin.set_state(SignalState::High);
        assert!(pin.tabs.iter().all(|t| t.state == SignalState::High));
    }

    #[test]
    fn document_all_ids_are_unique_for_fresh_page() {
        let mut page = Page::new("Main");
        page.wires.push(Wire {
            id: WireId::generate(),
            start_tab_id: TabId::generate(),
            end_tab_id: None,
            waypoints: vec![],
            junctions: vec![],
        });
        let mut doc = Document::new("1.0.0");
        doc.pages.push(page);
        let ids = doc.all_ids();
        let mut seen = std::collections::HashSet::new();
        assert!(ids.iter().all(|id| seen.insert(*id)));
    }
}
