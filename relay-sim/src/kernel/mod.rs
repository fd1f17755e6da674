//! Component kernel: the four-operation behavior dispatch called for in
//! SPEC_FULL.md §4.4, §9 in place of a class hierarchy.
//!
//! Each [`ComponentKind`] gets one stateless [`ComponentKernel`]
//! implementation; the mutable data it operates on lives either on the
//! [`Component`] itself (pin/tab state, which is persisted-shape but
//! not persisted) or in the [`runtime::RuntimeTable`] (internal flags
//! that have no structural counterpart, e.g. a switch's `on` bit).

pub mod indicator;
pub mod relay;
pub mod runtime;
pub mod subcircuit;
pub mod switch;
pub mod vcc;

use crate::bridge::BridgeManager;
use crate::clock::SimClock;
use crate::dirty::{DirtySet, RequeueSet};
use crate::error::SimResult;
use crate::model::{Component, ComponentKind, PropertyMap, SignalState};
use crate::vnet::NetTable;
use parking_lot::Mutex;

use self::runtime::RuntimeTable;

/// Everything a [`ComponentKernel`] needs besides the component it is
/// operating on. Borrowed for the duration of one kernel call; never
/// stored.
pub struct KernelContext<'a> {
    pub nets: &'a NetTable,
    pub dirty: &'a DirtySet,
    pub requeue: &'a RequeueSet,
    pub bridges: &'a Mutex<BridgeManager>,
    pub clock: &'a SimClock,
    pub runtime: &'a RuntimeTable,
}

impl KernelContext<'_> {
    /// Writes `state` to `component`'s pin at `pin_index`, propagating to
    /// its tabs and dirtying every VNET any of those tabs belongs to, but
    /// only if the value actually changes (SPEC_FULL.md §4.7: "Any pin
    /// write that differs from the containing VNET's current state
    /// re-marks that VNET dirty").
    pub fn write_pin(&self, component: &mut Component, pin_index: usize, state: SignalState) {
        let Some(pin) = component.pins.get_mut(pin_index) else {
            return;
        };
        if pin.state == state {
            return;
        }
        pin.set_state(state);
        for tab in &pin.tabs {
            if let Some(net_id) = self.nets.net_for_tab(tab.id) {
                self.dirty.mark(net_id);
            }
        }
    }

    /// Requests that `component` be re-evaluated next iteration even
    /// though none of its nets may have changed value — used by a
    /// component with pending internal state (the relay's settling timer,
    /// a switch's `interact` before its pin write lands) to keep the run
    /// loop re-entering it until that state resolves on its own.
    pub fn mark_component_dirty(&self, component: &Component) {
        self.requeue.mark(component.id);
    }
}

/// The four lifecycle operations every component variant implements
/// (SPEC_FULL.md §4.4). Implementations are stateless zero-sized types;
/// all mutable state flows through `component` and `ctx`.
pub trait ComponentKernel: Send + Sync {
    fn on_start(&self, component: &mut Component, ctx: &KernelContext) -> SimResult<()>;
    fn evaluate(&self, component: &mut Component, ctx: &KernelContext) -> SimResult<()>;
    fn interact(
        &self,
        component: &mut Component,
        action: &str,
        params: &PropertyMap,
        ctx: &KernelContext,
    ) -> SimResult<()>;
    fn on_stop(&self, component: &mut Component, ctx: &KernelContext);
}

/// Selects the kernel implementation for a component's type tag.
pub fn kernel_for(kind: ComponentKind) -> &'static dyn ComponentKernel {
    match kind {
        ComponentKind::Switch => &switch::SwitchKernel,
        ComponentKind::Indicator => &indicator::IndicatorKernel,
        ComponentKind::Vcc => &vcc::VccKernel,
        ComponentKind::DpdtRelay => &relay::RelayKernel,
        ComponentKind::SubCircuitInstance => &subcircuit::SubCircuitKernel,
    }
}
