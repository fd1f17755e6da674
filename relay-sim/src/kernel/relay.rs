//! DPDT relay kernel (SPEC_FULL.md §4.4 "DPDT Relay").
//!
//! Pin order: COIL, COM1, NO1, NC1, COM2, NO2, NC2. The coil timer is
//! tick-based and collapsing (SPEC_FULL.md §9 open-question resolution):
//! a reversal while a transition is pending cancels it outright instead
//! of queuing a second transition.

use crate::error::SimResult;
use crate::model::{Component, PropertyMap};

use super::runtime::{PendingTransition, RelayState, RuntimeState};
use super::{ComponentKernel, KernelContext};

const COIL: usize = 0;
const COM1: usize = 1;
const NO1: usize = 2;
const NC1: usize = 3;
const COM2: usize = 4;
const NO2: usize = 5;
const NC2: usize = 6;

pub struct RelayKernel;

impl RelayKernel {
    fn pole_tab(component: &Component, pin_index: usize) -> Option<crate::model::TabId> {
        component.pins.get(pin_index)?.tabs.first().map(|t| t.id)
    }
}

impl ComponentKernel for RelayKernel {
    fn on_start(&self, component: &mut Component, ctx: &KernelContext) -> SimResult<()> {
        let com1 = Self::pole_tab(component, COM1).and_then(|t| ctx.nets.net_for_tab(t));
        let nc1 = Self::pole_tab(component, NC1).and_then(|t| ctx.nets.net_for_tab(t));
        let com2 = Self::pole_tab(component, COM2).and_then(|t| ctx.nets.net_for_tab(t));
        let nc2 = Self::pole_tab(component, NC2).and_then(|t| ctx.nets.net_for_tab(t));

        let mut relay = RelayState::default();
        let mut bridges = ctx.bridges.lock();
        if let (Some(a), Some(b)) = (com1, nc1) {
            relay.bridge_pole1 = Some(bridges.create(a, b, component.id, ctx.nets, ctx.dirty));
        }
        if let (Some(a), Some(b)) = (com2, nc2) {
            relay.bridge_pole2 = Some(bridges.create(a, b, component.id, ctx.nets, ctx.dirty));
        }
        drop(bridges);

        ctx.runtime.init(component.id, RuntimeState::Relay(relay));
        Ok(())
    }

    fn evaluate(&self, component: &mut Component, ctx: &KernelContext) -> SimResult<()> {
        let coil_high = component.pins[COIL].state.is_high();
        let now = ctx.clock.now();
        let ticks_to_settle = component.properties.get_int_or("ticks_to_settle", 10).max(1) as u64;

        let mut just_settled: Option<bool> = None;
        let still_pending = ctx.runtime.with(component.id, |state| {
            let RuntimeState::Relay(relay) = state else {
                return false;
            };
            match relay.pending {
                None => {
                    if coil_high != relay.energized {
                        relay.pending = Some(PendingTransition {
                            target_energized: coil_high,
                            deadline: now.plus(ticks_to_settle),
                        });
                    }
                }
                Some(pending) => {
                    if pending.target_energized != coil_high {
                        // Coil reverted before the timer fired: collapse.
                        relay.pending = None;
                    } else if now >= pending.deadline {
                        relay.energized = pending.target_energized;
                        relay.pending = None;
                        just_settled = Some(relay.energized);
                    }
                }
            }
            relay.pending.is_some()
        }).unwrap_or(false);

        // A pending transition needs this component re-evaluated every
        // tick until the deadline passes, even though nothing else
        // redirties its nets; requeue itself to keep the loop advancing.
        if still_pending {
            ctx.mark_component_dirty(component);
        }

        if let Some(energized) = just_settled {
            if let Some(RuntimeState::Relay(relay)) = ctx.runtime.get_clone(component.id) {
                let com1 = Self::pole_tab(component, COM1).and_then(|t| ctx.nets.net_for_tab(t));
                let no1 = Self::pole_tab(component, NO1).and_then(|t| ctx.nets.net_for_tab(t));
                let nc1 = Self::pole_tab(component, NC1).and_then(|t| ctx.nets.net_for_tab(t));
                let com2 = Self::pole_tab(component, COM2).and_then(|t| ctx.nets.net_for_tab(t));
                let no2 = Self::pole_tab(component, NO2).and_then(|t| ctx.nets.net_for_tab(t));
                let nc2 = Self::pole_tab(component, NC2).and_then(|t| ctx.nets.net_for_tab(t));

                let mut bridges = ctx.bridges.lock();
                if let (Some(bridge), Some(no1), Some(nc1)) = (relay.bridge_pole1, no1, nc1) {
                    let (old, new) = if energized { (nc1, no1) } else { (no1, nc1) };
                    bridges.move_endpoint(bridge, old, new, ctx.nets, ctx.dirty);
                }
                if let (Some(bridge), Some(no2), Some(nc2)) = (relay.bridge_pole2, no2, nc2) {
                    let (old, new) = if energized { (nc2, no2) } else { (no2, nc2) };
                    bridges.move_endpoint(bridge, old, new, ctx.nets, ctx.dirty);
                }
                let _ = com1;
                let _ = com2;
            }
        }
        Ok(())
    }

    fn interact(
        &self,
        _component: &mut Component,
        _action: &str,
        _params: &PropertyMap,
        _ctx: &KernelContext,
    ) -> SimResult<()> {
        Ok(())
    }

    fn on_stop(&self, component: &mut Component, ctx: &KernelContext) {
        ctx.runtime.remove(component.id);
    }
}
