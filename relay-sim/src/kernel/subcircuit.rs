//! Sub-circuit instance kernel (SPEC_FULL.md §4.4 "SubCircuitInstance"):
//! a transparent wrapper. All the work happens in the cloned internal
//! pages; this kernel only wires the external pins to the corresponding
//! internal Link tabs via bridges.

use crate::error::SimResult;
use crate::model::{Component, PropertyMap};

use super::{ComponentKernel, KernelContext};

pub struct SubCircuitKernel;

impl ComponentKernel for SubCircuitKernel {
    fn on_start(&self, component: &mut Component, ctx: &KernelContext) -> SimResult<()> {
        let Some(info) = component.sub_circuit.clone() else {
            return Ok(());
        };
        let mut bridges = ctx.bridges.lock();
        for (pin_id, link_tab_id) in &info.pin_link_tabs {
            let Some(pin) = component.pins.iter().find(|p| p.id == *pin_id) else {
                continue;
            };
            let Some(external_tab) = pin.tabs.first() else {
                continue;
            };
            let external_net = ctx.nets.net_for_tab(external_tab.id);
            let internal_net = ctx.nets.net_for_tab(*link_tab_id);
            if let (Some(a), Some(b)) = (external_net, internal_net) {
                bridges.create(a, b, component.id, ctx.nets, ctx.dirty);
            }
        }
        Ok(())
    }

    fn evaluate(&self, _component: &mut Component, _ctx: &KernelContext) -> SimResult<()> {
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

    fn on_stop(&self, _component: &mut Component, _ctx: &KernelContext) {}
}
