//! Vcc (power source) kernel (SPEC_FULL.md §4.4 "Vcc").

use crate::error::SimResult;
use crate::model::{Component, PropertyMap, SignalState};

use super::{ComponentKernel, KernelContext};

pub struct VccKernel;

impl ComponentKernel for VccKernel {
    fn on_start(&self, component: &mut Component, ctx: &KernelContext) -> SimResult<()> {
        ctx.write_pin(component, 0, SignalState::High);
        Ok(())
    }

    fn evaluate(&self, component: &mut Component, ctx: &KernelContext) -> SimResult<()> {
        ctx.write_pin(component, 0, SignalState::High);
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
