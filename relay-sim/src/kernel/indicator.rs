//! Indicator (LED) kernel (SPEC_FULL.md §4.4 "Indicator"): purely passive,
//! never writes a pin.

use crate::error::SimResult;
use crate::model::{Component, PropertyMap};

use super::{ComponentKernel, KernelContext};

pub struct IndicatorKernel;

impl ComponentKernel for IndicatorKernel {
    fn on_start(&self, _component: &mut Component, _ctx: &KernelContext) -> SimResult<()> {
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
