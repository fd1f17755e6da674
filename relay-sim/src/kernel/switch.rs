//! Switch / pushbutton kernel (SPEC_FULL.md §4.4 "Switch").

use crate::error::SimResult;
use crate::model::{Component, PropertyMap, SignalState};

use super::runtime::RuntimeState;
use super::{ComponentKernel, KernelContext};

pub struct SwitchKernel;

impl ComponentKernel for SwitchKernel {
    fn on_start(&self, component: &mut Component, ctx: &KernelContext) -> SimResult<()> {
        ctx.runtime.init(component.id, RuntimeState::Switch { on: false });
        ctx.write_pin(component, 0, SignalState::Float);
        Ok(())
    }

    fn evaluate(&self, component: &mut Component, ctx: &KernelContext) -> SimResult<()> {
        let on = ctx
            .runtime
            .with(component.id, |state| matches!(state, RuntimeState::Switch { on: true }))
            .unwrap_or(false);
        ctx.write_pin(component, 0, if on { SignalState::High } else { SignalState::Float });
        Ok(())
    }

    fn interact(
        &self,
        component: &mut Component,
        action: &str,
        _params: &PropertyMap,
        ctx: &KernelContext,
    ) -> SimResult<()> {
        ctx.runtime.with(component.id, |state| {
            let RuntimeState::Switch { on } = state else {
                return;
            };
            match action {
                "toggle" => *on = !*on,
                "press" => *on = true,
                "release" => *on = false,
                _ => {}
            }
        });
        ctx.mark_component_dirty(component);
        Ok(())
    }

    fn on_stop(&self, component: &mut Component, ctx: &KernelContext) {
        ctx.runtime.remove(component.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::BridgeManager;
    use crate::clock::SimClock;
    use crate::dirty::{DirtySet, RequeueSet};
    use crate::kernel::runtime::RuntimeTable;
    use crate::model::{ComponentKind, Pin, Position, Tab};
    use crate::vnet::NetTable;
    use parking_lot::Mutex;

    fn fixture() -> (Component, NetTable, DirtySet, RequeueSet, Mutex<BridgeManager>, SimClock, RuntimeTable) {
        let tab = Tab::new(Position { x: 0.0, y: 0.0 });
        let pin = Pin::new(vec![tab]);
        let component = Component::new(ComponentKind::Switch, Position { x: 0.0, y: 0.0 }, vec![pin]);
        (
            component,
            NetTable::new(),
            DirtySet::new(),
            RequeueSet::new(),
            Mutex::new(BridgeManager::new()),
            SimClock::new(),
            RuntimeTable::new(),
        )
    }

    #[test]
    fn toggle_twice_returns_to_original_state() {
        let (mut component, nets, dirty, requeue, bridges, clock, runtime) = fixture();
        let ctx = KernelContext {
            nets: &nets,
            dirty: &dirty,
            requeue: &requeue,
            bridges: &bridges,
            clock: &clock,
            runtime: &runtime,
        };
        let kernel = SwitchKernel;
        kernel.on_start(&mut component, &ctx).unwrap();
        kernel.evaluate(&mut component, &ctx).unwrap();
        assert_eq!(component.pins[0].state, SignalState::Float);

        kernel.interact(&mut component, "toggle", &PropertyMap::new(), &ctx).unwrap();
        kernel.evaluate(&mut component, &ctx).unwrap();
        assert_eq!(component.pins[0].state, SignalState::High);

        kernel.interact(&mut component, "toggle", &PropertyMap::new(), &ctx).unwrap();
        kernel.evaluate(&mut component, &ctx).unwrap();
        assert_eq!(component.pins[0].state, SignalState::Float);
    }
}
