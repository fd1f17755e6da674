//! Concurrency layer (SPEC_FULL.md §4.8, §5): single-threaded and
//! `rayon`-backed implementations of the evaluate/execute phases, chosen
//! by a factory keyed on component count.
//!
//! Both phases are safe to parallelize without `unsafe`: the evaluate
//! phase only reads shared state and writes through each VNET's own
//! `parking_lot::Mutex`; the execute phase mutates components through
//! nested `par_iter_mut()` over `&mut [Page]` and `&mut [Component]`,
//! which the borrow checker already proves disjoint.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;

use crate::bridge::BridgeManager;
use crate::error::Warning;
use crate::kernel::{kernel_for, KernelContext};
use crate::model::{Component, ComponentId, NetId, Page, SignalState, TabId};
use crate::vnet::NetTable;

/// Selects single-threaded or parallel execution. `Auto` defers to the
/// factory's component-count threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcurrencyMode {
    Auto,
    SingleThreaded,
    Parallel,
}

impl Default for ConcurrencyMode {
    fn default() -> Self {
        ConcurrencyMode::Auto
    }
}

/// Owns the worker pool for parallel mode, or nothing in single-threaded
/// mode. §5: 4 workers for components + 2 for VNET evaluation by default;
/// modeled here as one pool sized to their sum, since rayon schedules
/// both phases' work onto the same pool serially (a barrier separates
/// them, so there is no contention between the two workloads).
pub enum Concurrency {
    SingleThreaded,
    Parallel(rayon::ThreadPool),
}

impl Concurrency {
    pub fn build(mode: ConcurrencyMode, component_count: usize, threshold: usize) -> Self {
        let parallel = match mode {
            ConcurrencyMode::SingleThreaded => false,
            ConcurrencyMode::Parallel => true,
            ConcurrencyMode::Auto => component_count >= threshold,
        };
        if !parallel {
            return Concurrency::SingleThreaded;
        }
        match rayon::ThreadPoolBuilder::new().num_threads(6).build() {
            Ok(pool) => Concurrency::Parallel(pool),
            Err(_) => Concurrency::SingleThreaded,
        }
    }

    /// Evaluate phase: recombines every dirty VNET's aggregate state from
    /// its member tabs, linked VNETs, and bridged VNETs. Returns only the
    /// ids whose aggregate value actually changed (SPEC_FULL.md §4.6:
    /// "If newState != V.state ... propagate ... note each Component") —
    /// a dirty mark means "re-evaluate", not "expect a different answer".
    pub fn recombine(
        &self,
        dirty_nets: &[NetId],
        nets: &NetTable,
        bridges: &BridgeManager,
        tab_states: &HashMap<TabId, SignalState>,
    ) -> Vec<NetId> {
        let compute_one = |net_id: &NetId| -> (NetId, SignalState) {
            let Some(net) = nets.get(*net_id) else {
                return (*net_id, SignalState::Float);
            };
            let mut acc = SignalState::Float;
            for tab in net.tabs() {
                if let Some(state) = tab_states.get(&tab) {
                    acc = acc.combine(*state);
                }
            }
            for link_name in net.links() {
                for other_id in nets.nets_for_link(&link_name) {
                    if *other_id != *net_id {
                        if let Some(other) = nets.get(*other_id) {
                            acc = acc.combine(other.state());
                        }
                    }
                }
            }
            for bridge_id in net.bridges() {
                if let Some(other_id) = bridges.other_endpoint(bridge_id, *net_id) {
                    if let Some(other) = nets.get(other_id) {
                        acc = acc.combine(other.state());
                    }
                }
            }
            (*net_id, acc)
        };

        let computed: Vec<(NetId, SignalState)> = match self {
            Concurrency::SingleThreaded => dirty_nets.iter().map(compute_one).collect(),
            Concurrency::Parallel(pool) => {
                pool.install(|| dirty_nets.par_iter().map(compute_one).collect())
            }
        };

        computed
            .into_iter()
            .filter_map(|(net_id, new_state)| {
                let changed = nets.get(net_id)?.set_state(new_state);
                changed.then_some(net_id)
            })
            .collect()
    }

    /// Execute phase: runs `evaluate` on every component in `noted`.
    /// A component whose `evaluate` returns `Err` is skipped for this
    /// iteration and reported as a warning; the run continues.
    pub fn execute(
        &self,
        pages: &mut [Page],
        noted: &HashSet<ComponentId>,
        ctx: &KernelContext,
        warnings: &parking_lot::Mutex<Vec<Warning>>,
    ) -> usize {
        let run_one = |component: &mut Component| {
            let kernel = kernel_for(component.kind);
            if let Err(err) = kernel.evaluate(component, ctx) {
                warnings
                    .lock()
                    .push(Warning::component_evaluate_failed(component.id, &err.to_string()));
            }
        };

        match self {
            Concurrency::SingleThreaded => {
                let mut count = 0;
                for page in pages.iter_mut() {
                    for component in page.components.iter_mut() {
                        if noted.contains(&component.id) {
                            run_one(component);
                            count += 1;
                        }
                    }
                }
                count
            }
            Concurrency::Parallel(pool) => pool.install(|| {
                pages
                    .par_iter_mut()
                    .map(|page| {
                        let matches: Vec<&mut Component> = page
                            .components
                            .iter_mut()
                            .filter(|c| noted.contains(&c.id))
                            .collect();
                        let count = matches.len();
                        matches.into_par_iter().for_each(|component| run_one(component));
                        count
                    })
                    .sum()
            }),
        }
    }
}
