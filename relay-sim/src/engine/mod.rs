//! Simulation loop (SPEC_FULL.md §4.7): owns the document, the VNETs,
//! bridges, and dirty set for one run, and drives them to stability.

pub mod concurrency;

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;

use crate::bridge::BridgeManager;
use crate::clock::SimClock;
use crate::dirty::{DirtySet, RequeueSet};
use crate::error::{SimError, SimResult, Warning};
use crate::kernel::runtime::RuntimeTable;
use crate::kernel::{kernel_for, KernelContext};
use crate::linker;
use crate::model::{
    check_unique, validate_properties, Component, ComponentId, ComponentKind, Document, NetId,
    PageId, Position, PropertyMap, SignalState, TabId,
};
use crate::netbuild;
use crate::vnet::{NetTable, VnetSummary};

pub use concurrency::{Concurrency, ConcurrencyMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Initializing,
    Unstable,
    Stable,
    Stopping,
}

#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub oscillation_iteration_cap: usize,
    pub timeout: Duration,
    pub concurrency: ConcurrencyMode,
    pub parallel_component_threshold: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            oscillation_iteration_cap: 50,
            timeout: Duration::from_secs(10),
            concurrency: ConcurrencyMode::Auto,
            parallel_component_threshold: 2000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Outcome {
    #[default]
    NotRun,
    Stable,
    Oscillation,
    Timeout,
}

#[derive(Debug, Clone, Default)]
pub struct Statistics {
    pub iterations: usize,
    pub wall_time: Duration,
    pub components_evaluated: usize,
    pub dirty_peak: usize,
    pub last_outcome: Outcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentSnapshot {
    pub id: ComponentId,
    pub kind: ComponentKind,
    pub position: Position,
    pub pin_states: Vec<SignalState>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub components: Vec<ComponentSnapshot>,
    pub vnets: Vec<VnetSummary>,
}

pub struct Engine {
    document: Document,
    nets: NetTable,
    bridges: Mutex<BridgeManager>,
    dirty: DirtySet,
    requeue: RequeueSet,
    clock: SimClock,
    runtime: RuntimeTable,
    tab_owner: HashMap<TabId, ComponentId>,
    state: EngineState,
    options: EngineOptions,
    stats: Statistics,
    warnings: Mutex<Vec<Warning>>,
    concurrency: Concurrency,
    on_stable: Vec<Box<dyn Fn(&Snapshot) + Send + Sync>>,
    on_unstable: Vec<Box<dyn Fn() + Send + Sync>>,
}

fn find_component_mut(document: &mut Document, id: ComponentId) -> Option<&mut Component> {
    document
        .pages
        .iter_mut()
        .flat_map(|p| p.components.iter_mut())
        .find(|c| c.id == id)
}

fn build_tab_owner(document: &Document) -> HashMap<TabId, ComponentId> {
    let mut owner = HashMap::new();
    for page in &document.pages {
        for component in &page.components {
            for tab in component.tab_ids() {
                owner.insert(tab, component.id);
            }
        }
    }
    owner
}

fn snapshot_tab_states(document: &Document) -> HashMap<TabId, SignalState> {
    let mut states = HashMap::new();
    for page in &document.pages {
        for component in &page.components {
            for pin in &component.pins {
                for tab in &pin.tabs {
                    states.insert(tab.id, tab.state);
                }
            }
        }
    }
    states
}

fn propagate_to_tabs(document: &mut Document, page_id: PageId, tabs: &[TabId], state: SignalState) {
    let Some(page) = document.page_mut(page_id) else {
        return;
    };
    for tab_id in tabs {
        if let Some(tab) = page.find_tab_mut(*tab_id) {
            tab.state = state;
        }
    }
    for component in &mut page.components {
        for pin in &mut component.pins {
            if pin.tabs.iter().any(|t| tabs.contains(&t.id)) {
                pin.state = state;
            }
        }
    }
}

impl Engine {
    /// Runs the full initialization sequence (SPEC_FULL.md §4.7) and then
    /// the run loop to stability, returning the running engine only once
    /// it is `Stable` (or a fatal error if it oscillates/times out).
    pub fn start(mut document: Document, options: EngineOptions) -> SimResult<Engine> {
        if document.pages.is_empty() {
            return Err(SimError::Structural("document has no pages".to_string()));
        }
        if let Err(dup) = check_unique(document.all_ids()) {
            return Err(SimError::Structural(format!("duplicate identifier {dup}")));
        }
        let dangling = netbuild::document_dangling_wire_refs(&document);
        if !dangling.is_empty() {
            return Err(SimError::Structural(format!(
                "wire(s) reference a tab id not present on their page: {dangling:?}"
            )));
        }
        for page in &document.pages {
            for component in &page.components {
                validate_properties(component.kind, &component.properties)
                    .map_err(SimError::Structural)?;
            }
        }

        let mut nets = netbuild::build_document_nets(&document);

        let mut structural_warnings = Vec::new();
        for page in &document.pages {
            for (component_id, tab) in netbuild::isolated_tabs(page, &nets) {
                structural_warnings.push(Warning::isolated_tab(component_id, tab));
            }
        }

        for page in &document.pages {
            for component in &page.components {
                for tab in component.tab_ids() {
                    nets.ensure_singleton(tab, page.page_id);
                }
            }
        }
        // Every tab has a home net (wire-derived or singleton) before link
        // names are resolved, so `first_net_for_component` can find a net
        // for a linked component with zero wires on its own page instead of
        // silently dropping its link name.
        let mut link_warnings = linker::resolve_links(&document, &mut nets);

        let tab_owner = build_tab_owner(&document);
        let component_count: usize = document.pages.iter().map(|p| p.components.len()).sum();

        let bridges = Mutex::new(BridgeManager::new());
        let dirty = DirtySet::new();
        let requeue = RequeueSet::new();
        let runtime = RuntimeTable::new();
        let clock = SimClock::new();
        let concurrency =
            Concurrency::build(options.concurrency, component_count, options.parallel_component_threshold);

        {
            let ctx = KernelContext {
                nets: &nets,
                dirty: &dirty,
                requeue: &requeue,
                bridges: &bridges,
                clock: &clock,
                runtime: &runtime,
            };
            for page in document.pages.iter_mut() {
                for component in page.components.iter_mut() {
                    let kernel = kernel_for(component.kind);
                    kernel.on_start(component, &ctx)?;
                }
            }
        }

        for net_id in nets.net_ids() {
            dirty.mark(net_id);
        }

        let mut engine = Engine {
            document,
            nets,
            bridges,
            dirty,
            requeue,
            clock,
            runtime,
            tab_owner,
            state: EngineState::Initializing,
            options,
            stats: Statistics::default(),
            warnings: Mutex::new(Vec::new()),
            concurrency,
            on_stable: Vec::new(),
            on_unstable: Vec::new(),
        };
        engine.warnings.get_mut().append(&mut link_warnings);
        engine.warnings.get_mut().append(&mut structural_warnings);

        let span = tracing::info_span!("simulation");
        let _enter = span.enter();
        match engine.run_until_settled() {
            Ok(()) => Ok(engine),
            Err(err) => {
                engine.shutdown_internal();
                Err(err)
            }
        }
    }

    fn run_until_settled(&mut self) -> SimResult<()> {
        let started_at = Instant::now();
        loop {
            if started_at.elapsed() > self.options.timeout {
                self.stats.last_outcome = Outcome::Timeout;
                self.stats.wall_time = started_at.elapsed();
                return Err(SimError::Timeout(self.options.timeout));
            }

            let dirty_nets = self.dirty.drain();
            let requeued = self.requeue.drain();
            if dirty_nets.is_empty() && requeued.is_empty() {
                self.state = EngineState::Stable;
                self.stats.last_outcome = Outcome::Stable;
                self.stats.wall_time = started_at.elapsed();
                let snapshot = self.build_snapshot();
                for listener in &self.on_stable {
                    listener(&snapshot);
                }
                return Ok(());
            }

            self.clock.advance();
            self.state = EngineState::Unstable;
            self.stats.iterations += 1;
            self.stats.dirty_peak = self.stats.dirty_peak.max(dirty_nets.len());

            if self.stats.iterations > self.options.oscillation_iteration_cap {
                self.stats.last_outcome = Outcome::Oscillation;
                self.stats.wall_time = started_at.elapsed();
                return Err(SimError::Oscillation {
                    iterations: self.stats.iterations,
                    offenders: self.worst_offenders(),
                });
            }

            tracing::debug!(
                iteration = self.stats.iterations,
                dirty = dirty_nets.len(),
                requeued = requeued.len(),
                "evaluate phase"
            );

            let tab_states = snapshot_tab_states(&self.document);
            // Only nets whose recombined value actually changed propagate
            // and note their owning components (SPEC_FULL.md §4.6: "If
            // newState != V.state ... propagate ... note each Component").
            let changed = {
                let bridges = self.bridges.lock();
                self.concurrency.recombine(&dirty_nets, &self.nets, &bridges, &tab_states)
            };

            let mut noted: HashSet<ComponentId> = requeued.into_iter().collect();
            for net_id in &changed {
                let Some((page_id, state, tabs)) =
                    self.nets.get(*net_id).map(|n| (n.page_id, n.state(), n.tabs()))
                else {
                    continue;
                };
                propagate_to_tabs(&mut self.document, page_id, &tabs, state);
                for tab in &tabs {
                    if let Some(owner) = self.tab_owner.get(tab) {
                        noted.insert(*owner);
                    }
                }
            }

            tracing::debug!(noted = noted.len(), "execute phase");

            let ctx = KernelContext {
                nets: &self.nets,
                dirty: &self.dirty,
                requeue: &self.requeue,
                bridges: &self.bridges,
                clock: &self.clock,
                runtime: &self.runtime,
            };
            let evaluated =
                self.concurrency.execute(&mut self.document.pages, &noted, &ctx, &self.warnings);
            self.stats.components_evaluated += evaluated;
        }
    }

    fn worst_offenders(&self) -> Vec<NetId> {
        let mut ranked: Vec<(NetId, usize)> = self
            .nets
            .net_ids()
            .into_iter()
            .filter_map(|id| self.nets.get(id).map(|n| (id, n.toggle_count())))
            .filter(|(_, toggles)| *toggles > 0)
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.into_iter().take(5).map(|(id, _)| id).collect()
    }

    fn build_snapshot(&self) -> Snapshot {
        let mut components = Vec::new();
        for page in &self.document.pages {
            for component in &page.components {
                components.push(ComponentSnapshot {
                    id: component.id,
                    kind: component.kind,
                    position: component.position,
                    pin_states: component.pins.iter().map(|p| p.state).collect(),
                });
            }
        }
        let vnets = self
            .nets
            .net_ids()
            .into_iter()
            .filter_map(|id| self.nets.get(id))
            .map(VnetSummary::from)
            .collect();
        Snapshot { components, vnets }
    }

    /// Applies an external stimulus to one component, then re-runs the
    /// loop to stability (SPEC_FULL.md §4.4 "interact", §4.7).
    pub fn interact(&mut self, component_id: ComponentId, action: &str, params: &PropertyMap) -> SimResult<()> {
        if !matches!(self.state, EngineState::Stable | EngineState::Unstable) {
            return Err(SimError::InvalidState {
                operation: "interact".to_string(),
                state: format!("{:?}", self.state),
            });
        }

        let ctx = KernelContext {
            nets: &self.nets,
            dirty: &self.dirty,
            requeue: &self.requeue,
            bridges: &self.bridges,
            clock: &self.clock,
            runtime: &self.runtime,
        };
        let Some(component) = find_component_mut(&mut self.document, component_id) else {
            return Err(SimError::Structural(format!("no such component {component_id:?}")));
        };
        let kernel = kernel_for(component.kind);
        kernel.interact(component, action, params, &ctx)?;

        if self.state == EngineState::Stable && (self.dirty.any_dirty() || !self.requeue.is_empty()) {
            for listener in &self.on_unstable {
                listener();
            }
        }

        self.run_until_settled()
    }

    /// Runs `on_stop` on every component, destroys every bridge, and
    /// discards the VNETs (SPEC_FULL.md §4.7 "Shutdown").
    pub fn stop(mut self) -> Statistics {
        self.shutdown_internal();
        self.stats.clone()
    }

    fn shutdown_internal(&mut self) {
        self.state = EngineState::Stopping;
        let ctx = KernelContext {
            nets: &self.nets,
            dirty: &self.dirty,
            requeue: &self.requeue,
            bridges: &self.bridges,
            clock: &self.clock,
            runtime: &self.runtime,
        };
        for page in self.document.pages.iter_mut() {
            for component in page.components.iter_mut() {
                let kernel = kernel_for(component.kind);
                kernel.on_stop(component, &ctx);
                self.bridges.lock().destroy_all_owned_by(component.id, &self.nets, &self.dirty);
            }
        }
        self.nets = NetTable::new();
        self.state = EngineState::Idle;
    }

    /// Only valid in the `Stable` state (SPEC_FULL.md §6 "engine.snapshot").
    pub fn snapshot(&self) -> SimResult<Snapshot> {
        if self.state != EngineState::Stable {
            return Err(SimError::InvalidState {
                operation: "snapshot".to_string(),
                state: format!("{:?}", self.state),
            });
        }
        Ok(self.build_snapshot())
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn statistics(&self) -> Statistics {
        self.stats.clone()
    }

    pub fn warnings(&self) -> Vec<Warning> {
        self.warnings.lock().clone()
    }

    pub fn on_stable(&mut self, listener: impl Fn(&Snapshot) + Send + Sync + 'static) {
        self.on_stable.push(Box::new(listener));
    }

    pub fn on_unstable(&mut self, listener: impl Fn() + Send + Sync + 'static) {
        self.on_unstable.push(Box::new(listener));
    }
}
