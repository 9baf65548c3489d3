//! Control loop integration
//!
//! [`AdaptiveController`] ties the parameter store, the operator selection
//! policy, and the bookkeeping an evolution loop needs into a single
//! per-generation cycle: feed it the generation's metrics, let it adapt the
//! registered parameters, and pull the adapted values and chosen operator
//! variants back out.

use std::collections::{BTreeMap, HashMap};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{ParameterError, PolicyError};
use crate::history::BoundedHistory;
use crate::metrics::{EvolutionMetrics, GeneticOperationStats, OperatorType};
use crate::parameter::names;
use crate::parameter::store::{ParameterChange, ParameterStore, StoreConfig};
use crate::policy::{OperatorPerformance, OperatorSelectionPolicy, PolicyConfig};
use crate::strategy::population::PopulationSizeStrategy;
use crate::strategy::pressure::{ElitismStrategy, TournamentSizeStrategy};
use crate::strategy::rates::{CrossoverRateStrategy, MutationRateStrategy};

/// How aggressively parameters are allowed to move per generation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdaptationLevel {
    /// Halve every proposed step
    Conservative,
    /// Apply strategy proposals as-is
    Balanced,
    /// Full steps plus faster operator weight updates
    Aggressive,
}

impl Default for AdaptationLevel {
    fn default() -> Self {
        Self::Balanced
    }
}

/// Runtime switches for the controller
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveControls {
    /// Master switch; when off, metrics are ignored and no parameter moves
    pub enabled: bool,
    /// Record a full parameter snapshot every generation
    pub snapshots_enabled: bool,
    /// Emit a log line for every parameter change
    pub logging_enabled: bool,
    /// Step aggressiveness
    pub adaptation_level: AdaptationLevel,
}

impl Default for AdaptiveControls {
    fn default() -> Self {
        Self {
            enabled: true,
            snapshots_enabled: true,
            logging_enabled: false,
            adaptation_level: AdaptationLevel::Balanced,
        }
    }
}

/// One recorded parameter adaptation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterAdaptationEvent {
    /// Parameter that moved
    pub parameter: String,
    /// Value before the change
    pub old_value: f64,
    /// Value after the change
    pub new_value: f64,
    /// Name of the strategy that proposed the move
    pub reason: String,
    /// Metrics that triggered the change
    pub metrics_at_change: EvolutionMetrics,
    /// Generation the change took effect
    pub generation: u64,
    /// Wall-clock milliseconds since the Unix epoch
    pub timestamp_ms: u64,
}

/// Full parameter state captured at one generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterSnapshot {
    /// All parameter values at capture time
    pub parameters: BTreeMap<String, f64>,
    /// Metrics of the captured generation
    pub metrics: EvolutionMetrics,
    /// Generation number
    pub generation: u64,
    /// Wall-clock milliseconds since the Unix epoch
    pub timestamp_ms: u64,
}

/// Configuration for [`AdaptiveController`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Parameter store configuration
    pub store: StoreConfig,
    /// Operator selection configuration
    pub policy: PolicyConfig,
    /// Initial runtime switches
    pub controls: AdaptiveControls,
    /// Retained adaptation events
    pub event_capacity: usize,
    /// Retained parameter snapshots
    pub snapshot_capacity: usize,
    /// Seed for operator selection; random when absent
    pub seed: Option<u64>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            policy: PolicyConfig::default(),
            controls: AdaptiveControls::default(),
            event_capacity: 1000,
            snapshot_capacity: 500,
            seed: None,
        }
    }
}

impl ControllerConfig {
    /// Create a config with the default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed both the store's and the controller's random state
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.store = self.store.with_seed(seed);
        self.seed = Some(seed);
        self
    }

    /// Set the initial runtime switches
    pub fn with_controls(mut self, controls: AdaptiveControls) -> Self {
        self.controls = controls;
        self
    }
}

/// Per-generation adaptation driver for an evolution loop
pub struct AdaptiveController {
    store: ParameterStore,
    policy: OperatorSelectionPolicy,
    controls: AdaptiveControls,
    events: BoundedHistory<ParameterAdaptationEvent>,
    snapshots: BoundedHistory<ParameterSnapshot>,
    base_renormalize_every: u64,
    rng: StdRng,
    adaptation_callbacks: Vec<Box<dyn FnMut(&ParameterAdaptationEvent) + Send>>,
    population_callbacks: Vec<Box<dyn FnMut(usize, usize) + Send>>,
}

impl AdaptiveController {
    /// Create a controller with the default configuration
    pub fn new() -> Self {
        Self::with_config(ControllerConfig::default())
    }

    /// Create a controller with the given configuration
    pub fn with_config(config: ControllerConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let base_renormalize_every = config.policy.renormalize_every;
        let mut controller = Self {
            store: ParameterStore::with_config(config.store),
            policy: OperatorSelectionPolicy::with_config(config.policy),
            controls: AdaptiveControls::default(),
            events: BoundedHistory::new(config.event_capacity),
            snapshots: BoundedHistory::new(config.snapshot_capacity),
            base_renormalize_every,
            rng,
            adaptation_callbacks: Vec::new(),
            population_callbacks: Vec::new(),
        };
        controller.set_controls(config.controls);
        controller
    }

    /// Register the canonical adaptive parameters with sensible bounds
    pub fn configure_defaults(&mut self) -> Result<(), ParameterError> {
        self.store.register(
            names::MUTATION_RATE,
            0.05,
            0.001,
            0.5,
            MutationRateStrategy::default(),
        )?;
        self.store.register(
            names::CROSSOVER_RATE,
            0.8,
            0.1,
            1.0,
            CrossoverRateStrategy::default(),
        )?;
        self.store.register(
            names::TOURNAMENT_SIZE,
            3.0,
            2.0,
            10.0,
            TournamentSizeStrategy::default(),
        )?;
        self.store
            .register(names::ELITISM_COUNT, 2.0, 1.0, 20.0, ElitismStrategy::default())?;
        self.store.register(
            names::POPULATION_SIZE,
            100.0,
            20.0,
            500.0,
            PopulationSizeStrategy::default(),
        )?;
        Ok(())
    }

    /// The underlying parameter store
    pub fn store(&self) -> &ParameterStore {
        &self.store
    }

    /// Mutable access to the underlying parameter store
    pub fn store_mut(&mut self) -> &mut ParameterStore {
        &mut self.store
    }

    /// Register competing operator variants for a category
    pub fn register_operators<I, S>(
        &mut self,
        category: OperatorType,
        variants: I,
    ) -> Result<(), PolicyError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.policy.register_operators(category, variants)
    }

    /// The active runtime switches
    pub fn controls(&self) -> AdaptiveControls {
        self.controls
    }

    /// Replace the runtime switches, applying the adaptation level
    pub fn set_controls(&mut self, controls: AdaptiveControls) {
        self.controls = controls;
        match controls.adaptation_level {
            AdaptationLevel::Conservative => {
                self.store.set_damping(0.5);
                self.policy.set_renormalize_every(self.base_renormalize_every);
            }
            AdaptationLevel::Balanced => {
                self.store.set_damping(1.0);
                self.policy.set_renormalize_every(self.base_renormalize_every);
            }
            AdaptationLevel::Aggressive => {
                self.store.set_damping(1.0);
                self.policy
                    .set_renormalize_every((self.base_renormalize_every / 2).max(1));
            }
        }
    }

    /// Run callbacks whenever any parameter is adapted
    pub fn on_parameter_adapted<F>(&mut self, callback: F)
    where
        F: FnMut(&ParameterAdaptationEvent) + Send + 'static,
    {
        self.adaptation_callbacks.push(Box::new(callback));
    }

    /// Run callbacks whenever the population size parameter changes
    ///
    /// The callback receives the old and new sizes, rounded to counts.
    pub fn on_population_size_changed<F>(&mut self, callback: F)
    where
        F: FnMut(usize, usize) + Send + 'static,
    {
        self.population_callbacks.push(Box::new(callback));
    }

    /// Run one adaptation cycle at the start of a generation
    ///
    /// Records the metrics, lets every registered parameter's strategy
    /// propose and apply a move, emits events and callbacks for the changes,
    /// and captures a snapshot when enabled. Returns the applied changes.
    /// A disabled controller adapts nothing and returns no changes, but
    /// snapshots keep being captured while they are enabled.
    pub fn begin_generation(&mut self, metrics: EvolutionMetrics) -> Vec<ParameterChange> {
        let changes = if self.controls.enabled {
            self.store.ingest(metrics)
        } else {
            Vec::new()
        };
        let timestamp_ms = unix_millis();

        for change in &changes {
            if self.controls.logging_enabled {
                log::info!(
                    "generation {}: {} adapted {:.6} -> {:.6} ({})",
                    metrics.generation,
                    change.name,
                    change.old_value,
                    change.new_value,
                    change.reason
                );
            }

            let event = ParameterAdaptationEvent {
                parameter: change.name.clone(),
                old_value: change.old_value,
                new_value: change.new_value,
                reason: change.reason.clone(),
                metrics_at_change: metrics,
                generation: metrics.generation,
                timestamp_ms,
            };
            for callback in &mut self.adaptation_callbacks {
                callback(&event);
            }
            if change.name == names::POPULATION_SIZE {
                let old_size = change.old_value.round() as usize;
                let new_size = change.new_value.round() as usize;
                for callback in &mut self.population_callbacks {
                    callback(old_size, new_size);
                }
            }
            self.events.push(event);
        }

        if self.controls.snapshots_enabled {
            self.snapshots.push(ParameterSnapshot {
                parameters: self.store.snapshot(),
                metrics,
                generation: metrics.generation,
                timestamp_ms,
            });
        }

        changes
    }

    /// Choose an operator variant for one category
    pub fn select_operator(&mut self, category: OperatorType) -> Result<String, PolicyError> {
        self.policy
            .select_operator(category, &mut self.rng)
            .map(str::to_string)
    }

    /// Choose variants for every category that has registrations
    pub fn select_all_operators(&mut self) -> HashMap<OperatorType, String> {
        let mut selected = HashMap::new();
        for &category in OperatorType::ALL.iter() {
            if let Ok(name) = self.policy.select_operator(category, &mut self.rng) {
                selected.insert(category, name.to_string());
            }
        }
        selected
    }

    /// Feed an operation outcome to both the policy and the store
    pub fn report_operation_stats(
        &mut self,
        stats: GeneticOperationStats,
    ) -> Result<(), PolicyError> {
        self.policy.update_operator_performance(&stats)?;
        self.store.ingest_operation_stats(stats);
        Ok(())
    }

    /// Current value of a parameter
    pub fn parameter(&self, name: &str) -> Result<f64, ParameterError> {
        self.store.get(name)
    }

    /// Recorded value history of a parameter, oldest first
    pub fn parameter_history(&self, name: &str) -> Result<Vec<f64>, ParameterError> {
        self.store.parameter_history(name)
    }

    /// All recorded adaptation events, oldest first
    pub fn adaptation_history(&self) -> Vec<ParameterAdaptationEvent> {
        self.events.to_vec()
    }

    /// All recorded snapshots, oldest first
    pub fn snapshots(&self) -> Vec<ParameterSnapshot> {
        self.snapshots.to_vec()
    }

    /// Performance estimates for every registered operator variant
    pub fn operator_statistics(&self) -> HashMap<OperatorType, Vec<OperatorPerformance>> {
        self.policy.operator_statistics()
    }

    /// Reset every parameter to its registered default
    pub fn reset_to_default_parameters(&mut self) {
        self.store.reset_all();
    }
}

impl Default for AdaptiveController {
    fn default() -> Self {
        Self::new()
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
