//! Parameter variation framework for exploring the marketplace
//! configuration space. Supports grid search and random sampling.

use std::collections::HashSet;

use ride_core::bidding::BidScoreConfig;
use ride_core::commission::{CommissionBook, CommissionRate, CommissionRule};
use ride_core::scenario::{BidWindowConfig, ScenarioParams};

/// The scalar knobs an experiment actually swept, kept alongside the
/// full `ScenarioParams` so exports can report them as columns.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct ExperimentKnobs {
    pub commission_percent: Option<f64>,
    pub discount_weight: Option<f64>,
    pub activity_weight: Option<f64>,
    pub bid_window_secs: Option<u64>,
}

/// A single parameter configuration for a scenario run.
#[derive(Debug, Clone)]
pub struct ParameterSet {
    /// Full scenario parameters.
    pub params: ScenarioParams,
    /// The swept scalar values, for reporting.
    pub knobs: ExperimentKnobs,
    /// Unique experiment ID for this parameter configuration.
    pub experiment_id: String,
    /// Run ID within the experiment (for multiple runs with same params).
    pub run_id: usize,
    /// Seed used for this run (ensures reproducibility).
    pub seed: u64,
}

impl ParameterSet {
    pub fn new(
        params: ScenarioParams,
        knobs: ExperimentKnobs,
        experiment_id: String,
        run_id: usize,
        seed: u64,
    ) -> Self {
        Self {
            params,
            knobs,
            experiment_id,
            run_id,
            seed,
        }
    }

    /// Get the scenario params with seed applied.
    pub fn scenario_params(&self) -> ScenarioParams {
        let mut params = self.params.clone();
        params.seed = Some(self.seed);
        params
    }
}

#[allow(clippy::too_many_arguments)]
fn apply_combination(
    base: &ScenarioParams,
    commission_percent: Option<f64>,
    discount_weight: Option<f64>,
    activity_weight: Option<f64>,
    bid_window_secs: Option<u64>,
    num_riders: usize,
    num_drivers: usize,
    bid_radius: u32,
) -> (ScenarioParams, ExperimentKnobs) {
    let mut params = base.clone();
    params.num_riders = num_riders;
    params.num_drivers = num_drivers;
    params.bid_radius = bid_radius;

    if let Some(percent) = commission_percent {
        params.commission_book = Some(CommissionBook::new(vec![CommissionRule::global(
            CommissionRate::Percentage(percent),
        )]));
    }
    if discount_weight.is_some() || activity_weight.is_some() {
        let defaults = BidScoreConfig::default();
        params.bid_score_config = Some(BidScoreConfig {
            discount_weight: discount_weight.unwrap_or(defaults.discount_weight),
            activity_weight: activity_weight.unwrap_or(defaults.activity_weight),
            activity_cap: defaults.activity_cap,
        });
    }
    if let Some(window_secs) = bid_window_secs {
        let defaults = params.bid_window_config.unwrap_or_default();
        params.bid_window_config = Some(BidWindowConfig {
            window_secs,
            ..defaults
        });
    }

    let knobs = ExperimentKnobs {
        commission_percent,
        discount_weight,
        activity_weight,
        bid_window_secs,
    };
    (params, knobs)
}

/// Defines a parameter space for exploration.
#[derive(Debug, Clone, Default)]
pub struct ParameterSpace {
    /// Base parameters (used as defaults for unspecified parameters).
    base: ScenarioParams,
    commission_percents: Vec<f64>,
    discount_weights: Vec<f64>,
    activity_weights: Vec<f64>,
    bid_window_secs: Vec<u64>,
    num_riders: Vec<usize>,
    num_drivers: Vec<usize>,
    bid_radii: Vec<u32>,
}

impl ParameterSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new parameter space for grid search.
    pub fn grid() -> Self {
        Self::new()
    }

    pub fn commission_percent(mut self, percents: Vec<f64>) -> Self {
        self.commission_percents = percents;
        self
    }

    pub fn discount_weight(mut self, weights: Vec<f64>) -> Self {
        self.discount_weights = weights;
        self
    }

    pub fn activity_weight(mut self, weights: Vec<f64>) -> Self {
        self.activity_weights = weights;
        self
    }

    pub fn bid_window_secs(mut self, windows: Vec<u64>) -> Self {
        self.bid_window_secs = windows;
        self
    }

    pub fn num_riders(mut self, counts: Vec<usize>) -> Self {
        self.num_riders = counts;
        self
    }

    pub fn num_drivers(mut self, counts: Vec<usize>) -> Self {
        self.num_drivers = counts;
        self
    }

    pub fn bid_radius(mut self, radii: Vec<u32>) -> Self {
        self.bid_radii = radii;
        self
    }

    /// Set base parameters (used as defaults).
    pub fn with_base(mut self, base: ScenarioParams) -> Self {
        self.base = base;
        self
    }

    fn or_default<T: Copy>(values: &[T], default: T) -> Vec<T> {
        if values.is_empty() {
            vec![default]
        } else {
            values.to_vec()
        }
    }

    /// Generate all parameter sets using grid search (Cartesian product).
    ///
    /// Each combination of specified parameters is generated; parameters
    /// not specified use values from the base configuration.
    pub fn generate(&self) -> Vec<ParameterSet> {
        let commission_percents = Self::or_default(
            &self.commission_percents.iter().map(|&p| Some(p)).collect::<Vec<_>>(),
            None,
        );
        let discount_weights = Self::or_default(
            &self.discount_weights.iter().map(|&w| Some(w)).collect::<Vec<_>>(),
            None,
        );
        let activity_weights = Self::or_default(
            &self.activity_weights.iter().map(|&w| Some(w)).collect::<Vec<_>>(),
            None,
        );
        let bid_windows = Self::or_default(
            &self.bid_window_secs.iter().map(|&w| Some(w)).collect::<Vec<_>>(),
            None,
        );
        let num_riders = Self::or_default(&self.num_riders, self.base.num_riders);
        let num_drivers = Self::or_default(&self.num_drivers, self.base.num_drivers);
        let bid_radii = Self::or_default(&self.bid_radii, self.base.bid_radius);

        let mut sets = Vec::new();
        for &commission in &commission_percents {
            for &discount in &discount_weights {
                for &activity in &activity_weights {
                    for &window in &bid_windows {
                        for &riders in &num_riders {
                            for &drivers in &num_drivers {
                                for &radius in &bid_radii {
                                    let experiment_id = sets.len();
                                    let (params, knobs) = apply_combination(
                                        &self.base, commission, discount, activity, window,
                                        riders, drivers, radius,
                                    );
                                    let seed = (experiment_id as u64).wrapping_mul(0x9e37_79b9);
                                    sets.push(ParameterSet::new(
                                        params,
                                        knobs,
                                        format!("exp_{experiment_id}"),
                                        0,
                                        seed,
                                    ));
                                }
                            }
                        }
                    }
                }
            }
        }
        sets
    }

    /// Generate random parameter sets (Monte Carlo sampling).
    ///
    /// Samples `count` unique parameter sets from the defined space.
    pub fn sample_random(&self, count: usize, seed: u64) -> Vec<ParameterSet> {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        fn pick<T: Copy, R: Rng>(rng: &mut R, values: &[T]) -> Option<T> {
            if values.is_empty() {
                None
            } else {
                Some(values[rng.gen_range(0..values.len())])
            }
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut parameter_sets = Vec::new();
        let mut seen = HashSet::new();
        let mut attempts = 0;
        const MAX_ATTEMPTS: usize = 10_000;

        while parameter_sets.len() < count && attempts < MAX_ATTEMPTS {
            attempts += 1;

            let commission = pick(&mut rng, &self.commission_percents);
            let discount = pick(&mut rng, &self.discount_weights);
            let activity = pick(&mut rng, &self.activity_weights);
            let window = pick(&mut rng, &self.bid_window_secs);
            let riders = pick(&mut rng, &self.num_riders).unwrap_or(self.base.num_riders);
            let drivers = pick(&mut rng, &self.num_drivers).unwrap_or(self.base.num_drivers);
            let radius = pick(&mut rng, &self.bid_radii).unwrap_or(self.base.bid_radius);

            let key = format!(
                "{commission:?}-{discount:?}-{activity:?}-{window:?}-{riders}-{drivers}-{radius}"
            );
            if !seen.insert(key) {
                continue;
            }

            let (params, knobs) = apply_combination(
                &self.base, commission, discount, activity, window, riders, drivers, radius,
            );
            let seed_value = seed
                .wrapping_add(parameter_sets.len() as u64)
                .wrapping_mul(0x9e37_79b9);
            parameter_sets.push(ParameterSet::new(
                params,
                knobs,
                format!("random_{}", parameter_sets.len()),
                0,
                seed_value,
            ));
        }

        parameter_sets
    }
}
