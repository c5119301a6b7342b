//! Risk model: a random forest retrained from the full history on every request.

use log::debug;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::config::ForestSettings;
use crate::models::{HistoryTable, Observation};

const N_FEATURES: usize = 3;
const MIN_SAMPLES_SPLIT: usize = 2;

#[derive(Debug, Clone)]
pub enum RiskModel {
    Trained(Forest),
    Untrained,
}

impl RiskModel {
    pub fn train(table: &HistoryTable, settings: &ForestSettings) -> Self {
        if table.is_empty() {
            return RiskModel::Untrained;
        }

        let samples: Vec<Sample> = table
            .iter()
            .map(|row| Sample {
                features: row.observation().features(),
                is_risky: row.is_risky,
            })
            .collect();

        let mut rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let seeds: Vec<u64> = (0..settings.n_trees.max(1)).map(|_| rng.gen()).collect();

        let trees = seeds
            .into_par_iter()
            .map(|seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                let bootstrap: Vec<usize> = (0..samples.len())
                    .map(|_| rng.gen_range(0..samples.len()))
                    .collect();
                Node::grow(&samples, bootstrap, &mut rng)
            })
            .collect::<Vec<_>>();

        debug!("trained {} trees on {} history rows", trees.len(), samples.len());
        RiskModel::Trained(Forest { trees })
    }
}

/// Trained ensemble. Only reachable through [`RiskModel::Trained`].
#[derive(Debug, Clone)]
pub struct Forest {
    trees: Vec<Node>,
}

impl Forest {
    /// Probability in [0, 1] that `observation` is risky.
    pub fn predict(&self, observation: &Observation) -> f64 {
        let features = observation.features();
        let total: f64 = self.trees.iter().map(|tree| tree.leaf_value(&features)).sum();
        (total / self.trees.len() as f64).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    features: [f64; N_FEATURES],
    is_risky: bool,
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        risky_share: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn grow(samples: &[Sample], indices: Vec<usize>, rng: &mut StdRng) -> Node {
        let risky = indices.iter().filter(|&&i| samples[i].is_risky).count();
        let risky_share = risky as f64 / indices.len() as f64;

        if indices.len() < MIN_SAMPLES_SPLIT || risky == 0 || risky == indices.len() {
            return Node::Leaf { risky_share };
        }

        let Some((feature, threshold)) = best_split(samples, &indices, rng) else {
            return Node::Leaf { risky_share };
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| samples[i].features[feature] <= threshold);
        if left.is_empty() || right.is_empty() {
            return Node::Leaf { risky_share };
        }

        Node::Split {
            feature,
            threshold,
            left: Box::new(Node::grow(samples, left, rng)),
            right: Box::new(Node::grow(samples, right, rng)),
        }
    }

    fn leaf_value(&self, features: &[f64; N_FEATURES]) -> f64 {
        let mut node = self;
        loop {
            match node {
                Node::Leaf { risky_share } => return *risky_share,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if features[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

fn max_features() -> usize {
    ((N_FEATURES as f64).sqrt().floor() as usize).max(1)
}

/// Lowest weighted Gini split over a random subset of features.
///
/// Features drawn in the subset that turn out constant are skipped and the
/// remaining ones are tried, so a node only becomes a leaf when no feature
/// separates its samples.
fn best_split(samples: &[Sample], indices: &[usize], rng: &mut StdRng) -> Option<(usize, f64)> {
    let order = index::sample(rng, N_FEATURES, N_FEATURES).into_vec();
    let wanted = max_features();

    let mut best: Option<(f64, usize, f64)> = None;
    let mut visited = 0;

    for feature in order {
        if visited >= wanted && best.is_some() {
            break;
        }

        let mut values: Vec<(f64, bool)> = indices
            .iter()
            .map(|&i| (samples[i].features[feature], samples[i].is_risky))
            .collect();
        values.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        if values.first().map(|v| v.0) == values.last().map(|v| v.0) {
            continue;
        }
        visited += 1;

        let total = values.len();
        let total_risky = values.iter().filter(|v| v.1).count();
        let mut left_risky = 0;

        for split in 1..total {
            if values[split - 1].1 {
                left_risky += 1;
            }
            if values[split - 1].0 == values[split].0 {
                continue;
            }

            let left_n = split;
            let right_n = total - split;
            let impurity = (left_n as f64 * gini(left_risky, left_n)
                + right_n as f64 * gini(total_risky - left_risky, right_n))
                / total as f64;

            if best.map_or(true, |(score, _, _)| impurity < score) {
                best = Some((impurity, feature, threshold(values[split - 1].0, values[split].0)));
            }
        }
    }

    best.map(|(_, feature, threshold)| (feature, threshold))
}

/// Midpoint between two distinct sorted values. Falls back to the lower value
/// when the midpoint rounds onto the upper one or overflows.
fn threshold(lower: f64, upper: f64) -> f64 {
    let midpoint = lower / 2.0 + upper / 2.0;
    if !midpoint.is_finite() || midpoint >= upper || midpoint < lower {
        lower
    } else {
        midpoint
    }
}

fn gini(risky: usize, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let p = risky as f64 / n as f64;
    2.0 * p * (1.0 - p)
}
