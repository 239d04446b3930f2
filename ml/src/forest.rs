// ml/src/forest.rs

//! Bagged regression forest.
//!
//! Trees are grown CART-style: at every node the split with the largest
//! squared-error reduction wins, subject to depth and leaf-size limits. Each
//! tree trains on a bootstrap resample of the rows and predictions average
//! the per-tree leaf means.

use std::cmp::Ordering;

use models::{SchedulerError, SchedulerResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Forest hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 20,
            min_samples_split: 5,
            min_samples_leaf: 2,
            seed: 42,
        }
    }
}

/// One node of a fitted tree. Children are indices into the tree's node
/// arena, so trees serialize without boxing.
#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RegressionTree {
    nodes: Vec<Node>,
    /// Squared-error reduction credited to each feature by this tree.
    importances: Vec<f64>,
}

impl RegressionTree {
    fn predict_row(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

struct TreeBuilder<'a> {
    /// Column-major feature matrix shared by all trees.
    features: &'a [Vec<f64>],
    targets: &'a [f64],
    config: &'a ForestConfig,
    nodes: Vec<Node>,
    importances: Vec<f64>,
}

impl<'a> TreeBuilder<'a> {
    fn fit(
        features: &'a [Vec<f64>],
        targets: &'a [f64],
        rows: Vec<usize>,
        config: &'a ForestConfig,
    ) -> RegressionTree {
        let mut builder = TreeBuilder {
            features,
            targets,
            config,
            nodes: Vec::new(),
            importances: vec![0.0; features.len()],
        };
        builder.grow(rows, 0);
        RegressionTree {
            nodes: builder.nodes,
            importances: builder.importances,
        }
    }

    fn grow(&mut self, rows: Vec<usize>, depth: usize) -> usize {
        let node_mean = mean(self.targets, &rows);
        if depth >= self.config.max_depth || rows.len() < self.config.min_samples_split {
            return self.push_leaf(node_mean);
        }
        let (feature, threshold, gain) = match self.best_split(&rows) {
            Some(split) => split,
            None => return self.push_leaf(node_mean),
        };
        self.importances[feature] += gain;

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&row| self.features[feature][row] <= threshold);

        // Reserve the slot before recursing so child indices stay stable.
        let index = self.nodes.len();
        self.nodes.push(Node::Leaf { value: node_mean });
        let left = self.grow(left_rows, depth + 1);
        let right = self.grow(right_rows, depth + 1);
        self.nodes[index] = Node::Split {
            feature,
            threshold,
            left,
            right,
        };
        index
    }

    fn push_leaf(&mut self, value: f64) -> usize {
        self.nodes.push(Node::Leaf { value });
        self.nodes.len() - 1
    }

    /// Scans every feature for the threshold with the largest squared-error
    /// reduction. Returns `None` when no split clears the leaf-size limits
    /// with a positive gain.
    fn best_split(&self, rows: &[usize]) -> Option<(usize, f64, f64)> {
        if rows.len() < 2 {
            return None;
        }
        let total_sum: f64 = rows.iter().map(|&row| self.targets[row]).sum();
        let total_sq: f64 = rows
            .iter()
            .map(|&row| self.targets[row] * self.targets[row])
            .sum();
        let parent_sse = (total_sq - total_sum * total_sum / rows.len() as f64).max(0.0);

        let mut best: Option<(usize, f64, f64)> = None;
        let mut best_gain = 1e-12;

        for feature in 0..self.features.len() {
            let column = &self.features[feature];
            let mut order = rows.to_vec();
            order.sort_unstable_by(|&a, &b| {
                column[a].partial_cmp(&column[b]).unwrap_or(Ordering::Equal)
            });

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for i in 0..order.len() - 1 {
                let target = self.targets[order[i]];
                left_sum += target;
                left_sq += target * target;

                // No threshold fits between equal feature values.
                if column[order[i]] == column[order[i + 1]] {
                    continue;
                }
                let left_count = i + 1;
                let right_count = order.len() - left_count;
                if left_count < self.config.min_samples_leaf
                    || right_count < self.config.min_samples_leaf
                {
                    continue;
                }

                let left_sse = (left_sq - left_sum * left_sum / left_count as f64).max(0.0);
                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let right_sse =
                    (right_sq - right_sum * right_sum / right_count as f64).max(0.0);
                let gain = parent_sse - left_sse - right_sse;
                if gain > best_gain {
                    best_gain = gain;
                    let lower = column[order[i]];
                    let upper = column[order[i + 1]];
                    // The midpoint of adjacent floats can round up to the
                    // upper value, which would pull the right row into the
                    // `<=` partition the gain was computed without.
                    let mut threshold = (lower + upper) / 2.0;
                    if threshold >= upper {
                        threshold = lower;
                    }
                    best = Some((feature, threshold, gain));
                }
            }
        }
        best
    }
}

fn mean(targets: &[f64], rows: &[usize]) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    rows.iter().map(|&row| targets[row]).sum::<f64>() / rows.len() as f64
}

fn bootstrap_rows(rng: &mut StdRng, len: usize) -> Vec<usize> {
    (0..len).map(|_| rng.gen_range(0..len)).collect()
}

/// A forest of CART regression trees fitted on bootstrap resamples.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    config: ForestConfig,
    n_features: usize,
    trees: Vec<RegressionTree>,
}

impl RandomForestRegressor {
    /// Fits the forest on row-major samples.
    pub fn fit(samples: &[Vec<f64>], targets: &[f64], config: ForestConfig) -> SchedulerResult<Self> {
        if samples.is_empty() {
            return Err(SchedulerError::TrainingError(
                "cannot fit a forest on an empty dataset".to_string(),
            ));
        }
        if samples.len() != targets.len() {
            return Err(SchedulerError::TrainingError(format!(
                "sample and target counts differ: {} vs {}",
                samples.len(),
                targets.len()
            )));
        }
        let n_features = samples[0].len();
        if n_features == 0 {
            return Err(SchedulerError::TrainingError(
                "samples have no feature columns".to_string(),
            ));
        }
        if let Some(row) = samples.iter().find(|row| row.len() != n_features) {
            return Err(SchedulerError::TrainingError(format!(
                "ragged sample row: expected {} features, found {}",
                n_features,
                row.len()
            )));
        }
        if config.n_estimators == 0 {
            return Err(SchedulerError::TrainingError(
                "n_estimators must be at least 1".to_string(),
            ));
        }

        // Column-major copy so split scans walk contiguous memory.
        let features: Vec<Vec<f64>> = (0..n_features)
            .map(|feature| samples.iter().map(|row| row[feature]).collect())
            .collect();

        // Per-tree RNGs derive from the forest seed, independent of thread
        // scheduling, so a seed pins the whole ensemble.
        let trees: Vec<RegressionTree> = (0..config.n_estimators)
            .into_par_iter()
            .map(|tree_index| {
                let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(tree_index as u64));
                let rows = bootstrap_rows(&mut rng, samples.len());
                TreeBuilder::fit(&features, targets, rows, &config)
            })
            .collect();

        Ok(Self {
            config,
            n_features,
            trees,
        })
    }

    /// Mean prediction across all trees.
    pub fn predict(&self, row: &[f64]) -> SchedulerResult<f64> {
        if row.len() != self.n_features {
            return Err(SchedulerError::PredictionError(format!(
                "expected {} features, got {}",
                self.n_features,
                row.len()
            )));
        }
        if self.trees.is_empty() {
            return Err(SchedulerError::PredictionError(
                "forest has no fitted trees".to_string(),
            ));
        }
        let sum: f64 = self.trees.iter().map(|tree| tree.predict_row(row)).sum();
        let prediction = sum / self.trees.len() as f64;
        if !prediction.is_finite() {
            return Err(SchedulerError::PredictionError(
                "forest produced a non-finite prediction".to_string(),
            ));
        }
        Ok(prediction)
    }

    /// Mean per-tree share of squared-error reduction for each feature.
    /// Sums to one whenever any tree found a useful split.
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut totals = vec![0.0; self.n_features];
        let mut counted = 0usize;
        for tree in &self.trees {
            let tree_total: f64 = tree.importances.iter().sum();
            if tree_total <= 0.0 {
                continue;
            }
            for (total, importance) in totals.iter_mut().zip(&tree.importances) {
                *total += importance / tree_total;
            }
            counted += 1;
        }
        if counted > 0 {
            for total in &mut totals {
                *total /= counted as f64;
            }
        }
        totals
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }
}
