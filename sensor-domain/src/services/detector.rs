//! Isolation forest outlier detection.
//!
//! Random axis-aligned splits isolate unusual rows in fewer steps than rows
//! sitting inside the bulk of the data. The forest is fitted and evaluated on
//! the same matrix; the decision threshold is the score percentile matching
//! the contamination fraction.

use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};

use crate::value_objects::AnomalyLabel;

/// Expected share of outliers in nominal data.
pub const CONTAMINATION: f64 = 0.05;
pub const RANDOM_SEED: u64 = 42;
pub const TREE_COUNT: usize = 100;
pub const MAX_SAMPLES: usize = 256;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

#[derive(Debug)]
pub struct IsolationForest {
    n_trees: usize,
    max_samples: usize,
    contamination: f64,
    seed: u64,
    sample_size: usize,
    trees: Vec<IsolationTree>,
}

impl IsolationForest {
    pub fn new(n_trees: usize, max_samples: usize, contamination: f64, seed: u64) -> Self {
        Self {
            n_trees,
            max_samples,
            contamination: contamination.clamp(0.0, 0.5),
            seed,
            sample_size: 0,
            trees: Vec::new(),
        }
    }

    /// The fixed configuration used by the analysis pipeline.
    pub fn standard() -> Self {
        Self::new(TREE_COUNT, MAX_SAMPLES, CONTAMINATION, RANDOM_SEED)
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    /// Fits the forest. Each inner vector is one row; all rows share a width.
    pub fn fit(&mut self, data: &[Vec<f64>]) {
        self.trees.clear();
        self.sample_size = 0;
        if data.len() < 2 {
            return;
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let sample_size = self.max_samples.min(data.len());
        let max_depth = (sample_size as f64).log2().ceil() as usize;

        for _ in 0..self.n_trees {
            let rows = sample(&mut rng, data.len(), sample_size).into_vec();
            self.trees
                .push(IsolationTree::build(data, rows, 0, max_depth, &mut rng));
        }
        self.sample_size = sample_size;
    }

    /// Opposite of the anomaly score: lower means more abnormal, values lie in
    /// [-1, -0]. An unfitted forest scores every row -0.5.
    pub fn score_samples(&self, data: &[Vec<f64>]) -> Vec<f64> {
        if self.trees.is_empty() {
            return vec![-0.5; data.len()];
        }
        let normalizer = average_path_length(self.sample_size);
        data.iter()
            .map(|point| {
                let mean_depth = self
                    .trees
                    .iter()
                    .map(|tree| tree.path_length(point, 0))
                    .sum::<f64>()
                    / self.trees.len() as f64;
                -(2.0_f64.powf(-mean_depth / normalizer))
            })
            .collect()
    }

    /// Fits on `data` and labels each row of it.
    pub fn fit_predict(&mut self, data: &[Vec<f64>]) -> Vec<AnomalyLabel> {
        self.fit(data);
        if !self.is_fitted() {
            return vec![AnomalyLabel::Normal; data.len()];
        }
        let scores = self.score_samples(data);
        let threshold = percentile(&scores, self.contamination * 100.0);
        scores
            .into_iter()
            .map(|score| {
                if score < threshold {
                    AnomalyLabel::Anomaly
                } else {
                    AnomalyLabel::Normal
                }
            })
            .collect()
    }
}

#[derive(Debug)]
enum IsolationTree {
    Internal {
        feature: usize,
        split: f64,
        left: Box<IsolationTree>,
        right: Box<IsolationTree>,
    },
    External {
        size: usize,
    },
}

impl IsolationTree {
    fn build(
        data: &[Vec<f64>],
        rows: Vec<usize>,
        depth: usize,
        max_depth: usize,
        rng: &mut StdRng,
    ) -> Self {
        if depth >= max_depth || rows.len() <= 1 {
            return IsolationTree::External { size: rows.len() };
        }

        let width = data[rows[0]].len();
        let candidates = (0..width)
            .filter_map(|feature| {
                let (min, max) = feature_range(data, &rows, feature);
                (max > min).then_some((feature, min, max))
            })
            .collect::<Vec<_>>();
        if candidates.is_empty() {
            return IsolationTree::External { size: rows.len() };
        }

        let (feature, min, max) = candidates[rng.gen_range(0..candidates.len())];
        let split = split_between(min, max, rng.gen::<f64>());
        let (left, right): (Vec<usize>, Vec<usize>) =
            rows.into_iter().partition(|&row| data[row][feature] <= split);

        IsolationTree::Internal {
            feature,
            split,
            left: Box::new(IsolationTree::build(data, left, depth + 1, max_depth, rng)),
            right: Box::new(IsolationTree::build(data, right, depth + 1, max_depth, rng)),
        }
    }

    fn path_length(&self, point: &[f64], depth: usize) -> f64 {
        match self {
            IsolationTree::External { size } => depth as f64 + average_path_length(*size),
            IsolationTree::Internal {
                feature,
                split,
                left,
                right,
            } => {
                if point[*feature] <= *split {
                    left.path_length(point, depth + 1)
                } else {
                    right.path_length(point, depth + 1)
                }
            }
        }
    }
}

fn feature_range(data: &[Vec<f64>], rows: &[usize], feature: usize) -> (f64, f64) {
    rows.iter()
        .map(|&row| data[row][feature])
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), value| {
            (min.min(value), max.max(value))
        })
}

/// Point at fraction `t` of `[min, max]`. Interpolates without forming
/// `max - min`, which overflows for readings near `f64::MAX` of opposite sign.
fn split_between(min: f64, max: f64, t: f64) -> f64 {
    (min * (1.0 - t) + max * t).clamp(min, max)
}

/// Average path length of an unsuccessful search in a binary search tree of
/// `n` nodes.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// Percentile with linear interpolation between closest ranks.
pub fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let rank = (q / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}
