//! Random forest classifier.
//!
//! Each tree is a CART tree grown on a bootstrap sample until its leaves are
//! pure. At every node the candidate features are drawn in random order and
//! the first `sqrt(n_features)` non-constant ones are scored by Gini
//! impurity. The forest predicts by averaging leaf class probabilities.
//!
//! Everything random flows from one seed, so the same data and seed always
//! give the same forest.

use crate::error::TrainError;
use ndarray::ArrayView2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, instrument};

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        proba: Vec<f64>,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, Copy)]
struct BestSplit {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

/// A single fitted decision tree over class indices.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

struct TreeBuilder<'x, 'y> {
    x: ArrayView2<'x, f64>,
    y: &'y [usize],
    n_classes: usize,
    max_features: usize,
    rng: StdRng,
    nodes: Vec<Node>,
}

impl TreeBuilder<'_, '_> {
    fn build(&mut self, samples: &mut [usize]) -> usize {
        let counts = self.class_counts(samples);
        let is_pure = counts.iter().filter(|c| **c > 0).count() <= 1;

        if is_pure || samples.len() < 2 {
            return self.leaf(&counts, samples.len());
        }
        let Some(split) = self.best_split(samples) else {
            return self.leaf(&counts, samples.len());
        };

        let mid = partition(samples, |s| self.x[[s, split.feature]] <= split.threshold);
        let id = self.nodes.len();
        self.nodes.push(Node::Leaf { proba: Vec::new() });

        let (left_samples, right_samples) = samples.split_at_mut(mid);
        let left = self.build(left_samples);
        let right = self.build(right_samples);
        self.nodes[id] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        id
    }

    fn leaf(&mut self, counts: &[usize], total: usize) -> usize {
        let proba = counts
            .iter()
            .map(|c| *c as f64 / total.max(1) as f64)
            .collect();
        self.nodes.push(Node::Leaf { proba });
        self.nodes.len() - 1
    }

    fn class_counts(&self, samples: &[usize]) -> Vec<usize> {
        let mut counts = vec![0; self.n_classes];
        for &s in samples {
            counts[self.y[s]] += 1;
        }
        counts
    }

    fn best_split(&mut self, samples: &[usize]) -> Option<BestSplit> {
        let mut features: Vec<usize> = (0..self.x.ncols()).collect();
        features.shuffle(&mut self.rng);

        let mut best: Option<BestSplit> = None;
        let mut visited = 0;
        for feature in features {
            if visited >= self.max_features {
                break;
            }
            let Some(candidate) = self.score_feature(samples, feature) else {
                continue;
            };
            visited += 1;
            if best.is_none_or(|b| candidate.impurity < b.impurity) {
                best = Some(candidate);
            }
        }
        best
    }

    /// Best threshold on one feature, or `None` if the feature is constant here.
    fn score_feature(&self, samples: &[usize], feature: usize) -> Option<BestSplit> {
        let mut column: Vec<(f64, usize)> = samples
            .iter()
            .map(|&s| (self.x[[s, feature]], self.y[s]))
            .collect();
        column.sort_by(|a, b| a.0.total_cmp(&b.0));

        let n = column.len();
        if column[0].0 >= column[n - 1].0 {
            return None;
        }

        let mut right = vec![0usize; self.n_classes];
        for &(_, c) in &column {
            right[c] += 1;
        }
        let mut left = vec![0usize; self.n_classes];

        let mut best: Option<BestSplit> = None;
        for i in 1..n {
            let (prev, class) = column[i - 1];
            left[class] += 1;
            right[class] -= 1;

            let value = column[i].0;
            if value <= prev {
                continue;
            }
            let impurity = (i as f64 * gini(&left, i) + (n - i) as f64 * gini(&right, n - i))
                / n as f64;
            if best.is_none_or(|b| impurity < b.impurity) {
                let mut threshold = prev / 2.0 + value / 2.0;
                if threshold >= value {
                    threshold = prev;
                }
                best = Some(BestSplit {
                    feature,
                    threshold,
                    impurity,
                });
            }
        }
        best
    }
}

fn gini(counts: &[usize], total: usize) -> f64 {
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|c| {
            let p = *c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

/// Reorder `items` so every element satisfying `pred` comes first; returns
/// the count of those elements.
fn partition(items: &mut [usize], pred: impl Fn(usize) -> bool) -> usize {
    let mut mid = 0;
    for i in 0..items.len() {
        if pred(items[i]) {
            items.swap(i, mid);
            mid += 1;
        }
    }
    mid
}

impl DecisionTree {
    fn fit(
        x: ArrayView2<'_, f64>,
        y: &[usize],
        n_classes: usize,
        samples: &mut [usize],
        max_features: usize,
        rng: StdRng,
    ) -> Self {
        let mut builder = TreeBuilder {
            x,
            y,
            n_classes,
            max_features,
            rng,
            nodes: Vec::new(),
        };
        let root = builder.build(samples);
        debug_assert_eq!(root, 0);
        Self {
            nodes: builder.nodes,
        }
    }

    fn proba(&self, row: ndarray::ArrayView1<'_, f64>) -> &[f64] {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                Node::Leaf { proba } => return proba,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    id = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }
}

/// A fitted ensemble of decision trees.
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    classes: Vec<u8>,
}

impl RandomForest {
    /// Fit `n_estimators` trees on the rows of `x` labeled by `y`.
    ///
    /// # Errors
    ///
    /// [`TrainError::LengthMismatch`] unless there is one label per row, and
    /// [`TrainError::TooSmall`] when there are no rows at all.
    #[instrument(level = "info", skip(x, y), fields(rows = x.nrows(), cols = x.ncols()))]
    pub fn fit(
        x: ArrayView2<'_, f64>,
        y: &[u8],
        n_estimators: usize,
        seed: u64,
    ) -> Result<Self, TrainError> {
        if x.nrows() != y.len() {
            return Err(TrainError::LengthMismatch {
                rows: x.nrows(),
                labels: y.len(),
            });
        }
        if y.is_empty() {
            return Err(TrainError::TooSmall(0));
        }

        let mut classes = y.to_vec();
        classes.sort_unstable();
        classes.dedup();
        let encoded: Vec<usize> = y
            .iter()
            .map(|label| classes.partition_point(|c| c < label))
            .collect();

        let max_features = ((x.ncols() as f64).sqrt() as usize).max(1);
        let n = y.len();
        let mut rng = StdRng::seed_from_u64(seed);

        let trees: Vec<DecisionTree> = (0..n_estimators)
            .map(|_| {
                let mut tree_rng = StdRng::seed_from_u64(rng.random());
                let mut bootstrap: Vec<usize> =
                    (0..n).map(|_| tree_rng.random_range(0..n)).collect();
                DecisionTree::fit(
                    x,
                    &encoded,
                    classes.len(),
                    &mut bootstrap,
                    max_features,
                    tree_rng,
                )
            })
            .collect();

        debug!(
            trees = trees.len(),
            classes = ?classes,
            max_features,
            "Fitted random forest"
        );
        Ok(Self { trees, classes })
    }

    /// Class labels in probability-column order.
    pub fn classes(&self) -> &[u8] {
        &self.classes
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Mean leaf probability per class, one row per input row.
    pub fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Vec<Vec<f64>> {
        x.rows()
            .into_iter()
            .map(|row| {
                let mut acc = vec![0.0; self.classes.len()];
                for tree in &self.trees {
                    for (a, p) in acc.iter_mut().zip(tree.proba(row)) {
                        *a += p;
                    }
                }
                let n = self.trees.len().max(1) as f64;
                acc.iter_mut().for_each(|a| *a /= n);
                acc
            })
            .collect()
    }

    /// Most probable class per row; ties go to the lower class.
    pub fn predict(&self, x: ArrayView2<'_, f64>) -> Vec<u8> {
        self.predict_proba(x)
            .into_iter()
            .map(|proba| {
                let mut best = 0;
                for (i, p) in proba.iter().enumerate() {
                    if *p > proba[best] {
                        best = i;
                    }
                }
                self.classes[best]
            })
            .collect()
    }
}
