//! Presence classification
//!
//! The pipeline hands the classifier an n-by-14 feature matrix with binary
//! labels and later asks for single-vector verdicts. `Classifier` is the
//! seam; `DecisionTree` is the bundled default, a CART-style binary tree
//! with Gini impurity and midpoint thresholds. Splits consider every feature
//! in column order, so fitting is fully deterministic.

use crate::error::PipelineError;
use crate::features::{FeatureVector, FEATURE_DIM};
use crate::training::{Label, TrainingSet};

/// Binary presence classifier consuming the synthesized training set
pub trait Classifier {
    fn fit(&mut self, training: &TrainingSet) -> Result<(), PipelineError>;
    fn predict(&self, features: &FeatureVector) -> Result<Label, PipelineError>;
}

/// Decision tree growth limits
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    /// Maximum tree depth
    pub max_depth: usize,
    /// Minimum samples required to attempt a split
    pub min_samples_split: usize,
    /// Minimum samples on each side of a split
    pub min_samples_leaf: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: 10,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        label: Label,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// CART-style decision tree over the 14-column feature space
#[derive(Debug, Clone, Default)]
pub struct DecisionTree {
    params: TreeParams,
    root: Option<Node>,
}

impl DecisionTree {
    pub fn new(params: TreeParams) -> Self {
        Self { params, root: None }
    }

    fn build(&self, set: &TrainingSet, indices: &[usize], depth: usize) -> Node {
        let impurity = gini(set, indices);

        if depth >= self.params.max_depth
            || indices.len() < self.params.min_samples_split
            || impurity < 1e-12
        {
            return Node::Leaf {
                label: majority(set, indices),
            };
        }

        match self.find_best_split(set, indices, impurity) {
            Some((feature, threshold, left_indices, right_indices)) => {
                let left = self.build(set, &left_indices, depth + 1);
                let right = self.build(set, &right_indices, depth + 1);
                Node::Split {
                    feature,
                    threshold,
                    left: Box::new(left),
                    right: Box::new(right),
                }
            }
            None => Node::Leaf {
                label: majority(set, indices),
            },
        }
    }

    /// Best Gini-gain split across all features, midpoint thresholds
    fn find_best_split(
        &self,
        set: &TrainingSet,
        indices: &[usize],
        parent_impurity: f64,
    ) -> Option<(usize, f64, Vec<usize>, Vec<usize>)> {
        let mut best_gain = 0.0;
        let mut best_split: Option<(usize, f64, Vec<usize>, Vec<usize>)> = None;

        for feature in 0..FEATURE_DIM {
            let mut values: Vec<f64> = indices
                .iter()
                .map(|&i| set.features[i].as_slice()[feature])
                .collect();
            values.sort_by(|a, b| a.total_cmp(b));
            values.dedup();

            for window in values.windows(2) {
                let threshold = (window[0] + window[1]) / 2.0;

                let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
                    .iter()
                    .partition(|&&i| set.features[i].as_slice()[feature] <= threshold);

                if left_indices.len() < self.params.min_samples_leaf
                    || right_indices.len() < self.params.min_samples_leaf
                {
                    continue;
                }

                let n_left = left_indices.len() as f64;
                let n_right = right_indices.len() as f64;
                let weighted = (n_left * gini(set, &left_indices)
                    + n_right * gini(set, &right_indices))
                    / (n_left + n_right);
                let gain = parent_impurity - weighted;

                if gain > best_gain {
                    best_gain = gain;
                    best_split = Some((feature, threshold, left_indices, right_indices));
                }
            }
        }

        best_split
    }
}

impl Classifier for DecisionTree {
    fn fit(&mut self, training: &TrainingSet) -> Result<(), PipelineError> {
        if training.is_empty() {
            return Err(PipelineError::EmptyTrainingSet);
        }

        let indices: Vec<usize> = (0..training.len()).collect();
        self.root = Some(self.build(training, &indices, 0));
        Ok(())
    }

    fn predict(&self, features: &FeatureVector) -> Result<Label, PipelineError> {
        let mut node = self.root.as_ref().ok_or(PipelineError::ModelNotFitted)?;

        loop {
            match node {
                Node::Leaf { label } => return Ok(*label),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if features.as_slice()[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

/// Gini impurity of the labels selected by `indices`
fn gini(set: &TrainingSet, indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    let present = indices
        .iter()
        .filter(|&&i| set.labels[i] == Label::Present)
        .count() as f64;
    let p = present / indices.len() as f64;
    1.0 - p * p - (1.0 - p) * (1.0 - p)
}

/// Majority label; ties go to `Present`
fn majority(set: &TrainingSet, indices: &[usize]) -> Label {
    let present = indices
        .iter()
        .filter(|&&i| set.labels[i] == Label::Present)
        .count();
    if present * 2 >= indices.len() {
        Label::Present
    } else {
        Label::Absent
    }
}

/// Fraction of training rows the fitted classifier reproduces
pub fn training_accuracy(
    classifier: &dyn Classifier,
    set: &TrainingSet,
) -> Result<f64, PipelineError> {
    if set.is_empty() {
        return Err(PipelineError::EmptyTrainingSet);
    }

    let mut correct = 0;
    for (features, label) in set.features.iter().zip(set.labels.iter()) {
        if classifier.predict(features)? == *label {
            correct += 1;
        }
    }
    Ok(correct as f64 / set.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Toy set separable on the time-of-day column: morning rows present,
    /// late rows absent
    fn separable_set() -> TrainingSet {
        let mut features = Vec::new();
        let mut labels = Vec::new();

        for i in 0..10 {
            let mut values = [0.0; FEATURE_DIM];
            values[0] = 1.0; // spring
            values[4] = 0.5;
            values[5] = i as f64 * 0.02; // early in the window
            values[6] = 1.0; // monday
            features.push(FeatureVector::new(values));
            labels.push(Label::Present);
        }
        for i in 0..10 {
            let mut values = [0.0; FEATURE_DIM];
            values[0] = 1.0;
            values[4] = 0.5;
            values[5] = 0.8 + i as f64 * 0.02; // late in the window
            values[6] = 1.0;
            features.push(FeatureVector::new(values));
            labels.push(Label::Absent);
        }

        TrainingSet { features, labels }
    }

    #[test]
    fn test_tree_separates_toy_set() {
        let set = separable_set();
        let mut tree = DecisionTree::default();
        tree.fit(&set).unwrap();

        let accuracy = training_accuracy(&tree, &set).unwrap();
        assert!(accuracy >= 0.9, "accuracy was {accuracy}");
    }

    #[test]
    fn test_predict_before_fit_is_an_error() {
        let tree = DecisionTree::default();
        let features = FeatureVector::new([0.0; FEATURE_DIM]);
        assert!(matches!(
            tree.predict(&features),
            Err(PipelineError::ModelNotFitted)
        ));
    }

    #[test]
    fn test_fit_empty_set_is_an_error() {
        let mut tree = DecisionTree::default();
        let empty = TrainingSet {
            features: Vec::new(),
            labels: Vec::new(),
        };
        assert!(matches!(
            tree.fit(&empty),
            Err(PipelineError::EmptyTrainingSet)
        ));
    }

    #[test]
    fn test_single_class_set_predicts_that_class() {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..5 {
            let mut values = [0.0; FEATURE_DIM];
            values[5] = i as f64 * 0.1;
            features.push(FeatureVector::new(values));
            labels.push(Label::Absent);
        }
        let set = TrainingSet { features, labels };

        let mut tree = DecisionTree::default();
        tree.fit(&set).unwrap();

        let probe = FeatureVector::new([0.3; FEATURE_DIM]);
        assert_eq!(tree.predict(&probe).unwrap(), Label::Absent);
    }

    #[test]
    fn test_min_samples_leaf_blocks_degenerate_splits() {
        let set = separable_set();
        let mut tree = DecisionTree::new(TreeParams {
            max_depth: 10,
            min_samples_split: 2,
            min_samples_leaf: 25, // more than either side can hold
        });
        tree.fit(&set).unwrap();

        // Tree collapses to a single majority leaf; ties go to Present
        let probe = FeatureVector::new([0.9; FEATURE_DIM]);
        assert_eq!(tree.predict(&probe).unwrap(), Label::Present);
    }
}
