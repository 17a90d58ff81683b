//! Gradient-boosted tree classifier loaded from a LightGBM model dump
//!
//! Reads the JSON produced by LightGBM's `dump_model()`:
//! - one tree per class per boosting round, tree `i` scoring class `i % k`
//! - numerical splits with LightGBM's missing-value routing
//! - softmax over the per-class raw scores

use ndarray::ArrayView1;
use serde::Deserialize;

use super::result::Disposition;
use crate::error::{ExoError, Result};
use crate::features::check_column_contract;

/// LightGBM treats magnitudes below this as zero for `missing_type: Zero`
const ZERO_THRESHOLD: f64 = 1e-35;

/// A fitted classifier producing class probabilities for one feature vector.
pub trait Classifier: Send + Sync + std::fmt::Debug {
    fn n_classes(&self) -> usize;

    /// Column contract the classifier was trained with
    fn feature_names(&self) -> &[String];

    /// Probability for each class; sums to 1
    fn predict_proba(&self, features: ArrayView1<'_, f64>) -> Result<Vec<f64>>;
}

// ---- Dump format ----

#[derive(Debug, Deserialize)]
struct ModelDump {
    num_class: usize,
    #[serde(default)]
    num_tree_per_iteration: Option<usize>,
    #[serde(default)]
    objective: Option<String>,
    feature_names: Vec<String>,
    tree_info: Vec<TreeInfo>,
}

#[derive(Debug, Deserialize)]
struct TreeInfo {
    #[serde(default)]
    tree_index: Option<usize>,
    tree_structure: DumpNode,
}

#[derive(Debug, Deserialize)]
struct DumpNode {
    #[serde(default)]
    split_feature: Option<usize>,
    #[serde(default)]
    threshold: Option<serde_json::Value>,
    #[serde(default)]
    decision_type: Option<String>,
    #[serde(default = "default_left")]
    default_left: bool,
    #[serde(default)]
    missing_type: Option<String>,
    #[serde(default)]
    left_child: Option<Box<DumpNode>>,
    #[serde(default)]
    right_child: Option<Box<DumpNode>>,
    #[serde(default)]
    leaf_value: Option<f64>,
}

fn default_left() -> bool {
    true
}

// ---- Compiled trees ----

#[derive(Debug, Clone, Copy, PartialEq)]
enum MissingType {
    None,
    Zero,
    NaN,
}

#[derive(Debug, Clone)]
enum GbdtNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        default_left: bool,
        missing: MissingType,
        left: Box<GbdtNode>,
        right: Box<GbdtNode>,
    },
}

impl GbdtNode {
    fn compile(node: DumpNode, n_features: usize) -> Result<Self> {
        if let Some(value) = node.leaf_value {
            return Ok(GbdtNode::Leaf { value });
        }

        let feature = node
            .split_feature
            .ok_or_else(|| unsupported("node has neither leaf_value nor split_feature"))?;
        if feature >= n_features {
            return Err(unsupported(format!(
                "split on feature {} but the model declares {} features",
                feature, n_features
            )));
        }

        match node.decision_type.as_deref() {
            None | Some("<=") => {}
            Some(other) => {
                return Err(unsupported(format!("decision type '{}'", other)));
            }
        }

        let threshold = node
            .threshold
            .as_ref()
            .and_then(|t| t.as_f64())
            .ok_or_else(|| unsupported("split threshold is not numeric"))?;

        let missing = match node.missing_type.as_deref() {
            None | Some("None") => MissingType::None,
            Some("Zero") => MissingType::Zero,
            Some("NaN") => MissingType::NaN,
            Some(other) => return Err(unsupported(format!("missing type '{}'", other))),
        };

        let left = node
            .left_child
            .ok_or_else(|| unsupported("split without left_child"))?;
        let right = node
            .right_child
            .ok_or_else(|| unsupported("split without right_child"))?;

        Ok(GbdtNode::Split {
            feature,
            threshold,
            default_left: node.default_left,
            missing,
            left: Box::new(GbdtNode::compile(*left, n_features)?),
            right: Box::new(GbdtNode::compile(*right, n_features)?),
        })
    }

    fn predict(&self, sample: &ArrayView1<'_, f64>) -> f64 {
        match self {
            GbdtNode::Leaf { value } => *value,
            GbdtNode::Split {
                feature,
                threshold,
                default_left,
                missing,
                left,
                right,
            } => {
                let mut value = sample[*feature];
                if *missing != MissingType::NaN && value.is_nan() {
                    value = 0.0;
                }
                let is_missing = match missing {
                    MissingType::Zero => value.abs() <= ZERO_THRESHOLD,
                    MissingType::NaN => value.is_nan(),
                    MissingType::None => false,
                };
                let go_left = if is_missing {
                    *default_left
                } else {
                    value <= *threshold
                };
                if go_left {
                    left.predict(sample)
                } else {
                    right.predict(sample)
                }
            }
        }
    }
}

fn unsupported(msg: impl Into<String>) -> ExoError {
    ExoError::UnsupportedModel(msg.into())
}

/// Multiclass boosted-tree ensemble with softmax output
#[derive(Debug, Clone)]
pub struct GbdtClassifier {
    n_classes: usize,
    trees_per_iteration: usize,
    feature_names: Vec<String>,
    trees: Vec<GbdtNode>,
}

impl GbdtClassifier {
    /// Parse a LightGBM `dump_model()` JSON document.
    ///
    /// Fails if the model is not a softmax multiclass model, if a tree uses a
    /// construct this evaluator cannot reproduce, or if the declared feature
    /// names differ from the service's column contract.
    pub fn from_json(json: &str) -> Result<Self> {
        let dump: ModelDump = serde_json::from_str(json)?;

        if let Some(objective) = dump.objective.as_deref() {
            let name = objective.split_whitespace().next().unwrap_or_default();
            if name != "multiclass" && name != "softmax" {
                return Err(unsupported(format!("objective '{}'", objective)));
            }
        }
        if dump.num_class != Disposition::ALL.len() {
            return Err(unsupported(format!(
                "num_class = {}, expected {}",
                dump.num_class,
                Disposition::ALL.len()
            )));
        }

        check_column_contract(&dump.feature_names).map_err(|detail| ExoError::SchemaMismatch {
            artifact: "model".to_string(),
            detail,
        })?;

        let trees_per_iteration = dump.num_tree_per_iteration.unwrap_or(dump.num_class);
        if trees_per_iteration != dump.num_class {
            return Err(unsupported(format!(
                "{} trees per iteration for {} classes",
                trees_per_iteration, dump.num_class
            )));
        }

        let n_features = dump.feature_names.len();
        let mut tree_info = dump.tree_info;
        tree_info.sort_by_key(|t| t.tree_index.unwrap_or(usize::MAX));
        let trees = tree_info
            .into_iter()
            .map(|t| GbdtNode::compile(t.tree_structure, n_features))
            .collect::<Result<Vec<_>>>()?;
        if trees.is_empty() {
            return Err(unsupported("model has no trees"));
        }

        Ok(Self {
            n_classes: dump.num_class,
            trees_per_iteration,
            feature_names: dump.feature_names,
            trees,
        })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Per-class raw scores before softmax
    pub fn raw_scores(&self, features: ArrayView1<'_, f64>) -> Result<Vec<f64>> {
        if features.len() != self.feature_names.len() {
            return Err(ExoError::ShapeError {
                expected: self.feature_names.len(),
                actual: features.len(),
            });
        }
        let mut scores = vec![0.0; self.n_classes];
        for (i, tree) in self.trees.iter().enumerate() {
            scores[i % self.trees_per_iteration] += tree.predict(&features);
        }
        Ok(scores)
    }
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exp: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exp.iter().sum();
    exp.into_iter().map(|e| e / sum).collect()
}

impl Classifier for GbdtClassifier {
    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict_proba(&self, features: ArrayView1<'_, f64>) -> Result<Vec<f64>> {
        let scores = self.raw_scores(features)?;
        let proba = softmax(&scores);
        if proba.iter().any(|p| !p.is_finite()) {
            return Err(ExoError::InferenceError(
                "model produced non-finite scores".to_string(),
            ));
        }
        Ok(proba)
    }
}
