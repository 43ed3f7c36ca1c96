//! Classifier abstraction and implementations
//!
//! Provides the Classifier trait and the implementations the service ships:
//! - GbdtClassifier: gradient-boosted tree models loaded from xgboost dumps
//! - FixedClassifier: testing/demo classifier returning a fixed label
//!
//! Classifier invocation is synchronous, in-memory, CPU-bound and fast.
//! Implementations are stateless after construction and safe to share
//! across concurrent requests behind an `Arc` with no locking.

use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use std::path::Path;
use std::str::FromStr;

use crate::MedinferError;

/// Trait for pre-trained prediction models.
///
/// Implementations must be thread-safe (Send + Sync) for shared read-only
/// use across requests. The trait is object-safe to allow dynamic dispatch
/// via `Arc<dyn Classifier>`.
pub trait Classifier: Send + Sync {
    /// Predict a single integer label for a fully assembled, fixed-order
    /// feature vector matching the shape the model was trained on.
    ///
    /// For binary models the label is 0 or 1; for the general-disease
    /// model it is a class index into the disease class list.
    ///
    /// # Errors
    ///
    /// Returns [`MedinferError::Prediction`] on any failure (empty score
    /// vector, non-finite score). Never retried — the call is
    /// deterministic, so the same input would fail the same way.
    fn predict(&self, features: &[f32]) -> Result<i64, MedinferError>;

    /// Human-readable name for the model, used in logs and metrics.
    fn name(&self) -> &str {
        "classifier"
    }
}

impl std::fmt::Debug for dyn Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("name", &self.name())
            .finish()
    }
}

// ============================================================================
// Objective
// ============================================================================

/// Training objective of a model artifact.
///
/// Decides how the raw score coming out of the tree ensemble maps to an
/// integer label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    /// Probability score in `[0, 1]`; label is `score >= 0.5`.
    BinaryLogistic,
    /// Score is the predicted class id itself.
    MultiSoftmax,
}

impl Objective {
    /// The xgboost objective string this variant corresponds to.
    pub fn as_str(&self) -> &'static str {
        match self {
            Objective::BinaryLogistic => "binary:logistic",
            Objective::MultiSoftmax => "multi:softmax",
        }
    }
}

impl FromStr for Objective {
    type Err = MedinferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "binary:logistic" => Ok(Objective::BinaryLogistic),
            "multi:softmax" => Ok(Objective::MultiSoftmax),
            other => Err(MedinferError::Config(format!(
                "unknown objective '{other}' (expected 'binary:logistic' or 'multi:softmax')"
            ))),
        }
    }
}

// ============================================================================
// GBDT Classifier (production)
// ============================================================================

/// Gradient-boosted decision tree classifier backed by the `gbdt` crate.
///
/// Artifacts are xgboost dump files produced offline by the training
/// pipeline. Loading happens once at startup; the loaded ensemble is
/// immutable thereafter.
///
/// ## Example
///
/// ```no_run
/// use medinfer::model::{Classifier, GbdtClassifier, Objective};
/// use std::path::Path;
///
/// let model = GbdtClassifier::from_xgboost_dump(
///     Path::new("models/diabetes.model"),
///     Objective::BinaryLogistic,
///     "diabetes",
/// )?;
/// let label = model.predict(&[6.0, 148.0, 72.0, 35.0, 0.0, 33.6, 0.627, 50.0])?;
/// # Ok::<(), medinfer::MedinferError>(())
/// ```
pub struct GbdtClassifier {
    model: GBDT,
    objective: Objective,
    name: String,
}

impl GbdtClassifier {
    /// Load a classifier from an xgboost model dump on disk.
    ///
    /// # Errors
    ///
    /// Returns [`MedinferError::ModelLoad`] if the file cannot be read or
    /// does not parse as a model dump for the given objective.
    ///
    /// # Panics
    ///
    /// This function never panics.
    pub fn from_xgboost_dump(
        path: &Path,
        objective: Objective,
        name: impl Into<String>,
    ) -> Result<Self, MedinferError> {
        let name = name.into();
        let model =
            GBDT::from_xgboost_dump(&path.display().to_string(), objective.as_str()).map_err(
                |e| MedinferError::ModelLoad {
                    model: name.clone(),
                    reason: format!("{e} ({})", path.display()),
                },
            )?;

        Ok(Self {
            model,
            objective,
            name,
        })
    }

    /// The objective this classifier was loaded with.
    pub fn objective(&self) -> Objective {
        self.objective
    }
}

impl Classifier for GbdtClassifier {
    fn predict(&self, features: &[f32]) -> Result<i64, MedinferError> {
        let row: DataVec = vec![Data::new_test_data(features.to_vec(), None)];
        let scores = self.model.predict(&row);

        let score = scores.first().copied().ok_or_else(|| {
            MedinferError::Prediction(format!("model '{}' returned no score", self.name))
        })?;

        if !score.is_finite() {
            return Err(MedinferError::Prediction(format!(
                "model '{}' returned a non-finite score",
                self.name
            )));
        }

        let label = match self.objective {
            Objective::BinaryLogistic => i64::from(score >= 0.5),
            Objective::MultiSoftmax => score.round() as i64,
        };

        Ok(label)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// Fixed Classifier (testing/demo)
// ============================================================================

/// Dummy classifier for testing that always returns a fixed label.
///
/// Useful for handler and registry tests without real model artifacts.
pub struct FixedClassifier {
    /// The label returned by every `predict` call.
    pub label: i64,
}

impl FixedClassifier {
    /// Create a classifier that always predicts `label`.
    pub fn new(label: i64) -> Self {
        Self { label }
    }
}

impl Classifier for FixedClassifier {
    fn predict(&self, _features: &[f32]) -> Result<i64, MedinferError> {
        Ok(self.label)
    }

    fn name(&self) -> &str {
        "fixed"
    }
}
