//! Model registry
//!
//! ## Responsibility
//! Own the fixed mapping from a model identifier to a deserialized
//! classifier, loaded once at process start from on-disk artifacts.
//!
//! ## Guarantees
//! - Constructed once at startup; read-only thereafter (no hidden mutation)
//! - Safe for concurrent access from every request handler with no locking
//!   (classifiers are shared via `Arc` and never mutated)
//! - A broken or missing artifact fails startup, not the first request
//!
//! ## NOT Responsible For
//! - Artifact file formats and score mapping (that belongs to `model`)
//! - Resolving artifact paths from configuration (that belongs to `config`)

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::info;

use crate::config::ModelsSection;
use crate::model::{Classifier, GbdtClassifier, Objective};
use crate::MedinferError;

// ============================================================================
// Model keys
// ============================================================================

/// Identifier of one prediction model in the registry.
///
/// One key per disease endpoint. The string form (`"diabetes"`,
/// `"general_disease"`, …) is used in configuration tables, artifact file
/// names, logs, and metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKey {
    /// Diabetes screening model.
    Diabetes,
    /// Heart disease screening model.
    Heart,
    /// Parkinson's disease screening model.
    Parkinson,
    /// Lung cancer screening model.
    LungCancer,
    /// Breast cancer screening model.
    BreastCancer,
    /// Chronic kidney disease screening model.
    ChronicKidney,
    /// Hepatitis screening model.
    Hepatitis,
    /// Liver disease screening model.
    Liver,
    /// Multi-class general disease model over the symptom vocabulary.
    GeneralDisease,
}

impl ModelKey {
    /// Every model key, in registry load order.
    pub const ALL: [ModelKey; 9] = [
        ModelKey::Diabetes,
        ModelKey::Heart,
        ModelKey::Parkinson,
        ModelKey::LungCancer,
        ModelKey::BreastCancer,
        ModelKey::ChronicKidney,
        ModelKey::Hepatitis,
        ModelKey::Liver,
        ModelKey::GeneralDisease,
    ];

    /// The stable string form of this key.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKey::Diabetes => "diabetes",
            ModelKey::Heart => "heart",
            ModelKey::Parkinson => "parkinson",
            ModelKey::LungCancer => "lung_cancer",
            ModelKey::BreastCancer => "breast_cancer",
            ModelKey::ChronicKidney => "chronic_kidney",
            ModelKey::Hepatitis => "hepatitis",
            ModelKey::Liver => "liver",
            ModelKey::GeneralDisease => "general_disease",
        }
    }

    /// Default artifact file name for this model (`<key>.model`).
    pub fn default_file(&self) -> String {
        format!("{}.model", self.as_str())
    }

    /// Default training objective for this model's artifact.
    ///
    /// The general-disease model predicts a class index; every other
    /// model is a binary screen.
    pub fn default_objective(&self) -> Objective {
        match self {
            ModelKey::GeneralDisease => Objective::MultiSoftmax,
            _ => Objective::BinaryLogistic,
        }
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKey {
    type Err = MedinferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelKey::ALL
            .iter()
            .find(|key| key.as_str() == s)
            .copied()
            .ok_or_else(|| MedinferError::Config(format!("unknown model key '{s}'")))
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Fixed mapping from [`ModelKey`] to a shared classifier.
///
/// Loaded once at process start and handed to request handlers behind an
/// `Arc` — an immutable shared structure, not a singleton with hidden
/// mutation.
#[derive(Debug)]
pub struct ModelRegistry {
    models: HashMap<ModelKey, Arc<dyn Classifier>>,
}

impl ModelRegistry {
    /// Load every model artifact described by the configuration.
    ///
    /// All nine models are loaded eagerly; the first artifact that cannot
    /// be read or parsed aborts startup.
    ///
    /// # Errors
    ///
    /// - [`MedinferError::Config`] if an artifact entry is invalid.
    /// - [`MedinferError::ModelLoad`] if an artifact cannot be loaded.
    ///
    /// # Panics
    ///
    /// This function never panics.
    pub fn load(models: &ModelsSection) -> Result<Self, MedinferError> {
        let mut loaded: HashMap<ModelKey, Arc<dyn Classifier>> = HashMap::new();

        for key in ModelKey::ALL {
            let (path, objective) = models.resolve(key)?;
            let classifier = GbdtClassifier::from_xgboost_dump(&path, objective, key.as_str())?;
            info!(
                model = key.as_str(),
                path = %path.display(),
                objective = objective.as_str(),
                "loaded model artifact"
            );
            loaded.insert(key, Arc::new(classifier));
        }

        Ok(Self { models: loaded })
    }

    /// Start building a registry by hand (tests, demos).
    pub fn builder() -> ModelRegistryBuilder {
        ModelRegistryBuilder {
            models: HashMap::new(),
        }
    }

    /// Look up the classifier for a model key.
    ///
    /// # Errors
    ///
    /// Returns [`MedinferError::ModelUnavailable`] if the key was never
    /// loaded into this registry.
    pub fn get(&self, key: ModelKey) -> Result<&Arc<dyn Classifier>, MedinferError> {
        self.models
            .get(&key)
            .ok_or_else(|| MedinferError::ModelUnavailable(key.as_str().to_string()))
    }

    /// Number of loaded models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether the registry holds no models.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// Builder for assembling a [`ModelRegistry`] without touching disk.
pub struct ModelRegistryBuilder {
    models: HashMap<ModelKey, Arc<dyn Classifier>>,
}

impl ModelRegistryBuilder {
    /// Register a classifier under the given key.
    pub fn with_model(mut self, key: ModelKey, classifier: Arc<dyn Classifier>) -> Self {
        self.models.insert(key, classifier);
        self
    }

    /// Finish building the registry.
    pub fn build(self) -> ModelRegistry {
        ModelRegistry {
            models: self.models,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FixedClassifier;

    #[test]
    fn test_model_key_string_round_trips() {
        for key in ModelKey::ALL {
            let parsed: ModelKey = key.as_str().parse().unwrap();
            assert_eq!(parsed, key);
        }
    }

    #[test]
    fn test_model_key_rejects_unknown_string() {
        let err = "alzheimers".parse::<ModelKey>().unwrap_err();
        assert!(err.to_string().contains("alzheimers"));
    }

    #[test]
    fn test_default_objectives() {
        assert_eq!(
            ModelKey::GeneralDisease.default_objective(),
            Objective::MultiSoftmax
        );
        for key in ModelKey::ALL {
            if key != ModelKey::GeneralDisease {
                assert_eq!(key.default_objective(), Objective::BinaryLogistic);
            }
        }
    }

    #[test]
    fn test_default_file_uses_key_string() {
        assert_eq!(ModelKey::Diabetes.default_file(), "diabetes.model");
        assert_eq!(
            ModelKey::GeneralDisease.default_file(),
            "general_disease.model"
        );
    }

    #[test]
    fn test_builder_registry_serves_registered_models() {
        let registry = ModelRegistry::builder()
            .with_model(ModelKey::Diabetes, Arc::new(FixedClassifier::new(1)))
            .build();

        assert_eq!(registry.len(), 1);
        let model = registry.get(ModelKey::Diabetes).unwrap();
        assert_eq!(model.predict(&[0.0; 8]).unwrap(), 1);
    }

    #[test]
    fn test_load_fails_fast_on_missing_artifacts() {
        let models = crate::config::ModelsSection {
            dir: "/nonexistent/artifacts".to_string(),
            entries: std::collections::HashMap::new(),
        };
        let err = ModelRegistry::load(&models).unwrap_err();
        assert!(matches!(err, MedinferError::ModelLoad { .. }));
    }

    #[test]
    fn test_missing_model_is_unavailable_error() {
        let registry = ModelRegistry::builder().build();
        assert!(registry.is_empty());
        let err = registry.get(ModelKey::Heart).unwrap_err();
        assert!(matches!(err, MedinferError::ModelUnavailable(_)));
        assert!(err.to_string().contains("heart"));
    }
}
