//! Per-endpoint request contracts
//!
//! ## Responsibility
//! Own the static contract of every tabular prediction endpoint: the route,
//! the ordered list of required field names, and the label table mapping
//! classifier output to a display string. Assemble feature vectors from
//! validated JSON objects.
//!
//! ## Guarantees
//! - Field names are matched bit-exact (`bloodPressure`, `MDVP:Fo(Hz)`, `Bp`)
//! - Feature order is the declared field order, fixed for the process lifetime
//! - Validation happens before any numeric assembly; the first missing field
//!   in declared order is the one reported
//!
//! ## NOT Responsible For
//! - The symptom-list endpoint (that belongs to `vocab`)
//! - Invoking classifiers or shaping HTTP responses (that belongs to `server`)

use serde_json::{Map, Value};
use thiserror::Error;

use crate::json_type_name;
use crate::registry::ModelKey;

/// Field-level validation errors for tabular endpoints.
///
/// Always caller errors, surfaced as HTTP 400. The `Display` output is the
/// exact message returned in the response body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// A required field is absent from the request body.
    #[error("Missing field: {0}")]
    Missing(String),

    /// A required field is present but not a JSON number.
    #[error("Invalid field: {field} must be a number, got {type_name}")]
    NotNumeric {
        /// Name of the offending field.
        field: String,
        /// JSON type the caller actually sent.
        type_name: &'static str,
    },
}

/// Static table mapping a classifier label to its display string.
#[derive(Debug, Clone, Copy)]
pub struct LabelTable(
    /// `(label, display string)` pairs, checked in order.
    pub &'static [(i64, &'static str)],
);

impl LabelTable {
    /// Look up the display string for a predicted label.
    ///
    /// Returns `None` for labels absent from the table — the caller treats
    /// that as a prediction error, not a fallback.
    pub fn display(&self, label: i64) -> Option<&'static str> {
        self.0
            .iter()
            .find(|(candidate, _)| *candidate == label)
            .map(|(_, text)| *text)
    }
}

/// Static contract of one tabular prediction endpoint.
#[derive(Debug, Clone, Copy)]
pub struct EndpointSpec {
    /// Registry key of the model this endpoint invokes.
    pub key: ModelKey,
    /// HTTP route the endpoint is mounted at.
    pub route: &'static str,
    /// Required field names, in feature-vector order.
    pub fields: &'static [&'static str],
    /// Label-to-display-string table for this model.
    pub labels: LabelTable,
}

/// Assemble an ordered feature vector from a JSON object.
///
/// Walks `fields` in declared order: every field must be present and a JSON
/// number. Checked before any numeric assembly, so a bad request never
/// reaches the classifier.
///
/// # Errors
///
/// - [`FieldError::Missing`] for the first absent field in declared order.
/// - [`FieldError::NotNumeric`] for the first non-number field value.
///
/// # Panics
///
/// This function never panics.
pub fn extract_features(
    fields: &[&str],
    body: &Map<String, Value>,
) -> Result<Vec<f32>, FieldError> {
    let mut features = Vec::with_capacity(fields.len());

    for name in fields {
        let value = body
            .get(*name)
            .ok_or_else(|| FieldError::Missing((*name).to_string()))?;
        let number = value.as_f64().ok_or_else(|| FieldError::NotNumeric {
            field: (*name).to_string(),
            type_name: json_type_name(value),
        })?;
        features.push(number as f32);
    }

    Ok(features)
}

// ============================================================================
// Endpoint contracts
// ============================================================================

/// `POST /api/diabetes` — Pima-style diabetes screening (8 features).
pub const DIABETES: EndpointSpec = EndpointSpec {
    key: ModelKey::Diabetes,
    route: "/api/diabetes",
    fields: &[
        "pregnancies",
        "glucose",
        "bloodPressure",
        "skinThickness",
        "insulin",
        "bmi",
        "diabetesPedigreeFunction",
        "age",
    ],
    labels: LabelTable(&[(1, "Diabetic"), (0, "Not Diabetic")]),
};

/// `POST /api/heart` — Cleveland-style heart disease screening (13 features).
pub const HEART: EndpointSpec = EndpointSpec {
    key: ModelKey::Heart,
    route: "/api/heart",
    fields: &[
        "age", "sex", "cp", "trestbps", "chol", "fbs", "restecg", "thalach", "exang", "oldpeak",
        "slope", "ca", "thal",
    ],
    labels: LabelTable(&[(1, "Heart Disease"), (0, "No Heart Disease")]),
};

/// `POST /api/parkinson` — voice-measure Parkinson's screening (22 features).
pub const PARKINSON: EndpointSpec = EndpointSpec {
    key: ModelKey::Parkinson,
    route: "/api/parkinson",
    fields: &[
        "MDVP:Fo(Hz)",
        "MDVP:Fhi(Hz)",
        "MDVP:Flo(Hz)",
        "MDVP:Jitter(%)",
        "MDVP:Jitter(Abs)",
        "MDVP:RAP",
        "MDVP:PPQ",
        "Jitter:DDP",
        "MDVP:Shimmer",
        "MDVP:Shimmer(dB)",
        "Shimmer:APQ3",
        "Shimmer:APQ5",
        "MDVP:APQ",
        "Shimmer:DDA",
        "NHR",
        "HNR",
        "RPDE",
        "DFA",
        "spread1",
        "spread2",
        "D2",
        "PPE",
    ],
    labels: LabelTable(&[(1, "Parkinson's Disease"), (0, "No Parkinson's Disease")]),
};

/// `POST /api/lung_cancer` — lifestyle/symptom lung cancer screening
/// (15 features).
pub const LUNG_CANCER: EndpointSpec = EndpointSpec {
    key: ModelKey::LungCancer,
    route: "/api/lung_cancer",
    fields: &[
        "Gender",
        "Age",
        "Smoking",
        "Yellow_Fingers",
        "Anxiety",
        "Peer_Pressure",
        "Chronic_Disease",
        "Fatigue",
        "Allergy",
        "Wheezing",
        "Alcohol_Consuming",
        "Coughing",
        "Shortness_Of_Breath",
        "Swallowing_Difficulty",
        "Chest_Pain",
    ],
    labels: LabelTable(&[(1, "Lung Cancer"), (0, "No Lung Cancer")]),
};

/// `POST /api/breast_cancer` — Wisconsin-style breast cancer screening
/// (30 features).
pub const BREAST_CANCER: EndpointSpec = EndpointSpec {
    key: ModelKey::BreastCancer,
    route: "/api/breast_cancer",
    fields: &[
        "radius_mean",
        "texture_mean",
        "perimeter_mean",
        "area_mean",
        "smoothness_mean",
        "compactness_mean",
        "concavity_mean",
        "concave_points_mean",
        "symmetry_mean",
        "fractal_dimension_mean",
        "radius_se",
        "texture_se",
        "perimeter_se",
        "area_se",
        "smoothness_se",
        "compactness_se",
        "concavity_se",
        "concave_points_se",
        "symmetry_se",
        "fractal_dimension_se",
        "radius_worst",
        "texture_worst",
        "perimeter_worst",
        "area_worst",
        "smoothness_worst",
        "compactness_worst",
        "concavity_worst",
        "concave_points_worst",
        "symmetry_worst",
        "fractal_dimension_worst",
    ],
    labels: LabelTable(&[(1, "Breast Cancer"), (0, "No Breast Cancer")]),
};

/// `POST /api/chronic_kidney` — chronic kidney disease screening
/// (13 features).
pub const CHRONIC_KIDNEY: EndpointSpec = EndpointSpec {
    key: ModelKey::ChronicKidney,
    route: "/api/chronic_kidney",
    fields: &[
        "Bp", "Sg", "Al", "Su", "Rbc", "Bu", "Sc", "Sod", "Pot", "Hemo", "Wbcc", "Rbcc", "Htn",
    ],
    labels: LabelTable(&[(1, "Chronic Kidney Disease"), (0, "No Chronic Kidney Disease")]),
};

/// `POST /api/hepatitis` — hepatitis C panel screening (12 features).
pub const HEPATITIS: EndpointSpec = EndpointSpec {
    key: ModelKey::Hepatitis,
    route: "/api/hepatitis",
    fields: &[
        "Age", "Sex", "ALB", "ALP", "ALT", "AST", "BIL", "CHE", "CHOL", "CREA", "GGT", "PROT",
    ],
    labels: LabelTable(&[(1, "Hepatitis"), (0, "No Hepatitis")]),
};

/// `POST /api/liver` — liver function panel screening (10 features).
pub const LIVER: EndpointSpec = EndpointSpec {
    key: ModelKey::Liver,
    route: "/api/liver",
    fields: &[
        "Sex",
        "age",
        "Total_Bilirubin",
        "Direct_Bilirubin",
        "Alkaline_Phosphotase",
        "Alamine_Aminotransferase",
        "Aspartate_Aminotransferase",
        "Total_Protiens",
        "Albumin",
        "Albumin_and_Globulin_Ratio",
    ],
    labels: LabelTable(&[(1, "Liver Disease"), (0, "No Liver Disease")]),
};

/// All tabular endpoint contracts, in routing order.
pub const TABULAR_ENDPOINTS: [EndpointSpec; 8] = [
    DIABETES,
    HEART,
    PARKINSON,
    LUNG_CANCER,
    BREAST_CANCER,
    CHRONIC_KIDNEY,
    HEPATITIS,
    LIVER,
];

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_extract_features_preserves_declared_order() {
        let map = body(&[("b", json!(2.0)), ("a", json!(1.0)), ("c", json!(3.0))]);
        let features = extract_features(&["a", "b", "c"], &map).unwrap();
        assert_eq!(features, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_extract_features_reports_first_missing_field() {
        let map = body(&[("a", json!(1.0))]);
        let err = extract_features(&["a", "b", "c"], &map).unwrap_err();
        assert_eq!(err, FieldError::Missing("b".to_string()));
        assert_eq!(err.to_string(), "Missing field: b");
    }

    #[test]
    fn test_extract_features_rejects_non_numeric_naming_type() {
        let map = body(&[("a", json!("not a number"))]);
        let err = extract_features(&["a"], &map).unwrap_err();
        assert!(matches!(err, FieldError::NotNumeric { .. }));
        assert!(err.to_string().contains("a must be a number"));
        assert!(err.to_string().contains("string"));
    }

    #[test]
    fn test_extract_features_accepts_integers_and_floats() {
        let map = body(&[("a", json!(42)), ("b", json!(0.627))]);
        let features = extract_features(&["a", "b"], &map).unwrap();
        assert_eq!(features, vec![42.0, 0.627]);
    }

    #[test]
    fn test_extract_features_ignores_extra_fields() {
        let map = body(&[("a", json!(1.0)), ("unexpected", json!("whatever"))]);
        let features = extract_features(&["a"], &map).unwrap();
        assert_eq!(features, vec![1.0]);
    }

    #[test]
    fn test_label_table_lookup() {
        assert_eq!(DIABETES.labels.display(1), Some("Diabetic"));
        assert_eq!(DIABETES.labels.display(0), Some("Not Diabetic"));
        assert_eq!(DIABETES.labels.display(2), None);
    }

    #[test]
    fn test_endpoint_field_counts_match_trained_shapes() {
        assert_eq!(DIABETES.fields.len(), 8);
        assert_eq!(HEART.fields.len(), 13);
        assert_eq!(PARKINSON.fields.len(), 22);
        assert_eq!(LUNG_CANCER.fields.len(), 15);
        assert_eq!(BREAST_CANCER.fields.len(), 30);
        assert_eq!(CHRONIC_KIDNEY.fields.len(), 13);
        assert_eq!(HEPATITIS.fields.len(), 12);
        assert_eq!(LIVER.fields.len(), 10);
    }

    #[test]
    fn test_every_endpoint_has_binary_labels() {
        for spec in &TABULAR_ENDPOINTS {
            assert!(spec.labels.display(0).is_some(), "{}", spec.route);
            assert!(spec.labels.display(1).is_some(), "{}", spec.route);
        }
    }

    #[test]
    fn test_every_route_is_under_api_prefix() {
        for spec in &TABULAR_ENDPOINTS {
            assert!(spec.route.starts_with("/api/"), "{}", spec.route);
        }
    }

    #[test]
    fn test_field_names_are_unique_per_endpoint() {
        for spec in &TABULAR_ENDPOINTS {
            let unique: std::collections::HashSet<_> = spec.fields.iter().collect();
            assert_eq!(unique.len(), spec.fields.len(), "{}", spec.route);
        }
    }
}
