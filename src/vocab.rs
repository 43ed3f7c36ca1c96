//! Symptom vocabulary and disease class decoding for the general-disease
//! model.
//!
//! ## Responsibility
//! Own the fixed symptom vocabulary and disease class list, one-hot encode
//! free-text symptom lists into feature vectors, and map predicted class
//! indices back to disease names.
//!
//! ## Guarantees
//! - Vocabulary size and order are fixed for the process lifetime; order
//!   defines feature-vector positions
//! - Position *i* of [`DISEASE_CLASSES`] corresponds exactly to the integer
//!   label *i* produced by the general-disease classifier
//! - Encoding never fails on unknown symptom names (they are ignored)
//!
//! ## NOT Responsible For
//! - Invoking the classifier (that belongs to `model`)
//! - Per-endpoint field schemas (that belongs to `schema`)

use std::collections::HashMap;
use std::sync::OnceLock;

use serde_json::Value;

use crate::{json_type_name, MedinferError};

/// Ordered vocabulary of the symptom names the general-disease model was
/// trained on. Alphabetically sorted at training time; the order defines
/// feature-vector positions and must never change while artifacts trained
/// against it are in use.
///
/// A few entries carry irregular spacing (e.g. `"dischromic _patches"`).
/// That is how they appear in the training data, and lookups match them
/// bit-exact.
pub const SYMPTOM_VOCABULARY: [&str; 133] = [
    "abdominal_pain", "abnormal_menstruation", "acidity",
    "acute_liver_failure", "altered_sensorium", "anxiety",
    "back_pain", "belly_pain", "blackheads",
    "bladder_discomfort", "blister", "blood_in_sputum",
    "bloody_stool", "blurred_and_distorted_vision", "breathlessness",
    "brittle_nails", "bruising", "burning_micturition",
    "chest_pain", "chills", "cold_hands_and_feets",
    "coma", "congestion", "constipation",
    "continuous_feel_of_urine", "continuous_sneezing", "cough",
    "cramps", "dark_urine", "dehydration",
    "depression", "diarrhoea", "dischromic _patches",
    "distention_of_abdomen", "dizziness", "drying_and_tingling_lips",
    "enlarged_thyroid", "excessive_hunger", "extra_marital_contacts",
    "family_history", "fast_heart_rate", "fatigue",
    "fluid_overload", "foul_smell_of urine", "headache",
    "high_fever", "hip_joint_pain", "history_of_alcohol_consumption",
    "increased_appetite", "indigestion", "inflammatory_nails",
    "internal_itching", "irregular_sugar_level", "irritability",
    "irritation_in_anus", "itching", "joint_pain",
    "knee_pain", "lack_of_concentration", "lethargy",
    "loss_of_appetite", "loss_of_balance", "loss_of_smell",
    "loss_of_taste", "malaise", "mild_fever",
    "mood_swings", "movement_stiffness", "mucoid_sputum",
    "muscle_pain", "muscle_wasting", "muscle_weakness",
    "nausea", "neck_pain", "nodal_skin_eruptions",
    "obesity", "pain_behind_the_eyes", "pain_during_bowel_movements",
    "pain_in_anal_region", "painful_walking", "palpitations",
    "passage_of_gases", "patches_in_throat", "phlegm",
    "polyuria", "prominent_veins_on_calf", "puffy_face_and_eyes",
    "pus_filled_pimples", "receiving_blood_transfusion", "receiving_unsterile_injections",
    "red_sore_around_nose", "red_spots_over_body", "redness_of_eyes",
    "restlessness", "runny_nose", "rusty_sputum",
    "scurring", "shivering", "silver_like_dusting",
    "sinus_pressure", "skin_peeling", "skin_rash",
    "slurred_speech", "small_dents_in_nails", "spinning_movements",
    "spotting_ urination", "stiff_neck", "stomach_bleeding",
    "stomach_pain", "sunken_eyes", "sweating",
    "swelled_lymph_nodes", "swelling_joints", "swelling_of_stomach",
    "swollen_blood_vessels", "swollen_extremeties", "swollen_legs",
    "throat_irritation", "tiredness", "toxic_look_(typhos)",
    "ulcers_on_tongue", "unsteadiness", "visual_disturbances",
    "vomiting", "watering_from_eyes", "weakness_in_limbs",
    "weakness_of_one_body_side", "weight_gain", "weight_loss",
    "yellow_crust_ooze", "yellow_urine", "yellowing_of_eyes",
    "yellowish_skin",
];

/// Ordered list of disease names indexed by the general-disease classifier
/// output. Trailing whitespace and misspellings (e.g. `"Diabetes "`,
/// `"Peptic ulcer diseae"`) are part of the trained label set and are
/// returned verbatim.
pub const DISEASE_CLASSES: [&str; 41] = [
    "(vertigo) Paroymsal  Positional Vertigo", "AIDS",
    "Acne", "Alcoholic hepatitis",
    "Allergy", "Arthritis",
    "Bronchial Asthma", "Cervical spondylosis",
    "Chicken pox", "Chronic cholestasis",
    "Common Cold", "Dengue",
    "Diabetes ", "Dimorphic hemmorhoids(piles)",
    "Drug Reaction", "Fungal infection",
    "GERD", "Gastroenteritis",
    "Heart attack", "Hepatitis B",
    "Hepatitis C", "Hepatitis D",
    "Hepatitis E", "Hypertension ",
    "Hyperthyroidism", "Hypoglycemia",
    "Hypothyroidism", "Impetigo",
    "Jaundice", "Malaria",
    "Migraine", "Osteoarthristis",
    "Paralysis (brain hemorrhage)", "Peptic ulcer diseae",
    "Pneumonia", "Psoriasis",
    "Tuberculosis", "Typhoid",
    "Urinary tract infection", "Varicose veins",
    "hepatitis A",
];

static SYMPTOM_INDEX: OnceLock<HashMap<&'static str, usize>> = OnceLock::new();

/// Vocabulary position lookup, built once on first use.
fn symptom_index() -> &'static HashMap<&'static str, usize> {
    SYMPTOM_INDEX.get_or_init(|| {
        SYMPTOM_VOCABULARY
            .iter()
            .enumerate()
            .map(|(position, name)| (*name, position))
            .collect()
    })
}

/// One-hot encode a JSON list of symptom names into a feature vector.
///
/// The result has one slot per vocabulary entry: 1.0 at each position whose
/// entry matches a whitespace-trimmed input string, 0.0 elsewhere.
/// Unrecognized symptom names are silently ignored — no error, no vector
/// slot. An empty list yields an all-zero vector (a legitimate input, not
/// an error).
///
/// # Errors
///
/// Returns [`MedinferError::InvalidInput`] if any element of the list is
/// not a JSON string; the message names the offending value's type.
///
/// # Panics
///
/// This function never panics.
///
/// # Example
///
/// ```rust
/// use medinfer::vocab::encode_symptoms;
/// use serde_json::json;
///
/// let features = encode_symptoms(&[json!("itching"), json!("made_up")])?;
/// assert_eq!(features.iter().filter(|&&f| f == 1.0).count(), 1);
/// # Ok::<(), medinfer::MedinferError>(())
/// ```
pub fn encode_symptoms(symptoms: &[Value]) -> Result<Vec<f32>, MedinferError> {
    let index = symptom_index();
    let mut features = vec![0.0f32; SYMPTOM_VOCABULARY.len()];

    for value in symptoms {
        let name = value.as_str().ok_or_else(|| {
            MedinferError::InvalidInput(format!(
                "all symptoms must be strings, got {}",
                json_type_name(value)
            ))
        })?;

        // Symptoms are trimmed the same way the training pipeline trimmed them.
        if let Some(&position) = index.get(name.trim()) {
            features[position] = 1.0;
        }
    }

    Ok(features)
}

/// Map a predicted class index back to its disease name.
///
/// # Errors
///
/// Returns [`MedinferError::OutOfRange`] if the index falls outside
/// `[0, DISEASE_CLASSES.len())`. Surfaced to HTTP callers as an internal
/// error, never retried.
///
/// # Panics
///
/// This function never panics.
pub fn decode_disease(class_index: i64) -> Result<&'static str, MedinferError> {
    usize::try_from(class_index)
        .ok()
        .and_then(|i| DISEASE_CLASSES.get(i))
        .copied()
        .ok_or(MedinferError::OutOfRange {
            index: class_index,
            len: DISEASE_CLASSES.len(),
        })
}
