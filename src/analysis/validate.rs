use std::str::FromStr;

use serde_json::Value;

use crate::models::{
    AnalysisResult, Condition, MedicationAdvice, Recommendation, RecommendationType, Severity,
    Urgency,
};

/// Decode an untrusted candidate payload into a schema-valid [`AnalysisResult`].
///
/// Total over all JSON values: every missing, mistyped, or out-of-range field
/// gets a per-field default instead of failing the whole payload. Idempotent:
/// re-validating a validated result's serialization changes nothing.
pub fn validate_and_fix(candidate: &Value) -> AnalysisResult {
    let confidence = candidate
        .get("confidence")
        .and_then(Value::as_f64)
        .unwrap_or(70.0);

    let possible_conditions = array_items(candidate, "possibleConditions")
        .iter()
        .map(fix_condition)
        .collect();
    let recommendations = array_items(candidate, "recommendations")
        .iter()
        .map(fix_recommendation)
        .collect();
    let medications = array_items(candidate, "medications")
        .iter()
        .map(fix_medication)
        .collect();
    let red_flags = array_items(candidate, "redFlags")
        .iter()
        .filter_map(|v| v.as_str())
        .map(str::to_string)
        .collect();

    let result = AnalysisResult {
        confidence,
        possible_conditions,
        recommendations,
        medications,
        red_flags,
    };
    fill_empty_sections(result)
}

/// Post-pass for already-typed candidates (the prose-heuristic path): the
/// fields are well-typed by construction, only the non-emptiness invariant
/// still needs enforcing.
pub fn fill_empty_sections(mut result: AnalysisResult) -> AnalysisResult {
    if result.possible_conditions.is_empty() {
        result.possible_conditions.push(Condition {
            name: "Unspecified Condition".into(),
            probability: 60.0,
            description:
                "Based on the symptoms provided, a specific condition could not be determined"
                    .into(),
            severity: Severity::Medium,
        });
    }
    if result.recommendations.is_empty() {
        result.recommendations.push(Recommendation {
            kind: RecommendationType::Medical,
            title: "Consult healthcare provider".into(),
            description:
                "For accurate diagnosis and treatment, please consult with a healthcare professional"
                    .into(),
            urgency: Urgency::Medium,
        });
    }
    if result.medications.is_empty() {
        result.medications.push(MedicationAdvice {
            name: "As prescribed by doctor".into(),
            kind: "Prescription medication".into(),
            dosage: "As directed".into(),
            frequency: "As directed".into(),
            duration: "As directed".into(),
            side_effects: vec!["Consult healthcare provider for side effects".into()],
            price: "Varies".into(),
        });
    }
    result
}

fn fix_condition(condition: &Value) -> Condition {
    Condition {
        name: string_or(condition, "name", "Unknown Condition"),
        probability: condition
            .get("probability")
            .and_then(Value::as_f64)
            .unwrap_or(50.0),
        description: string_or(condition, "description", "No description provided"),
        severity: enum_or(condition, "severity", Severity::Medium),
    }
}

fn fix_recommendation(rec: &Value) -> Recommendation {
    Recommendation {
        kind: enum_or(rec, "type", RecommendationType::Medical),
        title: string_or(rec, "title", "Medical Recommendation"),
        description: string_or(rec, "description", "Follow medical advice"),
        urgency: enum_or(rec, "urgency", Urgency::Medium),
    }
}

fn fix_medication(med: &Value) -> MedicationAdvice {
    let side_effects: Vec<String> = med
        .get("sideEffects")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    MedicationAdvice {
        name: string_or(med, "name", "Recommended Medication"),
        kind: string_or(med, "type", "Prescription medication"),
        dosage: string_or(med, "dosage", "As directed by healthcare provider"),
        frequency: string_or(med, "frequency", "As needed"),
        duration: string_or(med, "duration", "As directed"),
        side_effects: if side_effects.is_empty() {
            vec!["Consult healthcare provider for side effects".into()]
        } else {
            side_effects
        },
        price: string_or(med, "price", "Varies"),
    }
}

/// A top-level field that is absent or not an array reads as empty.
fn array_items<'a>(value: &'a Value, field: &str) -> &'a [Value] {
    value
        .get(field)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// A missing, non-string, or blank field falls back to the default text.
fn string_or(value: &Value, field: &str, default: &str) -> String {
    match value.get(field).and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => s.to_string(),
        _ => default.to_string(),
    }
}

/// A string field coerced into a closed enum, defaulting on anything else.
fn enum_or<T: FromStr>(value: &Value, field: &str, default: T) -> T {
    value
        .get(field)
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
