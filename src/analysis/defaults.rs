use crate::models::{
    AnalysisResult, Condition, MedicationAdvice, Recommendation, RecommendationType, Severity,
    Urgency,
};

/// Synthetic analysis produced when the completion call itself fails.
///
/// Deterministic: the same symptom always yields the same structure, so the
/// degraded path stays testable and the user still sees generic, safe advice.
pub fn default_analysis(primary_symptom: &str) -> AnalysisResult {
    let symptom = if primary_symptom.trim().is_empty() {
        "Unknown Symptom"
    } else {
        primary_symptom
    };
    let titled = capitalize(symptom);
    let lowered = symptom.to_lowercase();

    AnalysisResult {
        confidence: 65.0,
        possible_conditions: vec![
            Condition {
                name: format!("{titled} - Common Cause"),
                probability: 70.0,
                description: format!("Common cause of {lowered}"),
                severity: Severity::Low,
            },
            Condition {
                name: format!("{titled} - Secondary Cause"),
                probability: 30.0,
                description: format!("Less common cause of {lowered}"),
                severity: Severity::Medium,
            },
        ],
        recommendations: vec![
            Recommendation {
                kind: RecommendationType::Medication,
                title: "Over-the-counter relief".into(),
                description: "Consider appropriate over-the-counter medication for symptom relief"
                    .into(),
                urgency: Urgency::Medium,
            },
            Recommendation {
                kind: RecommendationType::Lifestyle,
                title: "Rest and hydration".into(),
                description: "Ensure adequate rest and stay hydrated".into(),
                urgency: Urgency::Low,
            },
            Recommendation {
                kind: RecommendationType::Medical,
                title: "Consult healthcare provider".into(),
                description:
                    "If symptoms persist or worsen, consult with a healthcare professional".into(),
                urgency: Urgency::Medium,
            },
        ],
        medications: vec![MedicationAdvice {
            name: "Generic Relief Medication".into(),
            kind: "Symptom reliever".into(),
            dosage: "As directed on packaging".into(),
            frequency: "As needed".into(),
            duration: "Until symptoms improve".into(),
            side_effects: vec![
                "Varies by medication".into(),
                "Follow package instructions".into(),
            ],
            price: "$5-15".into(),
        }],
        red_flags: vec![],
    }
}

/// Uppercase the first character, leave the rest as written.
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
