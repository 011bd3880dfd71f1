use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{
    DurationBucket, RecommendationType, Severity, SeverityBucket, Urgency,
};

/// One user symptom submission, immutable for a single analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymptomInput {
    pub primary_symptom: String,
    pub duration: DurationBucket,
    pub severity: SeverityBucket,
    pub additional_symptoms: Vec<String>,
    pub description: String,
    pub medications_context: Option<String>,
    pub allergies_context: Option<String>,
    pub medical_history_context: Option<String>,
}

/// Normalized analysis output. After normalization every field is populated:
/// conditions, recommendations and medications are never empty, and
/// confidence/probability values are percentages in [0, 100].
///
/// JSON field names match the completion-service contract (camelCase).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub confidence: f64,
    pub possible_conditions: Vec<Condition>,
    pub recommendations: Vec<Recommendation>,
    pub medications: Vec<MedicationAdvice>,
    pub red_flags: Vec<String>,
}

/// A possible condition suggested by the analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub name: String,
    pub probability: f64,
    pub description: String,
    pub severity: Severity,
}

/// An actionable recommendation attached to the analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationType,
    pub title: String,
    pub description: String,
    pub urgency: Urgency,
}

/// A suggested medication with dosing guidance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationAdvice {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    pub side_effects: Vec<String>,
    pub price: String,
}

/// A stored symptom-analysis record: the submitted input plus, once the
/// pipeline has run, the normalized result and its provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymptomAnalysisRecord {
    pub id: Uuid,
    pub user_id: String,
    pub input: SymptomInput,
    pub analysis_result: Option<AnalysisResult>,
    pub confidence_score: Option<f64>,
    pub api_prompt: Option<String>,
    pub api_response: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_result_serializes_camel_case() {
        let result = AnalysisResult {
            confidence: 65.0,
            possible_conditions: vec![Condition {
                name: "Migraine".into(),
                probability: 80.0,
                description: "Recurrent headache disorder".into(),
                severity: Severity::Medium,
            }],
            recommendations: vec![Recommendation {
                kind: RecommendationType::Lifestyle,
                title: "Rest".into(),
                description: "Rest in a dark room".into(),
                urgency: Urgency::Low,
            }],
            medications: vec![MedicationAdvice {
                name: "Ibuprofen".into(),
                kind: "OTC".into(),
                dosage: "200mg".into(),
                frequency: "Every 6 hours".into(),
                duration: "3 days".into(),
                side_effects: vec!["Stomach upset".into()],
                price: "$5-15".into(),
            }],
            red_flags: vec![],
        };

        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("possibleConditions").is_some());
        assert!(json.get("redFlags").is_some());
        assert_eq!(json["recommendations"][0]["type"], "lifestyle");
        assert!(json["medications"][0].get("sideEffects").is_some());

        let back: AnalysisResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }
}
