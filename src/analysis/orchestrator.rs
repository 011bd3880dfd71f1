use rusqlite::Connection;
use tracing::{info, info_span, warn};
use uuid::Uuid;

use super::defaults::default_analysis;
use super::heuristic::parse_prose_response;
use super::parser::parse_json_response;
use super::prompt::build_analysis_prompt;
use super::types::{AnalysisOutcome, AnalysisTier, CompletionClient};
use super::validate::{fill_empty_sections, validate_and_fix};
use crate::db;
use crate::models::{AnalysisResult, SymptomInput};

/// Runs the full analysis flow: prompt, completion call, tiered
/// normalization, and (optionally) persistence of the outcome.
pub struct SymptomAnalyzer<C: CompletionClient> {
    client: C,
}

impl<C: CompletionClient> SymptomAnalyzer<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Analyze a symptom submission. Never fails: any completion-side error
    /// degrades to the synthetic default for the primary symptom.
    pub fn analyze(&self, input: &SymptomInput) -> AnalysisOutcome {
        let span = info_span!("analyze", symptom = %input.primary_symptom);
        let _guard = span.enter();

        let prompt = build_analysis_prompt(input);

        match self.client.complete(&prompt) {
            Ok(raw) => {
                let (result, tier) = normalize(&raw);
                info!(?tier, confidence = result.confidence, "analysis normalized");
                AnalysisOutcome {
                    result,
                    tier,
                    prompt,
                    raw_response: Some(raw),
                }
            }
            Err(e) => {
                warn!(error = %e, "completion call failed, using synthetic default");
                AnalysisOutcome {
                    result: default_analysis(&input.primary_symptom),
                    tier: AnalysisTier::SyntheticDefault,
                    prompt,
                    raw_response: None,
                }
            }
        }
    }

    /// Analyze and persist the outcome onto an existing record.
    ///
    /// Persistence failures are logged and swallowed: the caller still gets
    /// a result, the stored row just stays stale.
    pub fn analyze_and_store(
        &self,
        conn: &Connection,
        id: &Uuid,
        input: &SymptomInput,
    ) -> AnalysisOutcome {
        let outcome = self.analyze(input);
        if let Err(e) = db::update_analysis_result(
            conn,
            id,
            &outcome.result,
            &outcome.prompt,
            outcome.raw_response.as_deref(),
        ) {
            warn!(error = %e, analysis_id = %id, "failed to persist analysis result");
        }
        outcome
    }
}

/// Normalize a raw completion reply into a schema-valid result.
///
/// Tier 1: a brace-delimited JSON span, validated field by field. Tier 2:
/// prose section heuristics, with synthetic entries for empty sections.
pub fn normalize(raw: &str) -> (AnalysisResult, AnalysisTier) {
    if let Some(value) = parse_json_response(raw) {
        return (validate_and_fix(&value), AnalysisTier::DirectJson);
    }
    let result = fill_empty_sections(parse_prose_response(raw));
    (result, AnalysisTier::HeuristicText)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::gemini::MockCompletionClient;
    use crate::db::{insert_analysis, open_memory_database, require_analysis};
    use crate::models::{DurationBucket, SeverityBucket, SymptomAnalysisRecord};
    use chrono::Utc;

    fn sample_input(symptom: &str) -> SymptomInput {
        SymptomInput {
            primary_symptom: symptom.into(),
            duration: DurationBucket::OneToThreeDays,
            severity: SeverityBucket::Moderate,
            additional_symptoms: vec![],
            description: String::new(),
            medications_context: None,
            allergies_context: None,
            medical_history_context: None,
        }
    }

    const JSON_REPLY: &str = r#"Here is the analysis:
{"confidence":42,"possibleConditions":[{"name":"X","probability":10,"description":"d","severity":"low"}],"recommendations":[{"type":"medical","title":"T","description":"D","urgency":"low"}],"medications":[{"name":"M","type":"OTC","dosage":"1","frequency":"2","duration":"3","sideEffects":["s"],"price":"$1"}],"redFlags":[]}"#;

    #[test]
    fn json_reply_takes_tier_one() {
        let (result, tier) = normalize(JSON_REPLY);
        assert_eq!(tier, AnalysisTier::DirectJson);
        assert_eq!(result.confidence, 42.0);
        assert_eq!(result.possible_conditions[0].name, "X");
        assert_eq!(result.possible_conditions[0].probability, 10.0);
    }

    #[test]
    fn prose_reply_takes_tier_two() {
        let raw = "Possible conditions\nMigraine - 80%\nThrobbing pain\n\nRecommendations\nRest : take it easy";
        let (result, tier) = normalize(raw);
        assert_eq!(tier, AnalysisTier::HeuristicText);
        assert_eq!(result.possible_conditions[0].name, "Migraine");
        // empty medications got a synthetic entry
        assert_eq!(result.medications.len(), 1);
        assert_eq!(result.medications[0].name, "As prescribed by doctor");
    }

    #[test]
    fn invalid_json_span_falls_through_to_tier_two() {
        let raw = "Possible conditions\nFlu - 60%\nSeasonal {not json} infection";
        let (result, tier) = normalize(raw);
        assert_eq!(tier, AnalysisTier::HeuristicText);
        assert_eq!(result.possible_conditions[0].name, "Flu");
    }

    #[test]
    fn tier_two_output_is_never_empty() {
        let (result, tier) = normalize("completely unstructured prose");
        assert_eq!(tier, AnalysisTier::HeuristicText);
        assert!(!result.possible_conditions.is_empty());
        assert!(!result.recommendations.is_empty());
        assert!(!result.medications.is_empty());
    }

    #[test]
    fn transport_failure_yields_synthetic_default() {
        let analyzer = SymptomAnalyzer::new(MockCompletionClient::failing());
        let outcome = analyzer.analyze(&sample_input("Headache"));

        assert_eq!(outcome.tier, AnalysisTier::SyntheticDefault);
        assert!(outcome.raw_response.is_none());
        assert_eq!(outcome.result, default_analysis("Headache"));
        assert_eq!(outcome.result.confidence, 65.0);
        assert_eq!(
            outcome.result.possible_conditions[0].name,
            "Headache - Common Cause"
        );
        assert_eq!(outcome.result.recommendations.len(), 3);
        assert_eq!(outcome.result.medications.len(), 1);
        assert!(outcome.result.red_flags.is_empty());
    }

    #[test]
    fn successful_analysis_carries_prompt_and_raw_reply() {
        let analyzer = SymptomAnalyzer::new(MockCompletionClient::new(JSON_REPLY));
        let outcome = analyzer.analyze(&sample_input("Fever"));

        assert_eq!(outcome.tier, AnalysisTier::DirectJson);
        assert!(outcome.prompt.contains("Fever"));
        assert_eq!(outcome.raw_response.as_deref(), Some(JSON_REPLY));
    }

    #[test]
    fn analyze_and_store_persists_outcome() {
        let conn = open_memory_database().unwrap();
        let input = sample_input("Fever");
        let record = SymptomAnalysisRecord {
            id: Uuid::new_v4(),
            user_id: "user-1".into(),
            input: input.clone(),
            analysis_result: None,
            confidence_score: None,
            api_prompt: None,
            api_response: None,
            created_at: Utc::now(),
        };
        insert_analysis(&conn, &record).unwrap();

        let analyzer = SymptomAnalyzer::new(MockCompletionClient::new(JSON_REPLY));
        let outcome = analyzer.analyze_and_store(&conn, &record.id, &input);

        let stored = require_analysis(&conn, &record.id).unwrap();
        assert_eq!(stored.analysis_result.as_ref(), Some(&outcome.result));
        assert_eq!(stored.confidence_score, Some(42.0));
        assert!(stored.api_prompt.is_some());
        assert_eq!(stored.api_response.as_deref(), Some(JSON_REPLY));
    }

    #[test]
    fn store_against_missing_record_still_returns_result() {
        let conn = open_memory_database().unwrap();
        let analyzer = SymptomAnalyzer::new(MockCompletionClient::failing());
        let outcome =
            analyzer.analyze_and_store(&conn, &Uuid::new_v4(), &sample_input("Cough"));
        assert_eq!(outcome.tier, AnalysisTier::SyntheticDefault);
    }
}
