use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::DatabaseError;
use crate::models::{AnalysisResult, SymptomAnalysisRecord, SymptomInput};

/// Insert a newly submitted symptom analysis (result fields still empty).
pub fn insert_analysis(
    conn: &Connection,
    record: &SymptomAnalysisRecord,
) -> Result<(), DatabaseError> {
    let additional = serde_json::to_string(&record.input.additional_symptoms)?;
    let result_json = record
        .analysis_result
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    conn.execute(
        "INSERT INTO symptom_analyses (id, user_id, primary_symptom, duration, severity,
         additional_symptoms, description, medications_context, allergies_context,
         medical_history_context, analysis_result, confidence_score, api_prompt,
         api_response, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        params![
            record.id.to_string(),
            record.user_id,
            record.input.primary_symptom,
            record.input.duration.as_str(),
            record.input.severity.as_str(),
            additional,
            record.input.description,
            record.input.medications_context,
            record.input.allergies_context,
            record.input.medical_history_context,
            result_json,
            record.confidence_score,
            record.api_prompt,
            record.api_response,
            record.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// Fetch an analysis record by id.
pub fn get_analysis(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<SymptomAnalysisRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, primary_symptom, duration, severity, additional_symptoms,
         description, medications_context, allergies_context, medical_history_context,
         analysis_result, confidence_score, api_prompt, api_response, created_at
         FROM symptom_analyses WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id.to_string()], row_to_raw);

    match result {
        Ok(row) => Ok(Some(record_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Fetch an analysis record, failing with a distinct error when the id
/// cannot be resolved (the "analysis not available" path).
pub fn require_analysis(
    conn: &Connection,
    id: &Uuid,
) -> Result<SymptomAnalysisRecord, DatabaseError> {
    get_analysis(conn, id)?.ok_or_else(|| DatabaseError::AnalysisNotFound {
        id: id.to_string(),
    })
}

/// Persist the normalized result plus its provenance for an existing record.
pub fn update_analysis_result(
    conn: &Connection,
    id: &Uuid,
    result: &AnalysisResult,
    prompt: &str,
    raw_response: Option<&str>,
) -> Result<(), DatabaseError> {
    let result_json = serde_json::to_string(result)?;
    let changed = conn.execute(
        "UPDATE symptom_analyses
         SET analysis_result = ?2, confidence_score = ?3, api_prompt = ?4, api_response = ?5
         WHERE id = ?1",
        params![
            id.to_string(),
            result_json,
            result.confidence,
            prompt,
            raw_response,
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::AnalysisNotFound { id: id.to_string() });
    }
    Ok(())
}

/// List a user's analyses, newest first.
pub fn list_analyses(
    conn: &Connection,
    user_id: &str,
) -> Result<Vec<SymptomAnalysisRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, primary_symptom, duration, severity, additional_symptoms,
         description, medications_context, allergies_context, medical_history_context,
         analysis_result, confidence_score, api_prompt, api_response, created_at
         FROM symptom_analyses WHERE user_id = ?1 ORDER BY created_at DESC",
    )?;

    let rows = stmt.query_map(params![user_id], row_to_raw)?;
    let mut records = Vec::new();
    for row in rows {
        records.push(record_from_row(row?)?);
    }
    Ok(records)
}

// Internal row type for record mapping
struct AnalysisRow {
    id: String,
    user_id: String,
    primary_symptom: String,
    duration: String,
    severity: String,
    additional_symptoms: String,
    description: String,
    medications_context: Option<String>,
    allergies_context: Option<String>,
    medical_history_context: Option<String>,
    analysis_result: Option<String>,
    confidence_score: Option<f64>,
    api_prompt: Option<String>,
    api_response: Option<String>,
    created_at: String,
}

fn row_to_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<AnalysisRow> {
    Ok(AnalysisRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        primary_symptom: row.get(2)?,
        duration: row.get(3)?,
        severity: row.get(4)?,
        additional_symptoms: row.get(5)?,
        description: row.get(6)?,
        medications_context: row.get(7)?,
        allergies_context: row.get(8)?,
        medical_history_context: row.get(9)?,
        analysis_result: row.get(10)?,
        confidence_score: row.get(11)?,
        api_prompt: row.get(12)?,
        api_response: row.get(13)?,
        created_at: row.get(14)?,
    })
}

fn record_from_row(row: AnalysisRow) -> Result<SymptomAnalysisRecord, DatabaseError> {
    let id =
        Uuid::from_str(&row.id).map_err(|_| DatabaseError::InvalidId(row.id.clone()))?;

    let created_at = DateTime::parse_from_rfc3339(&row.created_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| DatabaseError::InvalidTimestamp(row.created_at.clone()))?;

    let analysis_result: Option<AnalysisResult> = row
        .analysis_result
        .as_deref()
        .map(serde_json::from_str)
        .transpose()?;

    Ok(SymptomAnalysisRecord {
        id,
        user_id: row.user_id,
        input: SymptomInput {
            primary_symptom: row.primary_symptom,
            duration: row.duration.parse()?,
            severity: row.severity.parse()?,
            additional_symptoms: serde_json::from_str(&row.additional_symptoms)?,
            description: row.description,
            medications_context: row.medications_context,
            allergies_context: row.allergies_context,
            medical_history_context: row.medical_history_context,
        },
        analysis_result,
        confidence_score: row.confidence_score,
        api_prompt: row.api_prompt,
        api_response: row.api_response,
        created_at,
    })
}
