use crate::models::SymptomInput;

/// Build the analysis prompt for one symptom submission.
///
/// The model is asked for a strict JSON object; confidence and probability
/// are requested as 0-1 fractions (the published prompt format), which the
/// Tier-1 parser rescales to the crate's canonical 0-100 percent.
pub fn build_analysis_prompt(input: &SymptomInput) -> String {
    let additional = input
        .additional_symptoms
        .iter()
        .map(|s| format!("\"{s}\""))
        .collect::<Vec<_>>()
        .join(", ");

    let description = if input.description.trim().is_empty() {
        "N/A"
    } else {
        input.description.as_str()
    };

    format!(
        r#"Analyze the following user symptoms and medical context to provide a health analysis.
Your response MUST be a single JSON object that strictly adheres to the following structure:
{{
  "confidence": number (0-1, e.g., 0.85),
  "possibleConditions": [
    {{
      "name": string,
      "probability": number (0-1),
      "description": string,
      "severity": "low" | "medium" | "high"
    }}
  ],
  "recommendations": [
    {{
      "type": "medication" | "lifestyle" | "medical",
      "title": string,
      "description": string,
      "urgency": "low" | "medium" | "high"
    }}
  ],
  "medications": [
    {{
      "name": string (suggest widely recognized OTC medications where appropriate, generic or common prescription names otherwise),
      "type": string (OTC, prescription, etc.),
      "dosage": string,
      "frequency": string,
      "duration": string,
      "sideEffects": string[],
      "price": string
    }}
  ],
  "redFlags": string[]
}}

User Data:
{{
  "primary_symptom": "{primary}",
  "other_symptoms": [{additional}],
  "symptom_details": [{{
    "symptom": "{primary}",
    "duration": "{duration}",
    "severity": "{severity}",
    "notes": "{description}"
  }}],
  "medications_context": "{medications_context}",
  "allergies_context": "{allergies_context}",
  "medical_history_context": "{medical_history_context}"
}}

Instructions:
1. Possible Conditions: List at least 2-3 potential conditions with their likelihood.
2. Medications: at least 2-3 entries with type, dosage, frequency, duration, key side effects and an indicative price.
3. Lifestyle/Medical Recommendations: Provide actionable advice.
4. Red Flags: Highlight any symptoms requiring immediate attention.
5. Confidence Score: Overall confidence in this analysis.
Ensure your response is ONLY the JSON object with no additional text before or after."#,
        primary = input.primary_symptom,
        additional = additional,
        duration = input.duration.as_str(),
        severity = input.severity.as_str(),
        description = description,
        medications_context = context_or_default(&input.medications_context),
        allergies_context = context_or_default(&input.allergies_context),
        medical_history_context = context_or_default(&input.medical_history_context),
    )
}

fn context_or_default(context: &Option<String>) -> &str {
    match context {
        Some(c) if !c.trim().is_empty() => c,
        _ => "Not provided",
    }
}
