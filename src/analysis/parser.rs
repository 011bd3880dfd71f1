use serde_json::Value;
use tracing::debug;

/// Slice the candidate JSON object out of a completion reply.
///
/// Models often wrap the object in markdown fences or prose, so the
/// extraction is greedy: everything from the first `{` to the last `}`.
pub fn extract_json_candidate(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Parse a completion reply into a JSON value, if it carries one.
///
/// Returns `None` when no brace-delimited span exists or the span is not
/// valid JSON; the caller then falls through to the prose heuristics.
pub fn parse_json_response(text: &str) -> Option<Value> {
    let candidate = extract_json_candidate(text)?;
    match serde_json::from_str::<Value>(candidate) {
        Ok(mut value) => {
            rescale_fractions(&mut value);
            Some(value)
        }
        Err(e) => {
            debug!(error = %e, "candidate span is not valid JSON");
            None
        }
    }
}

/// Rescale fractional scores to the canonical 0-100 percent range.
///
/// The prompt asks for 0-1 fractions, but replies also come back already in
/// percent. A value in (0, 1] is treated as a fraction and multiplied by 100;
/// anything above 1 is taken as already-percent and left alone. Applied once
/// here, at the boundary, so downstream validation never rescales.
fn rescale_fractions(value: &mut Value) {
    if let Some(obj) = value.as_object_mut() {
        if let Some(confidence) = obj.get_mut("confidence") {
            rescale_number(confidence);
        }
        if let Some(Value::Array(conditions)) = obj.get_mut("possibleConditions") {
            for condition in conditions {
                if let Some(prob) = condition.get_mut("probability") {
                    rescale_number(prob);
                }
            }
        }
    }
}

fn rescale_number(value: &mut Value) {
    if let Some(n) = value.as_f64() {
        if n > 0.0 && n <= 1.0 {
            if let Some(scaled) = serde_json::Number::from_f64(n * 100.0) {
                *value = Value::Number(scaled);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_object_from_markdown_fence() {
        let text = "```json\n{\"confidence\": 85}\n```";
        assert_eq!(extract_json_candidate(text), Some("{\"confidence\": 85}"));
    }

    #[test]
    fn extraction_is_greedy_across_nested_objects() {
        let text = "prefix {\"a\": {\"b\": 1}} suffix";
        assert_eq!(extract_json_candidate(text), Some("{\"a\": {\"b\": 1}}"));
    }

    #[test]
    fn no_braces_yields_none() {
        assert!(extract_json_candidate("plain prose, no json here").is_none());
        assert!(extract_json_candidate("only closes } before { opens").is_none());
    }

    #[test]
    fn invalid_json_span_yields_none() {
        assert!(parse_json_response("{not valid json}").is_none());
    }

    #[test]
    fn fractional_confidence_is_rescaled_to_percent() {
        let value = parse_json_response(r#"{"confidence": 0.85}"#).unwrap();
        assert_eq!(value["confidence"].as_f64(), Some(85.0));
    }

    #[test]
    fn percent_confidence_is_left_alone() {
        let value = parse_json_response(r#"{"confidence": 85}"#).unwrap();
        assert_eq!(value["confidence"].as_f64(), Some(85.0));
    }

    #[test]
    fn condition_probabilities_are_rescaled() {
        let value = parse_json_response(
            r#"{"possibleConditions": [{"probability": 0.7}, {"probability": 60}]}"#,
        )
        .unwrap();
        let conditions = value["possibleConditions"].as_array().unwrap();
        assert_eq!(conditions[0]["probability"].as_f64(), Some(70.0));
        assert_eq!(conditions[1]["probability"].as_f64(), Some(60.0));
    }

    #[test]
    fn zero_confidence_is_not_rescaled() {
        let value = parse_json_response(r#"{"confidence": 0}"#).unwrap();
        assert_eq!(value["confidence"].as_f64(), Some(0.0));
    }

    #[test]
    fn non_numeric_confidence_survives_untouched() {
        let value = parse_json_response(r#"{"confidence": "high"}"#).unwrap();
        assert_eq!(value["confidence"].as_str(), Some("high"));
    }
}
