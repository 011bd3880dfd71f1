use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;

use crate::models::{
    AnalysisResult, Condition, MedicationAdvice, Recommendation, RecommendationType, Severity,
    Urgency,
};

static CONDITION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z][\w\s()'-]*?)\s*[:-]\s*(\d+)\s*%").expect("invalid regex")
});

static LABELED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z][\w\s()'-]*?)\s*[:-]\s*(.*)$").expect("invalid regex")
});

static SEVERITY_HINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(low|medium|high)\s+severity").expect("invalid regex")
});

static URGENCY_HINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(low|medium|high)\s+urgency").expect("invalid regex")
});

static TYPE_HINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(medication|lifestyle|medical)\b").expect("invalid regex")
});

static BULLET_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*]\s*(.+)$").expect("invalid regex"));

/// Labels that delimit inline medication sub-fields.
const MEDICATION_LABELS: &[&str] = &[
    "Type",
    "Dosage",
    "Frequency",
    "Duration",
    "Price",
    "Side Effects",
];

/// Recover structured fields from a prose completion reply.
///
/// Best-effort: each section header is located case-insensitively and its
/// body is scanned line by line. Sections that cannot be found simply stay
/// empty; the caller's post-pass fills them with synthetic entries.
pub fn parse_prose_response(text: &str) -> AnalysisResult {
    AnalysisResult {
        confidence: 70.0,
        possible_conditions: section(
            text,
            "Possible conditions",
            &["Recommended medications", "Recommendations"],
        )
        .map(parse_conditions)
        .unwrap_or_default(),
        recommendations: section(text, "Recommendations", &["Medications", "Red flags"])
            .map(parse_recommendations)
            .unwrap_or_default(),
        medications: section(text, "Medications", &["Recommendations", "Red flags"])
            .map(parse_medications)
            .unwrap_or_default(),
        red_flags: section(text, "Red flags", &["\n\n"])
            .map(parse_red_flags)
            .unwrap_or_default(),
    }
}

/// ASCII case-insensitive substring search.
fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.is_empty() || n.len() > h.len() {
        return None;
    }
    h.windows(n.len()).position(|w| w.eq_ignore_ascii_case(n))
}

/// Slice the body of a named section: from just past the header to the
/// earliest terminator occurrence, or to the end of the text.
fn section<'a>(text: &'a str, header: &str, terminators: &[&str]) -> Option<&'a str> {
    let start = find_ci(text, header)? + header.len();
    let body = &text[start..];
    let end = terminators
        .iter()
        .filter_map(|t| find_ci(body, t))
        .min()
        .unwrap_or(body.len());
    Some(&body[..end])
}

fn parse_conditions(body: &str) -> Vec<Condition> {
    let lines: Vec<&str> = body.lines().collect();
    let mut conditions = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let Some(caps) = CONDITION_LINE.captures(line) else {
            continue;
        };
        let name = caps[1].trim().to_string();
        // 0% reads as "no probability given" and gets the random substitute
        let probability = match caps[2].parse::<f64>() {
            Ok(p) if p > 0.0 => p,
            _ => rand::thread_rng().gen_range(30..100) as f64,
        };

        // The line after a "Name - NN%" match reads as its description,
        // unless it starts the next condition.
        let description = lines
            .get(i + 1)
            .filter(|next| !next.trim().is_empty() && !CONDITION_LINE.is_match(next))
            .map(|next| next.trim().to_string())
            .unwrap_or_else(|| "Common condition based on the symptoms provided".to_string());

        let context = format!("{line}\n{description}");
        let severity = SEVERITY_HINT
            .captures(&context)
            .and_then(|c| c[1].to_lowercase().parse().ok())
            .unwrap_or(Severity::Medium);

        conditions.push(Condition {
            name,
            probability,
            description,
            severity,
        });
    }
    conditions
}

fn parse_recommendations(body: &str) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    for line in body.lines() {
        let Some(caps) = LABELED_LINE.captures(line) else {
            continue;
        };
        let title = caps[1].trim().to_string();
        let description = match caps[2].trim() {
            "" => "Follow medical advice".to_string(),
            d => d.to_string(),
        };

        let kind = TYPE_HINT
            .captures(line)
            .and_then(|c| c[1].to_lowercase().parse().ok())
            .unwrap_or(match recommendations.len() {
                0 => RecommendationType::Medication,
                1 => RecommendationType::Lifestyle,
                _ => RecommendationType::Medical,
            });
        let urgency = URGENCY_HINT
            .captures(line)
            .and_then(|c| c[1].to_lowercase().parse().ok())
            .unwrap_or(Urgency::Medium);

        recommendations.push(Recommendation {
            kind,
            title,
            description,
            urgency,
        });
    }
    recommendations
}

fn parse_medications(body: &str) -> Vec<MedicationAdvice> {
    // Group lines into entries first: a labeled line whose name is itself a
    // known label ("Type: OTC" on its own line) belongs to the entry above
    // it, not to a new medication.
    let mut entries: Vec<(String, String)> = Vec::new();

    for line in body.lines() {
        let Some(caps) = LABELED_LINE.captures(line) else {
            continue;
        };
        let name = caps[1].trim().to_string();
        if is_medication_label(&name) {
            if let Some((_, details)) = entries.last_mut() {
                details.push(' ');
                details.push_str(line.trim());
            }
            continue;
        }
        entries.push((name, caps[2].trim().to_string()));
    }

    entries
        .into_iter()
        .map(|(name, details)| medication_from_entry(name, &details))
        .collect()
}

fn is_medication_label(name: &str) -> bool {
    MEDICATION_LABELS
        .iter()
        .any(|label| label.eq_ignore_ascii_case(name))
}

fn medication_from_entry(name: String, details: &str) -> MedicationAdvice {
    let side_effects = labeled_field(details, "Side Effects")
        .map(|raw| {
            raw.split([',', ';'])
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .filter(|effects| !effects.is_empty())
        .unwrap_or_else(|| vec!["Consult a doctor for side effects".to_string()]);

    MedicationAdvice {
        name,
        kind: labeled_field(details, "Type").unwrap_or_else(|| "OTC Medication".to_string()),
        dosage: labeled_field(details, "Dosage").unwrap_or_else(|| "As directed".to_string()),
        frequency: labeled_field(details, "Frequency").unwrap_or_else(|| "As needed".to_string()),
        duration: labeled_field(details, "Duration").unwrap_or_else(|| "As needed".to_string()),
        side_effects,
        price: labeled_field(details, "Price").unwrap_or_else(|| "$5-15".to_string()),
    }
}

/// Extract the value following `Label:` in an inline detail string, cut off
/// at the next known label (inline details pack several labels on one line).
fn labeled_field(details: &str, label: &str) -> Option<String> {
    let label_start = find_ci(details, label)?;
    let after_label = &details[label_start + label.len()..];
    let sep = after_label
        .find(|c: char| c == ':' || c == '-')
        .filter(|&pos| after_label[..pos].trim().is_empty())?;
    let rest = &after_label[sep + 1..];

    let end = MEDICATION_LABELS
        .iter()
        .filter(|&&other| !other.eq_ignore_ascii_case(label))
        .filter_map(|other| find_ci(rest, other))
        .min()
        .unwrap_or(rest.len());

    let value = rest[..end].trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_red_flags(body: &str) -> Vec<String> {
    body.lines()
        .filter_map(|line| BULLET_LINE.captures(line))
        .map(|caps| caps[1].trim().to_string())
        .collect()
}
