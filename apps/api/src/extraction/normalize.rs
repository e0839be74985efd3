//! Schema validation and normalization of parsed model output.
//!
//! Coercion rules shared by all shapes:
//! - text fields: strings are trimmed (blank becomes null), numbers and booleans
//!   are stringified, nested objects/arrays are kept as compact JSON text
//! - list fields: arrays keep their non-blank elements as text, any other
//!   non-null value becomes a one-element list
//! - scores: numbers or numeric strings (a trailing `%` is allowed), clamped to
//!   0 to 100; anything else present is a schema problem
//!
//! Unrecognized keys are ignored. Problems are collected and reported together.

use serde_json::{Map, Number, Value};

use crate::extraction::error::ExtractionError;
use crate::extraction::schema::{
    ComparisonHighlights, ComparisonReport, RecordShape, RfpItem, StructuredProposal,
    StructuredRfp, VendorRanking, UNTITLED_RFP,
};

const SCORE_MIN: f64 = 0.0;
const SCORE_MAX: f64 = 100.0;

pub fn normalize_rfp(value: &Value) -> Result<StructuredRfp, ExtractionError> {
    let obj = top_level_object(value, RecordShape::Rfp)?;

    Ok(StructuredRfp {
        title: text(obj.get("title")).unwrap_or_else(|| UNTITLED_RFP.to_string()),
        items: items(obj.get("items")),
        budget: text(obj.get("budget")),
        deadline: text(obj.get("deadline")),
        requirements: text_list(obj.get("requirements")),
        payment_terms: text(obj.get("payment_terms")),
        additional_notes: text(obj.get("additional_notes")),
    })
}

pub fn normalize_proposal(value: &Value) -> Result<StructuredProposal, ExtractionError> {
    let obj = top_level_object(value, RecordShape::Proposal)?;
    let mut problems = Vec::new();

    let confidence_score = score(obj.get("confidence_score"), "confidence_score", &mut problems);
    if !problems.is_empty() {
        return Err(schema_error(RecordShape::Proposal, problems));
    }

    Ok(StructuredProposal {
        vendor_name: text(obj.get("vendor_name")),
        pricing: text(obj.get("pricing")),
        delivery_time: text(obj.get("delivery_time")),
        warranty: text(obj.get("warranty")),
        payment_terms: text(obj.get("payment_terms")),
        technical_specs: text(obj.get("technical_specs")),
        additional_terms: text(obj.get("additional_terms")),
        confidence_score,
    })
}

/// Normalizes a comparison; `expected_rankings` is the number of proposals compared.
pub fn normalize_comparison(
    value: &Value,
    expected_rankings: usize,
) -> Result<ComparisonReport, ExtractionError> {
    let obj = top_level_object(value, RecordShape::Comparison)?;
    let mut problems = Vec::new();

    let comparison = match obj.get("comparison") {
        Some(Value::Object(c)) => ComparisonHighlights {
            best_price: text(c.get("best_price")),
            fastest_delivery: text(c.get("fastest_delivery")),
            best_warranty: text(c.get("best_warranty")),
            best_overall_value: text(c.get("best_overall_value")),
        },
        _ => ComparisonHighlights::default(),
    };

    let entries: Vec<&Value> = match obj.get("vendor_rankings") {
        Some(Value::Array(arr)) => arr.iter().collect(),
        Some(single @ Value::Object(_)) => vec![single],
        _ => Vec::new(),
    };

    if entries.len() != expected_rankings {
        problems.push(format!(
            "vendor_rankings has {} entries, expected {}",
            entries.len(),
            expected_rankings
        ));
    }

    let mut vendor_rankings = Vec::with_capacity(entries.len());
    for (i, entry) in entries.into_iter().enumerate() {
        let Value::Object(ranking) = entry else {
            problems.push(format!("vendor_rankings[{i}] is not an object"));
            continue;
        };
        let vendor = text(ranking.get("vendor"));
        if vendor.is_none() {
            problems.push(format!("vendor_rankings[{i}].vendor"));
        }
        let ranking_score = score(
            ranking.get("score"),
            &format!("vendor_rankings[{i}].score"),
            &mut problems,
        );
        if let Some(vendor) = vendor {
            vendor_rankings.push(VendorRanking {
                vendor,
                score: ranking_score,
                pros: text_list(ranking.get("pros")),
                cons: text_list(ranking.get("cons")),
            });
        }
    }

    if !problems.is_empty() {
        return Err(schema_error(RecordShape::Comparison, problems));
    }

    Ok(ComparisonReport {
        summary: text(obj.get("summary")),
        comparison,
        vendor_rankings,
        recommendation: text(obj.get("recommendation")),
        key_considerations: text_list(obj.get("key_considerations")),
    })
}

fn top_level_object(
    value: &Value,
    shape: RecordShape,
) -> Result<&Map<String, Value>, ExtractionError> {
    value.as_object().ok_or_else(|| {
        schema_error(
            shape,
            vec!["expected a JSON object at the top level".to_string()],
        )
    })
}

fn schema_error(shape: RecordShape, problems: Vec<String>) -> ExtractionError {
    ExtractionError::Schema {
        shape: shape.as_str(),
        problems,
        raw: String::new(),
    }
}

fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        nested => Some(nested.to_string()),
    }
}

fn text_list(value: Option<&Value>) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(arr)) => arr.iter().filter_map(|v| text(Some(v))).collect(),
        Some(scalar) => text(Some(scalar)).into_iter().collect(),
    }
}

fn items(value: Option<&Value>) -> Vec<RfpItem> {
    let entries: Vec<&Value> = match value {
        Some(Value::Array(arr)) => arr.iter().collect(),
        Some(v @ (Value::Object(_) | Value::String(_))) => vec![v],
        _ => return Vec::new(),
    };

    entries
        .into_iter()
        .filter_map(|entry| match entry {
            Value::Object(item) => {
                let name = text(item.get("name")).or_else(|| text(item.get("item")));
                let quantity = quantity(item.get("quantity"));
                (name.is_some() || quantity.is_some()).then_some(RfpItem { name, quantity })
            }
            Value::String(_) => text(Some(entry)).map(|name| RfpItem {
                name: Some(name),
                quantity: None,
            }),
            _ => None,
        })
        .collect()
}

fn quantity(value: Option<&Value>) -> Option<Number> {
    match value? {
        Value::Number(n) => Some(n.clone()),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(whole) = s.parse::<u64>() {
                Some(Number::from(whole))
            } else {
                s.parse::<f64>().ok().and_then(Number::from_f64)
            }
        }
        _ => None,
    }
}

/// Reads a score in 0..=100. Absent or null is fine; a present value that is not
/// numeric is recorded as a problem under `path`.
fn score(value: Option<&Value>, path: &str, problems: &mut Vec<String>) -> Option<f64> {
    let parsed = match value {
        None | Some(Value::Null) => return None,
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => {
            let s = s.trim();
            let s = s.strip_suffix('%').unwrap_or(s).trim_end();
            s.parse::<f64>().ok()
        }
        Some(_) => None,
    };

    match parsed.filter(|n| n.is_finite()) {
        Some(n) => Some(n.clamp(SCORE_MIN, SCORE_MAX)),
        None => {
            problems.push(format!("{path} is not a number"));
            None
        }
    }
}
