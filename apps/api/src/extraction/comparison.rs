//! Comparison: asks the model to rank vendor proposals against an RFP and
//! validates the report it returns.
//!
//! Scoring and ranking are the model's; this module only guarantees the report
//! is structurally sound: one ranking per proposal, scores within 0 to 100.
//! Confidence and score values are passed through for the caller to act on.

use tracing::info;

use crate::extraction::error::ExtractionError;
use crate::extraction::normalize::normalize_comparison;
use crate::extraction::pipeline::Extractor;
use crate::extraction::schema::{ComparisonReport, StructuredRfp, VendorProposal};
use crate::extraction::task::ExtractionTask;

/// Compares `proposals` (in the given order) against `rfp` with a single model call.
pub async fn compare_proposals(
    extractor: &Extractor,
    rfp: &StructuredRfp,
    proposals: &[VendorProposal],
) -> Result<ComparisonReport, ExtractionError> {
    if proposals.is_empty() {
        return Err(ExtractionError::NoProposals);
    }

    let expected = proposals.len();
    let report = extractor
        .run(ExtractionTask::Comparison { rfp, proposals }, |value| {
            normalize_comparison(value, expected)
        })
        .await?;

    info!(
        "Compared {} proposals for '{}': top ranking {:?}",
        expected,
        rfp.title,
        report.vendor_rankings.first().map(|r| r.vendor.as_str())
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::extraction::error::ErrorKind;
    use crate::extraction::schema::StructuredProposal;
    use crate::llm_client::mock::{MockCompletionClient, MockReply};

    fn rfp() -> StructuredRfp {
        StructuredRfp {
            title: "Office Laptops".to_string(),
            items: vec![],
            budget: Some("$50,000".to_string()),
            deadline: None,
            requirements: vec!["16GB RAM".to_string()],
            payment_terms: None,
            additional_notes: None,
        }
    }

    fn proposal(vendor: &str, confidence: Option<f64>) -> VendorProposal {
        VendorProposal {
            vendor_name: vendor.to_string(),
            vendor_company: None,
            parsed_data: StructuredProposal {
                vendor_name: Some(vendor.to_string()),
                pricing: Some("$45,000".to_string()),
                delivery_time: Some("2 weeks".to_string()),
                warranty: None,
                payment_terms: None,
                technical_specs: None,
                additional_terms: None,
                confidence_score: confidence,
            },
        }
    }

    fn extractor(client: &MockCompletionClient) -> Extractor {
        Extractor::new(Arc::new(client.clone()), Duration::from_secs(30))
    }

    fn report_json(vendors: &[(&str, serde_json::Value)]) -> String {
        let rankings: Vec<_> = vendors
            .iter()
            .map(|(v, score)| json!({"vendor": v, "score": score, "pros": ["ok"], "cons": []}))
            .collect();
        json!({
            "summary": "Summary",
            "comparison": {"best_price": "Acme"},
            "vendor_rankings": rankings,
            "recommendation": "Pick Acme",
            "key_considerations": ["delivery risk"]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_empty_proposals_is_no_proposals() {
        let client = MockCompletionClient::new();
        let err = compare_proposals(&extractor(&client), &rfp(), &[])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoProposals);
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_rankings_match_proposal_count() {
        let client = MockCompletionClient::new().with_response(format!(
            "```json\n{}\n```",
            report_json(&[("Globex", json!(91)), ("Acme", json!(78))])
        ));
        let proposals = vec![proposal("Acme", Some(90.0)), proposal("Globex", None)];

        let report = compare_proposals(&extractor(&client), &rfp(), &proposals)
            .await
            .unwrap();

        assert_eq!(report.vendor_rankings.len(), proposals.len());
        // Report order is the model's, not the input order.
        assert_eq!(report.vendor_rankings[0].vendor, "Globex");
        assert_eq!(report.vendor_rankings[0].score, Some(91.0));
        assert_eq!(report.comparison.best_price.as_deref(), Some("Acme"));
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_ranking_is_schema_error() {
        let client = MockCompletionClient::new()
            .with_response(report_json(&[("Acme", json!(80)), ("Globex", json!(70))]));
        let proposals = vec![
            proposal("Acme", None),
            proposal("Globex", None),
            proposal("Initech", None),
        ];

        let err = compare_proposals(&extractor(&client), &rfp(), &proposals)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
        assert!(err.raw_response().unwrap().contains("Globex"));
    }

    #[tokio::test]
    async fn test_out_of_range_scores_are_clamped() {
        let client = MockCompletionClient::new()
            .with_response(report_json(&[("Acme", json!(-20)), ("Globex", json!("85%"))]));
        let proposals = vec![proposal("Acme", None), proposal("Globex", None)];

        let report = compare_proposals(&extractor(&client), &rfp(), &proposals)
            .await
            .unwrap();
        for ranking in &report.vendor_rankings {
            let score = ranking.score.unwrap();
            assert!((0.0..=100.0).contains(&score));
        }
        assert_eq!(report.vendor_rankings[1].score, Some(85.0));
    }

    #[tokio::test]
    async fn test_prompt_carries_proposals_in_input_order() {
        let client = MockCompletionClient::new()
            .with_response(report_json(&[("B", json!(50)), ("A", json!(60))]));
        let proposals = vec![proposal("B", None), proposal("A", None)];

        compare_proposals(&extractor(&client), &rfp(), &proposals)
            .await
            .unwrap();

        let prompt = &client.calls()[0].prompt;
        assert!(prompt.find("Proposal 1 (B)").unwrap() < prompt.find("Proposal 2 (A)").unwrap());
        assert!(prompt.contains("Office Laptops"));
    }

    #[tokio::test]
    async fn test_service_errors_propagate() {
        let client =
            MockCompletionClient::new().with_reply(MockReply::Status(502, "bad gateway".into()));
        let err = compare_proposals(&extractor(&client), &rfp(), &[proposal("Acme", None)])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ModelUnavailable);
    }

    #[tokio::test]
    async fn test_prose_only_answer_is_no_json_found() {
        let client = MockCompletionClient::new()
            .with_response("Both vendors look fine; I would pick Acme.");
        let err = compare_proposals(&extractor(&client), &rfp(), &[proposal("Acme", None)])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoJsonFound);
    }
}
