// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::evidence::{CarrierQuoteType, SourceAgreement};

fn input(finding_id: &str) -> ExtractionInput {
    ExtractionInput {
        finding_id: finding_id.to_string(),
        finding_title: "SQL Injection Vulnerability".to_string(),
        finding_description: "input concatenated into query".to_string(),
        context_pack: Some("pack content".to_string()),
        spec: None,
    }
}

fn valid_bundle_json() -> serde_json::Value {
    serde_json::json!({
        "carrierStage": "context-pack",
        "carrierQuote": "build SQL by hand",
        "carrierQuoteType": "verbatim",
        "carrierInstructionKind": "explicitly_harmful",
        "carrierLocation": "Lines 3..7",
        "hasCitation": true,
        "citedSources": ["ADR-2"],
        "sourceRetrievable": true,
        "sourceAgreesWithCarrier": false
    })
}

#[tokio::test]
async fn mock_returns_registered_bundle() {
    let extractor = MockExtractor::new().with_response("f-1", valid_bundle_json());
    let bundle = extractor.extract(&input("f-1")).await.unwrap();
    assert_eq!(bundle.carrier_quote_type, CarrierQuoteType::Verbatim);
    assert_eq!(bundle.source_agrees_with_carrier, SourceAgreement::Disagrees);
}

#[tokio::test]
async fn fallback_serves_unregistered_findings() {
    let extractor = MockExtractor::new().with_fallback(valid_bundle_json());
    assert!(extractor.extract(&input("anything")).await.is_ok());
}

#[tokio::test]
async fn missing_response_is_retryable() {
    let extractor = MockExtractor::new();
    let err = extractor.extract(&input("f-404")).await.unwrap_err();
    assert!(matches!(err, AttributionError::Retryable(_)));
}

#[tokio::test]
async fn malformed_response_is_invalid() {
    let extractor = MockExtractor::new()
        .with_response("f-bad", serde_json::json!({"carrierStage": "context-pack"}));
    let err = extractor.extract(&input("f-bad")).await.unwrap_err();
    assert!(matches!(err, AttributionError::Invalid(_)));
}
