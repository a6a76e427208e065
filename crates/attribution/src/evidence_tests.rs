// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    verbatim = { CarrierQuoteType::Verbatim, 0.9 },
    paraphrase = { CarrierQuoteType::Paraphrase, 0.7 },
    inferred = { CarrierQuoteType::Inferred, 0.5 },
)]
fn confidence_map(quote_type: CarrierQuoteType, want: f64) {
    assert!((quote_type.confidence() - want).abs() < f64::EPSILON);
}

#[parameterized(
    verbatim = { "verbatim", 0.9 },
    paraphrase = { "paraphrase", 0.7 },
    inferred = { "inferred", 0.5 },
    unknown_defaults = { "hallucinated", 0.5 },
    empty_defaults = { "", 0.5 },
)]
fn confidence_for_strings(s: &str, want: f64) {
    assert!((confidence_for_quote_type(s) - want).abs() < f64::EPSILON);
}

#[test]
fn bundle_serde_round_trip() {
    let mut bundle = EvidenceBundle::minimal(CarrierStage::ContextPack, CarrierQuoteType::Verbatim);
    bundle.carrier_quote = "use raw SQL for speed".to_string();
    bundle.carrier_location = "Lines 10..14".to_string();
    bundle.has_citation = true;
    bundle.cited_sources = vec!["ADR-7".to_string()];
    bundle.source_retrievable = true;
    bundle.source_agrees_with_carrier = SourceAgreement::Disagrees;
    bundle.vagueness_signals = vec!["appropriately".to_string()];
    bundle.conflict_signals = vec![ConflictSignal {
        doc_a: "pack".to_string(),
        doc_b: "spec".to_string(),
        topic: "auth".to_string(),
        excerpt_a: "a".to_string(),
        excerpt_b: "b".to_string(),
    }];

    let json = serde_json::to_value(&bundle).unwrap();
    let back = EvidenceBundle::from_json(json).unwrap();
    assert_eq!(back, bundle);
}

#[test]
fn bundle_fields_are_camel_case() {
    let bundle = EvidenceBundle::minimal(CarrierStage::Spec, CarrierQuoteType::Inferred);
    let json = serde_json::to_value(&bundle).unwrap();
    assert!(json.get("carrierQuoteType").is_some());
    assert!(json.get("hasTestableAcceptanceCriteria").is_some());
    assert!(json.get("carrier_quote_type").is_none());
}

#[test]
fn source_agreement_is_three_valued_on_the_wire() {
    assert_eq!(serde_json::to_value(SourceAgreement::Agrees).unwrap(), serde_json::json!(true));
    assert_eq!(
        serde_json::to_value(SourceAgreement::Disagrees).unwrap(),
        serde_json::json!(false)
    );
    assert_eq!(
        serde_json::to_value(SourceAgreement::Unknown).unwrap(),
        serde_json::json!("unknown")
    );

    let agrees: SourceAgreement = serde_json::from_value(serde_json::json!(true)).unwrap();
    assert_eq!(agrees, SourceAgreement::Agrees);
    let unknown: SourceAgreement = serde_json::from_value(serde_json::json!("unknown")).unwrap();
    assert_eq!(unknown, SourceAgreement::Unknown);
    let null: SourceAgreement = serde_json::from_value(serde_json::Value::Null).unwrap();
    assert_eq!(null, SourceAgreement::Unknown);
}

#[test]
fn malformed_bundle_is_rejected() {
    let missing_fields = serde_json::json!({ "carrierStage": "spec" });
    assert!(EvidenceBundle::from_json(missing_fields).is_err());

    let wrong_enum = serde_json::json!({
        "carrierStage": "spec",
        "carrierQuote": "",
        "carrierQuoteType": "word_of_mouth",
        "carrierInstructionKind": "unknown",
        "carrierLocation": "",
        "hasCitation": false
    });
    assert!(EvidenceBundle::from_json(wrong_enum).is_err());
}

#[test]
fn optional_fields_default() {
    let minimal = serde_json::json!({
        "carrierStage": "context-pack",
        "carrierQuote": "q",
        "carrierQuoteType": "verbatim",
        "carrierInstructionKind": "descriptive",
        "carrierLocation": "Lines 1..5",
        "hasCitation": false
    });
    let bundle = EvidenceBundle::from_json(minimal).unwrap();
    assert!(bundle.cited_sources.is_empty());
    assert_eq!(bundle.source_agrees_with_carrier, SourceAgreement::Unknown);
    assert!(!bundle.mandatory_doc_missing);
    assert!(bundle.conflict_signals.is_empty());
}
