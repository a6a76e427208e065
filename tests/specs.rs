// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace-level scenario tests.
//!
//! These walk the seeded end-to-end scenarios across crate boundaries:
//! evidence → resolver → noncompliance → promotion, plus the pipeline
//! invariants that span core and storage.

use falcon_attribution::{
    check_noncompliance, format_injection, promote_if_ready, resolve_failure_mode,
    AttributionStore, CarrierQuoteType, DocFingerprint, EvidenceBundle, EvidenceExtractor,
    ExtractionInput, FailureMode, HealthThresholds, InjectionInput, KillSwitch, MockExtractor,
    NoncomplianceCause, Occurrence, PatternGate, ProvisionalAlert, SourceAgreement,
};
use falcon_core::test_support::{issue_fixture, project_fixture};
use falcon_core::{allowed_statuses, CarrierStage, IssueId, Stage};
use falcon_storage::{seed_builtin_labels, IssueRepo, LabelRepo, MemoryStore, ProjectRepo};

const DAY: u64 = 24 * 60 * 60 * 1000;

// S1: evidence with proven drift.
#[test]
fn s1_proven_drift() {
    let mut evidence =
        EvidenceBundle::minimal(CarrierStage::ContextPack, CarrierQuoteType::Verbatim);
    evidence.has_citation = true;
    evidence.cited_sources = vec!["ADR-3".to_string()];
    evidence.source_retrievable = true;
    evidence.source_agrees_with_carrier = SourceAgreement::Disagrees;

    let resolution = resolve_failure_mode(&evidence);
    assert_eq!(resolution.failure_mode, FailureMode::SynthesisDrift);
    assert_eq!(resolution.confidence_modifier, 0.0);
}

// S2: suspected drift.
#[test]
fn s2_suspected_drift() {
    let mut evidence =
        EvidenceBundle::minimal(CarrierStage::ContextPack, CarrierQuoteType::Verbatim);
    evidence.has_citation = true;
    evidence.source_retrievable = false;

    let resolution = resolve_failure_mode(&evidence);
    assert_eq!(resolution.failure_mode, FailureMode::Incorrect);
    assert!(resolution.suspected_synthesis_drift);
    assert!((resolution.confidence_modifier + 0.15).abs() < f64::EPSILON);
}

// S3: incomplete by scoring.
#[test]
fn s3_incomplete_by_scoring() {
    let mut evidence = EvidenceBundle::minimal(CarrierStage::Spec, CarrierQuoteType::Inferred);
    evidence.has_citation = false;
    evidence.has_testable_acceptance_criteria = true;

    assert_eq!(resolve_failure_mode(&evidence).failure_mode, FailureMode::Incomplete);
}

// S4: ambiguity wins.
#[test]
fn s4_ambiguity_wins() {
    let mut evidence = EvidenceBundle::minimal(CarrierStage::Spec, CarrierQuoteType::Paraphrase);
    evidence.vagueness_signals = vec![
        "appropriately".to_string(),
        "robust".to_string(),
        "reasonable".to_string(),
    ];
    evidence.has_testable_acceptance_criteria = false;

    assert_eq!(resolve_failure_mode(&evidence).failure_mode, FailureMode::Ambiguous);
}

// S5: noncompliance detected with salience cause.
#[test]
fn s5_noncompliance_detected() {
    let context_pack = [
        "Data access rules:",
        "all sql statements must use parameterized",
        "query bindings; never concatenate input.",
        "Injection of raw strings is forbidden.",
        "Review every query against this list.",
        "Other unrelated notes follow here.",
    ]
    .join("\n");

    let mut evidence =
        EvidenceBundle::minimal(CarrierStage::ContextPack, CarrierQuoteType::Verbatim);
    evidence.carrier_location = "Lines 40..44".to_string();

    let noncompliance = check_noncompliance(
        "SQL Injection Vulnerability",
        "User input concatenated into SQL query without parameterization",
        Some(&context_pack),
        None,
        &evidence,
        FailureMode::Incomplete,
    )
    .expect("guidance window must match");

    assert_eq!(noncompliance.violated_guidance_stage, CarrierStage::ContextPack);
    assert!(noncompliance.possible_causes.contains(&NoncomplianceCause::Salience));
}

// S6: promotion gate met; occurrences relinked.
#[test]
fn s6_promotion_gate() {
    let store = AttributionStore::new();
    let killswitch = KillSwitch::new(HealthThresholds::default(), 0);
    let alert = ProvisionalAlert::new(
        "never concatenate user input into SQL",
        "sql-injection",
        IssueId::new(),
        CarrierStage::ContextPack,
        FailureMode::Incomplete,
        120 * DAY,
        0,
    );
    let alert_id = alert.id;
    store.insert_alert(alert);

    let issue_a = IssueId::new();
    let issue_b = IssueId::new();
    for (issue, quote, at) in [
        (issue_a, CarrierQuoteType::Verbatim, 1),
        (issue_a, CarrierQuoteType::Verbatim, 2),
        (issue_b, CarrierQuoteType::Paraphrase, 3),
    ] {
        store.insert_occurrence(Occurrence::for_alert(
            alert_id,
            issue,
            DocFingerprint {
                kind: "git".to_string(),
                identifier: "acme/widgets#pack.md".to_string(),
                hash: "h1".to_string(),
            },
            quote,
            at,
        ));
    }

    let pattern_id =
        promote_if_ready(&store, &killswitch, &PatternGate::default(), &alert_id, 10)
            .unwrap()
            .expect("avg confidence 0.833 >= 0.70 must promote");

    let pattern = store.pattern(&pattern_id).unwrap();
    assert!((pattern.confidence - 0.8333).abs() < 0.001);
    assert_eq!(store.occurrences_for_pattern(&pattern_id).len(), 3);

    // Promoted patterns flow into downstream prompt injection.
    let markdown = format_injection(
        &InjectionInput { patterns: vec![pattern], ..InjectionInput::default() },
        10,
    );
    assert!(markdown.contains("never concatenate user input into SQL"));
}

// The full extraction → resolution → noncompliance path through the
// mock extractor.
#[tokio::test]
async fn attribution_pipeline_end_to_end() {
    let extractor = MockExtractor::new().with_fallback(serde_json::json!({
        "carrierStage": "context-pack",
        "carrierQuote": "write queries by hand for speed",
        "carrierQuoteType": "verbatim",
        "carrierInstructionKind": "benign_but_missing_guardrails",
        "carrierLocation": "Lines 90..94",
        "hasCitation": false,
        "hasTestableAcceptanceCriteria": true
    }));

    let input = ExtractionInput {
        finding_id: "f-1".to_string(),
        finding_title: "SQL Injection Vulnerability".to_string(),
        finding_description: "User input concatenated into SQL query without parameterization"
            .to_string(),
        context_pack: Some(
            "all sql statements must use parameterized\nquery bindings; never concatenate input.\nx\nx\nx"
                .to_string(),
        ),
        spec: None,
    };
    let evidence = extractor.extract(&input).await.unwrap();
    let resolution = resolve_failure_mode(&evidence);
    assert_eq!(resolution.failure_mode, FailureMode::Incomplete);

    let noncompliance = check_noncompliance(
        &input.finding_title,
        &input.finding_description,
        input.context_pack.as_deref(),
        None,
        &evidence,
        resolution.failure_mode,
    )
    .expect("guidance existed and was ignored");
    assert_eq!(noncompliance.violated_guidance_stage, CarrierStage::ContextPack);
}

// Pipeline invariant 1: status stays within allowed-statuses(stage)
// from backlog to done, and `start` is the composite transition.
#[test]
fn pipeline_walk_preserves_status_invariant() {
    let store = MemoryStore::new();
    let mut project = project_fixture();
    ProjectRepo::insert(&store, project.clone()).unwrap();

    let number = project.take_issue_number();
    let mut issue = issue_fixture(project.id, number, "Harden uploader retries");
    IssueRepo::insert(&store, issue.clone()).unwrap();

    issue.start(1_000).unwrap();
    assert_eq!(issue.stage, Stage::ContextPack);
    let mut issue = IssueRepo::update(&store, issue).unwrap();

    for stage in [
        Stage::ContextReview,
        Stage::Spec,
        Stage::SpecReview,
        Stage::Implement,
        Stage::PrReview,
        Stage::PrHumanReview,
        Stage::Fixer,
        Stage::PrReview,
        Stage::PrHumanReview,
        Stage::Testing,
        Stage::DocReview,
        Stage::MergeReady,
        Stage::Done,
    ] {
        issue.advance(stage, 2_000).unwrap();
        assert!(
            allowed_statuses(issue.stage).contains(&issue.status),
            "status {} illegal at {}",
            issue.status,
            issue.stage
        );
        issue = IssueRepo::update(&store, issue).unwrap();
    }
    assert!(issue.completed_at_ms.is_some());
}

// Invariant 6: output line timestamps are non-decreasing for one
// subscriber of one run, across the invoker → bus boundary.
#[tokio::test]
async fn run_output_streams_in_order() {
    use falcon_bus::OutputBus;
    use falcon_invoker::{AgentInvoker, InvokeRequest, InvokerConfig, StreamingInvoker};

    let bus = OutputBus::new();
    let script = r#"cat > /dev/null
printf '%s\n' '{"type":"content_block_delta","delta":{"text":"one\ntwo\n"}}'
printf '%s\n' '{"type":"content_block_delta","delta":{"text":"three\n"}}'
"#;
    let config = InvokerConfig {
        program: "sh".to_string(),
        args: vec!["-c".to_string(), script.to_string()],
        ..InvokerConfig::default()
    };
    let invoker = StreamingInvoker::new(config, bus.clone());
    let workdir = tempfile::tempdir().unwrap();

    let handle = invoker
        .invoke(
            workdir.path(),
            InvokeRequest {
                agent_id: falcon_core::AgentId::from_string("agt-spec"),
                issue_id: IssueId::new(),
                stage: Stage::Implement,
                prompt: "Stage: implement".to_string(),
                tool_base_url: None,
                debug: true,
            },
        )
        .await
        .unwrap();
    let mut subscription = bus.subscribe(handle.run_id());
    assert!(handle.wait().await.unwrap().success);

    let mut lines = Vec::new();
    let mut last_at = 0;
    while let Some(line) = subscription.try_recv() {
        assert!(line.at >= last_at, "timestamps regressed");
        last_at = line.at;
        lines.push(line.line);
    }
    assert_eq!(lines, vec!["one", "two", "three"]);
}

// Idempotent seeding across the storage boundary.
#[test]
fn label_seed_is_idempotent() {
    let store = MemoryStore::new();
    seed_builtin_labels(&store).unwrap();
    seed_builtin_labels(&store).unwrap();
    assert_eq!(store.list_builtin().len(), falcon_core::builtin_labels().len());
}
