use std::collections::HashMap;

use sextant_core::errors::GenerationError;
use sextant_core::models::*;

#[test]
fn document_splits_title_and_body() {
    let doc = Document::new("d1", "Marie Curie\nPolish-French physicist.\nTwo Nobel Prizes.");
    assert_eq!(doc.title(), "Marie Curie");
    assert_eq!(doc.body(), "Polish-French physicist.\nTwo Nobel Prizes.");
}

#[test]
fn single_line_document_has_empty_body() {
    let doc = Document::new("d2", "Just a title");
    assert_eq!(doc.title(), "Just a title");
    assert_eq!(doc.body(), "");
}

#[test]
fn outcome_validates_aligned_positions() {
    let outcome = GenerationOutcome {
        text: "ok".into(),
        token_ids: vec![1, 2],
        logprobs: vec![HashMap::new(), HashMap::new()],
        cumulative_logprob: -1.0,
    };
    assert!(outcome.validate().is_ok());
}

#[test]
fn outcome_rejects_misaligned_positions() {
    let outcome = GenerationOutcome {
        text: "bad".into(),
        token_ids: vec![1, 2, 3],
        logprobs: vec![HashMap::new()],
        cumulative_logprob: 0.0,
    };
    let err = outcome.validate().unwrap_err();
    assert!(matches!(
        err,
        GenerationError::MalformedOutcome {
            token_count: 3,
            logprob_count: 1
        }
    ));
}

#[test]
fn prediction_serializes_with_trace() {
    let prediction = Prediction {
        answer: "Paris [0].".into(),
        documents: vec![Document::new("d1", "France\nCapital is Paris.")],
        trace: Some(SearchTrace {
            nodes: vec![NodeTrace {
                id: 0,
                raw_text: "[Retrieval]".into(),
                processed_text: String::new(),
                score: None,
                parent: None,
                document_id: None,
            }],
            paths: vec![],
        }),
    };
    let json = serde_json::to_string(&prediction).unwrap();
    let back: Prediction = serde_json::from_str(&json).unwrap();
    assert_eq!(back.answer, prediction.answer);
    assert_eq!(back.trace.unwrap().nodes.len(), 1);
}
