use sextant_core::errors::*;

#[test]
fn missing_control_token_carries_token() {
    let err = SextantError::MissingControlToken {
        token: "[Relevant]".into(),
    };
    assert!(err.to_string().contains("[Relevant]"));
}

#[test]
fn malformed_outcome_carries_both_counts() {
    let err = GenerationError::MalformedOutcome {
        token_count: 12,
        logprob_count: 7,
    };
    let msg = err.to_string();
    assert!(msg.contains("12"));
    assert!(msg.contains("7"));
}

#[test]
fn backend_errors_carry_the_reason() {
    let gen = GenerationError::Backend {
        reason: "connection reset".into(),
    };
    assert!(gen.to_string().contains("connection reset"));

    let ret = RetrievalError::SearchFailed {
        reason: "index offline".into(),
    };
    assert!(ret.to_string().contains("index offline"));
}

// --- From impls ---

#[test]
fn generation_error_converts_to_sextant_error() {
    let err: SextantError = GenerationError::EmptyBatch.into();
    assert!(matches!(err, SextantError::Generation(_)));
    assert!(err.to_string().contains("empty batch"));
}

#[test]
fn retrieval_error_converts_to_sextant_error() {
    let err: SextantError = RetrievalError::Backend {
        reason: "timeout".into(),
    }
    .into();
    assert!(matches!(err, SextantError::Retrieval(_)));
    assert!(err.to_string().contains("timeout"));
}

#[test]
fn no_candidates_has_a_clear_message() {
    assert!(SextantError::NoCandidates
        .to_string()
        .contains("no candidate"));
}
