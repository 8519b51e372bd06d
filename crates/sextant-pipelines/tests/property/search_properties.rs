//! Property tests for sanitization and the tree-search invariants.

use std::sync::Mutex;

use proptest::prelude::*;
use sextant_core::config::{ScoreWeights, SelfRagConfig};
use sextant_pipelines::selfrag::{assemble, BeamTreeSearch, CandidateScorer, ControlTokenRegistry};
use sextant_testkit::{doc, FnGenerator, OutcomeBuilder, StaticVocabulary};

/// Bracket-free text mixed with complete in-band markers. Partial marker
/// fragments are excluded: stripping never re-forms a marker from them.
fn fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[a-zA-Z0-9 .:#?!]{0,12}".prop_map(String::from),
        1 => Just("[Retrieval]".to_string()),
        1 => Just("[No Retrieval]".to_string()),
        1 => Just("[No support / Contradictory]".to_string()),
        1 => Just("[Utility:5]".to_string()),
        1 => Just("<paragraph>".to_string()),
        1 => Just("</paragraph>".to_string()),
        1 => Just("</s>".to_string()),
        1 => Just("\n".to_string()),
    ]
}

proptest! {
    #[test]
    fn sanitize_is_idempotent(parts in prop::collection::vec(fragment(), 0..10)) {
        let text = parts.concat();
        let once = assemble::sanitize(&text);
        prop_assert_eq!(&assemble::sanitize(&once), &once);
    }

    #[test]
    fn sanitize_leaves_no_markers_or_leading_prefixes(
        parts in prop::collection::vec(fragment(), 0..10),
    ) {
        let out = assemble::sanitize(&parts.concat());
        prop_assert!(!out.contains("[Retrieval]"));
        prop_assert!(!out.contains("</s>"));
        prop_assert!(!out.contains('\n'));
        prop_assert!(!out.starts_with('#'));
        prop_assert!(!out.starts_with(':'));
        prop_assert_eq!(out.trim(), &out);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn beam_levels_respect_width_and_scores_decay(
        rels in prop::collection::vec(0.05f64..0.95, 1..32),
        doc_count in 1usize..5,
        beam_width in 1usize..4,
        max_depth in 2usize..5,
    ) {
        // Every candidate keeps asking for retrieval, so expansion only
        // stops at the depth bound.
        let counter = Mutex::new(0usize);
        let generator = FnGenerator::new(move |prompts: &[String]| {
            prompts
                .iter()
                .map(|_| {
                    let mut next = counter.lock().unwrap();
                    let rel = rels[*next % rels.len()];
                    *next += 1;
                    OutcomeBuilder::new("segment[Retrieval]")
                        .token(4, &[(4, rel.ln()), (5, (1.0 - rel).ln())])
                        .build()
                })
                .collect()
        });
        let vocab = StaticVocabulary::with_control_tokens(&[]);
        let registry = ControlTokenRegistry::resolve(&vocab, false, false).unwrap();
        let scorer = CandidateScorer::new(&registry, ScoreWeights::default(), false, None);
        let config = SelfRagConfig {
            max_depth,
            beam_width,
            use_grounding: false,
            use_utility: false,
            use_seqscore: false,
            ..SelfRagConfig::default()
        };
        let search = BeamTreeSearch::new(&generator, scorer, &config);
        let documents: Vec<_> = (0..doc_count)
            .map(|i| doc(&format!("d{i}"), "T\nbody"))
            .collect();

        let tree = search.run("prompt", &documents).unwrap();

        // The root level is exactly the sentinel; deeper levels never
        // exceed the beam width.
        prop_assert_eq!(&tree.levels()[0], &vec![0usize]);
        for level in &tree.levels()[1..] {
            prop_assert!(level.len() <= beam_width);
        }

        // Multiplicative chaining with per-candidate scores below one:
        // a child never outscores its parent.
        for id in 1..tree.len() {
            let node = tree.node(id);
            let score = node.score.unwrap();
            prop_assert!(score > 0.0);
            let parent = node.parent.unwrap();
            let parent_score = tree.node(parent).score.unwrap_or(1.0);
            prop_assert!(score <= parent_score + 1e-9);
        }

        // Paths run root to leaf through strictly increasing ids.
        for &leaf in tree.deepest_level() {
            let path = tree.path_to_root(leaf);
            prop_assert_eq!(path[0], 0);
            prop_assert_eq!(*path.last().unwrap(), leaf);
            prop_assert!(path.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
