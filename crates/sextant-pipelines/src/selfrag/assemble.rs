//! Answer assembly: path reconstruction through the search tree, control
//! token sanitization, best-answer selection, and long-form citation
//! assembly.

use sextant_core::errors::{SextantError, SextantResult};
use sextant_core::models::{Document, PathTrace};
use sextant_core::task::TaskKind;
use tracing::debug;

use super::beam::SearchTree;
use super::tokens::{CONTROL_TOKENS, END_OF_TEXT, NO_SUPPORT};

/// Strip every control-token string and end-of-text marker, remove
/// newlines, trim, drop leading `#`/`:` characters, and repair missing
/// inter-sentence spacing. Idempotent; an empty result is an empty
/// string, not an error.
pub fn sanitize(text: &str) -> String {
    let mut out = text.to_string();
    for token in CONTROL_TOKENS {
        out = out.replace(token, "");
    }
    out = out.replace(END_OF_TEXT, "");
    out = out.replace('\n', "");
    let mut out = out.trim();
    while let Some(rest) = out.strip_prefix(['#', ':']) {
        out = rest.trim_start();
    }
    fix_spacing(out)
}

/// Insert a space where a word character is directly followed by `.`, `!`
/// or `?` directly followed by another word character.
fn fix_spacing(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    for (i, &c) in chars.iter().enumerate() {
        out.push(c);
        if matches!(c, '.' | '!' | '?')
            && i > 0
            && chars[i - 1].is_alphanumeric()
            && chars.get(i + 1).is_some_and(|n| n.is_alphanumeric())
        {
            out.push(' ');
        }
    }
    out
}

/// A candidate answer with its composite score, for flat best-of-N
/// selection.
#[derive(Debug, Clone)]
pub struct ScoredAnswer {
    pub text: String,
    pub score: f64,
}

/// Assembled long-form answer plus the documents its citations point at.
#[derive(Debug, Clone)]
pub struct LongFormAnswer {
    pub text: String,
    pub documents: Vec<Document>,
}

/// Reconstructs winning paths and produces final answer text.
pub struct AnswerAssembler {
    ignore_contradictions: bool,
    task: TaskKind,
}

impl AnswerAssembler {
    pub fn new(ignore_contradictions: bool, task: TaskKind) -> Self {
        Self {
            ignore_contradictions,
            task,
        }
    }

    /// Reconstruct the root-to-leaf path of every survivor at the deepest
    /// non-empty level. When contradiction-filtering is on, nodes whose
    /// processed text carries the no-support marker are dropped from the
    /// path's segments, raw segments, and documents alike; they remain in
    /// the tree for audit.
    pub fn extract_paths(&self, tree: &SearchTree) -> Vec<PathTrace> {
        let mut paths = Vec::new();
        for &leaf in tree.deepest_level() {
            let node_ids = tree.path_to_root(leaf);
            let mut segments = Vec::new();
            let mut raw_segments = Vec::new();
            let mut documents = Vec::new();
            for &id in &node_ids {
                let node = tree.node(id);
                if self.ignore_contradictions && node.processed_text.contains(NO_SUPPORT) {
                    continue;
                }
                segments.push(node.processed_text.clone());
                raw_segments.push(node.raw_text.clone());
                documents.push(node.context.clone());
            }
            let text = segments
                .iter()
                .filter(|s| !s.is_empty())
                .cloned()
                .collect::<Vec<_>>()
                .join(" ");
            let score = tree.node(leaf).score.unwrap_or(0.0);
            paths.push(PathTrace {
                node_ids,
                text,
                segments,
                raw_segments,
                documents,
                score,
            });
        }
        debug!(paths = paths.len(), "extracted surviving paths");
        paths
    }

    /// Flat best-of-N selection. Closed-form tasks group candidates by
    /// sanitized answer and sum scores per distinct answer; open-ended
    /// tasks pick the single highest-scoring candidate. Ties keep the
    /// earliest candidate.
    pub fn select_best(&self, candidates: &[ScoredAnswer]) -> SextantResult<String> {
        if candidates.is_empty() {
            return Err(SextantError::NoCandidates);
        }
        if self.task.is_closed_form() {
            // Insertion-ordered grouping keeps tie-breaks deterministic.
            let mut grouped: Vec<(String, f64)> = Vec::new();
            for candidate in candidates {
                let answer = sanitize(&candidate.text);
                match grouped.iter_mut().find(|(a, _)| *a == answer) {
                    Some((_, score)) => *score += candidate.score,
                    None => grouped.push((answer, candidate.score)),
                }
            }
            let best = grouped
                .into_iter()
                .reduce(|best, next| if next.1 > best.1 { next } else { best })
                .expect("candidates is non-empty");
            Ok(best.0)
        } else {
            let best = candidates
                .iter()
                .reduce(|best, next| if next.score > best.score { next } else { best })
                .expect("candidates is non-empty");
            Ok(best.text.clone())
        }
    }

    /// Long-form citation assembly over the best path: sanitize each
    /// segment, keep the first occurrence of repeated sentences, replace
    /// each kept sentence's trailing character with a bracketed citation
    /// index (the segment's source position), then normalize the literal
    /// punctuation leftovers of marker stripping. An empty first path
    /// falls back to the second.
    pub fn assemble_long_form(&self, paths: &[PathTrace]) -> LongFormAnswer {
        let Some(first) = paths.first() else {
            return LongFormAnswer {
                text: String::new(),
                documents: Vec::new(),
            };
        };
        let path = if sanitize(&first.text).is_empty() && paths.len() > 1 {
            &paths[1]
        } else {
            first
        };

        let mut text = String::new();
        let mut documents = Vec::new();
        let mut seen: Vec<String> = Vec::new();
        for (idx, (segment, document)) in path.segments.iter().zip(&path.documents).enumerate() {
            if segment.is_empty() {
                continue;
            }
            let sentence = sanitize(segment);
            if sentence.is_empty() || seen.contains(&sentence) {
                continue;
            }
            seen.push(sentence.clone());
            // Drop the trailing punctuation character, cite, re-terminate.
            let trimmed: String = {
                let mut cs = sentence.chars();
                cs.next_back();
                cs.collect()
            };
            text.push_str(&format!("{trimmed} [{idx}]. "));
            if let Some(doc) = document {
                documents.push(doc.clone());
            }
        }

        let mut text = text.trim().to_string();
        text = text.replace(".[Continue to Use Evidence]", " [1]. ");
        text = text.replace(". [1] ", " [1]. ");

        LongFormAnswer { text, documents }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_control_tokens_and_markers() {
        let raw = "[Relevant]Paris is the capital.[Fully supported]</s>";
        assert_eq!(sanitize(raw), "Paris is the capital.");
    }

    #[test]
    fn sanitize_drops_leading_hash_and_colon() {
        assert_eq!(sanitize("#: answer"), "answer");
        assert_eq!(sanitize(": answer"), "answer");
    }

    #[test]
    fn sanitize_repairs_missing_sentence_spacing() {
        assert_eq!(sanitize("One.Two.Three"), "One. Two. Three");
        // Decimal-free punctuation before non-word chars is untouched.
        assert_eq!(sanitize("End. (note)"), "End. (note)");
    }

    #[test]
    fn sanitize_is_idempotent() {
        let cases = [
            "[Retrieval]<paragraph>x</paragraph>",
            "##double",
            "a.b.c",
            "  spaced  ",
            "",
        ];
        for case in cases {
            let once = sanitize(case);
            assert_eq!(sanitize(&once), once, "case: {case:?}");
        }
    }

    #[test]
    fn sanitize_empty_yields_empty() {
        assert_eq!(sanitize("[Irrelevant]</s>"), "");
    }

    #[test]
    fn closed_form_groups_and_sums() {
        let assembler = AnswerAssembler::new(true, TaskKind::FactVerification);
        let candidates = vec![
            ScoredAnswer {
                text: "true".into(),
                score: 0.4,
            },
            ScoredAnswer {
                text: "false".into(),
                score: 0.5,
            },
            ScoredAnswer {
                text: "[Relevant]true".into(),
                score: 0.3,
            },
        ];
        // true: 0.4 + 0.3 = 0.7 beats false: 0.5.
        assert_eq!(assembler.select_best(&candidates).unwrap(), "true");
    }

    #[test]
    fn open_ended_picks_single_best() {
        let assembler = AnswerAssembler::new(true, TaskKind::OpenQa);
        let candidates = vec![
            ScoredAnswer {
                text: "a".into(),
                score: 0.9,
            },
            ScoredAnswer {
                text: "b".into(),
                score: 0.7,
            },
        ];
        assert_eq!(assembler.select_best(&candidates).unwrap(), "a");
    }

    #[test]
    fn zero_candidates_is_reported() {
        let assembler = AnswerAssembler::new(true, TaskKind::FactVerification);
        assert!(matches!(
            assembler.select_best(&[]),
            Err(SextantError::NoCandidates)
        ));
    }
}
