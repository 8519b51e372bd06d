//! Sentence segmentation and chosen-token confidence for the lookahead
//! loop.

use sextant_core::config::defaults::LOGPROB_FLOOR;
use sextant_core::models::GenerationOutcome;
use sextant_core::traits::IVocabulary;

/// Split after `.` or `?` followed by a space, unless the character two
/// places before the punctuation is an uppercase letter (which keeps
/// short abbreviations like "Mr." or "No." attached). Separating spaces
/// are consumed.
pub fn split_sentences(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let boundary = matches!(c, '.' | '?')
            && i >= 2
            && !chars[i - 2].is_ascii_uppercase()
            && chars.get(i + 1).is_some_and(|n| *n == ' ');
        if boundary {
            sentences.push(chars[start..=i].iter().collect());
            i += 1;
            while i < chars.len() && chars[i] == ' ' {
                i += 1;
            }
            start = i;
        } else {
            i += 1;
        }
    }
    if start < chars.len() {
        sentences.push(chars[start..].iter().collect());
    }
    sentences
}

/// Probability of each emitted token at its own position,
/// `exp(logprobs[i][token_ids[i]])`, floored when absent.
pub fn chosen_token_probs(outcome: &GenerationOutcome) -> Vec<f64> {
    outcome
        .token_ids
        .iter()
        .zip(&outcome.logprobs)
        .map(|(id, row)| row.get(id).copied().unwrap_or(LOGPROB_FLOOR).exp())
        .collect()
}

/// First sentence of the lookahead output and the confidence scores of
/// its tokens (a prefix of the chosen-token scores, sized by re-encoding
/// the sentence).
pub fn first_sentence(
    outcome: &GenerationOutcome,
    vocabulary: &dyn IVocabulary,
) -> Option<(String, Vec<f64>)> {
    let sentences = split_sentences(&outcome.text);
    let first = sentences.into_iter().next()?;
    if first.is_empty() {
        return None;
    }
    let scores = chosen_token_probs(outcome);
    let token_count = vocabulary.encode(&first).len().min(scores.len());
    Some((first, scores[..token_count].to_vec()))
}

/// A sentence is confident iff every chosen-token probability clears the
/// threshold.
pub fn is_confident(scores: &[f64], threshold: f64) -> bool {
    scores.iter().all(|s| *s > threshold)
}

/// Mask the uncertain tokens of a sentence: keep only tokens whose score
/// clears the threshold and decode the survivors as the retrieval query.
pub fn masked_query(
    sentence: &str,
    scores: &[f64],
    threshold: f64,
    vocabulary: &dyn IVocabulary,
) -> String {
    let ids = vocabulary.encode(sentence);
    let kept: Vec<_> = ids
        .iter()
        .zip(scores)
        .filter(|(_, score)| **score > threshold)
        .map(|(id, _)| *id)
        .collect();
    vocabulary.decode(&kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_sentence_punctuation() {
        let sentences = split_sentences("First one. Second one? Third");
        assert_eq!(sentences, vec!["First one.", "Second one?", "Third"]);
    }

    #[test]
    fn keeps_abbreviations_together() {
        let sentences = split_sentences("See Mr. Smith today. Then leave");
        assert_eq!(sentences, vec!["See Mr. Smith today.", "Then leave"]);
    }

    #[test]
    fn single_sentence_passes_through() {
        assert_eq!(split_sentences("No boundary here"), vec!["No boundary here"]);
    }

    #[test]
    fn confidence_requires_every_token() {
        assert!(is_confident(&[0.9, 0.8, 0.95], 0.5));
        assert!(!is_confident(&[0.9, 0.3, 0.95], 0.5));
        assert!(is_confident(&[], 0.5));
    }
}
