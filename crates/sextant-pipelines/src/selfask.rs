//! Scripted self-ask dialogue: seed retrieval on the question, then
//! alternate between capturing follow-up questions (each retrieved and
//! merged into the reference set) and intermediate answers until the
//! model produces a final answer or the round cap is hit.

use std::sync::LazyLock;

use regex::Regex;
use sextant_core::config::SelfAskConfig;
use sextant_core::errors::SextantResult;
use sextant_core::models::{Document, GenerationOptions, ItemReport, Prediction};
use sextant_core::traits::{IGenerator, IRetriever};
use tracing::debug;

use crate::prompt::reference_block;

/// Few-shot instruction header for the self-ask scratchpad format.
const SELF_ASK_INSTRUCTION: &str = "\
Solve the question by asking and answering follow up questions when needed.

Question: Who lived longer, Theodor Haecker or Harry Vaughan Watkins?
Are follow up questions needed here: Yes.
Follow up: How old was Theodor Haecker when he died?
Intermediate answer: Theodor Haecker was 65 years old when he died.
Follow up: How old was Harry Vaughan Watkins when he died?
Intermediate answer: Harry Vaughan Watkins was 69 years old when he died.
So the final answer is: Harry Vaughan Watkins

Question: Who was president of the U.S. when superconductivity was discovered?
Are follow up questions needed here: Yes.
Follow up: When was superconductivity discovered?
Intermediate answer: Superconductivity was discovered in 1911.
Follow up: Who was president of the U.S. in 1911?
Intermediate answer: William Howard Taft.
So the final answer is: William Howard Taft";

static FOLLOW_UP_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"Follow up:.*\n").ok());

const FOLLOW_UP: &str = "Follow up: ";
const INTERMEDIATE_ANSWER: &str = "Intermediate answer:";
const FINAL_ANSWER: &str = "So the final answer is: ";

pub struct SelfAskPipeline<'a> {
    generator: &'a dyn IGenerator,
    retriever: &'a dyn IRetriever,
    config: SelfAskConfig,
}

impl<'a> SelfAskPipeline<'a> {
    pub fn new(
        generator: &'a dyn IGenerator,
        retriever: &'a dyn IRetriever,
        config: SelfAskConfig,
    ) -> Self {
        Self {
            generator,
            retriever,
            config,
        }
    }

    fn compose(&self, docs: &[Document], question: &str, scratchpad: &str) -> String {
        let follow_ups = if self.config.single_hop { "No." } else { "Yes." };
        format!(
            "{}\nQuestion: {question}\nAre follow up questions needed here: {follow_ups}\n{scratchpad}",
            reference_block(docs)
        )
    }

    pub fn run_item(&self, question: &str) -> SextantResult<Prediction> {
        let mut docs = self.retriever.search(question)?;
        let mut scratchpad = String::new();
        // The capture target alternates between the next intermediate
        // answer and the next follow-up question.
        let mut capture_answer = true;

        let opts = GenerationOptions {
            stop: vec!["Context:".to_string(), "#".to_string()],
            ..GenerationOptions::default()
        };

        for round in 0..self.config.max_rounds {
            let prompt = format!(
                "{SELF_ASK_INSTRUCTION}\n{}",
                self.compose(&docs, question, &scratchpad)
            );
            let output = self
                .generator
                .complete(&[prompt], &opts)?
                .into_iter()
                .next()
                .unwrap_or_default();
            debug!(round, output = output.len(), "self-ask round");

            if capture_answer {
                scratchpad.push_str(output.split(INTERMEDIATE_ANSWER).next().unwrap_or(""));
                capture_answer = false;
            } else if let Some(re) = FOLLOW_UP_RE.as_ref() {
                let mut parts = re.split(&output);
                scratchpad.push_str(parts.next().unwrap_or(""));
                if let Some(m) = re.find(&output) {
                    scratchpad.push_str(m.as_str());
                }
            }

            if scratchpad.is_empty() {
                break;
            }
            if scratchpad.ends_with('\n') {
                scratchpad.pop();
            }

            if output.contains(FOLLOW_UP) {
                // Retrieve the first follow-up and merge, deduplicated by
                // document id.
                if let Some(query) = output
                    .lines()
                    .find(|line| line.contains(FOLLOW_UP))
                    .and_then(|line| line.rsplit(FOLLOW_UP).next())
                {
                    let more = self.retriever.search(query)?;
                    docs = dedup_by_id(docs, more);
                }
            } else if output.contains(FINAL_ANSWER) {
                break;
            }
        }

        // The prediction embeds the reference block, question, and
        // scratchpad; downstream extraction splits on the final-answer
        // marker.
        Ok(Prediction {
            answer: self.compose(&docs, question, &scratchpad),
            documents: docs,
            trace: None,
        })
    }

    pub fn run(&self, questions: &[String]) -> Vec<ItemReport> {
        questions
            .iter()
            .map(|question| ItemReport {
                question: question.clone(),
                result: self.run_item(question),
            })
            .collect()
    }
}

fn dedup_by_id(existing: Vec<Document>, incoming: Vec<Document>) -> Vec<Document> {
    let mut merged = existing;
    for doc in incoming {
        if !merged.iter().any(|d| d.id == doc.id) {
            merged.push(doc);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_keeps_first_occurrence() {
        let merged = dedup_by_id(
            vec![Document::new("a", "A"), Document::new("b", "B")],
            vec![Document::new("b", "B2"), Document::new("c", "C")],
        );
        let ids: Vec<&str> = merged.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(merged[1].contents, "B");
    }

    #[test]
    fn follow_up_pattern_captures_through_newline() {
        let re = FOLLOW_UP_RE.as_ref().unwrap();
        let text = "thinking\nFollow up: Who won?\nIntermediate answer: X";
        assert_eq!(re.find(text).unwrap().as_str(), "Follow up: Who won?\n");
    }
}
