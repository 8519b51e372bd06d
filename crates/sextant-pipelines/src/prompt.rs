//! Prompt construction shared across pipelines: instruction-prefixed
//! question prompts, numbered reference blocks, and paragraph wrapping for
//! evidence-conditioned prompts.

use sextant_core::models::Document;
use sextant_core::task::TaskKind;

/// Instruction-style prompt for one question. Tasks without an
/// instruction get the bare question in the instruction slot.
pub fn instruction_prompt(task: TaskKind, question: &str) -> String {
    match task.instruction() {
        Some(inst) => {
            format!("### Instruction:\n{inst}\n\n## Input:\n\n{question}\n\n### Response:\n")
        }
        None => format!("### Instruction:\n{question}\n\n### Response:\n"),
    }
}

/// Numbered reference block: one `Context{i}: {body}` line per document.
/// The title line of each document is dropped; only the body is cited.
pub fn reference_block(docs: &[Document]) -> String {
    let mut block = String::new();
    for (idx, doc) in docs.iter().enumerate() {
        block.push_str(&format!("Context{}: {}\n", idx + 1, doc.body()));
    }
    block
}

/// Wrap evidence for an evidence-conditioned continuation prompt.
pub fn wrap_paragraph(contents: &str) -> String {
    format!("<paragraph>{contents}</paragraph>")
}

/// Grounded QA prompt: references, then the question, then any text
/// generated so far (the lookahead and iterative loops continue from it).
pub fn reference_prompt(question: &str, docs: &[Document], previous: &str) -> String {
    let mut prompt = String::from(
        "Answer the question based on the given documents. \
         Only give me the answer and do not output any other words.\n\n",
    );
    if !docs.is_empty() {
        prompt.push_str(&reference_block(docs));
        prompt.push('\n');
    }
    prompt.push_str(&format!("Question: {question}\nAnswer:"));
    if !previous.is_empty() {
        prompt.push(' ');
        prompt.push_str(previous);
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_prompt_carries_task_instruction() {
        let p = instruction_prompt(TaskKind::MultipleChoice, "Which gas?");
        assert!(p.starts_with("### Instruction:\nGiven four answer candidates"));
        assert!(p.contains("## Input:\n\nWhich gas?"));
        assert!(p.ends_with("### Response:\n"));
    }

    #[test]
    fn bare_prompt_for_tasks_without_instruction() {
        let p = instruction_prompt(TaskKind::OpenQa, "Who wrote Dune?");
        assert_eq!(p, "### Instruction:\nWho wrote Dune?\n\n### Response:\n");
    }

    #[test]
    fn reference_block_numbers_from_one_and_drops_titles() {
        let docs = vec![
            Document::new("d1", "Title A\nBody A"),
            Document::new("d2", "Title B\nBody B"),
        ];
        assert_eq!(reference_block(&docs), "Context1: Body A\nContext2: Body B\n");
    }

    #[test]
    fn reference_prompt_appends_previous_generation() {
        let p = reference_prompt("Q?", &[], "So far.");
        assert!(p.ends_with("Question: Q?\nAnswer: So far."));
    }
}
