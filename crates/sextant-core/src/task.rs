use serde::{Deserialize, Serialize};

/// Task taxonomy. Selects the instruction prefix, the closed-form vs
/// open-ended answer-selection policy, and the long-form assembly style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Knowledge-grounded dialogue.
    Dialogue,
    /// True/false claim verification. Closed-form.
    FactVerification,
    /// Four-way multiple choice. Closed-form.
    MultipleChoice,
    /// Subject-relation slot filling.
    SlotFilling,
    /// Long-form QA with per-sentence citations.
    LongFormQa,
    /// Biography generation. Long-form, plain sanitization, no citations.
    Biography,
    /// Open-domain QA.
    #[default]
    OpenQa,
}

impl TaskKind {
    /// Task-specific instruction prefix, `None` for bare-question prompts.
    pub fn instruction(&self) -> Option<&'static str> {
        match self {
            TaskKind::Dialogue => Some(
                "Given a chat history separated by new lines, generates an informative, \
                 knowledgeable and engaging response.",
            ),
            TaskKind::FactVerification => Some(
                "Is the following statement correct or not? Say true if it's correct; \
                 otherwise say false.",
            ),
            TaskKind::MultipleChoice => Some(
                "Given four answer candidates, A, B, C and D, choose the best answer choice.",
            ),
            TaskKind::SlotFilling => Some(
                "Given the input format 'Subject Entity [SEP] Relationship Type,' predict \
                 the target entity.",
            ),
            TaskKind::LongFormQa => Some(
                "Answer the following question. The question may be ambiguous and have \
                 multiple correct answers, and in that case, you have to provide a \
                 long-form answer including all correct answers.",
            ),
            TaskKind::Biography | TaskKind::OpenQa => None,
        }
    }

    /// Closed-form tasks group candidate answers by normalized text and
    /// sum scores; open-ended tasks pick the single best candidate.
    pub fn is_closed_form(&self) -> bool {
        matches!(self, TaskKind::FactVerification | TaskKind::MultipleChoice)
    }

    pub fn is_long_form(&self) -> bool {
        matches!(self, TaskKind::LongFormQa | TaskKind::Biography)
    }

    /// Whether long-form assembly appends bracketed citation markers.
    pub fn cites_sources(&self) -> bool {
        matches!(self, TaskKind::LongFormQa)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_form_covers_verification_and_choice() {
        assert!(TaskKind::FactVerification.is_closed_form());
        assert!(TaskKind::MultipleChoice.is_closed_form());
        assert!(!TaskKind::OpenQa.is_closed_form());
        assert!(!TaskKind::LongFormQa.is_closed_form());
    }

    #[test]
    fn only_long_form_qa_cites() {
        assert!(TaskKind::LongFormQa.cites_sources());
        assert!(!TaskKind::Biography.cites_sources());
        assert!(TaskKind::Biography.is_long_form());
    }

    #[test]
    fn open_qa_has_no_instruction() {
        assert!(TaskKind::OpenQa.instruction().is_none());
        assert!(TaskKind::MultipleChoice.instruction().is_some());
    }
}
