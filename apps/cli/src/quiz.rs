//! Quiz sessions over a batch of due items.

use crate::commands::{record_review, select_due, CommandError};
use crate::state::AppState;
use study_core::{judge_answer, MatchResult, SelectionKind, SessionResult, VocabularyItem};
use tracing::info;

/// Where quiz answers come from.
pub trait AnswerSource {
    /// Ask for the meaning of `item`. `None` ends the session early.
    fn ask(&mut self, position: usize, total: usize, item: &VocabularyItem) -> Option<String>;

    /// Show how the last answer was judged.
    fn reveal(&mut self, _item: &VocabularyItem, _result: &MatchResult) {}
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct QuizReport {
    pub result: SessionResult,
    /// Number of items in the selected batch.
    pub batch_size: usize,
    pub aborted: bool,
    #[serde(skip)]
    pub kind: SelectionKind,
}

/// Run one session of up to `count` items.
///
/// Every judgment is recorded as soon as it is made; aborting keeps the
/// reviews recorded so far.
pub fn run_quiz<A>(state: &AppState, count: usize, answers: &mut A) -> Result<QuizReport, CommandError>
where
    A: AnswerSource + ?Sized,
{
    let selection = select_due(state, count)?;
    let total = selection.items.len();
    let mut result = SessionResult::default();
    let mut aborted = false;

    for (index, item) in selection.items.iter().enumerate() {
        let Some(answer) = answers.ask(index + 1, total, item) else {
            aborted = true;
            break;
        };

        let judged = judge_answer(&answer, &item.meaning, state.settings.matching_mode);
        record_review(state, item.id, judged.is_correct)?;
        result.record(judged.is_correct);
        answers.reveal(item, &judged);
    }

    info!(
        asked = result.total_asked,
        correct = result.correct,
        batch = total,
        aborted,
        "quiz finished"
    );

    Ok(QuizReport {
        result,
        batch_size: total,
        aborted,
        kind: selection.kind,
    })
}
