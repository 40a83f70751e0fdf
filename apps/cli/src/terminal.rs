//! Line-based answer prompt for interactive quizzes.

use crate::quiz::AnswerSource;
use std::io::{self, BufRead, Write};
use study_core::{MatchResult, VocabularyItem};
use tracing::debug;

/// Typing this instead of an answer ends the quiz.
pub const QUIT_COMMAND: &str = ":q";

/// Reads answers line by line from `input` and prompts on `output`.
pub struct PromptAnswers<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptAnswers<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> AnswerSource for PromptAnswers<R, W> {
    fn ask(&mut self, position: usize, total: usize, item: &VocabularyItem) -> Option<String> {
        write!(
            self.output,
            "\nQuestion {position}/{total}\nTerm: {}\nMeaning ({QUIT_COMMAND} to stop): ",
            item.term
        )
        .ok()?;
        self.output.flush().ok()?;

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) if line.trim() == QUIT_COMMAND => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }

    fn reveal(&mut self, item: &VocabularyItem, result: &MatchResult) {
        if let Err(e) = self.write_verdict(item, result) {
            debug!(error = %e, "cannot show answer verdict");
        }
    }
}

impl<R, W: Write> PromptAnswers<R, W> {
    fn write_verdict(&mut self, item: &VocabularyItem, result: &MatchResult) -> io::Result<()> {
        if result.is_correct {
            writeln!(self.output, "✓ Correct!")?;
        } else {
            writeln!(self.output, "✗ Wrong. The answer is: {}", item.meaning)?;
        }
        if let Some(example) = &item.example {
            writeln!(self.output, "Example: {example}")?;
        }
        self.output.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::io::Cursor;
    use study_core::{judge_answer, MatchingMode, ReviewProgress};

    fn item() -> VocabularyItem {
        VocabularyItem {
            id: 1,
            term: "gregarious".to_string(),
            meaning: "fond of company".to_string(),
            example: Some("a gregarious host".to_string()),
            tags: Default::default(),
            created_at: Utc::now(),
            progress: ReviewProgress::default(),
        }
    }

    #[test]
    fn reads_trimmed_answer() {
        let mut prompt = PromptAnswers::new(Cursor::new("  fond \n"), Vec::new());
        assert_eq!(prompt.ask(1, 1, &item()).as_deref(), Some("fond"));
        let output = String::from_utf8(prompt.into_output()).unwrap();
        assert!(output.contains("Question 1/1"));
        assert!(output.contains("Term: gregarious"));
    }

    #[test]
    fn eof_and_quit_end_the_session() {
        let mut prompt = PromptAnswers::new(Cursor::new(""), Vec::new());
        assert_eq!(prompt.ask(1, 2, &item()), None);
        let mut prompt = PromptAnswers::new(Cursor::new(":q\n"), Vec::new());
        assert_eq!(prompt.ask(1, 2, &item()), None);
    }

    #[test]
    fn reveal_shows_answer_and_example() {
        let mut prompt = PromptAnswers::new(Cursor::new(""), Vec::new());
        let judged = judge_answer("lonely", "fond of company", MatchingMode::Substring);
        prompt.reveal(&item(), &judged);
        let output = String::from_utf8(prompt.into_output()).unwrap();
        assert!(output.contains("The answer is: fond of company"));
        assert!(output.contains("Example: a gregarious host"));
    }

    struct ClosedOutput;

    impl Write for ClosedOutput {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn closed_output_is_reported_not_fatal() {
        let mut prompt = PromptAnswers::new(Cursor::new("fond\n"), ClosedOutput);
        assert_eq!(prompt.ask(1, 1, &item()), None);

        let judged = judge_answer("fond", "fond of company", MatchingMode::Substring);
        assert!(prompt.write_verdict(&item(), &judged).is_err());
        prompt.reveal(&item(), &judged);
    }
}
