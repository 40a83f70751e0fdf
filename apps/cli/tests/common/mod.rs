//! Common test utilities for integration tests.
//!
//! `TestContext` opens a store in a temporary data directory and drives time
//! through a `ManualClock`, so scheduling can be checked against fixed
//! instants.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;

use study_assistant::commands;
use study_assistant::config::Config;
use study_assistant::quiz::AnswerSource;
use study_assistant::state::{AppState, ManualClock};
use study_core::{NewItem, Settings, VocabularyItem};

/// Fixed starting instant for every test.
pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

pub struct TestContext {
    pub dir: TempDir,
    pub state: AppState,
    pub clock: Arc<ManualClock>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    pub fn with_settings(settings: Settings) -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let clock = Arc::new(ManualClock::new(start()));
        let state = open_state(&dir, settings, clock.clone());
        Self { dir, state, clock }
    }

    pub fn config(&self) -> Config {
        Config {
            data_dir: self.dir.path().to_path_buf(),
            settings: self.state.settings.clone(),
        }
    }

    /// Drop the open store and open it again from disk.
    pub fn reopen(self) -> Self {
        let Self { dir, state, clock } = self;
        let settings = state.settings.clone();
        drop(state);
        let state = open_state(&dir, settings, clock.clone());
        Self { dir, state, clock }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.state.now()
    }

    pub fn add(&self, term: &str, meaning: &str) -> VocabularyItem {
        commands::add_item(&self.state, NewItem::new(term, meaning))
            .expect("add item")
            .item
    }
}

fn open_state(dir: &TempDir, settings: Settings, clock: Arc<ManualClock>) -> AppState {
    let config = Config {
        data_dir: dir.path().to_path_buf(),
        settings,
    };
    let (state, recovered) = study_assistant::open_app(&config).expect("open store");
    assert!(recovered.is_none(), "fresh store should not need recovery");
    state.with_clock(clock)
}

/// Answers keyed by term; a term without an answer ends the session.
#[derive(Default)]
pub struct ScriptedAnswers {
    answers: HashMap<String, String>,
    stop_after: Option<usize>,
    pub asked: Vec<String>,
    pub revealed: Vec<(String, bool)>,
}

impl ScriptedAnswers {
    pub fn new<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            answers: pairs
                .into_iter()
                .map(|(t, a)| (t.to_string(), a.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    /// End the session after `n` answers.
    pub fn stop_after(mut self, n: usize) -> Self {
        self.stop_after = Some(n);
        self
    }
}

impl AnswerSource for ScriptedAnswers {
    fn ask(&mut self, _position: usize, _total: usize, item: &VocabularyItem) -> Option<String> {
        if self.stop_after.is_some_and(|n| self.asked.len() >= n) {
            return None;
        }
        let answer = self.answers.get(&item.term).cloned()?;
        self.asked.push(item.term.clone());
        Some(answer)
    }

    fn reveal(&mut self, item: &VocabularyItem, result: &study_core::MatchResult) {
        self.revealed.push((item.term.clone(), result.is_correct));
    }
}
