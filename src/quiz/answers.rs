// src/quiz/answers.rs

use std::collections::BTreeMap;

use crate::models::exam::{AnswerEntry, OptionLetter};

/// Selected letters keyed by question index. Unanswered questions have no key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSheet {
    selections: BTreeMap<usize, OptionLetter>,
}

impl AnswerSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets or overwrites the answer for `index`.
    pub fn select(&mut self, index: usize, letter: OptionLetter) {
        self.selections.insert(index, letter);
    }

    pub fn selected(&self, index: usize) -> Option<OptionLetter> {
        self.selections.get(&index).copied()
    }

    pub fn answered_count(&self) -> usize {
        self.selections.len()
    }

    /// Questions among the first `total` without a selection.
    pub fn unanswered_count(&self, total: usize) -> usize {
        total - self.selections.range(..total).count()
    }

    /// One entry per question in exam order, `None` where unanswered.
    pub fn snapshot(&self, total: usize) -> Vec<AnswerEntry> {
        (0..total)
            .map(|index| AnswerEntry {
                selected_option: self.selected(index),
            })
            .collect()
    }
}
