//! Bounded, labeled, linear undo/redo timeline.
//!
//! The timeline is `past ++ [present] ++ future`. Recording a new entry always discards
//! `future`, so an undone branch can never be redone after a fresh edit. `past` is capped at
//! `capacity` and trimmed from the oldest end.

use std::collections::VecDeque;

pub const DEFAULT_HISTORY_CAPACITY: usize = 20;
pub const INITIAL_LABEL: &str = "Initial";

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry<T> {
    pub value: T,
    pub label: String,
}

impl<T> HistoryEntry<T> {
    pub fn new(value: T, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
        }
    }
}

/// Label-only projection of one timeline slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    pub label: String,
}

/// Next value for [`History::set`]: either a replacement or a function of the present value.
pub enum Update<'a, T> {
    Replace(T),
    Apply(Box<dyn FnOnce(&T) -> T + 'a>),
}

impl<'a, T> Update<'a, T> {
    pub fn apply(f: impl FnOnce(&T) -> T + 'a) -> Self {
        Self::Apply(Box::new(f))
    }

    fn resolve(self, previous: &T) -> T {
        match self {
            Self::Replace(value) => value,
            Self::Apply(f) => f(previous),
        }
    }
}

impl<T> From<T> for Update<'_, T> {
    fn from(value: T) -> Self {
        Self::Replace(value)
    }
}

#[derive(Debug, Clone)]
pub struct History<T> {
    past: VecDeque<HistoryEntry<T>>,
    present: HistoryEntry<T>,
    future: VecDeque<HistoryEntry<T>>,
    capacity: usize,
}

impl<T: Default> Default for History<T> {
    fn default() -> Self {
        Self::new(T::default(), DEFAULT_HISTORY_CAPACITY)
    }
}

impl<T> History<T> {
    pub fn new(initial: T, capacity: usize) -> Self {
        Self {
            past: VecDeque::new(),
            present: HistoryEntry::new(initial, INITIAL_LABEL),
            future: VecDeque::new(),
            capacity,
        }
    }

    pub fn value(&self) -> &T {
        &self.present.value
    }

    pub fn present(&self) -> &HistoryEntry<T> {
        &self.present
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Index of `present` within the timeline.
    pub fn pointer(&self) -> usize {
        self.past.len()
    }

    pub fn timeline_len(&self) -> usize {
        self.past.len() + 1 + self.future.len()
    }

    pub fn timeline(&self) -> Vec<TimelineEntry> {
        self.entries()
            .map(|entry| TimelineEntry {
                label: entry.label.clone(),
            })
            .collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry<T>> {
        self.past
            .iter()
            .chain(std::iter::once(&self.present))
            .chain(self.future.iter())
    }

    /// Records a new present. Clears the redo branch unconditionally.
    pub fn set<'a>(&mut self, update: impl Into<Update<'a, T>>, label: impl Into<String>)
    where
        T: 'a,
    {
        let label = label.into();
        let next = update.into().resolve(&self.present.value);
        let previous = std::mem::replace(&mut self.present, HistoryEntry::new(next, label));
        self.past.push_back(previous);
        self.trim_past();
        if !self.future.is_empty() {
            tracing::debug!(discarded = self.future.len(), "discarding redo branch");
        }
        self.future.clear();
        tracing::debug!(
            label = %self.present.label,
            pointer = self.pointer(),
            "history entry recorded"
        );
    }

    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.past.pop_back() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, previous);
        self.future.push_front(current);
        tracing::debug!(label = %self.present.label, pointer = self.pointer(), "undo applied");
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.future.pop_front() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, next);
        self.past.push_back(current);
        self.trim_past();
        tracing::debug!(label = %self.present.label, pointer = self.pointer(), "redo applied");
        true
    }

    /// Moves `present` to timeline slot `index`. Out-of-range indices are ignored.
    ///
    /// Equivalent to re-slicing the whole timeline at `index`; the capacity trim is
    /// re-applied to the resulting past.
    pub fn jump_to(&mut self, index: usize) -> bool {
        let total = self.timeline_len();
        if index >= total {
            tracing::debug!(index, total, "ignoring out-of-range history jump");
            return false;
        }
        while self.pointer() > index {
            self.step_back();
        }
        while self.pointer() < index {
            self.step_forward();
        }
        self.trim_past();
        tracing::debug!(index, label = %self.present.label, "jumped to history entry");
        true
    }

    fn step_back(&mut self) {
        if let Some(previous) = self.past.pop_back() {
            let current = std::mem::replace(&mut self.present, previous);
            self.future.push_front(current);
        }
    }

    fn step_forward(&mut self) {
        if let Some(next) = self.future.pop_front() {
            let current = std::mem::replace(&mut self.present, next);
            self.past.push_back(current);
        }
    }

    fn trim_past(&mut self) {
        while self.past.len() > self.capacity {
            if let Some(evicted) = self.past.pop_front() {
                tracing::trace!(label = %evicted.label, "evicting oldest history entry");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(history: &History<i32>) -> Vec<String> {
        history
            .timeline()
            .into_iter()
            .map(|entry| entry.label)
            .collect()
    }

    #[test]
    fn new_history_starts_with_initial_entry() {
        let history = History::new(0, 20);
        assert_eq!(*history.value(), 0);
        assert_eq!(labels(&history), vec!["Initial"]);
        assert_eq!(history.pointer(), 0);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn set_accepts_value_or_function_of_previous() {
        let mut history = History::new(1, 20);
        history.set(5, "replace");
        history.set(Update::apply(|prev: &i32| prev * 10), "multiply");
        assert_eq!(*history.value(), 50);
        assert_eq!(history.present().label, "multiply");
    }

    #[test]
    fn undo_restores_previous_and_redo_reapplies() {
        let mut history = History::new(1, 20);
        history.set(Update::apply(|prev: &i32| prev + 1), "increment");

        assert!(history.undo());
        assert_eq!(*history.value(), 1);
        assert!(history.can_redo());

        assert!(history.redo());
        assert_eq!(*history.value(), 2);
        assert!(!history.can_redo());
    }

    #[test]
    fn undo_and_redo_at_boundaries_are_no_ops() {
        let mut history = History::new(1, 20);
        assert!(!history.undo());
        assert!(!history.redo());
        assert_eq!(*history.value(), 1);
        assert_eq!(history.timeline_len(), 1);
    }

    #[test]
    fn set_after_undo_discards_redo_branch() {
        let mut history = History::new(0, 20);
        history.set(1, "one");
        history.undo();
        history.set(2, "two");

        assert!(!history.can_redo());
        assert!(!history.redo());
        assert_eq!(*history.value(), 2);
        assert_eq!(labels(&history), vec!["Initial", "two"]);
    }

    #[test]
    fn capacity_evicts_oldest_entries() {
        let mut history = History::new(0, 20);
        for call in 1..=25 {
            history.set(call, format!("call {call}"));
        }

        assert_eq!(history.pointer(), 20);
        assert_eq!(history.timeline()[0].label, "call 5");
        assert_eq!(history.timeline()[1].label, "call 6");
        assert_eq!(history.present().label, "call 25");
    }

    #[test]
    fn eviction_is_irreversible() {
        let mut history = History::new(0, 2);
        for call in 1..=4 {
            history.set(call, format!("call {call}"));
        }
        while history.undo() {}
        assert_eq!(*history.value(), 2);
        assert_eq!(labels(&history), vec!["call 2", "call 3", "call 4"]);
    }

    #[test]
    fn redo_respects_capacity() {
        let mut history = History::new(0, 2);
        history.set(1, "one");
        history.set(2, "two");
        history.undo();
        history.redo();
        assert_eq!(history.pointer(), 2);
        assert_eq!(labels(&history), vec!["Initial", "one", "two"]);
    }

    #[test]
    fn jump_to_reslices_timeline_both_directions() {
        let mut history = History::new(0, 20);
        for call in 1..=4 {
            history.set(call, format!("call {call}"));
        }
        let before: Vec<i32> = history.entries().map(|entry| entry.value).collect();

        for index in [1, 4, 0, 3, 2] {
            assert!(history.jump_to(index));
            assert_eq!(history.pointer(), index);
            assert_eq!(*history.value(), before[index]);
            assert_eq!(history.timeline_len(), 5);
        }
    }

    #[test]
    fn jump_to_out_of_range_is_ignored() {
        let mut history = History::new(0, 20);
        history.set(1, "one");
        assert!(!history.jump_to(2));
        assert!(!history.jump_to(usize::MAX));
        assert_eq!(history.pointer(), 1);
        assert_eq!(*history.value(), 1);
    }

    #[test]
    fn set_after_jump_discards_entries_after_pointer() {
        let mut history = History::new(0, 20);
        history.set(1, "one");
        history.set(2, "two");
        history.jump_to(0);
        history.set(9, "nine");
        assert_eq!(labels(&history), vec!["Initial", "nine"]);
    }
}
