//! Which layers the next manipulation or property edit applies to.

use std::collections::BTreeSet;

use crate::document::{Document, LayerId};

/// Cardinality of the selection, which decides how gestures are normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPolicy {
    Empty,
    Single(LayerId),
    Multiple,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: BTreeSet<LayerId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> &BTreeSet<LayerId> {
        &self.selected
    }

    pub fn to_vec(&self) -> Vec<LayerId> {
        self.selected.iter().copied().collect()
    }

    pub fn contains(&self, id: LayerId) -> bool {
        self.selected.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn policy(&self) -> SelectionPolicy {
        let mut ids = self.selected.iter();
        match (ids.next(), ids.next()) {
            (None, _) => SelectionPolicy::Empty,
            (Some(id), None) => SelectionPolicy::Single(*id),
            (Some(_), Some(_)) => SelectionPolicy::Multiple,
        }
    }

    /// Replaces the selection with `id`, or clears it for `None`. Returns whether it changed.
    pub fn select_only(&mut self, id: Option<LayerId>) -> bool {
        let next: BTreeSet<LayerId> = id.into_iter().collect();
        self.replace(next)
    }

    /// Modifier-click behavior: adds `id` if absent, removes it if present.
    pub fn toggle(&mut self, id: LayerId) -> bool {
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
        true
    }

    pub fn select_all(&mut self, ids: impl IntoIterator<Item = LayerId>) -> bool {
        self.replace(ids.into_iter().collect())
    }

    pub fn clear(&mut self) -> bool {
        self.replace(BTreeSet::new())
    }

    /// Drops ids that no longer exist in `document`.
    pub fn retain_existing(&mut self, document: &Document) -> bool {
        let before = self.selected.len();
        self.selected.retain(|id| document.contains(*id));
        before != self.selected.len()
    }

    fn replace(&mut self, next: BTreeSet<LayerId>) -> bool {
        if self.selected == next {
            return false;
        }
        self.selected = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TextLayer;

    #[test]
    fn select_only_replaces_and_none_clears() {
        let mut selection = Selection::new();
        selection.select_all([LayerId(1), LayerId(2)]);

        assert!(selection.select_only(Some(LayerId(3))));
        assert_eq!(selection.to_vec(), vec![LayerId(3)]);
        assert_eq!(selection.policy(), SelectionPolicy::Single(LayerId(3)));

        assert!(selection.select_only(None));
        assert!(selection.is_empty());
        assert_eq!(selection.policy(), SelectionPolicy::Empty);
    }

    #[test]
    fn select_only_same_id_reports_unchanged() {
        let mut selection = Selection::new();
        assert!(selection.select_only(Some(LayerId(1))));
        assert!(!selection.select_only(Some(LayerId(1))));
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut selection = Selection::new();
        selection.toggle(LayerId(1));
        selection.toggle(LayerId(2));
        assert_eq!(selection.policy(), SelectionPolicy::Multiple);

        selection.toggle(LayerId(1));
        assert_eq!(selection.to_vec(), vec![LayerId(2)]);
    }

    #[test]
    fn select_all_deduplicates() {
        let mut selection = Selection::new();
        selection.select_all([LayerId(2), LayerId(1), LayerId(2)]);
        assert_eq!(selection.len(), 2);
        assert!(selection.clear());
        assert!(!selection.clear());
    }

    #[test]
    fn retain_existing_drops_missing_layers() {
        let document = Document::from_layers(vec![TextLayer::new(LayerId(1), "a")], None);
        let mut selection = Selection::new();
        selection.select_all([LayerId(1), LayerId(2)]);

        assert!(selection.retain_existing(&document));
        assert_eq!(selection.to_vec(), vec![LayerId(1)]);
        assert!(!selection.retain_existing(&document));
    }
}
