use crate::document::Document;
use crate::history::History;
use crate::selection::Selection;

const EMPTY_TEXT_LABEL: &str = "Empty text";

#[derive(Debug, Clone, PartialEq)]
pub struct LayerRow {
    pub index: usize,
    pub label: String,
    pub subtitle: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    pub index: usize,
    pub label: String,
    pub is_current: bool,
}

/// Layer list in paint order, numbered from 1.
pub fn layer_rows(document: &Document, selection: &Selection) -> Vec<LayerRow> {
    document
        .layers()
        .iter()
        .enumerate()
        .map(|(index, layer)| LayerRow {
            index: index + 1,
            label: if layer.text.is_empty() {
                EMPTY_TEXT_LABEL.to_string()
            } else {
                layer.text.clone()
            },
            subtitle: format!("{} \u{2022} {}px", layer.font_family, layer.font_size),
            selected: selection.contains(layer.id),
        })
        .collect()
}

pub fn history_rows<T>(history: &History<T>) -> Vec<HistoryRow> {
    let pointer = history.pointer();
    history
        .timeline()
        .into_iter()
        .enumerate()
        .map(|(index, entry)| HistoryRow {
            index: index + 1,
            label: entry.label,
            is_current: index == pointer,
        })
        .collect()
}

pub fn history_footer<T>(history: &History<T>) -> String {
    format!("{} / {} steps", history.timeline_len(), history.capacity())
}
