//! Field-extraction strategies for first-row mode.
//!
//! The historical behavior was a fixed positional splice over the row's
//! whole text; that stays available (and default) for compatibility, while
//! named column rules decouple callers from the exact text layout.

use harrow_core::config::FieldRule;

/// One extracted field value, optionally named. Splice fields carry no
/// name; column fields carry the rule's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: Option<String>,
    pub value: String,
}

/// Splits `text` on whitespace and removes `count` tokens starting at
/// `start`, with legacy `splice(4, 7)` semantics: a start past the end
/// removes nothing, a count past the end removes what exists.
pub fn splice_fields(text: &str, start: usize, count: usize) -> Vec<Field> {
    let mut tokens: Vec<String> = text.split_whitespace().map(str::to_string).collect();
    if start < tokens.len() {
        let end = start.saturating_add(count).min(tokens.len());
        tokens.drain(start..end);
    }
    tokens
        .into_iter()
        .map(|value| Field { name: None, value })
        .collect()
}

/// Draws one named value per rule from the row's cells. A rule pointing
/// past the end of the row yields an empty string, consistent with how
/// cells without text are reported.
pub fn column_fields(rules: &[FieldRule], cells: &[String]) -> Vec<Field> {
    rules
        .iter()
        .map(|rule| Field {
            name: Some(rule.name.clone()),
            value: cells.get(rule.cell).cloned().unwrap_or_default(),
        })
        .collect()
}
