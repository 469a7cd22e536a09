//! Selection state and the derived external value.
//!
//! The selected-item set is the single source of truth; the comma-joined
//! value string is recomputed after every mutation and never edited on its
//! own. Applying an external value string is the one flow that runs the
//! other way, and the controller guards it with a dirty check so the two
//! directions cannot re-trigger each other.

use serde_json::Value;

use crate::accessor::field_string;

/// Result of applying an external comma-joined value string.
#[derive(Debug, Clone, Default)]
pub struct ApplyOutcome {
    /// Whether the selection was replaced.
    pub applied: bool,
    /// Tokens with no matching item in the pool, in input order.
    pub unresolved: Vec<String>,
}

/// Owns the ordered, unique-by-value selection set.
#[derive(Debug, Clone)]
pub struct SelectionState {
    value_field: String,
    multi: bool,
    selected: Vec<Value>,
    derived: String,
}

impl SelectionState {
    pub fn new(value_field: impl Into<String>, multi: bool) -> Self {
        Self {
            value_field: value_field.into(),
            multi,
            selected: Vec::new(),
            derived: String::new(),
        }
    }

    pub fn selected(&self) -> &[Value] {
        &self.selected
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// The most recently selected item.
    pub fn last(&self) -> Option<&Value> {
        self.selected.last()
    }

    /// The comma-joined value string derived from the selection.
    pub fn derived_value(&self) -> &str {
        &self.derived
    }

    fn item_value(&self, item: &Value) -> String {
        field_string(item, &self.value_field)
    }

    fn recompute_derived(&mut self) {
        let values: Vec<String> = self.selected.iter().map(|i| self.item_value(i)).collect();
        self.derived = values.join(",");
    }

    /// Select an item. No-op when an equal-value entry is already selected.
    /// Multi-select appends; single-select replaces the whole selection.
    /// Returns whether the selection changed.
    pub fn select(&mut self, item: Value) -> bool {
        let value = self.item_value(&item);
        if self.selected.iter().any(|s| self.item_value(s) == value) {
            return false;
        }
        if self.multi {
            self.selected.push(item);
        } else {
            self.selected = vec![item];
        }
        self.recompute_derived();
        true
    }

    /// Remove the entry whose value field equals `value`.
    pub fn delete_by_value(&mut self, value: &str) -> bool {
        let Some(pos) = self.selected.iter().position(|s| self.item_value(s) == value) else {
            return false;
        };
        self.selected.remove(pos);
        self.recompute_derived();
        true
    }

    /// Remove the most recently selected entry, if any.
    pub fn delete_last(&mut self) -> Option<Value> {
        let removed = self.selected.pop();
        if removed.is_some() {
            self.recompute_derived();
        }
        removed
    }

    /// Replace the selection from an external comma-joined value string.
    ///
    /// Tokens are deduped preserving order and mapped against the current
    /// selection first, then the pool (so already-selected items survive pool
    /// replacement). Unmatched tokens are dropped from the selection and
    /// reported for the controller's remote resolution path.
    pub fn apply_external(&mut self, csv: &str, pool: &[Value]) -> ApplyOutcome {
        let mut tokens: Vec<&str> = Vec::new();
        for token in csv.split(',') {
            if !tokens.contains(&token) {
                tokens.push(token);
            }
        }

        let mut matched: Vec<Value> = Vec::new();
        let mut unresolved: Vec<String> = Vec::new();
        for token in tokens {
            let found = self
                .selected
                .iter()
                .chain(pool.iter())
                .find(|item| self.item_value(item) == token);
            match found {
                Some(item) => matched.push(item.clone()),
                None => unresolved.push(token.to_string()),
            }
        }

        self.selected = matched;
        self.recompute_derived();
        ApplyOutcome {
            applied: true,
            unresolved,
        }
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.selected.clear();
        self.derived.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(id: u64) -> Value {
        json!({"id": id, "label": format!("item-{id}")})
    }

    fn multi_state() -> SelectionState {
        SelectionState::new("id", true)
    }

    #[test]
    fn test_select_appends_in_multi_mode() {
        let mut sel = multi_state();
        assert!(sel.select(item(1)));
        assert!(sel.select(item(2)));
        assert_eq!(sel.derived_value(), "1,2");
    }

    #[test]
    fn test_select_replaces_in_single_mode() {
        let mut sel = SelectionState::new("id", false);
        sel.select(item(1));
        sel.select(item(2));
        assert_eq!(sel.len(), 1);
        assert_eq!(sel.derived_value(), "2");
    }

    #[test]
    fn test_select_duplicate_is_noop() {
        let mut sel = multi_state();
        sel.select(item(1));
        assert!(!sel.select(item(1)));
        assert_eq!(sel.len(), 1);
    }

    #[test]
    fn test_no_duplicate_values_after_any_sequence() {
        let mut sel = multi_state();
        for id in [1, 2, 1, 3, 2, 3, 1] {
            sel.select(item(id));
        }
        let values: Vec<String> = sel
            .selected()
            .iter()
            .map(|i| field_string(i, "id"))
            .collect();
        let mut deduped = values.clone();
        deduped.dedup();
        assert_eq!(values, deduped);
        assert_eq!(sel.len(), 3);
    }

    #[test]
    fn test_delete_by_value() {
        let mut sel = multi_state();
        sel.select(item(1));
        sel.select(item(2));
        assert!(sel.delete_by_value("1"));
        assert_eq!(sel.derived_value(), "2");
        assert!(!sel.delete_by_value("99"));
    }

    #[test]
    fn test_delete_last_on_empty_is_noop() {
        let mut sel = multi_state();
        assert!(sel.delete_last().is_none());
        assert_eq!(sel.derived_value(), "");
    }

    #[test]
    fn test_delete_last_removes_most_recent() {
        let mut sel = multi_state();
        sel.select(item(1));
        sel.select(item(2));
        let removed = sel.delete_last().unwrap();
        assert_eq!(removed["id"], 2);
        assert_eq!(sel.derived_value(), "1");
    }

    #[test]
    fn test_apply_external_orders_and_drops() {
        let mut sel = multi_state();
        let pool = vec![item(2), item(1)];
        let outcome = sel.apply_external("1,3,2", &pool);
        assert!(outcome.applied);
        assert_eq!(outcome.unresolved, vec!["3".to_string()]);
        assert_eq!(sel.derived_value(), "1,2");
    }

    #[test]
    fn test_apply_external_dedups_tokens() {
        let mut sel = multi_state();
        let pool = vec![item(1)];
        sel.apply_external("1,1,1", &pool);
        assert_eq!(sel.derived_value(), "1");
    }

    #[test]
    fn test_apply_external_prefers_existing_selection() {
        let mut sel = multi_state();
        sel.select(json!({"id": 1, "label": "selected-copy"}));
        let pool = vec![json!({"id": 1, "label": "pool-copy"})];
        sel.apply_external("1", &pool);
        assert_eq!(sel.selected()[0]["label"], "selected-copy");
    }

    #[test]
    fn test_derived_matches_join_after_mutations() {
        let mut sel = multi_state();
        sel.select(item(3));
        sel.select(item(1));
        sel.delete_by_value("3");
        sel.select(item(2));
        let expected: Vec<String> = sel
            .selected()
            .iter()
            .map(|i| field_string(i, "id"))
            .collect();
        assert_eq!(sel.derived_value(), expected.join(","));
    }

    #[test]
    fn test_numeric_and_string_values_compare_loosely() {
        let mut sel = SelectionState::new("id", true);
        sel.select(json!({"id": 1}));
        // token "1" matches the numeric id
        assert!(sel.delete_by_value("1"));
    }
}
