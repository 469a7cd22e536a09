//! The picker controller.
//!
//! `Picker` composes the converter, index, remote source, selection, and
//! navigation machine, and is the sole mutator of the shared state: the item
//! pool, the display window, the keyword, and the external value string. The
//! embedding layer renders from the read-only accessors, feeds key and
//! focus/blur events in, and drives `tick()` from its event loop so throttled
//! fetches and the blur grace period can fire.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;

use crate::accessor::{field_string, get_path, value_string};
use crate::config::{PickerConfig, PickerMode};
use crate::index::SearchIndex;
use crate::navigation::{HandleResult, Key, KeyEvent, NavigationState};
use crate::pinyin::PinyinConverter;
use crate::remote::{HttpTransport, RemoteSource, Transport};
use crate::selection::SelectionState;
use crate::time::{Clock, SystemClock};

/// Upper bound on the candidates offered at once.
pub const DISPLAY_WINDOW_SIZE: usize = 9;

/// Delay between blur and panel close, tolerating a concurrent
/// click-to-select.
const BLUR_GRACE: Duration = Duration::from_millis(200);

pub struct Picker {
    config: PickerConfig,
    pinyin: PinyinConverter,
    index: SearchIndex,
    remote: Option<RemoteSource>,
    selection: SelectionState,
    nav: NavigationState,
    clock: Arc<dyn Clock>,

    pool: Vec<Value>,
    window: Vec<Value>,
    keyword: String,
    /// External value string; converges to the derived value once applied.
    value: String,
    /// Text-mode mirror of the value or keyword.
    text: String,
    pending_blur: Option<Instant>,
}

impl Picker {
    /// Picker with the production collaborators (reqwest transport, system
    /// clock).
    pub fn new(config: PickerConfig) -> Self {
        Self::with_collaborators(config, Arc::new(HttpTransport::new()), Arc::new(SystemClock))
    }

    /// Picker with explicit transport and clock, the seam tests use.
    pub fn with_collaborators(
        config: PickerConfig,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let remote = config
            .remote
            .clone()
            .map(|remote_config| RemoteSource::new(remote_config, transport));
        let selection = SelectionState::new(&config.value_field, config.multi);
        Self {
            config,
            pinyin: PinyinConverter::new(),
            index: SearchIndex::new(),
            remote,
            selection,
            nav: NavigationState::new(),
            clock,
            pool: Vec::new(),
            window: Vec::new(),
            keyword: String::new(),
            value: String::new(),
            text: String::new(),
            pending_blur: None,
        }
    }

    // ------------------------------------------------------------------
    // Read-only surface
    // ------------------------------------------------------------------

    pub fn config(&self) -> &PickerConfig {
        &self.config
    }

    /// Candidates currently offered, at most [`DISPLAY_WINDOW_SIZE`].
    pub fn display_window(&self) -> &[Value] {
        &self.window
    }

    pub fn selected_values(&self) -> &[Value] {
        self.selection.selected()
    }

    /// The most recently selected item.
    pub fn selected_item(&self) -> Option<&Value> {
        self.selection.last()
    }

    pub fn focus_index(&self) -> Option<usize> {
        self.nav.focus()
    }

    pub fn is_open(&self) -> bool {
        self.nav.is_open()
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// The comma-joined external value string.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn items(&self) -> &[Value] {
        &self.pool
    }

    /// Display label for an item, through the configured field or resolver.
    pub fn label_of(&self, item: &Value) -> String {
        self.config.label_field.resolve(item)
    }

    /// Hotkey column text for the row at `index`.
    pub fn hotkey_label(&self, index: usize) -> String {
        format!("Alt+{}", index + 1)
    }

    /// True unless `required` is set and the selection (or, in text mode,
    /// the text) is empty.
    pub fn validate(&self) -> bool {
        if !self.config.required {
            return true;
        }
        match self.config.mode {
            PickerMode::Text => !self.text.is_empty(),
            PickerMode::Default => !self.selection.is_empty(),
        }
    }

    // ------------------------------------------------------------------
    // Pool lifecycle
    // ------------------------------------------------------------------

    /// Wholesale pool assignment (local mode). Resets and rebuilds the
    /// index, recomputes the display window, and re-applies the current
    /// external value against the new pool.
    pub async fn set_items(&mut self, items: Vec<Value>) {
        self.install_pool(items);
        self.apply_value_to_selection().await;
    }

    /// Initial remote load. If an item matches the current value it moves to
    /// the front of the pool; else, with a value already set, the value is
    /// resolved instead; else the response becomes the pool as-is.
    pub async fn init(&mut self) {
        let Some(items) = self.fetch_initial().await else {
            return;
        };

        let matched_index = if self.value.is_empty() {
            None
        } else {
            items
                .iter()
                .position(|item| self.item_value(item) == self.value)
        };

        if let Some(index) = matched_index {
            let mut items = items;
            let found = items.remove(index);
            items.insert(0, found);
            self.install_pool(items);
            self.apply_value_to_selection().await;
        } else if !self.value.is_empty() {
            if let Some(resolved) = self.resolve_by_value(self.value.clone()).await {
                if !resolved.is_empty() {
                    self.install_pool(resolved);
                    self.apply_value_to_selection().await;
                }
            }
        } else {
            self.install_pool(items);
        }
    }

    fn install_pool(&mut self, items: Vec<Value>) {
        self.pool = items;
        self.rebuild_index();
        self.window = self.default_window();
        self.nav.reset_focus(self.window.len());
    }

    fn default_window(&self) -> Vec<Value> {
        self.pool.iter().take(DISPLAY_WINDOW_SIZE).cloned().collect()
    }

    fn rebuild_index(&mut self) {
        let entries: Vec<(Value, Vec<String>)> = self
            .pool
            .iter()
            .map(|item| (item.clone(), self.build_keys(item)))
            .collect();
        self.index.reset();
        for (item, keys) in entries {
            self.index.add_entry(item, keys);
        }
    }

    /// Search keys for one item: configured index fields (all fields when
    /// none are configured), each as its string form plus, unless pinyin
    /// search is disabled, its full-pinyin and initials forms.
    fn build_keys(&self, item: &Value) -> Vec<String> {
        let values: Vec<Value> = if !self.config.fields_for_index.is_empty() {
            self.config
                .fields_for_index
                .iter()
                .filter_map(|field| get_path(item, field).cloned())
                .collect()
        } else if let Some(map) = item.as_object() {
            map.values().cloned().collect()
        } else {
            vec![item.clone()]
        };

        let mut keys = Vec::new();
        for value in values {
            let raw = value_string(&value);
            if self.config.disable_pinyin_search {
                keys.push(raw);
            } else {
                let full = self.pinyin.to_full_pinyin(&raw);
                let initials = self.pinyin.to_initials(&raw);
                keys.push(raw);
                keys.push(full);
                keys.push(initials);
            }
        }
        keys
    }

    fn item_value(&self, item: &Value) -> String {
        field_string(item, &self.config.value_field)
    }

    fn pool_has(&self, item: &Value) -> bool {
        let value = self.item_value(item);
        self.pool.iter().any(|i| self.item_value(i) == value)
    }

    // ------------------------------------------------------------------
    // Keyword flow
    // ------------------------------------------------------------------

    /// Keyword change from user input. Opens the panel on non-empty input,
    /// updates the display window from the local index, and arms the
    /// throttled remote fetch when a remote source is configured.
    pub fn set_keyword(&mut self, text: &str) {
        self.keyword = text.to_string();

        if !self.keyword.is_empty() && !self.nav.is_open() && self.can_open() {
            self.nav.open(self.window.len());
        }

        if self.keyword.is_empty() {
            self.window = self.default_window();
        } else if self.remote.is_some() {
            // Display window stays until the response lands; the fetch fires
            // from tick() once the throttle window elapses.
            let now = self.clock.now();
            if let Some(remote) = &mut self.remote {
                remote.arm_keyword(text, now);
            }
        } else {
            self.window = self
                .index
                .search(&self.keyword)
                .into_iter()
                .take(DISPLAY_WINDOW_SIZE)
                .collect();
        }
        self.nav.reset_focus(self.window.len());
    }

    /// Clear the keyword (the clear affordance next to the input).
    pub fn clear_keyword(&mut self) {
        self.set_keyword("");
    }

    /// Text-mode assignment: a text matching a pool item's value drives the
    /// external value; otherwise it becomes the raw keyword and value.
    pub async fn set_text(&mut self, text: &str) {
        let matches_pool_item = self.pool.iter().any(|i| self.item_value(i) == text);
        self.text = text.to_string();
        if matches_pool_item {
            self.set_external_value(text).await;
        } else if self.config.mode == PickerMode::Text {
            self.keyword = text.to_string();
            self.value = text.to_string();
        }
    }

    // ------------------------------------------------------------------
    // Driver
    // ------------------------------------------------------------------

    /// Fire whatever has come due: the throttled keyword fetch and the
    /// post-blur panel close. Call this periodically from the embedding
    /// event loop.
    pub async fn tick(&mut self) {
        let now = self.clock.now();

        if let Some(deadline) = self.pending_blur {
            if now >= deadline {
                self.pending_blur = None;
                self.nav.close();
            }
        }

        let due = self.remote.as_mut().and_then(|remote| remote.take_due(now));
        if let Some(keyword) = due {
            let fetched = self.fetch_by_keyword(&keyword).await;
            if let Some(items) = fetched {
                self.apply_keyword_response(items).await;
            }
        }
    }

    /// Explicit teardown: drops any armed fetch so nothing fires after the
    /// embedder is done with the picker.
    pub fn teardown(&mut self) {
        if let Some(remote) = &mut self.remote {
            remote.teardown();
        }
        self.pending_blur = None;
    }

    /// Merge a keyword response: unknown candidates are prepended to the
    /// pool (index rebuild included); a response with nothing new becomes
    /// the display window directly, pool and index untouched.
    async fn apply_keyword_response(&mut self, items: Vec<Value>) {
        let new: Vec<Value> = items
            .iter()
            .filter(|item| !self.pool_has(item))
            .cloned()
            .collect();

        if !new.is_empty() {
            let mut pool = new;
            pool.extend(std::mem::take(&mut self.pool));
            self.install_pool(pool);
            self.apply_value_to_selection().await;
        } else {
            self.window = items.into_iter().take(DISPLAY_WINDOW_SIZE).collect();
            self.nav.reset_focus(self.window.len());
        }
    }

    async fn fetch_initial(&self) -> Option<Vec<Value>> {
        match &self.remote {
            Some(remote) => remote.fetch_initial().await,
            None => None,
        }
    }

    async fn fetch_by_keyword(&self, keyword: &str) -> Option<Vec<Value>> {
        match &self.remote {
            Some(remote) => remote.fetch_by_keyword(keyword).await,
            None => None,
        }
    }

    async fn resolve_by_value(&self, values: String) -> Option<Vec<Value>> {
        match &self.remote {
            Some(remote) => remote.resolve_by_value(&values).await,
            None => None,
        }
    }

    // ------------------------------------------------------------------
    // Selection commands
    // ------------------------------------------------------------------

    /// Select an item: append (multi) or replace (single), closing the
    /// panel and clearing the keyword. Duplicate values are a no-op.
    /// Not gated by `multi_limit`, which only blocks panel opening.
    pub fn select(&mut self, item: Value) {
        self.pending_blur = None;
        self.selection.select(item);
        self.value = self.selection.derived_value().to_string();
        self.keyword.clear();
        self.window = self.default_window();
        self.nav.close();
        self.sync_text();
    }

    /// Select the row at `index` in the display window.
    pub fn select_at(&mut self, index: usize) {
        if let Some(item) = self.window.get(index).cloned() {
            self.select(item);
        }
    }

    /// Confirm the focused row; returns whether a selection happened.
    pub fn confirm_focused(&mut self) -> bool {
        let Some(index) = self.nav.focus() else {
            return false;
        };
        if !self.nav.is_open() || index >= self.window.len() {
            return false;
        }
        self.select_at(index);
        true
    }

    /// Remove the selected entry with this value (a tag's delete control).
    pub fn delete_by_value(&mut self, value: &str) -> bool {
        if !self.selection.delete_by_value(value) {
            return false;
        }
        self.value = self.selection.derived_value().to_string();
        if !self.config.multi || self.selection.is_empty() {
            self.keyword.clear();
            self.window = self.default_window();
        }
        self.sync_text();
        true
    }

    /// Remove the most recently selected entry. No-op when empty.
    pub fn delete_last(&mut self) -> Option<Value> {
        let removed = self.selection.delete_last();
        if removed.is_some() {
            self.value = self.selection.derived_value().to_string();
            self.sync_text();
        }
        removed
    }

    /// Assign the external comma-joined value string. Applies only when it
    /// differs from what the selection itself derives (dirty check), which
    /// breaks the value/selection update cycle.
    pub async fn set_external_value(&mut self, csv: &str) {
        if csv == self.selection.derived_value() {
            self.value = csv.to_string();
            return;
        }
        self.value = csv.to_string();
        self.apply_value_to_selection().await;
    }

    /// Map the stashed external value onto the pool. Unresolvable tokens
    /// are dropped, except single-select remote pickers which delegate the
    /// missing tokens to value resolution; a resolution that brings nothing
    /// new terminates the cycle.
    async fn apply_value_to_selection(&mut self) {
        if self.pool.is_empty() {
            // Value stays stashed; re-applied once the pool arrives.
            return;
        }
        if self.value.is_empty() {
            if !self.selection.is_empty() {
                self.selection.clear();
                self.sync_text();
            }
            return;
        }
        if self.selection.derived_value() == self.value {
            return;
        }

        let outcome = {
            let csv = self.value.clone();
            self.selection.apply_external(&csv, &self.pool)
        };

        let delegate = !outcome.unresolved.is_empty()
            && !self.config.multi
            && self.remote.is_some();
        if delegate {
            let missing = outcome.unresolved.join(",");
            tracing::debug!("resolving external value tokens not in pool: {missing}");
            if let Some(resolved) = self.resolve_by_value(missing).await {
                let fresh: Vec<Value> = resolved
                    .into_iter()
                    .filter(|item| !self.pool_has(item))
                    .collect();
                if !fresh.is_empty() {
                    let mut pool = std::mem::take(&mut self.pool);
                    pool.extend(fresh);
                    self.install_pool(pool);
                    let csv = self.value.clone();
                    self.selection.apply_external(&csv, &self.pool);
                }
            }
        }

        self.value = self.selection.derived_value().to_string();
        self.sync_text();
    }

    fn sync_text(&mut self) {
        if self.config.mode != PickerMode::Text {
            return;
        }
        self.text = if !self.value.is_empty() && !self.config.multi {
            self.value.clone()
        } else {
            self.keyword.clone()
        };
    }

    // ------------------------------------------------------------------
    // Navigation commands
    // ------------------------------------------------------------------

    pub fn open(&mut self) {
        self.nav.open(self.window.len());
    }

    pub fn close(&mut self) {
        self.nav.close();
    }

    /// Input focus gained. Opens the panel unless the multi-select limit is
    /// already reached.
    pub fn focus_gained(&mut self) {
        self.pending_blur = None;
        if !self.can_open() {
            return;
        }
        self.nav.open(self.window.len());
    }

    /// Input focus lost. The panel closes after a grace period (applied in
    /// `tick()`), so a click on a candidate still lands.
    pub fn blur(&mut self) {
        if self.nav.is_open() {
            self.pending_blur = Some(self.clock.now() + BLUR_GRACE);
        }
    }

    pub fn begin_composition(&mut self) {
        self.nav.begin_composition();
    }

    pub fn end_composition(&mut self) {
        self.nav.end_composition();
    }

    fn can_open(&self) -> bool {
        match self.config.multi_limit {
            Some(limit) => self.selection.len() < limit,
            None => true,
        }
    }

    /// Keyboard dispatch. All transitions are suppressed while an IME
    /// composition is in progress.
    pub fn handle_key(&mut self, event: KeyEvent) -> HandleResult {
        if self.nav.is_composing() {
            return HandleResult::Ignored;
        }

        if event.alt {
            if self.config.enable_hotkey && self.nav.is_open() {
                if let Key::Digit(digit) = event.key {
                    if (1..=9).contains(&digit) {
                        self.select_at(usize::from(digit) - 1);
                        return HandleResult::Handled;
                    }
                }
            }
            return HandleResult::Ignored;
        }

        if event.key == self.config.confirm_key {
            if self.confirm_focused() {
                return HandleResult::Handled;
            }
            return HandleResult::Ignored;
        }

        match event.key {
            Key::ArrowDown => {
                if self.nav.is_open() {
                    self.nav.move_down(self.window.len());
                } else {
                    self.nav.open(self.window.len());
                }
                HandleResult::Handled
            }
            Key::ArrowUp => {
                if self.nav.is_open() {
                    self.nav.move_up(self.window.len());
                    HandleResult::Handled
                } else {
                    HandleResult::Ignored
                }
            }
            Key::Backspace => {
                if self.keyword.is_empty() {
                    self.delete_last();
                    HandleResult::Handled
                } else {
                    HandleResult::Ignored
                }
            }
            _ => HandleResult::Ignored,
        }
    }
}
