// src/forecast/engine/grid.rs
//! The grid session: selection, fetched data, overlay, autosave and the
//! Save/Post actions. Network work is described by request values that the
//! Bevy systems execute; results come back through the `*_completed` and
//! `apply_fetch` methods.

use bevy::log::{debug, info, warn};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

use super::autosave::AutosaveScheduler;
use super::change_set::{
    build_change_set, cell_warnings, merged_rows, CellWarning, ChangeRecord, InvalidNumberPolicy,
};
use super::error::GridError;
use super::overlay::EditOverlay;
use super::tracker::{summarize, ModificationSummary, TrackerInput};
use crate::forecast::definitions::{
    derive_columns, forecast_columns, ColumnDescriptor, ColumnFilters, ForecastRow, OrgUnit,
    PermissionConfig, Policy, Selection,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridTimings {
    pub fetch_debounce: Duration,
    pub autosave_delay: Duration,
}

impl Default for GridTimings {
    fn default() -> Self {
        Self {
            fetch_debounce: Duration::from_millis(500),
            autosave_delay: AutosaveScheduler::DEFAULT_DELAY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GridPhase {
    /// No complete selection.
    #[default]
    Idle,
    Loading,
    Ready,
    /// Overlay holds unsaved edits.
    Editing,
    Saving,
    Posting,
}

impl fmt::Display for GridPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GridPhase::Idle => "Idle",
            GridPhase::Loading => "Loading",
            GridPhase::Ready => "Ready",
            GridPhase::Editing => "Editing",
            GridPhase::Saving => "Saving",
            GridPhase::Posting => "Posting",
        };
        write!(f, "{}", label)
    }
}

/// Result of one refresh: rows, permission flags and summary rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridSnapshot {
    pub rows: Vec<ForecastRow>,
    pub permission: PermissionConfig,
    pub summary: Vec<ForecastRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub generation: u64,
    pub unit: OrgUnit,
    pub selection: Selection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTrigger {
    Autosave,
    Manual,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub generation: u64,
    pub unit: OrgUnit,
    pub selection: Selection,
    pub trigger: SaveTrigger,
    /// Overlay revision the records were built from.
    pub overlay_revision: u64,
    pub records: Vec<ChangeRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostRequest {
    pub generation: u64,
    pub unit: OrgUnit,
    pub selection: Selection,
    pub rows: Vec<Value>,
    pub records: Vec<ChangeRecord>,
}

#[derive(Debug, Clone)]
pub struct ForecastGrid {
    unit: OrgUnit,
    policy: Policy,
    invalid_numbers: InvalidNumberPolicy,
    selection: Option<Selection>,
    rows: Vec<ForecastRow>,
    columns: Vec<ColumnDescriptor>,
    forecast_columns: Vec<String>,
    permission: PermissionConfig,
    summary: Vec<ForecastRow>,
    overlay: EditOverlay,
    filters: ColumnFilters,
    // Responses tagged with an older generation are dropped.
    generation: u64,
    fetch_due: Option<Duration>,
    fetch_debounce: Duration,
    autosave: AutosaveScheduler,
    // Generation each in-flight write was issued under. Only the matching
    // completion frees the slot.
    saving: Option<u64>,
    posting: Option<u64>,
    autosaving: Option<u64>,
    phase: GridPhase,
    last_error: Option<String>,
}

impl ForecastGrid {
    pub fn new(
        unit: OrgUnit,
        policy: Policy,
        timings: GridTimings,
        invalid_numbers: InvalidNumberPolicy,
    ) -> Self {
        Self {
            unit,
            policy,
            invalid_numbers,
            selection: None,
            rows: Vec::new(),
            columns: Vec::new(),
            forecast_columns: Vec::new(),
            permission: PermissionConfig::default(),
            summary: Vec::new(),
            overlay: EditOverlay::new(),
            filters: ColumnFilters::default(),
            generation: 0,
            fetch_due: None,
            fetch_debounce: timings.fetch_debounce,
            autosave: AutosaveScheduler::new(timings.autosave_delay),
            saving: None,
            posting: None,
            autosaving: None,
            phase: GridPhase::Idle,
            last_error: None,
        }
    }

    /// Grid for another unit replacing `previous`. Generations continue past
    /// the old grid's so its late responses stay stale here.
    pub fn succeeding(
        previous: &ForecastGrid,
        unit: OrgUnit,
        policy: Policy,
        timings: GridTimings,
        invalid_numbers: InvalidNumberPolicy,
    ) -> Self {
        let mut grid = Self::new(unit, policy, timings, invalid_numbers);
        grid.generation = previous.generation + 1;
        grid
    }

    pub fn unit(&self) -> OrgUnit {
        self.unit
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn rows(&self) -> &[ForecastRow] {
        &self.rows
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn forecast_columns(&self) -> &[String] {
        &self.forecast_columns
    }

    pub fn is_forecast_column(&self, column: &str) -> bool {
        self.forecast_columns.iter().any(|c| c == column)
    }

    pub fn permission(&self) -> PermissionConfig {
        self.permission
    }

    pub fn summary_rows(&self) -> &[ForecastRow] {
        &self.summary
    }

    pub fn overlay(&self) -> &EditOverlay {
        &self.overlay
    }

    pub fn filters(&self) -> &ColumnFilters {
        &self.filters
    }

    pub fn filters_mut(&mut self) -> &mut ColumnFilters {
        &mut self.filters
    }

    pub fn phase(&self) -> GridPhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_saving(&self) -> bool {
        self.saving.is_some()
    }

    pub fn is_posting(&self) -> bool {
        self.posting.is_some()
    }

    pub fn is_autosaving(&self) -> bool {
        self.autosave.is_in_flight()
    }

    pub fn autosave_pending(&self) -> bool {
        self.autosave.is_pending()
    }

    pub fn effective_value(&self, row: &ForecastRow, column: &str) -> String {
        self.overlay.effective_value(row, column)
    }

    pub fn modification_summary(&self) -> ModificationSummary {
        summarize(TrackerInput {
            rows: &self.rows,
            forecast_columns: &self.forecast_columns,
            overlay: &self.overlay,
            permission: self.permission,
            policy: self.policy,
        })
    }

    pub fn cell_warnings(&self) -> Vec<CellWarning> {
        cell_warnings(&self.rows, &self.forecast_columns, &self.overlay)
    }

    /// Indices of rows passing the column filters.
    pub fn visible_rows(&self) -> Vec<usize> {
        self.filters.apply(&self.rows)
    }

    fn is_idle_for_actions(&self) -> bool {
        !self.write_in_flight() && matches!(self.phase, GridPhase::Ready | GridPhase::Editing)
    }

    pub fn can_save(&self) -> bool {
        self.is_idle_for_actions() && self.modification_summary().save_eligible
    }

    /// Post stays clickable while idle; eligibility is checked on click.
    pub fn can_post(&self) -> bool {
        self.is_idle_for_actions() && !self.rows.is_empty()
    }

    // --- Selection and fetching ---

    /// Any change returns the grid to `Loading` (or `Idle` when incomplete)
    /// and discards unsaved edits together with in-flight responses.
    pub fn set_selection(&mut self, selection: Selection, now: Duration) {
        if self.selection.as_ref() == Some(&selection) && self.phase != GridPhase::Idle {
            return;
        }
        self.autosave.cancel();
        self.generation += 1;
        self.clear_data();
        let complete = selection.is_complete_for(self.unit);
        self.selection = Some(selection);
        if complete {
            self.fetch_due = Some(now + self.fetch_debounce);
            self.phase = GridPhase::Loading;
        } else {
            self.fetch_due = None;
            self.phase = GridPhase::Idle;
        }
    }

    /// Re-fetch the current selection without debounce.
    pub fn refresh(&mut self, now: Duration) -> Result<(), GridError> {
        self.active_selection()?;
        self.arm_refetch(now);
        Ok(())
    }

    pub fn poll_fetch(&mut self, now: Duration) -> Option<FetchRequest> {
        let due = self.fetch_due?;
        if due > now {
            return None;
        }
        self.fetch_due = None;
        let selection = match self.active_selection() {
            Ok(selection) => selection,
            Err(_) => {
                self.phase = GridPhase::Idle;
                return None;
            }
        };
        self.generation += 1;
        self.phase = GridPhase::Loading;
        debug!(
            "Forecast grid: issuing fetch generation {} for {} {:?}",
            self.generation, self.unit, selection
        );
        Some(FetchRequest {
            generation: self.generation,
            unit: self.unit,
            selection,
        })
    }

    /// Applies a fetch result. Returns false when the response is stale.
    pub fn apply_fetch(&mut self, generation: u64, result: Result<GridSnapshot, String>) -> bool {
        if generation != self.generation {
            debug!(
                "Forecast grid: dropping stale fetch generation {} (current {}).",
                generation, self.generation
            );
            return false;
        }
        self.overlay.reset();
        self.autosave.cancel();
        match result {
            Ok(snapshot) => {
                self.columns = derive_columns(&snapshot.rows);
                self.forecast_columns = forecast_columns(&self.columns, self.policy.forecast_suffix);
                self.rows = snapshot.rows;
                self.permission = snapshot.permission;
                self.summary = snapshot.summary;
                self.last_error = None;
                info!(
                    "Forecast grid: loaded {} rows ({} forecast columns) for {}.",
                    self.rows.len(),
                    self.forecast_columns.len(),
                    self.unit
                );
            }
            Err(message) => {
                warn!("Forecast grid: fetch failed: {}", message);
                self.clear_data();
                self.last_error = Some(message);
            }
        }
        self.phase = GridPhase::Ready;
        true
    }

    // --- Editing ---

    pub fn edit_cell(
        &mut self,
        row_key: &str,
        column: &str,
        value: impl Into<String>,
        now: Duration,
    ) -> Result<(), GridError> {
        match self.phase {
            GridPhase::Idle => return Err(GridError::NoSelection),
            GridPhase::Loading => return Err(GridError::NotReady),
            GridPhase::Saving | GridPhase::Posting => return Err(GridError::Busy),
            GridPhase::Ready | GridPhase::Editing => {}
        }
        if !self.is_forecast_column(column) {
            return Err(GridError::NotEditable(column.to_string()));
        }
        if !self.rows.iter().any(|r| r.key() == row_key) {
            return Err(GridError::UnknownRow(row_key.to_string()));
        }
        self.overlay.set_by_key(row_key.to_string(), column, value);
        self.autosave.schedule(now);
        self.phase = GridPhase::Editing;
        Ok(())
    }

    /// Blur, Enter or Escape on a cell: save pending edits now.
    pub fn commit_edits(&mut self, now: Duration) {
        self.autosave.flush(now);
    }

    // --- Saving ---

    pub fn poll_autosave(&mut self, now: Duration) -> Option<SaveRequest> {
        // Held, not consumed, until the manual write lands.
        if self.saving.is_some() || self.posting.is_some() {
            return None;
        }
        if !self.autosave.poll(now) {
            return None;
        }
        let selection = self.active_selection().ok()?;
        let rejected = self.rejected_cell_count();
        if rejected > 0 {
            warn!("Forecast grid: autosave skipped, {} invalid cell(s).", rejected);
            return None;
        }
        if self.policy.save_gated_by_permission && !self.permission.save_allowed {
            debug!("Forecast grid: autosave skipped, saving is locked.");
            return None;
        }
        let records = self.build_records();
        if records.is_empty() {
            debug!("Forecast grid: autosave fired with an empty change-set.");
            return None;
        }
        self.autosave.begin();
        self.autosaving = Some(self.generation);
        Some(SaveRequest {
            generation: self.generation,
            unit: self.unit,
            selection,
            trigger: SaveTrigger::Autosave,
            overlay_revision: self.overlay.revision(),
            records,
        })
    }

    /// Re-fetches only when nothing was edited while the request was in
    /// flight; otherwise the newer edits stay scheduled.
    pub fn autosave_completed(
        &mut self,
        generation: u64,
        overlay_revision: u64,
        result: Result<(), String>,
        now: Duration,
    ) {
        if self.autosaving != Some(generation) {
            debug!("Forecast grid: ignoring autosave completion from generation {}.", generation);
            return;
        }
        self.autosaving = None;
        self.autosave.complete(now);
        if generation != self.generation {
            return;
        }
        match result {
            Ok(()) => {
                let untouched = self.overlay.revision() == overlay_revision;
                if untouched && !self.autosave.is_pending() && !self.write_in_flight() {
                    self.arm_refetch(now);
                }
            }
            Err(message) => {
                warn!("Forecast grid: autosave failed: {}", message);
                self.last_error = Some(message);
            }
        }
    }

    pub fn request_save(&mut self) -> Result<SaveRequest, GridError> {
        let selection = self.check_action_preconditions()?;
        let summary = self.modification_summary();
        if summary.modified.is_empty() {
            return Err(GridError::NothingToSave);
        }
        if !summary.save_eligible {
            return Err(GridError::SaveNotAllowed);
        }
        let rejected = self.rejected_cell_count();
        if rejected > 0 {
            return Err(GridError::InvalidCells(rejected));
        }
        let records = self.build_records();
        if records.is_empty() {
            return Err(GridError::NothingToSave);
        }
        self.autosave.cancel();
        self.saving = Some(self.generation);
        self.phase = GridPhase::Saving;
        Ok(SaveRequest {
            generation: self.generation,
            unit: self.unit,
            selection,
            trigger: SaveTrigger::Manual,
            overlay_revision: self.overlay.revision(),
            records,
        })
    }

    pub fn save_completed(&mut self, generation: u64, result: Result<(), String>, now: Duration) {
        if self.saving != Some(generation) {
            return;
        }
        self.saving = None;
        if generation != self.generation {
            return;
        }
        match result {
            Ok(()) => self.arm_refetch(now),
            Err(message) => {
                warn!("Forecast grid: save failed: {}", message);
                self.last_error = Some(message);
                self.phase = self.settled_phase();
            }
        }
    }

    // --- Posting ---

    pub fn request_post(&mut self) -> Result<PostRequest, GridError> {
        let selection = self.check_action_preconditions()?;
        let summary = self.modification_summary();
        if !summary.post.is_eligible() {
            return Err(GridError::PostNotEligible(summary.post.to_string()));
        }
        let rejected = self.rejected_cell_count();
        if rejected > 0 {
            return Err(GridError::InvalidCells(rejected));
        }
        let rows = merged_rows(&self.rows, &self.forecast_columns, &self.overlay);
        let records = self.build_records();
        self.autosave.cancel();
        self.posting = Some(self.generation);
        self.phase = GridPhase::Posting;
        Ok(PostRequest {
            generation: self.generation,
            unit: self.unit,
            selection,
            rows,
            records,
        })
    }

    pub fn post_completed(&mut self, generation: u64, result: Result<(), String>, now: Duration) {
        if self.posting != Some(generation) {
            return;
        }
        self.posting = None;
        if generation != self.generation {
            return;
        }
        match result {
            Ok(()) => self.arm_refetch(now),
            Err(message) => {
                warn!("Forecast grid: post failed: {}", message);
                self.last_error = Some(message);
                self.phase = self.settled_phase();
            }
        }
    }

    /// Screen teardown: pending autosave is dropped without flushing and any
    /// in-flight response becomes stale.
    pub fn teardown(&mut self) {
        if self.autosave.is_pending() {
            warn!("Forecast grid: discarding unsaved edits still inside the autosave window.");
        }
        self.autosave.cancel();
        self.fetch_due = None;
        self.generation += 1;
    }

    // --- Internals ---

    fn active_selection(&self) -> Result<Selection, GridError> {
        self.selection
            .clone()
            .filter(|s| s.is_complete_for(self.unit))
            .ok_or(GridError::NoSelection)
    }

    fn check_action_preconditions(&self) -> Result<Selection, GridError> {
        let selection = self.active_selection()?;
        if self.write_in_flight() {
            return Err(GridError::Busy);
        }
        if matches!(self.phase, GridPhase::Loading | GridPhase::Idle) {
            return Err(GridError::NotReady);
        }
        Ok(selection)
    }

    /// Any save, post or autosave request still outstanding.
    fn write_in_flight(&self) -> bool {
        self.saving.is_some() || self.posting.is_some() || self.autosave.is_in_flight()
    }

    fn build_records(&self) -> Vec<ChangeRecord> {
        build_change_set(
            &self.rows,
            &self.forecast_columns,
            &self.overlay,
            self.policy.change_set_mode,
        )
    }

    fn rejected_cell_count(&self) -> usize {
        match self.invalid_numbers {
            InvalidNumberPolicy::CoerceToBlank => 0,
            InvalidNumberPolicy::Reject => self.cell_warnings().len(),
        }
    }

    fn arm_refetch(&mut self, now: Duration) {
        self.fetch_due = Some(now);
        self.phase = GridPhase::Loading;
    }

    fn settled_phase(&self) -> GridPhase {
        if self.overlay.is_empty() {
            GridPhase::Ready
        } else {
            GridPhase::Editing
        }
    }

    fn clear_data(&mut self) {
        self.rows.clear();
        self.columns.clear();
        self.forecast_columns.clear();
        self.summary.clear();
        self.permission = PermissionConfig::default();
        self.overlay.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::engine::change_set::ChangeFields;
    use serde_json::json;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn grid(unit: OrgUnit) -> ForecastGrid {
        ForecastGrid::new(
            unit,
            unit.default_policy(),
            GridTimings::default(),
            InvalidNumberPolicy::CoerceToBlank,
        )
    }

    fn snapshot(permission: PermissionConfig) -> GridSnapshot {
        let rows = vec![
            json!({"Material": "M1", "Branch": "B1", "Product": "AC", "Jan-25 RFC": "10", "Feb-25 RFC": ""}),
            json!({"Material": "M2", "Branch": "B1", "Product": "AC", "Jan-25 RFC": "", "Feb-25 RFC": ""}),
        ];
        GridSnapshot {
            rows: rows.into_iter().filter_map(ForecastRow::from_value).collect(),
            permission,
            summary: Vec::new(),
        }
    }

    const OPEN: PermissionConfig = PermissionConfig {
        post_allowed: true,
        save_allowed: true,
    };

    /// Selects a branch period and applies a successful fetch.
    fn loaded(unit: OrgUnit, permission: PermissionConfig) -> ForecastGrid {
        let mut g = grid(unit);
        g.set_selection(Selection::new(Some("B1".into()), 1, 2025), ms(0));
        let req = g.poll_fetch(ms(500)).expect("fetch due after debounce");
        assert!(g.apply_fetch(req.generation, Ok(snapshot(permission))));
        g
    }

    #[test]
    fn incomplete_selection_stays_idle() {
        let mut g = grid(OrgUnit::Branch);
        g.set_selection(Selection::new(None, 1, 2025), ms(0));
        assert_eq!(g.phase(), GridPhase::Idle);
        assert!(g.poll_fetch(ms(10_000)).is_none());
    }

    #[test]
    fn fetch_is_debounced() {
        let mut g = grid(OrgUnit::Marketing);
        g.set_selection(Selection::new(None, 1, 2025), ms(0));
        assert_eq!(g.phase(), GridPhase::Loading);
        assert!(g.poll_fetch(ms(499)).is_none());
        g.set_selection(Selection::new(None, 2, 2025), ms(300));
        assert!(g.poll_fetch(ms(500)).is_none());
        let req = g.poll_fetch(ms(800)).unwrap();
        assert_eq!(req.selection.month, 2);
        assert!(g.poll_fetch(ms(2000)).is_none());
    }

    #[test]
    fn stale_fetch_is_dropped() {
        let mut g = grid(OrgUnit::Marketing);
        g.set_selection(Selection::new(None, 1, 2025), ms(0));
        let first = g.poll_fetch(ms(500)).unwrap();
        g.set_selection(Selection::new(None, 2, 2025), ms(600));
        let second = g.poll_fetch(ms(1100)).unwrap();
        assert!(g.apply_fetch(second.generation, Ok(snapshot(OPEN))));
        assert!(!g.apply_fetch(first.generation, Ok(GridSnapshot::default())));
        assert_eq!(g.rows().len(), 2);
        assert_eq!(g.selection().unwrap().month, 2);
    }

    #[test]
    fn fetch_derives_forecast_columns() {
        let g = loaded(OrgUnit::Branch, OPEN);
        assert_eq!(g.forecast_columns(), &["Jan-25 RFC".to_string(), "Feb-25 RFC".to_string()]);
        assert_eq!(g.columns()[0].key, "Material");
        assert_eq!(g.phase(), GridPhase::Ready);
    }

    #[test]
    fn refetch_resets_overlay() {
        let mut g = loaded(OrgUnit::Branch, OPEN);
        let row = g.rows()[0].clone();
        assert_eq!(g.effective_value(&row, "Jan-25 RFC"), "10");
        g.edit_cell("M1_B1", "Jan-25 RFC", "15", ms(1000)).unwrap();
        assert_eq!(g.effective_value(&row, "Jan-25 RFC"), "15");
        assert_eq!(g.phase(), GridPhase::Editing);
        g.refresh(ms(1100)).unwrap();
        let req = g.poll_fetch(ms(1100)).unwrap();
        g.apply_fetch(req.generation, Ok(snapshot(OPEN)));
        assert_eq!(g.effective_value(&g.rows()[0].clone(), "Jan-25 RFC"), "10");
        assert!(g.overlay().is_empty());
    }

    #[test]
    fn only_forecast_cells_are_editable() {
        let mut g = loaded(OrgUnit::Branch, OPEN);
        assert_eq!(
            g.edit_cell("M1_B1", "Product", "X", ms(0)),
            Err(GridError::NotEditable("Product".into()))
        );
        assert_eq!(
            g.edit_cell("M9_B1", "Jan-25 RFC", "1", ms(0)),
            Err(GridError::UnknownRow("M9_B1".into()))
        );
    }

    #[test]
    fn edits_are_blocked_while_loading() {
        let mut g = grid(OrgUnit::Marketing);
        g.set_selection(Selection::new(None, 1, 2025), ms(0));
        assert_eq!(g.edit_cell("M1_B1", "Jan-25 RFC", "1", ms(0)), Err(GridError::NotReady));
    }

    #[test]
    fn burst_of_edits_autosaves_once_with_final_values() {
        let mut g = loaded(OrgUnit::Branch, OPEN);
        g.edit_cell("M2_B1", "Jan-25 RFC", "1", ms(1000)).unwrap();
        g.edit_cell("M2_B1", "Jan-25 RFC", "12", ms(1500)).unwrap();
        g.edit_cell("M2_B1", "Feb-25 RFC", "3", ms(2000)).unwrap();
        assert!(g.poll_autosave(ms(4999)).is_none());
        let req = g.poll_autosave(ms(5000)).expect("one autosave");
        assert_eq!(req.trigger, SaveTrigger::Autosave);
        assert_eq!(
            req.records,
            vec![ChangeRecord {
                material: "M2".into(),
                fields: ChangeFields::Summed { rfc: 15.0 }
            }]
        );
        assert!(g.poll_autosave(ms(20_000)).is_none());
    }

    #[test]
    fn commit_flushes_autosave() {
        let mut g = loaded(OrgUnit::Branch, OPEN);
        g.edit_cell("M2_B1", "Jan-25 RFC", "4", ms(1000)).unwrap();
        g.commit_edits(ms(1100));
        assert!(g.poll_autosave(ms(1100)).is_some());
    }

    #[test]
    fn autosave_success_refetches_when_untouched() {
        let mut g = loaded(OrgUnit::Branch, OPEN);
        g.edit_cell("M2_B1", "Jan-25 RFC", "4", ms(1000)).unwrap();
        let req = g.poll_autosave(ms(4000)).unwrap();
        g.autosave_completed(req.generation, req.overlay_revision, Ok(()), ms(4200));
        assert_eq!(g.phase(), GridPhase::Loading);
        assert!(g.poll_fetch(ms(4200)).is_some());
    }

    #[test]
    fn edits_during_autosave_are_saved_next() {
        let mut g = loaded(OrgUnit::Branch, OPEN);
        g.edit_cell("M2_B1", "Jan-25 RFC", "4", ms(1000)).unwrap();
        let req = g.poll_autosave(ms(4000)).unwrap();
        g.edit_cell("M2_B1", "Feb-25 RFC", "6", ms(4100)).unwrap();
        assert!(g.poll_autosave(ms(7100)).is_none(), "guarded while in flight");
        g.autosave_completed(req.generation, req.overlay_revision, Ok(()), ms(7200));
        assert_eq!(g.phase(), GridPhase::Editing);
        let next = g.poll_autosave(ms(7200)).expect("queued autosave");
        assert_eq!(next.records[0].fields, ChangeFields::Summed { rfc: 10.0 });
    }

    #[test]
    fn selection_change_cancels_pending_autosave() {
        let mut g = loaded(OrgUnit::Branch, OPEN);
        g.edit_cell("M2_B1", "Jan-25 RFC", "4", ms(1000)).unwrap();
        g.set_selection(Selection::new(Some("B2".into()), 1, 2025), ms(1200));
        assert_eq!(g.phase(), GridPhase::Loading);
        assert!(g.poll_autosave(ms(10_000)).is_none());
        assert!(g.overlay().is_empty());
    }

    #[test]
    fn manual_save_then_refetch() {
        let mut g = loaded(OrgUnit::Branch, OPEN);
        assert_eq!(g.request_save(), Err(GridError::NothingToSave));
        g.edit_cell("M2_B1", "Jan-25 RFC", "7", ms(1000)).unwrap();
        assert!(g.can_save());
        let req = g.request_save().unwrap();
        assert_eq!(req.trigger, SaveTrigger::Manual);
        assert_eq!(g.phase(), GridPhase::Saving);
        assert!(!g.can_save());
        assert_eq!(g.request_save(), Err(GridError::Busy));
        assert!(g.poll_autosave(ms(10_000)).is_none());
        g.save_completed(req.generation, Ok(()), ms(1500));
        assert!(!g.is_saving());
        assert!(g.poll_fetch(ms(1500)).is_some());
    }

    #[test]
    fn failed_save_keeps_edits() {
        let mut g = loaded(OrgUnit::Branch, OPEN);
        g.edit_cell("M2_B1", "Jan-25 RFC", "7", ms(1000)).unwrap();
        let req = g.request_save().unwrap();
        g.save_completed(req.generation, Err("HTTP 500".into()), ms(1500));
        assert_eq!(g.phase(), GridPhase::Editing);
        assert_eq!(g.last_error(), Some("HTTP 500"));
        assert!(!g.overlay().is_empty());
    }

    #[test]
    fn post_is_refused_until_all_rows_filled() {
        let mut g = loaded(OrgUnit::Branch, OPEN);
        assert!(matches!(g.request_post(), Err(GridError::PostNotEligible(_))));
        g.edit_cell("M1_B1", "Feb-25 RFC", "1", ms(0)).unwrap();
        g.edit_cell("M2_B1", "Jan-25 RFC", "2", ms(0)).unwrap();
        g.edit_cell("M2_B1", "Feb-25 RFC", "3", ms(0)).unwrap();
        let req = g.request_post().unwrap();
        assert_eq!(req.rows.len(), 2);
        assert_eq!(req.rows[1]["Feb-25 RFC"], json!(3));
        assert_eq!(req.records.len(), 2);
        assert_eq!(g.phase(), GridPhase::Posting);
        g.post_completed(req.generation, Ok(()), ms(100));
        assert!(g.poll_fetch(ms(100)).is_some());
    }

    #[test]
    fn post_is_refused_without_permission() {
        let mut g = loaded(OrgUnit::Branch, PermissionConfig::default());
        g.edit_cell("M1_B1", "Feb-25 RFC", "1", ms(0)).unwrap();
        g.edit_cell("M2_B1", "Jan-25 RFC", "2", ms(0)).unwrap();
        g.edit_cell("M2_B1", "Feb-25 RFC", "3", ms(0)).unwrap();
        assert!(matches!(g.request_post(), Err(GridError::PostNotEligible(_))));
    }

    #[test]
    fn reject_policy_blocks_invalid_cells() {
        let mut g = ForecastGrid::new(
            OrgUnit::Branch,
            OrgUnit::Branch.default_policy(),
            GridTimings::default(),
            InvalidNumberPolicy::Reject,
        );
        g.set_selection(Selection::new(Some("B1".into()), 1, 2025), ms(0));
        let req = g.poll_fetch(ms(500)).unwrap();
        g.apply_fetch(req.generation, Ok(snapshot(OPEN)));
        g.edit_cell("M2_B1", "Jan-25 RFC", "5", ms(600)).unwrap();
        g.edit_cell("M2_B1", "Feb-25 RFC", "five", ms(600)).unwrap();
        assert_eq!(g.request_save(), Err(GridError::InvalidCells(1)));
        assert!(g.poll_autosave(ms(10_000)).is_none());
        assert_eq!(g.cell_warnings().len(), 1);
    }

    #[test]
    fn partner_save_is_gated_by_permission() {
        let locked = PermissionConfig {
            post_allowed: true,
            save_allowed: false,
        };
        let mut g = loaded(OrgUnit::Dawlance, locked);
        g.edit_cell("M2_B1", "Jan-25 RFC", "5", ms(0)).unwrap();
        assert_eq!(g.request_save(), Err(GridError::SaveNotAllowed));
        assert!(g.poll_autosave(ms(10_000)).is_none());
    }

    #[test]
    fn teardown_drops_pending_edits_and_responses() {
        let mut g = loaded(OrgUnit::Branch, OPEN);
        g.edit_cell("M2_B1", "Jan-25 RFC", "5", ms(0)).unwrap();
        let generation = g.generation();
        g.teardown();
        assert!(!g.autosave_pending());
        assert!(!g.apply_fetch(generation, Ok(GridSnapshot::default())));
    }

    fn marketing_after(previous: &ForecastGrid) -> ForecastGrid {
        ForecastGrid::succeeding(
            previous,
            OrgUnit::Marketing,
            OrgUnit::Marketing.default_policy(),
            GridTimings::default(),
            InvalidNumberPolicy::CoerceToBlank,
        )
    }

    #[test]
    fn unit_switch_keeps_old_fetch_stale() {
        let mut old = grid(OrgUnit::Branch);
        old.set_selection(Selection::new(Some("B1".into()), 1, 2025), ms(0));
        let old_fetch = old.poll_fetch(ms(500)).unwrap();
        old.teardown();

        let mut next = marketing_after(&old);
        next.set_selection(Selection::new(Some("B1".into()), 1, 2025), ms(600));
        let fetch = next.poll_fetch(ms(1100)).unwrap();
        assert!(fetch.generation > old_fetch.generation);
        assert!(!next.apply_fetch(old_fetch.generation, Ok(snapshot(OPEN))));
        assert!(next.rows().is_empty());
        assert_eq!(next.phase(), GridPhase::Loading);
        assert!(next.apply_fetch(fetch.generation, Ok(snapshot(OPEN))));
    }

    #[test]
    fn unit_switch_ignores_old_save_completion() {
        let mut old = loaded(OrgUnit::Branch, OPEN);
        old.edit_cell("M2_B1", "Jan-25 RFC", "4", ms(1000)).unwrap();
        let old_save = old.request_save().unwrap();
        old.teardown();

        let mut next = marketing_after(&old);
        next.set_selection(Selection::new(None, 1, 2025), ms(0));
        let fetch = next.poll_fetch(ms(500)).unwrap();
        next.apply_fetch(fetch.generation, Ok(snapshot(OPEN)));
        next.edit_cell("M2_B1", "Jan-25 RFC", "5", ms(600)).unwrap();
        let save = next.request_save().unwrap();

        next.save_completed(old_save.generation, Ok(()), ms(700));
        assert!(next.is_saving());
        assert_eq!(next.request_save(), Err(GridError::Busy));
        next.save_completed(save.generation, Ok(()), ms(800));
        assert!(!next.is_saving());
    }

    #[test]
    fn manual_save_waits_for_autosave() {
        let mut g = loaded(OrgUnit::Branch, OPEN);
        g.edit_cell("M1_B1", "Jan-25 RFC", "4", ms(1000)).unwrap();
        let auto = g.poll_autosave(ms(4000)).unwrap();
        g.edit_cell("M1_B1", "Jan-25 RFC", "9", ms(4100)).unwrap();
        assert!(!g.can_save());
        assert_eq!(g.request_save(), Err(GridError::Busy));

        g.autosave_completed(auto.generation, auto.overlay_revision, Ok(()), ms(4300));
        assert!(g.can_save());
        let req = g.request_save().unwrap();
        assert_eq!(req.records[0].fields, ChangeFields::Summed { rfc: 9.0 });
    }

    #[test]
    fn post_waits_for_autosave() {
        let mut g = loaded(OrgUnit::Branch, OPEN);
        g.edit_cell("M1_B1", "Feb-25 RFC", "1", ms(0)).unwrap();
        g.edit_cell("M2_B1", "Jan-25 RFC", "2", ms(0)).unwrap();
        g.edit_cell("M2_B1", "Feb-25 RFC", "3", ms(0)).unwrap();
        let auto = g.poll_autosave(ms(3000)).unwrap();
        assert!(!g.can_post());
        assert!(matches!(g.request_post(), Err(GridError::Busy)));

        g.autosave_completed(auto.generation, auto.overlay_revision, Ok(()), ms(3200));
        assert!(!g.is_autosaving());
        assert!(g.poll_fetch(ms(3200)).is_some());
    }

    #[test]
    fn autosave_is_held_until_earlier_save_lands() {
        let mut g = loaded(OrgUnit::Branch, OPEN);
        g.edit_cell("M2_B1", "Jan-25 RFC", "7", ms(1000)).unwrap();
        let save = g.request_save().unwrap();
        g.set_selection(Selection::new(Some("B1".into()), 2, 2025), ms(1100));
        let fetch = g.poll_fetch(ms(1600)).unwrap();
        g.apply_fetch(fetch.generation, Ok(snapshot(OPEN)));
        g.edit_cell("M2_B1", "Jan-25 RFC", "3", ms(1700)).unwrap();
        assert!(g.poll_autosave(ms(4700)).is_none());

        g.save_completed(save.generation, Ok(()), ms(5000));
        assert!(!g.is_saving());
        assert_eq!(g.phase(), GridPhase::Editing);
        let auto = g.poll_autosave(ms(5000)).expect("held autosave fires");
        assert_eq!(auto.records[0].fields, ChangeFields::Summed { rfc: 3.0 });
    }

    #[test]
    fn failed_fetch_leaves_grid_empty_and_ready() {
        let mut g = grid(OrgUnit::Marketing);
        g.set_selection(Selection::new(None, 1, 2025), ms(0));
        let req = g.poll_fetch(ms(500)).unwrap();
        assert!(g.apply_fetch(req.generation, Err("timeout".into())));
        assert_eq!(g.phase(), GridPhase::Ready);
        assert!(g.rows().is_empty());
        assert_eq!(g.last_error(), Some("timeout"));
        assert!(!g.can_post());
    }

    #[test]
    fn filters_hide_rows_but_not_from_tracker() {
        let mut g = loaded(OrgUnit::Branch, OPEN);
        g.filters_mut().set("Material", vec!["M1".to_string()]);
        assert_eq!(g.visible_rows(), vec![0]);
        g.edit_cell("M2_B1", "Jan-25 RFC", "5", ms(0)).unwrap();
        assert!(g.modification_summary().modified.contains("M2_B1"));
    }
}
