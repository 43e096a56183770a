//! Stage calculator
//!
//! Pure functions mapping elapsed time since order creation onto a
//! [`StageTable`]: which stage is current, and how far along each stage is.

use crate::models::{Stage, StageTable};
use serde::Serialize;

/// Index of the current stage for `elapsed_ms`.
///
/// The first stage whose threshold strictly exceeds `elapsed_ms`; the terminal
/// stage when every threshold has passed. Non-decreasing in `elapsed_ms`.
pub fn stage_index(table: &StageTable, elapsed_ms: i64) -> usize {
    table
        .stages()
        .iter()
        .position(|stage| elapsed_ms < stage.duration_ms)
        .unwrap_or(table.len() - 1)
}

/// Current stage for `elapsed_ms`
pub fn current_stage(table: &StageTable, elapsed_ms: i64) -> &Stage {
    &table.stages()[stage_index(table, elapsed_ms)]
}

/// Completion percentage (0-100) of a single stage.
///
/// Stage 0's window is empty, so it reports 100 for any `elapsed_ms >= 0`.
pub fn stage_progress(table: &StageTable, index: usize, elapsed_ms: i64) -> f64 {
    let Some((start, end)) = table.window(index) else {
        return 0.0;
    };

    if elapsed_ms < start {
        0.0
    } else if elapsed_ms < end {
        let progress = (elapsed_ms - start) as f64 / (end - start) as f64 * 100.0;
        progress.clamp(0.0, 100.0)
    } else {
        100.0
    }
}

/// Per-stage completion percentages, non-decreasing in `elapsed_ms` per entry
pub fn progress_vector(table: &StageTable, elapsed_ms: i64) -> Vec<f64> {
    (0..table.len())
        .map(|index| stage_progress(table, index, elapsed_ms))
        .collect()
}

/// Presentation values for one order at one instant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageSnapshot {
    pub elapsed_ms: i64,
    pub stage_index: usize,
    pub stage_name: String,
    pub progress: Vec<f64>,
}

impl StageSnapshot {
    /// Whether stage `index` is reached (drawn as active on the timeline)
    pub fn is_active(&self, index: usize) -> bool {
        index <= self.stage_index
    }

    /// Whether the order sits in the last stage
    pub fn is_terminal(&self) -> bool {
        self.stage_index + 1 == self.progress.len()
    }

    /// Progress rounded to whole percent, used to detect visible changes
    pub fn rounded_progress(&self) -> Vec<u8> {
        self.progress.iter().map(|p| p.round() as u8).collect()
    }
}

/// Compute the snapshot for an order created at `timestamp_ms`, observed at `now_ms`
pub fn snapshot(table: &StageTable, timestamp_ms: i64, now_ms: i64) -> StageSnapshot {
    let elapsed_ms = now_ms.saturating_sub(timestamp_ms);
    let stage_index = stage_index(table, elapsed_ms);
    StageSnapshot {
        elapsed_ms,
        stage_index,
        stage_name: table.stages()[stage_index].name.clone(),
        progress: progress_vector(table, elapsed_ms),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "expected {:?}, got {:?}", expected, actual);
        }
    }

    #[test]
    fn test_zero_elapsed_skips_empty_first_window() {
        let table = StageTable::default();
        assert_eq!(stage_index(&table, 0), 1);
        assert_eq!(current_stage(&table, 0).name, "Shipped");
        assert_close(&progress_vector(&table, 0), &[100.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_mid_shipped() {
        let table = StageTable::default();
        let snap = snapshot(&table, 1_000, 5_000);
        assert_eq!(snap.elapsed_ms, 4_000);
        assert_eq!(snap.stage_name, "Shipped");
        assert_close(&snap.progress, &[100.0, 80.0, 0.0, 0.0, 0.0]);
        assert!(snap.is_active(0));
        assert!(snap.is_active(1));
        assert!(!snap.is_active(2));
        assert!(!snap.is_terminal());
    }

    #[test]
    fn test_threshold_boundaries() {
        let table = StageTable::default();
        assert_eq!(current_stage(&table, 4_999).name, "Shipped");
        assert_eq!(current_stage(&table, 5_000).name, "Arrived in Country");
        assert_eq!(current_stage(&table, 14_999).name, "At Post Office");
        assert_eq!(current_stage(&table, 19_999).name, "Delivered");
        assert_eq!(current_stage(&table, 20_000).name, "Delivered");
        assert_close(&progress_vector(&table, 5_000), &[100.0, 100.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_past_every_threshold_is_terminal() {
        let table = StageTable::default();
        let snap = snapshot(&table, 0, 25_000);
        assert_eq!(snap.stage_name, "Delivered");
        assert!(snap.is_terminal());
        assert_close(&snap.progress, &[100.0; 5]);
    }

    #[test]
    fn test_negative_elapsed_reports_first_stage() {
        let table = StageTable::default();
        assert_eq!(stage_index(&table, -10), 0);
        assert_close(&progress_vector(&table, -10), &[0.0; 5]);
    }

    #[test]
    fn test_stage_progress_out_of_range_index() {
        let table = StageTable::default();
        assert_eq!(stage_progress(&table, 9, 1_000), 0.0);
    }

    #[test]
    fn test_single_stage_table() {
        let table = StageTable::new(vec![Stage::new("Only", 0)]).unwrap();
        assert_eq!(stage_index(&table, 0), 0);
        assert_eq!(stage_index(&table, 1_000_000), 0);
        assert_close(&progress_vector(&table, 7), &[100.0]);
    }

    #[test]
    fn test_rounded_progress() {
        let table = StageTable::default();
        let snap = snapshot(&table, 0, 1_234);
        assert_eq!(snap.rounded_progress(), vec![100, 25, 0, 0, 0]);
    }

    #[test]
    fn test_extreme_timestamps_saturate() {
        let table = StageTable::default();
        let far_past = snapshot(&table, i64::MIN, i64::MAX);
        assert_eq!(far_past.elapsed_ms, i64::MAX);
        assert!(far_past.is_terminal());
        assert_close(&far_past.progress, &[100.0; 5]);

        let far_future = snapshot(&table, i64::MAX, i64::MIN);
        assert_eq!(far_future.elapsed_ms, i64::MIN);
        assert_eq!(far_future.stage_index, 0);
        assert_close(&far_future.progress, &[0.0; 5]);
    }
}
