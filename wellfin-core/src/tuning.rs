//! Named defaults for the planning heuristics.
//!
//! Handlers and normalizers read every threshold from a [`Tuning`] value
//! instead of hard-coding it, so deployments can adjust them in one place.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tuning {
    /// Minutes assumed when a task carries no usable duration.
    pub default_task_minutes: u32,
    /// Tasks longer than this get sub-tasks and a split suggestion.
    pub subtask_threshold_minutes: u32,
    /// Tasks longer than this are advised a dedicated focus block.
    pub focus_block_threshold_minutes: u32,
    /// Tasks at or under this length are advised for gap time.
    pub quick_task_threshold_minutes: u32,
    /// Length of the working day used by the efficiency score.
    pub workday_minutes: u32,
    /// Efficiency the improvement percentage is measured against.
    pub baseline_efficiency: f64,
    pub priority_bonus_step: f64,
    pub priority_bonus_cap: f64,
    /// Start hour used when nothing better is known.
    pub fallback_hour: u32,
    pub search_hours: RangeInclusive<u32>,
    pub default_work_style: String,
    pub default_completion_rate: f64,
    pub high_completion_rate: f64,
    pub low_completion_rate: f64,
    /// Floor for the recommendations improvement percentage.
    pub min_recommendation_improvement: i64,
    pub default_timeframe: String,
    pub title_preview_chars: usize,
    pub history_sample_size: usize,
    /// Offset applied when stamping wall-clock hours onto dates.
    pub utc_offset_minutes: i32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            default_task_minutes: 60,
            subtask_threshold_minutes: 120,
            focus_block_threshold_minutes: 90,
            quick_task_threshold_minutes: 30,
            workday_minutes: 8 * 60,
            baseline_efficiency: 0.7,
            priority_bonus_step: 0.1,
            priority_bonus_cap: 0.3,
            fallback_hour: 9,
            search_hours: 6..=22,
            default_work_style: "balanced".to_string(),
            default_completion_rate: 0.8,
            high_completion_rate: 0.8,
            low_completion_rate: 0.6,
            min_recommendation_improvement: 15,
            default_timeframe: "1週間".to_string(),
            title_preview_chars: 50,
            history_sample_size: 5,
            utc_offset_minutes: 0,
        }
    }
}

impl Tuning {
    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let tuning = Tuning::default();
        assert_eq!(tuning.default_task_minutes, 60);
        assert_eq!(tuning.workday_minutes, 480);
        assert_eq!(tuning.fallback_hour, 9);
        assert_eq!(tuning.search_hours, 6..=22);
        assert_eq!(tuning.min_recommendation_improvement, 15);
    }

    #[test]
    fn offset_builder() {
        let tuning = Tuning::default().with_utc_offset_minutes(540);
        assert_eq!(tuning.utc_offset_minutes, 540);
    }
}
