//! Deterministic substitutes used when the model cannot answer.
//!
//! Nothing here returns a `Result`.

use chrono::Timelike;
use wellfin_core::{
    Level, Priority, RecommendationItem, RecommendationType, ScheduledTask, Tuning, generate_id,
};

use crate::clock::{at_hour, local_offset, task_date};
use crate::schedule::{CompletedTask, ScheduleRequest};

/// Completion rate per local hour of day; hours without history are zero.
pub fn productivity_histogram(history: &[CompletedTask], tuning: &Tuning) -> [f64; 24] {
    let offset = local_offset(tuning);
    let mut totals = [0u32; 24];
    let mut completed = [0u32; 24];
    for task in history {
        let hour = task.completed_at.with_timezone(&offset).hour() as usize;
        totals[hour] += 1;
        if task.completed {
            completed[hour] += 1;
        }
    }

    let mut histogram = [0.0; 24];
    for hour in 0..24 {
        if totals[hour] > 0 {
            histogram[hour] = f64::from(completed[hour]) / f64::from(totals[hour]);
        }
    }
    histogram
}

fn hour_score(histogram: &[f64; 24], hour: u32, priority: Priority) -> f64 {
    histogram.get(hour as usize).copied().unwrap_or_default() * f64::from(priority.weight()) / 5.0
}

/// Best hour in the search window; the fallback hour unless some hour scores above zero.
pub fn find_optimal_hour(priority: Priority, histogram: &[f64; 24], tuning: &Tuning) -> u32 {
    let mut best_hour = tuning.fallback_hour;
    let mut best_score = 0.0;
    for hour in tuning.search_hours.clone() {
        let score = hour_score(histogram, hour, priority);
        if score > best_score {
            best_score = score;
            best_hour = hour;
        }
    }
    best_hour
}

/// One entry per input task, each placed at its best historical hour.
pub fn fallback_schedule(request: &ScheduleRequest, tuning: &Tuning) -> Vec<ScheduledTask> {
    let histogram = productivity_histogram(&request.history, tuning);
    let offset = local_offset(tuning);

    request
        .tasks
        .iter()
        .map(|task| {
            let hour = find_optimal_hour(task.priority, &histogram, tuning);
            let start = at_hour(task_date(task, offset), hour, offset);
            let score = hour_score(&histogram, hour, task.priority);
            ScheduledTask::place(task, start, score)
        })
        .collect()
}

/// Generic productivity and habit advice, independent of the input.
pub fn fallback_recommendations(tuning: &Tuning) -> Vec<RecommendationItem> {
    vec![
        RecommendationItem {
            id: generate_id("rec"),
            kind: RecommendationType::Productivity,
            title: "生産性向上のヒント".to_string(),
            description: "朝の時間帯は集中力が高いため、重要なタスクを午前中に配置することをお勧めします。"
                .to_string(),
            priority: Level::Medium,
            category: "productivity".to_string(),
            actionable: true,
            estimated_impact: Level::Medium,
            implementation_steps: vec![
                "前日の夜に翌日の最重要タスクを1つ決める".to_string(),
                "午前中の最初の90分をそのタスクに充てる".to_string(),
            ],
            timeframe: tuning.default_timeframe.clone(),
        },
        RecommendationItem {
            id: generate_id("rec"),
            kind: RecommendationType::Habit,
            title: "習慣形成のアドバイス".to_string(),
            description: "小さな習慣から始めて、徐々に習慣を積み重ねていくことで継続しやすくなります。"
                .to_string(),
            priority: Level::High,
            category: "habits".to_string(),
            actionable: true,
            estimated_impact: Level::High,
            implementation_steps: vec![
                "2分以内で終わる習慣を1つ選ぶ".to_string(),
                "既存の習慣の直後に実行する".to_string(),
            ],
            timeframe: tuning.default_timeframe.clone(),
        },
    ]
}
