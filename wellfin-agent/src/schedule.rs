//! Schedule optimization: reconciles the model's schedule onto the input
//! tasks and derives conflicts, efficiency and notes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use wellfin_core::{
    ActionKind, ExecutionAction, ExecutionReport, ScheduledTask, TaskDescriptor, Tuning,
    round_hundredths,
};

use crate::clock::{at_hour, local_offset, parse_instant, task_date};
use crate::error::NormalizeError;

const DEFAULT_MODEL_SCORE: f64 = 0.8;

/// One completed (or abandoned) task from the user's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedTask {
    pub completed_at: DateTime<Utc>,
    #[serde(default = "default_completed")]
    pub completed: bool,
}

fn default_completed() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    pub tasks: Vec<TaskDescriptor>,
    #[serde(default)]
    pub existing_tasks: Vec<Value>,
    #[serde(default)]
    pub preferences: Map<String, Value>,
    /// Client-owned history; empty when the caller sends none.
    #[serde(default)]
    pub history: Vec<CompletedTask>,
}

impl ScheduleRequest {
    pub fn new(tasks: Vec<TaskDescriptor>) -> Self {
        Self { tasks, ..Default::default() }
    }

    pub fn work_style(&self) -> Option<&str> {
        self.preferences.get("workStyle").and_then(Value::as_str).filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSummary {
    pub total_tasks: usize,
    pub total_duration: u32,
    pub efficiency: f64,
    pub improvement_percentage: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleOutcome {
    pub schedule: Vec<ScheduledTask>,
    pub summary: ScheduleSummary,
    pub insights: Vec<String>,
    pub execution: ExecutionReport,
}

/// The model's schedule after reconciliation, one entry per input task.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSchedule {
    pub schedule: Vec<ScheduledTask>,
    pub insights: Vec<String>,
}

#[derive(Debug, Default)]
struct ModelEntry {
    id: Option<String>,
    title: Option<String>,
    scheduled_time: Option<DateTime<Utc>>,
    reason: Option<String>,
}

impl ModelEntry {
    fn parse(value: &Value, tuning: &Tuning) -> Self {
        let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
        let offset = local_offset(tuning);
        Self {
            id: text("id"),
            title: text("title"),
            scheduled_time: value
                .get("scheduledTime")
                .and_then(Value::as_str)
                .and_then(|s| parse_instant(s, offset)),
            reason: text("optimizationReason").filter(|r| !r.trim().is_empty()),
        }
    }
}

/// Maps `optimizedTasks` onto the input tasks by id, then title, then position.
///
/// The result always has exactly one entry per input task; tasks the model
/// dropped or mis-timed are stamped at the fallback hour.
pub fn reconcile_schedule(
    raw: &Map<String, Value>,
    request: &ScheduleRequest,
    tuning: &Tuning,
) -> Result<ModelSchedule, NormalizeError> {
    let entries: Vec<ModelEntry> = raw
        .get("optimizedTasks")
        .and_then(Value::as_array)
        .ok_or(NormalizeError::MissingArray { operation: "schedule optimization", field: "optimizedTasks" })?
        .iter()
        .map(|v| ModelEntry::parse(v, tuning))
        .collect();

    let score = model_score(raw.get("efficiencyScore"));
    let offset = local_offset(tuning);
    let mut used = vec![false; entries.len()];

    let schedule = request
        .tasks
        .iter()
        .enumerate()
        .map(|(index, task)| {
            let pick = entries
                .iter()
                .enumerate()
                .position(|(j, e)| !used[j] && e.id.as_deref() == Some(task.id.as_str()))
                .or_else(|| {
                    entries
                        .iter()
                        .enumerate()
                        .position(|(j, e)| !used[j] && e.title.as_deref() == Some(task.title.as_str()))
                })
                .or_else(|| (index < entries.len() && !used[index]).then_some(index));

            let entry = match pick {
                Some(j) => {
                    used[j] = true;
                    Some(&entries[j])
                }
                None => None,
            };

            let start = entry
                .and_then(|e| e.scheduled_time)
                .or(task.scheduled_time)
                .unwrap_or_else(|| at_hour(task_date(task, offset), tuning.fallback_hour, offset));

            let placed = ScheduledTask::place(task, start, score);
            match entry.and_then(|e| e.reason.clone()) {
                Some(reason) => placed.with_reason(reason),
                None => placed,
            }
        })
        .collect();

    let insights = raw
        .get("optimizationInsights")
        .and_then(Value::as_array)
        .map(|items| {
            items.iter().filter_map(Value::as_str).filter(|s| !s.trim().is_empty()).map(str::to_string).collect()
        })
        .unwrap_or_default();

    Ok(ModelSchedule { schedule, insights })
}

/// `efficiencyScore` as a 0–1 score; percentages are scaled down.
fn model_score(value: Option<&Value>) -> f64 {
    match value.and_then(Value::as_f64) {
        Some(s) if s > 0.0 && s <= 1.0 => s,
        Some(s) if s > 1.0 && s <= 100.0 => round_hundredths(s / 100.0),
        _ => DEFAULT_MODEL_SCORE,
    }
}

/// Builds the summary, notes and execution report for a finished schedule.
///
/// `ai_model` is `None` when the schedule came from the fallback engine.
pub fn summarize_schedule(
    schedule: Vec<ScheduledTask>,
    model_insights: Vec<String>,
    request: &ScheduleRequest,
    ai_model: Option<&str>,
    tuning: &Tuning,
) -> ScheduleOutcome {
    let total_duration = total_minutes(&schedule);
    let conflicts = count_conflicts(&schedule);
    let efficiency = calculate_efficiency(&schedule, tuning);

    let mut actions = vec![ExecutionAction::new(
        ActionKind::ScheduleUpdated,
        match ai_model {
            Some(_) => format!("AI分析により{}つのタスクのスケジュールを最適化しました", schedule.len()),
            None => format!("ルールベースで{}つのタスクのスケジュールを作成しました", schedule.len()),
        },
        json!({
            "updatedTasks": schedule.len(),
            "totalDuration": total_duration,
            "aiModel": ai_model,
        }),
    )];

    if conflicts > 0 {
        let (description, method) = match ai_model {
            Some(_) => (format!("AIがスケジュール競合を{conflicts}件自動解決しました"), "ai_optimization"),
            None => (format!("スケジュール競合を{conflicts}件検出しました"), "rule_based"),
        };
        actions.push(ExecutionAction::new(
            ActionKind::ConflictsResolved,
            description,
            json!({ "conflictsResolved": conflicts, "resolutionMethod": method }),
        ));
    }

    let optimizations = optimization_notes(&schedule, request, ai_model.is_some());

    let mut insights = model_insights;
    insights.extend(workload_insights(&schedule, request, tuning));

    ScheduleOutcome {
        summary: ScheduleSummary {
            total_tasks: schedule.len(),
            total_duration,
            efficiency,
            improvement_percentage: improvement_percentage(efficiency, tuning),
        },
        schedule,
        insights,
        execution: ExecutionReport::with_optimizations(actions, optimizations),
    }
}

fn optimization_notes(schedule: &[ScheduledTask], request: &ScheduleRequest, ai: bool) -> Vec<String> {
    let mut notes = Vec::new();
    if ai {
        if schedule.iter().any(|t| t.priority.is_high()) {
            notes.push("AIが高優先度タスクを最適な時間帯に配置しました".to_string());
        }
        if group_by_category(schedule).len() > 1 {
            notes.push("AIが類似タスクをまとめて効率性を向上させました".to_string());
        }
        if let Some(style) = request.work_style() {
            notes.push(format!("AIが{style}型の作業スタイルに合わせてスケジュールを調整しました"));
        }
    } else {
        notes.push("優先度と過去の生産性パターンに基づいて開始時刻を決定しました".to_string());
    }
    if !request.history.is_empty() {
        notes.push("過去のタスク履歴を分析して個人の生産性パターンを考慮しました".to_string());
    }
    notes
}

/// Warnings about the shape of the day's workload.
pub fn workload_insights(schedule: &[ScheduledTask], request: &ScheduleRequest, tuning: &Tuning) -> Vec<String> {
    let mut out = Vec::new();
    if schedule.iter().filter(|t| t.priority.is_high()).count() > 3 {
        out.push("高優先度タスクが多すぎます。優先度を見直すことをお勧めします".to_string());
    }
    if total_minutes(schedule) > tuning.workday_minutes {
        out.push("1日の作業量が多すぎます。タスクを分割することをお勧めします".to_string());
    }
    if request.work_style() == Some("morning") {
        out.push("朝型の方は、重要なタスクを午前中に配置することをお勧めします".to_string());
    }
    out
}

fn total_minutes(schedule: &[ScheduledTask]) -> u32 {
    schedule.iter().fold(0u32, |acc, t| acc.saturating_add(t.estimated_duration))
}

pub fn group_by_category(schedule: &[ScheduledTask]) -> BTreeMap<&str, Vec<&ScheduledTask>> {
    let mut groups: BTreeMap<&str, Vec<&ScheduledTask>> = BTreeMap::new();
    for task in schedule {
        groups.entry(task.category.as_str()).or_default().push(task);
    }
    groups
}

/// Pairs whose `[start, end)` intervals strictly overlap.
pub fn count_conflicts(schedule: &[ScheduledTask]) -> usize {
    let mut conflicts = 0;
    for (i, a) in schedule.iter().enumerate() {
        for b in &schedule[i + 1..] {
            if a.start_time < b.end_time && b.start_time < a.end_time {
                conflicts += 1;
            }
        }
    }
    conflicts
}

/// Workload fill plus a capped high-priority bonus, clamped to `[0, 1]`.
pub fn calculate_efficiency(schedule: &[ScheduledTask], tuning: &Tuning) -> f64 {
    if schedule.is_empty() {
        return 0.0;
    }
    let fill = (f64::from(total_minutes(schedule)) / f64::from(tuning.workday_minutes.max(1))).min(1.0);
    let high = schedule.iter().filter(|t| t.priority.is_high()).count() as f64;
    let bonus = (tuning.priority_bonus_step * high).min(tuning.priority_bonus_cap);
    round_hundredths((fill + bonus).clamp(0.0, 1.0))
}

/// Percentage above the baseline efficiency, never negative.
pub fn improvement_percentage(efficiency: f64, tuning: &Tuning) -> i64 {
    let baseline = tuning.baseline_efficiency;
    if baseline <= 0.0 {
        return 0;
    }
    (((efficiency - baseline) / baseline) * 100.0).round().max(0.0) as i64
}
