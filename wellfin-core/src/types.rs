//! Domain types shared by the planning pipeline.
//!
//! - [`Priority`] / [`Complexity`] - closed label sets the API always returns
//! - [`TaskDescriptor`] / [`ScheduledTask`] - tasks before and after scheduling
//! - [`RecommendationItem`] - one personalised recommendation
//! - [`ExecutionReport`] - presentational summary of what a request did

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Task priority. Numeric inputs on the 1–5 scale are bucketed into labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Priority::Low, Priority::Medium, Priority::High, Priority::Urgent];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    /// Buckets a 1–5 level: `≤1 low, ≤2 medium, ≤4 high`, anything above is urgent.
    pub fn from_level(level: f64) -> Self {
        if !level.is_finite() {
            return Priority::Medium;
        }
        if level <= 1.0 {
            Priority::Low
        } else if level <= 2.0 {
            Priority::Medium
        } else if level <= 4.0 {
            Priority::High
        } else {
            Priority::Urgent
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            "urgent" => Some(Priority::Urgent),
            _ => None,
        }
    }

    /// Maps whatever the model produced; unrecognised shapes fall back to medium.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Number(n) => n.as_f64().map(Priority::from_level).unwrap_or_default(),
            Value::String(s) => Priority::from_label(s).unwrap_or_default(),
            _ => Priority::Medium,
        }
    }

    /// Weight on the 1–5 scale used by the fallback hour search.
    pub fn weight(self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 3,
            Priority::High => 4,
            Priority::Urgent => 5,
        }
    }

    pub fn is_high(self) -> bool {
        matches!(self, Priority::High | Priority::Urgent)
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority as supplied by a client: either a label or a 1–5 number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriorityInput {
    Level(f64),
    Label(String),
}

impl PriorityInput {
    pub fn resolve(&self) -> Priority {
        match self {
            PriorityInput::Level(level) => Priority::from_level(*level),
            PriorityInput::Label(label) => Priority::from_label(label).unwrap_or_default(),
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, PriorityInput::Label(label) if label.trim().is_empty())
    }
}

impl From<Priority> for PriorityInput {
    fn from(priority: Priority) -> Self {
        PriorityInput::Label(priority.as_str().to_string())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Complexity {
    /// `≤2 easy, ≤4 medium`, above that hard. Non-numbers are medium.
    pub fn from_difficulty(value: &Value) -> Self {
        match value.as_f64() {
            Some(d) if d.is_finite() && d <= 2.0 => Complexity::Easy,
            Some(d) if d.is_finite() && d <= 4.0 => Complexity::Medium,
            Some(d) if d.is_finite() => Complexity::Hard,
            _ => Complexity::Medium,
        }
    }
}

/// A task after request validation: every field the scheduler needs is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDescriptor {
    pub id: String,
    pub title: String,
    pub priority: Priority,
    /// Minutes, always positive.
    pub estimated_duration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TaskDescriptor {
    pub fn category_or_general(&self) -> &str {
        self.category.as_deref().filter(|c| !c.is_empty()).unwrap_or(GENERAL_CATEGORY)
    }
}

pub const GENERAL_CATEGORY: &str = "general";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Scheduled,
}

/// One entry of an optimized schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledTask {
    pub id: String,
    pub title: String,
    pub priority: Priority,
    pub category: String,
    pub estimated_duration: u32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: TaskStatus,
    pub optimization_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimization_reason: Option<String>,
}

impl ScheduledTask {
    /// Builds an entry whose end time is derived from the task's duration.
    pub fn place(task: &TaskDescriptor, start_time: DateTime<Utc>, score: f64) -> Self {
        let end_time = start_time + chrono::Duration::minutes(i64::from(task.estimated_duration));
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            priority: task.priority,
            category: task.category_or_general().to_string(),
            estimated_duration: task.estimated_duration,
            start_time,
            end_time,
            status: TaskStatus::Scheduled,
            optimization_score: score,
            optimization_reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.optimization_reason = Some(reason.into());
        self
    }
}

/// Three-step scale used for recommendation priority and impact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    #[default]
    Medium,
    High,
}

impl Level {
    /// Lenient parse; `urgent` is folded into high.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "low" => Some(Level::Low),
            "medium" => Some(Level::Medium),
            "high" | "urgent" => Some(Level::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationType {
    #[default]
    Productivity,
    Habit,
    Schedule,
    Goal,
}

impl RecommendationType {
    pub const ALL: [RecommendationType; 4] = [
        RecommendationType::Productivity,
        RecommendationType::Habit,
        RecommendationType::Schedule,
        RecommendationType::Goal,
    ];

    /// Accepts decorated labels such as `habit_suggestion`.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        if label.starts_with("habit") {
            RecommendationType::Habit
        } else if label.starts_with("schedule") {
            RecommendationType::Schedule
        } else if label.starts_with("goal") {
            RecommendationType::Goal
        } else {
            RecommendationType::Productivity
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: RecommendationType,
    pub title: String,
    pub description: String,
    pub priority: Level,
    pub category: String,
    pub actionable: bool,
    pub estimated_impact: Level,
    pub implementation_steps: Vec<String>,
    pub timeframe: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    #[default]
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    TaskCreated,
    SubtasksGenerated,
    ScheduleUpdated,
    ConflictsResolved,
    HabitsCreated,
    ScheduleAdjusted,
    GoalsSuggested,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionAction {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    pub description: String,
    pub details: Value,
}

impl ExecutionAction {
    pub fn new(kind: ActionKind, description: impl Into<String>, details: Value) -> Self {
        Self { kind, description: description.into(), details }
    }
}

/// Side-channel summary of a request. Exactly one of the note lists is set,
/// depending on the operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub status: ExecutionStatus,
    pub actions: Vec<ExecutionAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimizations: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights: Option<Vec<String>>,
}

impl ExecutionReport {
    pub fn with_recommendations(actions: Vec<ExecutionAction>, notes: Vec<String>) -> Self {
        Self { actions, recommendations: Some(notes), ..Default::default() }
    }

    pub fn with_optimizations(actions: Vec<ExecutionAction>, notes: Vec<String>) -> Self {
        Self { actions, optimizations: Some(notes), ..Default::default() }
    }

    pub fn with_insights(actions: Vec<ExecutionAction>, notes: Vec<String>) -> Self {
        Self { actions, insights: Some(notes), ..Default::default() }
    }

    pub fn has_action(&self, kind: ActionKind) -> bool {
        self.actions.iter().any(|a| a.kind == kind)
    }
}

/// Rounds to two decimals, the precision used for scores and timings.
pub fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn priority_buckets_numeric_levels() {
        assert_eq!(Priority::from_level(0.0), Priority::Low);
        assert_eq!(Priority::from_level(1.0), Priority::Low);
        assert_eq!(Priority::from_level(1.5), Priority::Medium);
        assert_eq!(Priority::from_level(2.0), Priority::Medium);
        assert_eq!(Priority::from_level(3.0), Priority::High);
        assert_eq!(Priority::from_level(4.0), Priority::High);
        assert_eq!(Priority::from_level(5.0), Priority::Urgent);
        assert_eq!(Priority::from_level(f64::NAN), Priority::Medium);
    }

    #[test]
    fn priority_from_value_falls_back_to_medium() {
        assert_eq!(Priority::from_value(&json!("HIGH")), Priority::High);
        assert_eq!(Priority::from_value(&json!("critical")), Priority::Medium);
        assert_eq!(Priority::from_value(&json!(null)), Priority::Medium);
        assert_eq!(Priority::from_value(&json!([1])), Priority::Medium);
        assert_eq!(Priority::from_value(&json!(5)), Priority::Urgent);
    }

    #[test]
    fn priority_input_deserializes_numbers_and_labels() {
        let level: PriorityInput = serde_json::from_value(json!(4)).unwrap();
        assert_eq!(level.resolve(), Priority::High);
        let label: PriorityInput = serde_json::from_value(json!("urgent")).unwrap();
        assert_eq!(label.resolve(), Priority::Urgent);
        assert!(PriorityInput::Label("  ".into()).is_blank());
    }

    #[test]
    fn complexity_from_difficulty() {
        assert_eq!(Complexity::from_difficulty(&json!(1)), Complexity::Easy);
        assert_eq!(Complexity::from_difficulty(&json!(3)), Complexity::Medium);
        assert_eq!(Complexity::from_difficulty(&json!(5)), Complexity::Hard);
        assert_eq!(Complexity::from_difficulty(&json!("hard")), Complexity::Medium);
    }

    #[test]
    fn recommendation_type_is_lenient() {
        assert_eq!(RecommendationType::from_label("habit_suggestion"), RecommendationType::Habit);
        assert_eq!(RecommendationType::from_label("Goal"), RecommendationType::Goal);
        assert_eq!(RecommendationType::from_label("productivity_tip"), RecommendationType::Productivity);
        assert_eq!(RecommendationType::from_label("other"), RecommendationType::Productivity);
    }

    #[test]
    fn scheduled_task_end_follows_duration() {
        let task = TaskDescriptor {
            id: "t1".into(),
            title: "Write report".into(),
            priority: Priority::High,
            estimated_duration: 90,
            category: None,
            scheduled_time: None,
            scheduled_date: None,
            description: None,
        };
        let start = Utc.with_ymd_and_hms(2025, 1, 6, 9, 0, 0).unwrap();
        let placed = ScheduledTask::place(&task, start, 0.8);
        assert_eq!(placed.end_time, Utc.with_ymd_and_hms(2025, 1, 6, 10, 30, 0).unwrap());
        assert_eq!(placed.category, GENERAL_CATEGORY);

        let value = serde_json::to_value(&placed).unwrap();
        assert_eq!(value["status"], "scheduled");
        assert_eq!(value["priority"], "high");
        assert!(value.get("optimizationReason").is_none());
    }

    #[test]
    fn execution_report_serializes_only_its_note_list() {
        let report = ExecutionReport::with_insights(
            vec![ExecutionAction::new(ActionKind::HabitsCreated, "x", json!({}))],
            vec!["note".into()],
        );
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["status"], "completed");
        assert_eq!(value["actions"][0]["type"], "habits_created");
        assert_eq!(value["insights"][0], "note");
        assert!(value.get("optimizations").is_none());
        assert!(report.has_action(ActionKind::HabitsCreated));
    }

    #[test]
    fn rounds_to_hundredths() {
        assert_eq!(round_hundredths(0.756), 0.76);
        assert_eq!(round_hundredths(1.0), 1.0);
    }
}
