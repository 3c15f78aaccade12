use std::sync::Arc;
use std::time::Instant;

use axum::{Extension, Json, extract::State};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use wellfin_agent::{
    CompletedTask, PlanningService, ScheduleRequest, ScheduleSummary, local_offset, parse_date,
    parse_instant,
};
use wellfin_auth::ApiIdentity;
use wellfin_core::{ExecutionReport, PriorityInput, ScheduledTask, TaskDescriptor, generate_id};

use crate::rest::envelope::{ApiJson, Metadata, Stamp, timestamp};
use crate::rest::error::ApiError;

const TASKS_REQUIRED: &str = "tasks array is required";
const TITLE_AND_PRIORITY: &str = "Each task must have title and priority";
const DURATION_REQUIRED: &str = "Each task must have estimatedDuration (minutes) or estimatedHours";

#[derive(Clone)]
pub struct ScheduleController {
    planning: Arc<PlanningService>,
}

impl ScheduleController {
    pub fn new(planning: Arc<PlanningService>) -> Self {
        Self { planning }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeScheduleBody {
    pub tasks: Option<Value>,
    /// Older clients send `newTasks`.
    pub new_tasks: Option<Value>,
    pub existing_tasks: Option<Vec<Value>>,
    pub preferences: Option<Map<String, Value>>,
    pub history: Option<Vec<Value>>,
}

/// The task array, from whichever field carried it.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskList {
    Tasks(Vec<Value>),
    NewTasks(Vec<Value>),
}

impl TaskList {
    /// `tasks` wins when both are present; an empty array counts as missing.
    pub fn from_fields(tasks: Option<Value>, new_tasks: Option<Value>) -> Result<Self, ApiError> {
        let list = match (tasks, new_tasks) {
            (Some(Value::Array(items)), _) => TaskList::Tasks(items),
            (None | Some(Value::Null), Some(Value::Array(items))) => TaskList::NewTasks(items),
            _ => return Err(ApiError::missing_field(TASKS_REQUIRED)),
        };
        if list.items().is_empty() {
            return Err(ApiError::missing_field(TASKS_REQUIRED));
        }
        Ok(list)
    }

    pub fn items(&self) -> &[Value] {
        match self {
            TaskList::Tasks(items) | TaskList::NewTasks(items) => items,
        }
    }
}

/// One task as a client sends it.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    pub id: Option<Value>,
    pub title: Option<String>,
    pub priority: Option<Value>,
    /// Numbers or numeric strings.
    pub estimated_duration: Option<Value>,
    pub estimated_hours: Option<Value>,
    pub category: Option<String>,
    pub scheduled_time: Option<String>,
    pub scheduled_date: Option<String>,
    pub description: Option<String>,
}

impl TaskInput {
    pub fn into_descriptor(self, offset: FixedOffset) -> Result<TaskDescriptor, ApiError> {
        let title = self.title.filter(|t| !t.trim().is_empty());
        let priority = self
            .priority
            .and_then(|p| serde_json::from_value::<PriorityInput>(p).ok())
            .filter(|p| !p.is_blank());
        let (Some(title), Some(priority)) = (title, priority) else {
            return Err(ApiError::invalid_task(TITLE_AND_PRIORITY));
        };

        let minutes = match (
            self.estimated_duration.as_ref().and_then(positive_number),
            self.estimated_hours.as_ref().and_then(positive_number),
        ) {
            (Some(minutes), _) => minutes.round(),
            (_, Some(hours)) => (hours * 60.0).round(),
            _ => return Err(ApiError::invalid_task(DURATION_REQUIRED)),
        };

        let id = match self.id {
            Some(Value::String(id)) if !id.is_empty() => id,
            Some(Value::Number(n)) => n.to_string(),
            _ => generate_id("task"),
        };

        Ok(TaskDescriptor {
            id,
            title,
            priority: priority.resolve(),
            estimated_duration: minutes.clamp(1.0, f64::from(u32::MAX)) as u32,
            category: self.category.filter(|c| !c.is_empty()),
            scheduled_time: self.scheduled_time.as_deref().and_then(|s| parse_instant(s, offset)),
            scheduled_date: self.scheduled_date.as_deref().and_then(|s| parse_date(s, offset)),
            description: self.description,
        })
    }
}

fn positive_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    (number.is_finite() && number > 0.0).then_some(number)
}

impl OptimizeScheduleBody {
    fn into_request(self, offset: FixedOffset) -> Result<ScheduleRequest, ApiError> {
        let list = TaskList::from_fields(self.tasks, self.new_tasks)?;
        if matches!(list, TaskList::NewTasks(_)) {
            tracing::debug!("tasks supplied through legacy newTasks field");
        }

        let tasks = list
            .items()
            .iter()
            .map(|item| {
                let input: TaskInput = serde_json::from_value(item.clone())
                    .map_err(|_| ApiError::invalid_task(TITLE_AND_PRIORITY))?;
                input.into_descriptor(offset)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let history = self
            .history
            .unwrap_or_default()
            .into_iter()
            .filter_map(|entry| serde_json::from_value::<CompletedTask>(entry).ok())
            .collect();

        Ok(ScheduleRequest {
            tasks,
            existing_tasks: self.existing_tasks.unwrap_or_default(),
            preferences: self.preferences.unwrap_or_default(),
            history,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeScheduleResponse {
    pub success: bool,
    pub optimized_schedule: Vec<ScheduledTask>,
    pub execution: ExecutionReport,
    pub summary: ScheduleSummary,
    pub insights: Vec<String>,
    pub metadata: Metadata,
    pub timestamp: String,
}

pub async fn optimize_schedule(
    State(controller): State<ScheduleController>,
    Extension(identity): Extension<ApiIdentity>,
    ApiJson(body): ApiJson<OptimizeScheduleBody>,
) -> Result<Json<OptimizeScheduleResponse>, ApiError> {
    let started = Instant::now();
    let offset = local_offset(controller.planning.tuning());
    let request = body.into_request(offset)?;
    tracing::info!(user_id = %identity.user_id, tasks = request.tasks.len(), "schedule optimization requested");

    let planned = controller.planning.optimize_schedule(&request).await;
    let metadata = Metadata::new(Stamp::OptimizedAt, controller.planning.model_name(), started)
        .with_fallback(planned.fallback_reason());
    let outcome = planned.value;

    tracing::info!(
        user_id = %identity.user_id,
        ai_powered = metadata.ai_powered,
        efficiency = outcome.summary.efficiency,
        "schedule optimization completed"
    );

    Ok(Json(OptimizeScheduleResponse {
        success: true,
        optimized_schedule: outcome.schedule,
        execution: outcome.execution,
        summary: outcome.summary,
        insights: outcome.insights,
        metadata,
        timestamp: timestamp(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Offset, Utc};
    use serde_json::json;
    use wellfin_core::Priority;

    fn utc() -> FixedOffset {
        Utc.fix()
    }

    fn input(value: Value) -> TaskInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_task_list_prefers_tasks() {
        let list = TaskList::from_fields(Some(json!([{"a": 1}])), Some(json!([{"b": 2}, {"c": 3}]))).unwrap();
        assert!(matches!(list, TaskList::Tasks(ref items) if items.len() == 1));

        let legacy = TaskList::from_fields(None, Some(json!([{"b": 2}]))).unwrap();
        assert!(matches!(legacy, TaskList::NewTasks(_)));
    }

    #[test]
    fn test_task_list_rejects_missing_or_empty() {
        for (tasks, new_tasks) in [
            (None, None),
            (Some(json!([])), None),
            (Some(json!("nope")), None),
            (Some(json!({"title": "x"})), None),
        ] {
            let err = TaskList::from_fields(tasks, new_tasks).unwrap_err();
            assert_eq!(err.to_string(), TASKS_REQUIRED);
        }
    }

    #[test]
    fn test_hours_convert_to_minutes() {
        let task = input(json!({"title": "t", "priority": "high", "estimatedHours": 1.5}))
            .into_descriptor(utc())
            .unwrap();
        assert_eq!(task.estimated_duration, 90);
        assert_eq!(task.priority, Priority::High);
        assert!(task.id.starts_with("task_"));
    }

    #[test]
    fn test_duration_wins_over_hours() {
        let task = input(json!({"id": 7, "title": "t", "priority": 4, "estimatedDuration": 45, "estimatedHours": 3}))
            .into_descriptor(utc())
            .unwrap();
        assert_eq!(task.estimated_duration, 45);
        assert_eq!(task.id, "7");
    }

    #[test]
    fn test_invalid_tasks() {
        let err = input(json!({"title": "t", "estimatedDuration": 30})).into_descriptor(utc()).unwrap_err();
        assert_eq!(err.to_string(), TITLE_AND_PRIORITY);

        let err = input(json!({"title": "t", "priority": "low", "estimatedDuration": 0}))
            .into_descriptor(utc())
            .unwrap_err();
        assert_eq!(err.to_string(), DURATION_REQUIRED);
    }

    #[test]
    fn test_bad_dates_are_dropped() {
        let task = input(json!({
            "title": "t", "priority": "low", "estimatedDuration": 30,
            "scheduledTime": "not a time", "scheduledDate": "2024-01-15"
        }))
        .into_descriptor(utc())
        .unwrap();
        assert!(task.scheduled_time.is_none());
        assert_eq!(task.scheduled_date.map(|d| d.to_string()).as_deref(), Some("2024-01-15"));
    }

    #[test]
    fn test_numeric_string_durations() {
        let task = input(json!({"title": "t", "priority": "low", "estimatedDuration": "60"}))
            .into_descriptor(utc())
            .unwrap();
        assert_eq!(task.estimated_duration, 60);

        let task = input(json!({"title": "t", "priority": "low", "estimatedHours": " 0.5 "}))
            .into_descriptor(utc())
            .unwrap();
        assert_eq!(task.estimated_duration, 30);
    }

    #[test]
    fn test_bad_duration_reports_duration() {
        let body: OptimizeScheduleBody = serde_json::from_value(json!({
            "tasks": [{"title": "t", "priority": "high", "estimatedDuration": "an hour"}]
        }))
        .unwrap();
        let err = body.into_request(utc()).unwrap_err();
        assert_eq!(err.to_string(), DURATION_REQUIRED);
    }
}
