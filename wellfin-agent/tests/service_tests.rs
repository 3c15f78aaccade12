use std::sync::Arc;

use chrono::{FixedOffset, TimeZone, Timelike, Utc};
use serde_json::json;
use wellfin_agent::{
    AgentError, AnalysisRequest, GatewayError, PlanSource, PlanningService, RecommendationRequest,
    ScheduleRequest,
};
use wellfin_core::{ActionKind, Complexity, Priority, RecommendationType, TaskDescriptor, Tuning};
use wellfin_model::MockModel;

fn service(mock: MockModel) -> (PlanningService, Arc<MockModel>) {
    let mock = Arc::new(mock);
    (PlanningService::new(mock.clone()), mock)
}

fn task(id: &str, title: &str, priority: Priority) -> TaskDescriptor {
    TaskDescriptor {
        id: id.into(),
        title: title.into(),
        priority,
        estimated_duration: 60,
        category: None,
        scheduled_time: None,
        scheduled_date: None,
        description: None,
    }
}

#[tokio::test]
async fn analyze_monthly_report() {
    let (svc, mock) = service(MockModel::new("gemini-1.5-flash").with_text(
        json!({
            "title": "月次レポート作成",
            "description": "...",
            "priority": 3,
            "estimatedDuration": 150,
            "difficulty": 3
        })
        .to_string(),
    ));

    let out = svc.analyze_task(&AnalysisRequest::new("資料作成: 月次レポート")).await.unwrap();
    assert_eq!(out.analysis.priority, Priority::High);
    assert_eq!(out.analysis.complexity, Complexity::Medium);

    let subtasks = out.execution.actions.iter().find(|a| a.kind == ActionKind::SubtasksGenerated).unwrap();
    assert_eq!(subtasks.details["subtasks"].as_array().unwrap().len(), 3);
    assert_eq!(out.execution.actions[0].details["aiModel"], "gemini-1.5-flash");
    assert!(mock.prompts()[0].contains("\"資料作成: 月次レポート\""));
}

#[tokio::test]
async fn analyze_surfaces_provider_errors() {
    let (svc, _) = service(MockModel::new("m").with_error("quota exceeded"));
    let err = svc.analyze_task(&AnalysisRequest::new("x")).await.unwrap_err();
    assert!(matches!(err, AgentError::Gateway(GatewayError::ModelUnavailable(_))));

    let (svc, _) = service(MockModel::new("m").with_text("{\"title\": \"only title\"}"));
    let err = svc.analyze_task(&AnalysisRequest::new("x")).await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid task analysis result: missing required fields");
}

#[tokio::test]
async fn overlapping_tasks_report_one_conflict() {
    let (svc, _) = service(MockModel::new("m").with_text(
        json!({
            "optimizedTasks": [
                {"id": "t1", "scheduledTime": "2025-01-06T09:00:00Z"},
                {"id": "t2", "scheduledTime": "2025-01-06T09:00:00Z"}
            ],
            "efficiencyScore": 0.75
        })
        .to_string(),
    ));
    let request = ScheduleRequest::new(vec![task("t1", "A", Priority::High), task("t2", "B", Priority::Medium)]);

    let planned = svc.optimize_schedule(&request).await;
    assert!(planned.ai_powered());
    let outcome = planned.value;
    assert_eq!(outcome.schedule.len(), 2);
    let conflict = outcome.execution.actions.iter().find(|a| a.kind == ActionKind::ConflictsResolved).unwrap();
    assert_eq!(conflict.details["conflictsResolved"], 1);
    assert_eq!(outcome.summary.total_duration, 120);
    assert_eq!(outcome.summary.efficiency, 0.35);
}

#[tokio::test]
async fn schedule_falls_back_when_model_fails() {
    let (svc, _) = service(MockModel::new("m").with_safety_block());
    let mut t = task("t1", "A", Priority::Urgent);
    t.scheduled_date = chrono::NaiveDate::from_ymd_opt(2025, 3, 1);
    let request = ScheduleRequest::new(vec![t]);

    let planned = svc.optimize_schedule(&request).await;
    assert!(!planned.ai_powered());
    assert!(planned.fallback_reason().unwrap().contains("safety"));
    assert_eq!(planned.value.schedule[0].start_time, Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap());
    assert!(planned.value.execution.actions[0].description.starts_with("ルールベース"));
}

#[tokio::test]
async fn schedule_falls_back_on_missing_array() {
    let (svc, _) = service(MockModel::new("m").with_text("{\"schedule\": []}"));
    let planned = svc.optimize_schedule(&ScheduleRequest::new(vec![task("t1", "A", Priority::Low)])).await;
    assert!(matches!(planned.source, PlanSource::Fallback { ref reason } if reason.contains("optimizedTasks")));
    assert_eq!(planned.value.schedule.len(), 1);
}

#[tokio::test]
async fn undated_fallback_lands_today_at_nine_local() {
    let jst = FixedOffset::east_opt(9 * 3600).unwrap();
    let svc = PlanningService::new(Arc::new(MockModel::new("m").with_error("quota exceeded")))
        .with_tuning(Tuning::default().with_utc_offset_minutes(540));

    let before = Utc::now().with_timezone(&jst).date_naive();
    let planned = svc.optimize_schedule(&ScheduleRequest::new(vec![task("t1", "A", Priority::High)])).await;
    let after = Utc::now().with_timezone(&jst).date_naive();

    assert!(!planned.ai_powered());
    let start = planned.value.schedule[0].start_time.with_timezone(&jst);
    assert_eq!(start.hour(), 9);
    assert_eq!(start.minute(), 0);
    assert!(start.date_naive() == before || start.date_naive() == after);
}

#[tokio::test]
async fn recommendations_from_model() {
    let (svc, mock) = service(MockModel::new("m").with_text(
        json!({
            "recommendations": [
                {"type": "schedule", "title": "会議をまとめる", "priority": "high", "estimatedImpact": "high"}
            ],
            "personalizedTips": ["午後に休憩を"],
            "nextActions": ["カレンダーを整理する"]
        })
        .to_string(),
    ));
    let tuning = svc.tuning().clone();
    let request = RecommendationRequest::from_parts("api-user-dev-secr", None, None, &tuning);

    let planned = svc.generate_recommendations(&request).await;
    assert!(planned.ai_powered());
    let out = planned.value;
    assert_eq!(out.analytics.by_type.schedule, 1);
    assert_eq!(out.analytics.improvement_percentage, 100);
    assert_eq!(out.personalized_tips, vec!["午後に休憩を"]);
    assert!(out.execution.has_action(ActionKind::ScheduleAdjusted));
    assert!(mock.prompts()[0].contains("\"workStyle\": \"balanced\""));
}

#[tokio::test]
async fn recommendations_fall_back_on_prose() {
    let (svc, _) = service(MockModel::new("m").with_text("I cannot help with that."));
    let request = RecommendationRequest::from_parts("u", None, None, svc.tuning());

    let planned = svc.generate_recommendations(&request).await;
    assert!(!planned.ai_powered());
    let kinds: Vec<_> = planned.value.recommendations.iter().map(|r| r.kind).collect();
    assert_eq!(kinds, vec![RecommendationType::Productivity, RecommendationType::Habit]);
    assert!(planned.value.personalized_tips.is_empty());
    assert!(planned.value.execution.has_action(ActionKind::HabitsCreated));
}

#[tokio::test]
async fn connection_probe() {
    let (svc, _) = service(MockModel::new("m").with_text(
        "{\"status\": \"success\", \"message\": \"Vertex AI connection is working\"}",
    ));
    let report = svc.test_connection().await;
    assert!(report.success);
    assert_eq!(report.project.as_deref(), Some("test-project"));
    assert_eq!(report.result.unwrap()["status"], "success");

    let (svc, _) = service(MockModel::new("m").with_error("unauthenticated"));
    let report = svc.test_connection().await;
    assert!(!report.success);
    assert!(report.error.unwrap().contains("unauthenticated"));
}
