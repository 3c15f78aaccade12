//! Personalised recommendations: item normalization, analytics and notes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use wellfin_core::{
    ActionKind, ExecutionAction, ExecutionReport, GENERAL_CATEGORY, Level, RecommendationItem,
    RecommendationType, Tuning, generate_id,
};

use crate::error::NormalizeError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub preferences: Map<String, Value>,
    #[serde(default)]
    pub goals: Vec<Value>,
    #[serde(default)]
    pub habits: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    /// Profile assumed when the caller sends only a context.
    pub fn default_for(tuning: &Tuning) -> Self {
        let mut preferences = Map::new();
        preferences.insert("workStyle".to_string(), Value::String(tuning.default_work_style.clone()));
        Self { preferences, ..Default::default() }
    }

    pub fn work_style(&self) -> Option<&str> {
        self.preferences.get("workStyle").and_then(Value::as_str).filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContext {
    #[serde(default)]
    pub recent_tasks: Vec<Value>,
    /// Share of recent tasks completed, `0.0..=1.0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_rate: Option<f64>,
    #[serde(default)]
    pub active_goals: Vec<Value>,
    #[serde(default)]
    pub current_habits: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserContext {
    /// Context assumed when the caller sends only a profile.
    pub fn default_for(tuning: &Tuning) -> Self {
        Self { completion_rate: Some(tuning.default_completion_rate), ..Default::default() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    pub user_id: String,
    pub profile: UserProfile,
    pub context: UserContext,
}

impl RecommendationRequest {
    /// Fills whichever half is missing with its defaults.
    pub fn from_parts(
        user_id: impl Into<String>,
        profile: Option<UserProfile>,
        context: Option<UserContext>,
        tuning: &Tuning,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            profile: profile.unwrap_or_else(|| UserProfile::default_for(tuning)),
            context: context.unwrap_or_else(|| UserContext::default_for(tuning)),
        }
    }
}

/// Recommendations as returned by the model, after normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelRecommendations {
    pub items: Vec<RecommendationItem>,
    pub personalized_tips: Vec<String>,
    pub next_actions: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeBreakdown {
    pub productivity: usize,
    pub habit: usize,
    pub schedule: usize,
    pub goal: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelBreakdown {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationAnalytics {
    pub total_recommendations: usize,
    pub by_type: TypeBreakdown,
    pub by_priority: LevelBreakdown,
    pub improvement_percentage: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationOutcome {
    pub recommendations: Vec<RecommendationItem>,
    pub analytics: RecommendationAnalytics,
    pub personalized_tips: Vec<String>,
    pub next_actions: Vec<String>,
    pub execution: ExecutionReport,
}

pub fn normalize_recommendations(
    raw: &Map<String, Value>,
    tuning: &Tuning,
) -> Result<ModelRecommendations, NormalizeError> {
    let items = raw
        .get("recommendations")
        .and_then(Value::as_array)
        .ok_or(NormalizeError::MissingArray { operation: "recommendations", field: "recommendations" })?
        .iter()
        .filter_map(|v| normalize_item(v, tuning))
        .collect();

    Ok(ModelRecommendations {
        items,
        personalized_tips: string_list(raw.get("personalizedTips")),
        next_actions: string_list(raw.get("nextActions")),
    })
}

fn normalize_item(value: &Value, tuning: &Tuning) -> Option<RecommendationItem> {
    let obj = value.as_object()?;
    let text = |key: &str| obj.get(key).and_then(Value::as_str).map(str::trim).filter(|s| !s.is_empty());
    let title = text("title")?.to_string();

    Some(RecommendationItem {
        id: text("id").map(str::to_string).unwrap_or_else(|| generate_id("rec")),
        kind: text("type").map(RecommendationType::from_label).unwrap_or_default(),
        title,
        description: text("description").unwrap_or_default().to_string(),
        priority: text("priority").and_then(Level::from_label).unwrap_or_default(),
        category: text("category").unwrap_or(GENERAL_CATEGORY).to_string(),
        actionable: !matches!(obj.get("actionable"), Some(Value::Bool(false))),
        estimated_impact: text("estimatedImpact").and_then(Level::from_label).unwrap_or_default(),
        implementation_steps: string_list(obj.get("implementationSteps")),
        timeframe: text("timeframe").unwrap_or(tuning.default_timeframe.as_str()).to_string(),
    })
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items.iter().filter_map(Value::as_str).filter(|s| !s.trim().is_empty()).map(str::to_string).collect()
        })
        .unwrap_or_default()
}

pub fn analytics(items: &[RecommendationItem], tuning: &Tuning) -> RecommendationAnalytics {
    let mut by_type = TypeBreakdown::default();
    let mut by_priority = LevelBreakdown::default();
    for item in items {
        match item.kind {
            RecommendationType::Productivity => by_type.productivity += 1,
            RecommendationType::Habit => by_type.habit += 1,
            RecommendationType::Schedule => by_type.schedule += 1,
            RecommendationType::Goal => by_type.goal += 1,
        }
        match item.priority {
            Level::High => by_priority.high += 1,
            Level::Medium => by_priority.medium += 1,
            Level::Low => by_priority.low += 1,
        }
    }

    let share = if items.is_empty() {
        0
    } else {
        (100.0 * by_priority.high as f64 / items.len() as f64).round() as i64
    };

    RecommendationAnalytics {
        total_recommendations: items.len(),
        by_type,
        by_priority,
        improvement_percentage: share.max(tuning.min_recommendation_improvement),
    }
}

/// Builds analytics, insights and the execution report.
///
/// `ai_model` is `None` when the items came from the fallback engine.
pub fn summarize_recommendations(
    model: ModelRecommendations,
    request: &RecommendationRequest,
    ai_model: Option<&str>,
    tuning: &Tuning,
) -> RecommendationOutcome {
    let items = model.items;
    let of_kind = |kind: RecommendationType| items.iter().filter(move |r| r.kind == kind);

    let mut actions = Vec::new();

    let habits: Vec<_> = of_kind(RecommendationType::Habit).collect();
    if !habits.is_empty() {
        actions.push(ExecutionAction::new(
            ActionKind::HabitsCreated,
            format!("AIが{}つの新しい習慣を提案しました", habits.len()),
            json!({
                "habitsProposed": habits.len(),
                "categories": unique(habits.iter().map(|r| r.category.as_str())),
                "aiModel": ai_model,
            }),
        ));
    }

    let adjustments = of_kind(RecommendationType::Schedule).count();
    if adjustments > 0 {
        actions.push(ExecutionAction::new(
            ActionKind::ScheduleAdjusted,
            format!("AIが{adjustments}つのスケジュール改善案を生成しました"),
            json!({
                "adjustmentsProposed": adjustments,
                "focus": "productivity_optimization",
                "aiModel": ai_model,
            }),
        ));
    }

    let goals: Vec<_> = of_kind(RecommendationType::Goal).collect();
    if !goals.is_empty() {
        actions.push(ExecutionAction::new(
            ActionKind::GoalsSuggested,
            format!("AIが{}つの新しい目標を提案しました", goals.len()),
            json!({
                "goalsProposed": goals.len(),
                "timeframes": unique(goals.iter().map(|r| r.timeframe.as_str()).filter(|t| !t.is_empty())),
                "aiModel": ai_model,
            }),
        ));
    }

    let insights = insights(&items, request, tuning);

    RecommendationOutcome {
        analytics: analytics(&items, tuning),
        recommendations: items,
        personalized_tips: model.personalized_tips,
        next_actions: model.next_actions,
        execution: ExecutionReport::with_insights(actions, insights),
    }
}

fn insights(items: &[RecommendationItem], request: &RecommendationRequest, tuning: &Tuning) -> Vec<String> {
    let mut out = Vec::new();
    match request.context.completion_rate {
        Some(rate) if rate > tuning.high_completion_rate => {
            out.push("AIが高いタスク完了率を検出し、更なる効率化の機会を特定しました".to_string());
        }
        Some(rate) if rate < tuning.low_completion_rate => {
            out.push("AIがタスク完了率の改善余地を特定し、支援策を提案しました".to_string());
        }
        _ => {}
    }

    let style = request.profile.work_style().unwrap_or(&tuning.default_work_style);
    out.push(format!("AIが{style}型の作業スタイルに合わせた推奨事項を生成しました"));

    if request.context.recent_tasks.len() > tuning.history_sample_size {
        out.push("豊富なタスク履歴を分析してパーソナライズされた推奨事項を作成しました".to_string());
    }

    let high_impact = items.iter().filter(|r| r.estimated_impact == Level::High).count();
    if high_impact > 0 {
        out.push(format!("AIが{high_impact}つの高効果推奨事項を特定しました"));
    }
    out
}

fn unique<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values {
        if !out.iter().any(|v| v == value) {
            out.push(value.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn normalizes_items_leniently() {
        let tuning = Tuning::default();
        let model = normalize_recommendations(
            &raw(json!({
                "recommendations": [
                    {"type": "habit", "title": "朝の散歩", "priority": "HIGH", "estimatedImpact": "high",
                     "implementationSteps": ["7時に起きる", 3], "category": "health"},
                    {"type": "goal_setting", "title": "月間目標", "actionable": false, "timeframe": "1ヶ月"},
                    {"description": "no title"},
                    "junk"
                ],
                "personalizedTips": ["水を飲む"],
                "nextActions": ["今日の予定を確認する"]
            })),
            &tuning,
        )
        .unwrap();

        assert_eq!(model.items.len(), 2);
        let habit = &model.items[0];
        assert_eq!(habit.kind, RecommendationType::Habit);
        assert_eq!(habit.priority, Level::High);
        assert_eq!(habit.implementation_steps, vec!["7時に起きる"]);
        assert!(habit.actionable);
        assert!(habit.id.starts_with("rec_"));

        let goal = &model.items[1];
        assert_eq!(goal.kind, RecommendationType::Goal);
        assert_eq!(goal.priority, Level::Medium);
        assert_eq!(goal.category, "general");
        assert!(!goal.actionable);
        assert_eq!(model.personalized_tips, vec!["水を飲む"]);
    }

    #[test]
    fn missing_array_is_an_error() {
        let err = normalize_recommendations(&raw(json!({"items": []})), &Tuning::default()).unwrap_err();
        assert_eq!(err.to_string(), "Invalid recommendations result: missing recommendations array");
    }

    #[test]
    fn analytics_floor_and_share() {
        let tuning = Tuning::default();
        assert_eq!(analytics(&[], &tuning).improvement_percentage, 15);

        let model = normalize_recommendations(
            &raw(json!({"recommendations": [
                {"type": "schedule", "title": "a", "priority": "high"},
                {"type": "schedule", "title": "b", "priority": "low"},
                {"type": "productivity", "title": "c", "priority": "high"}
            ]})),
            &tuning,
        )
        .unwrap();
        let a = analytics(&model.items, &tuning);
        assert_eq!(a.total_recommendations, 3);
        assert_eq!(a.by_type.schedule, 2);
        assert_eq!(a.by_priority, LevelBreakdown { high: 2, medium: 0, low: 1 });
        assert_eq!(a.improvement_percentage, 67);
    }

    #[test]
    fn summary_actions_and_insights() {
        let tuning = Tuning::default();
        let context = UserContext {
            completion_rate: Some(0.5),
            recent_tasks: vec![json!({}); 6],
            ..Default::default()
        };
        let request = RecommendationRequest::from_parts("u1", None, Some(context), &tuning);
        let model = normalize_recommendations(
            &raw(json!({"recommendations": [
                {"type": "habit", "title": "h1", "category": "health", "estimatedImpact": "high"},
                {"type": "habit", "title": "h2", "category": "health"},
                {"type": "goal", "title": "g", "timeframe": "3ヶ月"}
            ]})),
            &tuning,
        )
        .unwrap();

        let out = summarize_recommendations(model, &request, Some("gemini"), &tuning);
        let habits = &out.execution.actions[0];
        assert_eq!(habits.kind, ActionKind::HabitsCreated);
        assert_eq!(habits.details["categories"], json!(["health"]));
        assert_eq!(out.execution.actions[1].details["timeframes"], json!(["3ヶ月"]));
        assert!(!out.execution.has_action(ActionKind::ScheduleAdjusted));

        assert_eq!(
            out.execution.insights.unwrap(),
            vec![
                "AIがタスク完了率の改善余地を特定し、支援策を提案しました",
                "AIがbalanced型の作業スタイルに合わせた推奨事項を生成しました",
                "豊富なタスク履歴を分析してパーソナライズされた推奨事項を作成しました",
                "AIが1つの高効果推奨事項を特定しました",
            ]
        );
    }

    #[test]
    fn defaults_fill_missing_half() {
        let tuning = Tuning::default();
        let request = RecommendationRequest::from_parts("u", Some(UserProfile::default()), None, &tuning);
        assert_eq!(request.context.completion_rate, Some(0.8));
        assert!(request.profile.work_style().is_none());
    }
}
