//! Task analysis: turns the model's JSON into a [`TaskAnalysis`] and an
//! execution report.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use wellfin_core::{
    ActionKind, Complexity, ExecutionAction, ExecutionReport, GENERAL_CATEGORY, Priority,
    PriorityInput, Tuning, generate_id,
};

use crate::error::NormalizeError;

/// Free-text task entry from a user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub user_input: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<String>,
    /// Overrides whatever priority the model suggests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<PriorityInput>,
}

impl AnalysisRequest {
    pub fn new(user_input: impl Into<String>) -> Self {
        Self { user_input: user_input.into(), ..Default::default() }
    }

    fn priority_override(&self) -> Option<Priority> {
        self.priority.as_ref().filter(|p| !p.is_blank()).map(PriorityInput::resolve)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAnalysis {
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: Priority,
    pub estimated_duration: u32,
    pub complexity: Complexity,
    pub tags: Vec<String>,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub task_id: String,
    pub analysis: TaskAnalysis,
    pub execution: ExecutionReport,
}

pub fn normalize_analysis(
    raw: &Map<String, Value>,
    request: &AnalysisRequest,
    model_name: &str,
    tuning: &Tuning,
) -> Result<AnalysisOutcome, NormalizeError> {
    let title_value = raw.get("title").filter(|v| is_truthy(v));
    let description_value = raw.get("description").filter(|v| is_truthy(v));
    let (Some(title_value), Some(description_value)) = (title_value, description_value) else {
        return Err(NormalizeError::IncompleteAnalysis);
    };

    let title = match title_value {
        Value::String(s) => s.trim().to_string(),
        _ => extract_title(&request.user_input, tuning.title_preview_chars),
    };
    let description = match description_value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let category = raw
        .get("category")
        .and_then(Value::as_str)
        .filter(|c| !c.trim().is_empty())
        .unwrap_or(GENERAL_CATEGORY)
        .to_string();

    let raw_priority = raw.get("priority").unwrap_or(&Value::Null);
    let model_priority = Priority::from_value(raw_priority);
    let priority = request.priority_override().unwrap_or(model_priority);

    let estimated_duration = raw
        .get("estimatedDuration")
        .and_then(Value::as_f64)
        .filter(|d| d.is_finite() && *d >= 1.0)
        .map(|d| d.round().min(f64::from(u32::MAX)) as u32)
        .unwrap_or(tuning.default_task_minutes);

    let complexity = Complexity::from_difficulty(raw.get("difficulty").unwrap_or(&Value::Null));

    let tags = model_tags(raw.get("tags")).unwrap_or_else(|| generate_tags(&request.user_input));

    let skippable = matches!(raw.get("isSkippable"), Some(Value::Bool(true)));
    let suggestions = suggestions(estimated_duration, raw_priority, skippable, tuning);

    let task_id = generate_id("task");
    let mut actions = vec![ExecutionAction::new(
        ActionKind::TaskCreated,
        "AIが分析したタスクを作成しました",
        json!({
            "taskId": task_id,
            "title": title,
            "priority": priority,
            "category": category,
            "aiModel": model_name,
        }),
    )];

    if estimated_duration > tuning.subtask_threshold_minutes {
        let subtasks = generate_subtasks(&title);
        actions.push(ExecutionAction::new(
            ActionKind::SubtasksGenerated,
            format!("複雑なタスクのため、{}つのサブタスクを生成しました", subtasks.len()),
            json!({ "count": subtasks.len(), "subtasks": subtasks }),
        ));
    }

    let mut notes = Vec::new();
    if model_priority.is_high() {
        notes.push("高優先度タスクのため、明日の朝一番に取り組むことをお勧めします".to_string());
    }
    if estimated_duration > tuning.focus_block_threshold_minutes {
        notes.push("集中できる2時間のブロックを確保してください".to_string());
    } else {
        notes.push("短時間で完了できるため、隙間時間を活用できます".to_string());
    }

    Ok(AnalysisOutcome {
        task_id,
        analysis: TaskAnalysis {
            title,
            description,
            category,
            priority,
            estimated_duration,
            complexity,
            tags,
            suggestions,
        },
        execution: ExecutionReport::with_recommendations(actions, notes),
    })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.trim().is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Title derived from raw input: the text before the first colon, or a
/// preview of the whole input.
pub fn extract_title(input: &str, preview_chars: usize) -> String {
    let head = input
        .char_indices()
        .find(|(_, c)| *c == ':' || *c == '：')
        .filter(|(index, _)| *index > 0)
        .map(|(index, _)| input[..index].trim())
        .filter(|head| !head.is_empty());
    if let Some(head) = head {
        return head.to_string();
    }

    let input = input.trim();
    if input.chars().count() > preview_chars {
        let preview: String = input.chars().take(preview_chars).collect();
        format!("{preview}...")
    } else {
        input.to_string()
    }
}

fn model_tags(value: Option<&Value>) -> Option<Vec<String>> {
    let tags: Vec<String> = value?
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    (!tags.is_empty()).then_some(tags)
}

const TAG_RULES: &[(&[&str], &str)] = &[
    (&["会議", "ミーティング"], "会議"),
    (&["資料", "文書"], "文書作成"),
    (&["計画", "プロジェクト"], "プロジェクト管理"),
    (&["レビュー", "確認"], "レビュー"),
    (&["学習", "勉強"], "学習"),
    (&["開発", "プログラム"], "開発"),
];

/// Keyword tags for the raw input; `["一般"]` when nothing matches.
pub fn generate_tags(input: &str) -> Vec<String> {
    let text = input.to_lowercase();
    let tags: Vec<String> = TAG_RULES
        .iter()
        .filter(|(keywords, _)| keywords.iter().any(|k| text.contains(k)))
        .map(|(_, tag)| (*tag).to_string())
        .collect();

    if tags.is_empty() { vec!["一般".to_string()] } else { tags }
}

/// Three template sub-tasks chosen by keywords in the title.
pub fn generate_subtasks(title: &str) -> Vec<String> {
    let template: [&str; 3] = if title.contains("計画") || title.contains("プロジェクト") {
        ["要件定義・スコープ確認", "タスク分解・スケジュール作成", "リスク分析・対策検討"]
    } else if title.contains("資料") || title.contains("レポート") {
        ["情報収集・調査", "構成・アウトライン作成", "執筆・編集・校正"]
    } else {
        ["準備・情報整理", "実行・作業", "確認・完了処理"]
    };
    template.iter().map(|s| (*s).to_string()).collect()
}

fn suggestions(duration: u32, raw_priority: &Value, skippable: bool, tuning: &Tuning) -> Vec<String> {
    let mut out = Vec::new();
    if duration > tuning.subtask_threshold_minutes {
        out.push("大きなタスクなので、小さなサブタスクに分割することをお勧めします".to_string());
    }
    let high = match raw_priority {
        Value::Number(n) => n.as_f64().is_some_and(|p| p >= 4.0),
        Value::String(s) => Priority::from_label(s).is_some_and(Priority::is_high),
        _ => false,
    };
    if high {
        out.push("高優先度タスクなので、他のタスクより先に取り組むことをお勧めします".to_string());
    }
    if skippable {
        out.push("このタスクは後回しにできる可能性があります".to_string());
    }
    if duration <= tuning.quick_task_threshold_minutes {
        out.push("短時間で完了できるため、隙間時間を活用してください".to_string());
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
    fn monthly_report_scenario() {
        let request = AnalysisRequest::new("資料作成: 月次レポート");
        let out = normalize_analysis(
            &raw(json!({
                "title": "月次レポート作成",
                "description": "...",
                "priority": 3,
                "estimatedDuration": 150,
                "difficulty": 3
            })),
            &request,
            "gemini-1.5-flash",
            &Tuning::default(),
        )
        .unwrap();

        assert_eq!(out.analysis.priority, Priority::High);
        assert_eq!(out.analysis.complexity, Complexity::Medium);
        assert_eq!(out.analysis.category, "general");
        assert_eq!(out.analysis.tags, vec!["文書作成"]);
        assert!(out.task_id.starts_with("task_"));

        let subtasks = out
            .execution
            .actions
            .iter()
            .find(|a| a.kind == ActionKind::SubtasksGenerated)
            .unwrap();
        assert_eq!(subtasks.details["count"], 3);
        assert_eq!(subtasks.details["subtasks"][0], "情報収集・調査");
        assert_eq!(subtasks.description, "複雑なタスクのため、3つのサブタスクを生成しました");

        let notes = out.execution.recommendations.unwrap();
        assert_eq!(notes[0], "高優先度タスクのため、明日の朝一番に取り組むことをお勧めします");
        assert_eq!(notes[1], "集中できる2時間のブロックを確保してください");
    }

    #[test]
    fn missing_title_or_description_is_incomplete() {
        let request = AnalysisRequest::new("x");
        let tuning = Tuning::default();
        for value in [json!({"description": "d"}), json!({"title": "t"}), json!({"title": "", "description": "d"})] {
            assert_eq!(
                normalize_analysis(&raw(value), &request, "m", &tuning),
                Err(NormalizeError::IncompleteAnalysis)
            );
        }
    }

    #[test]
    fn non_string_title_falls_back_to_input() {
        let request = AnalysisRequest::new("会議準備： 来週の定例");
        let out = normalize_analysis(&raw(json!({"title": 42, "description": "d"})), &request, "m", &Tuning::default())
            .unwrap();
        assert_eq!(out.analysis.title, "会議準備");
        assert_eq!(out.analysis.estimated_duration, 60);
        assert_eq!(out.analysis.tags, vec!["会議"]);
    }

    #[test]
    fn request_priority_overrides_model() {
        let mut request = AnalysisRequest::new("x");
        request.priority = Some(PriorityInput::Label("low".into()));
        let out = normalize_analysis(
            &raw(json!({"title": "t", "description": "d", "priority": 5, "estimatedDuration": 20, "isSkippable": true})),
            &request,
            "m",
            &Tuning::default(),
        )
        .unwrap();
        assert_eq!(out.analysis.priority, Priority::Low);
        assert_eq!(
            out.analysis.suggestions,
            vec![
                "高優先度タスクなので、他のタスクより先に取り組むことをお勧めします",
                "このタスクは後回しにできる可能性があります",
                "短時間で完了できるため、隙間時間を活用してください",
            ]
        );
        assert!(!out.execution.has_action(ActionKind::SubtasksGenerated));
    }

    #[test]
    fn title_extraction() {
        assert_eq!(extract_title("資料作成: 月次レポート", 50), "資料作成");
        assert_eq!(extract_title(":先頭コロン", 50), ":先頭コロン");
        let long = "あ".repeat(60);
        assert_eq!(extract_title(&long, 50), format!("{}...", "あ".repeat(50)));
    }

    #[test]
    fn tag_rules() {
        assert_eq!(generate_tags("プロジェクト計画のレビュー"), vec!["プロジェクト管理", "レビュー"]);
        assert_eq!(generate_tags("散歩"), vec!["一般"]);
    }

    #[test]
    fn subtask_templates() {
        assert_eq!(generate_subtasks("新規プロジェクト")[0], "要件定義・スコープ確認");
        assert_eq!(generate_subtasks("掃除")[2], "確認・完了処理");
    }
}
