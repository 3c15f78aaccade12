//! Prompt builders. Pure functions of their input: the same request always
//! yields byte-identical text.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use wellfin_core::Tuning;

use crate::analysis::AnalysisRequest;
use crate::recommendations::RecommendationRequest;
use crate::schedule::ScheduleRequest;

fn pretty_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string())
}

/// JSON string literal, so quotes and newlines in user text stay inside the field.
fn quoted(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string())
}

pub fn task_analysis_prompt(request: &AnalysisRequest) -> String {
    let scheduled = request.scheduled_date.as_deref().filter(|d| !d.trim().is_empty()).unwrap_or("未指定");
    format!(
        r#"あなたはタスク分析を専門とするアシスタントです。次のユーザー入力から、実行可能なタスクの情報を抽出してください。

ユーザー入力: {input}
予定日: {scheduled}

回答は次の形式のJSONオブジェクトのみとし、説明文は含めないでください:
{{
  "title": "簡潔で明確なタスク名",
  "description": "タスク内容の説明",
  "category": "タスクの分類（例: work, personal, study）",
  "priority": 1〜5の整数（1=低い, 5=非常に高い）,
  "difficulty": 1〜5の整数（1=簡単, 5=難しい）,
  "estimatedDuration": 所要時間の見込み（分、整数）,
  "tags": ["関連タグ"],
  "isSkippable": 後回しにできる場合は true、そうでなければ false
}}
"#,
        input = quoted(&request.user_input),
    )
}

pub fn schedule_optimization_prompt(request: &ScheduleRequest, tuning: &Tuning) -> String {
    let history = if request.history.is_empty() {
        "履歴なし".to_string()
    } else {
        let sample = &request.history[..request.history.len().min(tuning.history_sample_size)];
        pretty_json(sample)
    };
    let existing = if request.existing_tasks.is_empty() {
        String::new()
    } else {
        format!("\n既に予定されているタスク（重ならないように配置してください）:\n{}\n", pretty_json(&request.existing_tasks))
    };

    format!(
        r#"あなたはスケジュール最適化を専門とするアシスタントです。次のタスクを分析し、1日の最適なスケジュールを作成してください。

タスク一覧:
{tasks}
{existing}
ユーザー設定:
{preferences}

過去のタスク履歴（参考）:
{history}

回答は次の形式のJSONオブジェクトのみとし、説明文は含めないでください。入力のすべてのタスクを同じ id で含めてください:
{{
  "optimizedTasks": [
    {{
      "id": "入力と同じタスクID",
      "title": "タスク名",
      "priority": "low | medium | high | urgent",
      "estimatedDuration": 所要時間（分）,
      "scheduledTime": "開始時刻（ISO 8601）",
      "category": "カテゴリ",
      "optimizationReason": "この時間帯を選んだ理由"
    }}
  ],
  "optimizationInsights": ["スケジュールに関する気づきや助言"],
  "efficiencyScore": 0〜1の数値,
  "timeDistribution": {{
    "morning": 午前のタスク数,
    "afternoon": 午後のタスク数,
    "evening": 夕方以降のタスク数
  }}
}}
"#,
        tasks = pretty_json(&request.tasks),
        preferences = pretty_json(&request.preferences),
    )
}

pub fn recommendations_prompt(request: &RecommendationRequest) -> String {
    format!(
        r#"あなたは生産性向上を支援するコンサルタントです。ユーザーの情報をもとに、その人に合った推奨事項を作成してください。

ユーザープロファイル:
{profile}

現在の状況:
{context}

回答は次の形式のJSONオブジェクトのみとし、説明文は含めないでください:
{{
  "recommendations": [
    {{
      "type": "productivity | habit | schedule | goal",
      "title": "推奨事項のタイトル",
      "description": "具体的な説明",
      "priority": "low | medium | high",
      "category": "カテゴリ",
      "actionable": true,
      "estimatedImpact": "low | medium | high",
      "implementationSteps": ["実行ステップ"],
      "timeframe": "実行期間（例: 1週間, 1ヶ月）"
    }}
  ],
  "insights": {{
    "strengths": ["ユーザーの強み"],
    "improvementAreas": ["改善できる領域"],
    "riskFactors": ["注意が必要な点"]
  }},
  "personalizedTips": ["このユーザー向けの助言"],
  "nextActions": ["次に取るべき具体的な行動"]
}}
"#,
        profile = pretty_json(&request.profile),
        context = pretty_json(&request.context),
    )
}

pub fn connection_test_prompt(timestamp: DateTime<Utc>) -> String {
    format!(
        r#"これは接続確認です。次のJSONオブジェクトだけをそのまま返してください:
{{
  "status": "success",
  "message": "Vertex AI connection is working",
  "timestamp": "{}"
}}
"#,
        timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}
