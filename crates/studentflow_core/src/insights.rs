//! crates/studentflow_core/src/insights.rs
//!
//! The AI insight orchestrator: builds the coaching prompt, asks the
//! generation port for a schema-constrained JSON answer, validates it and
//! appends it to the user's bounded insight history.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::domain::{AiInsight, DailyLog, Exam, GeneratedInsight, Task, User, UserId};
use crate::ports::{DatabaseService, InsightGenerationService, PortError, PortResult};

/// Maximum number of snapshots kept per user; the oldest is evicted first.
pub const HISTORY_LIMIT: usize = 10;

/// How many of the most recent daily logs are shown to the model.
pub const PROMPT_LOG_DAYS: usize = 7;

const COACH_PROMPT_TEMPLATE: &str = r#"Act as an elite Student Productivity Coach. Analyze the following data:

UserProfile: {profile}
Current Tasks (Pending & Completed): {tasks}
Recent Routine Logs (Last 7 days): {logs}

Provide a structured analysis containing:
1. 3-4 short, punchy insights about the student's habits (e.g., "You study best on days you exercise", "Screen time negatively impacts your sleep").
2. A suggested simplified schedule for the *current day* based on pending tasks and typical wake/sleep times. Minimize overlap. Prioritize 'Urgent' and 'High' tasks.
3. A productivity score (0-100) based on task completion and healthy routine habits."#;

/// The JSON schema the generation provider must follow.
pub fn insight_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "insights": {
                "type": "array",
                "items": { "type": "string" }
            },
            "suggestedSchedule": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "time": { "type": "string" },
                        "activity": { "type": "string" },
                        "note": { "type": "string" }
                    },
                    "required": ["time", "activity"]
                }
            },
            "productivityScore": { "type": "number" }
        },
        "required": ["insights", "suggestedSchedule", "productivityScore"]
    })
}

//=========================================================================================
// Prompt Assembly
//=========================================================================================

#[derive(Serialize)]
struct ProfileView<'a> {
    name: Option<&'a str>,
    academic_goals: &'a [String],
    upcoming_exams: &'a [Exam],
}

#[derive(Serialize)]
struct TaskView<'a> {
    title: &'a str,
    deadline: Option<String>,
    duration_mins: u32,
    priority: &'static str,
    category: &'static str,
    status: &'static str,
}

#[derive(Serialize)]
struct LogView {
    log_date: String,
    felt_today: &'static str,
    study_hours: f64,
    screen_hours: f64,
    exercise_minutes: u32,
    wake_up_time: Option<String>,
    sleep_time: Option<String>,
    wellbeing_score: u8,
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> PortResult<String> {
    serde_json::to_string(value).map_err(|e| PortError::Unexpected(e.to_string()))
}

/// Renders the coaching prompt from the user's profile, tasks and recent logs.
pub fn build_prompt(user: &User, tasks: &[Task], logs: &[DailyLog]) -> PortResult<String> {
    let profile = ProfileView {
        name: user.full_name.as_deref(),
        academic_goals: &user.academic_goals,
        upcoming_exams: &user.upcoming_exams,
    };
    let tasks: Vec<TaskView> = tasks
        .iter()
        .map(|task| TaskView {
            title: &task.title,
            deadline: task.deadline.map(|d| d.to_rfc3339()),
            duration_mins: task.duration_mins,
            priority: task.priority.as_str(),
            category: task.category.as_str(),
            status: task.status.as_str(),
        })
        .collect();
    let logs: Vec<LogView> = logs
        .iter()
        .map(|log| LogView {
            log_date: log.log_date.to_string(),
            felt_today: log.felt_today.as_str(),
            study_hours: log.study_hours,
            screen_hours: log.screen_hours,
            exercise_minutes: log.exercise_minutes,
            wake_up_time: log.wake_up_time.map(|t| t.format("%H:%M").to_string()),
            sleep_time: log.sleep_time.map(|t| t.format("%H:%M").to_string()),
            wellbeing_score: log.wellbeing_score,
        })
        .collect();

    Ok(COACH_PROMPT_TEMPLATE
        .replace("{profile}", &to_json(&profile)?)
        .replace("{tasks}", &to_json(&tasks)?)
        .replace("{logs}", &to_json(&logs)?))
}

//=========================================================================================
// Output Validation and History Bookkeeping
//=========================================================================================

/// Decodes the provider's answer. Markdown code fences around the JSON are
/// tolerated; anything that does not match the schema is an error.
pub fn parse_generated(raw: &str) -> PortResult<GeneratedInsight> {
    let trimmed = raw.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    let generated: GeneratedInsight = serde_json::from_str(body).map_err(|e| {
        PortError::Unavailable(format!("AI provider returned malformed insight JSON: {}", e))
    })?;

    let score = generated.productivity_score;
    if !score.is_finite() || !(0.0..=100.0).contains(&score) {
        return Err(PortError::Unavailable(format!(
            "AI provider returned an out-of-range productivity score: {}",
            score
        )));
    }
    Ok(generated)
}

/// Appends `insight`, first evicting from the front so that at most `limit`
/// entries remain.
pub fn push_bounded(history: &mut Vec<AiInsight>, insight: AiInsight, limit: usize) {
    let keep = limit.saturating_sub(1);
    if history.len() > keep {
        history.drain(..history.len() - keep);
    }
    history.push(insight);
}

/// Decodes a persisted history. This is the one place that accepts the legacy
/// text form (a JSON string holding the array); null means no history yet.
pub fn decode_history(stored: Value) -> PortResult<Vec<AiInsight>> {
    let corrupt = |e: serde_json::Error| {
        PortError::Unexpected(format!("Stored insight history is corrupt: {}", e))
    };
    match stored {
        Value::Null => Ok(Vec::new()),
        Value::String(text) if text.trim().is_empty() => Ok(Vec::new()),
        Value::String(text) => serde_json::from_str(&text).map_err(corrupt),
        other @ Value::Array(_) => serde_json::from_value(other).map_err(corrupt),
        other => Err(PortError::Unexpected(format!(
            "Stored insight history has unexpected shape: {}",
            other
        ))),
    }
}

//=========================================================================================
// Orchestration
//=========================================================================================

/// Generates a fresh insight for `uid` and records it in the history.
///
/// The history is only written once a valid insight is in hand, so a failed
/// or malformed generation leaves it untouched.
pub async fn generate_insight(
    db: &dyn DatabaseService,
    generator: &dyn InsightGenerationService,
    uid: &UserId,
) -> PortResult<AiInsight> {
    let user = db.get_user(uid).await?;
    let tasks = db.list_tasks(uid).await?;
    let logs = db.recent_daily_logs(uid, PROMPT_LOG_DAYS).await?;
    let prompt = build_prompt(&user, &tasks, &logs)?;

    let raw = generator
        .generate_structured(&prompt, &insight_schema())
        .await?;
    let insight = match parse_generated(&raw) {
        Ok(generated) => AiInsight::from_generated(generated),
        Err(e) => {
            warn!("Discarding generated insight for {}: {}", uid, e);
            return Err(e);
        }
    };

    let mut history = db.get_insight_history(uid).await?;
    push_bounded(&mut history, insight.clone(), HISTORY_LIMIT);
    db.replace_insight_history(uid, &history).await?;

    info!("Stored insight {} for {} ({} in history)", insight.id, uid, history.len());
    Ok(insight)
}

/// The stored history, oldest first.
pub async fn insight_history(db: &dyn DatabaseService, uid: &UserId) -> PortResult<Vec<AiInsight>> {
    db.get_insight_history(uid).await
}

/// Short free-text advice. Nothing is stored.
pub async fn quick_advice(
    generator: &dyn InsightGenerationService,
    query: &str,
    context: &str,
) -> PortResult<String> {
    let query = query.trim();
    if query.is_empty() {
        return Err(PortError::Validation("query must not be empty".to_string()));
    }
    generator.quick_advice(query, context.trim()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewTask, Priority};
    use crate::memory::InMemoryDatabase;
    use crate::wellbeing::{score_daily_log, HabitInput};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Answers every call with a valid insight whose first line names the call number.
    #[derive(Default)]
    struct CountingGenerator {
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl InsightGenerationService for CountingGenerator {
        async fn generate_structured(&self, prompt: &str, _schema: &Value) -> PortResult<String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(json!({
                "insights": [format!("call {}", n)],
                "suggestedSchedule": [{"time": "09:00", "activity": "Deep work"}],
                "productivityScore": 70
            })
            .to_string())
        }

        async fn quick_advice(&self, query: &str, _context: &str) -> PortResult<String> {
            Ok(format!("advice for {}", query))
        }
    }

    struct FixedGenerator(Result<&'static str, ()>);

    #[async_trait]
    impl InsightGenerationService for FixedGenerator {
        async fn generate_structured(&self, _prompt: &str, _schema: &Value) -> PortResult<String> {
            match &self.0 {
                Ok(text) => Ok(text.to_string()),
                Err(_) => Err(PortError::Unavailable("provider timed out".to_string())),
            }
        }

        async fn quick_advice(&self, _query: &str, _context: &str) -> PortResult<String> {
            Err(PortError::Unavailable("offline".to_string()))
        }
    }

    fn insight(label: &str) -> AiInsight {
        AiInsight::from_generated(GeneratedInsight {
            insights: vec![label.to_string()],
            suggested_schedule: Vec::new(),
            productivity_score: 50.0,
        })
    }

    #[test]
    fn push_bounded_evicts_oldest() {
        let mut history: Vec<AiInsight> = (0..10).map(|i| insight(&i.to_string())).collect();
        push_bounded(&mut history, insight("new"), HISTORY_LIMIT);
        assert_eq!(history.len(), 10);
        assert_eq!(history[0].insights[0], "1");
        assert_eq!(history[9].insights[0], "new");
    }

    #[test]
    fn parse_accepts_fenced_json_and_rejects_garbage() {
        let fenced = "```json\n{\"insights\":[\"a\"],\"suggestedSchedule\":[],\"productivityScore\":55.5}\n```";
        assert_eq!(parse_generated(fenced).unwrap().productivity_score, 55.5);

        assert!(matches!(
            parse_generated("Sure! Here is your plan"),
            Err(PortError::Unavailable(_))
        ));
        assert!(matches!(
            parse_generated(r#"{"insights":[],"suggestedSchedule":[],"productivityScore":140}"#),
            Err(PortError::Unavailable(_))
        ));
    }

    #[test]
    fn decode_history_accepts_array_text_and_null() {
        let array = json!([{"insights":["x"],"suggestedSchedule":[],"productivityScore":1}]);
        assert_eq!(decode_history(array.clone()).unwrap().len(), 1);
        assert_eq!(decode_history(Value::String(array.to_string())).unwrap().len(), 1);
        assert!(decode_history(Value::Null).unwrap().is_empty());
        assert!(decode_history(Value::String(String::new())).unwrap().is_empty());
        assert!(decode_history(json!({"insights": []})).is_err());
        assert!(decode_history(Value::String("not json".to_string())).is_err());
    }

    #[tokio::test]
    async fn history_never_exceeds_limit() {
        let db = InMemoryDatabase::new();
        let uid = UserId::new("student");
        db.get_or_create_user(&uid).await.unwrap();
        let generator = CountingGenerator::default();

        let mut first = None;
        let mut last = None;
        for _ in 0..11 {
            let insight = generate_insight(&db, &generator, &uid).await.unwrap();
            first.get_or_insert(insight.id);
            last = Some(insight.id);
        }

        let history = insight_history(&db, &uid).await.unwrap();
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert!(history.iter().all(|i| Some(i.id) != first));
        assert_eq!(history.last().map(|i| i.id), last);
        assert_eq!(history[0].insights[0], "call 2");
    }

    #[tokio::test]
    async fn prompt_includes_tasks_and_logs() {
        let db = InMemoryDatabase::new();
        let uid = UserId::new("student");
        db.get_or_create_user(&uid).await.unwrap();
        db.create_task(
            &uid,
            NewTask {
                title: "Organic chemistry problem set".to_string(),
                deadline: None,
                duration_mins: 90,
                priority: Priority::Urgent,
                category: Default::default(),
            },
        )
        .await
        .unwrap();
        let day = NaiveDate::from_ymd_opt(2026, 10, 12).unwrap();
        db.upsert_daily_log(score_daily_log(uid.clone(), day, HabitInput::default()))
            .await
            .unwrap();

        let generator = CountingGenerator::default();
        generate_insight(&db, &generator, &uid).await.unwrap();

        let prompts = generator.prompts.lock().unwrap();
        assert!(prompts[0].contains("Organic chemistry problem set"));
        assert!(prompts[0].contains("\"Urgent\""));
        assert!(prompts[0].contains("2026-10-12"));
    }

    #[tokio::test]
    async fn failed_generation_leaves_history_untouched() {
        let db = InMemoryDatabase::new();
        let uid = UserId::new("student");
        db.get_or_create_user(&uid).await.unwrap();
        generate_insight(&db, &CountingGenerator::default(), &uid)
            .await
            .unwrap();

        let malformed = FixedGenerator(Ok("{\"insights\": \"oops\"}"));
        let err = generate_insight(&db, &malformed, &uid).await.unwrap_err();
        assert!(matches!(err, PortError::Unavailable(_)));

        let down = FixedGenerator(Err(()));
        assert!(generate_insight(&db, &down, &uid).await.is_err());

        assert_eq!(insight_history(&db, &uid).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let db = InMemoryDatabase::new();
        let err = generate_insight(&db, &CountingGenerator::default(), &UserId::new("ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }

    #[tokio::test]
    async fn quick_advice_requires_a_query() {
        let generator = CountingGenerator::default();
        assert!(matches!(
            quick_advice(&generator, "   ", "").await,
            Err(PortError::Validation(_))
        ));
        assert_eq!(
            quick_advice(&generator, " focus? ", "exam week").await.unwrap(),
            "advice for focus?"
        );
    }
}
