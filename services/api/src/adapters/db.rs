//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::{types::Json, FromRow, PgPool};
use std::str::FromStr;
use studentflow_core::domain::{
    AiInsight, DailyLog, Exam, NewTask, ProfileUpdate, Task, TaskStatus, TaskUpdate, Theme,
    UnknownLabel, User, UserId,
};
use studentflow_core::insights::decode_history;
use studentflow_core::ports::{DatabaseService, PortError, PortResult};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

macro_rules! user_columns {
    () => {
        "uid, full_name, email, pfp_url, academic_goals, upcoming_exams, \
         settings_dark_mode, settings_color_theme, created_at"
    };
}

macro_rules! task_columns {
    () => {
        "id, uid, title, deadline, duration_mins, priority, category, status, created_at, updated_at"
    };
}

macro_rules! log_columns {
    () => {
        "uid, log_date, felt_today, study_hours, screen_hours, exercise_mins, \
         wake_up_time, sleep_time, wellbeing_score"
    };
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn parse_label<T>(raw: &str) -> PortResult<T>
where
    T: FromStr<Err = UnknownLabel>,
{
    raw.parse::<T>()
        .map_err(|e| PortError::Unexpected(format!("Corrupt row: {}", e)))
}

fn user_not_found(uid: &UserId) -> PortError {
    PortError::NotFound(format!("User {} not found", uid))
}

fn task_not_found(task_id: Uuid) -> PortError {
    PortError::NotFound(format!("Task {} not found", task_id))
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    uid: String,
    full_name: Option<String>,
    email: Option<String>,
    pfp_url: Option<String>,
    academic_goals: Json<Vec<String>>,
    upcoming_exams: Json<Vec<Exam>>,
    settings_dark_mode: bool,
    settings_color_theme: String,
    created_at: DateTime<Utc>,
}
impl UserRecord {
    fn to_domain(self) -> PortResult<User> {
        Ok(User {
            uid: UserId(self.uid),
            full_name: self.full_name,
            email: self.email,
            profile_picture: self.pfp_url,
            academic_goals: self.academic_goals.0,
            upcoming_exams: self.upcoming_exams.0,
            dark_mode: self.settings_dark_mode,
            color_theme: parse_label(&self.settings_color_theme)?,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct TaskRecord {
    id: Uuid,
    uid: String,
    title: String,
    deadline: Option<DateTime<Utc>>,
    duration_mins: i32,
    priority: String,
    category: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl TaskRecord {
    fn to_domain(self) -> PortResult<Task> {
        Ok(Task {
            id: self.id,
            uid: UserId(self.uid),
            title: self.title,
            deadline: self.deadline,
            duration_mins: u32::try_from(self.duration_mins).unwrap_or(0),
            priority: parse_label(&self.priority)?,
            category: parse_label(&self.category)?,
            status: parse_label(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(FromRow)]
struct DailyLogRecord {
    uid: String,
    log_date: NaiveDate,
    felt_today: String,
    study_hours: f64,
    screen_hours: f64,
    exercise_mins: i32,
    wake_up_time: Option<NaiveTime>,
    sleep_time: Option<NaiveTime>,
    wellbeing_score: i16,
}
impl DailyLogRecord {
    fn to_domain(self) -> PortResult<DailyLog> {
        Ok(DailyLog {
            uid: UserId(self.uid),
            log_date: self.log_date,
            felt_today: parse_label(&self.felt_today)?,
            study_hours: self.study_hours,
            screen_hours: self.screen_hours,
            exercise_minutes: u32::try_from(self.exercise_mins).unwrap_or(0),
            wake_up_time: self.wake_up_time,
            sleep_time: self.sleep_time,
            wellbeing_score: u8::try_from(self.wellbeing_score).unwrap_or(0),
        })
    }
}

fn to_i32(value: u32, field: &str) -> PortResult<i32> {
    i32::try_from(value).map_err(|_| PortError::Validation(format!("{} is too large", field)))
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn get_or_create_user(&self, uid: &UserId) -> PortResult<User> {
        sqlx::query("INSERT INTO users (uid) VALUES ($1) ON CONFLICT (uid) DO NOTHING")
            .bind(uid.as_str())
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        self.get_user(uid).await
    }

    async fn get_user(&self, uid: &UserId) -> PortResult<User> {
        sqlx::query_as::<_, UserRecord>(concat!(
            "SELECT ",
            user_columns!(),
            " FROM users WHERE uid = $1"
        ))
        .bind(uid.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| user_not_found(uid))?
        .to_domain()
    }

    async fn update_user(&self, uid: &UserId, update: ProfileUpdate) -> PortResult<User> {
        sqlx::query_as::<_, UserRecord>(concat!(
            "UPDATE users SET ",
            "full_name = COALESCE($2, full_name), ",
            "email = COALESCE($3, email), ",
            "pfp_url = COALESCE($4, pfp_url), ",
            "academic_goals = COALESCE($5, academic_goals), ",
            "upcoming_exams = COALESCE($6, upcoming_exams), ",
            "updated_at = now() ",
            "WHERE uid = $1 RETURNING ",
            user_columns!()
        ))
        .bind(uid.as_str())
        .bind(update.full_name)
        .bind(update.email)
        .bind(update.profile_picture)
        .bind(update.academic_goals.map(Json))
        .bind(update.upcoming_exams.map(Json))
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| user_not_found(uid))?
        .to_domain()
    }

    async fn set_dark_mode(&self, uid: &UserId, enabled: bool) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE users SET settings_dark_mode = $2, updated_at = now() WHERE uid = $1",
        )
        .bind(uid.as_str())
        .bind(enabled)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(user_not_found(uid));
        }
        Ok(())
    }

    async fn set_color_theme(&self, uid: &UserId, theme: Theme) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE users SET settings_color_theme = $2, updated_at = now() WHERE uid = $1",
        )
        .bind(uid.as_str())
        .bind(theme.as_str())
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(user_not_found(uid));
        }
        Ok(())
    }

    async fn get_insight_history(&self, uid: &UserId) -> PortResult<Vec<AiInsight>> {
        let stored = sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT recommendations FROM users WHERE uid = $1",
        )
        .bind(uid.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| user_not_found(uid))?;

        decode_history(stored)
    }

    async fn replace_insight_history(
        &self,
        uid: &UserId,
        history: &[AiInsight],
    ) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE users SET recommendations = $2, updated_at = now() WHERE uid = $1",
        )
        .bind(uid.as_str())
        .bind(Json(history))
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(user_not_found(uid));
        }
        Ok(())
    }

    async fn list_tasks(&self, uid: &UserId) -> PortResult<Vec<Task>> {
        let records = sqlx::query_as::<_, TaskRecord>(concat!(
            "SELECT ",
            task_columns!(),
            " FROM tasks WHERE uid = $1 ORDER BY deadline ASC NULLS LAST, created_at ASC"
        ))
        .bind(uid.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        records.into_iter().map(TaskRecord::to_domain).collect()
    }

    async fn create_task(&self, uid: &UserId, task: NewTask) -> PortResult<Task> {
        sqlx::query_as::<_, TaskRecord>(concat!(
            "INSERT INTO tasks (id, uid, title, deadline, duration_mins, priority, category, status) ",
            "VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING ",
            task_columns!()
        ))
        .bind(Uuid::new_v4())
        .bind(uid.as_str())
        .bind(task.title)
        .bind(task.deadline)
        .bind(to_i32(task.duration_mins, "duration_mins")?)
        .bind(task.priority.as_str())
        .bind(task.category.as_str())
        .bind(TaskStatus::Pending.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?
        .to_domain()
    }

    async fn update_task(
        &self,
        uid: &UserId,
        task_id: Uuid,
        update: TaskUpdate,
    ) -> PortResult<Task> {
        let duration = update
            .duration_mins
            .map(|d| to_i32(d, "duration_mins"))
            .transpose()?;

        sqlx::query_as::<_, TaskRecord>(concat!(
            "UPDATE tasks SET ",
            "title = COALESCE($3, title), ",
            "deadline = COALESCE($4, deadline), ",
            "duration_mins = COALESCE($5, duration_mins), ",
            "priority = COALESCE($6, priority), ",
            "category = COALESCE($7, category), ",
            "status = COALESCE($8, status), ",
            "updated_at = now() ",
            "WHERE id = $1 AND uid = $2 RETURNING ",
            task_columns!()
        ))
        .bind(task_id)
        .bind(uid.as_str())
        .bind(update.title)
        .bind(update.deadline)
        .bind(duration)
        .bind(update.priority.map(|p| p.as_str()))
        .bind(update.category.map(|c| c.as_str()))
        .bind(update.status.map(|s| s.as_str()))
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| task_not_found(task_id))?
        .to_domain()
    }

    async fn delete_task(&self, uid: &UserId, task_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND uid = $2")
            .bind(task_id)
            .bind(uid.as_str())
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(task_not_found(task_id));
        }
        Ok(())
    }

    async fn upsert_daily_log(&self, log: DailyLog) -> PortResult<DailyLog> {
        sqlx::query_as::<_, DailyLogRecord>(concat!(
            "INSERT INTO daily_routine (",
            log_columns!(),
            ") VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) ",
            "ON CONFLICT (uid, log_date) DO UPDATE SET ",
            "felt_today = EXCLUDED.felt_today, ",
            "study_hours = EXCLUDED.study_hours, ",
            "screen_hours = EXCLUDED.screen_hours, ",
            "exercise_mins = EXCLUDED.exercise_mins, ",
            "wake_up_time = EXCLUDED.wake_up_time, ",
            "sleep_time = EXCLUDED.sleep_time, ",
            "wellbeing_score = EXCLUDED.wellbeing_score, ",
            "updated_at = now() ",
            "RETURNING ",
            log_columns!()
        ))
        .bind(log.uid.as_str())
        .bind(log.log_date)
        .bind(log.felt_today.as_str())
        .bind(log.study_hours)
        .bind(log.screen_hours)
        .bind(to_i32(log.exercise_minutes, "exercise_minutes")?)
        .bind(log.wake_up_time)
        .bind(log.sleep_time)
        .bind(i16::from(log.wellbeing_score))
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?
        .to_domain()
    }

    async fn recent_daily_logs(&self, uid: &UserId, limit: usize) -> PortResult<Vec<DailyLog>> {
        let records = sqlx::query_as::<_, DailyLogRecord>(concat!(
            "SELECT ",
            log_columns!(),
            " FROM daily_routine WHERE uid = $1 ORDER BY log_date DESC LIMIT $2"
        ))
        .bind(uid.as_str())
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        records.into_iter().map(DailyLogRecord::to_domain).collect()
    }
}
