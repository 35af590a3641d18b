//! crates/studentflow_core/src/memory.rs
//!
//! An in-process implementation of `DatabaseService` with the same scoping
//! and upsert rules as the Postgres adapter. Used to exercise the core and
//! the HTTP layer without a database.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::{
    AiInsight, DailyLog, NewTask, ProfileUpdate, Task, TaskStatus, TaskUpdate, Theme, User,
    UserId,
};
use crate::ports::{DatabaseService, PortError, PortResult};

#[derive(Default)]
struct Store {
    users: HashMap<UserId, User>,
    histories: HashMap<UserId, Vec<AiInsight>>,
    tasks: Vec<Task>,
    logs: BTreeMap<(UserId, NaiveDate), DailyLog>,
}

impl Store {
    fn user_mut(&mut self, uid: &UserId) -> PortResult<&mut User> {
        self.users
            .get_mut(uid)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", uid)))
    }

    fn owned_task_mut(&mut self, uid: &UserId, task_id: Uuid) -> PortResult<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|task| task.id == task_id && &task.uid == uid)
            .ok_or_else(|| PortError::NotFound(format!("Task {} not found", task_id)))
    }
}

#[derive(Default)]
pub struct InMemoryDatabase {
    store: Mutex<Store>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DatabaseService for InMemoryDatabase {
    async fn get_or_create_user(&self, uid: &UserId) -> PortResult<User> {
        let mut store = self.store.lock().await;
        let user = store
            .users
            .entry(uid.clone())
            .or_insert_with(|| User::new(uid.clone()));
        Ok(user.clone())
    }

    async fn get_user(&self, uid: &UserId) -> PortResult<User> {
        let mut store = self.store.lock().await;
        store.user_mut(uid).map(|user| user.clone())
    }

    async fn update_user(&self, uid: &UserId, update: ProfileUpdate) -> PortResult<User> {
        let mut store = self.store.lock().await;
        let user = store.user_mut(uid)?;
        if let Some(name) = update.full_name {
            user.full_name = Some(name);
        }
        if let Some(email) = update.email {
            user.email = Some(email);
        }
        if let Some(picture) = update.profile_picture {
            user.profile_picture = Some(picture);
        }
        if let Some(goals) = update.academic_goals {
            user.academic_goals = goals;
        }
        if let Some(exams) = update.upcoming_exams {
            user.upcoming_exams = exams;
        }
        Ok(user.clone())
    }

    async fn set_dark_mode(&self, uid: &UserId, enabled: bool) -> PortResult<()> {
        let mut store = self.store.lock().await;
        store.user_mut(uid)?.dark_mode = enabled;
        Ok(())
    }

    async fn set_color_theme(&self, uid: &UserId, theme: Theme) -> PortResult<()> {
        let mut store = self.store.lock().await;
        store.user_mut(uid)?.color_theme = theme;
        Ok(())
    }

    async fn get_insight_history(&self, uid: &UserId) -> PortResult<Vec<AiInsight>> {
        let mut store = self.store.lock().await;
        store.user_mut(uid)?;
        Ok(store.histories.get(uid).cloned().unwrap_or_default())
    }

    async fn replace_insight_history(
        &self,
        uid: &UserId,
        history: &[AiInsight],
    ) -> PortResult<()> {
        let mut store = self.store.lock().await;
        store.user_mut(uid)?;
        store.histories.insert(uid.clone(), history.to_vec());
        Ok(())
    }

    async fn list_tasks(&self, uid: &UserId) -> PortResult<Vec<Task>> {
        let store = self.store.lock().await;
        let mut tasks: Vec<Task> = store
            .tasks
            .iter()
            .filter(|task| &task.uid == uid)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| match (a.deadline, b.deadline) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.created_at.cmp(&b.created_at),
        });
        Ok(tasks)
    }

    async fn create_task(&self, uid: &UserId, task: NewTask) -> PortResult<Task> {
        let mut store = self.store.lock().await;
        store.user_mut(uid)?;
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            uid: uid.clone(),
            title: task.title,
            deadline: task.deadline,
            duration_mins: task.duration_mins,
            priority: task.priority,
            category: task.category,
            status: TaskStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        store.tasks.push(task.clone());
        Ok(task)
    }

    async fn update_task(
        &self,
        uid: &UserId,
        task_id: Uuid,
        update: TaskUpdate,
    ) -> PortResult<Task> {
        let mut store = self.store.lock().await;
        let task = store.owned_task_mut(uid, task_id)?;
        update.apply_to(task);
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    async fn delete_task(&self, uid: &UserId, task_id: Uuid) -> PortResult<()> {
        let mut store = self.store.lock().await;
        let before = store.tasks.len();
        store
            .tasks
            .retain(|task| !(task.id == task_id && &task.uid == uid));
        if store.tasks.len() == before {
            return Err(PortError::NotFound(format!("Task {} not found", task_id)));
        }
        Ok(())
    }

    async fn upsert_daily_log(&self, log: DailyLog) -> PortResult<DailyLog> {
        let mut store = self.store.lock().await;
        store.user_mut(&log.uid)?;
        store
            .logs
            .insert((log.uid.clone(), log.log_date), log.clone());
        Ok(log)
    }

    async fn recent_daily_logs(&self, uid: &UserId, limit: usize) -> PortResult<Vec<DailyLog>> {
        let store = self.store.lock().await;
        Ok(store
            .logs
            .range((uid.clone(), NaiveDate::MIN)..=(uid.clone(), NaiveDate::MAX))
            .rev()
            .take(limit)
            .map(|(_, log)| log.clone())
            .collect())
    }
}
