//! crates/studentflow_core/src/domain.rs
//!
//! Defines the core records of the application: users, tasks, daily habit logs
//! and AI insight snapshots. They carry serde derives because they cross the
//! persistence and HTTP boundaries as JSON, but hold no storage details.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

//=========================================================================================
// Identity
//=========================================================================================

/// The opaque identifier issued by the external identity provider.
/// Every per-user record is keyed and filtered on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(uid: impl Into<String>) -> Self {
        Self(uid.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//=========================================================================================
// Enumerated Labels
//=========================================================================================

/// Returned when a stored or submitted label is not one of an enum's variants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{label}' is not a valid {kind}")]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub label: String,
}

/// Declares a closed set of labels that are stored and transmitted by name.
macro_rules! labelled_enum {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownLabel;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $(stringify!($variant) => Ok($name::$variant),)+
                    _ => Err(UnknownLabel {
                        kind: stringify!($name),
                        label: s.to_string(),
                    }),
                }
            }
        }
    };
}

labelled_enum!(
    /// How the user felt on a logged day.
    Mood { Terrible, Bad, #[default] Okay, Good, Great }
);

labelled_enum!(
    Priority { Low, #[default] Medium, High, Urgent }
);

labelled_enum!(
    Category { Study, Health, Personal, Work, #[default] Other }
);

labelled_enum!(
    TaskStatus { #[default] Pending, Completed }
);

labelled_enum!(
    /// The color themes the frontend ships.
    Theme { #[default] Ocean, Royal, Sky, Sunset }
);

//=========================================================================================
// Users
//=========================================================================================

/// An upcoming exam on the user's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Exam {
    pub subject: String,
    pub date: NaiveDate,
}

/// A user's profile and settings. The bounded insight history lives on the
/// same persisted row but is loaded separately, see `DatabaseService`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct User {
    pub uid: UserId,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub profile_picture: Option<String>,
    pub academic_goals: Vec<String>,
    pub upcoming_exams: Vec<Exam>,
    pub dark_mode: bool,
    pub color_theme: Theme,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// A freshly created user with default settings.
    pub fn new(uid: UserId) -> Self {
        Self {
            uid,
            full_name: None,
            email: None,
            profile_picture: None,
            academic_goals: Vec::new(),
            upcoming_exams: Vec::new(),
            dark_mode: false,
            color_theme: Theme::default(),
            created_at: Utc::now(),
        }
    }

    /// The first word of the display name, or "User" when there is none.
    pub fn first_name(&self) -> &str {
        self.full_name
            .as_deref()
            .and_then(|name| name.split_whitespace().next())
            .unwrap_or("User")
    }
}

/// A partial profile update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(alias = "full_name", rename = "name")]
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub profile_picture: Option<String>,
    #[serde(rename = "goals")]
    pub academic_goals: Option<Vec<String>>,
    #[serde(rename = "examDates")]
    pub upcoming_exams: Option<Vec<Exam>>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.email.is_none()
            && self.profile_picture.is_none()
            && self.academic_goals.is_none()
            && self.upcoming_exams.is_none()
    }
}

//=========================================================================================
// Tasks
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Task {
    pub id: Uuid,
    pub uid: UserId,
    pub title: String,
    pub deadline: Option<DateTime<Utc>>,
    pub duration_mins: u32,
    pub priority: Priority,
    pub category: Category,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

/// The fields a user supplies when creating a task.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_mins: u32,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub category: Category,
}

/// A partial task edit. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub duration_mins: Option<u32>,
    pub priority: Option<Priority>,
    pub category: Option<Category>,
    pub status: Option<TaskStatus>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.deadline.is_none()
            && self.duration_mins.is_none()
            && self.priority.is_none()
            && self.category.is_none()
            && self.status.is_none()
    }

    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Writes the present fields onto `task`.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(deadline) = self.deadline {
            task.deadline = Some(deadline);
        }
        if let Some(duration) = self.duration_mins {
            task.duration_mins = duration;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(category) = self.category {
            task.category = category;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
    }
}

//=========================================================================================
// Daily Logs
//=========================================================================================

/// One day of logged habits. At most one exists per (uid, log_date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DailyLog {
    pub uid: UserId,
    pub log_date: NaiveDate,
    pub felt_today: Mood,
    pub study_hours: f64,
    pub screen_hours: f64,
    pub exercise_minutes: u32,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, example = "07:00:00"))]
    pub wake_up_time: Option<NaiveTime>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, example = "23:00:00"))]
    pub sleep_time: Option<NaiveTime>,
    /// Derived on every write, always within 0..=10.
    pub wellbeing_score: u8,
}

//=========================================================================================
// AI Insights
//=========================================================================================

/// One block of the suggested day plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ScheduleItem {
    pub time: String,
    pub activity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// The structured object the generation provider is asked to return.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedInsight {
    pub insights: Vec<String>,
    pub suggested_schedule: Vec<ScheduleItem>,
    pub productivity_score: f64,
}

/// A stored insight snapshot.
///
/// Entries written before ids and timestamps were assigned decode with a nil
/// id and the Unix epoch as `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AiInsight {
    #[serde(default)]
    pub id: Uuid,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    pub insights: Vec<String>,
    pub suggested_schedule: Vec<ScheduleItem>,
    pub productivity_score: f64,
}

impl AiInsight {
    pub fn from_generated(generated: GeneratedInsight) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            insights: generated.insights,
            suggested_schedule: generated.suggested_schedule,
            productivity_score: generated.productivity_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_through_from_str() {
        for theme in Theme::ALL {
            assert_eq!(theme.as_str().parse::<Theme>().unwrap(), *theme);
        }
        let err = "Neon".parse::<Theme>().unwrap_err();
        assert_eq!(err.to_string(), "'Neon' is not a valid Theme");
    }

    #[test]
    fn labels_default_to_the_neutral_variant() {
        assert_eq!(Mood::default(), Mood::Okay);
        assert_eq!(Priority::default(), Priority::Medium);
        assert_eq!(Category::default(), Category::Other);
        assert_eq!(TaskStatus::default(), TaskStatus::Pending);
        assert_eq!(Theme::default(), Theme::Ocean);
    }

    #[test]
    fn first_name_falls_back_to_user() {
        let mut user = User::new(UserId::new("abc"));
        assert_eq!(user.first_name(), "User");
        user.full_name = Some("  Ada Lovelace".to_string());
        assert_eq!(user.first_name(), "Ada");
        user.full_name = Some("   ".to_string());
        assert_eq!(user.first_name(), "User");
    }

    #[test]
    fn profile_update_accepts_frontend_field_names() {
        let update: ProfileUpdate = serde_json::from_str(
            r#"{"name":"Ada","goals":["Pass calculus"],"examDates":[{"subject":"Math","date":"2026-12-01"}]}"#,
        )
        .unwrap();
        assert_eq!(update.full_name.as_deref(), Some("Ada"));
        assert_eq!(update.academic_goals.unwrap(), vec!["Pass calculus".to_string()]);
        assert_eq!(update.upcoming_exams.unwrap()[0].subject, "Math");
        assert!(ProfileUpdate::default().is_empty());
    }

    #[test]
    fn task_update_applies_only_present_fields() {
        let now = Utc::now();
        let mut task = Task {
            id: Uuid::new_v4(),
            uid: UserId::new("u1"),
            title: "Read chapter 3".to_string(),
            deadline: None,
            duration_mins: 30,
            priority: Priority::Low,
            category: Category::Study,
            status: TaskStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        TaskUpdate {
            priority: Some(Priority::Urgent),
            ..TaskUpdate::default()
        }
        .apply_to(&mut task);
        assert_eq!(task.priority, Priority::Urgent);
        assert_eq!(task.title, "Read chapter 3");
        assert_eq!(task.duration_mins, 30);
        assert!(TaskUpdate::default().is_empty());
        assert!(!TaskUpdate::status(TaskStatus::Completed).is_empty());
    }

    #[test]
    fn legacy_insight_without_id_decodes() {
        let insight: AiInsight = serde_json::from_str(
            r#"{"insights":["Sleep more"],"suggestedSchedule":[{"time":"09:00","activity":"Math"}],"productivityScore":64}"#,
        )
        .unwrap();
        assert!(insight.id.is_nil());
        assert_eq!(insight.productivity_score, 64.0);
        assert_eq!(insight.suggested_schedule[0].note, None);
    }
}
