//! crates/studentflow_core/src/dashboard.rs
//!
//! Weekly dashboard aggregation: task counts, 7-log averages, week-over-week
//! study change and the chart series.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{DailyLog, Task, UserId};
use crate::ports::{DatabaseService, PortResult};

/// Number of most recent logs that make up "this week".
pub const WINDOW_LOGS: usize = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StudyPoint {
    pub date: NaiveDate,
    pub study_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ScreenPoint {
    pub date: NaiveDate,
    pub screen_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct WellbeingPoint {
    pub date: NaiveDate,
    pub wellbeing_score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DashboardSummary {
    pub first_name: String,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    /// Two decimals.
    pub avg_study_hours: f64,
    /// One decimal.
    pub avg_wellbeing: f64,
    /// 0..=100.
    pub productivity_score: u32,
    /// Percent, two decimals.
    pub productivity_change: f64,
    /// Chronological (oldest first).
    pub study_past_7_days: Vec<StudyPoint>,
    pub screen_past_7_days: Vec<ScreenPoint>,
    pub wellbeing_past_7_days: Vec<WellbeingPoint>,
}

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn mean(values: impl ExactSizeIterator<Item = f64>) -> f64 {
    let count = values.len();
    if count == 0 {
        return 0.0;
    }
    values.sum::<f64>() / count as f64
}

/// Percentage change from `previous` to `current`. A rise from nothing counts
/// as +100%, and nothing to nothing as 0%.
pub fn percentage_change(previous: f64, current: f64) -> f64 {
    if previous == 0.0 {
        if current > 0.0 {
            100.0
        } else {
            0.0
        }
    } else {
        round_to((current - previous) / previous * 100.0, 2)
    }
}

/// Summarizes a user's tasks and up to 14 logs ordered newest first.
///
/// The first 7 logs form the current window, logs 8 to 14 the previous one.
/// Days without a log are simply absent from the averages.
pub fn summarize(first_name: &str, tasks: &[Task], logs_newest_first: &[DailyLog]) -> DashboardSummary {
    let current = &logs_newest_first[..logs_newest_first.len().min(WINDOW_LOGS)];
    let previous: Vec<&DailyLog> = logs_newest_first
        .iter()
        .skip(WINDOW_LOGS)
        .take(WINDOW_LOGS)
        .collect();

    let avg_study_hours = round_to(mean(current.iter().map(|log| log.study_hours)), 2);
    let avg_wellbeing = round_to(
        mean(current.iter().map(|log| f64::from(log.wellbeing_score))),
        1,
    );
    let productivity_score = (avg_wellbeing * 10.0).round().clamp(0.0, 100.0) as u32;

    let current_study: f64 = current.iter().map(|log| log.study_hours).sum();
    let previous_study: f64 = previous.iter().map(|log| log.study_hours).sum();

    let chronological = || current.iter().rev();

    DashboardSummary {
        first_name: first_name.to_string(),
        total_tasks: tasks.len(),
        completed_tasks: tasks.iter().filter(|task| task.is_completed()).count(),
        avg_study_hours,
        avg_wellbeing,
        productivity_score,
        productivity_change: percentage_change(previous_study, current_study),
        study_past_7_days: chronological()
            .map(|log| StudyPoint {
                date: log.log_date,
                study_hours: log.study_hours,
            })
            .collect(),
        screen_past_7_days: chronological()
            .map(|log| ScreenPoint {
                date: log.log_date,
                screen_hours: log.screen_hours,
            })
            .collect(),
        wellbeing_past_7_days: chronological()
            .map(|log| WellbeingPoint {
                date: log.log_date,
                wellbeing_score: log.wellbeing_score,
            })
            .collect(),
    }
}

/// Loads everything the dashboard needs for `uid` and summarizes it.
pub async fn build_dashboard(db: &dyn DatabaseService, uid: &UserId) -> PortResult<DashboardSummary> {
    let user = db.get_user(uid).await?;
    let tasks = db.list_tasks(uid).await?;
    let logs = db.recent_daily_logs(uid, WINDOW_LOGS * 2).await?;
    Ok(summarize(user.first_name(), &tasks, &logs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, Mood, Priority, TaskStatus};
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    /// Logs for consecutive days ending on 2026-10-14, returned newest first.
    /// `study` is given oldest first, the way a user would enter a week.
    fn logs(study: &[f64], wellbeing: u8) -> Vec<DailyLog> {
        let last = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let start = last - Duration::days(study.len() as i64 - 1);
        let mut logs: Vec<DailyLog> = study
            .iter()
            .enumerate()
            .map(|(i, hours)| DailyLog {
                uid: UserId::new("u1"),
                log_date: start + Duration::days(i as i64),
                felt_today: Mood::Good,
                study_hours: *hours,
                screen_hours: 1.0 + i as f64,
                exercise_minutes: 0,
                wake_up_time: None,
                sleep_time: None,
                wellbeing_score: wellbeing,
            })
            .collect();
        logs.reverse();
        logs
    }

    fn task(status: TaskStatus) -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            uid: UserId::new("u1"),
            title: "Essay".to_string(),
            deadline: None,
            duration_mins: 45,
            priority: Priority::High,
            category: Category::Study,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn empty_window_reports_zeroes_but_counts_tasks() {
        let tasks = vec![task(TaskStatus::Completed), task(TaskStatus::Pending)];
        let summary = summarize("Ada", &tasks, &[]);
        assert_eq!(summary.total_tasks, 2);
        assert_eq!(summary.completed_tasks, 1);
        assert_eq!(summary.avg_study_hours, 0.0);
        assert_eq!(summary.avg_wellbeing, 0.0);
        assert_eq!(summary.productivity_score, 0);
        assert_eq!(summary.productivity_change, 0.0);
        assert!(summary.study_past_7_days.is_empty());
    }

    #[test]
    fn single_log_average_keeps_two_decimals() {
        let summary = summarize("Ada", &[], &logs(&[4.2], 6));
        assert_eq!(summary.avg_study_hours, 4.2);
        assert_eq!(summary.avg_wellbeing, 6.0);
        assert_eq!(summary.productivity_score, 60);
        assert_eq!(summary.productivity_change, 100.0);
    }

    #[test]
    fn percentage_change_edge_cases() {
        assert_eq!(percentage_change(0.0, 5.0), 100.0);
        assert_eq!(percentage_change(0.0, 0.0), 0.0);
        assert_eq!(percentage_change(10.0, 15.0), 50.0);
        assert_eq!(percentage_change(12.0, 8.0), -33.33);
        assert_eq!(percentage_change(3.0, 4.0), 33.33);
    }

    #[test]
    fn two_weeks_of_logs() {
        // Previous week sums to 10, this week to 20.
        let mut study = vec![1.0, 2.0, 1.0, 2.0, 1.0, 2.0, 1.0];
        study.extend([2.0, 3.0, 4.0, 2.0, 5.0, 1.0, 3.0]);
        let summary = summarize("Ada", &[], &logs(&study, 7));

        assert_eq!(summary.avg_study_hours, 2.86);
        assert_eq!(summary.productivity_change, 100.0);
        assert_eq!(summary.productivity_score, 70);

        let trend: Vec<f64> = summary.study_past_7_days.iter().map(|p| p.study_hours).collect();
        assert_eq!(trend, vec![2.0, 3.0, 4.0, 2.0, 5.0, 1.0, 3.0]);
        let dates: Vec<NaiveDate> = summary.screen_past_7_days.iter().map(|p| p.date).collect();
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(summary.wellbeing_past_7_days.len(), 7);
    }

    #[test]
    fn logs_beyond_fourteen_are_ignored() {
        let mut study = vec![50.0; 3];
        study.extend([1.0; 14]);
        let summary = summarize("Ada", &[], &logs(&study, 5));
        assert_eq!(summary.productivity_change, 0.0);
    }

    #[test]
    fn wellbeing_average_rounds_to_one_decimal() {
        let mut week = logs(&[1.0, 1.0, 1.0], 8);
        week[0].wellbeing_score = 7;
        let summary = summarize("Ada", &[], &week);
        assert_eq!(summary.avg_wellbeing, 7.7);
        assert_eq!(summary.productivity_score, 77);
    }
}
