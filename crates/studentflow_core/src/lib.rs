pub mod dashboard;
pub mod domain;
pub mod insights;
pub mod lenient;
pub mod memory;
pub mod ports;
pub mod wellbeing;

pub use dashboard::{build_dashboard, summarize, DashboardSummary};
pub use domain::{
    AiInsight, Category, DailyLog, Exam, GeneratedInsight, Mood, NewTask, Priority,
    ProfileUpdate, ScheduleItem, Task, TaskStatus, TaskUpdate, Theme, User, UserId,
};
pub use memory::InMemoryDatabase;
pub use ports::{
    DatabaseService, IdentityService, InsightGenerationService, PortError, PortResult,
};
pub use wellbeing::{score_daily_log, wellbeing_score, HabitInput};
