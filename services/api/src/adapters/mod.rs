pub mod db;
pub mod identity;
pub mod insights_llm;

pub use db::DbAdapter;
pub use identity::FirebaseIdentityAdapter;
pub use insights_llm::OpenAiInsightsAdapter;
