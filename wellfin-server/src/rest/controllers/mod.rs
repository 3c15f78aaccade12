pub mod analyze;
pub mod notifications;
pub mod recommendations;
pub mod schedule;
pub mod system;

pub use analyze::AnalyzeController;
pub use notifications::NotificationsController;
pub use recommendations::RecommendationsController;
pub use schedule::ScheduleController;
pub use system::SystemController;
