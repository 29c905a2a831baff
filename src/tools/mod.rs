pub mod args;
pub mod factory;
pub mod fitbit_get_profile;
pub mod fitbit_log_meal;
pub mod fitbit_login;
pub mod registry;
pub mod save_meal;
pub mod traits;
pub mod view_summary;

pub use factory::{default_registry, default_tools};
pub use fitbit_get_profile::FitbitGetProfileTool;
pub use fitbit_log_meal::{FitbitLogMealTool, REAUTH_SUGGESTION};
pub use fitbit_login::FitbitLoginTool;
pub use registry::ToolRegistry;
pub use save_meal::SaveMealTool;
pub use traits::{Tool, ToolResult, ToolSpec};
pub use view_summary::ViewSummaryTool;
