use super::{
    FitbitGetProfileTool, FitbitLogMealTool, FitbitLoginTool, SaveMealTool, Tool, ToolRegistry,
    ViewSummaryTool,
};
use crate::auth::CredentialStore;
use crate::config::Config;
use crate::fitbit::{FitbitAuthenticator, FitbitClient};
use crate::storage::MealStore;
use std::sync::Arc;

/// Create the full meal-logging tool set.
pub fn default_tools(config: &Config, credentials: &Arc<CredentialStore>) -> Vec<Box<dyn Tool>> {
    let client = FitbitClient::new(&config.fitbit.api_base);
    let meals = MealStore::new(config.meals_dir());

    vec![
        Box::new(FitbitLoginTool::new(FitbitAuthenticator::new(
            config.fitbit.clone(),
            Arc::clone(credentials),
        ))),
        Box::new(FitbitLogMealTool::new(client.clone(), Arc::clone(credentials))),
        Box::new(FitbitGetProfileTool::new(client, Arc::clone(credentials))),
        Box::new(SaveMealTool::new(meals.clone())),
        Box::new(ViewSummaryTool::new(meals)),
    ]
}

pub fn default_registry(config: &Config, credentials: &Arc<CredentialStore>) -> ToolRegistry {
    ToolRegistry::with_tools(default_tools(config, credentials))
}
