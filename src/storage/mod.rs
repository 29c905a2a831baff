//! Local meal history under the data directory.

pub mod store;

pub use store::{MealRecord, MealStore};
