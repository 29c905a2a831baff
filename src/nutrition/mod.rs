//! Meal input normalization: loose numbers, unit tokens and meal objects.

pub mod meal;
pub mod number;
pub mod units;

pub use meal::{CanonicalFoodItem, CanonicalMeal, MealCategory, normalize_meal};
pub use number::{NumericField, parse_number};
pub use units::{infer_unit, normalize_unit};
