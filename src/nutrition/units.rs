/// Map a free-form unit token onto the small vocabulary used for logging.
///
/// Unknown tokens are kept, lowercased.
pub fn normalize_unit(raw: &str) -> String {
    let token = raw.trim().to_lowercase();
    let canonical = match token.as_str() {
        "slice" | "slices" | "piece" | "pieces" => "slices",
        "large" | "medium" | "small" | "whole" | "egg" | "eggs" => "large",
        "cup" | "cups" | "c" => "cups",
        "tbsp" | "tablespoon" | "tablespoons" => "tbsp",
        "tsp" | "teaspoon" | "teaspoons" => "tsp",
        "oz" | "ounce" | "ounces" => "oz",
        "lb" | "lbs" | "pound" | "pounds" => "lbs",
        "g" | "gram" | "grams" => "g",
        "serving" | "servings" | "portion" | "portions" => "servings",
        _ => return token,
    };
    canonical.to_string()
}

/// Guess a unit from the food name when none was given.
pub fn infer_unit(food_name: &str) -> &'static str {
    let name = food_name.to_lowercase();
    if ["toast", "bread", "slice"].iter().any(|w| name.contains(w)) {
        "slices"
    } else if name.contains("egg") {
        "large"
    } else if ["cup", "milk", "juice"].iter().any(|w| name.contains(w)) {
        "cups"
    } else {
        "servings"
    }
}
