use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(rename = "cookingTimeMinutes", default)]
    pub cooking_time_minutes: Option<u32>,
}

impl Recipe {
    pub fn cooking_time_display(&self) -> String {
        match self.cooking_time_minutes {
            Some(m) if m >= 60 && m % 60 == 0 => format!("{}h", m / 60),
            Some(m) if m >= 60 => format!("{}h {}m", m / 60, m % 60),
            Some(m) => format!("{}m", m),
            None => "-".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RecipeRequest<'a> {
    #[serde(rename = "foodIds")]
    pub food_ids: &'a [i64],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recipe_with_missing_fields() {
        let recipe: Recipe =
            serde_json::from_str(r#"{"title": "Spinach omelette", "ingredients": ["egg", "spinach"]}"#)
                .expect("Failed to parse recipe JSON");
        assert_eq!(recipe.ingredients.len(), 2);
        assert!(recipe.steps.is_empty());
        assert_eq!(recipe.cooking_time_display(), "-");
    }

    #[test]
    fn test_cooking_time_display() {
        let mut recipe: Recipe = serde_json::from_str(r#"{"title": "Stew"}"#).unwrap();
        recipe.cooking_time_minutes = Some(25);
        assert_eq!(recipe.cooking_time_display(), "25m");
        recipe.cooking_time_minutes = Some(120);
        assert_eq!(recipe.cooking_time_display(), "2h");
        recipe.cooking_time_minutes = Some(95);
        assert_eq!(recipe.cooking_time_display(), "1h 35m");
    }
}
