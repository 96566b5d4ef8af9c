//! Core domain types for the meal planner.
//!
//! This module defines the fundamental types used throughout the system:
//! - User profiles and their categorical attributes
//! - Meals and their classifications
//! - Selection criteria for the meal selector

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Profile Types
// ============================================================================

/// Biological sex used by the BMR formula
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl FromStr for Gender {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" | "1" => Ok(Gender::Male),
            "female" | "f" | "2" => Ok(Gender::Female),
            other => Err(Error::Validation(format!("unknown gender '{}'", other))),
        }
    }
}

/// Activity level with its fixed multiplier
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Heavy,
    Athlete,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::Light,
        ActivityLevel::Moderate,
        ActivityLevel::Heavy,
        ActivityLevel::Athlete,
    ];

    /// Multiplier applied to BMR
    pub fn factor(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Heavy => 1.725,
            ActivityLevel::Athlete => 1.9,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Sedentary",
            ActivityLevel::Light => "Light Exercise",
            ActivityLevel::Moderate => "Moderate Exercise",
            ActivityLevel::Heavy => "Heavy Exercise",
            ActivityLevel::Athlete => "Athlete",
        }
    }

    /// Resolve a level from one of the five accepted factors
    pub fn from_factor(factor: f64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|level| (level.factor() - factor).abs() < 1e-9)
    }
}

impl FromStr for ActivityLevel {
    type Err = Error;

    /// Accepts either the level name or its numeric factor
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        if let Ok(factor) = s.parse::<f64>() {
            return Self::from_factor(factor).ok_or_else(|| {
                Error::Validation(format!(
                    "activity factor {} is not one of 1.2, 1.375, 1.55, 1.725, 1.9",
                    factor
                ))
            });
        }
        match s.as_str() {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "light" => Ok(ActivityLevel::Light),
            "moderate" => Ok(ActivityLevel::Moderate),
            "heavy" => Ok(ActivityLevel::Heavy),
            "athlete" => Ok(ActivityLevel::Athlete),
            other => Err(Error::Validation(format!("unknown activity level '{}'", other))),
        }
    }
}

/// Anthropometric data from a single submission
///
/// Construct through [`crate::ProfileInput::validate`] so the positivity
/// invariants hold.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub gender: Gender,
    pub age: u32,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub activity: ActivityLevel,
    pub body_fat_pct: Option<f64>,
}

// ============================================================================
// Meal Types
// ============================================================================

/// Slot of the day a meal is meant for
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MealCategory {
    Breakfast,
    Dinner,
    Supper,
}

impl MealCategory {
    pub const ALL: [MealCategory; 3] = [
        MealCategory::Breakfast,
        MealCategory::Dinner,
        MealCategory::Supper,
    ];
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Rough health rating of a meal
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum HealthLevel {
    Unhealthy,
    Medium,
    Healthy,
}

macro_rules! keyword_enum {
    ($ty:ident { $($variant:ident => $word:literal),+ $(,)? }) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let word = match self {
                    $($ty::$variant => $word),+
                };
                f.pad(word)
            }
        }

        impl FromStr for $ty {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($word => Ok($ty::$variant),)+
                    other => Err(Error::Validation(format!(
                        "unknown {} '{}'",
                        stringify!($ty),
                        other
                    ))),
                }
            }
        }
    };
}

keyword_enum!(MealCategory {
    Breakfast => "breakfast",
    Dinner => "dinner",
    Supper => "supper",
});

keyword_enum!(Difficulty {
    Easy => "easy",
    Medium => "medium",
    Hard => "hard",
});

keyword_enum!(HealthLevel {
    Unhealthy => "unhealthy",
    Medium => "medium",
    Healthy => "healthy",
});

/// A catalog meal
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Meal {
    pub name: String,
    /// Recipe reference, usually a URL
    pub reference: String,
    pub kcal: f64,
    pub category: MealCategory,
    pub difficulty: Difficulty,
    pub health: HealthLevel,
}

// ============================================================================
// Selection Types
// ============================================================================

/// Inclusive energy range in kilocalories
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct KcalRange {
    pub min: f64,
    pub max: f64,
}

impl KcalRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Range `[0, max]`
    pub fn up_to(max: f64) -> Self {
        Self { min: 0.0, max }
    }

    pub fn contains(&self, kcal: f64) -> bool {
        self.min <= kcal && kcal <= self.max
    }
}

/// Filter for the meal selector; every provided field must match
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MealCriteria {
    pub energy: KcalRange,
    pub category: Option<MealCategory>,
    pub difficulty: Option<Difficulty>,
    pub health: Option<HealthLevel>,
}

impl MealCriteria {
    /// Criteria with only an energy range
    pub fn within(energy: KcalRange) -> Self {
        Self {
            energy,
            category: None,
            difficulty: None,
            health: None,
        }
    }

    pub fn with_category(mut self, category: MealCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    pub fn with_health(mut self, health: HealthLevel) -> Self {
        self.health = Some(health);
        self
    }

    /// Check a meal against every provided filter
    pub fn matches(&self, meal: &Meal) -> bool {
        self.energy.contains(meal.kcal)
            && self.category.map_or(true, |c| c == meal.category)
            && self.difficulty.map_or(true, |d| d == meal.difficulty)
            && self.health.map_or(true, |h| h == meal.health)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meal(kcal: f64, category: MealCategory) -> Meal {
        Meal {
            name: "Test".into(),
            reference: "https://example.com".into(),
            kcal,
            category,
            difficulty: Difficulty::Easy,
            health: HealthLevel::Healthy,
        }
    }

    #[test]
    fn test_activity_from_factor() {
        assert_eq!(ActivityLevel::from_factor(1.55), Some(ActivityLevel::Moderate));
        assert_eq!(ActivityLevel::from_factor(1.9), Some(ActivityLevel::Athlete));
        assert_eq!(ActivityLevel::from_factor(1.5), None);
    }

    #[test]
    fn test_activity_parses_name_or_factor() {
        assert_eq!("light".parse::<ActivityLevel>().unwrap(), ActivityLevel::Light);
        assert_eq!("1.725".parse::<ActivityLevel>().unwrap(), ActivityLevel::Heavy);
        assert!("1.3".parse::<ActivityLevel>().is_err());
        assert!("lazy".parse::<ActivityLevel>().is_err());
    }

    #[test]
    fn test_labels() {
        assert_eq!(Gender::Female.label(), "Female");
        assert_eq!(ActivityLevel::Light.label(), "Light Exercise");
    }

    #[test]
    fn test_keyword_enums_parse_and_display() {
        assert_eq!("Dinner".parse::<MealCategory>().unwrap(), MealCategory::Dinner);
        assert_eq!(" hard ".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!(HealthLevel::Unhealthy.to_string(), "unhealthy");
        assert!(matches!(
            "brunch".parse::<MealCategory>(),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_range_is_inclusive() {
        let range = KcalRange::new(300.0, 400.0);
        assert!(range.contains(300.0));
        assert!(range.contains(400.0));
        assert!(!range.contains(400.5));
        assert!(!range.contains(299.9));
    }

    #[test]
    fn test_criteria_conjunction() {
        let m = meal(350.0, MealCategory::Breakfast);

        assert!(MealCriteria::within(KcalRange::up_to(400.0)).matches(&m));
        assert!(MealCriteria::within(KcalRange::up_to(400.0))
            .with_category(MealCategory::Breakfast)
            .with_health(HealthLevel::Healthy)
            .matches(&m));
        assert!(!MealCriteria::within(KcalRange::up_to(400.0))
            .with_category(MealCategory::Supper)
            .matches(&m));
        assert!(!MealCriteria::within(KcalRange::up_to(400.0))
            .with_difficulty(Difficulty::Hard)
            .matches(&m));
        assert!(!MealCriteria::within(KcalRange::up_to(300.0)).matches(&m));
    }
}
