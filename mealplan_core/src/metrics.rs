//! Body-metric calculations.
//!
//! All functions are pure and total over their documented domain; callers
//! validate inputs first (see [`crate::ProfileInput`]).
//!
//! BMI uses the centimetre form `weight / height² × 10⁴`. The variant
//! `weight / (height / 100**2)` divides by the wrong quantity and is not
//! supported.

use crate::{Gender, UserProfile};
use serde::{Deserialize, Serialize};

/// BMI class boundaries, checked in order; first match wins.
pub const UNDERWEIGHT_MAX: f64 = 18.5;
pub const NORMAL_MAX: f64 = 24.99;
pub const OBESE_MIN: f64 = 30.0;

/// BMI classification
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn label(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal Weight",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        }
    }
}

/// Which BMR formula produced a report
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BmrFormula {
    /// Mifflin-St Jeor
    Standard,
    /// Katch-McArdle, needs body fat
    BodyFat,
}

/// Body mass index from kilograms and centimetres, rounded to 1 decimal
pub fn bmi(weight_kg: f64, height_cm: f64) -> f64 {
    let raw = weight_kg / height_cm.powi(2) * 10_000.0;
    (raw * 10.0).round() / 10.0
}

/// Classify a BMI value
///
/// Partition: `≤ 18.5` Underweight, `≤ 24.99` Normal, `< 30` Overweight,
/// everything else Obese. The gap between 29.99 and 30 falls to Overweight.
pub fn classify_bmi(bmi: f64) -> BmiCategory {
    if bmi <= UNDERWEIGHT_MAX {
        BmiCategory::Underweight
    } else if bmi <= NORMAL_MAX {
        BmiCategory::Normal
    } else if bmi < OBESE_MIN {
        BmiCategory::Overweight
    } else {
        BmiCategory::Obese
    }
}

/// Mifflin-St Jeor basal metabolic rate
pub fn bmr_standard(weight_kg: f64, height_cm: f64, age: u32, gender: Gender) -> f64 {
    let offset = match gender {
        Gender::Male => 5.0,
        Gender::Female => -161.0,
    };
    10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age) + offset
}

/// Katch-McArdle basal metabolic rate, rounded to the nearest kcal
pub fn bmr_bodyfat(weight_kg: f64, bodyfat_pct: f64) -> i64 {
    let lean_mass = (1.0 - bodyfat_pct / 100.0) * weight_kg;
    (370.0 + 21.6 * lean_mass).round() as i64
}

/// Daily calorie estimate
pub fn calories(bmr: f64, activity_factor: f64) -> f64 {
    bmr * activity_factor
}

/// Everything derived from one profile
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MetricsReport {
    pub bmi: f64,
    pub category: BmiCategory,
    pub bmr: f64,
    pub bmr_formula: BmrFormula,
    pub calories: f64,
}

impl MetricsReport {
    /// Compute the report; body fat, when present, selects Katch-McArdle
    pub fn compute(profile: &UserProfile) -> Self {
        let bmi = bmi(profile.weight_kg, profile.height_cm);

        let (bmr, bmr_formula) = match profile.body_fat_pct {
            Some(bf) => (bmr_bodyfat(profile.weight_kg, bf) as f64, BmrFormula::BodyFat),
            None => (
                bmr_standard(profile.weight_kg, profile.height_cm, profile.age, profile.gender),
                BmrFormula::Standard,
            ),
        };

        let report = Self {
            bmi,
            category: classify_bmi(bmi),
            bmr,
            bmr_formula,
            calories: calories(bmr, profile.activity.factor()),
        };

        tracing::debug!(
            "Computed metrics: bmi={} ({:?}), bmr={} via {:?}, calories={:.0}",
            report.bmi,
            report.category,
            report.bmr,
            report.bmr_formula,
            report.calories
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ActivityLevel;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn profile(body_fat_pct: Option<f64>) -> UserProfile {
        UserProfile {
            gender: Gender::Male,
            age: 30,
            weight_kg: 70.0,
            height_cm: 175.0,
            activity: ActivityLevel::Moderate,
            body_fat_pct,
        }
    }

    #[test]
    fn test_bmi_centimetre_formula() {
        assert!(approx(bmi(70.0, 175.0), 22.9));
        assert!(approx(bmi(50.0, 180.0), 15.4));
        assert!(approx(bmi(100.0, 170.0), 34.6));
    }

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify_bmi(18.5), BmiCategory::Underweight);
        assert_eq!(classify_bmi(18.6), BmiCategory::Normal);
        assert_eq!(classify_bmi(24.99), BmiCategory::Normal);
        assert_eq!(classify_bmi(25.0), BmiCategory::Overweight);
        assert_eq!(classify_bmi(29.995), BmiCategory::Overweight);
        assert_eq!(classify_bmi(30.0), BmiCategory::Obese);
    }

    #[test]
    fn test_bmr_standard() {
        assert!(approx(bmr_standard(70.0, 175.0, 30, Gender::Male), 1648.75));
        assert!(approx(bmr_standard(70.0, 175.0, 30, Gender::Female), 1482.75));
    }

    #[test]
    fn test_bmr_bodyfat_rounds() {
        assert_eq!(bmr_bodyfat(70.0, 20.0), 1580);
        assert_eq!(bmr_bodyfat(80.0, 0.0), 2098);
    }

    #[test]
    fn test_calories() {
        assert!(approx(calories(1000.0, 1.2), 1200.0));
    }

    #[test]
    fn test_report_uses_standard_without_bodyfat() {
        let report = MetricsReport::compute(&profile(None));
        assert_eq!(report.bmr_formula, BmrFormula::Standard);
        assert!(approx(report.bmr, 1648.75));
        assert!(approx(report.calories, 1648.75 * 1.55));
        assert_eq!(report.category, BmiCategory::Normal);
    }

    #[test]
    fn test_report_uses_bodyfat_formula() {
        let report = MetricsReport::compute(&profile(Some(20.0)));
        assert_eq!(report.bmr_formula, BmrFormula::BodyFat);
        assert!(approx(report.bmr, 1580.0));
        assert!(approx(report.calories, 1580.0 * 1.55));
    }
}
