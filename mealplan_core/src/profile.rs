//! User profile validation and the single-current-profile lifecycle.
//!
//! Each submission clears every stored profile and inserts the new one.
//! The two steps commit separately, so another process reading the store
//! file in between sees no profile at all; the last writer wins.

use crate::metrics::MetricsReport;
use crate::store::{RecordId, RecordStore, Stored};
use crate::{ActivityLevel, Error, Gender, Result, UserProfile};

/// Raw, unparsed profile fields as a caller collected them
#[derive(Clone, Debug, Default)]
pub struct ProfileInput {
    pub gender: String,
    pub age: String,
    pub weight: String,
    pub height: String,
    pub activity: String,
    /// Empty or absent means "not provided"
    pub body_fat: Option<String>,
}

impl ProfileInput {
    /// Parse and range-check every field
    pub fn validate(&self) -> Result<UserProfile> {
        let profile = UserProfile {
            gender: self.gender.parse::<Gender>()?,
            age: parse_field::<u32>("age", &self.age)?,
            weight_kg: parse_field::<f64>("weight", &self.weight)?,
            height_cm: parse_field::<f64>("height", &self.height)?,
            activity: self.activity.parse::<ActivityLevel>()?,
            body_fat_pct: match self.body_fat.as_deref().map(str::trim) {
                None | Some("") => None,
                Some(raw) => Some(parse_field::<f64>("body fat", raw)?),
            },
        };
        profile.validate()?;
        Ok(profile)
    }
}

fn parse_field<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| Error::Validation(format!("{} must be a number, got '{}'", name, raw.trim())))
}

impl UserProfile {
    /// Check the domain constraints the calculator relies on
    pub fn validate(&self) -> Result<()> {
        if self.age == 0 {
            return Err(Error::Validation("age must be positive".into()));
        }
        if !(self.weight_kg.is_finite() && self.weight_kg > 0.0) {
            return Err(Error::Validation(format!(
                "weight must be positive, got {}",
                self.weight_kg
            )));
        }
        if !(self.height_cm.is_finite() && self.height_cm > 0.0) {
            return Err(Error::Validation(format!(
                "height must be positive, got {}",
                self.height_cm
            )));
        }
        if let Some(bf) = self.body_fat_pct {
            if !(0.0..=100.0).contains(&bf) {
                return Err(Error::Validation(format!(
                    "body fat must be between 0 and 100, got {}",
                    bf
                )));
            }
        }
        Ok(())
    }
}

/// Make `profile` the only stored profile
pub fn submit_profile(store: &mut RecordStore, profile: UserProfile) -> Result<RecordId> {
    profile.validate()?;

    let cleared = store.delete_all::<UserProfile>()?;
    if cleared > 0 {
        tracing::debug!("Cleared {} previous profile(s)", cleared);
    }

    let id = store.insert(profile)?;
    tracing::info!("Stored profile {}", id);
    Ok(id)
}

/// The current profile, if one has been submitted
pub fn current_profile(store: &RecordStore) -> Option<&Stored<UserProfile>> {
    store.get_latest::<UserProfile>()
}

/// Metrics for the current profile
pub fn current_report(store: &RecordStore) -> Result<MetricsReport> {
    let profile = current_profile(store)
        .ok_or_else(|| Error::NotFound("no profile has been submitted".into()))?;
    Ok(MetricsReport::compute(&profile.record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::BmrFormula;

    fn input() -> ProfileInput {
        ProfileInput {
            gender: "male".into(),
            age: "30".into(),
            weight: "70".into(),
            height: "175".into(),
            activity: "1.55".into(),
            body_fat: None,
        }
    }

    #[test]
    fn test_validate_parses_fields() {
        let profile = input().validate().unwrap();
        assert_eq!(profile.gender, Gender::Male);
        assert_eq!(profile.age, 30);
        assert_eq!(profile.activity, ActivityLevel::Moderate);
        assert_eq!(profile.body_fat_pct, None);
    }

    #[test]
    fn test_empty_body_fat_is_absent() {
        let mut raw = input();
        raw.body_fat = Some("  ".into());
        assert_eq!(raw.validate().unwrap().body_fat_pct, None);

        raw.body_fat = Some("18.5".into());
        assert_eq!(raw.validate().unwrap().body_fat_pct, Some(18.5));
    }

    #[test]
    fn test_rejects_non_numeric() {
        let mut raw = input();
        raw.weight = "heavy".into();
        assert!(matches!(raw.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_rejects_out_of_domain() {
        for (field, value) in [("age", "0"), ("age", "-3"), ("weight", "0"), ("height", "-170")] {
            let mut raw = input();
            match field {
                "age" => raw.age = value.into(),
                "weight" => raw.weight = value.into(),
                _ => raw.height = value.into(),
            }
            assert!(
                matches!(raw.validate(), Err(Error::Validation(_))),
                "{}={} should be rejected",
                field,
                value
            );
        }

        let mut raw = input();
        raw.body_fat = Some("120".into());
        assert!(matches!(raw.validate(), Err(Error::Validation(_))));

        let mut raw = input();
        raw.activity = "1.3".into();
        assert!(matches!(raw.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_submit_keeps_single_profile() {
        let mut store = RecordStore::in_memory();
        submit_profile(&mut store, input().validate().unwrap()).unwrap();

        let mut second = input();
        second.age = "45".into();
        let id = submit_profile(&mut store, second.validate().unwrap()).unwrap();

        assert_eq!(store.len::<UserProfile>(), 1);
        let current = current_profile(&store).unwrap();
        assert_eq!(current.id, id);
        assert_eq!(current.record.age, 45);
    }

    #[test]
    fn test_submit_rejects_invalid_profile_without_clearing() {
        let mut store = RecordStore::in_memory();
        submit_profile(&mut store, input().validate().unwrap()).unwrap();

        let mut bad = input().validate().unwrap();
        bad.weight_kg = -1.0;
        assert!(submit_profile(&mut store, bad).is_err());
        assert_eq!(store.len::<UserProfile>(), 1);
    }

    #[test]
    fn test_current_report() {
        let mut store = RecordStore::in_memory();
        assert!(current_report(&store).unwrap_err().is_not_found());

        let mut raw = input();
        raw.body_fat = Some("20".into());
        submit_profile(&mut store, raw.validate().unwrap()).unwrap();

        let report = current_report(&store).unwrap();
        assert_eq!(report.bmr_formula, BmrFormula::BodyFat);
        assert_eq!(report.bmr, 1580.0);
    }
}
