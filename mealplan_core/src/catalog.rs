//! Meal catalog: the built-in table, CSV loading, and seeding into a store.

use crate::store::{RecordId, RecordStore};
use crate::types::*;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// The set of meals available for selection
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MealCatalog {
    pub meals: Vec<Meal>,
}

/// Cached default catalog
static DEFAULT_CATALOG: Lazy<MealCatalog> = Lazy::new(build_default_catalog_internal);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static MealCatalog {
    &DEFAULT_CATALOG
}

/// Builds a fresh copy of the default catalog
///
/// Prefer `get_default_catalog()` unless an owned, modifiable copy is needed.
pub fn build_default_catalog() -> MealCatalog {
    build_default_catalog_internal()
}

fn meal(
    name: &str,
    reference: &str,
    kcal: f64,
    category: MealCategory,
    difficulty: Difficulty,
    health: HealthLevel,
) -> Meal {
    Meal {
        name: name.into(),
        reference: reference.into(),
        kcal,
        category,
        difficulty,
        health,
    }
}

fn build_default_catalog_internal() -> MealCatalog {
    use Difficulty::*;
    use MealCategory::*;

    let meals = vec![
        // ====================================================================
        // Breakfast
        // ====================================================================
        meal(
            "Scrambled Eggs",
            "https://www.bbcgoodfood.com/recipes/perfect-scrambled-eggs-recipe",
            405.0,
            Breakfast,
            Easy,
            HealthLevel::Healthy,
        ),
        meal(
            "Avocado Toast",
            "https://cookieandkate.com/avocado-toast-recipe/",
            330.0,
            Breakfast,
            Easy,
            HealthLevel::Healthy,
        ),
        meal(
            "English Breakfast",
            "https://iamafoodblog.com/a-breakdown-of-the-full-english-breakfast/",
            780.0,
            Breakfast,
            Medium,
            HealthLevel::Unhealthy,
        ),
        // ====================================================================
        // Dinner
        // ====================================================================
        meal(
            "Fried Chicken",
            "https://cooking.nytimes.com/guides/25-how-to-make-fried-chicken",
            600.0,
            Dinner,
            Medium,
            HealthLevel::Unhealthy,
        ),
        meal(
            "Spaghetti Bolognese",
            "https://www.bbcgoodfood.com/recipes/best-spaghetti-bolognese-recipe",
            550.0,
            Dinner,
            Medium,
            HealthLevel::Medium,
        ),
        meal(
            "Sushi",
            "https://www.justonecookbook.com/ultimate-sushi-guide/",
            400.0,
            Dinner,
            Hard,
            HealthLevel::Healthy,
        ),
        meal(
            "Curry",
            "https://curryculture.co.uk/types-of-curry/",
            630.0,
            Dinner,
            Medium,
            HealthLevel::Medium,
        ),
        // ====================================================================
        // Supper
        // ====================================================================
        meal(
            "Salmon Salad",
            "https://www.wyseguide.com/roasted-vegetable-salmon-salad/",
            340.0,
            Supper,
            Easy,
            HealthLevel::Healthy,
        ),
        meal(
            "Cereal",
            "https://www.allrecipes.com/recipe/44162/homemade-cereal/",
            440.0,
            Supper,
            Easy,
            HealthLevel::Medium,
        ),
        meal(
            "Prawn Soup",
            "https://en.wikipedia.org/wiki/Prawn_soup",
            470.0,
            Supper,
            Medium,
            HealthLevel::Healthy,
        ),
    ];

    MealCatalog { meals }
}

/// A row of a catalog CSV file
#[derive(Debug, Deserialize)]
struct CsvRow {
    name: String,
    reference: String,
    kcal: f64,
    category: MealCategory,
    difficulty: Difficulty,
    health: HealthLevel,
}

impl From<CsvRow> for Meal {
    fn from(row: CsvRow) -> Self {
        Meal {
            name: row.name,
            reference: row.reference,
            kcal: row.kcal,
            category: row.category,
            difficulty: row.difficulty,
            health: row.health,
        }
    }
}

/// Load a catalog from a CSV file with header
/// `name,reference,kcal,category,difficulty,health`
pub fn load_catalog_csv(path: &Path) -> Result<MealCatalog> {
    let file = std::fs::File::open(path)?;
    let catalog = read_catalog_csv(file)?;
    tracing::info!("Loaded {} meals from {:?}", catalog.meals.len(), path);
    Ok(catalog)
}

/// Parse catalog CSV from any reader
pub fn read_catalog_csv<R: Read>(reader: R) -> Result<MealCatalog> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let meals = csv_reader
        .deserialize::<CsvRow>()
        .map(|row| row.map(Meal::from))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(MealCatalog { meals })
}

impl MealCatalog {
    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.meals.is_empty() {
            errors.push("Catalog has no meals".to_string());
            return errors;
        }

        for (idx, meal) in self.meals.iter().enumerate() {
            if meal.name.trim().is_empty() {
                errors.push(format!("Meal #{} has empty name", idx + 1));
            }
            if !(meal.kcal.is_finite() && meal.kcal > 0.0) {
                errors.push(format!(
                    "Meal '{}' has non-positive energy {}",
                    meal.name, meal.kcal
                ));
            }
        }

        for category in MealCategory::ALL {
            if !self.meals.iter().any(|m| m.category == category) {
                errors.push(format!("Catalog has no {} meals", category));
            }
        }

        errors
    }
}

/// Replace the store's meals with the catalog
///
/// The catalog is validated first; an invalid catalog leaves the store
/// untouched.
pub fn seed_catalog(store: &mut RecordStore, catalog: &MealCatalog) -> Result<Vec<RecordId>> {
    let errors = catalog.validate();
    if !errors.is_empty() {
        return Err(Error::CatalogValidation(errors.join("; ")));
    }

    let ids = store.replace_all(catalog.meals.iter().cloned())?;
    tracing::info!("Seeded catalog with {} meals", ids.len());
    Ok(ids)
}

/// Seed only when the store holds no meals yet; returns whether it seeded
///
/// `load` runs only when seeding is needed, so an already seeded store
/// never touches the catalog source.
pub fn ensure_seeded<F>(store: &mut RecordStore, load: F) -> Result<bool>
where
    F: FnOnce() -> Result<MealCatalog>,
{
    if !store.is_empty::<Meal>() {
        return Ok(false);
    }
    seed_catalog(store, &load()?)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_loads() {
        let catalog = build_default_catalog();
        assert_eq!(catalog.meals.len(), 10);
    }

    #[test]
    fn test_default_catalog_validates() {
        let errors = get_default_catalog().validate();
        assert!(
            errors.is_empty(),
            "Default catalog has validation errors: {:?}",
            errors
        );
    }

    #[test]
    fn test_every_category_present() {
        let catalog = get_default_catalog();
        for category in MealCategory::ALL {
            let count = catalog.meals.iter().filter(|m| m.category == category).count();
            assert!(count >= 3, "Should have at least 3 {} meals", category);
        }
    }

    #[test]
    fn test_validate_flags_problems() {
        let mut catalog = build_default_catalog();
        catalog.meals.retain(|m| m.category != MealCategory::Supper);
        catalog.meals[0].kcal = 0.0;
        catalog.meals[1].name = " ".into();

        let errors = catalog.validate();
        assert_eq!(errors.len(), 3, "{:?}", errors);
        assert!(errors.iter().any(|e| e.contains("supper")));
    }

    #[test]
    fn test_read_catalog_csv() {
        let data = "\
name,reference,kcal,category,difficulty,health
Porridge, https://example.com/porridge, 250, breakfast, easy, healthy
Lasagne,https://example.com/lasagne,720,dinner,hard,unhealthy
";
        let catalog = read_catalog_csv(data.as_bytes()).unwrap();
        assert_eq!(catalog.meals.len(), 2);
        assert_eq!(catalog.meals[0].reference, "https://example.com/porridge");
        assert_eq!(catalog.meals[1].difficulty, Difficulty::Hard);
        assert_eq!(catalog.meals[1].health, HealthLevel::Unhealthy);
    }

    #[test]
    fn test_read_catalog_csv_rejects_unknown_category() {
        let data = "name,reference,kcal,category,difficulty,health\nX,y,100,brunch,easy,healthy\n";
        assert!(matches!(read_catalog_csv(data.as_bytes()), Err(Error::Csv(_))));
    }

    #[test]
    fn test_seed_replaces_prior_meals() {
        let mut store = RecordStore::in_memory();
        seed_catalog(&mut store, get_default_catalog()).unwrap();
        seed_catalog(&mut store, get_default_catalog()).unwrap();
        assert_eq!(store.len::<Meal>(), 10);
    }

    #[test]
    fn test_seed_rejects_invalid_catalog() {
        let mut store = RecordStore::in_memory();
        let result = seed_catalog(&mut store, &MealCatalog::default());
        assert!(matches!(result, Err(Error::CatalogValidation(_))));
        assert!(store.is_empty::<Meal>());
    }

    #[test]
    fn test_ensure_seeded_only_once() {
        let mut store = RecordStore::in_memory();
        assert!(ensure_seeded(&mut store, || Ok(build_default_catalog())).unwrap());
        let first_ids: Vec<_> = store.query::<Meal, _>(|_| true).iter().map(|m| m.id).collect();
        assert!(!ensure_seeded(&mut store, || Ok(build_default_catalog())).unwrap());
        let second_ids: Vec<_> = store.query::<Meal, _>(|_| true).iter().map(|m| m.id).collect();
        assert_eq!(first_ids, second_ids);
    }

    #[test]
    fn test_ensure_seeded_skips_loader_when_seeded() {
        let mut store = RecordStore::in_memory();
        seed_catalog(&mut store, get_default_catalog()).unwrap();

        let seeded = ensure_seeded(&mut store, || {
            load_catalog_csv(Path::new("/nonexistent/meals.csv"))
        })
        .unwrap();
        assert!(!seeded);
        assert_eq!(store.len::<Meal>(), 10);
    }

    #[test]
    fn test_ensure_seeded_propagates_loader_error_on_empty_store() {
        let mut store = RecordStore::in_memory();
        let result = ensure_seeded(&mut store, || {
            load_catalog_csv(Path::new("/nonexistent/meals.csv"))
        });
        assert!(matches!(result, Err(Error::Io(_))));
        assert!(store.is_empty::<Meal>());
    }
}
