use mealplan_core::catalog::{ensure_seeded, MealCatalog};
use mealplan_core::config::DataConfig;
use mealplan_core::metrics::BmrFormula;
use mealplan_core::*;
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "mealplan")]
#[command(about = "Body metrics and meal recommendation tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Seed for meal selection (reproducible picks)
    #[arg(long, global = true)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit body measurements and show the metrics report
    Profile {
        /// male or female
        #[arg(long)]
        gender: String,

        /// Age in years
        #[arg(long)]
        age: String,

        /// Weight in kg
        #[arg(long)]
        weight: String,

        /// Height in cm
        #[arg(long)]
        height: String,

        /// sedentary, light, moderate, heavy, athlete (or 1.2 .. 1.9)
        #[arg(long)]
        activity: String,

        /// Body fat percentage; switches to the lean-mass BMR formula
        #[arg(long)]
        body_fat: Option<String>,
    },

    /// Show the metrics report for the current profile
    Report,

    /// Recommend a single meal
    Meal {
        /// Minimum energy (kcal)
        #[arg(long, default_value_t = 0.0)]
        min_kcal: f64,

        /// Maximum energy (kcal)
        #[arg(long)]
        max_kcal: f64,

        /// breakfast, dinner or supper
        #[arg(long)]
        category: Option<MealCategory>,

        /// easy, medium or hard
        #[arg(long)]
        difficulty: Option<Difficulty>,

        /// unhealthy, medium or healthy
        #[arg(long)]
        health: Option<HealthLevel>,

        /// Write the selected meal to a JSON document
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Recommend breakfast, dinner and supper for a daily energy budget
    Plan {
        /// Daily energy budget; defaults to the current profile's estimate
        #[arg(long)]
        kcal: Option<f64>,

        /// Write the plan to a JSON document
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// List the meal catalog
    Catalog,

    /// Replace the meal catalog
    Seed {
        /// CSV file (name,reference,kcal,category,difficulty,health)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    mealplan_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let seed = cli.seed.or(config.selection.seed);
    tracing::debug!("Using data directory {:?}", data_dir);

    let mut store = RecordStore::open(DataConfig::store_path(&data_dir))?;

    match cli.command {
        Commands::Profile {
            gender,
            age,
            weight,
            height,
            activity,
            body_fat,
        } => {
            let input = ProfileInput {
                gender,
                age,
                weight,
                height,
                activity,
                body_fat,
            };
            cmd_profile(&mut store, &input)
        }
        Commands::Report => cmd_report(&store),
        Commands::Meal {
            min_kcal,
            max_kcal,
            category,
            difficulty,
            health,
            export,
        } => {
            let criteria = MealCriteria {
                energy: KcalRange::new(min_kcal, max_kcal),
                category,
                difficulty,
                health,
            };
            ensure_seeded(&mut store, || configured_catalog(&config, None))?;
            cmd_meal(&store, &criteria, seed, export.as_deref())
        }
        Commands::Plan { kcal, export } => {
            ensure_seeded(&mut store, || configured_catalog(&config, None))?;
            cmd_plan(&store, kcal, seed, export.as_deref())
        }
        Commands::Catalog => {
            ensure_seeded(&mut store, || configured_catalog(&config, None))?;
            cmd_catalog(&store)
        }
        Commands::Seed { catalog } => {
            let catalog = configured_catalog(&config, catalog.as_deref())?;
            let ids = seed_catalog(&mut store, &catalog)?;
            println!("✓ Seeded {} meals", ids.len());
            Ok(())
        }
    }
}

/// Catalog from an explicit path, else the configured one, else built-in
fn configured_catalog(config: &Config, explicit: Option<&Path>) -> Result<MealCatalog> {
    match explicit.or(config.catalog.path.as_deref()) {
        Some(path) => load_catalog_csv(path),
        None => Ok(get_default_catalog().clone()),
    }
}

fn make_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

fn cmd_profile(store: &mut RecordStore, input: &ProfileInput) -> Result<()> {
    let profile = input.validate()?;
    submit_profile(store, profile.clone())?;
    display_report(&profile, &MetricsReport::compute(&profile));
    Ok(())
}

fn cmd_report(store: &RecordStore) -> Result<()> {
    let profile = current_profile(store).ok_or_else(|| {
        Error::NotFound("no profile has been submitted; run `mealplan profile` first".into())
    })?;
    display_report(&profile.record, &MetricsReport::compute(&profile.record));
    Ok(())
}

fn cmd_meal(
    store: &RecordStore,
    criteria: &MealCriteria,
    seed: Option<u64>,
    export: Option<&Path>,
) -> Result<()> {
    if criteria.energy.min > criteria.energy.max {
        return Err(Error::Validation(format!(
            "--min-kcal {} is above --max-kcal {}",
            criteria.energy.min, criteria.energy.max
        )));
    }

    let mut rng = make_rng(seed);
    match select(store, criteria, &mut rng) {
        Some(meal) => {
            display_meal(&meal);
            if let Some(path) = export {
                write_document(path, &meal)?;
            }
        }
        None => println!("No meal matches the given criteria."),
    }
    Ok(())
}

fn cmd_plan(
    store: &RecordStore,
    kcal: Option<f64>,
    seed: Option<u64>,
    export: Option<&Path>,
) -> Result<()> {
    let total_kcal = match kcal {
        Some(kcal) if kcal > 0.0 => kcal,
        Some(kcal) => {
            return Err(Error::Validation(format!(
                "--kcal must be positive, got {}",
                kcal
            )))
        }
        None => current_report(store)
            .map_err(|_| {
                Error::NotFound("pass --kcal or submit a profile with `mealplan profile`".into())
            })?
            .calories,
    };

    let mut rng = make_rng(seed);
    let plan = select_plan(store, total_kcal, &mut rng);

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  MEAL PLAN: {:.0} kcal", total_kcal);
    println!("╰─────────────────────────────────────────╯");
    for (category, meal) in plan.slots() {
        println!();
        println!("  {}", category.to_string().to_uppercase());
        match meal {
            Some(meal) => {
                println!("  → {} ({:.0} kcal)", meal.record.name, meal.record.kcal);
                println!("    ℹ Recipe: {}", meal.record.reference);
            }
            None => println!("  → No suitable meal found"),
        }
    }
    println!();
    println!("  Total: {:.0} kcal", plan.total_kcal());
    println!();

    if let Some(path) = export {
        write_document(path, &plan)?;
    }
    Ok(())
}

fn cmd_catalog(store: &RecordStore) -> Result<()> {
    for meal in store.query::<Meal, _>(|_| true) {
        println!(
            "{:>3}  {:<22} {:>5.0} kcal  {:<9} {:<6} {}",
            meal.id,
            meal.record.name,
            meal.record.kcal,
            meal.record.category,
            meal.record.difficulty,
            meal.record.health
        );
    }
    Ok(())
}

fn display_report(profile: &UserProfile, report: &MetricsReport) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  BODY METRICS");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!(
        "  {} · {} years · {} kg · {} cm",
        profile.gender.label(),
        profile.age,
        profile.weight_kg,
        profile.height_cm
    );
    println!("  Activity: {}", profile.activity.label());
    if let Some(bf) = profile.body_fat_pct {
        println!("  Body fat: {}%", bf);
    }
    println!();
    println!("  → BMI: {:.1} ({})", report.bmi, report.category.label());
    let formula = match report.bmr_formula {
        BmrFormula::Standard => "Mifflin-St Jeor",
        BmrFormula::BodyFat => "Katch-McArdle",
    };
    println!("  → BMR: {:.0} kcal ({})", report.bmr, formula);
    println!("  → Daily calories: {:.0} kcal", report.calories);
    println!();
}

fn display_meal(meal: &Stored<Meal>) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {} SUGGESTION", meal.record.category.to_string().to_uppercase());
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  {}", meal.record.name);
    println!("  Energy: {:.0} kcal", meal.record.kcal);
    println!(
        "  Difficulty: {} · Health: {}",
        meal.record.difficulty, meal.record.health
    );
    println!();
    println!("  ℹ Recipe: {}", meal.record.reference);
    println!();
}

fn write_document<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let contents = serde_json::to_string_pretty(value)?;
    std::fs::write(path, contents)?;
    println!("✓ Exported to {}", path.display());
    Ok(())
}
