#![forbid(unsafe_code)]

//! Core domain model and business logic for the meal planner.
//!
//! This crate provides:
//! - Domain types (profiles, meals, selection criteria)
//! - Body-metric calculations (BMI, BMR, calorie estimate)
//! - Record store with atomic JSON persistence
//! - Meal catalog seeding and random meal selection

pub mod types;
pub mod error;
pub mod metrics;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod store;
pub mod profile;
pub mod selector;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog, load_catalog_csv, seed_catalog};
pub use config::Config;
pub use metrics::MetricsReport;
pub use store::{Entity, EntityKind, RecordId, RecordStore, Stored};
pub use profile::{current_profile, current_report, submit_profile, ProfileInput};
pub use selector::{select, select_from, select_plan, MealPlan};
