//! Meal selection.
//!
//! Filters meals by every provided criterion and picks one uniformly at
//! random. There is no relaxation: when nothing matches, the result is
//! `None`. The random source is passed in, so a seeded generator makes
//! selection reproducible.

use crate::store::{RecordStore, Stored};
use crate::{KcalRange, Meal, MealCategory, MealCriteria};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Pick one meal from `meals` that satisfies `criteria`
pub fn select_from<'a, R>(meals: &'a [Meal], criteria: &MealCriteria, rng: &mut R) -> Option<&'a Meal>
where
    R: Rng + ?Sized,
{
    let candidates: Vec<&Meal> = meals.iter().filter(|m| criteria.matches(m)).collect();
    candidates.choose(rng).copied()
}

/// Pick one stored meal satisfying `criteria`
///
/// Candidates are taken in id order before choosing, so the same store,
/// criteria and seed always give the same meal.
pub fn select<R>(store: &RecordStore, criteria: &MealCriteria, rng: &mut R) -> Option<Stored<Meal>>
where
    R: Rng + ?Sized,
{
    let candidates = store.query::<Meal, _>(|m| criteria.matches(m));
    let chosen = candidates.choose(rng).map(|m| (*m).clone());

    match &chosen {
        Some(meal) => tracing::debug!(
            "Selected '{}' ({} kcal) from {} candidates",
            meal.record.name,
            meal.record.kcal,
            candidates.len()
        ),
        None => tracing::info!("No meal matches {:?}", criteria),
    }
    chosen
}

/// One meal per slot of the day; a slot is empty when nothing fit
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct MealPlan {
    pub breakfast: Option<Stored<Meal>>,
    pub dinner: Option<Stored<Meal>>,
    pub supper: Option<Stored<Meal>>,
}

impl MealPlan {
    pub fn slot(&self, category: MealCategory) -> Option<&Stored<Meal>> {
        match category {
            MealCategory::Breakfast => self.breakfast.as_ref(),
            MealCategory::Dinner => self.dinner.as_ref(),
            MealCategory::Supper => self.supper.as_ref(),
        }
    }

    fn slot_mut(&mut self, category: MealCategory) -> &mut Option<Stored<Meal>> {
        match category {
            MealCategory::Breakfast => &mut self.breakfast,
            MealCategory::Dinner => &mut self.dinner,
            MealCategory::Supper => &mut self.supper,
        }
    }

    /// Slots in day order
    pub fn slots(&self) -> impl Iterator<Item = (MealCategory, Option<&Stored<Meal>>)> + '_ {
        MealCategory::ALL.into_iter().map(move |c| (c, self.slot(c)))
    }

    /// Energy of the filled slots
    pub fn total_kcal(&self) -> f64 {
        self.slots()
            .filter_map(|(_, meal)| meal.map(|m| m.record.kcal))
            .sum()
    }

    pub fn is_complete(&self) -> bool {
        self.slots().all(|(_, meal)| meal.is_some())
    }
}

/// Build a day plan for `total_kcal`
///
/// Each slot is an independent selection in `[0, total_kcal / 3]` for its
/// category. Slots are not deduplicated against each other.
pub fn select_plan<R>(store: &RecordStore, total_kcal: f64, rng: &mut R) -> MealPlan
where
    R: Rng + ?Sized,
{
    let per_slot = KcalRange::up_to(total_kcal / 3.0);
    let mut plan = MealPlan::default();

    for category in MealCategory::ALL {
        let criteria = MealCriteria::within(per_slot).with_category(category);
        *plan.slot_mut(category) = select(store, &criteria, rng);
    }

    tracing::info!(
        "Planned {:.0} of {:.0} kcal ({} slots filled)",
        plan.total_kcal(),
        total_kcal,
        plan.slots().filter(|(_, m)| m.is_some()).count()
    );
    plan
}
