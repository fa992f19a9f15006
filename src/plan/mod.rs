//! Diet chart schema shared by the remote generator and the local fallback.

pub mod fallback;
pub mod validate;

pub use fallback::{FallbackInputs, synthesize};
pub use validate::{PlanViolation, check_complete, validate_weekly_plan};

use serde::{Deserialize, Serialize};

/// Number of days in a weekly plan.
pub const DAYS_PER_WEEK: usize = 7;

/// Weekday names, Monday first.
pub const WEEKDAYS: [&str; DAYS_PER_WEEK] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// A complete diet chart: seven days of meals plus advisory lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DietChart {
    pub weekly_plan: Vec<DayPlan>,
    #[serde(default)]
    pub dosha_balancing_tips: Vec<String>,
    #[serde(default)]
    pub lifestyle_recommendations: Vec<String>,
    #[serde(default)]
    pub ayurvedic_supplements: Vec<Supplement>,
    #[serde(default)]
    pub important_reminders: Vec<String>,
    /// Attached by the remote generator only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ChartMetadata>,
}

/// One day of the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPlan {
    #[serde(rename = "day", alias = "dayNumber")]
    pub day_number: u32,
    pub day_name: String,
    pub total_calories: u32,
    #[serde(rename = "waterIntake", alias = "waterIntakeAdvice", default)]
    pub water_intake_advice: String,
    #[serde(default)]
    pub special_notes: String,
    pub meals: MealSet,
}

/// The seven meal slots of a day, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MealSlot {
    EarlyMorning,
    Breakfast,
    MidMorning,
    Lunch,
    EveningSnack,
    Dinner,
    BeforeBed,
}

impl MealSlot {
    /// All slots in the order they are eaten.
    pub const ALL: [MealSlot; 7] = [
        Self::EarlyMorning,
        Self::Breakfast,
        Self::MidMorning,
        Self::Lunch,
        Self::EveningSnack,
        Self::Dinner,
        Self::BeforeBed,
    ];

    /// The JSON key for this slot.
    pub fn key(&self) -> &'static str {
        match self {
            Self::EarlyMorning => "earlyMorning",
            Self::Breakfast => "breakfast",
            Self::MidMorning => "midMorning",
            Self::Lunch => "lunch",
            Self::EveningSnack => "eveningSnack",
            Self::Dinner => "dinner",
            Self::BeforeBed => "beforeBed",
        }
    }

    /// Human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            Self::EarlyMorning => "Early Morning",
            Self::Breakfast => "Breakfast",
            Self::MidMorning => "Mid-Morning Snack",
            Self::Lunch => "Lunch",
            Self::EveningSnack => "Evening Snack",
            Self::Dinner => "Dinner",
            Self::BeforeBed => "Before Bed",
        }
    }
}

impl std::fmt::Display for MealSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Meals of one day. A remote plan may leave slots out; missing slots stay
/// missing and are skipped by [`MealSet::iter`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub early_morning: Option<Meal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakfast: Option<Meal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mid_morning: Option<Meal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lunch: Option<Meal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evening_snack: Option<Meal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dinner: Option<Meal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_bed: Option<Meal>,
}

impl MealSet {
    fn slot_mut(&mut self, slot: MealSlot) -> &mut Option<Meal> {
        match slot {
            MealSlot::EarlyMorning => &mut self.early_morning,
            MealSlot::Breakfast => &mut self.breakfast,
            MealSlot::MidMorning => &mut self.mid_morning,
            MealSlot::Lunch => &mut self.lunch,
            MealSlot::EveningSnack => &mut self.evening_snack,
            MealSlot::Dinner => &mut self.dinner,
            MealSlot::BeforeBed => &mut self.before_bed,
        }
    }

    pub fn get(&self, slot: MealSlot) -> Option<&Meal> {
        match slot {
            MealSlot::EarlyMorning => self.early_morning.as_ref(),
            MealSlot::Breakfast => self.breakfast.as_ref(),
            MealSlot::MidMorning => self.mid_morning.as_ref(),
            MealSlot::Lunch => self.lunch.as_ref(),
            MealSlot::EveningSnack => self.evening_snack.as_ref(),
            MealSlot::Dinner => self.dinner.as_ref(),
            MealSlot::BeforeBed => self.before_bed.as_ref(),
        }
    }

    /// Put a meal into a slot, returning whatever was there.
    pub fn insert(&mut self, slot: MealSlot, meal: Meal) -> Option<Meal> {
        self.slot_mut(slot).replace(meal)
    }

    /// Present meals in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (MealSlot, &Meal)> {
        MealSlot::ALL
            .into_iter()
            .filter_map(move |slot| self.get(slot).map(|meal| (slot, meal)))
    }

    /// Slots with no meal.
    pub fn missing(&self) -> Vec<MealSlot> {
        MealSlot::ALL
            .into_iter()
            .filter(|slot| self.get(*slot).is_none())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn total_calories(&self) -> u32 {
        self.iter().map(|(_, meal)| meal.calories).sum()
    }
}

/// A single meal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Meal {
    pub time: String,
    pub items: Vec<String>,
    pub calories: u32,
    pub ayurvedic_benefit: String,
    pub description: String,
}

/// An herbal supplement recommendation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Supplement {
    pub name: String,
    pub benefit: String,
    pub timing: String,
}

/// Provenance the remote generator attaches to its charts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartMetadata {
    pub generated_at: Option<String>,
    pub user_name: Option<String>,
    pub dosha: Option<String>,
    pub diet_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meal(item: &str, calories: u32) -> Meal {
        Meal {
            time: "8:00 AM".into(),
            items: vec![item.into()],
            calories,
            ..Default::default()
        }
    }

    #[test]
    fn iteration_is_canonical_regardless_of_json_order() {
        let meals: MealSet = serde_json::from_value(serde_json::json!({
            "beforeBed": {"items": ["Milk"], "calories": 100},
            "lunch": {"items": ["Dal"], "calories": 600},
            "earlyMorning": {"items": ["Water"], "calories": 10},
        }))
        .unwrap();

        let order: Vec<MealSlot> = meals.iter().map(|(slot, _)| slot).collect();
        assert_eq!(
            order,
            vec![MealSlot::EarlyMorning, MealSlot::Lunch, MealSlot::BeforeBed]
        );
        assert_eq!(meals.len(), 3);
        assert_eq!(meals.total_calories(), 710);
    }

    #[test]
    fn missing_slots_stay_missing() {
        let mut meals = MealSet::default();
        assert!(meals.is_empty());
        meals.insert(MealSlot::Dinner, meal("Khichdi", 500));

        let json = serde_json::to_value(&meals).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 1);
        assert!(json.get("dinner").is_some());
        assert_eq!(meals.missing().len(), 6);
        assert!(!meals.missing().contains(&MealSlot::Dinner));
    }

    #[test]
    fn unknown_slot_keys_are_ignored() {
        let meals: MealSet = serde_json::from_value(serde_json::json!({
            "brunch": {"items": ["Poha"]},
            "dinner": {"items": ["Soup"], "calories": 300},
        }))
        .unwrap();
        assert_eq!(meals.len(), 1);
    }

    #[test]
    fn day_plan_accepts_both_field_spellings() {
        let remote: DayPlan = serde_json::from_value(serde_json::json!({
            "day": 1,
            "dayName": "Monday",
            "totalCalories": 2100,
            "waterIntake": "2.5-3 liters",
            "meals": {}
        }))
        .unwrap();
        let aliased: DayPlan = serde_json::from_value(serde_json::json!({
            "dayNumber": 1,
            "dayName": "Monday",
            "totalCalories": 2100,
            "waterIntakeAdvice": "2.5-3 liters",
            "meals": {}
        }))
        .unwrap();
        assert_eq!(remote, aliased);
        assert_eq!(remote.special_notes, "");

        let json = serde_json::to_value(&remote).unwrap();
        assert_eq!(json["day"], 1);
        assert_eq!(json["waterIntake"], "2.5-3 liters");
    }

    #[test]
    fn day_plan_requires_core_fields() {
        let missing_calories = serde_json::json!({
            "day": 1,
            "dayName": "Monday",
            "meals": {}
        });
        assert!(serde_json::from_value::<DayPlan>(missing_calories).is_err());
    }

    #[test]
    fn slot_keys_match_serde_names() {
        for slot in MealSlot::ALL {
            let json = serde_json::to_value(slot).unwrap();
            assert_eq!(json, slot.key());
        }
    }

    #[test]
    fn slot_labels_are_distinct_and_readable() {
        let labels: std::collections::HashSet<_> =
            MealSlot::ALL.iter().map(|slot| slot.label()).collect();
        assert_eq!(labels.len(), 7);
        assert_eq!(MealSlot::MidMorning.label(), "Mid-Morning Snack");
        assert_eq!(MealSlot::BeforeBed.label(), "Before Bed");
    }
}
