//! Basic template chart built from static tables, for when the generator is
//! unavailable.
//!
//! Output depends only on the resolved dosha and diet type: no clock, no
//! randomness, no I/O.

use crate::profile::{DietType, Dosha, Profile};

use super::{DayPlan, DietChart, Meal, MealSet, MealSlot, Supplement, WEEKDAYS};

const BASE_DAILY_CALORIES: u32 = 1800;
const DAILY_CALORIE_STEP: u32 = 50;
const WATER_INTAKE: &str = "8-10 glasses";
const FIRST_DAY_NOTE: &str = "Start your day with warm water and lemon";
const LAST_DAY_NOTE: &str = "End your week with a light detox";

const VEGETARIAN_LUNCH: [&str; 3] = ["Mixed vegetable curry", "Whole grain roti", "Salad"];
const NON_VEGETARIAN_LUNCH: [&str; 3] = ["Grilled chicken with vegetables", "Quinoa", "Yogurt"];

/// The two profile fields the template depends on, already resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FallbackInputs {
    pub dosha: Dosha,
    pub diet: DietType,
}

impl FallbackInputs {
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            dosha: profile.dosha(),
            diet: profile.diet().unwrap_or_default(),
        }
    }
}

/// Build the template chart for a profile.
pub fn synthesize(profile: &Profile) -> DietChart {
    build(FallbackInputs::from_profile(profile))
}

/// Build the template chart from resolved inputs.
pub fn build(inputs: FallbackInputs) -> DietChart {
    let weekly_plan = WEEKDAYS
        .iter()
        .enumerate()
        .map(|(index, name)| day_plan(index, name, inputs))
        .collect();

    DietChart {
        weekly_plan,
        dosha_balancing_tips: balancing_tips(inputs.dosha),
        lifestyle_recommendations: strings(&[
            "Wake up before sunrise (6:00 AM)",
            "Practice 10 minutes of deep breathing",
            "Take a 15-minute walk after meals",
            "Go to bed by 10:00 PM",
        ]),
        ayurvedic_supplements: vec![supplement(inputs.dosha)],
        important_reminders: strings(&[
            "Listen to your body's hunger cues",
            "Stay hydrated throughout the day",
            "Avoid processed foods",
            "Practice mindful eating",
        ]),
        metadata: None,
    }
}

/// Five representative foods per dosha; breakfast draws on the first two.
pub fn dosha_foods(dosha: Dosha) -> [&'static str; 5] {
    match dosha {
        Dosha::Vata => [
            "Warm oatmeal",
            "Cooked vegetables",
            "Moong dal soup",
            "Ghee",
            "Sweet fruits",
        ],
        Dosha::Pitta => [
            "Coconut water",
            "Cooling salads",
            "Cucumber",
            "Melons",
            "Mint tea",
        ],
        Dosha::Kapha => [
            "Quinoa",
            "Steamed veggies",
            "Honey",
            "Pulses",
            "Spicy lentil soup",
        ],
    }
}

fn day_plan(index: usize, name: &str, inputs: FallbackInputs) -> DayPlan {
    let special_notes = match index {
        0 => FIRST_DAY_NOTE,
        6 => LAST_DAY_NOTE,
        _ => "",
    };

    let mut meals = MealSet::default();
    for slot in MealSlot::ALL {
        meals.insert(slot, meal(slot, inputs));
    }

    DayPlan {
        day_number: index as u32 + 1,
        day_name: name.to_string(),
        total_calories: BASE_DAILY_CALORIES + DAILY_CALORIE_STEP * index as u32,
        water_intake_advice: WATER_INTAKE.to_string(),
        special_notes: special_notes.to_string(),
        meals,
    }
}

fn meal(slot: MealSlot, inputs: FallbackInputs) -> Meal {
    let dosha = inputs.dosha;
    let (time, calories, description) = match slot {
        MealSlot::EarlyMorning => ("6:00 AM", 50, "Kickstart your metabolism"),
        MealSlot::Breakfast => ("8:00 AM", 350, "Light, nourishing breakfast"),
        MealSlot::MidMorning => ("11:00 AM", 150, "Light snack"),
        MealSlot::Lunch => ("1:00 PM", 500, "Complete meal with all six tastes"),
        MealSlot::EveningSnack => ("4:00 PM", 150, "Light energy boost"),
        MealSlot::Dinner => ("7:00 PM", 400, "Light dinner for sound sleep"),
        MealSlot::BeforeBed => ("9:30 PM", 100, "Calming bedtime beverage"),
    };

    let items: Vec<String> = match slot {
        MealSlot::EarlyMorning => strings(&["Warm water with lemon", "Herbal tea"]),
        MealSlot::Breakfast => {
            let foods = dosha_foods(dosha);
            strings(&[foods[0], foods[1]])
        }
        MealSlot::MidMorning => strings(&["Fresh fruit", "Herbal tea"]),
        MealSlot::Lunch if inputs.diet == DietType::NonVegetarian => {
            strings(&NON_VEGETARIAN_LUNCH)
        }
        MealSlot::Lunch => strings(&VEGETARIAN_LUNCH),
        MealSlot::EveningSnack => strings(&["Nuts", "Herbal tea", "Seasonal fruit"]),
        MealSlot::Dinner => strings(&[
            "Vegetable soup",
            "Steamed vegetables",
            "Small portion of rice",
        ]),
        MealSlot::BeforeBed => strings(&[match dosha {
            Dosha::Vata => "Warm milk with nutmeg",
            Dosha::Pitta => "Cool almond milk",
            Dosha::Kapha => "Warm turmeric milk",
        }]),
    };

    let ayurvedic_benefit = match slot {
        MealSlot::EarlyMorning => format!("Activates digestion (Agni) and steadies {dosha}"),
        MealSlot::Breakfast => format!("Balances {dosha} dosha"),
        MealSlot::MidMorning => format!("Sustains energy levels without aggravating {dosha}"),
        MealSlot::Lunch => format!("Main meal - largest of the day, taken when {dosha} digestion peaks"),
        MealSlot::EveningSnack => format!("Prevents overeating at dinner and keeps {dosha} settled"),
        MealSlot::Dinner => format!("Easy to digest for {dosha} constitution"),
        MealSlot::BeforeBed => format!("Promotes deep sleep and calms {dosha}"),
    };

    Meal {
        time: time.to_string(),
        items,
        calories,
        ayurvedic_benefit,
        description: description.to_string(),
    }
}

fn balancing_tips(dosha: Dosha) -> Vec<String> {
    let avoid = match dosha {
        Dosha::Vata => "Avoid cold, dry foods",
        Dosha::Pitta => "Avoid spicy, oily foods",
        Dosha::Kapha => "Avoid heavy, oily foods",
    };
    vec![
        format!("Eat warm, cooked foods for {dosha} dosha"),
        avoid.to_string(),
        "Eat meals at regular times".to_string(),
        "Sit down and chew thoroughly".to_string(),
        "Avoid drinking water during meals".to_string(),
    ]
}

fn supplement(dosha: Dosha) -> Supplement {
    let name = match dosha {
        Dosha::Vata => "Ashwagandha",
        Dosha::Pitta => "Brahmi",
        Dosha::Kapha => "Triphala",
    };
    Supplement {
        name: name.to_string(),
        benefit: format!("Balances {dosha} dosha"),
        timing: "Take with warm water after meals".to_string(),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
