//! Structural checks on a diet chart.

use super::{DAYS_PER_WEEK, DietChart, MealSlot, WEEKDAYS};

/// First structural problem found in a chart.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanViolation {
    #[error("weekly plan has {found} days, expected 7")]
    DayCount { found: usize },

    #[error("day at position {position} is numbered {found}")]
    DayNumber { position: usize, found: u32 },

    #[error("day at position {position} is named {found:?}, expected {expected}")]
    DayName {
        position: usize,
        found: String,
        expected: &'static str,
    },

    #[error("day {day} has no {slot} meal")]
    MissingMeal { day: u32, slot: MealSlot },

    #[error("day {day} {slot} meal lists no items")]
    EmptyMeal { day: u32, slot: MealSlot },
}

/// Check the week itself: seven days, numbered 1..=7, Monday through Sunday.
/// Missing meal slots are allowed here.
pub fn validate_weekly_plan(chart: &DietChart) -> Result<(), PlanViolation> {
    if chart.weekly_plan.len() != DAYS_PER_WEEK {
        return Err(PlanViolation::DayCount {
            found: chart.weekly_plan.len(),
        });
    }

    for (position, day) in chart.weekly_plan.iter().enumerate() {
        if day.day_number as usize != position + 1 {
            return Err(PlanViolation::DayNumber {
                position,
                found: day.day_number,
            });
        }
        let expected = WEEKDAYS[position];
        if !day.day_name.trim().eq_ignore_ascii_case(expected) {
            return Err(PlanViolation::DayName {
                position,
                found: day.day_name.clone(),
                expected,
            });
        }
    }

    Ok(())
}

/// [`validate_weekly_plan`] plus: every day has all seven slots, each with items.
pub fn check_complete(chart: &DietChart) -> Result<(), PlanViolation> {
    validate_weekly_plan(chart)?;

    for day in &chart.weekly_plan {
        for slot in MealSlot::ALL {
            let meal = day.meals.get(slot).ok_or(PlanViolation::MissingMeal {
                day: day.day_number,
                slot,
            })?;
            if meal.items.is_empty() {
                return Err(PlanViolation::EmptyMeal {
                    day: day.day_number,
                    slot,
                });
            }
        }
    }

    Ok(())
}
