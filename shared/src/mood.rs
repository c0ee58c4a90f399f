//! Pet mood derived from today's metrics
//!
//! Rules are checked in priority order and the first match wins, so poor
//! sleep outranks low activity. There is no smoothing between snapshots.

use crate::models::MetricSnapshot;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Below this many hours of sleep the pet is tired
pub const TIRED_SLEEP_HOURS: f64 = 6.0;
/// Step count under which the day counts as sedentary
pub const SEDENTARY_STEPS: u32 = 2_000;
/// Exercise minutes under which the day counts as sedentary
pub const SEDENTARY_EXERCISE_MINUTES: f64 = 10.0;
/// Steps needed (inclusive) for a happy pet
pub const HAPPY_STEPS: u32 = 8_000;
/// Sleep hours needed (inclusive) for a happy pet
pub const HAPPY_SLEEP_HOURS: f64 = 7.0;

/// Mood shown by the virtual pet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetMood {
    Happy,
    Neutral,
    Sad,
    Tired,
}

impl PetMood {
    pub fn label(&self) -> &'static str {
        match self {
            PetMood::Happy => "Happy",
            PetMood::Neutral => "Neutral",
            PetMood::Sad => "Sad",
            PetMood::Tired => "Tired",
        }
    }
}

impl fmt::Display for PetMood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Calculate the pet's mood from a snapshot
///
/// `heart_rate_avg` is carried on the snapshot but does not feed any rule.
pub fn calculate_mood(snapshot: &MetricSnapshot) -> PetMood {
    if snapshot.sleep_hours < TIRED_SLEEP_HOURS {
        return PetMood::Tired;
    }

    if snapshot.steps < SEDENTARY_STEPS && snapshot.exercise_minutes < SEDENTARY_EXERCISE_MINUTES {
        return PetMood::Sad;
    }

    if snapshot.steps >= HAPPY_STEPS && snapshot.sleep_hours >= HAPPY_SLEEP_HOURS {
        return PetMood::Happy;
    }

    PetMood::Neutral
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn snapshot(steps: u32, sleep_hours: f64, exercise_minutes: f64) -> MetricSnapshot {
        MetricSnapshot {
            steps,
            sleep_hours,
            exercise_minutes,
            ..Default::default()
        }
    }

    #[rstest]
    // Sleep rule outranks the sedentary rule
    #[case(500, 5.5, 2.0, PetMood::Tired)]
    #[case(12_000, 5.9, 60.0, PetMood::Tired)]
    #[case(1_999, 8.0, 9.9, PetMood::Sad)]
    #[case(1_999, 8.0, 10.0, PetMood::Neutral)]
    #[case(2_000, 8.0, 0.0, PetMood::Neutral)]
    // Inclusive happy boundaries
    #[case(8_000, 7.0, 0.0, PetMood::Happy)]
    #[case(7_999, 9.0, 45.0, PetMood::Neutral)]
    #[case(9_000, 6.9, 45.0, PetMood::Neutral)]
    #[case(0, 6.0, 30.0, PetMood::Neutral)]
    fn test_calculate_mood(
        #[case] steps: u32,
        #[case] sleep: f64,
        #[case] exercise: f64,
        #[case] expected: PetMood,
    ) {
        assert_eq!(calculate_mood(&snapshot(steps, sleep, exercise)), expected);
    }

    #[test]
    fn test_heart_rate_does_not_affect_mood() {
        let mut snap = snapshot(9_000, 8.0, 30.0);
        let baseline = calculate_mood(&snap);
        snap.heart_rate_avg = 180;
        assert_eq!(calculate_mood(&snap), baseline);
    }

    #[test]
    fn test_mood_labels() {
        assert_eq!(PetMood::Tired.to_string(), "Tired");
        assert_eq!(serde_json::to_string(&PetMood::Happy).unwrap(), "\"happy\"");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_short_sleep_always_tired(
            steps in 0u32..50_000,
            sleep in 0.0f64..5.99,
            exercise in 0.0f64..300.0
        ) {
            prop_assert_eq!(calculate_mood(&snapshot(steps, sleep, exercise)), PetMood::Tired);
        }
    }
}
