//! crates/studentflow_core/src/wellbeing.rs
//!
//! The daily wellbeing score: a fixed weighted blend of mood, study, exercise,
//! sleep and screen time, clamped to 0..=10.

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;

use crate::domain::{DailyLog, Mood, UserId};
use crate::lenient;

pub const MAX_WELLBEING: f64 = 10.0;

const MOOD_WEIGHT: f64 = 0.5;
const STUDY_WEIGHT: f64 = 0.5;
const EXERCISE_MINUTES_PER_POINT: f64 = 30.0;
const SLEEP_WEIGHT: f64 = 0.4;
const SCREEN_PENALTY: f64 = 0.2;

impl Mood {
    /// The numeric value each mood contributes before weighting.
    pub fn score(&self) -> u8 {
        match self {
            Mood::Terrible => 1,
            Mood::Bad => 3,
            Mood::Okay => 5,
            Mood::Good => 7,
            Mood::Great => 10,
        }
    }
}

/// One day's raw habit inputs as submitted by the user.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HabitInput {
    /// Defaults to the current day when omitted.
    #[serde(default)]
    pub log_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::mood")]
    pub felt_today: Option<Mood>,
    #[serde(default, deserialize_with = "lenient::hours")]
    pub study_hours: f64,
    #[serde(default, deserialize_with = "lenient::hours")]
    pub screen_hours: f64,
    #[serde(default, alias = "exercise_mins", deserialize_with = "lenient::minutes")]
    pub exercise_minutes: u32,
    #[serde(default, deserialize_with = "lenient::time_of_day")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, example = "07:00"))]
    pub wake_up_time: Option<NaiveTime>,
    #[serde(default, deserialize_with = "lenient::time_of_day")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, example = "23:00"))]
    pub sleep_time: Option<NaiveTime>,
}

/// Hours slept between `sleep` and `wake`.
///
/// Sleep always precedes waking: when the wake time is earlier on the clock
/// than the sleep time, waking happened the next day. Missing either time
/// yields 0.
pub fn sleep_hours(sleep: Option<NaiveTime>, wake: Option<NaiveTime>) -> f64 {
    match (sleep, wake) {
        (Some(sleep), Some(wake)) => {
            let mut seconds = (wake - sleep).num_seconds();
            if seconds < 0 {
                seconds += 24 * 60 * 60;
            }
            seconds as f64 / 3600.0
        }
        _ => 0.0,
    }
}

/// Computes the 0..=10 wellbeing score for one day. A missing mood counts as `Okay`.
pub fn wellbeing_score(input: &HabitInput) -> u8 {
    let mood = f64::from(input.felt_today.unwrap_or_default().score());
    let sleep = sleep_hours(input.sleep_time, input.wake_up_time);

    let raw = mood * MOOD_WEIGHT
        + non_negative(input.study_hours) * STUDY_WEIGHT
        + f64::from(input.exercise_minutes) / EXERCISE_MINUTES_PER_POINT
        + sleep * SLEEP_WEIGHT
        - non_negative(input.screen_hours) * SCREEN_PENALTY;

    raw.clamp(0.0, MAX_WELLBEING).round() as u8
}

/// Builds the log row to persist for `input`, stamping the derived score.
pub fn score_daily_log(uid: UserId, today: NaiveDate, input: HabitInput) -> DailyLog {
    let wellbeing_score = wellbeing_score(&input);
    DailyLog {
        uid,
        log_date: input.log_date.unwrap_or(today),
        felt_today: input.felt_today.unwrap_or_default(),
        study_hours: non_negative(input.study_hours),
        screen_hours: non_negative(input.screen_hours),
        exercise_minutes: input.exercise_minutes,
        wake_up_time: input.wake_up_time,
        sleep_time: input.sleep_time,
        wellbeing_score,
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(h, m, 0)
    }

    #[test]
    fn mood_alone_is_half_its_value() {
        for mood in Mood::ALL {
            let input = HabitInput {
                felt_today: Some(*mood),
                ..HabitInput::default()
            };
            let expected = (f64::from(mood.score()) * 0.5).clamp(0.0, 10.0).round() as u8;
            assert_eq!(wellbeing_score(&input), expected, "{mood}");
        }
        // 1 * 0.5 = 0.5 rounds away from zero.
        let terrible = HabitInput {
            felt_today: Some(Mood::Terrible),
            ..HabitInput::default()
        };
        assert_eq!(wellbeing_score(&terrible), 1);
    }

    #[test]
    fn missing_mood_scores_as_okay() {
        assert_eq!(wellbeing_score(&HabitInput::default()), 3); // 2.5 -> 3
    }

    #[test]
    fn sleep_crossing_midnight_counts_the_night() {
        assert_eq!(sleep_hours(time(23, 0), time(7, 0)), 8.0);
        assert_eq!(sleep_hours(time(1, 30), time(8, 0)), 6.5);
        assert_eq!(sleep_hours(time(7, 0), time(7, 0)), 0.0);
        assert_eq!(sleep_hours(None, time(7, 0)), 0.0);
    }

    #[test]
    fn great_day_caps_at_ten() {
        let input = HabitInput {
            felt_today: Some(Mood::Great),
            study_hours: 6.0,
            exercise_minutes: 60,
            screen_hours: 2.0,
            wake_up_time: time(7, 0),
            sleep_time: time(23, 0),
            ..HabitInput::default()
        };
        // 5 + 3 + 2 + 3.2 - 0.4 = 12.8
        assert_eq!(wellbeing_score(&input), 10);
    }

    #[test]
    fn heavy_screen_time_floors_at_zero() {
        let input = HabitInput {
            felt_today: Some(Mood::Terrible),
            screen_hours: 14.0,
            ..HabitInput::default()
        };
        assert_eq!(wellbeing_score(&input), 0);
    }

    #[test]
    fn score_stays_in_range_over_a_grid() {
        for mood in Mood::ALL {
            for study in [0.0, 1.5, 4.0, 12.0] {
                for screen in [0.0, 3.0, 10.0, 24.0] {
                    for exercise in [0, 20, 90, 300] {
                        let input = HabitInput {
                            felt_today: Some(*mood),
                            study_hours: study,
                            screen_hours: screen,
                            exercise_minutes: exercise,
                            wake_up_time: time(6, 30),
                            sleep_time: time(0, 15),
                            ..HabitInput::default()
                        };
                        assert!(wellbeing_score(&input) <= 10);
                    }
                }
            }
        }
    }

    #[test]
    fn malformed_form_fields_are_coerced() {
        let input: HabitInput = serde_json::from_str(
            r#"{"felt_today":"Ecstatic","study_hours":"2.5","screen_hours":"lots","exercise_mins":"45","wake_up_time":"07:00","sleep_time":null}"#,
        )
        .unwrap();
        assert_eq!(input.felt_today, None);
        assert_eq!(input.study_hours, 2.5);
        assert_eq!(input.screen_hours, 0.0);
        assert_eq!(input.exercise_minutes, 45);
        assert_eq!(input.sleep_time, None);
        // 2.5 + 1.25 + 1.5 = 5.25
        assert_eq!(wellbeing_score(&input), 5);
    }

    #[test]
    fn scored_log_defaults_date_and_mood() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let log = score_daily_log(UserId::new("u1"), today, HabitInput::default());
        assert_eq!(log.log_date, today);
        assert_eq!(log.felt_today, Mood::Okay);
        assert_eq!(log.wellbeing_score, 3);
    }
}
