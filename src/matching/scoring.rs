use chrono::{DateTime, Utc};

use crate::config::ScoringSettings;
use crate::domain::QueueEntry;

/// Compatibility of a killer/victim pair in [0, 1].
///
/// `now` must be the same instant for every pair evaluated in one cycle,
/// otherwise evaluation order leaks into the wait-time bonus.
pub fn rate_player_pair(
    killer: &QueueEntry,
    victim: &QueueEntry,
    now: DateTime<Utc>,
    settings: &ScoringSettings,
) -> f64 {
    let rating_diff = f64::from((killer.profile.rating - victim.profile.rating).abs());
    if rating_diff > settings.max_rating_diff {
        return 0.0;
    }

    let rating_similarity = rating_similarity(rating_diff, settings.max_rating_diff);
    let course_bonus = settings.course_coefficient
        * indicator(killer.profile.shares_course_with(&victim.profile));
    let group_bonus = settings.group_coefficient
        * indicator(killer.profile.group_name == victim.profile.group_name);
    let type_bonus = settings.type_coefficient
        * indicator(killer.profile.education_type == victim.profile.education_type);
    let time_bonus =
        settings.time_coefficient * (killer.seconds_waited(now) + victim.seconds_waited(now));

    clamp_quality(rating_similarity + course_bonus + group_bonus + type_bonus + time_bonus)
}

fn rating_similarity(rating_diff: f64, max_rating_diff: f64) -> f64 {
    // only reachable with a zero diff when the allowed spread is zero
    if max_rating_diff <= 0.0 {
        return 1.0;
    }
    1.0 - (rating_diff / max_rating_diff).min(1.0)
}

fn indicator(condition: bool) -> f64 {
    if condition { 1.0 } else { 0.0 }
}

fn clamp_quality(quality: f64) -> f64 {
    if quality.is_nan() {
        return 0.0;
    }
    quality.clamp(0.0, 1.0)
}
