// Trigger evaluation for alert tiers.
//
// Team matching decides whether an event is relevant at all; the tier
// triggers then decide, from the distance, which alerts are due.

use std::collections::HashSet;

use super::model::{AlertTier, TierThresholds};
use crate::core::geo::{classify_nearby_within, classify_proximity_within};
use crate::core::model::Event;

/// True if either side of the event is one of the favorite teams.
/// Exact match ignoring case; no partial names.
pub fn event_features_favorite_team<S: AsRef<str>>(event: &Event, favorite_teams: &[S]) -> bool {
    if favorite_teams.is_empty() {
        return false;
    }
    let home = event.home_team.to_lowercase();
    let away = event.away_team.to_lowercase();
    favorite_teams.iter().any(|team| {
        let team = team.as_ref().to_lowercase();
        team == home || team == away
    })
}

/// Case-folded favorites, built once per evaluation.
pub fn favorite_team_set<S: AsRef<str>>(favorite_teams: &[S]) -> HashSet<String> {
    favorite_teams
        .iter()
        .map(|team| team.as_ref().to_lowercase())
        .collect()
}

/// Same rule as [`event_features_favorite_team`], against a prebuilt set.
pub fn event_in_favorite_set(event: &Event, favorites: &HashSet<String>) -> bool {
    !favorites.is_empty()
        && (favorites.contains(&event.home_team.to_lowercase())
            || favorites.contains(&event.away_team.to_lowercase()))
}

/// Returns the distance in the tier's unit (km for nearby, m for proximity)
/// when the tier's radius is satisfied.
pub fn evaluate_tier(
    tier: AlertTier,
    distance_meters: f64,
    thresholds: &TierThresholds,
) -> Option<f64> {
    match tier {
        AlertTier::Nearby => {
            let check = classify_nearby_within(distance_meters, thresholds.nearby_km);
            check.is_nearby.then_some(check.distance_km)
        }
        AlertTier::Proximity => {
            let check = classify_proximity_within(distance_meters, thresholds.proximity_m);
            check.is_in_proximity.then_some(check.distance_meters)
        }
    }
}
