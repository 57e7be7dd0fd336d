// Notification engine - decides which tier alerts to fire and remembers
// what already fired so each event alerts at most once per tier.

use std::collections::HashSet;

use super::model::{
    AlertTier, NearbyNotification, NotificationCommand, ProximityNotification, TierThresholds,
};
use super::triggers::{evaluate_tier, event_in_favorite_set, favorite_team_set};
use crate::core::model::{Coordinate, Event, EventId};

/// Per-session notified state. One instance per signed-in user; drop or
/// reset it on logout.
#[derive(Debug, Default)]
pub struct NotificationEngine {
    thresholds: TierThresholds,
    /// Events that already fired the nearby tier
    notified_events: HashSet<EventId>,
    /// Events that already fired the proximity tier
    proximity_notified_events: HashSet<EventId>,
}

impl NotificationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thresholds(thresholds: TierThresholds) -> Self {
        Self {
            thresholds,
            ..Self::default()
        }
    }

    /// Thresholds can change between evaluations; notified state is kept.
    pub fn update_thresholds(&mut self, thresholds: TierThresholds) {
        self.thresholds = thresholds;
    }

    /// Evaluate every active event against the user's favorites and position.
    /// Returns the commands to deliver, in input order, nearby before
    /// proximity for the same event.
    pub fn check_favorite_team_events<S: AsRef<str>>(
        &mut self,
        favorite_teams: &[S],
        location: Coordinate,
        active_events: &[Event],
    ) -> Vec<NotificationCommand> {
        let mut commands = Vec::new();

        if favorite_teams.is_empty() {
            log::debug!("No favorite teams, skipping {} events", active_events.len());
            return commands;
        }

        if !location.is_finite() {
            log::warn!(
                "Non-finite user location ({}, {}), no alerts can fire",
                location.latitude,
                location.longitude
            );
        }

        let favorites = favorite_team_set(favorite_teams);

        for event in active_events {
            if !event_in_favorite_set(event, &favorites) {
                continue;
            }

            let distance_m = location.distance_meters(&event.location);
            if distance_m.is_nan() && location.is_finite() {
                log::warn!("Event {} has a non-finite venue location", event.id);
            }

            if !self.notified_events.contains(&event.id) {
                let fired = evaluate_tier(AlertTier::Nearby, distance_m, &self.thresholds);
                if let Some(distance_km) = fired {
                    log::info!("Nearby alert for event {} ({:.2} km)", event.id, distance_km);
                    self.notified_events.insert(event.id.clone());
                    commands.push(NotificationCommand::Nearby(NearbyNotification::from_event(
                        event,
                        distance_km,
                    )));
                }
            }

            if !self.proximity_notified_events.contains(&event.id) {
                let fired = evaluate_tier(AlertTier::Proximity, distance_m, &self.thresholds);
                if let Some(meters) = fired {
                    log::info!("Proximity alert for event {} ({:.0} m)", event.id, meters);
                    self.proximity_notified_events.insert(event.id.clone());
                    commands.push(NotificationCommand::Proximity(
                        ProximityNotification::from_event(event, meters),
                    ));
                }
            }
        }

        commands
    }

    /// Location callback entry point. No throttling here; callers decide
    /// how often to call.
    pub fn on_location_changed<S: AsRef<str>>(
        &mut self,
        favorite_teams: &[S],
        new_location: Coordinate,
        active_events: &[Event],
    ) -> Vec<NotificationCommand> {
        self.check_favorite_team_events(favorite_teams, new_location, active_events)
    }

    /// Forget both tiers for one event. Unknown ids are ignored.
    pub fn clear_event_notifications(&mut self, event_id: &str) {
        let nearby = self.notified_events.remove(event_id);
        let proximity = self.proximity_notified_events.remove(event_id);
        if nearby || proximity {
            log::debug!("Cleared notified state for event {}", event_id);
        }
    }

    pub fn reset_notifications(&mut self) {
        self.notified_events.clear();
        self.proximity_notified_events.clear();
    }

    /// Clear notified state for listed events that no longer feature any
    /// favorite team, so re-favoriting a team can alert again.
    /// Returns the ids that were cleared.
    pub fn forget_unfavorited<S: AsRef<str>>(
        &mut self,
        favorite_teams: &[S],
        events: &[Event],
    ) -> Vec<EventId> {
        let favorites = favorite_team_set(favorite_teams);
        let mut cleared = Vec::new();
        for event in events {
            if event_in_favorite_set(event, &favorites) || !self.is_notified_any(&event.id) {
                continue;
            }
            self.clear_event_notifications(&event.id);
            cleared.push(event.id.clone());
        }
        cleared
    }

    pub fn is_notified(&self, event_id: &str, tier: AlertTier) -> bool {
        match tier {
            AlertTier::Nearby => self.notified_events.contains(event_id),
            AlertTier::Proximity => self.proximity_notified_events.contains(event_id),
        }
    }

    fn is_notified_any(&self, event_id: &str) -> bool {
        AlertTier::all()
            .iter()
            .any(|tier| self.is_notified(event_id, *tier))
    }

    /// Events that already fired the nearby tier.
    pub fn notified_event_ids(&self) -> HashSet<EventId> {
        self.notified_events.clone()
    }

    /// Events that already fired the proximity tier.
    pub fn proximity_notified_event_ids(&self) -> HashSet<EventId> {
        self.proximity_notified_events.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const MELBOURNE_CBD: Coordinate = Coordinate {
        latitude: -37.8136,
        longitude: 144.9631,
    };

    fn make_event(id: &str, home: &str, away: &str, location: Coordinate) -> Event {
        Event {
            id: id.to_string(),
            home_team: home.to_string(),
            away_team: away.to_string(),
            venue_name: format!("{} venue", id),
            venue_address: String::new(),
            location,
            event_date: Utc::now(),
            check_in_time: Utc::now(),
        }
    }

    fn tiers(commands: &[NotificationCommand]) -> Vec<(String, AlertTier)> {
        commands
            .iter()
            .map(|c| (c.event_id().to_string(), c.tier()))
            .collect()
    }

    #[test]
    fn test_same_point_fires_both_tiers() {
        let mut engine = NotificationEngine::new();
        let events = vec![make_event("e1", "Richmond", "Carlton", MELBOURNE_CBD)];

        let commands = engine.check_favorite_team_events(&["Richmond"], MELBOURNE_CBD, &events);
        assert_eq!(
            tiers(&commands),
            vec![
                ("e1".to_string(), AlertTier::Nearby),
                ("e1".to_string(), AlertTier::Proximity),
            ]
        );
        match &commands[1] {
            NotificationCommand::Proximity(n) => assert_eq!(n.distance_meters, 0.0),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_nearby_fires_only_once() {
        let mut engine = NotificationEngine::new();
        let events = vec![make_event("e1", "richmond", "Carlton", Coordinate::new(-37.8, 145.0))];

        let first = engine.check_favorite_team_events(&["Richmond"], MELBOURNE_CBD, &events);
        assert_eq!(tiers(&first), vec![("e1".to_string(), AlertTier::Nearby)]);

        for _ in 0..5 {
            let again = engine.check_favorite_team_events(&["Richmond"], MELBOURNE_CBD, &events);
            assert!(again.is_empty(), "Already notified event should stay quiet");
        }
    }

    #[test]
    fn test_tiers_fire_on_approach() {
        let mut engine = NotificationEngine::new();
        let venue = Coordinate::new(-37.8, 145.0);
        let events = vec![make_event("e1", "Richmond", "Carlton", venue)];

        let far = engine.check_favorite_team_events(&["Carlton"], MELBOURNE_CBD, &events);
        assert_eq!(tiers(&far), vec![("e1".to_string(), AlertTier::Nearby)]);

        let at_door = engine.on_location_changed(&["Carlton"], venue, &events);
        assert_eq!(tiers(&at_door), vec![("e1".to_string(), AlertTier::Proximity)]);

        assert!(engine.on_location_changed(&["Carlton"], venue, &events).is_empty());
    }

    #[test]
    fn test_empty_favorites_is_noop() {
        let mut engine = NotificationEngine::new();
        let events = vec![make_event("e1", "Richmond", "Carlton", MELBOURNE_CBD)];
        let none: Vec<String> = Vec::new();

        assert!(engine.check_favorite_team_events(&none, MELBOURNE_CBD, &events).is_empty());
        assert!(engine.notified_event_ids().is_empty());
        assert!(engine.proximity_notified_event_ids().is_empty());
    }

    #[test]
    fn test_unmatched_and_far_events_ignored() {
        let mut engine = NotificationEngine::new();
        let events = vec![
            make_event("e1", "Richmond Tigers", "Carlton", MELBOURNE_CBD),
            make_event("e2", "Richmond", "Carlton", Coordinate::new(-33.8688, 151.2093)),
        ];
        assert!(engine
            .check_favorite_team_events(&["Richmond"], MELBOURNE_CBD, &events)
            .is_empty());
    }

    #[test]
    fn test_commands_follow_input_order() {
        let mut engine = NotificationEngine::new();
        let events = vec![
            make_event("b", "Geelong", "Essendon", Coordinate::new(-37.8, 145.0)),
            make_event("a", "Richmond", "Carlton", MELBOURNE_CBD),
        ];

        let favorites = ["Geelong", "Richmond"];
        let commands = engine.check_favorite_team_events(&favorites, MELBOURNE_CBD, &events);
        assert_eq!(
            tiers(&commands),
            vec![
                ("b".to_string(), AlertTier::Nearby),
                ("a".to_string(), AlertTier::Nearby),
                ("a".to_string(), AlertTier::Proximity),
            ]
        );
    }

    #[test]
    fn test_reset_allows_refire() {
        let mut engine = NotificationEngine::new();
        let events = vec![make_event("e1", "Richmond", "Carlton", MELBOURNE_CBD)];

        let fired = engine.check_favorite_team_events(&["Richmond"], MELBOURNE_CBD, &events);
        assert_eq!(fired.len(), 2);
        engine.reset_notifications();
        engine.reset_notifications();
        let fired = engine.check_favorite_team_events(&["Richmond"], MELBOURNE_CBD, &events);
        assert_eq!(fired.len(), 2);
    }

    #[test]
    fn test_clear_is_per_event_and_idempotent() {
        let mut engine = NotificationEngine::new();
        let events = vec![
            make_event("e1", "Richmond", "Carlton", MELBOURNE_CBD),
            make_event("e2", "Richmond", "Geelong", MELBOURNE_CBD),
        ];
        engine.check_favorite_team_events(&["Richmond"], MELBOURNE_CBD, &events);

        engine.clear_event_notifications("e1");
        engine.clear_event_notifications("e1");
        engine.clear_event_notifications("does-not-exist");

        assert!(!engine.is_notified("e1", AlertTier::Nearby));
        assert!(!engine.is_notified("e1", AlertTier::Proximity));
        assert!(engine.is_notified("e2", AlertTier::Nearby));
        assert!(engine.is_notified("e2", AlertTier::Proximity));

        let commands = engine.check_favorite_team_events(&["Richmond"], MELBOURNE_CBD, &events);
        assert_eq!(
            tiers(&commands),
            vec![
                ("e1".to_string(), AlertTier::Nearby),
                ("e1".to_string(), AlertTier::Proximity),
            ]
        );
    }

    #[test]
    fn test_nan_location_fires_nothing() {
        let mut engine = NotificationEngine::new();
        let events = vec![make_event("e1", "Richmond", "Carlton", MELBOURNE_CBD)];
        let nowhere = Coordinate::new(f64::NAN, f64::NAN);

        assert!(engine.check_favorite_team_events(&["Richmond"], nowhere, &events).is_empty());
        assert!(engine.notified_event_ids().is_empty());
    }

    #[test]
    fn test_forget_unfavorited() {
        let mut engine = NotificationEngine::new();
        let events = vec![
            make_event("e1", "Richmond", "Carlton", MELBOURNE_CBD),
            make_event("e2", "Geelong", "Essendon", MELBOURNE_CBD),
        ];
        engine.check_favorite_team_events(&["Richmond", "Geelong"], MELBOURNE_CBD, &events);

        let cleared = engine.forget_unfavorited(&["Geelong"], &events);
        assert_eq!(cleared, vec!["e1".to_string()]);
        assert!(!engine.is_notified("e1", AlertTier::Nearby));
        assert!(engine.is_notified("e2", AlertTier::Proximity));

        // Nothing left to clear
        assert!(engine.forget_unfavorited(&["Geelong"], &events).is_empty());
    }

    #[test]
    fn test_custom_thresholds() {
        let mut engine = NotificationEngine::with_thresholds(TierThresholds {
            nearby_km: 1.0,
            proximity_m: 100.0,
        });
        let events = vec![make_event("e1", "Richmond", "Carlton", Coordinate::new(-37.8, 145.0))];
        assert!(engine
            .check_favorite_team_events(&["Richmond"], MELBOURNE_CBD, &events)
            .is_empty());

        engine.update_thresholds(TierThresholds::default());
        let fired = engine.check_favorite_team_events(&["Richmond"], MELBOURNE_CBD, &events);
        assert_eq!(fired.len(), 1);
    }
}
