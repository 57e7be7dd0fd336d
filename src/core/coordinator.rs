use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Mutex;

use super::alerts::engine::NotificationEngine;
use super::alerts::model::NotificationCommand;
use super::config::Settings;
use super::error::{Result, WatchError};
use super::model::{Coordinate, EventId, UserId};
use super::sources::{EventSource, NotificationDelivery, UserDirectory};

/// Drives the notification engine for one signed-in user: fetches the user
/// and active events, evaluates, and hands the results to delivery.
///
/// The engine sits behind a mutex so overlapping ticks (location callback
/// plus manual refresh) cannot both see an event as un-notified.
pub struct NotificationCoordinator {
    user_id: UserId,
    users: Arc<dyn UserDirectory>,
    events: Arc<dyn EventSource>,
    delivery: Arc<dyn NotificationDelivery>,
    engine: Mutex<NotificationEngine>,
    clear_stale_on_unfavorite: bool,
}

impl NotificationCoordinator {
    pub fn new(
        user_id: impl Into<UserId>,
        users: Arc<dyn UserDirectory>,
        events: Arc<dyn EventSource>,
        delivery: Arc<dyn NotificationDelivery>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            users,
            events,
            delivery,
            engine: Mutex::new(NotificationEngine::new()),
            clear_stale_on_unfavorite: false,
        }
    }

    pub fn with_settings(mut self, settings: &Settings) -> Self {
        self.engine = Mutex::new(NotificationEngine::with_thresholds(settings.thresholds));
        self.clear_stale_on_unfavorite = settings.clear_stale_on_unfavorite;
        self
    }

    /// Apply new settings without dropping notified state.
    pub async fn update_settings(&mut self, settings: &Settings) {
        self.engine.lock().await.update_thresholds(settings.thresholds);
        self.clear_stale_on_unfavorite = settings.clear_stale_on_unfavorite;
    }

    /// One evaluation at `location`. Returns the commands that fired, after
    /// handing each to delivery.
    ///
    /// A missing user or one without favorites yields no commands. An event
    /// source failure is returned as [`WatchError::EventFetch`] and leaves
    /// notified state untouched.
    pub async fn tick(&self, location: Coordinate) -> Result<Vec<NotificationCommand>> {
        let favorite_teams = match self.users.get_user(&self.user_id).await {
            Ok(user) => user.favorite_teams,
            Err(WatchError::UserNotFound(id)) => {
                log::debug!("User {} not found, nothing to evaluate", id);
                return Ok(Vec::new());
            }
            Err(e) => {
                log::warn!("Failed to load user {}: {}", self.user_id, e);
                return Ok(Vec::new());
            }
        };

        if favorite_teams.is_empty() && !self.clear_stale_on_unfavorite {
            log::debug!("User {} has no favorite teams", self.user_id);
            return Ok(Vec::new());
        }

        let active_events = match self.events.get_all_active_events().await {
            Ok(events) => events,
            // Only reachable with stale clearing on; not a failure without favorites.
            Err(e) if favorite_teams.is_empty() => {
                log::warn!("Skipping stale clear for user {}: {}", self.user_id, e);
                return Ok(Vec::new());
            }
            Err(WatchError::EventFetch(msg)) => return Err(WatchError::EventFetch(msg)),
            Err(other) => return Err(WatchError::EventFetch(other.to_string())),
        };

        let commands = {
            let mut engine = self.engine.lock().await;
            if self.clear_stale_on_unfavorite {
                let cleared = engine.forget_unfavorited(&favorite_teams, &active_events);
                if !cleared.is_empty() {
                    log::info!(
                        "Cleared {} events no longer featuring a favorite",
                        cleared.len()
                    );
                }
            }
            engine.check_favorite_team_events(&favorite_teams, location, &active_events)
        };

        for command in &commands {
            // Notified state is already set; a failed delivery is not retried.
            if let Err(e) = self.delivery.deliver(command).await {
                log::warn!("{}", e);
            }
        }

        Ok(commands)
    }

    pub async fn on_location_changed(
        &self,
        new_location: Coordinate,
    ) -> Result<Vec<NotificationCommand>> {
        self.tick(new_location).await
    }

    pub async fn clear_event_notifications(&self, event_id: &str) {
        self.engine.lock().await.clear_event_notifications(event_id);
    }

    pub async fn reset_notifications(&self) {
        self.engine.lock().await.reset_notifications();
    }

    pub async fn notified_event_ids(&self) -> HashSet<EventId> {
        self.engine.lock().await.notified_event_ids()
    }

    pub async fn proximity_notified_event_ids(&self) -> HashSet<EventId> {
        self.engine.lock().await.proximity_notified_event_ids()
    }
}
