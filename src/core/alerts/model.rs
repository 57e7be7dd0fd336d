// Alert model types: tiers, thresholds and the commands handed to delivery.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::geo::{NEARBY_RADIUS_KM, PROXIMITY_RADIUS_M};
use crate::core::model::{Event, EventId};

/// The two independent notification tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertTier {
    /// Favorite team playing within the coarse radius
    Nearby,
    /// User standing at the venue
    Proximity,
}

impl AlertTier {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Nearby => "Nearby Event",
            Self::Proximity => "At The Venue",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Nearby => "Alert when a favorite team's watch-along is within a few kilometers",
            Self::Proximity => "Alert when you are standing at a favorite team's watch-along venue",
        }
    }

    /// Delivery channel the host should post this tier on.
    pub fn channel_id(&self) -> &'static str {
        match self {
            Self::Nearby => "nearby_events",
            Self::Proximity => "proximity_events",
        }
    }

    pub fn all() -> &'static [AlertTier] {
        &[Self::Nearby, Self::Proximity]
    }
}

/// Radii for both tiers. Defaults are 5 km and 100 m.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierThresholds {
    #[serde(default = "default_nearby_km")]
    pub nearby_km: f64,
    #[serde(default = "default_proximity_m")]
    pub proximity_m: f64,
}

fn default_nearby_km() -> f64 {
    NEARBY_RADIUS_KM
}

fn default_proximity_m() -> f64 {
    PROXIMITY_RADIUS_M
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            nearby_km: NEARBY_RADIUS_KM,
            proximity_m: PROXIMITY_RADIUS_M,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyNotification {
    pub event_id: EventId,
    pub home_team: String,
    pub away_team: String,
    pub venue_name: String,
    pub venue_address: String,
    pub event_date: DateTime<Utc>,
    pub check_in_time: DateTime<Utc>,
    pub distance_km: f64,
}

impl NearbyNotification {
    pub fn from_event(event: &Event, distance_km: f64) -> Self {
        Self {
            event_id: event.id.clone(),
            home_team: event.home_team.clone(),
            away_team: event.away_team.clone(),
            venue_name: event.venue_name.clone(),
            venue_address: event.venue_address.clone(),
            event_date: event.event_date,
            check_in_time: event.check_in_time,
            distance_km,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProximityNotification {
    pub event_id: EventId,
    pub home_team: String,
    pub away_team: String,
    pub check_in_time: DateTime<Utc>,
    pub venue_name: String,
    pub venue_address: String,
    pub distance_meters: f64,
}

impl ProximityNotification {
    pub fn from_event(event: &Event, distance_meters: f64) -> Self {
        Self {
            event_id: event.id.clone(),
            home_team: event.home_team.clone(),
            away_team: event.away_team.clone(),
            check_in_time: event.check_in_time,
            venue_name: event.venue_name.clone(),
            venue_address: event.venue_address.clone(),
            distance_meters,
        }
    }
}

/// A notification the engine decided to fire. Delivery is up to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum NotificationCommand {
    Nearby(NearbyNotification),
    Proximity(ProximityNotification),
}

impl NotificationCommand {
    pub fn event_id(&self) -> &str {
        match self {
            Self::Nearby(n) => &n.event_id,
            Self::Proximity(n) => &n.event_id,
        }
    }

    pub fn tier(&self) -> AlertTier {
        match self {
            Self::Nearby(_) => AlertTier::Nearby,
            Self::Proximity(_) => AlertTier::Proximity,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Nearby(_) => "Your team is playing nearby!",
            Self::Proximity(_) => "You're at the venue!",
        }
    }

    pub fn body(&self) -> String {
        match self {
            Self::Nearby(n) => format!(
                "{} vs {} at {} ({:.1} km away). Check-in opens {}",
                n.home_team,
                n.away_team,
                n.venue_name,
                n.distance_km,
                n.check_in_time.format("%H:%M")
            ),
            Self::Proximity(n) => format!(
                "{} vs {} is on at {}. Check in from {}",
                n.home_team,
                n.away_team,
                n.venue_name,
                n.check_in_time.format("%H:%M")
            ),
        }
    }

    /// Channel, copy and payload, ready for a delivery backend.
    pub fn to_message(&self) -> NotificationMessage {
        let tier = self.tier();
        NotificationMessage {
            channel_id: tier.channel_id().to_string(),
            category: tier.display_name().to_string(),
            title: self.title().to_string(),
            body: self.body(),
            command: self.clone(),
        }
    }
}

/// A rendered notification as handed to the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub channel_id: String,
    pub category: String,
    pub title: String,
    pub body: String,
    pub command: NotificationCommand,
}
