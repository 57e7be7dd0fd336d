use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type EventId = String;
pub type UserId = String;
pub type TeamName = String;

/// WGS84 position in degrees. Not range-checked.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    pub fn distance_meters(&self, other: &Coordinate) -> f64 {
        super::geo::haversine_distance_meters(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }
}

/// Snapshot of a hosted watch-along event, as supplied by the event source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub home_team: TeamName,
    pub away_team: TeamName,
    #[serde(default)]
    pub venue_name: String,
    #[serde(default)]
    pub venue_address: String,
    pub location: Coordinate,
    pub event_date: DateTime<Utc>,
    pub check_in_time: DateTime<Utc>,
}

/// The slice of a user record the notification engine reads.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub favorite_teams: Vec<TeamName>,
}

impl UserProfile {
    pub fn has_favorites(&self) -> bool {
        !self.favorite_teams.is_empty()
    }
}
