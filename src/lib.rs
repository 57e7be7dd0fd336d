#![warn(clippy::all)]
pub mod core;

pub use crate::core::alerts::engine::NotificationEngine;
pub use crate::core::alerts::model::{AlertTier, NotificationCommand, TierThresholds};
pub use crate::core::coordinator::NotificationCoordinator;
pub use crate::core::error::{Result, WatchError};
pub use crate::core::model::{Coordinate, Event, UserProfile};
