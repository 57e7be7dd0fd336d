// Favorite-team alert system.
//
// Architecture:
// - model.rs: Tiers, thresholds and notification commands
// - triggers.rs: Team matching and per-tier distance triggers
// - engine.rs: Notified state and the evaluation loop

pub mod engine;
pub mod model;
pub mod triggers;
