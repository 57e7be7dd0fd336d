//! Collaborators the coordinator talks to: user records, active events and
//! notification delivery.
//!
//! Hosts plug in their own backends; the in-memory versions here back the
//! CLI snapshot mode and the tests.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};

use super::alerts::model::NotificationCommand;
use super::error::{Result, WatchError};
use super::model::{Event, UserProfile};

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Fails with [`WatchError::UserNotFound`] for unknown ids.
    async fn get_user(&self, user_id: &str) -> Result<UserProfile>;
}

#[async_trait]
pub trait EventSource: Send + Sync {
    async fn get_all_active_events(&self) -> Result<Vec<Event>>;
}

#[async_trait]
pub trait NotificationDelivery: Send + Sync {
    async fn deliver(&self, command: &NotificationCommand) -> Result<()>;
}

#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<String, UserProfile>>,
}

impl InMemoryUserDirectory {
    pub fn new(users: impl IntoIterator<Item = UserProfile>) -> Self {
        Self {
            users: RwLock::new(users.into_iter().map(|u| (u.id.clone(), u)).collect()),
        }
    }

    pub async fn upsert(&self, user: UserProfile) {
        self.users.write().await.insert(user.id.clone(), user);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn get_user(&self, user_id: &str) -> Result<UserProfile> {
        self.users
            .read()
            .await
            .get(user_id)
            .cloned()
            .ok_or_else(|| WatchError::UserNotFound(user_id.to_string()))
    }
}

#[derive(Default)]
pub struct InMemoryEventSource {
    events: RwLock<Vec<Event>>,
}

impl InMemoryEventSource {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events: RwLock::new(events),
        }
    }

    pub async fn set_events(&self, events: Vec<Event>) {
        *self.events.write().await = events;
    }
}

#[async_trait]
impl EventSource for InMemoryEventSource {
    async fn get_all_active_events(&self) -> Result<Vec<Event>> {
        Ok(self.events.read().await.clone())
    }
}

/// Keeps every delivered command; useful for tests and dry runs.
#[derive(Default)]
pub struct CollectingDelivery {
    delivered: Mutex<Vec<NotificationCommand>>,
}

impl CollectingDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn delivered(&self) -> Vec<NotificationCommand> {
        self.delivered.lock().await.clone()
    }

    pub async fn take(&self) -> Vec<NotificationCommand> {
        std::mem::take(&mut *self.delivered.lock().await)
    }
}

#[async_trait]
impl NotificationDelivery for CollectingDelivery {
    async fn deliver(&self, command: &NotificationCommand) -> Result<()> {
        self.delivered.lock().await.push(command.clone());
        Ok(())
    }
}

/// Users and events loaded from one JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub users: Vec<UserProfile>,
    #[serde(default)]
    pub events: Vec<Event>,
}

impl Snapshot {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn into_sources(self) -> (InMemoryUserDirectory, InMemoryEventSource) {
        (
            InMemoryUserDirectory::new(self.users),
            InMemoryEventSource::new(self.events),
        )
    }
}
