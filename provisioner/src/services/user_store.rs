//! JSON-file backed user-record store

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use async_trait::async_trait;
use tokio::sync::RwLock;

use shared::{run_debug, CreationState, UserProfile, Username};
use crate::error::{ProvisionerError, ProvisionerResult};
use crate::traits::UserStore;

/// In-memory user store, optionally loaded from and saved to a JSON array file
#[derive(Clone, Default)]
pub struct JsonUserStore {
    users: Arc<RwLock<HashMap<Username, UserProfile>>>,
    path: Option<PathBuf>,
}

impl JsonUserStore {
    /// Create an empty store with no backing file
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given profiles
    pub fn from_profiles(profiles: impl IntoIterator<Item = UserProfile>) -> Self {
        let users = profiles
            .into_iter()
            .map(|profile| (profile.username.clone(), profile))
            .collect();
        Self {
            users: Arc::new(RwLock::new(users)),
            path: None,
        }
    }

    /// Load profiles from a JSON file; `save` writes back to the same file
    pub async fn load(path: impl AsRef<Path>) -> ProvisionerResult<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path).await?;
        let profiles: Vec<UserProfile> = serde_json::from_str(&contents)?;
        run_debug!("Loaded {} user records from {}", profiles.len(), path.display());

        let mut store = Self::from_profiles(profiles);
        store.path = Some(path.to_path_buf());
        Ok(store)
    }

    /// Write all profiles back to the backing file, sorted by username
    pub async fn save(&self) -> ProvisionerResult<()> {
        let path = self.path.as_ref().ok_or_else(|| ProvisionerError::UserStore {
            message: "store has no backing file".to_string(),
        })?;

        let mut profiles: Vec<UserProfile> = self.users.read().await.values().cloned().collect();
        profiles.sort_by(|a, b| a.username.cmp(&b.username));
        let contents = serde_json::to_string_pretty(&profiles)?;
        tokio::fs::write(path, contents).await?;
        run_debug!("Saved {} user records to {}", profiles.len(), path.display());
        Ok(())
    }

    /// Add or replace a profile
    pub async fn insert(&self, profile: UserProfile) {
        let mut users = self.users.write().await;
        users.insert(profile.username.clone(), profile);
    }

    /// Usernames whose creation state equals `state`, sorted
    pub async fn usernames_in_state(&self, state: CreationState) -> Vec<Username> {
        let users = self.users.read().await;
        let mut names: Vec<Username> = users
            .values()
            .filter(|profile| profile.creation_state == state)
            .map(|profile| profile.username.clone())
            .collect();
        names.sort();
        names
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for JsonUserStore {
    async fn find_by_username(&self, username: &Username) -> ProvisionerResult<Option<UserProfile>> {
        let users = self.users.read().await;
        Ok(users.get(username).cloned())
    }

    async fn set_creation_state(&self, username: &Username, state: CreationState) -> ProvisionerResult<()> {
        let mut users = self.users.write().await;
        let profile = users.get_mut(username).ok_or_else(|| ProvisionerError::UserStore {
            message: format!("no user record for {username}"),
        })?;
        profile.creation_state = state;
        Ok(())
    }
}
