// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    config::Config,
    error::AppError,
    repo::{DriveStore, ExamStore, InMemoryStore},
    utils::hash::hash_password,
};

/// The administrator allowed to sign in, with the password already hashed.
#[derive(Clone)]
pub struct AdminAccount {
    pub username: String,
    pub password_hash: String,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub drives: DriveStore,
    pub exams: ExamStore,
    pub admin: Option<AdminAccount>,
}

impl AppState {
    /// Hashes the configured admin password once so logins never see plaintext.
    pub fn new(config: Config, drives: DriveStore, exams: ExamStore) -> Result<Self, AppError> {
        let admin = match (&config.admin_username, &config.admin_password) {
            (Some(username), Some(password)) => Some(AdminAccount {
                username: username.clone(),
                password_hash: hash_password(password)?,
            }),
            _ => {
                tracing::warn!("ADMIN_USERNAME/ADMIN_PASSWORD not set; admin login is disabled");
                None
            }
        };

        Ok(Self {
            config,
            drives,
            exams,
            admin,
        })
    }

    /// State backed by a fresh [`InMemoryStore`].
    pub fn in_memory(config: Config) -> Result<Self, AppError> {
        let store = InMemoryStore::new();
        Self::new(config, Arc::new(store.clone()), Arc::new(store))
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for DriveStore {
    fn from_ref(state: &AppState) -> Self {
        state.drives.clone()
    }
}

impl FromRef<AppState> for ExamStore {
    fn from_ref(state: &AppState) -> Self {
        state.exams.clone()
    }
}
