// src/repo/mod.rs

//! Storage contracts for drives and exams.
//!
//! Handlers only see the traits; `main` picks PostgreSQL when a database URL
//! is configured and the in-memory store otherwise.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    campus_drive::{CampusDrive, DriveFilter, DrivePatch, DriveSort, NewDrive},
    exam::{CreateExamRequest, Exam, NewQuizResult, QuizResult},
};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("storage lock poisoned")]
    Poisoned,
}

#[async_trait]
pub trait DriveRepository: Send + Sync {
    /// Drives matching `filter`, ordered by `sort`.
    async fn list_drives(
        &self,
        filter: DriveFilter,
        sort: DriveSort,
    ) -> Result<Vec<CampusDrive>, StorageError>;

    async fn get_drive(&self, id: i64) -> Result<Option<CampusDrive>, StorageError>;

    async fn insert_drive(&self, drive: NewDrive) -> Result<CampusDrive, StorageError>;

    /// Applies `patch` and bumps `updated_at`. `None` when the drive does not exist.
    async fn update_drive(
        &self,
        id: i64,
        patch: DrivePatch,
    ) -> Result<Option<CampusDrive>, StorageError>;

    /// Returns whether a row was removed.
    async fn delete_drive(&self, id: i64) -> Result<bool, StorageError>;

    /// Flips `is_active` in a single step.
    async fn toggle_drive(&self, id: i64) -> Result<Option<CampusDrive>, StorageError>;
}

#[async_trait]
pub trait ExamRepository: Send + Sync {
    /// All exams, oldest first.
    async fn list_exams(&self) -> Result<Vec<Exam>, StorageError>;

    async fn get_exam(&self, id: i64) -> Result<Option<Exam>, StorageError>;

    async fn insert_exam(&self, exam: CreateExamRequest) -> Result<Exam, StorageError>;

    async fn delete_exam(&self, id: i64) -> Result<bool, StorageError>;

    async fn insert_result(&self, result: NewQuizResult) -> Result<QuizResult, StorageError>;

    /// Results for one exam, best score first.
    async fn list_results(&self, exam_id: i64) -> Result<Vec<QuizResult>, StorageError>;
}

pub type DriveStore = Arc<dyn DriveRepository>;
pub type ExamStore = Arc<dyn ExamRepository>;
