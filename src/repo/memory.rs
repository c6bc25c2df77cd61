// src/repo/memory.rs

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use chrono::Utc;

use super::{DriveRepository, ExamRepository, StorageError};
use crate::models::{
    campus_drive::{CampusDrive, DriveFilter, DrivePatch, DriveSort, NewDrive},
    exam::{CreateExamRequest, Exam, NewQuizResult, QuizResult},
};

#[derive(Default)]
struct Tables {
    next_id: i64,
    drives: BTreeMap<i64, CampusDrive>,
    exams: BTreeMap<i64, Exam>,
    results: Vec<QuizResult>,
}

impl Tables {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Process-local store used when no database is configured, and by tests.
/// A single mutex makes each operation atomic.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StorageError> {
        self.tables.lock().map_err(|_| StorageError::Poisoned)
    }
}

#[async_trait]
impl DriveRepository for InMemoryStore {
    async fn list_drives(
        &self,
        filter: DriveFilter,
        sort: DriveSort,
    ) -> Result<Vec<CampusDrive>, StorageError> {
        let guard = self.lock()?;
        let mut drives: Vec<CampusDrive> = guard
            .drives
            .values()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect();
        drives.sort_by(|a, b| sort.compare(a, b));
        Ok(drives)
    }

    async fn get_drive(&self, id: i64) -> Result<Option<CampusDrive>, StorageError> {
        Ok(self.lock()?.drives.get(&id).cloned())
    }

    async fn insert_drive(&self, drive: NewDrive) -> Result<CampusDrive, StorageError> {
        let mut guard = self.lock()?;
        let id = guard.allocate_id();
        let now = Utc::now();
        let record = CampusDrive {
            id,
            company_name: drive.company_name,
            job_description: drive.job_description,
            date_of_first_round: drive.date_of_first_round,
            category: drive.category,
            package: drive.package,
            study_material_url: drive.study_material_url,
            company_website: drive.company_website,
            notes: drive.notes,
            is_active: drive.is_active,
            priority: drive.priority,
            created_by: drive.created_by,
            created_at: now,
            updated_at: now,
        };
        guard.drives.insert(id, record.clone());
        Ok(record)
    }

    async fn update_drive(
        &self,
        id: i64,
        patch: DrivePatch,
    ) -> Result<Option<CampusDrive>, StorageError> {
        let mut guard = self.lock()?;
        let Some(drive) = guard.drives.get_mut(&id) else {
            return Ok(None);
        };
        if patch.apply(drive) {
            drive.updated_at = Utc::now();
        }
        Ok(Some(drive.clone()))
    }

    async fn delete_drive(&self, id: i64) -> Result<bool, StorageError> {
        Ok(self.lock()?.drives.remove(&id).is_some())
    }

    async fn toggle_drive(&self, id: i64) -> Result<Option<CampusDrive>, StorageError> {
        let mut guard = self.lock()?;
        Ok(guard.drives.get_mut(&id).map(|drive| {
            drive.is_active = !drive.is_active;
            drive.updated_at = Utc::now();
            drive.clone()
        }))
    }
}

#[async_trait]
impl ExamRepository for InMemoryStore {
    async fn list_exams(&self) -> Result<Vec<Exam>, StorageError> {
        Ok(self.lock()?.exams.values().cloned().collect())
    }

    async fn get_exam(&self, id: i64) -> Result<Option<Exam>, StorageError> {
        Ok(self.lock()?.exams.get(&id).cloned())
    }

    async fn insert_exam(&self, exam: CreateExamRequest) -> Result<Exam, StorageError> {
        let mut guard = self.lock()?;
        let id = guard.allocate_id();
        let record = Exam {
            id,
            name: exam.name,
            duration_minutes: exam.duration_minutes,
            questions: exam.questions,
            created_at: Utc::now(),
        };
        guard.exams.insert(id, record.clone());
        Ok(record)
    }

    async fn delete_exam(&self, id: i64) -> Result<bool, StorageError> {
        let mut guard = self.lock()?;
        let removed = guard.exams.remove(&id).is_some();
        if removed {
            guard.results.retain(|r| r.exam_id != id);
        }
        Ok(removed)
    }

    async fn insert_result(&self, result: NewQuizResult) -> Result<QuizResult, StorageError> {
        let mut guard = self.lock()?;
        if !guard.exams.contains_key(&result.exam_id) {
            return Err(StorageError::NotFound);
        }
        let id = guard.allocate_id();
        let record = QuizResult {
            id,
            exam_id: result.exam_id,
            student_name: result.student_name,
            usn: result.usn,
            score: result.score.score as i32,
            total_questions: result.score.total_questions as i32,
            answers: result.answers,
            started_at: result.started_at,
            submitted_at: result.submitted_at,
            created_at: Utc::now(),
        };
        guard.results.push(record.clone());
        Ok(record)
    }

    async fn list_results(&self, exam_id: i64) -> Result<Vec<QuizResult>, StorageError> {
        let guard = self.lock()?;
        let mut results: Vec<QuizResult> = guard
            .results
            .iter()
            .filter(|r| r.exam_id == exam_id)
            .cloned()
            .collect();
        results.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.submitted_at.cmp(&b.submitted_at)));
        Ok(results)
    }
}
