// src/repo/postgres.rs

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, types::Json};

use super::{DriveRepository, ExamRepository, StorageError};
use crate::models::{
    campus_drive::{CampusDrive, DriveFilter, DrivePatch, DriveRow, DriveSort, NewDrive},
    exam::{CreateExamRequest, Exam, NewQuizResult, QuizResult},
};

const DRIVE_COLUMNS: &str = "id, company_name, job_description, date_of_first_round, category, \
    package, study_material_url, company_website, notes, is_active, priority, created_by, \
    created_at, updated_at";

const EXAM_COLUMNS: &str = "id, name, duration_minutes, questions, created_at";

const RESULT_COLUMNS: &str = "id, exam_id, student_name, usn, score, total_questions, answers, \
    started_at, submitted_at, created_at";

/// PostgreSQL-backed store. Every mutation is a single statement.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn to_drive(row: DriveRow) -> Result<CampusDrive, StorageError> {
    CampusDrive::try_from(row).map_err(StorageError::Corrupt)
}

#[async_trait]
impl DriveRepository for PgStore {
    async fn list_drives(
        &self,
        filter: DriveFilter,
        sort: DriveSort,
    ) -> Result<Vec<CampusDrive>, StorageError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM campus_drives WHERE TRUE", DRIVE_COLUMNS));

        if let Some(category) = filter.category {
            builder.push(" AND category = ");
            builder.push_bind(category.as_str());
        }
        if filter.active_only {
            builder.push(" AND is_active = TRUE");
        }
        builder.push(" ORDER BY ");
        builder.push(sort.order_by());

        let rows: Vec<DriveRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(to_drive).collect()
    }

    async fn get_drive(&self, id: i64) -> Result<Option<CampusDrive>, StorageError> {
        let row: Option<DriveRow> = sqlx::query_as(&format!(
            "SELECT {} FROM campus_drives WHERE id = $1",
            DRIVE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(to_drive).transpose()
    }

    async fn insert_drive(&self, drive: NewDrive) -> Result<CampusDrive, StorageError> {
        let row: DriveRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO campus_drives
            (company_name, job_description, date_of_first_round, category, package,
             study_material_url, company_website, notes, is_active, priority, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            DRIVE_COLUMNS
        ))
        .bind(drive.company_name)
        .bind(drive.job_description)
        .bind(drive.date_of_first_round)
        .bind(drive.category.as_str())
        .bind(drive.package)
        .bind(drive.study_material_url)
        .bind(drive.company_website)
        .bind(drive.notes)
        .bind(drive.is_active)
        .bind(drive.priority)
        .bind(drive.created_by)
        .fetch_one(&self.pool)
        .await?;

        to_drive(row)
    }

    async fn update_drive(
        &self,
        id: i64,
        patch: DrivePatch,
    ) -> Result<Option<CampusDrive>, StorageError> {
        if patch.is_empty() {
            return self.get_drive(id).await;
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE campus_drives SET ");
        let mut separated = builder.separated(", ");

        if let Some(company_name) = patch.company_name {
            separated.push("company_name = ");
            separated.push_bind_unseparated(company_name);
        }
        if let Some(job_description) = patch.job_description {
            separated.push("job_description = ");
            separated.push_bind_unseparated(job_description);
        }
        if let Some(date) = patch.date_of_first_round {
            separated.push("date_of_first_round = ");
            separated.push_bind_unseparated(date);
        }
        if let Some(category) = patch.category {
            separated.push("category = ");
            separated.push_bind_unseparated(category.as_str());
        }
        if let Some(package) = patch.package {
            separated.push("package = ");
            separated.push_bind_unseparated(package);
        }
        if let Some(url) = patch.study_material_url {
            separated.push("study_material_url = ");
            separated.push_bind_unseparated(url);
        }
        if let Some(url) = patch.company_website {
            separated.push("company_website = ");
            separated.push_bind_unseparated(url);
        }
        if let Some(notes) = patch.notes {
            separated.push("notes = ");
            separated.push_bind_unseparated(notes);
        }
        if let Some(is_active) = patch.is_active {
            separated.push("is_active = ");
            separated.push_bind_unseparated(is_active);
        }
        if let Some(priority) = patch.priority {
            separated.push("priority = ");
            separated.push_bind_unseparated(priority);
        }
        separated.push("updated_at = NOW()");

        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(" RETURNING ");
        builder.push(DRIVE_COLUMNS);

        let row: Option<DriveRow> = builder.build_query_as().fetch_optional(&self.pool).await?;
        row.map(to_drive).transpose()
    }

    async fn delete_drive(&self, id: i64) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM campus_drives WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn toggle_drive(&self, id: i64) -> Result<Option<CampusDrive>, StorageError> {
        let row: Option<DriveRow> = sqlx::query_as(&format!(
            r#"
            UPDATE campus_drives
            SET is_active = NOT is_active, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            DRIVE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(to_drive).transpose()
    }
}

#[async_trait]
impl ExamRepository for PgStore {
    async fn list_exams(&self) -> Result<Vec<Exam>, StorageError> {
        let exams = sqlx::query_as(&format!("SELECT {} FROM exams ORDER BY id ASC", EXAM_COLUMNS))
            .fetch_all(&self.pool)
            .await?;

        Ok(exams)
    }

    async fn get_exam(&self, id: i64) -> Result<Option<Exam>, StorageError> {
        let exam = sqlx::query_as(&format!("SELECT {} FROM exams WHERE id = $1", EXAM_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(exam)
    }

    async fn insert_exam(&self, exam: CreateExamRequest) -> Result<Exam, StorageError> {
        let exam = sqlx::query_as(&format!(
            r#"
            INSERT INTO exams (name, duration_minutes, questions)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            EXAM_COLUMNS
        ))
        .bind(exam.name)
        .bind(exam.duration_minutes)
        .bind(Json(exam.questions))
        .fetch_one(&self.pool)
        .await?;

        Ok(exam)
    }

    async fn delete_exam(&self, id: i64) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM exams WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_result(&self, result: NewQuizResult) -> Result<QuizResult, StorageError> {
        let record = sqlx::query_as(&format!(
            r#"
            INSERT INTO quiz_results
            (exam_id, student_name, usn, score, total_questions, answers, started_at, submitted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            RESULT_COLUMNS
        ))
        .bind(result.exam_id)
        .bind(result.student_name)
        .bind(result.usn)
        .bind(result.score.score as i32)
        .bind(result.score.total_questions as i32)
        .bind(Json(result.answers))
        .bind(result.started_at)
        .bind(result.submitted_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // exam deleted between lookup and insert
            let missing_exam = e
                .as_database_error()
                .is_some_and(|db| db.is_foreign_key_violation());
            if missing_exam {
                StorageError::NotFound
            } else {
                StorageError::Database(e)
            }
        })?;

        Ok(record)
    }

    async fn list_results(&self, exam_id: i64) -> Result<Vec<QuizResult>, StorageError> {
        let results = sqlx::query_as(&format!(
            "SELECT {} FROM quiz_results WHERE exam_id = $1 ORDER BY score DESC, submitted_at ASC",
            RESULT_COLUMNS
        ))
        .bind(exam_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(results)
    }
}
