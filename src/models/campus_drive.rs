// src/models/campus_drive.rs

use std::{cmp::Ordering, fmt, str::FromStr, sync::LazyLock};

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use url::Url;
use validator::{Validate, ValidationError};

use crate::utils::html::clean_html;

static HTTP_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("valid url pattern"));

/// Placement tier of a drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DriveCategory {
    #[serde(rename = "Super Dream")]
    SuperDream,
    Dream,
    Regular,
}

impl DriveCategory {
    pub const ALL: [DriveCategory; 3] = [
        DriveCategory::SuperDream,
        DriveCategory::Dream,
        DriveCategory::Regular,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DriveCategory::SuperDream => "Super Dream",
            DriveCategory::Dream => "Dream",
            DriveCategory::Regular => "Regular",
        }
    }
}

impl fmt::Display for DriveCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DriveCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DriveCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown drive category '{}'", s))
    }
}

/// A campus recruitment drive as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampusDrive {
    pub id: i64,
    pub company_name: String,
    pub job_description: String,
    pub date_of_first_round: NaiveDate,
    pub category: DriveCategory,
    pub package: String,
    pub study_material_url: Option<String>,
    pub company_website: Option<String>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub priority: i32,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw 'campus_drives' row; the category column is plain TEXT.
#[derive(Debug, FromRow)]
pub struct DriveRow {
    pub id: i64,
    pub company_name: String,
    pub job_description: String,
    pub date_of_first_round: NaiveDate,
    pub category: String,
    pub package: String,
    pub study_material_url: Option<String>,
    pub company_website: Option<String>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub priority: i32,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DriveRow> for CampusDrive {
    type Error = String;

    fn try_from(row: DriveRow) -> Result<Self, Self::Error> {
        Ok(CampusDrive {
            id: row.id,
            company_name: row.company_name,
            job_description: row.job_description,
            date_of_first_round: row.date_of_first_round,
            category: row.category.parse()?,
            package: row.package,
            study_material_url: row.study_material_url,
            company_website: row.company_website,
            notes: row.notes,
            is_active: row.is_active,
            priority: row.priority,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Ordering options for the drive listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum DriveSort {
    #[default]
    #[serde(rename = "dateOfFirstRound")]
    DateOfFirstRound,
    #[serde(rename = "priority")]
    Priority,
    #[serde(rename = "companyName")]
    CompanyName,
    #[serde(rename = "newest")]
    Newest,
}

impl DriveSort {
    /// SQL `ORDER BY` body matching [`DriveSort::compare`].
    pub fn order_by(&self) -> &'static str {
        match self {
            DriveSort::DateOfFirstRound => "date_of_first_round ASC, priority DESC, id ASC",
            DriveSort::Priority => "priority DESC, date_of_first_round ASC, id ASC",
            DriveSort::CompanyName => "LOWER(company_name) ASC, id ASC",
            DriveSort::Newest => "created_at DESC, id ASC",
        }
    }

    pub fn compare(&self, a: &CampusDrive, b: &CampusDrive) -> Ordering {
        let primary = match self {
            DriveSort::DateOfFirstRound => a
                .date_of_first_round
                .cmp(&b.date_of_first_round)
                .then_with(|| b.priority.cmp(&a.priority)),
            DriveSort::Priority => b
                .priority
                .cmp(&a.priority)
                .then_with(|| a.date_of_first_round.cmp(&b.date_of_first_round)),
            DriveSort::CompanyName => a
                .company_name
                .to_lowercase()
                .cmp(&b.company_name.to_lowercase()),
            DriveSort::Newest => b.created_at.cmp(&a.created_at),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

/// Query parameters for `GET /api/campus-drives`.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub category: Option<DriveCategory>,
    /// Only active drives unless explicitly `false`.
    pub active: Option<bool>,
    pub sort: Option<DriveSort>,
}

/// Listing filter handed to the repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriveFilter {
    pub category: Option<DriveCategory>,
    pub active_only: bool,
}

impl DriveFilter {
    pub fn matches(&self, drive: &CampusDrive) -> bool {
        if self.active_only && !drive.is_active {
            return false;
        }
        self.category.is_none_or(|c| c == drive.category)
    }
}

impl From<&ListParams> for DriveFilter {
    fn from(params: &ListParams) -> Self {
        DriveFilter {
            category: params.category,
            active_only: params.active.unwrap_or(true),
        }
    }
}

/// DTO for creating a drive.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDriveRequest {
    #[validate(length(min = 2, max = 100, message = "Company name must be between 2 and 100 characters"))]
    pub company_name: String,
    #[validate(length(min = 10, max = 5000, message = "Job description must be between 10 and 5000 characters"))]
    pub job_description: String,
    #[validate(custom(function = validate_not_past))]
    pub date_of_first_round: NaiveDate,
    #[validate(custom(function = validate_category))]
    pub category: String,
    #[validate(length(min = 1, max = 100, message = "Package must be between 1 and 100 characters"))]
    pub package: String,
    #[validate(custom(function = validate_http_url))]
    pub study_material_url: Option<String>,
    #[validate(custom(function = validate_http_url))]
    pub company_website: Option<String>,
    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,
    pub is_active: Option<bool>,
    #[validate(range(min = 0, max = 10, message = "Priority must be between 0 and 10"))]
    pub priority: Option<i32>,
}

/// DTO for updating a drive. Absent fields are left alone;
/// an empty string clears an optional text field.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDriveRequest {
    #[validate(length(min = 2, max = 100, message = "Company name must be between 2 and 100 characters"))]
    pub company_name: Option<String>,
    #[validate(length(min = 10, max = 5000, message = "Job description must be between 10 and 5000 characters"))]
    pub job_description: Option<String>,
    #[validate(custom(function = validate_not_past))]
    pub date_of_first_round: Option<NaiveDate>,
    #[validate(custom(function = validate_category))]
    pub category: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Package must be between 1 and 100 characters"))]
    pub package: Option<String>,
    #[validate(custom(function = validate_http_url))]
    pub study_material_url: Option<String>,
    #[validate(custom(function = validate_http_url))]
    pub company_website: Option<String>,
    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,
    pub is_active: Option<bool>,
    #[validate(range(min = 0, max = 10, message = "Priority must be between 0 and 10"))]
    pub priority: Option<i32>,
}

impl CreateDriveRequest {
    /// Trims and sanitises text fields in place so `validate()` checks
    /// the values that will actually be stored.
    pub fn normalize(&mut self) {
        self.company_name = self.company_name.trim().to_string();
        self.job_description = clean_html(&self.job_description);
        self.package = self.package.trim().to_string();
        self.category = self.category.trim().to_string();
        self.notes = self.notes.as_deref().map(clean_html);
    }
}

impl UpdateDriveRequest {
    /// Same as [`CreateDriveRequest::normalize`], for the supplied fields only.
    pub fn normalize(&mut self) {
        self.company_name = self.company_name.as_deref().map(|n| n.trim().to_string());
        self.job_description = self.job_description.as_deref().map(clean_html);
        self.package = self.package.as_deref().map(|p| p.trim().to_string());
        self.category = self.category.as_deref().map(|c| c.trim().to_string());
        self.notes = self.notes.as_deref().map(clean_html);
    }
}

/// A validated, sanitised drive ready to be inserted.
#[derive(Debug, Clone)]
pub struct NewDrive {
    pub company_name: String,
    pub job_description: String,
    pub date_of_first_round: NaiveDate,
    pub category: DriveCategory,
    pub package: String,
    pub study_material_url: Option<String>,
    pub company_website: Option<String>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub priority: i32,
    pub created_by: String,
}

impl NewDrive {
    /// Builds the insert record. Call only after `normalize()` and `validate()`.
    pub fn from_request(req: CreateDriveRequest, created_by: &str) -> Result<Self, String> {
        Ok(NewDrive {
            company_name: req.company_name,
            job_description: req.job_description,
            date_of_first_round: req.date_of_first_round,
            category: req.category.parse()?,
            package: req.package,
            study_material_url: non_blank(req.study_material_url),
            company_website: non_blank(req.company_website),
            notes: non_blank(req.notes),
            is_active: req.is_active.unwrap_or(true),
            priority: req.priority.unwrap_or(0),
            created_by: created_by.to_string(),
        })
    }
}

/// Field changes for an existing drive. `Some(None)` clears an optional column.
#[derive(Debug, Clone, Default)]
pub struct DrivePatch {
    pub company_name: Option<String>,
    pub job_description: Option<String>,
    pub date_of_first_round: Option<NaiveDate>,
    pub category: Option<DriveCategory>,
    pub package: Option<String>,
    pub study_material_url: Option<Option<String>>,
    pub company_website: Option<Option<String>>,
    pub notes: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub priority: Option<i32>,
}

impl DrivePatch {
    /// Builds the patch. Call only after `normalize()` and `validate()`.
    pub fn from_request(req: UpdateDriveRequest) -> Result<Self, String> {
        Ok(DrivePatch {
            company_name: req.company_name,
            job_description: req.job_description,
            date_of_first_round: req.date_of_first_round,
            category: req.category.map(|c| c.parse()).transpose()?,
            package: req.package,
            study_material_url: req.study_material_url.map(|u| non_blank(Some(u))),
            company_website: req.company_website.map(|u| non_blank(Some(u))),
            notes: req.notes.map(|n| non_blank(Some(n))),
            is_active: req.is_active,
            priority: req.priority,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.company_name.is_none()
            && self.job_description.is_none()
            && self.date_of_first_round.is_none()
            && self.category.is_none()
            && self.package.is_none()
            && self.study_material_url.is_none()
            && self.company_website.is_none()
            && self.notes.is_none()
            && self.is_active.is_none()
            && self.priority.is_none()
    }

    /// Applies the patch in place. Returns whether anything was written.
    pub fn apply(self, drive: &mut CampusDrive) -> bool {
        if self.is_empty() {
            return false;
        }
        if let Some(v) = self.company_name {
            drive.company_name = v;
        }
        if let Some(v) = self.job_description {
            drive.job_description = v;
        }
        if let Some(v) = self.date_of_first_round {
            drive.date_of_first_round = v;
        }
        if let Some(v) = self.category {
            drive.category = v;
        }
        if let Some(v) = self.package {
            drive.package = v;
        }
        if let Some(v) = self.study_material_url {
            drive.study_material_url = v;
        }
        if let Some(v) = self.company_website {
            drive.company_website = v;
        }
        if let Some(v) = self.notes {
            drive.notes = v;
        }
        if let Some(v) = self.is_active {
            drive.is_active = v;
        }
        if let Some(v) = self.priority {
            drive.priority = v;
        }
        true
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_not_past(date: &NaiveDate) -> Result<(), ValidationError> {
    if *date < Utc::now().date_naive() {
        let mut err = ValidationError::new("date_in_past");
        err.message = Some("Date of first round cannot be in the past".into());
        return Err(err);
    }
    Ok(())
}

fn validate_category(category: &str) -> Result<(), ValidationError> {
    if category.parse::<DriveCategory>().is_err() {
        let mut err = ValidationError::new("invalid_category");
        err.message = Some("Category must be one of: Super Dream, Dream, Regular".into());
        return Err(err);
    }
    Ok(())
}

/// Accepts blank strings (they clear the field) and absolute http(s) URLs.
fn validate_http_url(url: &str) -> Result<(), ValidationError> {
    let url = url.trim();
    if url.is_empty() {
        return Ok(());
    }
    let well_formed = HTTP_URL.is_match(url)
        && Url::parse(url).is_ok_and(|u| matches!(u.scheme(), "http" | "https"));
    if !well_formed {
        let mut err = ValidationError::new("invalid_url");
        err.message = Some("Please provide a valid http(s) URL".into());
        return Err(err);
    }
    Ok(())
}
