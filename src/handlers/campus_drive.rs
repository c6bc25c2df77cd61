// src/handlers/campus_drive.rs

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    models::campus_drive::{
        CreateDriveRequest, DriveCategory, DriveFilter, DrivePatch, ListParams, NewDrive,
        UpdateDriveRequest,
    },
    repo::DriveStore,
    utils::jwt::AdminUser,
};

fn drive_not_found() -> AppError {
    AppError::NotFound("Campus drive not found".to_string())
}

/// Lists drives. Active drives only unless `active=false`;
/// optional `category` filter and `sort` key.
pub async fn list_drives(
    State(drives): State<DriveStore>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(params) = params?;
    let filter = DriveFilter::from(&params);
    let sort = params.sort.unwrap_or_default();

    let data = drives.list_drives(filter, sort).await.map_err(|e| {
        tracing::error!("Failed to list campus drives: {:?}", e);
        AppError::from(e)
    })?;

    Ok(Json(json!({
        "success": true,
        "count": data.len(),
        "data": data
    })))
}

/// The fixed list of drive categories.
pub async fn list_categories() -> impl IntoResponse {
    let categories: Vec<&str> = DriveCategory::ALL.iter().map(|c| c.as_str()).collect();
    Json(json!({
        "success": true,
        "data": categories
    }))
}

/// Retrieves a single drive by ID.
pub async fn get_drive(
    State(drives): State<DriveStore>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let drive = drives.get_drive(id).await?.ok_or_else(drive_not_found)?;

    Ok(Json(json!({ "success": true, "data": drive })))
}

/// Creates a drive.
/// Admin only.
pub async fn create_drive(
    admin: AdminUser,
    State(drives): State<DriveStore>,
    payload: Result<Json<CreateDriveRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(mut payload) = payload?;
    payload.normalize();
    payload.validate()?;

    let new_drive =
        NewDrive::from_request(payload, &admin.username).map_err(AppError::BadRequest)?;

    let drive = drives.insert_drive(new_drive).await.map_err(|e| {
        tracing::error!("Failed to create campus drive: {:?}", e);
        AppError::from(e)
    })?;

    tracing::info!("Campus drive {} created by {}", drive.id, admin.username);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": drive })),
    ))
}

/// Updates the supplied fields of a drive.
/// Admin only.
pub async fn update_drive(
    admin: AdminUser,
    State(drives): State<DriveStore>,
    Path(id): Path<i64>,
    payload: Result<Json<UpdateDriveRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(mut payload) = payload?;
    payload.normalize();
    payload.validate()?;

    let patch = DrivePatch::from_request(payload).map_err(AppError::BadRequest)?;

    let drive = drives
        .update_drive(id, patch)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update campus drive {}: {:?}", id, e);
            AppError::from(e)
        })?
        .ok_or_else(drive_not_found)?;

    tracing::info!("Campus drive {} updated by {}", id, admin.username);

    Ok(Json(json!({ "success": true, "data": drive })))
}

/// Permanently deletes a drive.
/// Admin only.
pub async fn delete_drive(
    admin: AdminUser,
    State(drives): State<DriveStore>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !drives.delete_drive(id).await? {
        return Err(drive_not_found());
    }

    tracing::info!("Campus drive {} deleted by {}", id, admin.username);

    Ok(Json(json!({
        "success": true,
        "message": "Campus drive deleted successfully"
    })))
}

/// Flips a drive between active and inactive.
/// Admin only.
pub async fn toggle_drive_status(
    admin: AdminUser,
    State(drives): State<DriveStore>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let drive = drives.toggle_drive(id).await?.ok_or_else(drive_not_found)?;

    tracing::info!(
        "Campus drive {} set {} by {}",
        id,
        if drive.is_active { "active" } else { "inactive" },
        admin.username
    );

    Ok(Json(json!({ "success": true, "data": drive })))
}
