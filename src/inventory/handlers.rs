use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::db::models::ItemUpdate;
use crate::error::{AppError, AuthError};
use crate::AppState;

/// Header carrying the token returned by register/login.
pub const AUTH_HEADER: &str = "Authentication";

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub username: String,
    pub name: String,
    pub amount: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddItemResponse {
    pub id: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemsRequest {
    pub username: String,
    pub data: Vec<ItemUpdate>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteItemRequest {
    pub username: String,
    pub id: i32,
}

fn auth_token(req: &HttpRequest) -> Result<&str, AppError> {
    req.headers()
        .get(AUTH_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AuthError::MissingToken.into())
}

pub async fn add_item(
    http: HttpRequest,
    req: web::Json<AddItemRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!("Received add request from username: {}", req.username);
    let token = auth_token(&http)?;

    match state
        .inventory_service
        .add_item(token, &req.username, &req.name, req.amount)
        .await
    {
        Ok(id) => Ok(HttpResponse::Ok().json(AddItemResponse { id })),
        Err(e) => {
            error!("Add failed for username: {}: {}", req.username, e);
            Err(e)
        }
    }
}

pub async fn update_items(
    http: HttpRequest,
    req: web::Json<UpdateItemsRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!(
        "Received update request from username: {} ({} items)",
        req.username,
        req.data.len()
    );
    let token = auth_token(&http)?;

    match state
        .inventory_service
        .update_items(token, &req.username, &req.data)
        .await
    {
        Ok(()) => Ok(HttpResponse::NoContent().finish()),
        Err(e) => {
            error!("Update failed for username: {}: {}", req.username, e);
            Err(e)
        }
    }
}

pub async fn delete_item(
    http: HttpRequest,
    req: web::Json<DeleteItemRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!("Received delete request from username: {} for id {}", req.username, req.id);
    let token = auth_token(&http)?;

    match state
        .inventory_service
        .delete_item(token, &req.username, req.id)
        .await
    {
        Ok(()) => Ok(HttpResponse::NoContent().finish()),
        Err(e) => {
            error!("Delete failed for username: {}: {}", req.username, e);
            Err(e)
        }
    }
}
