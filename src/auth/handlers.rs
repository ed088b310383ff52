use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::{error, info};

use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

pub async fn register(
    req: web::Json<CredentialsRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!("Received registration request for username: {}", req.username);

    match state.auth_service.register(&req.username, &req.password).await {
        Ok(session) => {
            info!("Registration successful for username: {}", req.username);
            Ok(HttpResponse::Ok().json(session))
        }
        Err(e) => {
            error!("Registration failed for username: {}: {}", req.username, e);
            Err(e)
        }
    }
}

pub async fn login(
    req: web::Json<CredentialsRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!("Received login request for username: {}", req.username);

    match state.auth_service.login(&req.username, &req.password).await {
        Ok(session) => {
            info!("Login successful for username: {}", req.username);
            Ok(HttpResponse::Ok().json(session))
        }
        Err(e) => {
            error!("Login failed for username: {}: {}", req.username, e);
            Err(e)
        }
    }
}
