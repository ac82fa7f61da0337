use crate::hash::RngError;
use crate::store::StoreError;
use actix_web::error::BlockingError;
use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use log::error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("store: {0}")]
    Store(#[from] StoreError),
    #[error("password hashing: {0}")]
    Rng(#[from] RngError),
    #[error("blocking task: {0}")]
    Blocking(#[from] BlockingError),
    #[error("session: {0}")]
    Session(String),
    #[error("application data not configured: {0}")]
    MissingAppData(&'static str),
    #[error("not logged in")]
    Unauthenticated,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated => StatusCode::FOUND,
            AppError::Store(StoreError::Pool(_)) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Unauthenticated = self {
            return HttpResponse::Found()
                .insert_header((header::LOCATION, "/login"))
                .finish();
        }

        error!("{}", self);
        let status = self.status_code();
        HttpResponse::build(status)
            .content_type("text/plain; charset=utf-8")
            .body(status.canonical_reason().unwrap_or("error"))
    }
}
