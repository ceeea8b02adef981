use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::response::{ApiResponse, Meta};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error("El carrito está vacío o no existe")]
    EmptyCart,

    #[error("El producto {0} no existe en el catálogo")]
    ProductNotFound(i32),

    #[error("Cantidad inválida para el producto {0}")]
    InvalidCartLine(i32),

    #[error("No hay ningún impuesto activo configurado")]
    NoActiveTax,

    #[error("Cart store unavailable")]
    CartStore(#[from] reqwest::Error),

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::EmptyCart => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::ProductNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::InvalidCartLine(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::NoActiveTax => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::CartStore(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            AppError::OrmError(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        // The underlying driver/transport detail goes in `error`, never in `message`.
        let error = match &self {
            AppError::OrmError(err) => err.to_string(),
            AppError::CartStore(err) => err.to_string(),
            AppError::Internal(err) => err.to_string(),
            _ => self.to_string(),
        };

        let body = ApiResponse {
            message,
            data: Some(ErrorData { error }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
