use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::error;
use thiserror::Error;

use crate::config::MAX_TOP_N;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("limit must be between 1 and {max}, got {0}", max = MAX_TOP_N)]
    InvalidLimit(usize),

    #[error("Rendering failed: {0}")]
    Render(#[from] minijinja::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::InvalidLimit { .. } => StatusCode::BAD_REQUEST,
            AppError::Render { .. } => {
                error!("{self}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, self.to_string()).into_response()
    }
}
