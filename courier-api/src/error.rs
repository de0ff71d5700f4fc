use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use courier_booking::lifecycle::RequestError;
use courier_booking::state_machine::TransitionError;
use courier_engine::EngineError;
use courier_wallet::WalletError;

#[derive(Debug)]
pub enum AppError {
    Engine(EngineError),
    Anyhow(anyhow::Error),
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        Self::Engine(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Anyhow(err)
    }
}

/// Business outcomes map to client-visible statuses; infrastructure
/// failures collapse to 503/500 with the detail kept in the logs.
fn status_for(err: &EngineError) -> StatusCode {
    match err {
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::Validation(_) | EngineError::Model(_) => StatusCode::BAD_REQUEST,
        EngineError::Request(e) => match e {
            RequestError::DuplicateRequest(_) | RequestError::AlreadyDecided(_) => {
                StatusCode::CONFLICT
            }
            RequestError::Expired(_) => StatusCode::GONE,
            RequestError::Forbidden(_) => StatusCode::FORBIDDEN,
            RequestError::TripNotOpen(_) => StatusCode::CONFLICT,
        },
        EngineError::Capacity(_) => StatusCode::CONFLICT,
        EngineError::Wallet(e) => match e {
            WalletError::InsufficientFunds { .. } => StatusCode::PAYMENT_REQUIRED,
            WalletError::NoActiveHold(_) | WalletError::HoldExists(_) => StatusCode::CONFLICT,
            WalletError::AccountNotFound(_) => StatusCode::NOT_FOUND,
            WalletError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
        },
        EngineError::Transition(e) => match e {
            TransitionError::Invalid { .. } => StatusCode::CONFLICT,
            TransitionError::Forbidden(_) => StatusCode::FORBIDDEN,
            TransitionError::MissingReason => StatusCode::BAD_REQUEST,
        },
        EngineError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Engine(err) => {
                let status = status_for(&err);
                if status.is_server_error() {
                    tracing::error!(error = %err, "engine failure");
                }
                (status, err.to_string())
            }
            AppError::Anyhow(err) => {
                tracing::error!("internal server error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
