use api_types::ErrorBody;
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

pub use server::{ServerState, router, run_with_listener, spawn_with_listener};

mod expenses;
mod server;

pub mod types {
    pub mod expense {
        pub use api_types::expense::{Expense, ExpenseKind, ExpenseNew};
        pub use engine::{Entry, EntryKind};
    }

    pub use api_types::{ErrorBody, Message};
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::InvalidData(_) | EngineError::MissingId => StatusCode::BAD_REQUEST,
        EngineError::Storage(_) | EngineError::Corrupt(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::InvalidData(reason) => {
            tracing::debug!("rejected expense: {reason}");
            "Invalid data".to_string()
        }
        EngineError::MissingId => "ID is required".to_string(),
        storage_err => {
            tracing::error!("storage error: {storage_err}");
            "internal server error".to_string()
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
