//! Expenses API endpoints

use api_types::{
    Message,
    expense::{Expense, ExpenseKind, ExpenseNew},
};
use axum::{
    Json,
    body::Bytes,
    extract::{Query, State, rejection::QueryRejection},
};
use engine::{EngineError, Entry, EntryNew};

use crate::{ServerError, server::ServerState};

fn map_kind(kind: engine::EntryKind) -> ExpenseKind {
    match kind {
        engine::EntryKind::Income => ExpenseKind::Income,
        engine::EntryKind::Expense => ExpenseKind::Expense,
    }
}

fn to_view(entry: Entry) -> Expense {
    Expense {
        id: entry.id,
        kind: map_kind(entry.kind),
        amount: entry.amount,
        description: entry.description,
    }
}

fn deleted() -> Json<Message> {
    Json(Message {
        message: "Deleted".to_string(),
    })
}

pub async fn list(State(state): State<ServerState>) -> Json<Vec<Expense>> {
    let entries = state.ledger.entries().await;
    Json(entries.into_iter().map(to_view).collect())
}

pub async fn create(
    State(state): State<ServerState>,
    body: Bytes,
) -> Result<Json<Expense>, ServerError> {
    // The body is parsed whatever the content type says. A body that is not a
    // JSON object with the expected field types is just more invalid data.
    let payload: ExpenseNew = serde_json::from_slice(&body)
        .map_err(|err| EngineError::InvalidData(format!("malformed body: {err}")))?;

    let entry = state
        .ledger
        .add_entry(EntryNew {
            kind: payload.kind,
            amount: payload.amount,
            description: payload.description,
        })
        .await?;

    Ok(Json(to_view(entry)))
}

pub async fn delete(
    State(state): State<ServerState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Message>, ServerError> {
    let Query(params) =
        query.map_err(|rejection| ServerError::Generic(rejection.body_text()))?;

    // Repeated `id` parameters are allowed; the first one wins.
    let raw_id = params
        .into_iter()
        .find_map(|(key, value)| (key == "id").then_some(value));

    let id = match raw_id.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match raw.parse() {
            Ok(id) => Some(id),
            Err(_) => {
                // Not a number, so it cannot match any entry.
                tracing::debug!("ignoring delete of non-numeric id {raw:?}");
                return Ok(deleted());
            }
        },
    };

    state.ledger.delete_entry(id).await?;

    Ok(deleted())
}
