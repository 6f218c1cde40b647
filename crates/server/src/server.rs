use axum::{
    Router,
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::get,
};

use std::sync::Arc;

use crate::expenses;
use engine::Ledger;

#[derive(Clone)]
pub struct ServerState {
    pub ledger: Arc<Ledger>,
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let response = next.run(request).await;
    tracing::debug!("{method} {uri} -> {}", response.status());
    response
}

fn expense_routes() -> Router<ServerState> {
    Router::new().route(
        "/expenses",
        get(expenses::list)
            .post(expenses::create)
            .delete(expenses::delete),
    )
}

/// Routes are served both at the root and under `/api`, where the browser
/// client looks for them.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(expense_routes())
        .nest("/api", expense_routes())
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

pub async fn run_with_listener(
    ledger: Ledger,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        ledger: Arc::new(ledger),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    ledger: Ledger,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(ledger, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
