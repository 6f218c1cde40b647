use std::{path::PathBuf, sync::Arc};

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use engine::{EngineError, Entry, EntryKind, EntryStore, JsonFileStore, Ledger, MemoryStore};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use server::{ServerState, router};
use tower::ServiceExt;
use uuid::Uuid;

/// Serves what it holds but fails every write.
#[derive(Debug)]
struct ReadOnlyStore(MemoryStore);

impl EntryStore for ReadOnlyStore {
    fn load(&self) -> Result<Vec<Entry>, EngineError> {
        self.0.load()
    }

    fn save(&self, _entries: &[Entry]) -> Result<(), EngineError> {
        Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into())
    }
}

fn app_with(ledger: Ledger) -> Router {
    router(ServerState {
        ledger: Arc::new(ledger),
    })
}

async fn app() -> Router {
    let ledger = Ledger::builder()
        .store(MemoryStore::new())
        .build()
        .await
        .unwrap();
    app_with(ledger)
}

fn test_file() -> PathBuf {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();
    root.join(format!("server_{}.json", Uuid::new_v4()))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(body) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn add_list_delete_scenario() {
    let app = app().await;

    let (status, body) = send(&app, Method::GET, "/expenses", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, created) = send(
        &app,
        Method::POST,
        "/expenses",
        Some(json!({"type": "income", "amount": 1000, "description": "gift"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["type"], "income");
    assert_eq!(created["amount"].as_f64(), Some(1000.0));
    assert_eq!(created["description"], "gift");
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send(&app, Method::GET, "/expenses", None).await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["amount"].as_f64(), Some(1000.0));
    assert_eq!(entries[0], created);

    let (status, body) = send(&app, Method::DELETE, &format!("/expenses?id={id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Deleted"}));

    let (_, body) = send(&app, Method::GET, "/expenses", None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn sequential_posts_are_listed_in_order() {
    let app = app().await;

    let (_, first) = send(
        &app,
        Method::POST,
        "/expenses",
        Some(json!({"type": "income", "amount": 5000, "description": "salary"})),
    )
    .await;
    let (_, second) = send(
        &app,
        Method::POST,
        "/expenses",
        Some(json!({"type": "expense", "amount": 12.5, "description": "lunch"})),
    )
    .await;
    assert_ne!(first["id"], second["id"]);

    let (_, body) = send(&app, Method::GET, "/expenses", None).await;
    assert_eq!(body, json!([first, second]));
}

#[tokio::test]
async fn incomplete_post_is_invalid_data() {
    let app = app().await;

    let bodies = [
        json!({"amount": 10, "description": "x"}),
        json!({"type": "", "amount": 10, "description": "x"}),
        json!({"type": "expense", "description": "x"}),
        json!({"type": "expense", "amount": 0, "description": "x"}),
        json!({"type": "expense", "amount": 10}),
        json!({"type": "expense", "amount": 10, "description": ""}),
        json!({"type": "gift", "amount": 10, "description": "x"}),
        json!({"type": "expense", "amount": "ten", "description": "x"}),
        json!([1, 2, 3]),
    ];
    for body in bodies {
        let (status, error) = send(&app, Method::POST, "/expenses", Some(body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(error, json!({"error": "Invalid data"}), "{body}");
    }

    let (_, body) = send(&app, Method::GET, "/expenses", None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn post_with_empty_body_is_invalid_data() {
    let app = app().await;

    let (status, error) = send(&app, Method::POST, "/expenses", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error, json!({"error": "Invalid data"}));
}

#[tokio::test]
async fn post_without_content_type_is_accepted() {
    let app = app().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/expenses")
        .body(Body::from(
            r#"{"type":"income","amount":1000,"description":"gift"}"#,
        ))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let created: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(created["amount"], json!(1000));

    let (_, body) = send(&app, Method::GET, "/expenses", None).await;
    assert_eq!(body, json!([created]));
}

#[tokio::test]
async fn delete_with_repeated_id_uses_the_first() {
    let app = app().await;
    let (_, first) = send(
        &app,
        Method::POST,
        "/expenses",
        Some(json!({"type": "expense", "amount": 3, "description": "coffee"})),
    )
    .await;
    let (_, second) = send(
        &app,
        Method::POST,
        "/expenses",
        Some(json!({"type": "expense", "amount": 4, "description": "tea"})),
    )
    .await;
    let first_id = first["id"].as_i64().unwrap();
    let second_id = second["id"].as_i64().unwrap();

    let uri = format!("/expenses?id={first_id}&id={second_id}");
    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Deleted"}));

    let (_, body) = send(&app, Method::GET, "/expenses", None).await;
    assert_eq!(body, json!([second]));

    let uri = format!("/expenses?id={second_id}&id={second_id}");
    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = send(&app, Method::GET, "/expenses", None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn failed_write_answers_500_and_keeps_entries() {
    let existing = Entry {
        id: 1,
        kind: EntryKind::Income,
        amount: 100.0,
        description: "salary".to_string(),
    };
    let ledger = Ledger::builder()
        .store(ReadOnlyStore(MemoryStore::with_entries(vec![existing])))
        .build()
        .await
        .unwrap();
    let app = app_with(ledger);
    let (_, before) = send(&app, Method::GET, "/expenses", None).await;

    let (status, error) = send(
        &app,
        Method::POST,
        "/expenses",
        Some(json!({"type": "expense", "amount": 5, "description": "coffee"})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error, json!({"error": "internal server error"}));

    let (status, error) = send(&app, Method::DELETE, "/expenses?id=1", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error, json!({"error": "internal server error"}));

    let (_, after) = send(&app, Method::GET, "/expenses", None).await;
    assert_eq!(after, before);
    assert_eq!(after.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn delete_without_id_is_rejected() {
    let app = app().await;
    let (_, created) = send(
        &app,
        Method::POST,
        "/expenses",
        Some(json!({"type": "expense", "amount": 3, "description": "coffee"})),
    )
    .await;

    for uri in ["/expenses", "/expenses?id=", "/expenses?other=1"] {
        let (status, error) = send(&app, Method::DELETE, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(error, json!({"error": "ID is required"}));
    }

    let (_, body) = send(&app, Method::GET, "/expenses", None).await;
    assert_eq!(body, json!([created]));
}

#[tokio::test]
async fn deleting_unknown_id_succeeds() {
    let app = app().await;
    let (_, created) = send(
        &app,
        Method::POST,
        "/expenses",
        Some(json!({"type": "expense", "amount": 3, "description": "coffee"})),
    )
    .await;

    for uri in ["/expenses?id=42", "/expenses?id=abc"] {
        let (status, body) = send(&app, Method::DELETE, uri, None).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body, json!({"message": "Deleted"}));
    }

    let (_, body) = send(&app, Method::GET, "/expenses", None).await;
    assert_eq!(body, json!([created]));
}

#[tokio::test]
async fn routes_are_mounted_under_api() {
    let app = app().await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/expenses",
        Some(json!({"type": "income", "amount": 7, "description": "tip"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, "/expenses", None).await;
    assert_eq!(body, json!([created.clone()]));

    let id = created["id"].as_i64().unwrap();
    let (status, _) = send(&app, Method::DELETE, &format!("/api/expenses?id={id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, "/api/expenses", None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn missing_file_serves_empty_list() {
    let path = test_file();
    let ledger = Ledger::builder()
        .store(JsonFileStore::new(&path))
        .build()
        .await
        .unwrap();
    let app = app_with(ledger);

    let (status, body) = send(&app, Method::GET, "/expenses", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn corrupt_file_serves_empty_list_and_fails_writes() {
    let path = test_file();
    std::fs::write(&path, "not json").unwrap();
    let ledger = Ledger::builder()
        .store(JsonFileStore::new(&path))
        .build()
        .await
        .unwrap();
    let app = app_with(ledger);

    let (status, body) = send(&app, Method::GET, "/expenses", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, error) = send(
        &app,
        Method::POST,
        "/expenses",
        Some(json!({"type": "income", "amount": 1, "description": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error, json!({"error": "internal server error"}));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "not json");

    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn file_backed_server_over_tcp() {
    let path = test_file();
    let ledger = Ledger::builder()
        .store(JsonFileStore::new(&path))
        .build()
        .await
        .unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = server::spawn_with_listener(ledger, listener).unwrap();
    let base = format!("http://{addr}/expenses");
    let client = reqwest::Client::new();

    let created: Value = client
        .post(&base)
        .json(&json!({"type": "expense", "amount": 25, "description": "books"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let on_disk: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk, json!([created.clone()]));

    let listed: Value = client.get(&base).send().await.unwrap().json().await.unwrap();
    assert_eq!(listed, json!([created]));

    let _ = std::fs::remove_file(path);
}
