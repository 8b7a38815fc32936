#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

pub const TOKEN: &str = "test-token";

/// In-process stand-in for the remote month service.
#[derive(Clone, Default)]
pub struct FakeMonths {
    stored: Arc<Mutex<Option<Value>>>,
    saves: Arc<Mutex<Vec<Value>>>,
    fail_saves: Arc<Mutex<bool>>,
}

impl FakeMonths {
    pub fn with_stored(document: Value) -> Self {
        let fake = Self::default();
        *fake.stored.lock().unwrap() = Some(document);
        fake
    }

    pub fn saves(&self) -> Vec<Value> {
        self.saves.lock().unwrap().clone()
    }

    pub fn fail_saves(&self) {
        *self.fail_saves.lock().unwrap() = true;
    }

    /// Serves the fake on a random port and returns its API base URL.
    pub async fn serve(&self) -> String {
        let app = Router::new()
            .route("/api/months/save", post(save_month))
            .route("/api/months/:year/:month", get(get_month))
            .with_state(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake month service");
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/api")
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {TOKEN}"))
}

async fn get_month(
    State(fake): State<FakeMonths>,
    Path((_year, _month)): Path<(i32, u32)>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let stored = fake.stored.lock().unwrap().clone();
    match stored {
        Some(document) => Json(document).into_response(),
        None => (StatusCode::NOT_FOUND, "no month").into_response(),
    }
}

async fn save_month(
    State(fake): State<FakeMonths>,
    headers: HeaderMap,
    Json(document): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    fake.saves.lock().unwrap().push(document.clone());
    if *fake.fail_saves.lock().unwrap() {
        return (StatusCode::INTERNAL_SERVER_ERROR, "disk full").into_response();
    }
    *fake.stored.lock().unwrap() = Some(document);
    Json(json!({ "ok": true })).into_response()
}
