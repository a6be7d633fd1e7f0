//! Shared helpers for router tests over the in-memory store.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use taskdeck_api::{build_router, AppState, ViewCache};
use taskdeck_core::EventBus;
use taskdeck_db::InMemoryStore;

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
    pub views: ViewCache,
    pub events: Arc<EventBus>,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let events = Arc::new(EventBus::new(256));
        let views = ViewCache::new(64, events.clone());
        let state = AppState::new(store.clone(), store.clone(), views.clone(), events.clone());
        Self {
            router: build_router(state, None),
            store,
            views,
            events,
        }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None).await
    }

    /// Create a project and return its id.
    pub async fn project(&self, title: &str) -> String {
        let (status, body) = self
            .post("/api/project", serde_json::json!({ "title": title }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["id"].as_str().unwrap().to_string()
    }

    /// Create a task (optionally a subtask) and return its id.
    pub async fn task(&self, project_id: &str, title: &str, parent: Option<&str>) -> String {
        let mut payload = serde_json::json!({ "projectId": project_id, "title": title });
        if let Some(parent) = parent {
            payload["parentTask"] = Value::String(parent.to_string());
        }
        let (status, body) = self.post("/api/task", payload).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["id"].as_str().unwrap().to_string()
    }
}
