pub mod health;

use axum::{
    routing::{get, put},
    Router,
};

use crate::interview::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/interviews",
            get(handlers::handle_list_interviews).post(handlers::handle_create_interview),
        )
        .route(
            "/api/v1/interviews/:id",
            put(handlers::handle_update_interview).get(handlers::handle_get_interview),
        )
        .route(
            "/api/v1/sessions/status",
            get(handlers::handle_session_status),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::auth::USER_ID_HEADER;
    use crate::interview::pipeline::InterviewPipeline;
    use crate::interview::session::SessionRegistry;
    use crate::llm_client::{GenerationClient, LlmError};
    use crate::store::{MemoryRecordStore, RecordStore};

    struct CannedLlm(Option<&'static str>);

    #[async_trait]
    impl GenerationClient for CannedLlm {
        async fn send(&self, _prompt: &str) -> Result<String, LlmError> {
            self.0
                .map(str::to_string)
                .ok_or_else(|| LlmError::Configuration("GEMINI_API_KEY is not set".to_string()))
        }
    }

    const REPLY: &str = "Here you go:\n```json\n[{\"question\":\"Q1\",\"answer\":\"A1\"},{\"question\":\"Q2\",\"answer\":\"A2\"}]\n```";

    fn app_with(reply: Option<&'static str>) -> (Router, Arc<MemoryRecordStore>) {
        let store = Arc::new(MemoryRecordStore::new());
        let state = AppState {
            store: store.clone(),
            pipeline: Arc::new(InterviewPipeline::new(Arc::new(CannedLlm(reply)), store.clone())),
            sessions: Arc::new(SessionRegistry::new()),
        };
        (build_router(state), store)
    }

    fn request(method: Method, uri: &str, user: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(USER_ID_HEADER, user);
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn jane_form() -> Value {
        json!({
            "name": "Jane",
            "position": "Backend Engineer",
            "experienceYears": 3,
            "techStack": "Go"
        })
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app_with(Some(REPLY));
        let response = app
            .oneshot(request(Method::GET, "/health", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_create_interview() {
        let (app, store) = app_with(Some(REPLY));
        let response = app
            .oneshot(request(
                Method::POST,
                "/api/v1/interviews",
                Some("user_1"),
                Some(jane_form()),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        let id = body["id"].as_str().unwrap().to_string();
        assert_eq!(body["navigateTo"], format!("/generate/{id}"));
        assert_eq!(body["notification"]["description"], "Interview created successfully!");
        assert_eq!(body["interview"]["questions"][0]["question"], "Q1");
        assert_eq!(body["interview"]["experience"], 3);

        let stored = store.get(&id).await.unwrap().unwrap();
        assert_eq!(stored.user_id, "user_1");
        assert_eq!(stored.questions.len(), 2);
    }

    #[tokio::test]
    async fn test_create_requires_user() {
        let (app, _) = app_with(Some(REPLY));
        let response = app
            .oneshot(request(Method::POST, "/api/v1/interviews", None, Some(jane_form())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_missing_fields_returns_fixed_message() {
        let (app, store) = app_with(Some(REPLY));
        let response = app
            .oneshot(request(
                Method::POST,
                "/api/v1/interviews",
                Some("user_1"),
                Some(json!({"name": "Jane"})),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "MISSING_FIELDS");
        assert_eq!(body["error"]["message"], "Please fill all required fields.");
        assert!(store.list_for_owner("user_1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_null_or_fractional_fields_are_missing_fields() {
        let bodies = [
            json!({"name": null, "position": "Backend Engineer", "experience": 3}),
            json!({"name": "Jane", "position": "Backend Engineer", "experience": 2.5}),
        ];

        for body in bodies {
            let (app, store) = app_with(Some(REPLY));
            let response = app
                .oneshot(request(
                    Method::POST,
                    "/api/v1/interviews",
                    Some("user_1"),
                    Some(body.clone()),
                ))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "for {body}");
            let error = json_body(response).await;
            assert_eq!(error["error"]["code"], "MISSING_FIELDS", "for {body}");
            assert_eq!(error["error"]["message"], "Please fill all required fields.");
            assert!(store.list_for_owner("user_1").await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_unparseable_body_uses_error_shape() {
        let (app, _) = app_with(Some(REPLY));
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/v1/interviews")
                    .header(USER_ID_HEADER, "user_1")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "INVALID_BODY");
        assert!(body["error"]["message"].is_string());
    }

    #[tokio::test]
    async fn test_missing_credential_is_configuration_error() {
        let (app, _) = app_with(None);
        let response = app
            .oneshot(request(
                Method::POST,
                "/api/v1/interviews",
                Some("user_1"),
                Some(jane_form()),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "CONFIGURATION_ERROR");
        // diagnostic text stays in the logs
        assert!(!body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("is not set"));
    }

    #[tokio::test]
    async fn test_update_and_read_back() {
        let (app, _) = app_with(Some(REPLY));
        let created = json_body(
            app.clone()
                .oneshot(request(
                    Method::POST,
                    "/api/v1/interviews",
                    Some("user_1"),
                    Some(jane_form()),
                ))
                .await
                .unwrap(),
        )
        .await;
        let id = created["id"].as_str().unwrap().to_string();
        let uri = format!("/api/v1/interviews/{id}");

        let mut form = jane_form();
        form["position"] = json!("Staff Engineer");
        let response = app
            .clone()
            .oneshot(request(Method::PUT, &uri, Some("user_1"), Some(form)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let updated = json_body(response).await;
        assert_eq!(updated["id"], id.as_str());
        assert_eq!(updated["notification"]["description"], "Interview updated successfully!");
        assert_eq!(updated["interview"]["createdAt"], created["interview"]["createdAt"]);

        let fetched = json_body(
            app.clone()
                .oneshot(request(Method::GET, &uri, Some("user_1"), None))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(fetched["position"], "Staff Engineer");

        let listed = json_body(
            app.oneshot(request(Method::GET, "/api/v1/interviews", Some("user_1"), None))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_foreign_record_is_forbidden() {
        let (app, _) = app_with(Some(REPLY));
        let created = json_body(
            app.clone()
                .oneshot(request(
                    Method::POST,
                    "/api/v1/interviews",
                    Some("user_1"),
                    Some(jane_form()),
                ))
                .await
                .unwrap(),
        )
        .await;
        let uri = format!("/api/v1/interviews/{}", created["id"].as_str().unwrap());

        let read = app
            .clone()
            .oneshot(request(Method::GET, &uri, Some("user_2"), None))
            .await
            .unwrap();
        assert_eq!(read.status(), StatusCode::FORBIDDEN);

        let write = app
            .oneshot(request(Method::PUT, &uri, Some("user_2"), Some(jane_form())))
            .await
            .unwrap();
        assert_eq!(write.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_unknown_interview_is_not_found() {
        let (app, _) = app_with(Some(REPLY));
        let response = app
            .oneshot(request(
                Method::GET,
                "/api/v1/interviews/does-not-exist",
                Some("user_1"),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_session_status_reports_last_outcome() {
        let (app, _) = app_with(Some(REPLY));

        let idle = json_body(
            app.clone()
                .oneshot(request(Method::GET, "/api/v1/sessions/status", Some("user_1"), None))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(idle, json!({"busy": false, "state": "idle"}));

        let created = json_body(
            app.clone()
                .oneshot(request(
                    Method::POST,
                    "/api/v1/interviews",
                    Some("user_1"),
                    Some(jane_form()),
                ))
                .await
                .unwrap(),
        )
        .await;

        let status = json_body(
            app.oneshot(request(Method::GET, "/api/v1/sessions/status", Some("user_1"), None))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(status["busy"], false);
        assert_eq!(status["state"], "succeeded");
        assert_eq!(status["interviewId"], created["id"]);
    }
}
