//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`.
//! Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Pricing
        .route("/quotes/price", post(handlers::quote::price_quote))
        // Scheduling
        .route("/availability", get(handlers::availability::get_availability))
        // Zip lookup
        .route("/zip/{zip}", get(handlers::zip::lookup_zip))
        // Short-form capture
        .route("/leads", post(handlers::lead::capture_lead))
        // Wizard sessions
        .route("/sessions", post(handlers::session::create_session))
        .route(
            "/sessions/{id}",
            get(handlers::session::get_session).delete(handlers::session::delete_session),
        )
        .route("/sessions/{id}/input", post(handlers::session::apply_input))
        .route("/sessions/{id}/action", post(handlers::session::apply_action))
        .route(
            "/sessions/{id}/exit-intent",
            post(handlers::session::exit_intent),
        );

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use axum::body::Body;
    use axum::extract::State;
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use starclean_types::config::GlobalConfig;

    type Received = Arc<Mutex<Vec<(String, Value)>>>;

    /// Local webhook receiver and geocoder. Webhook paths under `/fail`
    /// answer 500.
    async fn spawn_backend() -> (String, Received) {
        let received: Received = Arc::default();

        async fn hook(
            State(received): State<Received>,
            axum::extract::Path(name): axum::extract::Path<String>,
            axum::Json(body): axum::Json<Value>,
        ) -> StatusCode {
            received.lock().unwrap().push((name, body));
            StatusCode::OK
        }

        async fn fail() -> StatusCode {
            StatusCode::INTERNAL_SERVER_ERROR
        }

        async fn geocode(axum::extract::Path(zip): axum::extract::Path<String>) -> axum::response::Response {
            use axum::response::IntoResponse;
            if zip == "29401" {
                axum::Json(json!({ "places": [{ "place name": "Charleston" }] })).into_response()
            } else {
                StatusCode::NOT_FOUND.into_response()
            }
        }

        let app = Router::new()
            .route("/hooks/{name}", post(hook))
            .route("/fail/{name}", post(fail))
            .route("/us/{zip}", get(geocode))
            .with_state(received.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), received)
    }

    fn state_for(base: &str, failing: bool) -> AppState {
        let hooks = if failing { "fail" } else { "hooks" };
        let mut config = GlobalConfig::default();
        config.webhooks.lead_url = format!("{base}/{hooks}/lead");
        config.webhooks.quote_url = format!("{base}/{hooks}/quote");
        config.webhooks.scheduling_url = format!("{base}/{hooks}/schedule");
        config.geocoder.base_url = format!("{base}/us");
        AppState::from_config(config, PathBuf::from("/tmp/starclean-test"))
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let body = match body {
            Some(v) => Body::from(v.to_string()),
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(body)
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_health() {
        let (base, _) = spawn_backend().await;
        let app = build_router(state_for(&base, false));
        let (status, json) = call(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_price_quote() {
        let (base, _) = spawn_backend().await;
        let app = build_router(state_for(&base, false));
        let (status, json) = call(
            &app,
            "POST",
            "/api/v1/quotes/price",
            Some(json!({ "bedrooms": 3, "bathrooms": 2, "frequency": "bi-weekly" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let quote = &json["data"]["quote"];
        assert_eq!(quote["base"], 205.0);
        assert_eq!(quote["recurring"]["min"], 174.25);
        assert!(json["meta"]["request_id"].is_string());
    }

    #[tokio::test]
    async fn test_availability_lists_dates() {
        let (base, _) = spawn_backend().await;
        let app = build_router(state_for(&base, false));
        let (status, json) = call(&app, "GET", "/api/v1/availability", None).await;
        assert_eq!(status, StatusCode::OK);
        let dates = json["data"]["dates"].as_array().unwrap();
        assert_eq!(dates.len(), 10);

        let first = dates[0].as_str().unwrap();
        let (status, json) =
            call(&app, "GET", &format!("/api/v1/availability?date={first}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["slots"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_zip_lookup() {
        let (base, _) = spawn_backend().await;
        let app = build_router(state_for(&base, false));

        let (_, json) = call(&app, "GET", "/api/v1/zip/29401", None).await;
        assert_eq!(json["data"]["city"], "Charleston");
        assert_eq!(json["data"]["served"], true);

        let (status, json) = call(&app, "GET", "/api/v1/zip/00000", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["data"]["city"].is_null());
    }

    #[tokio::test]
    async fn test_capture_lead_missing_fields() {
        let (base, received) = spawn_backend().await;
        let app = build_router(state_for(&base, false));

        let (status, json) = call(
            &app,
            "POST",
            "/api/v1/leads",
            Some(json!({ "firstName": "Jane", "email": "", "phone": "555", "zip": "29401" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["errors"][0]["code"], "VALIDATION_ERROR");
        assert_eq!(json["errors"][0]["details"]["missing"][0], "email");
        assert!(received.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_capture_lead_posts_to_lead_hook() {
        let (base, received) = spawn_backend().await;
        let app = build_router(state_for(&base, false));

        let (status, json) = call(
            &app,
            "POST",
            "/api/v1/leads",
            Some(json!({
                "firstName": "Jane",
                "lastName": "Doe",
                "email": "jane@example.com",
                "phone": "(843) 555-0100",
                "zipCode": "29401",
                "formSource": "Hero Section Quote"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["stage"], "Lead Captured");

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].0, "lead");
        assert_eq!(received[0].1["fullName"], "Jane Doe");
    }

    #[tokio::test]
    async fn test_wizard_session_flow() {
        let (base, received) = spawn_backend().await;
        let app = build_router(state_for(&base, false));

        let (status, json) = call(&app, "POST", "/api/v1/sessions", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["step"], "contact");
        let id = json["data"]["id"].as_str().unwrap().to_string();

        // Guard: contact fields are required.
        let (status, json) =
            call(&app, "POST", &format!("/api/v1/sessions/{id}/action"), Some(json!({ "action": "next" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["errors"][0]["details"]["missing"].as_array().unwrap().len(), 4);

        for input in [
            json!({ "field": "full_name", "value": "Jane Doe" }),
            json!({ "field": "email", "value": "jane@example.com" }),
            json!({ "field": "phone", "value": "(843) 555-0100" }),
            json!({ "field": "zip", "value": "29401" }),
        ] {
            let (status, _) =
                call(&app, "POST", &format!("/api/v1/sessions/{id}/input"), Some(input)).await;
            assert_eq!(status, StatusCode::OK);
        }

        for _ in 0..3 {
            let (status, _) = call(
                &app,
                "POST",
                &format!("/api/v1/sessions/{id}/action"),
                Some(json!({ "action": "next" })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (_, json) = call(&app, "GET", &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(json["data"]["step"], "price_locked");
        assert_eq!(json["data"]["request"]["city"], "Charleston");
        assert_eq!(
            received.lock().unwrap().iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>(),
            vec!["quote"]
        );

        let (status, json) = call(
            &app,
            "POST",
            &format!("/api/v1/sessions/{id}/action"),
            Some(json!({ "action": "skip_scheduling" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["step"], "confirmed");
        assert_eq!(json["data"]["popup_shown"], true);

        let (status, json) = call(
            &app,
            "POST",
            &format!("/api/v1/sessions/{id}/action"),
            Some(json!({ "action": "back" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["errors"][0]["code"], "INVALID_TRANSITION");

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 2);
        assert_eq!(received[1].0, "schedule");
        assert_eq!(received[1].1["stage"], "Walkthrough Skipped");
    }

    #[tokio::test]
    async fn test_failed_submission_returns_bad_gateway() {
        let (base, _) = spawn_backend().await;
        let app = build_router(state_for(&base, true));

        let seed = json!({
            "firstName": "Jane",
            "email": "jane@example.com",
            "phone": "(843) 555-0100",
            "zip": "29401"
        });
        let (_, json) = call(&app, "POST", "/api/v1/sessions", Some(seed)).await;
        let id = json["data"]["id"].as_str().unwrap().to_string();

        for _ in 0..2 {
            call(&app, "POST", &format!("/api/v1/sessions/{id}/action"), Some(json!({ "action": "next" }))).await;
        }
        let (status, json) =
            call(&app, "POST", &format!("/api/v1/sessions/{id}/action"), Some(json!({ "action": "next" }))).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["errors"][0]["code"], "SUBMISSION_FAILED");
        assert_eq!(json["errors"][0]["details"]["fallback_phone"], "(843) 297-9935");

        let (_, json) = call(&app, "GET", &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(json["data"]["step"], "plan_review");
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let (base, _) = spawn_backend().await;
        let app = build_router(state_for(&base, false));
        let (status, json) = call(&app, "GET", "/api/v1/sessions/not-a-session", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["errors"][0]["code"], "SESSION_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_exit_intent_once() {
        let (base, _) = spawn_backend().await;
        let app = build_router(state_for(&base, false));
        let (_, json) = call(&app, "POST", "/api/v1/sessions", None).await;
        let id = json["data"]["id"].as_str().unwrap().to_string();

        let uri = format!("/api/v1/sessions/{id}/exit-intent");
        let (_, json) = call(&app, "POST", &uri, Some(json!({ "pointer_y": 0 }))).await;
        assert_eq!(json["data"]["show_offer"], true);
        let (_, json) = call(&app, "POST", &uri, Some(json!({ "pointer_y": -3 }))).await;
        assert_eq!(json["data"]["show_offer"], false);
    }

    #[tokio::test]
    async fn test_deleted_session_is_gone() {
        let (base, _) = spawn_backend().await;
        let state = state_for(&base, false);
        let app = build_router(state.clone());

        let (_, json) = call(&app, "POST", "/api/v1/sessions", None).await;
        let id = json["data"]["id"].as_str().unwrap().to_string();
        assert_eq!(state.sessions.len(), 1);

        let uri = format!("/api/v1/sessions/{id}");
        let (status, json) = call(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["deleted"], true);
        assert!(state.sessions.is_empty());

        let (status, _) = call(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = call(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_idle_sessions_expire() {
        let (base, _) = spawn_backend().await;
        let state = state_for(&base, false);
        let app = build_router(state.clone());

        let (_, json) = call(&app, "POST", "/api/v1/sessions", None).await;
        let idle = json["data"]["id"].as_str().unwrap().to_string();
        let (_, json) = call(&app, "POST", "/api/v1/sessions", None).await;
        let active = json["data"]["id"].as_str().unwrap().to_string();

        // Nothing is old enough yet.
        assert_eq!(state.expire_idle_sessions(Duration::from_secs(3600)), 0);

        tokio::time::sleep(Duration::from_millis(300)).await;
        let (status, _) = call(&app, "GET", &format!("/api/v1/sessions/{active}"), None).await;
        assert_eq!(status, StatusCode::OK);

        assert_eq!(state.expire_idle_sessions(Duration::from_millis(200)), 1);
        let (status, _) = call(&app, "GET", &format!("/api/v1/sessions/{idle}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = call(&app, "GET", &format!("/api/v1/sessions/{active}"), None).await;
        assert_eq!(status, StatusCode::OK);
    }
}
