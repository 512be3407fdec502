//! Query handlers.
//!
//! JSON handlers answer with the `{ success, data, error }` envelope.
//! Status reads go to the in-memory store; only `/version` touches the
//! network.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use serde::Serialize;
use tracing::{debug, warn};

use lisa_state::{StateError, Status};

use crate::ApiState;
use crate::badge::badge_for;

/// Response wrapper for consistent API format.
#[derive(Serialize)]
struct ApiResponse<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

fn error_response(msg: &str, status: StatusCode) -> impl IntoResponse {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(msg.to_string()),
        }),
    )
}

fn not_found(id: &str) -> axum::response::Response {
    error_response(&format!("service not found: {id}"), StatusCode::NOT_FOUND).into_response()
}

#[derive(Debug, Serialize)]
pub struct Welcome {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ServiceSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: Status,
    pub updated_at: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct HealthBody {
    pub service_id: String,
    pub status: Status,
}

#[derive(Debug, Serialize)]
pub struct VersionBody {
    pub service_id: String,
    pub version: String,
}

/// GET /
pub async fn root() -> impl IntoResponse {
    ApiResponse::ok(Welcome {
        message: "Welcome to LISA",
    })
}

/// GET /services
pub async fn list_services(State(state): State<ApiState>) -> impl IntoResponse {
    let mut summaries = Vec::with_capacity(state.registry.len());
    for service in state.registry.services() {
        let record = match state.store.get_record(&service.id) {
            Ok(record) => record,
            Err(e) => {
                return error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR)
                    .into_response();
            }
        };
        summaries.push(ServiceSummary {
            id: service.id.clone(),
            name: service.name.clone(),
            description: service.description.clone(),
            status: record.status,
            updated_at: record.updated_at,
        });
    }
    ApiResponse::ok(summaries).into_response()
}

/// GET /health/{id}
pub async fn get_health(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.store.get_status(&id) {
        Ok(status) => ApiResponse::ok(HealthBody {
            service_id: id,
            status,
        })
        .into_response(),
        Err(StateError::NotFound(_)) => not_found(&id),
        Err(e) => error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response(),
    }
}

/// GET /badge/{id}
pub async fn get_badge(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.store.get_status(&id) {
        Ok(status) => {
            let badge = badge_for(status);
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "image/svg+xml"),
                    (header::CACHE_CONTROL, "no-cache"),
                ],
                badge.svg,
            )
                .into_response()
        }
        Err(StateError::NotFound(_)) => not_found(&id),
        Err(e) => error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response(),
    }
}

/// GET /version/{id}
pub async fn get_version(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let Some(service) = state.registry.get(&id) else {
        return not_found(&id);
    };

    match state.versions.get_version(service).await {
        Ok(version) => {
            debug!(service_id = %id, %version, "version served");
            ApiResponse::ok(VersionBody {
                service_id: id,
                version,
            })
            .into_response()
        }
        Err(e) => {
            warn!(service_id = %id, error = %e, "version lookup failed");
            error_response(&e.to_string(), StatusCode::BAD_GATEWAY).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::to_bytes;
    use axum::response::Response;
    use lisa_core::{Registry, Service};
    use lisa_health::VersionChecker;
    use lisa_state::StatusStore;
    use serde_json::Value;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_service(id: &str, base: &str) -> Service {
        Service {
            id: id.to_string(),
            name: format!("{id} service"),
            description: format!("the {id} service"),
            health_check_url: format!("{base}/{id}/health"),
            version_check_url: format!("{base}/{id}/version"),
            schedule: "*/5 * * * *".to_string(),
        }
    }

    fn test_state(base: &str) -> ApiState {
        let registry =
            Registry::from_services(vec![test_service("api", base), test_service("web", base)])
                .unwrap();
        let store = StatusStore::new();
        store.initialize(registry.ids()).unwrap();
        ApiState {
            registry: Arc::new(registry),
            store,
            versions: VersionChecker::new(Duration::from_secs(2)).unwrap(),
        }
    }

    async fn json_body(resp: Response) -> Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn root_welcomes() {
        let resp = root().await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        assert_eq!(body["data"]["message"], "Welcome to LISA");
    }

    #[tokio::test]
    async fn health_reports_unknown_before_first_probe() {
        let state = test_state("http://127.0.0.1:1");
        let resp = get_health(State(state), Path("api".to_string()))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["service_id"], "api");
        assert_eq!(body["data"]["status"], "UNKNOWN");
    }

    #[tokio::test]
    async fn health_reports_stored_status() {
        let state = test_state("http://127.0.0.1:1");
        state.store.set_status("web", Status::Dodgy).unwrap();
        let resp = get_health(State(state), Path("web".to_string()))
            .await
            .into_response();
        assert_eq!(json_body(resp).await["data"]["status"], "DODGY");
    }

    #[tokio::test]
    async fn health_unknown_id_is_404() {
        let state = test_state("http://127.0.0.1:1");
        let resp = get_health(State(state), Path("nope".to_string()))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body = json_body(resp).await;
        assert_eq!(body["success"], false);
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn badge_is_svg_for_status() {
        let state = test_state("http://127.0.0.1:1");
        state.store.set_status("api", Status::Maintenance).unwrap();
        let resp = get_badge(State(state), Path("api".to_string()))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/svg+xml");
        assert_eq!(resp.headers()[header::CACHE_CONTROL], "no-cache");
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], badge_for(Status::Maintenance).svg.as_bytes());
    }

    #[tokio::test]
    async fn badge_unknown_id_is_404() {
        let state = test_state("http://127.0.0.1:1");
        let resp = get_badge(State(state), Path("nope".to_string()))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_services_in_id_order() {
        let state = test_state("http://127.0.0.1:1");
        state.store.set_status("web", Status::Up).unwrap();
        let resp = list_services(State(state)).await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = json_body(resp).await;
        let services = body["data"].as_array().unwrap();
        assert_eq!(services.len(), 2);
        assert_eq!(services[0]["id"], "api");
        assert_eq!(services[0]["status"], "UNKNOWN");
        assert!(services[0]["updated_at"].is_null());
        assert_eq!(services[1]["id"], "web");
        assert_eq!(services[1]["name"], "web service");
        assert_eq!(services[1]["status"], "UP");
        assert!(services[1]["updated_at"].is_u64());
    }

    #[tokio::test]
    async fn version_is_fetched_from_service() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/version"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "version": "3.2.1"
            })))
            .mount(&server)
            .await;

        let state = test_state(&server.uri());
        let resp = get_version(State(state), Path("api".to_string()))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        assert_eq!(body["data"]["service_id"], "api");
        assert_eq!(body["data"]["version"], "3.2.1");
    }

    #[tokio::test]
    async fn version_unreachable_is_502() {
        let state = test_state("http://127.0.0.1:1");
        let resp = get_version(State(state), Path("api".to_string()))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(json_body(resp).await["success"], false);
    }

    #[tokio::test]
    async fn version_malformed_is_502() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/web/version"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let state = test_state(&server.uri());
        let resp = get_version(State(state), Path("web".to_string()))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn version_unknown_id_is_404() {
        let state = test_state("http://127.0.0.1:1");
        let resp = get_version(State(state), Path("nope".to_string()))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
