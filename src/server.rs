use std::path::Path as FsPath;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::analytics::PaymentTracker;
use crate::config::Config;
use crate::entrypoints::{self, ENTRYPOINTS, Entrypoint};
use crate::error::AppError;
use crate::handlers;
use crate::holiday_api::HolidayApi;
use crate::time_api::TimeApi;

const SERVICE_DESCRIPTION: &str = "Metered timezone, time conversion and public holiday lookups";

/// Everything a request needs, built once at startup and never mutated afterwards
/// except for the payment tracker's append-only log.
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<Config>,
    pub time_api: TimeApi,
    pub holiday_api: HolidayApi,
    pub tracker: Arc<PaymentTracker>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let client = reqwest::Client::new();
        Self {
            time_api: TimeApi::new(client.clone(), config.time_api_url.clone()),
            holiday_api: HolidayApi::new(client, config.holiday_api_url.clone()),
            config: Arc::new(config),
            tracker: Arc::new(PaymentTracker::new()),
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/entrypoints", get(list_entrypoints))
        .route("/entrypoints/:key/invoke", post(invoke))
        .route("/.well-known/agent.json", get(agent_descriptor))
        .route("/favicon.svg", get(icon))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_entrypoints() -> Json<&'static [Entrypoint]> {
    Json(&ENTRYPOINTS[..])
}

#[derive(Deserialize, Debug, Default)]
struct InvokeRequest {
    #[serde(default)]
    input: Option<Value>,
}

#[derive(Serialize, Debug)]
struct InvokeResponse {
    output: Value,
}

/// Runs one entrypoint and charges its price once it has succeeded.
async fn invoke(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: Bytes,
) -> Result<Json<InvokeResponse>, AppError> {
    let entrypoint =
        entrypoints::find(&key).ok_or_else(|| AppError::UnknownEntrypoint(key.clone()))?;

    let request: InvokeRequest = if body.iter().all(u8::is_ascii_whitespace) {
        InvokeRequest::default()
    } else {
        serde_json::from_slice(&body)?
    };
    let input = request.input.unwrap_or_else(|| json!({}));

    info!("Invoking entrypoint {}", entrypoint.key);
    let output = dispatch(&state, entrypoint.key, input).await?;

    if entrypoint.price > 0 {
        state
            .tracker
            .record(entrypoint.key, u128::from(entrypoint.price));
    }

    Ok(Json(InvokeResponse { output }))
}

async fn dispatch(state: &AppState, key: &str, input: Value) -> Result<Value, AppError> {
    let time_api = &state.time_api;
    let holiday_api = &state.holiday_api;

    let output = match key {
        entrypoints::OVERVIEW => {
            to_output(handlers::overview(time_api, holiday_api, parse(input)?).await?)?
        }
        entrypoints::CURRENT_TIME => {
            to_output(handlers::current_time(time_api, parse(input)?).await?)?
        }
        entrypoints::CONVERT => to_output(handlers::convert(time_api, parse(input)?).await?)?,
        entrypoints::HOLIDAYS => to_output(handlers::holidays(holiday_api, parse(input)?).await?)?,
        entrypoints::MULTI_ZONE => {
            to_output(handlers::multi_zone(time_api, parse(input)?).await?)?
        }
        entrypoints::FULL_REPORT => {
            to_output(handlers::full_report(time_api, holiday_api, parse(input)?).await?)?
        }
        entrypoints::ANALYTICS => to_output(state.tracker.summary(parse(input)?)?)?,
        entrypoints::ANALYTICS_TRANSACTIONS => {
            to_output(state.tracker.transactions(parse(input)?)?)?
        }
        entrypoints::ANALYTICS_CSV => to_output(state.tracker.csv(parse(input)?)?)?,
        _ => return Err(AppError::UnknownEntrypoint(key.to_string())),
    };
    Ok(output)
}

fn parse<T: DeserializeOwned>(input: Value) -> Result<T, AppError> {
    serde_json::from_value(input).map_err(|e| AppError::InvalidInput(e.to_string()))
}

fn to_output<T: Serialize>(output: T) -> Result<Value, AppError> {
    serde_json::to_value(output).map_err(AppError::Serialization)
}

/// Registration document describing the service and its priced entrypoints.
async fn agent_descriptor(State(state): State<AppState>) -> Json<Value> {
    let base_url = &state.config.base_url;
    let entrypoints: Vec<Value> = ENTRYPOINTS
        .iter()
        .map(|e| {
            json!({
                "key": e.key,
                "description": e.description,
                "price": e.price.to_string(),
                "url": format!("{}/entrypoints/{}/invoke", base_url, e.key),
            })
        })
        .collect();

    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "description": SERVICE_DESCRIPTION,
        "url": base_url,
        "entrypoints": entrypoints,
    }))
}

async fn icon(State(state): State<AppState>) -> Response {
    let path = &state.config.icon_path;
    match tokio::fs::read(path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type(path))], bytes).into_response(),
        Err(e) => {
            warn!("Icon {} not served: {}", path.display(), e);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

fn content_type(path: &FsPath) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_api::tests::current_time_body;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use wiremock::{Mock, MockServer, ResponseTemplate, matchers};

    fn state_for(mock_server: &MockServer) -> AppState {
        let uri = mock_server.uri();
        let config = Config::from_lookup(|key| match key {
            "BASE_URL" => Some("https://tz.example.com".to_string()),
            "TIME_API_URL" | "HOLIDAY_API_URL" => Some(uri.clone()),
            "ICON_PATH" => Some("does/not/exist.svg".to_string()),
            _ => None,
        })
        .unwrap();
        AppState::new(config)
    }

    async fn send(state: &AppState, method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn invoke_json(state: &AppState, key: &str, input: Value) -> (StatusCode, Value) {
        let body = json!({ "input": input }).to_string();
        send(state, Method::POST, &format!("/entrypoints/{}/invoke", key), &body).await
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let mock_server = MockServer::start().await;
        let state = state_for(&mock_server);

        let (status, body) = send(&state, Method::GET, "/health", "").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn current_time_is_wrapped_and_charged() {
        let mock_server = MockServer::start().await;
        Mock::given(matchers::method("GET"))
            .and(matchers::path("/api/Time/current/zone"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(current_time_body("Europe/London")),
            )
            .mount(&mock_server)
            .await;
        let state = state_for(&mock_server);

        let (status, body) =
            invoke_json(&state, "current-time", json!({ "timezone": "Europe/London" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["output"]["timezone"], "Europe/London");
        assert_eq!(body["output"]["dayOfWeek"], "Friday");

        let (status, body) = invoke_json(&state, "analytics", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["output"]["totalRevenue"], "1000");
        assert_eq!(body["output"]["byEntrypoint"]["current-time"]["count"], 1);
    }

    #[tokio::test]
    async fn multi_zone_reports_bad_zone_inline() {
        let mock_server = MockServer::start().await;
        Mock::given(matchers::method("GET"))
            .and(matchers::query_param("timeZone", "America/New_York"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(current_time_body("America/New_York")),
            )
            .mount(&mock_server)
            .await;
        Mock::given(matchers::method("GET"))
            .and(matchers::query_param("timeZone", "Invalid/Zone"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&mock_server)
            .await;
        let state = state_for(&mock_server);

        let (status, body) = invoke_json(
            &state,
            "multi-zone",
            json!({ "timezones": ["America/New_York", "Invalid/Zone"] }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["output"]["count"], 2);
        assert_eq!(body["output"]["results"][0]["timezone"], "America/New_York");
        assert_eq!(body["output"]["results"][0]["dstActive"], true);
        assert_eq!(
            body["output"]["results"][1],
            json!({ "timezone": "Invalid/Zone", "error": "Failed to fetch" })
        );
    }

    #[tokio::test]
    async fn invalid_input_is_rejected_and_not_charged() {
        let mock_server = MockServer::start().await;
        let state = state_for(&mock_server);

        let (status, body) =
            invoke_json(&state, "holidays", json!({ "countryCode": "USA" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("countryCode"));

        let (status, _) = invoke_json(&state, "current-time", json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &state,
            Method::POST,
            "/entrypoints/current-time/invoke",
            "{not json",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(state.tracker.summary(Default::default()).unwrap().transaction_count, 0);
    }

    #[tokio::test]
    async fn upstream_failure_is_a_server_error() {
        let mock_server = MockServer::start().await;
        Mock::given(matchers::any())
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;
        let state = state_for(&mock_server);

        let (status, body) =
            invoke_json(&state, "current-time", json!({ "timezone": "Nowhere/Land" })).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Time API error: 404" }));
        assert_eq!(state.tracker.summary(Default::default()).unwrap().transaction_count, 0);
    }

    #[tokio::test]
    async fn unreachable_upstream_does_not_leak_its_address() {
        let config = Config::from_lookup(|key| match key {
            "TIME_API_URL" => Some("http://127.0.0.1:1/secret-upstream".to_string()),
            _ => None,
        })
        .unwrap();
        let state = AppState::new(config);

        let (status, body) =
            invoke_json(&state, "current-time", json!({ "timezone": "Europe/London" })).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Upstream request failed" }));
        let text = body.to_string();
        assert!(!text.contains("127.0.0.1"));
        assert!(!text.contains("secret-upstream"));
    }

    #[tokio::test]
    async fn negative_window_is_rejected() {
        let mock_server = MockServer::start().await;
        let state = state_for(&mock_server);

        let (status, body) = invoke_json(&state, "analytics", json!({ "windowMs": -1 })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("windowMs"));

        let (status, _) =
            invoke_json(&state, "analytics-transactions", json!({ "windowMs": -60000 })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_entrypoint_is_not_found() {
        let mock_server = MockServer::start().await;
        let state = state_for(&mock_server);

        let (status, _) = invoke_json(&state, "sunrise", json!({})).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn free_entrypoint_accepts_empty_body() {
        let mock_server = MockServer::start().await;
        let state = state_for(&mock_server);
        state.tracker.record("convert", 2000);

        let (status, body) = send(
            &state,
            Method::POST,
            "/entrypoints/analytics-csv/invoke",
            "",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let csv = body["output"]["csv"].as_str().unwrap();
        assert!(csv.starts_with("timestamp,entrypoint,amount\n"));
        assert!(csv.contains(",convert,2000"));
    }

    #[tokio::test]
    async fn descriptor_lists_priced_entrypoints() {
        let mock_server = MockServer::start().await;
        let state = state_for(&mock_server);

        let (status, body) = send(&state, Method::GET, "/.well-known/agent.json", "").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["url"], "https://tz.example.com");
        let entrypoints = body["entrypoints"].as_array().unwrap();
        assert_eq!(entrypoints.len(), ENTRYPOINTS.len());
        let full_report = entrypoints
            .iter()
            .find(|e| e["key"] == "full-report")
            .unwrap();
        assert_eq!(full_report["price"], "5000");
        assert_eq!(
            full_report["url"],
            "https://tz.example.com/entrypoints/full-report/invoke"
        );
    }

    #[tokio::test]
    async fn missing_icon_is_not_found() {
        let mock_server = MockServer::start().await;
        let state = state_for(&mock_server);

        let (status, _) = send(&state, Method::GET, "/favicon.svg", "").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn icon_is_served_from_disk() {
        let path = std::env::temp_dir().join(format!("tz-meter-icon-{}.svg", std::process::id()));
        std::fs::write(&path, "<svg/>").unwrap();
        let mut state = state_for(&MockServer::start().await);
        state.config = Arc::new(Config {
            icon_path: path.clone(),
            ..(*state.config).clone()
        });

        let request = Request::builder()
            .uri("/favicon.svg")
            .body(Body::empty())
            .unwrap();
        let response = app(state).oneshot(request).await.unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/svg+xml");
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"<svg/>");
    }
}
