use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::json;

use super::{Ack, DataService, ServiceError};
use crate::models::{Master, Trade};

#[derive(Deserialize)]
struct ErrorMessage {
    message: Option<String>,
}

/// `DataService` backed by the analysis backend's REST API.
#[derive(Debug, Clone)]
pub struct HttpDataService {
    http: Client,
    base: Url,
}

impl HttpDataService {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ServiceError> {
        let http = Client::builder().timeout(timeout).build()?;
        Self::with_client(http, base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, ServiceError> {
        let base = Url::parse(base_url)
            .map_err(|e| ServiceError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ServiceError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self { http, base })
    }

    /// `{base}/{segments..}` with every segment percent-encoded on its own,
    /// so `/`, `?` and `#` inside an address stay inside that segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ServiceError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ServiceError::InvalidBaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Endpoint scoped to one master. Dot segments would be dropped by URL
    /// normalisation and address a different resource, so they are refused.
    fn master_endpoint(&self, address: &str, suffix: Option<&str>) -> Result<Url, ServiceError> {
        let address = address.trim();
        if address.is_empty() || address == "." || address == ".." {
            return Err(ServiceError::InvalidAddress(address.to_string()));
        }
        match suffix {
            Some(suffix) => self.endpoint(&["masters", address, suffix]),
            None => self.endpoint(&["masters", address]),
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response, ServiceError> {
        let resp = request.send().await.map_err(classify)?;
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let message = resp
            .json::<ErrorMessage>()
            .await
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| format!("API error with status: {}", status.as_u16()));

        Err(ServiceError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

fn classify(e: reqwest::Error) -> ServiceError {
    if e.is_timeout() {
        ServiceError::Timeout
    } else {
        ServiceError::Http(e)
    }
}

#[async_trait]
impl DataService for HttpDataService {
    async fn list_masters(&self) -> Result<Vec<Master>, ServiceError> {
        let url = self.endpoint(&["masters"])?;
        let resp = self.send(self.http.get(url)).await?;
        resp.json().await.map_err(classify)
    }

    async fn get_master(&self, address: &str) -> Result<Option<Master>, ServiceError> {
        let url = self.master_endpoint(address, None)?;
        match self.send(self.http.get(url)).await {
            Ok(resp) => Ok(Some(resp.json().await.map_err(classify)?)),
            Err(ServiceError::Api { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn list_trades(&self, address: &str) -> Result<Vec<Trade>, ServiceError> {
        let url = self.master_endpoint(address, Some("trades"))?;
        let resp = self.send(self.http.get(url)).await?;
        resp.json().await.map_err(classify)
    }

    async fn request_analysis(&self, address: &str) -> Result<Ack, ServiceError> {
        let url = self.endpoint(&["analyze"])?;
        self.send(self.http.post(url).json(&json!({ "address": address })))
            .await?;
        Ok(Ack::now(address))
    }

    async fn request_update(&self, address: &str) -> Result<Ack, ServiceError> {
        let url = self.master_endpoint(address, Some("update"))?;
        self.send(self.http.post(url)).await?;
        Ok(Ack::now(address))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, State};
    use axum::http::{Method, Uri};
    use axum::response::IntoResponse;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::Value;

    use super::*;
    use crate::models::TradeType;

    type Seen = Arc<Mutex<Vec<String>>>;

    /// Serve `router` on an ephemeral port and return its `/v1` base URL.
    async fn spawn_backend(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/v1")
    }

    fn service(base: &str) -> HttpDataService {
        HttpDataService::new(base, Duration::from_secs(5)).unwrap()
    }

    fn master_json(address: &str) -> Value {
        json!({
            "id": format!("master-{address}"),
            "address": address,
            "totalPnl": 1234.5,
            "unrealizedPnl": -42.0,
            "winStreak": 3,
            "tradeFrequency": "High",
            "avgHoldingTime": "13h 42m",
            "winRate": 63.45,
            "lastUpdated": "2025-03-01T12:00:00.000Z",
        })
    }

    async fn record_any(State(seen): State<Seen>, method: Method, uri: Uri) -> impl IntoResponse {
        let target = uri.path_and_query().map(|p| p.as_str()).unwrap_or("");
        seen.lock().unwrap().push(format!("{method} {target}"));
        Json(json!([]))
    }

    async fn get_master_route(Path(address): Path<String>) -> axum::response::Response {
        match address.as_str() {
            "CxMissing" => (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": "no analysis for wallet" })),
            )
                .into_response(),
            "CxBroken" => (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response(),
            _ => Json(master_json(&address)).into_response(),
        }
    }

    async fn trades_route(Path(address): Path<String>) -> axum::response::Response {
        if address == "CxOffline" {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "message": "indexer offline" })),
            )
                .into_response();
        }
        Json(json!([{
            "id": "trade-0",
            "time": "2025-03-01T12:00:00.000Z",
            "type": "BUY",
            "token": "SOL",
            "tokenAmount": 1.5,
            "tokenAddress": "So1...1112",
            "amountUsd": 210.0,
            "transactionHash": "5xYz...abcd",
        }]))
        .into_response()
    }

    async fn analyze_route(State(seen): State<Seen>, Json(body): Json<Value>) -> StatusCode {
        seen.lock().unwrap().push(body.to_string());
        StatusCode::ACCEPTED
    }

    fn backend(seen: Seen) -> Router {
        Router::new()
            .route("/v1/masters", get(|| async { Json(json!([master_json("CxA")])) }))
            .route("/v1/masters/:address", get(get_master_route))
            .route("/v1/masters/:address/trades", get(trades_route))
            .route("/v1/masters/:address/update", post(|| async { StatusCode::ACCEPTED }))
            .route("/v1/analyze", post(analyze_route))
            .with_state(seen)
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let service = HttpDataService::with_client(Client::new(), "https://api.example.com/v1/").unwrap();
        let url = service.endpoint(&["masters"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/masters");

        let root = HttpDataService::with_client(Client::new(), "https://api.example.com").unwrap();
        assert_eq!(root.endpoint(&["analyze"]).unwrap().as_str(), "https://api.example.com/analyze");
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        assert!(matches!(
            HttpDataService::with_client(Client::new(), "not a url"),
            Err(ServiceError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            HttpDataService::with_client(Client::new(), "mailto:ops@example.com"),
            Err(ServiceError::InvalidBaseUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_service_error() {
        let service = HttpDataService::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let result = service.list_masters().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_address_stays_in_one_path_segment() {
        let seen: Seen = Arc::default();
        let router = Router::new().fallback(record_any).with_state(Arc::clone(&seen));
        let service = service(&spawn_backend(router).await);

        service.request_update("../../admin/wipe?x=").await.unwrap();
        service.list_trades("Cx1#frag").await.unwrap();
        // The catch-all answers `[]`, which is not a master; only the path matters.
        let _ = service.get_master("Cx/2").await;

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                "POST /v1/masters/..%2F..%2Fadmin%2Fwipe%3Fx=/update".to_string(),
                "GET /v1/masters/Cx1%23frag/trades".to_string(),
                "GET /v1/masters/Cx%2F2".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_dot_segment_address_never_sent() {
        let seen: Seen = Arc::default();
        let router = Router::new().fallback(record_any).with_state(Arc::clone(&seen));
        let service = service(&spawn_backend(router).await);

        assert!(matches!(
            service.request_update("..").await,
            Err(ServiceError::InvalidAddress(_))
        ));
        assert!(matches!(
            service.list_trades(" . ").await,
            Err(ServiceError::InvalidAddress(_))
        ));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_and_get_decode_records() {
        let service = service(&spawn_backend(backend(Arc::default())).await);

        let masters = service.list_masters().await.unwrap();
        assert_eq!(masters.len(), 1);
        assert_eq!(masters[0].address, "CxA");
        assert_eq!(masters[0].win_streak, 3);

        let master = service.get_master("CxB").await.unwrap().unwrap();
        assert_eq!(master.id, "master-CxB");
        assert_eq!(master.total_pnl, 1234.5);

        let trades = service.list_trades("CxB").await.unwrap();
        assert_eq!(trades[0].trade_type, TradeType::Buy);
        assert_eq!(trades[0].amount_usd, 210.0);
    }

    #[tokio::test]
    async fn test_get_master_404_is_none() {
        let service = service(&spawn_backend(backend(Arc::default())).await);
        assert!(service.get_master("CxMissing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_error_body_message_is_used() {
        let service = service(&spawn_backend(backend(Arc::default())).await);
        match service.list_trades("CxOffline").await {
            Err(ServiceError::Api { status, message }) => {
                assert_eq!(status, 503);
                assert_eq!(message, "indexer offline");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_json_error_falls_back_to_status() {
        let service = service(&spawn_backend(backend(Arc::default())).await);
        let err = service.get_master("CxBroken").await.unwrap_err();
        assert!(matches!(err, ServiceError::Api { status: 500, .. }));
        assert_eq!(err.to_string(), "API error with status: 500");
    }

    #[tokio::test]
    async fn test_triggers_post_expected_requests() {
        let seen: Seen = Arc::default();
        let service = service(&spawn_backend(backend(Arc::clone(&seen))).await);

        let ack = service.request_analysis("CxA").await.unwrap();
        assert_eq!(ack.address, "CxA");
        assert_eq!(*seen.lock().unwrap(), vec![r#"{"address":"CxA"}"#.to_string()]);

        let ack = service.request_update("CxA").await.unwrap();
        assert_eq!(ack.address, "CxA");
    }

    #[tokio::test]
    async fn test_slow_backend_times_out() {
        let router = Router::new().route(
            "/v1/masters",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Json(json!([]))
            }),
        );
        let base = spawn_backend(router).await;
        let service = HttpDataService::new(&base, Duration::from_millis(100)).unwrap();

        assert!(matches!(service.list_masters().await, Err(ServiceError::Timeout)));
    }
}
