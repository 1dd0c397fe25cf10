// ============================================================================
// API Client : service d'analyse DeepCoin
// ============================================================================
// Un endpoint POST par lane, corps JSON { "coin": <sujet> }
//
// Classification d'une réponse :
// 1. Corps avec champ "error" explicite → Upstream (même en HTTP 200)
// 2. Statut non-2xx sans ce champ      → Transport (code HTTP)
// 3. Sinon, normalisation vers le variant de la lane
// Toute autre exception (réseau, JSON invalide, forme inattendue) est
// journalisée puis réduite à Unknown : rien ne remonte non traité.
// ============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::api::normalize::{normalize, upstream_error};
use crate::api::FetchError;
use crate::config::Config;
use crate::models::{Lane, LanePayload};
use crate::orchestrator::LaneFetcher;

/// Corps de requête commun aux six endpoints
#[derive(Debug, Serialize)]
struct CoinRequest<'a> {
    coin: &'a str,
}

/// Client HTTP du service d'analyse
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    http: reqwest::Client,
    base_url: String,
}

impl AnalysisClient {
    /// Crée un client avec un timeout par requête
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("deepcoin/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Échec de la création du client HTTP")?;

        Ok(Self::with_http(base_url, http))
    }

    /// Crée un client depuis la configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.api_url.clone(), config.request_timeout)
    }

    /// Crée un client avec un reqwest::Client déjà configuré
    pub fn with_http(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    /// URL complète de l'endpoint d'une lane
    pub fn endpoint_url(&self, lane: Lane) -> String {
        format!("{}{}", self.base_url, lane.endpoint_path())
    }

    /// Récupère et normalise les données d'une lane
    ///
    /// CONCEPT RUST : #[instrument]
    /// - Tous les logs à l'intérieur portent le contexte lane + subject
    #[instrument(skip(self), fields(url = %self.endpoint_url(lane)))]
    pub async fn fetch_lane(&self, lane: Lane, subject: &str) -> Result<LanePayload, FetchError> {
        debug!("Sending HTTP request to analysis service");

        let response = match self
            .http
            .post(self.endpoint_url(lane))
            .json(&CoinRequest { coin: subject })
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!(error = ?e, "HTTP request failed");
                return Err(FetchError::unknown());
            }
        };

        let status = response.status();
        debug!(%status, "Received HTTP response");

        let raw = match response.text().await {
            Ok(raw) => raw,
            Err(e) => {
                error!(error = ?e, "Failed to read response body");
                return Err(FetchError::unknown());
            }
        };

        let result = interpret_response(lane, status, &raw);
        match &result {
            Ok(payload) => info!(items = payload.len(), "Lane data fetched successfully"),
            Err(e) => warn!(kind = ?e.kind(), error = %e, "Lane fetch failed"),
        }
        result
    }
}

#[async_trait]
impl LaneFetcher for AnalysisClient {
    async fn fetch(&self, lane: Lane, subject: &str) -> Result<LanePayload, FetchError> {
        self.fetch_lane(lane, subject).await
    }
}

/// Classe une réponse HTTP déjà lue (statut + corps brut)
///
/// Le champ "error" explicite est prioritaire sur le statut HTTP.
pub fn interpret_response(
    lane: Lane,
    status: StatusCode,
    raw: &str,
) -> Result<LanePayload, FetchError> {
    let body = serde_json::from_str::<Value>(raw);

    if let Some(message) = body.as_ref().ok().and_then(upstream_error) {
        return Err(FetchError::Upstream(message));
    }

    if !status.is_success() {
        return Err(FetchError::Transport {
            status: status.as_u16(),
        });
    }

    let body = body
        .context("Échec du parsing JSON de la réponse")
        .map_err(|e| {
            error!(error = ?e, "Malformed response body");
            FetchError::unknown()
        })?;

    normalize(lane, body).map_err(|e| {
        error!(error = ?e, "Response body does not match lane shape");
        FetchError::unknown()
    })
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FetchErrorKind;
    use crate::models::Analysis;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    #[test]
    fn test_endpoint_url_trims_trailing_slash() {
        let client = AnalysisClient::with_http("http://127.0.0.1:8000/", reqwest::Client::new());
        assert_eq!(
            client.endpoint_url(Lane::Forecast),
            "http://127.0.0.1:8000/v1/predictPrice"
        );
    }

    #[test]
    fn test_error_field_wins_over_success_status() {
        let result = interpret_response(Lane::Social, StatusCode::OK, r#"{"error": "rate limited"}"#);
        assert_eq!(result, Err(FetchError::Upstream("rate limited".into())));
    }

    #[test]
    fn test_error_field_wins_over_failure_status() {
        let result = interpret_response(
            Lane::Articles,
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error": "SERP_API_KEY not configured"}"#,
        );
        assert_eq!(result.unwrap_err().kind(), FetchErrorKind::Upstream);
    }

    #[test]
    fn test_failure_status_without_error_field() {
        let result = interpret_response(Lane::Video, StatusCode::BAD_GATEWAY, "<html>oops</html>");
        assert_eq!(result.unwrap_err().to_string(), "Failed to fetch data: 502");
    }

    #[test]
    fn test_malformed_body_is_unknown() {
        let result = interpret_response(Lane::Forecast, StatusCode::OK, "not json");
        assert_eq!(result, Err(FetchError::unknown()));

        let wrong_shape = interpret_response(Lane::Forecast, StatusCode::OK, r#""text""#);
        assert_eq!(wrong_shape, Err(FetchError::unknown()));
    }

    // ------------------------------------------------------------------------
    // Serveur HTTP jetable : une seule connexion, une réponse figée
    // ------------------------------------------------------------------------

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let headers = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let body_len = headers
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + body_len {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            request
        });

        (format!("http://{addr}"), handle)
    }

    fn test_client(base_url: String) -> AnalysisClient {
        let http = reqwest::Client::builder().no_proxy().build().unwrap();
        AnalysisClient::with_http(base_url, http)
    }

    #[tokio::test]
    async fn test_fetch_summary_posts_subject() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"analysis": "Bullish momentum", "model": "gemini-flash-latest"}"#,
        )
        .await;

        let payload = test_client(url).fetch_lane(Lane::Summary, "bitcoin").await.unwrap();
        assert_eq!(payload, LanePayload::Summary(Analysis::Text("Bullish momentum".into())));

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /v1/analyzeCoin"));
        assert!(request.to_lowercase().contains("content-type: application/json"));
        assert!(request.ends_with(r#"{"coin":"bitcoin"}"#));
    }

    #[tokio::test]
    async fn test_fetch_upstream_error_with_200() {
        let (url, server) = serve_once("200 OK", r#"{"error": "rate limited"}"#).await;

        let result = test_client(url).fetch_lane(Lane::Social, "dogecoin").await;
        assert_eq!(result, Err(FetchError::Upstream("rate limited".into())));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_transport_error() {
        let (url, server) = serve_once("500 Internal Server Error", "{}").await;

        let result = test_client(url).fetch_lane(Lane::Indicators, "bitcoin").await;
        assert_eq!(result, Err(FetchError::Transport { status: 500 }));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_unknown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = test_client(format!("http://{addr}"))
            .fetch_lane(Lane::Video, "bitcoin")
            .await;
        assert_eq!(result, Err(FetchError::unknown()));
    }
}
