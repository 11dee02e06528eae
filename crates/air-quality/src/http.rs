//! Shared outbound HTTP plumbing.

use std::time::Duration;

use log::debug;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::errors::AirQualityError;

/// Longest slice of an error body kept in error messages.
const MAX_ERROR_BODY: usize = 300;

/// Build the client shared by a provider.
pub(crate) fn build_client(user_agent: &str, timeout: Duration) -> Client {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .pool_max_idle_per_host(4)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Send a request and decode a JSON body, all inside one timeout window.
///
/// Expiry cancels the in-flight request and yields [`AirQualityError::Timeout`].
/// Non-2xx statuses and undecodable bodies become `SourceUnavailable`.
pub(crate) async fn get_json<T: DeserializeOwned>(
    provider: &str,
    request: RequestBuilder,
    timeout: Duration,
) -> Result<T, AirQualityError> {
    let call = async {
        let response = request
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| map_reqwest_error(provider, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let end = floor_char_boundary(&body, MAX_ERROR_BODY);
            return Err(AirQualityError::unavailable(
                provider,
                format!("HTTP {}: {}", status.as_u16(), &body[..end]),
            ));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AirQualityError::unavailable(provider, format!("JSON parse error: {e}")))
    };

    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => {
            debug!("Request to '{}' exceeded {:?}, cancelled", provider, timeout);
            Err(AirQualityError::Timeout {
                provider: provider.to_string(),
            })
        }
    }
}

fn map_reqwest_error(provider: &str, error: reqwest::Error) -> AirQualityError {
    if error.is_timeout() {
        AirQualityError::Timeout {
            provider: provider.to_string(),
        }
    } else {
        AirQualityError::unavailable(provider, error.to_string())
    }
}

fn floor_char_boundary(s: &str, max: usize) -> usize {
    if s.len() <= max {
        return s.len();
    }
    (0..=max).rev().find(|i| s.is_char_boundary(*i)).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_char_boundary() {
        assert_eq!(floor_char_boundary("short", 300), 5);
        assert_eq!(floor_char_boundary("abcdef", 3), 3);
        // 'é' is two bytes; index 2 splits it
        assert_eq!(floor_char_boundary("aéb", 2), 1);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_source_unavailable() {
        let client = build_client("pureair-test", Duration::from_secs(2));
        let request = client.get("http://127.0.0.1:9/unreachable");

        let result: Result<serde_json::Value, _> =
            get_json("TEST", request, Duration::from_secs(2)).await;

        let error = result.expect_err("connection should be refused");
        assert!(error.is_source_unavailable());
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        // Accepts the connection but never writes a response
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let server = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.expect("accept");
            tokio::time::sleep(Duration::from_secs(10)).await;
        });

        let client = build_client("pureair-test", Duration::from_secs(10));
        let request = client.get(format!("http://{addr}/silent"));

        let started = std::time::Instant::now();
        let result: Result<serde_json::Value, _> =
            get_json("TEST", request, Duration::from_millis(200)).await;

        let error = result.expect_err("silent server should time out");
        assert!(matches!(error, AirQualityError::Timeout { ref provider } if provider == "TEST"));
        assert!(started.elapsed() < Duration::from_secs(5));
        server.abort();
    }
}
