//! Built-in health probe client.
//!
//! `beacon probe` lets the container declare its HEALTHCHECK against the
//! binary itself instead of shipping curl in the runtime image. It targets the
//! same port the service binds, resolved from the same configuration, so the
//! prober and the listener cannot disagree about `PORT`.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use reqwest::StatusCode;

use crate::config::{AppConfig, HEALTH_PATH, PROBE_USER_AGENT};

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("Failed to build probe client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Health probe to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Health probe to {url} returned {status}")]
    Unhealthy { url: String, status: StatusCode },
}

/// URL of the local health endpoint for this configuration.
///
/// Wildcard bind addresses are not connectable, so they map to loopback of
/// the same family.
pub fn probe_url(config: &AppConfig) -> String {
    let ip = match config.http.host.parse::<IpAddr>() {
        Ok(IpAddr::V4(ip)) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        Ok(IpAddr::V6(ip)) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        Ok(ip) => ip,
        Err(_) => IpAddr::V4(Ipv4Addr::LOCALHOST),
    };
    format!("http://{}{}", SocketAddr::new(ip, config.http.port), HEALTH_PATH)
}

/// Issue one GET against `url`, bounded by `timeout`.
///
/// Only a 2xx status counts as healthy.
pub async fn check(url: &str, timeout: Duration) -> Result<StatusCode, ProbeError> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(PROBE_USER_AGENT)
        .build()
        .map_err(ProbeError::Client)?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| ProbeError::Request {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if status.is_success() {
        tracing::debug!(%url, %status, "Health probe succeeded");
        Ok(status)
    } else {
        Err(ProbeError::Unhealthy {
            url: url.to_string(),
            status,
        })
    }
}
