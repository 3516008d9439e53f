use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

use super::client::ClientConfig;
use crate::config::Credentials;
use crate::error::{AnyRunError, Result};

/// `Authorization: API-Key {key}`
pub fn auth_header(credentials: &Credentials) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("API-Key {}", credentials.api_key())).map_err(|_| {
        AnyRunError::InvalidInput("api_key contains characters not allowed in an HTTP header".to_string())
    })?;
    value.set_sensitive(true);
    Ok(value)
}

/// Create an HTTP client that sends the API key with every request
pub fn create_custom_client(config: &ClientConfig, credentials: &Credentials) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, auth_header(credentials)?);

    let client = ClientBuilder::new()
        .default_headers(headers)
        .user_agent(config.user_agent.as_str())
        // Connect timeout only; pcap bodies can take arbitrarily long
        .connect_timeout(Duration::from_secs(config.connect_timeout))
        .tcp_keepalive(Duration::from_secs(60))
        .tcp_nodelay(true)
        .use_rustls_tls()
        .danger_accept_invalid_certs(!config.verify_ssl)
        .build()?;

    Ok(client)
}
