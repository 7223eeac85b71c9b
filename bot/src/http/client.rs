//! Shared HTTP client for provider APIs

use std::time::Duration;

use reqwest::{header, Client, Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error};

use crate::errors::BotError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How requests authenticate
#[derive(Default)]
enum Auth {
    #[default]
    None,
    Bearer(SecretString),
}

/// HTTP client bound to one provider
pub struct HttpClient {
    client: Client,
    base_url: String,
    service: String,
    auth: Auth,
    headers: header::HeaderMap,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(service: &str, base_url: &str) -> Result<Self, BotError> {
        Self::with_timeout(service, base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(service: &str, base_url: &str, timeout: Duration) -> Result<Self, BotError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("leadbot/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service: service.to_string(),
            auth: Auth::None,
            headers: header::HeaderMap::new(),
        })
    }

    /// Send `Authorization: Bearer <token>` with every request
    pub fn with_bearer(mut self, token: SecretString) -> Self {
        self.auth = Auth::Bearer(token);
        self
    }

    /// Send a fixed header with every request
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, BotError> {
        let header_name = header::HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| BotError::Config(format!("Invalid header name {}: {}", name, e)))?;
        let value = header::HeaderValue::from_str(value)
            .map_err(|e| BotError::Config(format!("Invalid {} header: {}", name, e)))?;
        self.headers.insert(header_name, value);
        Ok(self)
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {} {}", self.service, method, path);

        let mut request = self.client.request(method, &url).headers(self.headers.clone());
        if let Auth::Bearer(token) = &self.auth {
            request = request.header(
                header::AUTHORIZATION,
                format!("Bearer {}", token.expose_secret()),
            );
        }
        request
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, BotError> {
        let request = self.request(Method::GET, path).query(query);
        self.send(request, "GET").await
    }

    /// Make a POST request
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, BotError> {
        let request = self.request(Method::POST, path).json(body);
        self.send(request, "POST").await
    }

    /// Make a PUT request
    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, BotError> {
        let request = self.request(Method::PUT, path).json(body);
        self.send(request, "PUT").await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        method: &str,
    ) -> Result<T, BotError> {
        let response = request.send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!("{} {} failed: {} - {}", self.service, method, status, body);
            return Err(BotError::remote(
                &self.service,
                format!("{}: {}", status, truncate(&body, 512)),
            ));
        }

        serde_json::from_str(&body).map_err(|e| {
            BotError::Validation(format!("{} returned an unexpected body: {}", self.service, e))
        })
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
