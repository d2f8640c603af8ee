//! Blocking HTTP client for the Pet Store API.
//!
//! Uses the curl crate (libcurl) with one Easy handle per request. Every
//! call is a single attempt; retries live in the retry module so the
//! classifier sees each failure individually.

mod parse;

use std::collections::HashMap;
use std::str;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;

use crate::config::HarnessConfig;
use crate::pet::Pet;
use crate::retry::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// Raw response from one attempt.
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u32,
    /// Headers of the final response, keys lowercased.
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).context("decode JSON response body")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn retry_after(&self) -> Option<Duration> {
        self.header("retry-after").and_then(parse::parse_retry_after)
    }

    /// Leading body text, for diagnostics.
    pub fn body_excerpt(&self) -> String {
        String::from_utf8_lossy(&self.body).chars().take(200).collect()
    }

    /// Convert a non-2xx response into the error the classifier consumes.
    pub fn into_error(self) -> ApiError {
        let retry_after = self.retry_after();
        ApiError::Http {
            status: self.status,
            body: self.body_excerpt(),
            retry_after,
        }
    }
}

/// Client bound to one Pet Store deployment.
#[derive(Debug, Clone)]
pub struct PetStoreClient {
    base_url: String,
    api_key: String,
    timeout: Duration,
    connect_timeout: Duration,
}

impl PetStoreClient {
    /// Build a client from config, validating the base URL up front so a
    /// typo fails the run before any scenario starts.
    pub fn new(cfg: &HarnessConfig) -> Result<Self> {
        let parsed = url::Url::parse(&cfg.base_url)
            .with_context(|| format!("invalid base URL {:?}", cfg.base_url))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            bail!("base URL must be http or https, got {:?}", parsed.scheme());
        }
        Ok(PetStoreClient {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
            timeout: Duration::from_secs(cfg.timeout_secs),
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Perform one request. Transport failures surface as
    /// `ApiError::Transport`; any HTTP status, including errors, comes back
    /// as a response.
    pub fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&[u8]>,
    ) -> Result<HttpResponse, ApiError> {
        let mut header_lines: Vec<String> = Vec::new();
        let mut response_body: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(&format!("{}{}", self.base_url, path))?;
        easy.follow_location(true)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;

        let mut list = curl::easy::List::new();
        list.append("Content-Type: application/json")?;
        list.append("Accept: application/json")?;
        list.append(&format!("api_key: {}", self.api_key))?;
        easy.http_headers(list)?;

        match method {
            Method::Get => easy.get(true)?,
            Method::Post => {
                easy.post(true)?;
                easy.post_fields_copy(body.unwrap_or_default())?;
            }
            Method::Put => {
                easy.post(true)?;
                easy.post_fields_copy(body.unwrap_or_default())?;
                easy.custom_request("PUT")?;
            }
            Method::Delete => easy.custom_request("DELETE")?,
        }

        {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    header_lines.push(s.trim_end().to_string());
                }
                true
            })?;
            transfer.write_function(|data| {
                response_body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let status = easy.response_code()?;
        tracing::debug!(method = method.as_str(), path, status, "request completed");

        Ok(HttpResponse {
            status,
            headers: parse::parse_headers(&header_lines),
            body: response_body,
        })
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&[u8]>,
    ) -> Result<HttpResponse, ApiError> {
        let resp = self.send(method, path, body)?;
        if (200..300).contains(&resp.status) {
            Ok(resp)
        } else {
            Err(resp.into_error())
        }
    }

    pub fn create_pet(&self, pet: &Pet) -> Result<HttpResponse, ApiError> {
        let body = serde_json::to_vec(pet).map_err(ApiError::Encode)?;
        self.request(Method::Post, "/pet", Some(&body))
    }

    pub fn get_pet(&self, id: u64) -> Result<HttpResponse, ApiError> {
        self.request(Method::Get, &format!("/pet/{}", id), None)
    }

    pub fn update_pet(&self, pet: &Pet) -> Result<HttpResponse, ApiError> {
        let body = serde_json::to_vec(pet).map_err(ApiError::Encode)?;
        self.request(Method::Put, "/pet", Some(&body))
    }

    pub fn delete_pet(&self, id: u64) -> Result<HttpResponse, ApiError> {
        self.request(Method::Delete, &format!("/pet/{}", id), None)
    }

    /// Whether the backend answers at all. Pet 1 may or may not exist; a
    /// 404 still proves the service is up and routing requests.
    pub fn health_check(&self) -> bool {
        matches!(
            self.send(Method::Get, "/pet/1", None),
            Ok(r) if r.status == 200 || r.status == 404
        )
    }
}
