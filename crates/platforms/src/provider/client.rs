use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::str::FromStr;
use tracing::debug;
use url::Url;

use super::default::DEFAULT_UA;
use super::error::ProviderError;

/// Thin request helper shared by the platform adapters.
///
/// Holds the platform's base URL and the headers every request to that
/// platform must carry (client id, accept, ...). Authorization is added per
/// request since it depends on the caller's access token.
#[derive(Debug, Clone)]
pub struct ApiClient {
    // name of the platform, e.g. "Twitch"
    pub platform_name: String,
    // base url every relative path is joined onto
    pub base_url: String,
    pub client: Client,
    platform_headers: HeaderMap,
}

impl ApiClient {
    pub fn new<S1: Into<String>, S2: Into<String>>(
        platform_name: S1,
        base_url: S2,
        client: Client,
    ) -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            reqwest::header::USER_AGENT,
            HeaderValue::from_static(DEFAULT_UA),
        );
        default_headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.9"),
        );

        Self {
            platform_name: platform_name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            platform_headers: default_headers,
        }
    }

    pub fn add_header_typed<K: Into<HeaderName>, V: AsRef<str>>(&mut self, key: K, value: V) {
        match HeaderValue::from_str(value.as_ref()) {
            Ok(value) => {
                self.platform_headers.insert(key.into(), value);
            }
            Err(e) => {
                debug!(error = %e, "Invalid header value; skipping");
            }
        }
    }

    pub fn add_header_str<K: AsRef<str>, V: AsRef<str>>(&mut self, key: K, value: V) {
        match HeaderName::from_str(key.as_ref()) {
            Ok(name) => self.add_header_typed(name, value),
            Err(e) => {
                debug!(error = %e, "Invalid header name; skipping");
            }
        }
    }

    /// Resolves a path against the base url; absolute urls pass through.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.request(Method::GET, path)
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.request(Method::POST, path)
    }

    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .headers(self.platform_headers.clone())
    }

    /// Sends the request and decodes a JSON body, mapping non-2xx statuses to errors.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ProviderError> {
        let response = Self::check_status(request.send().await?)?;
        let body = response.text().await?;
        debug!(platform = %self.platform_name, "response body: {}", body);
        Ok(serde_json::from_str(&body)?)
    }

    /// Sends the request and returns the raw body.
    pub async fn send_bytes(&self, request: RequestBuilder) -> Result<Vec<u8>, ProviderError> {
        let response = Self::check_status(request.send().await?)?;
        Ok(response.bytes().await?.to_vec())
    }

    fn check_status(response: Response) -> Result<Response, ProviderError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(ProviderError::Status {
                status: status.as_u16(),
                url: redacted_url(response.url()),
            })
        }
    }
}

/// `url` without its query string or fragment; playback tokens travel in the query.
fn redacted_url(url: &Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.to_string()
}
