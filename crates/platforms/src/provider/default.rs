use reqwest::Client;
use rustls::{ClientConfig, crypto::aws_lc_rs};
use rustls_platform_verifier::BuilderVerifierExt;
use std::sync::Arc;
use std::time::Duration;

use super::error::ProviderError;

pub(crate) const DEFAULT_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

/// Default request timeout for platform API calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds the HTTP client shared by every provider.
pub fn default_client(timeout: Duration) -> Result<Client, ProviderError> {
    let provider = Arc::new(aws_lc_rs::default_provider());
    let tls_config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| ProviderError::ValidationError(format!("tls protocol versions: {e}")))?
        .with_platform_verifier()
        .map_err(|e| ProviderError::ValidationError(format!("tls verifier: {e}")))?
        .with_no_client_auth();

    let client = Client::builder()
        .use_preconfigured_tls(tls_config)
        .user_agent(DEFAULT_UA)
        .timeout(timeout)
        .build()?;

    Ok(client)
}
