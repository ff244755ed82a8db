//! HTTP transport for API commands.
//!
//! Sends one prepared request, logs it, and turns transport failures into
//! [`NamecheapError`] values. Nothing here is retried: malformed responses and
//! transport errors go straight back to the caller.

use std::time::Instant;

use reqwest::{Client, RequestBuilder};

use crate::error::{NamecheapError, Result};
use crate::utils::log_sanitizer::sanitize_for_log;

/// HTTP helpers shared by every API command.
pub struct HttpUtils;

impl HttpUtils {
    /// Client with the given connect and whole-request timeouts.
    pub fn build_client(
        connect_timeout: std::time::Duration,
        request_timeout: std::time::Duration,
    ) -> Result<Client> {
        Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()
            .map_err(|e| NamecheapError::Network {
                detail: format!("Failed to create HTTP client: {e}"),
            })
    }

    /// Performs an HTTP request and returns the response text.
    ///
    /// # Arguments
    /// * `request_builder` - configured request (URL, form body)
    /// * `method_name` - request method name, for logs
    /// * `url_or_action` - URL and command, for logs
    /// * `secret` - value redacted from logged bodies (the API key)
    ///
    /// # Errors
    /// * [`NamecheapError::Timeout`] / [`NamecheapError::Network`] when sending fails
    /// * [`NamecheapError::HttpStatus`] for any non-2xx status
    pub async fn execute_request(
        request_builder: RequestBuilder,
        method_name: &str,
        url_or_action: &str,
        secret: &str,
    ) -> Result<String> {
        log::debug!("[namecheap] {method_name} {url_or_action}");

        let started = Instant::now();
        let response = request_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                NamecheapError::Timeout {
                    detail: e.to_string(),
                }
            } else {
                NamecheapError::Network {
                    detail: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        log::debug!(
            "[namecheap] Response Status: {} ({}ms)",
            status.as_u16(),
            started.elapsed().as_millis()
        );

        let response_text = response
            .text()
            .await
            .map_err(|e| NamecheapError::Network {
                detail: format!("Failed to read response body: {e}"),
            })?;

        if !status.is_success() {
            let body = sanitize_for_log(&response_text, secret);
            log::warn!("[namecheap] HTTP {} from {url_or_action}", status.as_u16());
            return Err(NamecheapError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        log::debug!(
            "[namecheap] Response Body: {}",
            sanitize_for_log(&response_text, secret)
        );

        Ok(response_text)
    }
}
