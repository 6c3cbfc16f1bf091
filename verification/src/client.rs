//! HTTP client for the verification endpoint.

use crate::classify::{classify_response, reads_body};
use crate::error::VerificationError;
use crate::method::Verifier;

use kiosk_types::{StillImage, VerificationOutcome};
use reqwest::multipart::{Form, Part};
use std::future::Future;
use std::time::Duration;

/// Default timeout for a verification round trip.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connection timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Multipart field carrying the image.
pub const FILE_FIELD: &str = "file";

/// Filename attached to the image part.
pub const SCAN_FILE_NAME: &str = "scan.jpg";

const JPEG_MIME: &str = "image/jpeg";

/// Client for the verification endpoint.
///
/// Sends `POST {endpoint_url}` with a single multipart part named `file` and
/// classifies the response.
#[derive(Clone)]
pub struct HttpVerifier {
    /// HTTP client (reusable connection pool).
    http_client: reqwest::Client,
    endpoint_url: reqwest::Url,
}

impl HttpVerifier {
    /// Create a verifier with default timeout settings.
    pub fn new(endpoint_url: &str) -> Result<Self, VerificationError> {
        Self::with_timeouts(endpoint_url, DEFAULT_TIMEOUT, DEFAULT_CONNECT_TIMEOUT)
    }

    /// Create a verifier with custom timeouts.
    ///
    /// A request that exceeds `timeout` resolves to a transport failure.
    pub fn with_timeouts(
        endpoint_url: &str,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, VerificationError> {
        let endpoint_url =
            reqwest::Url::parse(endpoint_url).map_err(|e| VerificationError::InvalidEndpoint {
                url: endpoint_url.to_string(),
                reason: e.to_string(),
            })?;
        if !matches!(endpoint_url.scheme(), "http" | "https") {
            return Err(VerificationError::InvalidEndpoint {
                url: endpoint_url.to_string(),
                reason: format!("unsupported scheme `{}`", endpoint_url.scheme()),
            });
        }

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| VerificationError::Client(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint_url,
        })
    }

    pub fn endpoint_url(&self) -> &str {
        self.endpoint_url.as_str()
    }

    /// Submit one still image and classify the verdict.
    pub async fn submit(&self, image: StillImage) -> VerificationOutcome {
        do_submit(&self.http_client, &self.endpoint_url, image).await
    }
}

impl Verifier for HttpVerifier {
    fn name(&self) -> &str {
        "http"
    }

    fn verify(&self, image: StillImage) -> impl Future<Output = VerificationOutcome> + Send {
        self.submit(image)
    }
}

/// Perform a single verification request.
async fn do_submit(
    client: &reqwest::Client,
    url: &reqwest::Url,
    image: StillImage,
) -> VerificationOutcome {
    let size = image.len();
    let part = match Part::bytes(image.into_bytes())
        .file_name(SCAN_FILE_NAME)
        .mime_str(JPEG_MIME)
    {
        Ok(part) => part,
        Err(e) => return VerificationOutcome::transport(format!("building request: {e}")),
    };
    let form = Form::new().part(FILE_FIELD, part);

    tracing::trace!(%url, bytes = size, "submitting still image");

    let response = match client.post(url.clone()).multipart(form).send().await {
        Ok(response) => response,
        Err(e) => return VerificationOutcome::transport(describe_transport_error(&e)),
    };

    let status = response.status().as_u16();
    if !reads_body(status) {
        return classify_response(status, &[]);
    }

    match response.bytes().await {
        Ok(body) => classify_response(status, &body),
        Err(e) => VerificationOutcome::transport(format!(
            "reading {status} response body: {}",
            describe_transport_error(&e)
        )),
    }
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("request timed out: {e}")
    } else if e.is_connect() {
        format!("connection failed: {e}")
    } else {
        e.to_string()
    }
}
