//! Provider adapter trait definition.

use reqwest::{RequestBuilder, StatusCode};

use crate::errors::LookupError;
use crate::extractor::ExtractionPolicy;
use crate::models::{LookupRequest, ProviderResponse};

/// Adapter between the pipeline and one pricing API.
///
/// Implementations are stateless after construction and shared read-only
/// across all workers.
///
/// # Example
///
/// ```ignore
/// struct MyProvider {
///     base_url: Url,
///     extraction: ExtractionPolicy,
/// }
///
/// impl PriceProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     fn build_request(&self, identifier: &str) -> LookupRequest {
///         let mut url = self.base_url.clone();
///         url.query_pairs_mut().append_pair("upc", identifier);
///         LookupRequest::new(identifier, url)
///     }
///
///     // ... parse_response, extraction
/// }
/// ```
pub trait PriceProvider: Send + Sync {
    /// Unique identifier for this provider, used in logs and errors.
    fn id(&self) -> &'static str;

    /// Builds the request for a single identifier.
    fn build_request(&self, identifier: &str) -> LookupRequest;

    /// Adds provider credentials to an outgoing request.
    ///
    /// Default implementation leaves the request untouched (credentials in
    /// the URL, or none at all).
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
    }

    /// Whether a response status means "too many requests".
    fn is_throttled(&self, status: StatusCode) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS
    }

    /// Normalizes a raw response.
    ///
    /// Non-success statuses should come back as `Ok` with `success = false`
    /// so their status text reaches the failure record. `Err` is reserved for
    /// bodies that cannot be understood at all.
    fn parse_response(
        &self,
        status: StatusCode,
        body: &str,
    ) -> Result<ProviderResponse, LookupError>;

    /// Allow-list and fallback used for this provider's responses.
    fn extraction(&self) -> &ExtractionPolicy;
}
