use reqwest::Url;

/// Product identifier (UPC). Duplicates are independent tasks.
pub type Identifier = String;

/// A request for a single identifier.
///
/// Owned by the worker that runs it and dropped once the exchange completes.
#[derive(Clone, Debug)]
pub struct LookupRequest {
    pub identifier: Identifier,
    pub url: Url,
}

impl LookupRequest {
    pub fn new(identifier: impl Into<Identifier>, url: Url) -> Self {
        Self {
            identifier: identifier.into(),
            url,
        }
    }
}
