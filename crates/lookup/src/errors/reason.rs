use std::fmt;

/// Closed classification of why an identifier ended without a price.
///
/// # Routing Summary
///
/// | Reason | Retried? | Typical diagnostic |
/// |--------|----------|--------------------|
/// | `Transport` | No | client error text |
/// | `ThrottledThenFailed` | Once | `429 Too Many Requests` |
/// | `ProviderError` | No | provider status and message |
/// | `NoApprovedOffer` | No | offer summary |
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum FailureReason {
    /// Request could not be sent or timed out.
    Transport,

    /// Provider still returned a rate-limit status after the single retry.
    ThrottledThenFailed,

    /// Non-success status, malformed body, or empty item list.
    ProviderError,

    /// Successful response without a usable allow-listed price.
    NoApprovedOffer,
}

impl FailureReason {
    /// Stable label used in failure records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transport => "TRANSPORT",
            Self::ThrottledThenFailed => "THROTTLED",
            Self::ProviderError => "PROVIDER_ERROR",
            Self::NoApprovedOffer => "NO_APPROVED_OFFER",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
