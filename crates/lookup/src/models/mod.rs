//! Core data types for the lookup pipeline.
//!
//! - [`Identifier`] - Opaque product key (UPC)
//! - [`LookupRequest`] - A provider request built for one identifier
//! - [`ProviderResponse`], [`NormalizedItem`], [`NormalizedOffer`] - Provider
//!   responses reduced to the shape the extractor understands
//! - [`LookupOutcome`] - The single terminal result of one task
//! - [`PipelineReport`] - Counters for a finished run

mod offer;
mod outcome;
mod types;

pub use offer::{NormalizedItem, NormalizedOffer, ProviderResponse, RawPrice};
pub use outcome::{LookupOutcome, PipelineReport};
pub use types::{Identifier, LookupRequest};
