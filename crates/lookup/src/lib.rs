//! Shelfprice Lookup Crate
//!
//! Resolves retail prices for batches of product identifiers (UPCs) by
//! querying a pricing API concurrently, and emits exactly one record per
//! identifier: an idempotent price statement or a diagnostic failure line.
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |   Identifiers    |  (ordered, duplicates allowed)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! | LaunchScheduler  |  (staggered start / fixed interval)
//! +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! |  LookupWorker    | --> |  PriceProvider   |  (Barcode Lookup, UPCitemdb)
//! |  (bounded pool)  |     +------------------+
//! +------------------+
//!          |
//!          v
//! +------------------+
//! | ExtractionPolicy |  (allow-list, fallback)
//! +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! |  ResultRouter    | --> |  RecordSink x 2  |  (prices, failures)
//! +------------------+     +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`PricePipeline`] - Configured pipeline; `run` returns a [`PipelineReport`]
//! - [`LookupOutcome`] - Terminal result for one identifier
//! - [`FailureReason`] - Closed failure taxonomy
//! - [`PriceProvider`] - Adapter contract for pricing APIs

pub mod errors;
pub mod extractor;
pub mod models;
pub mod pipeline;
pub mod provider;
pub mod router;
pub mod scheduler;
pub mod sink;
pub mod source;
pub mod worker;

pub use errors::{FailureReason, LookupError, PipelineError};
pub use extractor::{AllowList, ExtractionPolicy, FallbackPolicy};
pub use models::{
    Identifier, LookupOutcome, LookupRequest, NormalizedItem, NormalizedOffer, PipelineReport,
    ProviderResponse,
};
pub use pipeline::{PipelineConfig, PricePipeline};
pub use provider::barcode_lookup::BarcodeLookupProvider;
pub use provider::upcitemdb::UpcItemDbProvider;
pub use provider::{PriceProvider, ProviderConfig, ProviderKind};
pub use router::{PriceStatement, ResultRouter, StatementStyle};
pub use scheduler::{LaunchPolicy, LaunchScheduler};
pub use sink::{FileSink, MemorySink, RecordSink};
pub use source::{parse_identifiers, read_identifiers};
pub use worker::{LookupWorker, RetryPolicy};
