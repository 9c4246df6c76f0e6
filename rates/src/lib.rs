//! Salarium Rate Resolver
//!
//! Multi-tier exchange-rate resolution: in-memory cache, shared snapshot,
//! live source, and a bundled static fallback table. Produces a usable
//! conversion rate under partial or total network failure, tracking
//! provenance and staleness.
//!
//! # Example
//!
//! ```rust,ignore
//! use salarium_rates::{RateResolver, RateSource};
//! use salarium_common::Currency;
//!
//! let resolver = RateResolver::new(source, store);
//!
//! let resolved = resolver.resolve(&Currency::eur(), &Currency::usd()).await?;
//! println!("{} via {}", resolved.rate.rate, resolved.rate.provenance);
//! ```

pub mod cache;
pub mod convert;
pub mod error;
pub mod fallback;
pub mod resolver;
pub mod snapshot;
pub mod source;

pub use cache::RateCacheStore;
pub use convert::{ConversionItem, ConversionOutcome};
pub use error::{RateError, RateResult};
pub use resolver::{DegradationStatus, RateResolver, RateResolverConfig, Resolved};
pub use snapshot::SharedSnapshot;
pub use source::RateSource;

#[cfg(any(test, feature = "test-utils"))]
pub use source::MockRateSource;
