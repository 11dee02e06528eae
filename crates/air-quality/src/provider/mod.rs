//! Air-quality source abstractions and implementations.
//!
//! This module contains:
//! - The `SourceAdapter` trait that every live provider implements
//! - Concrete live providers (WAQI station network, OpenAQ sensor directory)
//! - The deterministic simulated source used as the terminal fallback
//!
//! # Architecture
//!
//! Adapters know nothing about caching, ordering or enrichment. They turn a
//! coordinate into a [`NormalizedReading`](crate::models::NormalizedReading)
//! or an error; the pipeline decides what happens next.

mod traits;

pub mod openaq;
pub mod simulated;
pub mod waqi;

pub use traits::SourceAdapter;
