//! Bacheca: aggregate hiking-club announcements into dated event records.
//!
//! The fetch layer hands over raw items, one feed per site. Bacheca infers
//! event dates from their Italian text, stamps each with a stable
//! discovery time from a persistent registry, and produces the record
//! views that page rendering and notifications work from.

pub mod aggregate;
pub mod config;
pub mod infer;
pub mod ingest;
pub mod model;
pub mod registry;
