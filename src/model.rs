//! Core data model for Bacheca.
//!
//! Raw items as handed over by the fetch layer, and the normalized event
//! records produced for rendering and notification.

mod event;
mod item;

pub use event::EventRecord;
pub use item::{RawItem, SourceFeed};
