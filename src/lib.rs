//! Incremental search-result controllers for the music and resource search pages.
//!
//! [`controller::SearchController`] drives a paginated [`source::PageSource`]
//! with keyword/filter queries, infinite "load more" and random-access page
//! jumps. Overlapping requests are resolved by [`guard::SequenceGuard`]: only
//! the most recently issued request ever touches state.

pub mod api;
pub mod config;
pub mod constants;
pub mod controller;
pub mod filters;
pub mod guard;
pub mod history;
pub mod logging;
pub mod mock;
pub mod music;
pub mod pagination;
pub mod query;
pub mod resource;
pub mod sidecar;
pub mod source;

#[cfg(test)]
pub mod test_utils;

pub use controller::{ControllerState, Outcome, SearchController};
pub use query::{QueryDescriptor, ResultPage, Sort};
pub use source::PageSource;
