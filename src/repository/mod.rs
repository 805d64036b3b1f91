//! Per-entity SQL access.
//!
//! Every function borrows a `SqliteConnection` instead of owning a pool, so
//! a service can run several of them inside one transaction (`&mut *tx`) or
//! against a plain pooled connection for reads.
//!
//! - [`drawing`]: drawings and their cascaded children
//! - [`runtime`]: machine runtimes, looked up by drawing
//! - [`search_data`]: extracted search features, 1:1 with a drawing
//! - [`feedback`]: user feedback, looked up by history or drawing
//! - [`history`]: past queries and their cascaded feedbacks

pub mod drawing;
pub mod feedback;
pub mod history;
pub mod runtime;
pub mod search_data;
