//! Seams between the engine and its collaborators.

pub mod cancellation;
pub mod fact_store;
pub mod result_sink;

pub use cancellation::{Cancellable, CancellationToken};
pub use fact_store::FactStore;
pub use result_sink::{PublishStats, ResultSink};
