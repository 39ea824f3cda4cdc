//! Sample history kept on the consumer side.

mod bounded;
mod export;

pub use bounded::{BoundedHistory, HISTORY_CAPACITY};
pub use export::HistoryExport;
