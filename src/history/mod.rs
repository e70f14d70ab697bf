//! Daily observation history used by the feature deriver.

pub mod buffer;
pub mod observation;

pub use buffer::HistoryBuffer;
pub use observation::{Column, Observation};
