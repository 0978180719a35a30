//! Core building blocks for gnuplot script emission
//!
//! Value types, the identifier allocator, data buffers and the serializers that
//! turn them into gnuplot statements. The [`session`](crate::session) module ties
//! them to a sink.

mod buffer;
mod error;
mod ids;
pub mod logging;
mod serializer;
mod sink;
mod statement;
mod types;

pub use buffer::*;
pub use error::*;
pub use ids::*;
pub use logging::*;
pub use serializer::*;
pub use sink::*;
pub use statement::*;
pub use types::*;
