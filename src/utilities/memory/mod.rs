//! Pooled memory for per-call scratch and caller-owned results.

pub mod buffer;
pub mod buffer_pool;

pub use buffer::Buffer;
pub use buffer_pool::BufferPool;
