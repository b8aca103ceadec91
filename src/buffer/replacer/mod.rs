//! Eviction policy implementations (replacers).
//!
//! - [`FifoReplacer`] - evicts the frame that was loaded longest ago

mod fifo;

pub use fifo::FifoReplacer;
