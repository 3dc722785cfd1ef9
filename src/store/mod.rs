//! Durable timer storage module
//! 
//! The Timer Store and the key-value backends it persists through.

pub mod storage;
pub mod timer_store;

// Re-export main types
pub use storage::{FileStorage, KeyValueStore, MemoryStorage};
pub use timer_store::{decode_timers, encode_timers, TimerStore, MAX_DURATION_SECONDS, STORAGE_KEY};
