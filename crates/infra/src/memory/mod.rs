//! In-memory coordination service
//!
//! The ensemble keeps its node tree behind a single lock and hands out
//! connection handles bound to the current session. Faults can be queued for
//! acquisitions and for operations, and the session can be dropped or
//! expired, so the retry loop can be driven through reconnects without a
//! network.

mod ensemble;

pub use ensemble::MemoryEnsemble;
