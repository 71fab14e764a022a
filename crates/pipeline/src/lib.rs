//! Registry verification pipeline.
//!
//! Runs one background job per accepted submission: each distinct siret is
//! looked up once, at a fixed pace, and anything but a definite "active"
//! answer is recorded as a failure. Progress and the final failure list are
//! written to a [`JobStore`](massval_core::verification::JobStore).

pub mod orchestrator;
pub mod pacer;
pub mod retention;
pub mod store;

pub use orchestrator::{VerificationConfig, Verifier};
pub use store::InMemoryJobStore;
