//! Chat, retrieval, and storage backends for rubrix.
//!
//! Everything here implements a trait from `rubrix-core`; the engine never
//! sees a concrete backend type.

pub mod config;
pub mod error;
pub mod mock;
pub mod openai;
pub mod retrieval;
pub mod store;
