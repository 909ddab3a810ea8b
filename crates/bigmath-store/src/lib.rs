//! # bigmath-store
//!
//! Persistence of precomputed constants: the binary and text byte layouts
//! in [`codec`], and the [`ConstantStore`] collaborator with a file-backed
//! and an in-memory implementation.

pub mod codec;
pub mod error;
pub mod store;

// Re-exports
pub use codec::{decode, encode, read_header, read_value, write_value, Encoding, Header};
pub use error::StoreError;
pub use store::{ConstantStore, FileStore, MemoryStore, LN2_FILE, PI_FILE};
