//! Chain query interface shared by the tally engine and its transports.
//!
//! The engine only ever sees [`ChainReader`]; the HTTP client and the
//! in-memory [`MemoryChain`] are the two implementations.

pub mod api;
pub mod memory;
pub mod model;

pub use api::ChainReader;
pub use memory::MemoryChain;
pub use model::*;
