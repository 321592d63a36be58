pub mod codec;
pub mod snapshot;
pub mod vector_store;
