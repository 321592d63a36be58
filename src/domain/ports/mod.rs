pub mod chat_port;
pub mod embedding_port;
pub mod vector_store;
