pub mod collaborative;
pub mod profile;
pub mod recommendation;
pub mod vector_store;
