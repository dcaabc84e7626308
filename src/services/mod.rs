pub mod blob_store;
pub mod codec;
pub mod queue;
pub mod registry;
