//! Vector store implementations

mod in_memory;
mod pinecone;

pub use in_memory::InMemoryVectorStore;
pub use pinecone::{PineconeVectorStore, PINECONE_CONTROL_PLANE_URL, UPSERT_BATCH_SIZE};
