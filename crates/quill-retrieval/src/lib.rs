pub mod backend;
pub mod error;
pub mod gateway;
pub mod intent;
pub mod normalize;

pub use backend::{ElasticsearchBackend, ElasticsearchConfig, InMemoryBackend, SearchBackend};
pub use error::RetrievalError;
pub use gateway::{Retrieval, RetrievalGateway, RetrievalSource};
pub use intent::{classify, SearchIntent, RECENCY_MARKERS};
