//! # thread-engine
//!
//! Streaming story-thread detection and management.
//!
//! The engine ingests short text items and decides, per item, whether it is a
//! new story or an update to an existing, still-relevant one. It maintains a
//! bounded active set of threads, scores their significance over time, and
//! supports merge/archive lifecycle operations plus a read-only query
//! surface for downstream consumers.
//!
//! Matching is purely lexical: keyword and capitalized-entity overlap scored
//! with Jaccard similarity under a sliding time window. No embeddings, no
//! topic models.
//!
//! ## Entry point
//!
//! Construct one [`ThreadStore`] per process and feed it posts:
//!
//! ```
//! use thread_engine::ThreadStore;
//! use thread_types::{IncomingPost, ThreadManagementConfig};
//!
//! let store = ThreadStore::new(ThreadManagementConfig::default()).unwrap();
//! let post = IncomingPost::new("p1", "NVDA earnings beat expectations", "", "wire");
//! let outcome = store.process_item(&post);
//! assert!(outcome.is_new_thread);
//! ```

pub mod extractor;
pub mod matcher;
pub mod persist;
pub mod significance;
pub mod similarity;
pub mod store;

pub use extractor::{extract_features, ExtractedFeatures};
pub use matcher::{detect_existing_thread, find_similar_threads, ThreadMatchResult};
pub use persist::{NoOpPersister, ThreadPersister};
pub use significance::{calculate_significance, recency_factor};
pub use similarity::jaccard_similarity;
pub use store::{ProcessOutcome, ThreadStore};
