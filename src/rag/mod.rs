//! Retrieval side of the pipeline.
//!
//! - `splitter`: separator-based chunking of the reference corpus
//! - `sqlite`: on-disk persistence of chunks and embeddings
//! - `index`: load-or-build corpus index with in-memory similarity search
//! - `retrieval`: rendering retrieved chunks into a prompt reference block

pub mod index;
pub mod retrieval;
pub mod similarity;
pub mod splitter;
pub mod sqlite;
pub mod store;

pub use index::{CorpusIndex, IndexBuildError, IndexLoadError, IndexParams};
pub use retrieval::format_reference_block;
pub use splitter::{SplitterConfig, TextChunk, TextSplitter};
pub use store::{IndexMeta, IndexedChunk, ScoredChunk};
