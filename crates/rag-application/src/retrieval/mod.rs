//! Hybrid Retriever (C9) and MaxSim Retriever (C10).

pub mod hybrid;
pub mod maxsim;

pub use hybrid::{hybrid_search, HybridSearchParams, ScoredChunk};
pub use maxsim::{hybrid_maxsim_search, maxsim_score, maxsim_search, RankedResult, ScoredPage};
