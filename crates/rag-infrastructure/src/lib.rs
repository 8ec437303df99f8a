//! Configuration, logging bootstrap, the DI composition root, the BM25
//! indexing engine, and the lane worker loops — the ambient stack that
//! turns the domain/application/providers crates into a runnable service.

pub mod config;
pub mod di;
pub mod indexing;
pub mod logging;
pub mod metrics;
pub mod worker;

pub use di::{bootstrap, AppContext};
