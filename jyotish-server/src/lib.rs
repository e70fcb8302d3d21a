//! HTTP service and ingestion tooling around the retrieval pipeline.

pub mod config;
pub mod interpret;
pub mod routes;
pub mod state;
