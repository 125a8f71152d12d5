//! HTTP Route Handlers

pub mod ingest;
