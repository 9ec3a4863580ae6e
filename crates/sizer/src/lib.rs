//! HTTP front end for the workload sizing engine

pub mod api;
pub mod config;
