pub mod api;
pub mod config;
pub mod contract;
pub mod domain;
pub mod infra;
