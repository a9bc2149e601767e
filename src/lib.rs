pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod output;
pub mod remote;
pub mod store;
