// Library root: re-exports all modules so integration tests and the binary
// can reach the session host's public API.

pub mod app;
pub mod config;
pub mod corpus_loader;
pub mod db;
pub mod protocol;
pub mod session;
