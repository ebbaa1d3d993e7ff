//! Shared test utilities

pub mod mock_host;
pub mod mock_repo;
