// Aggregates all former standalone integration tests as modules.
mod bootstrap;
mod mock_backend;
mod mutations;
mod sync;
