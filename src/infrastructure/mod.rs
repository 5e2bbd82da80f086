// Infrastructure layer - External dependencies and adapters
pub mod api_client;
pub mod config;
pub mod json_codec;
pub mod sql_repository;
