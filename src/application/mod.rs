// Application layer - Use cases over the repository and the API source
pub mod chart_loader;
pub mod sample_data;
pub mod series_service;
pub mod telemetry_repository;
pub mod topic_service;
