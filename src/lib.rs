// Solar installation telemetry: topic catalog, ranged queries and downsampling
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
