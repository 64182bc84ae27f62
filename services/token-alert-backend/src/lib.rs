pub mod application;
pub mod coordinator;
pub mod domain;
pub mod services;
pub mod telemetry;
