pub mod config;
pub mod http;
pub mod memcache;
pub mod service;
pub mod telemetry;
