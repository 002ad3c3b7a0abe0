pub mod app_state;
pub mod audit;
pub mod config;
pub mod content;
pub mod entities;
pub mod extractor;
pub mod http;
pub mod notify;
pub mod probe;
pub mod remediation;
pub mod repositories;
pub mod scheduler;
