pub mod client;
pub mod errors;

pub use client::{LinkClass, Prober, classify};
pub use errors::ProbeError;
