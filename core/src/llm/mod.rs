//! Generate endpoint client abstractions and implementations

pub mod client;
pub mod providers;
pub mod request;
pub mod response;

pub use client::GenerationClient;
pub use providers::*;
pub use request::{GenerationRequest, RequestBuilder};
pub use response::GenerationResult;
