pub mod client;
pub mod models;
pub mod response;
pub mod streaming;

pub use client::ApiClient;
pub use models::{ChatCompletion, ModelCard, ModelList, RequestBody};
pub use streaming::{DeltaAccumulator, SseEvent, SseLineBuffer};
