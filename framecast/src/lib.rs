//! # framecast
//!
//! Client-facing shim around an asynchronously-processed video-generation
//! backend. Given an encrypted job request, the [`handler::Handler`]:
//!
//! 1. decrypts the input image reference and resolves it to image bytes,
//! 2. provisions every referenced LoRA weight file into the local cache,
//! 3. submits the job to the generation queue,
//! 4. polls the queue into a deduplicated stream of status/progress events,
//! 5. publishes the produced result as an encrypted reference, and
//! 6. cleans the output directory on every exit path.
//!
//! The generation engine, queue persistence and object storage are external
//! collaborators consumed through the narrow interfaces in `job-tracker`.

pub mod config;
pub mod error;
pub mod handler;
pub mod image;
pub mod publish;
pub mod request;
pub mod retry;

pub use config::Settings;
pub use error::HandlerError;
pub use handler::{Handler, HandlerConfig};
pub use publish::LocalPublisher;
pub use request::{GenerationConfig, JobRequest};
