//! Captioning pipeline components.
//!
//! - **discovery**: Find eligible images in the input directory
//! - **throttle**: Minimum spacing between requests
//! - **captioner**: The sequential read → request → write → throttle loop

pub mod captioner;
pub mod discovery;
pub mod throttle;

// Re-exports for convenient access
pub use captioner::{BatchCaptioner, CaptionOptions};
pub use discovery::{caption_path, shared_stems, DiscoveredFile, FileDiscovery};
pub use throttle::Throttle;
