//! chromadesk-core: the daily update pipeline and the capabilities it needs.

pub mod error;
pub mod model;
pub mod pipeline;
pub mod ports;
pub mod state;
pub mod store;

pub use error::{ApplyError, DownloadError, FetchError, PipelineError, StateError, StoreError};
pub use model::FeaturedImageInfo;
pub use pipeline::{RunOutcome, UpdatePipeline, UpdateReport};
pub use state::UpdateState;
pub use store::{ImageStore, StoredImage};
