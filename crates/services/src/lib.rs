#![forbid(unsafe_code)]

pub mod error;
pub mod list_service;
pub mod progress_service;
pub mod selection;
pub mod sessions;
pub mod snapshot;

pub use milim_core::Clock;

pub use error::{ListServiceError, ProgressServiceError, SessionError, SnapshotError};
pub use list_service::ListService;
pub use progress_service::ProgressService;
pub use sessions::{SessionAdvance, SessionLoopService, SessionProgress, SessionService};
pub use snapshot::{DatabaseSnapshot, SnapshotService};
