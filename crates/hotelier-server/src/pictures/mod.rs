//! Hotel picture store: blob storage, per-hotel locking, upload/delete
//! sagas, and the service tying them to the ordering queries.

pub mod locks;
pub mod saga;
pub mod service;
pub mod storage;

pub use service::{AuditReport, NewPicture, PictureService, PICTURE_PREFIX};
pub use storage::{BlobStore, LocalDiskStore};
