//! Sandboxed file storage.
//!
//! A [`Storage`] handle is rooted at one directory and refuses any path that resolves
//! outside it. Writes go through a temp file, `fsync` and `rename`, so readers never see
//! a half-written file. Temp files orphaned by a crash are removed when the handle is
//! opened.
//!
//! ```rust
//! use sprout_storage::{Storage, StorageError};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), StorageError> {
//!     # let tmp = tempfile::tempdir().unwrap();
//!     # let root = tmp.path().join("data");
//!     let storage = Storage::builder().root(&root).connect().await?;
//!
//!     assert!(storage.read_optional("emails.json").await?.is_none());
//!
//!     storage.write("emails.json", b"[]").await?;
//!     assert_eq!(storage.read("emails.json").await?, b"[]");
//!     Ok(())
//! }
//! ```

mod builder;
mod engine;
mod error;
mod maintenance;
mod security;

pub use builder::StorageBuilder;
pub use engine::Storage;
pub use error::{StorageError, StorageErrorExt};
