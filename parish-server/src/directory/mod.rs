//! Directory module
//!
//! - [`DirectoryStore`] - validated CRUD and search over the member collection
//! - [`Persistence`] - whole-collection storage backends
//! - [`filter_members`] - name/phone search with a caller-chosen threshold

pub mod error;
pub mod persistence;
pub mod search;
pub mod store;
pub mod validation;

pub use error::{DirectoryError, DirectoryResult, PersistenceError};
pub use persistence::{JsonFilePersistence, MemoryPersistence, Persistence};
pub use search::{filter_members, sort_for_display};
pub use store::{DeletedMember, DirectoryStore};
