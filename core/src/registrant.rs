//! Read-only access to the registrant directory.
//!
//! Registration itself lives outside the engine; heat generation only needs
//! the entries registered for one cell.

use crate::types::{Category, Gender, LevelId, Participant};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors reported by a registrant directory
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// The directory could not be reached
    #[error("registrant directory unavailable: {0}")]
    Unavailable(String),
}

/// Boxed future returned by directory lookups
pub type DirectoryFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, DirectoryError>> + Send + 'a>>;

/// Source of registered participants.
pub trait RegistrantDirectory: Send + Sync {
    /// Participants registered for a level and category, optionally narrowed
    /// to one gender (`None` for mixed cells). Order is the directory's
    /// registration order and is preserved by heat generation.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be queried.
    fn participants_by_cell(
        &self,
        level: LevelId,
        category: Category,
        gender: Option<Gender>,
    ) -> DirectoryFuture<'_, Vec<Participant>>;
}
