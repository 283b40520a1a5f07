//! The seam between the core and the host editor owning the documents.

use std::fmt::Debug;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("host call failed: {0}")]
    Call(String),
}

/// Handle to the host editor.
///
/// The core never touches the file store directly: reading a document and
/// renaming it are requests to the host, which must preserve document
/// identity across a rename. `notify` is a fire-and-forget user-visible
/// notice, `is_excluded` is the host's own exclusion rule source (e.g.
/// folder-scoped exclusions) that the core consults but does not own.
#[async_trait::async_trait]
pub trait Host: Debug + Send + Sync + 'static {
    /// Full text of the document at `path`.
    async fn document_text(&self, path: &Path) -> Result<String, HostError>;

    /// Renames the document, keeping its identity.
    async fn rename_document(&self, old_path: &Path, new_path: &Path) -> Result<(), HostError>;

    /// Path of the document currently focused in the host UI, if any.
    async fn active_document(&self) -> Result<Option<PathBuf>, HostError>;

    /// Shows a transient, non-blocking notice to the user.
    fn notify(&self, message: &str);

    /// Host-side exclusion predicate.
    fn is_excluded(&self, path: &Path) -> bool;
}
