use thiserror::Error;

/// Errors surfaced by the capture lifecycle.
#[derive(Debug, Error)]
pub enum AttachError {
    /// [`SpyLogger::attach`](crate::SpyLogger::attach) was called while
    /// another capture window was already open in this process.
    #[error("a capture window is already attached in this process")]
    AlreadyAttached,
}
