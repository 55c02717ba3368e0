use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// Gapless playback needs every in-scope track decoded to one format
    #[error("{0}")]
    GaplessNotPossible(String),
}

pub type QueueResult<T> = Result<T, QueueError>;
