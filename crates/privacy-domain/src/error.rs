use thiserror::Error;

use crate::envelope::CodecError;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("codec error: {0}")]
    CodecError(#[from] CodecError),

    #[error("fence store error: {0}")]
    StoreError(#[source] anyhow::Error),

    #[error("publish error: {0}")]
    PublishError(#[source] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;
