use thiserror::Error;

use crate::model::{ListError, WordError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Word(#[from] WordError),
    #[error(transparent)]
    List(#[from] ListError),
}
