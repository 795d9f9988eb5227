use thiserror::Error;

use crate::model::{BlueprintError, ChoiceError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Blueprint(#[from] BlueprintError),
    #[error(transparent)]
    Choice(#[from] ChoiceError),
}
