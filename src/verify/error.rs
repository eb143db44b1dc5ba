use thiserror::Error;

use crate::mx::Error as MxError;
use crate::reputation::ConfigError;

/// Faults that prevent verification from running at all. Deliverability
/// outcomes are never reported through this type.
#[derive(Debug, Error)]
pub enum VerifierError {
    #[error(transparent)]
    Resolver(#[from] MxError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
