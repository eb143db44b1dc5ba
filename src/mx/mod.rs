//! DNS MX resolution.
//!
//! The public entry point is [`check_mx`], which performs a lookup using the
//! system resolver and returns a [`MxStatus`] describing the outcome. The
//! verifier goes through [`resolve_with`] so the resolver can be swapped.

mod error;
mod resolver;
mod types;

pub use error::MxError as Error;
pub use resolver::{LookupMx, check_mx, resolve_with};
pub use types::{MxRecord, MxStatus};

pub(crate) use resolver::system_resolver;
