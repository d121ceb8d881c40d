//! Domain error types.

use thiserror::Error;

/// Errors that can occur when constructing domain values.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A user was constructed with an empty name.
    #[error("User name must not be empty")]
    EmptyUserName,

    /// An order was constructed with an empty item description.
    #[error("Order item must not be empty")]
    EmptyItem,
}
