use thiserror::Error;

/// Errors raised at the boundary of the scoring core.
///
/// Missing optional record fields are never errors; they fall into the
/// lowest tier of the affected factor instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("invalid domain name {name:?}: {reason}")]
    InvalidDomainName { name: String, reason: &'static str },

    #[error("invalid price {raw:?}: {reason}")]
    InvalidPrice { raw: String, reason: &'static str },

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
