use std::fmt::{self, Display};

/// Errors produced by model constructors and invariant-preserving mutations.
#[derive(Debug)]
pub enum ModelError {
    InvalidMediaType(String),
    InvalidRating(i32),
    DuplicateTag(String),
    DuplicateVote,
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::InvalidMediaType(value) => {
                write!(f, "invalid media type: {value:?} (expected \"movie\" or \"tv\")")
            }
            ModelError::InvalidRating(value) => {
                write!(f, "invalid rating: {value} (expected 1..=10)")
            }
            ModelError::DuplicateTag(tag) => write!(f, "tag already exists: {tag:?}"),
            ModelError::DuplicateVote => write!(f, "user already voted on this review"),
        }
    }
}

impl std::error::Error for ModelError {}

pub type Result<T> = std::result::Result<T, ModelError>;
