//! Error types for the avatar pipeline
//!
//! None of these reach callers: the pipeline degrades every failure to an
//! absent avatar and logs the cause.

use thiserror::Error;

/// Avatar decoding error type
#[derive(Error, Debug)]
pub enum AvatarError {
    #[error("Photo payload is empty")]
    EmptyPayload,

    #[error("Invalid base64 photo: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Image decode error: {0}")]
    Decode(#[from] image::ImageError),
}

/// vCard retrieval error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VCardError {
    #[error("Stream is not connected")]
    NotConnected,

    #[error("vCard request failed: {0}")]
    Request(String),
}

/// Result type for avatar decoding
pub type AvatarResult<T> = Result<T, AvatarError>;

/// Result type for vCard retrieval
pub type VCardResult<T> = Result<T, VCardError>;
