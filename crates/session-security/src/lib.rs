//! # Session Security
//! 
//! Security utilities: identifier generation and timed token signing.

pub mod token;
pub mod signer;

pub use signer::{SignerError, TimedSigner, TokenRejection};
pub use token::generate_token;
