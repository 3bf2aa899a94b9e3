//! Chirpy Core Business Logic
//!
//! This crate holds the rules that do not depend on HTTP or storage:
//! chirp body validation and masking, the page hit counter, and the
//! deployment platform switch.

pub mod chirp;
pub mod error;
pub mod hits;
pub mod platform;

pub use chirp::{MAX_CHIRP_LENGTH, PROFANE_WORDS, ProfanityFilter, validate_chirp};
pub use error::CoreError;
pub use hits::HitCounter;
pub use platform::{ParsePlatformError, Platform};
