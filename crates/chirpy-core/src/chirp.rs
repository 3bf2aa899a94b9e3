//! Chirp body rules

use tracing::debug;

use crate::error::CoreError;

/// Maximum chirp length, in characters
pub const MAX_CHIRP_LENGTH: usize = 140;

/// Words masked out of every chirp
pub const PROFANE_WORDS: &[&str] = &["kerfuffle", "sharbert", "fornax"];

const MASK: &str = "****";

/// Replaces whole words from a fixed list with `****`
///
/// Words are separated by single spaces only, so `Sharbert!` is a different
/// word from `sharbert` and survives. Matching ignores case.
#[derive(Debug, Clone)]
pub struct ProfanityFilter {
    words: Vec<String>,
}

impl Default for ProfanityFilter {
    fn default() -> Self {
        Self::new(PROFANE_WORDS.iter().copied())
    }
}

impl ProfanityFilter {
    pub fn new<'a>(words: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            words: words.into_iter().map(str::to_lowercase).collect(),
        }
    }

    fn is_profane(&self, word: &str) -> bool {
        let lower = word.to_lowercase();
        self.words.iter().any(|w| *w == lower)
    }

    /// Mask every listed word in `body`
    pub fn clean(&self, body: &str) -> String {
        body.split(' ')
            .map(|word| if self.is_profane(word) { MASK } else { word })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Check the length limit and return the masked body
pub fn validate_chirp(body: &str, filter: &ProfanityFilter) -> Result<String, CoreError> {
    let length = body.chars().count();
    if length > MAX_CHIRP_LENGTH {
        debug!("Rejected chirp of {} characters", length);
        return Err(CoreError::ChirpTooLong {
            length,
            max: MAX_CHIRP_LENGTH,
        });
    }
    Ok(filter.clean(body))
}
