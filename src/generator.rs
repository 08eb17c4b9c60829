//! Password generation from user-tunable character classes

use rand::rngs::OsRng;
use rand::{CryptoRng, Rng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DIGITS: &str = "0123456789";
pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
pub const SPECIAL: &str = "!@#$%^&*()_-+=<>?/{}[]";

pub const MIN_LENGTH: usize = 6;
pub const MAX_LENGTH: usize = 64;
pub const DEFAULT_LENGTH: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeneratorError {
    #[error("No character classes enabled")]
    EmptyAlphabet,
    #[error("Password length {0} outside {MIN_LENGTH}..={MAX_LENGTH}")]
    LengthOutOfRange(usize),
}

/// Per-user generation policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationSettings {
    pub length: usize,
    pub use_digits: bool,
    pub use_upper: bool,
    pub use_lower: bool,
    pub use_special: bool,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            length: DEFAULT_LENGTH,
            use_digits: true,
            use_upper: true,
            use_lower: true,
            use_special: true,
        }
    }
}

impl GenerationSettings {
    pub fn has_any_class(&self) -> bool {
        self.use_digits || self.use_upper || self.use_lower || self.use_special
    }

    /// Enabled classes concatenated in the fixed order digits, upper, lower, special
    pub fn alphabet(&self) -> Vec<char> {
        [
            (self.use_digits, DIGITS),
            (self.use_upper, UPPERCASE),
            (self.use_lower, LOWERCASE),
            (self.use_special, SPECIAL),
        ]
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .flat_map(|(_, class)| class.chars())
        .collect()
    }
}

pub fn is_valid_length(length: usize) -> bool {
    (MIN_LENGTH..=MAX_LENGTH).contains(&length)
}

/// Generate a password with the operating system CSPRNG
pub fn generate(settings: &GenerationSettings) -> Result<String, GeneratorError> {
    generate_with(&mut OsRng, settings)
}

/// Each character is drawn independently and uniformly from the alphabet.
pub fn generate_with<R: Rng + CryptoRng + ?Sized>(
    rng: &mut R,
    settings: &GenerationSettings,
) -> Result<String, GeneratorError> {
    if !is_valid_length(settings.length) {
        return Err(GeneratorError::LengthOutOfRange(settings.length));
    }
    let alphabet = settings.alphabet();
    if alphabet.is_empty() {
        return Err(GeneratorError::EmptyAlphabet);
    }

    Ok((0..settings.length)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
        .collect())
}
