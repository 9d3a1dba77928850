//! Storefront slug validation and generation.
//!
//! A slug is the URL path segment identifying a storefront. Valid slugs are
//! 3–50 characters of lowercase ASCII letters, digits, and hyphens, with
//! hyphens only appearing singly between alphanumeric groups.
//!
//! Format checking is pure and does no I/O; availability against live
//! storefronts is layered on top by the backend's slug service.

use core::fmt;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Minimum slug length after trimming.
pub const MIN_LENGTH: usize = 3;
/// Maximum slug length after trimming.
pub const MAX_LENGTH: usize = 50;

/// Errors that can occur when parsing a [`Slug`].
///
/// Variants are ordered by check precedence: an input failing several checks
/// reports the first one.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlugFormatError {
    /// The input is missing or blank.
    #[error("slug cannot be empty")]
    Empty,
    /// The trimmed input is shorter than [`MIN_LENGTH`].
    #[error("slug must be at least {MIN_LENGTH} characters")]
    TooShort,
    /// The trimmed input is longer than [`MAX_LENGTH`].
    #[error("slug must be at most {MAX_LENGTH} characters")]
    TooLong,
    /// The input contains characters or hyphen placement outside the slug
    /// pattern.
    #[error("slug may only contain lowercase letters, digits, and single hyphens")]
    Format,
}

impl SlugFormatError {
    /// Stable machine-readable reason code for API responses.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::TooShort => "too_short",
            Self::TooLong => "too_long",
            Self::Format => "format",
        }
    }
}

/// A normalized, format-validated storefront slug.
///
/// Normalization trims surrounding whitespace; the pattern itself requires
/// lowercase, so uppercase input is a format error rather than something to
/// silently fold. Use [`generate_slug`] to derive a slug from free text. A
/// `Slug` therefore always round-trips to the exact string stored on the
/// storefront record.
///
/// ## Examples
///
/// ```
/// use tiendita_core::{Slug, SlugFormatError};
///
/// let slug = Slug::parse("  my-store  ").expect("valid after trimming");
/// assert_eq!(slug.as_str(), "my-store");
///
/// assert_eq!(Slug::parse("ab").unwrap_err(), SlugFormatError::TooShort);
/// assert_eq!(Slug::parse("My-Store").unwrap_err(), SlugFormatError::Format);
/// assert_eq!(Slug::parse("my--store").unwrap_err(), SlugFormatError::Format);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Parse a `Slug` from raw user input.
    ///
    /// # Errors
    ///
    /// Returns a [`SlugFormatError`] naming the first failed check, in the
    /// precedence order empty → `too_short` → `too_long` → format.
    pub fn parse(raw: &str) -> Result<Self, SlugFormatError> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(SlugFormatError::Empty);
        }

        let len = trimmed.chars().count();
        if len < MIN_LENGTH {
            return Err(SlugFormatError::TooShort);
        }
        if len > MAX_LENGTH {
            return Err(SlugFormatError::TooLong);
        }

        if !matches_pattern(trimmed) {
            return Err(SlugFormatError::Format);
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Get the normalized slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the slug and return the underlying string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lowercase alphanumeric groups joined by single hyphens: no leading,
/// trailing, or consecutive hyphens.
fn matches_pattern(value: &str) -> bool {
    if value.starts_with('-') || value.ends_with('-') {
        return false;
    }

    let mut prev_hyphen = false;
    for ch in value.chars() {
        if ch == '-' {
            if prev_hyphen {
                return false;
            }
            prev_hyphen = true;
        } else if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            prev_hyphen = false;
        } else {
            return false;
        }
    }
    true
}

/// Generate a slug candidate from arbitrary text.
///
/// Lowercases and trims the input, strips diacritics via Unicode
/// decomposition, drops everything outside lowercase alphanumerics,
/// whitespace, and hyphens, then collapses whitespace runs and hyphen runs
/// into single hyphens.
///
/// The result is not guaranteed to satisfy [`Slug::parse`] length bounds —
/// short or symbol-only input can produce a short or empty string.
#[must_use]
pub fn generate_slug(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let decomposed: String = lowered.nfd().filter(|c| !is_combining_mark(*c)).collect();

    let mut out = String::with_capacity(decomposed.len());
    let mut pending_hyphen = false;
    for ch in decomposed.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            out.push(ch);
            pending_hyphen = false;
        } else if ch.is_whitespace() || ch == '-' {
            pending_hyphen = true;
        }
        // Everything else is dropped without acting as a separator boundary.
    }
    out
}

/// Deterministic numbered suggestions derived from `base`.
///
/// Returns `generate_slug(base)` suffixed with `-1` through `-n`. The
/// suggestions are NOT checked against live availability, so a suggestion
/// may itself be taken; callers are expected to re-validate the one the
/// user picks.
#[must_use]
pub fn suggest_slugs(base: &str, n: usize) -> Vec<String> {
    let stem = generate_slug(base);
    (1..=n).map(|i| format!("{stem}-{i}")).collect()
}
