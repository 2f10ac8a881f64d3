//! Video URL validation performed before any request is sent.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Rejection reasons for user supplied URLs.
///
/// The `Display` text is shown inline under the URL field as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Nothing but whitespace was entered.
    #[error("Please enter a YouTube URL")]
    EmptyInput,
    /// Text does not start with one of the accepted URL shapes.
    #[error("Please enter a valid YouTube URL")]
    InvalidFormat,
}

/// Accepted shapes: watch page, short link, embed and shorts.
///
/// Anchored at the start only, so anything after the resource token
/// (`&list=...`, `?si=...`, `#t=30`) is ignored.
static ACCEPTED: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    const PREFIX: &str = r"^(https?://)?(www\.)?";
    const TOKEN: &str = r"[A-Za-z0-9_-]+";
    [
        format!(r"{PREFIX}youtube\.com/watch\?v={TOKEN}"),
        format!(r"{PREFIX}youtu\.be/{TOKEN}"),
        format!(r"{PREFIX}youtube\.com/embed/{TOKEN}"),
        format!(r"{PREFIX}youtube\.com/shorts/{TOKEN}"),
    ]
    .map(|p| Regex::new(&p).expect("static url pattern"))
});

/// Check a raw URL without touching any state.
pub fn validate_url(raw: &str) -> Result<(), ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyInput);
    }
    if ACCEPTED.iter().any(|re| re.is_match(trimmed)) {
        Ok(())
    } else {
        Err(ValidationError::InvalidFormat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_all_shapes_with_and_without_scheme() {
        let paths = [
            "youtube.com/watch?v=abc123",
            "youtu.be/abc123",
            "youtube.com/embed/abc-_123",
            "youtube.com/shorts/XyZ_9",
        ];
        let prefixes = ["", "www.", "http://", "https://", "http://www.", "https://www."];
        for path in paths {
            for prefix in prefixes {
                let url = format!("{prefix}{path}");
                assert_eq!(validate_url(&url), Ok(()), "{url}");
            }
        }
    }

    #[test]
    fn ignores_trailing_parameters_and_surrounding_whitespace() {
        assert_eq!(
            validate_url("  https://www.youtube.com/watch?v=abc123&list=PL1#t=30  "),
            Ok(())
        );
        assert_eq!(validate_url("https://youtu.be/abc123?si=share"), Ok(()));
    }

    #[test]
    fn empty_and_blank_input_is_empty() {
        assert_eq!(validate_url(""), Err(ValidationError::EmptyInput));
        assert_eq!(validate_url(" \t\n "), Err(ValidationError::EmptyInput));
    }

    #[test]
    fn rejects_other_text() {
        for url in [
            "not a url",
            "https://vimeo.com/12345",
            "https://www.youtube.com/watch?v=",
            "https://youtube.com/channel/UC123",
            "https://m.youtube.com/watch?v=abc123",
            "ftp://youtube.com/watch?v=abc123",
            "see https://youtu.be/abc123",
            "https://youtu.be/",
        ] {
            assert_eq!(validate_url(url), Err(ValidationError::InvalidFormat), "{url}");
        }
    }

    #[test]
    fn token_is_ascii_only() {
        assert_eq!(
            validate_url("https://youtu.be/ñandú"),
            Err(ValidationError::InvalidFormat)
        );
    }

    #[test]
    fn messages_are_user_facing() {
        assert_eq!(
            ValidationError::InvalidFormat.to_string(),
            "Please enter a valid YouTube URL"
        );
        assert_eq!(
            ValidationError::EmptyInput.to_string(),
            "Please enter a YouTube URL"
        );
    }
}
