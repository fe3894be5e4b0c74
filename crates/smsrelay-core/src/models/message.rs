//! Outbound SMS text

use std::fmt;

/// Maximum message length in characters
pub const MAX_MESSAGE_CHARS: usize = 500;

/// Appended to messages cut down to [`MAX_MESSAGE_CHARS`]
pub const TRUNCATION_MARKER: &str = "...";

/// SMS text, never longer than [`MAX_MESSAGE_CHARS`] characters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage(String);

impl RenderedMessage {
    /// Wrap `text`, truncating it with [`TRUNCATION_MARKER`] if it is too long.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.chars().count() <= MAX_MESSAGE_CHARS {
            return Self(text);
        }

        let keep = MAX_MESSAGE_CHARS - TRUNCATION_MARKER.chars().count();
        let mut truncated: String = text.chars().take(keep).collect();
        truncated.push_str(TRUNCATION_MARKER);
        Self(truncated)
    }

    /// Message text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }
}

impl fmt::Display for RenderedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_untouched() {
        let msg = RenderedMessage::new("hello");
        assert_eq!(msg.as_str(), "hello");
    }

    #[test]
    fn test_exact_limit_untouched() {
        let text = "x".repeat(MAX_MESSAGE_CHARS);
        let msg = RenderedMessage::new(text.clone());
        assert_eq!(msg.as_str(), text);
    }

    #[test]
    fn test_long_text_truncated() {
        let msg = RenderedMessage::new("y".repeat(MAX_MESSAGE_CHARS + 1));
        assert_eq!(msg.char_len(), MAX_MESSAGE_CHARS);
        assert!(msg.as_str().ends_with("..."));
        assert_eq!(&msg.as_str()[..497], "y".repeat(497));
    }

    #[test]
    fn test_truncation_counts_chars_not_bytes() {
        let msg = RenderedMessage::new("ç".repeat(600));
        assert_eq!(msg.char_len(), MAX_MESSAGE_CHARS);
        assert!(msg.as_str().starts_with(&"ç".repeat(497)));
    }
}
