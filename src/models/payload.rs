use std::fmt;

/// Decoded QR payload
///
/// The string is treated as a URL when rendered. It is never empty; a decode
/// that yields an empty string counts as "no code found".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Payload(String);

impl Payload {
    /// Wrap a decoded string, rejecting the empty string
    pub fn new(content: impl Into<String>) -> Option<Self> {
        let content = content.into();
        if content.is_empty() {
            None
        } else {
            Some(Self(content))
        }
    }

    /// Decoded content
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the decoded content
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for Payload {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
