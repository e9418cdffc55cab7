//! Aircraft callsigns.

/// A normalized callsign (trimmed, upper case).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Callsign(String);

impl Callsign {
    /// Create a callsign, normalizing whitespace and case.
    pub fn new(callsign: impl AsRef<str>) -> Self {
        Self(callsign.as_ref().trim().to_ascii_uppercase())
    }

    /// The callsign as string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the empty callsign.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Callsign {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Callsign {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Callsign {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_case_and_whitespace() {
        assert_eq!(Callsign::new("  dlh4ab "), Callsign::new("DLH4AB"));
        assert_eq!(Callsign::from("swr12").as_str(), "SWR12");
    }

    #[test]
    fn test_empty() {
        assert!(Callsign::new("   ").is_empty());
        assert!(Callsign::default().is_empty());
    }
}
