/// Suffixes of keys that carry live telemetry rather than operator tuning.
pub const DEFAULT_TELEMETRY_SUFFIXES: &[&str] = &[
    "_Temp",
    "_OK",
    "Connected",
    "Voltage",
    "Speed Output",
    "Position",
    "Errors",
];

/// Splits table keys into configuration and telemetry.
///
/// The policy is an exclusion list: a key is telemetry if and only if it ends
/// with one of the configured suffixes (case-sensitive), and configuration
/// otherwise. A subsystem that publishes telemetry under a new suffix must be
/// added here, or its values will be captured as configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classifier {
    suffixes: Vec<String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(DEFAULT_TELEMETRY_SUFFIXES.iter().copied())
    }
}

impl Classifier {
    /// Build a classifier from an explicit suffix set. Empty suffixes are dropped.
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for s in suffixes {
            let s = s.into();
            if !s.is_empty() && !out.contains(&s) {
                out.push(s);
            }
        }
        Self { suffixes: out }
    }

    /// Return a classifier that additionally excludes `suffix`.
    pub fn with_suffix(self, suffix: impl Into<String>) -> Self {
        let mut suffixes = self.suffixes;
        suffixes.push(suffix.into());
        Self::new(suffixes)
    }

    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    pub fn is_configuration(&self, key: &str) -> bool {
        !self.is_telemetry(key)
    }

    pub fn is_telemetry(&self, key: &str) -> bool {
        self.suffixes.iter().any(|s| key.ends_with(s.as_str()))
    }
}
