//! Four-component project versions and the version precedence rule.
//!
//! Project definitions declare their version either through a full
//! `<Version>` element or through a `<VersionPrefix>` element. [`resolve_version`]
//! collapses whichever of the two is present into one canonical [`Version`].

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Largest value a single version component may take.
const MAX_COMPONENT: u32 = i32::MAX.unsigned_abs();

/// A `major.minor.build.revision` version.
///
/// Ordering compares components left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Version {
    /// Major component.
    pub major: u32,
    /// Minor component.
    pub minor: u32,
    /// Build component, `0` when not declared.
    pub build: u32,
    /// Revision component, `0` when not declared.
    pub revision: u32,
}

impl Version {
    /// Marker for "no version declared".
    pub const NOT_VERSIONED: Self = Self::new(0, 0, 0, 0);

    /// Creates a version from its four components.
    #[must_use]
    pub const fn new(major: u32, minor: u32, build: u32, revision: u32) -> Self {
        Self {
            major,
            minor,
            build,
            revision,
        }
    }

    /// Parses a version literal of two to four dot-separated components.
    ///
    /// Whitespace around each component is ignored and missing trailing
    /// components default to `0`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidVersion`] if the text has too few or too many
    /// components, or if any component is not an integer in `0..=2147483647`.
    /// A leading `+` is allowed, as is `-` on a zero component.
    ///
    /// # Example
    ///
    /// ```
    /// use dotnetversion_projects::Version;
    ///
    /// let version = Version::parse("2.1.0").unwrap();
    /// assert_eq!(version, Version::new(2, 1, 0, 0));
    /// assert_eq!(version.to_string(), "2.1.0.0");
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidVersion {
            value: text.to_string(),
            reason,
        };

        let parts: Vec<&str> = text.split('.').collect();
        if !(2..=4).contains(&parts.len()) {
            return Err(invalid(format!(
                "expected 2 to 4 components, found {}",
                parts.len()
            )));
        }

        let mut components = [0_u32; 4];
        for (slot, part) in components.iter_mut().zip(&parts) {
            *slot = parse_component(part).map_err(invalid)?;
        }

        let [major, minor, build, revision] = components;
        Ok(Self::new(major, minor, build, revision))
    }

    /// Returns `true` unless this is [`Version::NOT_VERSIONED`].
    #[must_use]
    pub fn is_versioned(&self) -> bool {
        *self != Self::NOT_VERSIONED
    }
}

/// Parses one component as a decimal integer with an optional leading sign.
/// Negative values are out of range; `-0` is zero.
fn parse_component(part: &str) -> std::result::Result<u32, String> {
    let text = part.trim();
    if text.is_empty() {
        return Err("empty component".to_string());
    }

    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("component '{text}' is not a number"));
    }

    digits
        .parse::<u32>()
        .ok()
        .filter(|value| *value <= MAX_COMPONENT && !(negative && *value != 0))
        .ok_or_else(|| format!("component '{text}' is out of range"))
}

impl Default for Version {
    fn default() -> Self {
        Self::NOT_VERSIONED
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// Outcome of [`resolve_version`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedVersion {
    /// `true` when the version came from a `VersionPrefix` declaration.
    pub uses_prefix: bool,
    /// The canonical version.
    pub version: Version,
}

/// Applies the version precedence rule to the raw declarations of a project.
///
/// - neither declared (absent or empty): the sentinel, not prefix-based
/// - a non-empty prefix: the prefix wins, even when a full version is present
/// - otherwise: the full version
///
/// # Errors
///
/// Returns [`Error::InvalidVersion`] when the selected text is not a valid
/// version. There is no fallback to the sentinel.
///
/// # Example
///
/// ```
/// use dotnetversion_projects::{resolve_version, Version};
///
/// let resolved = resolve_version(Some("2.1.0"), Some("9.9.9")).unwrap();
/// assert!(resolved.uses_prefix);
/// assert_eq!(resolved.version, Version::new(2, 1, 0, 0));
///
/// let resolved = resolve_version(None, None).unwrap();
/// assert_eq!(resolved.version, Version::NOT_VERSIONED);
/// ```
pub fn resolve_version(prefix: Option<&str>, version: Option<&str>) -> Result<ResolvedVersion> {
    let prefix = prefix.filter(|text| !text.is_empty());
    let version = version.filter(|text| !text.is_empty());

    match (prefix, version) {
        (Some(prefix), _) => Ok(ResolvedVersion {
            uses_prefix: true,
            version: Version::parse(prefix)?,
        }),
        (None, Some(version)) => Ok(ResolvedVersion {
            uses_prefix: false,
            version: Version::parse(version)?,
        }),
        (None, None) => Ok(ResolvedVersion {
            uses_prefix: false,
            version: Version::NOT_VERSIONED,
        }),
    }
}
