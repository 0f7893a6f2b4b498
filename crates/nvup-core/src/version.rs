//! Driver version parsing and ordering.
//!
//! Driver versions are dot-separated sequences of non-negative integers
//! ("552.44", "551.86.1"). Comparison is componentwise with the shorter
//! operand conceptually zero-padded, so "552.44" and "552.44.0" are equal.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error produced when a version string cannot be parsed.
///
/// Callers that implement the "unparsable is not an update" policy should
/// map this to `false` rather than propagate it; see [`is_newer`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionParseError {
    /// The input was empty or contained no components.
    #[error("empty version string")]
    Empty,
    /// A component was not a non-negative integer.
    #[error("invalid version component '{component}'")]
    InvalidComponent {
        /// The offending component text.
        component: String,
    },
}

/// A parsed driver version: an ordered tuple of non-negative integers.
///
/// Always has at least one component. Ordering and equality use
/// zero-padding semantics for unequal component counts.
#[derive(Debug, Clone)]
pub struct DriverVersion {
    components: Vec<u64>,
}

impl DriverVersion {
    /// The parsed components, most significant first.
    pub fn components(&self) -> &[u64] {
        &self.components
    }
}

impl FromStr for DriverVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(VersionParseError::Empty);
        }

        let components = trimmed
            .split('.')
            .map(|part| {
                part.parse::<u64>()
                    .map_err(|_| VersionParseError::InvalidComponent {
                        component: part.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { components })
    }
}

impl fmt::Display for DriverVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for c in &self.components {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{c}")?;
            first = false;
        }
        Ok(())
    }
}

impl PartialEq for DriverVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DriverVersion {}

impl PartialOrd for DriverVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DriverVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        for i in 0..len {
            let a = self.components.get(i).copied().unwrap_or(0);
            let b = other.components.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => {}
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

/// Policy comparison: is `latest` strictly newer than `current`?
///
/// Returns `false` when either input fails to parse. An unparsable catalog
/// or registry value must never surface as a spurious update prompt, so
/// the failure mode is "no update", not an error.
pub fn is_newer(latest: &str, current: &str) -> bool {
    match (
        DriverVersion::from_str(latest),
        DriverVersion::from_str(current),
    ) {
        (Ok(latest), Ok(current)) => latest > current,
        _ => false,
    }
}
