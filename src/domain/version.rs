use crate::error::{ChangelogError, Result};
use semver::{BuildMetadata, Prerelease, Version};
use std::fmt;
use std::str::FromStr;

/// Version bump type decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BumpType {
    Patch,
    Minor,
    Major,
}

impl BumpType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BumpType::Major => "major",
            BumpType::Minor => "minor",
            BumpType::Patch => "patch",
        }
    }
}

impl fmt::Display for BumpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BumpType {
    type Err = ChangelogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "major" => Ok(BumpType::Major),
            "minor" => Ok(BumpType::Minor),
            "patch" => Ok(BumpType::Patch),
            other => Err(ChangelogError::version(format!(
                "Invalid bump type '{}' - expected major, minor or patch",
                other
            ))),
        }
    }
}

/// Parse a manifest version string, naming the package on failure
pub fn parse_version(package: &str, raw: &str) -> Result<Version> {
    Version::parse(raw.trim()).map_err(|e| {
        ChangelogError::version(format!(
            "package '{}' has invalid version '{}': {}",
            package, raw, e
        ))
    })
}

/// Bump version according to bump type.
///
/// A pre-release is promoted to its release when the bump lands on it
/// (`1.0.0-rc.1` patch -> `1.0.0`, `2.0.0-rc.1` major -> `2.0.0`); build
/// metadata is always dropped.
pub fn bump_version(version: &Version, bump_type: BumpType) -> Version {
    let pre = !version.pre.is_empty();
    let (major, minor, patch) = match bump_type {
        BumpType::Major => {
            if pre && version.minor == 0 && version.patch == 0 {
                (version.major, 0, 0)
            } else {
                (version.major + 1, 0, 0)
            }
        }
        BumpType::Minor => {
            if pre && version.patch == 0 {
                (version.major, version.minor, 0)
            } else {
                (version.major, version.minor + 1, 0)
            }
        }
        BumpType::Patch => {
            if pre {
                (version.major, version.minor, version.patch)
            } else {
                (version.major, version.minor, version.patch + 1)
            }
        }
    };

    Version {
        major,
        minor,
        patch,
        pre: Prerelease::EMPTY,
        build: BuildMetadata::EMPTY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_version_bump_major() {
        assert_eq!(bump_version(&v("1.2.3"), BumpType::Major), v("2.0.0"));
    }

    #[test]
    fn test_version_bump_minor() {
        assert_eq!(bump_version(&v("1.2.3"), BumpType::Minor), v("1.3.0"));
    }

    #[test]
    fn test_version_bump_patch() {
        assert_eq!(bump_version(&v("1.2.3"), BumpType::Patch), v("1.2.4"));
    }

    #[test]
    fn test_prerelease_is_promoted() {
        assert_eq!(bump_version(&v("1.0.0-rc.1"), BumpType::Patch), v("1.0.0"));
        assert_eq!(bump_version(&v("1.1.0-beta"), BumpType::Minor), v("1.1.0"));
        assert_eq!(bump_version(&v("2.0.0-alpha.3"), BumpType::Major), v("2.0.0"));
        assert_eq!(bump_version(&v("1.1.1-beta"), BumpType::Minor), v("1.2.0"));
    }

    #[test]
    fn test_build_metadata_dropped() {
        assert_eq!(bump_version(&v("1.0.0+build.7"), BumpType::Patch), v("1.0.1"));
    }

    #[test]
    fn test_bump_is_always_greater() {
        for raw in ["0.0.0", "0.1.9", "1.0.0-rc.1", "3.4.5", "1.0.0+meta"] {
            for bump in [BumpType::Patch, BumpType::Minor, BumpType::Major] {
                let current = v(raw);
                assert!(bump_version(&current, bump) > current, "{} {}", raw, bump);
            }
        }
    }

    #[test]
    fn test_bump_type_round_trip_text() {
        for bump in [BumpType::Patch, BumpType::Minor, BumpType::Major] {
            assert_eq!(bump.to_string().parse::<BumpType>().unwrap(), bump);
        }
        assert_eq!("MAJOR".parse::<BumpType>().unwrap(), BumpType::Major);
        assert!("huge".parse::<BumpType>().is_err());
    }

    #[test]
    fn test_bump_type_ordering() {
        assert!(BumpType::Major > BumpType::Minor);
        assert!(BumpType::Minor > BumpType::Patch);
    }

    #[test]
    fn test_parse_version_names_package() {
        let err = parse_version("core", "not-a-version").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("core"));
        assert!(msg.contains("not-a-version"));
    }
}
