//! Parsing of user-supplied version specs.

use std::fmt;
use std::str::FromStr;
use zigup_core::{Error, ZigVersion};

/// What the user asked for on the command line.
///
/// Parsed in priority order: the literal aliases first, then the `-mach`
/// suffix, then plain semver (with an optional `zig-` prefix stripped in
/// both cases).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSpec {
    /// Highest non-prerelease release in the zig index.
    Stable,
    /// The `master` channel of the zig index.
    Master,
    /// The `mach-latest` channel of the mach index.
    MachLatest,
    /// Highest installed version, prereleases included.
    LatestInstalled,
    /// Highest installed non-prerelease version.
    StableInstalled,
    /// A Mach nominated version, e.g. `0.3.0-mach`. Carries the index key.
    Mach(String),
    /// A released version, e.g. `0.13.0`.
    Tagged(ZigVersion),
    /// A development build, e.g. `0.14.0-dev.121+ab3c1f2d9`.
    Dev(ZigVersion),
}

impl FromStr for VersionSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stable" => return Ok(VersionSpec::Stable),
            "master" => return Ok(VersionSpec::Master),
            "mach-latest" => return Ok(VersionSpec::MachLatest),
            "latest-installed" => return Ok(VersionSpec::LatestInstalled),
            "stable-installed" => return Ok(VersionSpec::StableInstalled),
            _ => {}
        }

        let raw = s.strip_prefix("zig-").unwrap_or(s);

        if raw.ends_with("-mach") {
            return Ok(VersionSpec::Mach(raw.to_string()));
        }

        let version: ZigVersion = raw.parse().map_err(|_| Error::InvalidVersion {
            spec: s.to_string(),
        })?;
        if version.is_prerelease() {
            Ok(VersionSpec::Dev(version))
        } else {
            Ok(VersionSpec::Tagged(version))
        }
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSpec::Stable => f.write_str("stable"),
            VersionSpec::Master => f.write_str("master"),
            VersionSpec::MachLatest => f.write_str("mach-latest"),
            VersionSpec::LatestInstalled => f.write_str("latest-installed"),
            VersionSpec::StableInstalled => f.write_str("stable-installed"),
            VersionSpec::Mach(raw) => f.write_str(raw),
            VersionSpec::Tagged(v) | VersionSpec::Dev(v) => write!(f, "{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases() {
        assert_eq!("stable".parse::<VersionSpec>().unwrap(), VersionSpec::Stable);
        assert_eq!("master".parse::<VersionSpec>().unwrap(), VersionSpec::Master);
        assert_eq!(
            "mach-latest".parse::<VersionSpec>().unwrap(),
            VersionSpec::MachLatest
        );
        assert_eq!(
            "latest-installed".parse::<VersionSpec>().unwrap(),
            VersionSpec::LatestInstalled
        );
        assert_eq!(
            "stable-installed".parse::<VersionSpec>().unwrap(),
            VersionSpec::StableInstalled
        );
    }

    #[test]
    fn test_mach_suffix() {
        assert_eq!(
            "0.3.0-mach".parse::<VersionSpec>().unwrap(),
            VersionSpec::Mach("0.3.0-mach".to_string())
        );
    }

    #[test]
    fn test_zig_prefix_stripped() {
        assert_eq!(
            "zig-0.13.0".parse::<VersionSpec>().unwrap(),
            VersionSpec::Tagged(ZigVersion::new(0, 13, 0))
        );
        assert_eq!(
            "zig-0.3.0-mach".parse::<VersionSpec>().unwrap(),
            VersionSpec::Mach("0.3.0-mach".to_string())
        );
    }

    #[test]
    fn test_tagged_vs_dev() {
        assert!(matches!(
            "0.13.0".parse::<VersionSpec>().unwrap(),
            VersionSpec::Tagged(_)
        ));
        assert!(matches!(
            "0.14.0-dev.121+ab3c1f2d9".parse::<VersionSpec>().unwrap(),
            VersionSpec::Dev(_)
        ));
    }

    #[test]
    fn test_invalid_spec() {
        let err = "not-a-version".parse::<VersionSpec>().unwrap_err();
        assert!(matches!(err, Error::InvalidVersion { .. }));
    }
}
