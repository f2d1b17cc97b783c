//! Bitstream version compatibility checks.

use crate::util::{Error, Result};

use super::header::StreamHeader;

/// Rule deciding which header versions a build accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VersionPolicy {
    /// Only the exact newest version for the geometry kind.
    Strict,
    /// Any older major, and older-or-equal minors of the newest major.
    BackwardCompatible,
}

impl Default for VersionPolicy {
    /// The policy selected by the `backwards-compat` feature.
    fn default() -> Self {
        if cfg!(feature = "backwards-compat") {
            Self::BackwardCompatible
        } else {
            Self::Strict
        }
    }
}

impl VersionPolicy {
    /// Check `(major, minor)` against the newest supported version.
    pub fn check(self, major: u8, minor: u8, supported: (u8, u8)) -> Result<()> {
        let (max_major, max_minor) = supported;
        match self {
            Self::Strict => {
                if major != max_major {
                    return Err(Error::UnsupportedMajorVersion { found: major, supported: max_major });
                }
                if minor != max_minor {
                    return Err(Error::UnsupportedMinorVersion {
                        major,
                        found: minor,
                        supported: max_minor,
                    });
                }
            }
            Self::BackwardCompatible => {
                if major < 1 || major > max_major {
                    return Err(Error::UnsupportedMajorVersion { found: major, supported: max_major });
                }
                if major == max_major && minor > max_minor {
                    return Err(Error::UnsupportedMinorVersion {
                        major,
                        found: minor,
                        supported: max_minor,
                    });
                }
            }
        }
        Ok(())
    }

    /// Check a parsed header against the maxima of its geometry kind.
    pub fn check_header(self, header: &StreamHeader) -> Result<()> {
        self.check(
            header.version_major,
            header.version_minor,
            header.encoder_type.max_supported_version(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUPPORTED: (u8, u8) = (2, 3);

    #[test]
    fn test_strict_policy() {
        let p = VersionPolicy::Strict;
        assert!(p.check(2, 3, SUPPORTED).is_ok());
        assert!(p.check(1, 3, SUPPORTED).unwrap_err().is_major_version_error());
        assert!(p.check(3, 3, SUPPORTED).unwrap_err().is_major_version_error());
        assert!(p.check(2, 2, SUPPORTED).unwrap_err().is_minor_version_error());
        assert!(p.check(2, 4, SUPPORTED).unwrap_err().is_minor_version_error());
    }

    #[test]
    fn test_backward_compatible_policy() {
        let p = VersionPolicy::BackwardCompatible;
        for minor in 0..=255u8 {
            assert!(p.check(1, minor, SUPPORTED).is_ok(), "1.{minor}");
        }
        for minor in 0..=3u8 {
            assert!(p.check(2, minor, SUPPORTED).is_ok(), "2.{minor}");
        }
        assert!(p.check(2, 4, SUPPORTED).unwrap_err().is_minor_version_error());
        assert!(p.check(0, 0, SUPPORTED).unwrap_err().is_major_version_error());
        assert!(p.check(3, 0, SUPPORTED).unwrap_err().is_major_version_error());
    }

    #[test]
    fn test_far_future_major_fails_under_both_policies() {
        for p in [VersionPolicy::Strict, VersionPolicy::BackwardCompatible] {
            assert!(p.check(99, 0, SUPPORTED).unwrap_err().is_major_version_error());
        }
    }
}
