//! Host platform detection for Zig download naming.

use zigup_core::Error;

/// The host platform, in Zig's download naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostPlatform {
    os: &'static str,
    arch: &'static str,
}

impl HostPlatform {
    /// Detect the current platform.
    pub fn current() -> Result<Self, Error> {
        Self::from_tokens(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Map Rust's os/arch constants to Zig's download tokens.
    pub fn from_tokens(os: &str, arch: &str) -> Result<Self, Error> {
        let os_token = match os {
            "linux" => "linux",
            "macos" => "macos",
            "windows" => "windows",
            "freebsd" => "freebsd",
            _ => {
                return Err(Error::UnsupportedSystem {
                    os: os.to_string(),
                    arch: arch.to_string(),
                });
            }
        };
        let arch_token = match arch {
            "x86_64" => "x86_64",
            "aarch64" => "aarch64",
            "x86" => "x86",
            "arm" => "armv7a",
            "riscv64" => "riscv64",
            "powerpc64le" => "powerpc64le",
            _ => {
                return Err(Error::UnsupportedSystem {
                    os: os.to_string(),
                    arch: arch.to_string(),
                });
            }
        };
        Ok(Self {
            os: os_token,
            arch: arch_token,
        })
    }

    /// The per-platform key used in the release indexes, e.g. `x86_64-linux`.
    pub fn index_token(&self) -> String {
        format!("{}-{}", self.arch, self.os)
    }

    /// Archive extension for this platform's compiler tarballs.
    pub fn archive_ext(&self) -> &'static str {
        if self.os == "windows" { "zip" } else { "tar.xz" }
    }

    /// URL of a development build not listed in any index.
    pub fn dev_build_url(&self, version: &str) -> String {
        format!(
            "https://ziglang.org/builds/zig-{}-{}-{}.{}",
            self.os,
            self.arch,
            version,
            self.archive_ext()
        )
    }
}

impl std::fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.arch, self.os)
    }
}

/// Executable file name for a tool, with the platform suffix.
pub fn exe_name(stem: &str) -> String {
    format!("{}{}", stem, std::env::consts::EXE_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_platform_is_supported() {
        // Development machines and CI are all on the supported list.
        assert!(HostPlatform::current().is_ok());
    }

    #[test]
    fn test_index_token_is_arch_first() {
        let p = HostPlatform::from_tokens("linux", "x86_64").unwrap();
        assert_eq!(p.index_token(), "x86_64-linux");
    }

    #[test]
    fn test_arm_maps_to_armv7a() {
        let p = HostPlatform::from_tokens("linux", "arm").unwrap();
        assert_eq!(p.index_token(), "armv7a-linux");
    }

    #[test]
    fn test_dev_build_url_is_os_first() {
        let p = HostPlatform::from_tokens("linux", "x86_64").unwrap();
        assert_eq!(
            p.dev_build_url("0.13.0-dev.351+d0cd54c64"),
            "https://ziglang.org/builds/zig-linux-x86_64-0.13.0-dev.351+d0cd54c64.tar.xz"
        );
    }

    #[test]
    fn test_windows_uses_zip() {
        let p = HostPlatform::from_tokens("windows", "x86_64").unwrap();
        assert_eq!(p.archive_ext(), "zip");
        assert!(p.dev_build_url("0.13.0").ends_with(".zip"));
    }

    #[test]
    fn test_unknown_system_is_rejected() {
        let err = HostPlatform::from_tokens("plan9", "mips").unwrap_err();
        assert!(matches!(err, Error::UnsupportedSystem { .. }));
    }
}
