// Platform Domain Model
//
// Matching rules for host OS names and machine hardware names live here so
// the infra detector only has to gather the raw strings.

/// Host operating system family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsFamily {
    Unix,
    Windows,
    MacOs,
}

impl OsFamily {
    pub const ALL: [OsFamily; 3] = [OsFamily::Unix, OsFamily::Windows, OsFamily::MacOs];

    /// Classify a host OS name (e.g. `"Linux"`, `"Windows 11"`, `"Mac OS X"`).
    ///
    /// Checks run in order: `win` substring, then `nix`/`nux`/`aix`
    /// substrings, then an exact `mac os x` match. All comparisons ignore case.
    /// Note that `"Darwin"` classifies as Windows under these rules.
    pub fn from_os_name(os_name: &str) -> Option<Self> {
        let name = os_name.to_lowercase();

        if name.contains("win") {
            Some(OsFamily::Windows)
        } else if name.contains("nix") || name.contains("nux") || name.contains("aix") {
            Some(OsFamily::Unix)
        } else if name == "mac os x" {
            Some(OsFamily::MacOs)
        } else {
            None
        }
    }
}

impl std::fmt::Display for OsFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OsFamily::Unix => write!(f, "UNIX"),
            OsFamily::Windows => write!(f, "WINDOWS"),
            OsFamily::MacOs => write!(f, "MAC_OS_X"),
        }
    }
}

/// CPU architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Architecture {
    X86,
    X86_64,
    Arm64,
}

impl Architecture {
    pub const ALL: [Architecture; 3] = [Architecture::X86, Architecture::X86_64, Architecture::Arm64];

    /// Map the single line printed by `uname -m`.
    ///
    /// The accepted arm spelling depends on the family: Linux reports
    /// `aarch64`, macOS reports `arm64`. Windows never goes through `uname`.
    pub fn from_machine(os: OsFamily, machine: &str) -> Option<Self> {
        match (os, machine.trim()) {
            (OsFamily::Unix | OsFamily::MacOs, "x86_64") => Some(Architecture::X86_64),
            (OsFamily::Unix, "aarch64") => Some(Architecture::Arm64),
            (OsFamily::MacOs, "arm64") => Some(Architecture::Arm64),
            _ => None,
        }
    }

    /// Windows rule: `PROCESSOR_ARCHITECTURE` or `PROCESSOR_ARCHITEW6432`
    /// ending in `64` means a 64-bit host.
    pub fn from_windows_env(arch: Option<&str>, wow64_arch: Option<&str>) -> Self {
        let is_64 = |v: Option<&str>| v.is_some_and(|s| s.ends_with("64"));

        if is_64(arch) || is_64(wow64_arch) {
            Architecture::X86_64
        } else {
            Architecture::X86
        }
    }
}

impl std::fmt::Display for Architecture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Architecture::X86 => write!(f, "x86"),
            Architecture::X86_64 => write!(f, "x86_64"),
            Architecture::Arm64 => write!(f, "arm64"),
        }
    }
}

/// (OS family, architecture) pair used to pick a binary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlatformKey {
    pub os: OsFamily,
    pub arch: Architecture,
}

impl PlatformKey {
    pub const UNIX_X86: PlatformKey = PlatformKey::new(OsFamily::Unix, Architecture::X86);
    pub const UNIX_X86_64: PlatformKey = PlatformKey::new(OsFamily::Unix, Architecture::X86_64);
    pub const UNIX_ARM64: PlatformKey = PlatformKey::new(OsFamily::Unix, Architecture::Arm64);
    pub const MAC_OS_X86_64: PlatformKey = PlatformKey::new(OsFamily::MacOs, Architecture::X86_64);
    pub const MAC_OS_ARM64: PlatformKey = PlatformKey::new(OsFamily::MacOs, Architecture::Arm64);
    pub const WINDOWS_X86_64: PlatformKey = PlatformKey::new(OsFamily::Windows, Architecture::X86_64);

    pub const fn new(os: OsFamily, arch: Architecture) -> Self {
        Self { os, arch }
    }
}

impl std::fmt::Display for PlatformKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.os, self.arch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_name_classification() {
        assert_eq!(OsFamily::from_os_name("Linux"), Some(OsFamily::Unix));
        assert_eq!(OsFamily::from_os_name("AIX"), Some(OsFamily::Unix));
        assert_eq!(OsFamily::from_os_name("Windows 10"), Some(OsFamily::Windows));
        assert_eq!(OsFamily::from_os_name("Mac OS X"), Some(OsFamily::MacOs));
        assert_eq!(OsFamily::from_os_name("MAC OS X"), Some(OsFamily::MacOs));
    }

    #[test]
    fn test_os_name_unrecognized() {
        assert_eq!(OsFamily::from_os_name("FreeBSD"), None);
        assert_eq!(OsFamily::from_os_name("macos"), None);
        assert_eq!(OsFamily::from_os_name(""), None);
    }

    #[test]
    fn test_win_substring_checked_first() {
        // "darwin" contains "win"
        assert_eq!(OsFamily::from_os_name("Darwin"), Some(OsFamily::Windows));
    }

    #[test]
    fn test_machine_name_per_family() {
        assert_eq!(
            Architecture::from_machine(OsFamily::Unix, "aarch64"),
            Some(Architecture::Arm64)
        );
        assert_eq!(Architecture::from_machine(OsFamily::Unix, "arm64"), None);
        assert_eq!(
            Architecture::from_machine(OsFamily::MacOs, "arm64"),
            Some(Architecture::Arm64)
        );
        assert_eq!(Architecture::from_machine(OsFamily::MacOs, "aarch64"), None);
        assert_eq!(
            Architecture::from_machine(OsFamily::Unix, "x86_64\n"),
            Some(Architecture::X86_64)
        );
        assert_eq!(Architecture::from_machine(OsFamily::Unix, "i686"), None);
        assert_eq!(Architecture::from_machine(OsFamily::Windows, "x86_64"), None);
    }

    #[test]
    fn test_windows_env_rule() {
        assert_eq!(
            Architecture::from_windows_env(Some("AMD64"), None),
            Architecture::X86_64
        );
        assert_eq!(
            Architecture::from_windows_env(Some("x86"), Some("AMD64")),
            Architecture::X86_64
        );
        assert_eq!(
            Architecture::from_windows_env(Some("x86"), None),
            Architecture::X86
        );
        assert_eq!(Architecture::from_windows_env(None, None), Architecture::X86);
    }

    #[test]
    fn test_platform_key_display() {
        assert_eq!(PlatformKey::UNIX_X86_64.to_string(), "UNIX (x86_64)");
        assert_eq!(PlatformKey::MAC_OS_ARM64.to_string(), "MAC_OS_X (arm64)");
    }
}
