//! Architecture name translation.
//!
//! Build platforms use Go architecture names (`amd64`, `386`, `arm`,
//! `arm64`). Each package ecosystem has its own vocabulary, so package
//! manifests and artifact names translate through the tables here.
//! Unknown names pass through unchanged and are left for the packaging
//! tool to accept or reject.

/// Architectures with a defined translation in every table
const STANDARD: [&str; 4] = ["amd64", "386", "arm", "arm64"];

/// Whether `arch` is one of the standard Go architecture names
pub fn is_standard_arch(arch: &str) -> bool {
    STANDARD.contains(&arch)
}

/// Go architecture name of the build host
pub fn host_arch() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" => "arm64",
        other => other,
    }
}

/// Debian architecture name for a Go architecture
pub fn deb_arch(arch: &str) -> &str {
    match arch {
        "386" => "i386",
        other => other,
    }
}

/// RPM architecture name for a Go architecture
pub fn rpm_arch(arch: &str) -> &str {
    match arch {
        "amd64" => "x86_64",
        "386" => "i386",
        "arm" => "armhf",
        "arm64" => "aarch64",
        other => other,
    }
}

/// Pacman architecture name for a Go architecture
pub fn pacman_arch(arch: &str) -> &str {
    rpm_arch(arch)
}

/// AppImage architecture name for a Go architecture
///
/// Matches the names appimagetool releases are published under.
pub fn appimage_arch(arch: &str) -> &str {
    match arch {
        "386" => "i686",
        other => rpm_arch(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debian_renames_only_the_32_bit_intel_arch() {
        assert_eq!(deb_arch("amd64"), "amd64");
        assert_eq!(deb_arch("386"), "i386");
        assert_eq!(deb_arch("arm"), "arm");
        assert_eq!(deb_arch("arm64"), "arm64");
    }

    #[test]
    fn rpm_renames_every_standard_arch_but_arm() {
        assert_eq!(rpm_arch("amd64"), "x86_64");
        assert_eq!(rpm_arch("386"), "i386");
        assert_eq!(rpm_arch("arm"), "armhf");
        assert_eq!(rpm_arch("arm64"), "aarch64");
    }

    #[test]
    fn pacman_matches_rpm() {
        for arch in ["amd64", "386", "arm", "arm64", "riscv64"] {
            assert_eq!(pacman_arch(arch), rpm_arch(arch));
        }
    }

    #[test]
    fn appimage_uses_i686_for_32_bit_intel() {
        assert_eq!(appimage_arch("386"), "i686");
        assert_eq!(appimage_arch("amd64"), "x86_64");
        assert_eq!(appimage_arch("arm64"), "aarch64");
    }

    #[test]
    fn unknown_architectures_pass_through() {
        for translate in [deb_arch, rpm_arch, pacman_arch, appimage_arch] {
            assert_eq!(translate("riscv64"), "riscv64");
        }
    }

    #[test]
    fn standard_set_is_exactly_the_go_names() {
        assert!(is_standard_arch("amd64"));
        assert!(is_standard_arch("386"));
        assert!(is_standard_arch("arm"));
        assert!(is_standard_arch("arm64"));
        assert!(!is_standard_arch("x86_64"));
        assert!(!is_standard_arch("riscv64"));
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn host_arch_uses_go_naming() {
        assert_eq!(host_arch(), "amd64");
    }
}
