/// Retrieves the platform string in the format `ARCH-Os`, e.g. `x86_64-Linux`.
///
/// This is the key used to pick per-platform asset patterns.
pub fn platform() -> String {
    format!(
        "{}-{}{}",
        std::env::consts::ARCH,
        &std::env::consts::OS[..1].to_uppercase(),
        &std::env::consts::OS[1..]
    )
}

/// Suffix appended to executable file names on this platform.
pub fn exe_suffix() -> &'static str {
    std::env::consts::EXE_SUFFIX
}
