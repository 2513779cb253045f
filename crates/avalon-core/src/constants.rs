/// Cache key holding the version string resolved by the last `update`.
pub const REMOTE_VERSION: &str = "remote_version";

/// Cache key holding the asset URL resolved by the last `update`.
pub const DOWNLOAD_URL: &str = "download_url";

/// Name of the pointer inside each target directory.
pub const LATEST_LINK: &str = "latest";

/// Prefix of the in-flight download file inside each target directory.
pub const TEMP_PREFIX: &str = "temp_";

pub const CACHE_EXTENSION: &str = "json";
