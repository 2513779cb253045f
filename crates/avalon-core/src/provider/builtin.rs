use std::collections::BTreeMap;

use avalon_config::provider::AssetPattern;

use super::ProviderSpec;

const DOTTED_VERSION: &str = r"(?P<version>(\d|\.)+)";

/// Targets compiled into avalon.
pub fn builtin_specs() -> Vec<ProviderSpec> {
    let apkeep_assets = BTreeMap::from([
        (
            "x86_64-Linux".to_string(),
            "^apkeep-x86_64-unknown-linux-gnu$".to_string(),
        ),
        (
            "x86_64-Windows".to_string(),
            r"^apkeep-x86_64-pc-windows-msvc\.exe$".to_string(),
        ),
    ]);

    vec![
        ProviderSpec::github(
            "apkeep",
            "EFForg/apkeep",
            AssetPattern::PerPlatform(apkeep_assets),
        )
        .version_pattern(DOTTED_VERSION),
        ProviderSpec::github(
            "apkeditor",
            "REAndroid/APKEditor",
            AssetPattern::Any(r"^APKEditor-(\d|\.)+\.jar$".into()),
        )
        .version_pattern(DOTTED_VERSION)
        .filename("{name}.jar"),
        ProviderSpec::github(
            "revanced-cli",
            "revanced/revanced-cli",
            AssetPattern::Any(r"^revanced-cli-.+-all\.jar$".into()),
        )
        .filename("{name}.jar"),
        ProviderSpec::github(
            "piko-twitter-patches",
            "crimera/piko",
            AssetPattern::Any(r"^piko-twitter-patches-(\d|\.)+\.jar$".into()),
        )
        .filename("{name}.jar"),
    ]
}
