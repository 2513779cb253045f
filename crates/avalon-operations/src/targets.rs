use avalon_core::AvalonResult;
use tracing::{debug, warn};

use crate::{AvalonContext, TargetsChange};

/// Adds `names` to the enabled list and saves the configuration.
///
/// With no `names` every known target is enabled. Unknown names are warned about;
/// names already enabled are left alone.
pub fn enable(ctx: &AvalonContext, names: &[String]) -> AvalonResult<TargetsChange> {
    let requested: Vec<String> = if names.is_empty() {
        ctx.registry().names().map(String::from).collect()
    } else {
        names.to_vec()
    };

    let mut config = ctx.config().clone();
    let mut change = TargetsChange::default();
    for name in requested {
        if !ctx.registry().contains(&name) {
            warn!("Unknown target: {}", name);
            continue;
        }
        if config.is_enabled(&name) {
            continue;
        }
        config.targets.enabled.push(name.clone());
        change.changed.push(name);
    }

    if change.is_empty() {
        warn!("Nothing to enable");
        return Ok(change);
    }

    config.save_targets_to(ctx.config_path())?;
    debug!(count = change.changed.len(), path = %ctx.config_path().display(), "enabled targets");
    Ok(change)
}

/// Removes `names` from the enabled list and saves the configuration.
///
/// With no `names` everything is disabled.
pub fn disable(ctx: &AvalonContext, names: &[String]) -> AvalonResult<TargetsChange> {
    let mut config = ctx.config().clone();
    let requested: Vec<String> = if names.is_empty() {
        config.targets.enabled.clone()
    } else {
        names.to_vec()
    };

    let mut change = TargetsChange::default();
    for name in requested {
        if !config.is_enabled(&name) {
            continue;
        }
        config.targets.enabled.retain(|enabled| *enabled != name);
        change.changed.push(name);
    }

    if change.is_empty() {
        warn!("Nothing to disable");
        return Ok(change);
    }

    config.save_targets_to(ctx.config_path())?;
    debug!(count = change.changed.len(), path = %ctx.config_path().display(), "disabled targets");
    Ok(change)
}

#[cfg(test)]
mod tests {
    use avalon_config::config::Config;

    use super::*;
    use crate::test_utils::{FakeProvider, Harness};

    fn saved_enabled(h: &Harness) -> Vec<String> {
        Config::load_from(&h.config_file())
            .unwrap()
            .targets
            .enabled
    }

    #[test]
    fn test_enable_appends_known_names() {
        let mut h = Harness::new();
        h.add("a", FakeProvider::new());
        h.add_disabled("b", FakeProvider::new());
        h.add_disabled("c", FakeProvider::new());

        let names = vec!["c".to_string(), "a".to_string(), "ghost".to_string()];
        let change = enable(&h.context(), &names).unwrap();

        assert_eq!(change.changed, vec!["c"]);
        assert_eq!(saved_enabled(&h), vec!["a", "c"]);
    }

    #[test]
    fn test_enable_all() {
        let mut h = Harness::new();
        h.add_disabled("a", FakeProvider::new());
        h.add_disabled("b", FakeProvider::new());

        let change = enable(&h.context(), &[]).unwrap();
        assert_eq!(change.changed, vec!["a", "b"]);
        assert_eq!(saved_enabled(&h), vec!["a", "b"]);
    }

    #[test]
    fn test_nothing_to_enable_leaves_file_alone() {
        let mut h = Harness::new();
        h.add("a", FakeProvider::new());

        let change = enable(&h.context(), &["a".to_string()]).unwrap();
        assert!(change.is_empty());
        assert!(!h.config_file().exists());
    }

    #[test]
    fn test_disable_keeps_comments() {
        let mut h = Harness::new();
        h.add("a", FakeProvider::new());
        h.add("b", FakeProvider::new());
        std::fs::write(
            h.config_file(),
            "# mine\n[targets]\nenabled = [\"a\", \"b\"] # keep\n",
        )
        .unwrap();

        let change = disable(&h.context(), &["a".to_string(), "zzz".to_string()]).unwrap();
        assert_eq!(change.changed, vec!["a"]);

        let content = std::fs::read_to_string(h.config_file()).unwrap();
        assert!(content.starts_with("# mine"));
        assert_eq!(saved_enabled(&h), vec!["b"]);
    }

    #[test]
    fn test_disable_all() {
        let mut h = Harness::new();
        h.add("a", FakeProvider::new());
        h.add("b", FakeProvider::new());

        let change = disable(&h.context(), &[]).unwrap();
        assert_eq!(change.changed, vec!["a", "b"]);
        assert!(saved_enabled(&h).is_empty());

        let h = Harness::new();
        assert!(disable(&h.context(), &[]).unwrap().is_empty());
    }
}
