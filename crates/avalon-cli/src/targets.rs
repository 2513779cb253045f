use avalon_core::AvalonResult;
use avalon_operations::{list::list_targets, targets, AvalonContext, TargetEntry};
use nu_ansi_term::Color::{Blue, Green, Red};
use tracing::info;

use crate::utils::{version_or_none, Colored};

pub fn enable_targets(ctx: &AvalonContext, names: &[String]) -> AvalonResult<()> {
    let change = targets::enable(ctx, names)?;
    for name in &change.changed {
        info!("{} {}", Colored(Green, "+"), name);
    }
    Ok(())
}

pub fn disable_targets(ctx: &AvalonContext, names: &[String]) -> AvalonResult<()> {
    let change = targets::disable(ctx, names)?;
    for name in &change.changed {
        info!("{} {}", Colored(Red, "-"), name);
    }
    Ok(())
}

fn format_entry(entry: &TargetEntry) -> String {
    let marker = if entry.enabled {
        Colored(Green, "+").to_string()
    } else {
        Colored(Red, "-").to_string()
    };

    let mut line = format!("{marker} {}", Colored(Blue, &entry.name));
    if entry.installed.is_some() || entry.remote.is_some() {
        line.push_str(&format!(
            " (installed: {}, remote: {})",
            version_or_none(entry.installed.as_deref()),
            version_or_none(entry.remote.as_deref())
        ));
    }
    line
}

pub fn print_targets(ctx: &AvalonContext) -> AvalonResult<()> {
    for entry in list_targets(ctx)? {
        info!("{}", format_entry(&entry));
    }
    Ok(())
}
