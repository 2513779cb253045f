use std::sync::Arc;

use avalon_config::config::{self, generate_default_config, get_config, set_config_path};
use avalon_core::{
    error::{AvalonError, ErrorContext},
    AvalonResult,
};
use avalon_dl::http_client::configure_http_client;
use avalon_events::{ChannelSink, EventSinkHandle, NullSink};
use avalon_operations::AvalonContext;
use avalon_utils::path::resolve_path;
use clap::Parser;
use cli::{Args, Commands};
use install::{install_targets, upgrade_targets};
use logging::setup_logging;
use progress::{spawn_event_handler, ProgressGuard};
use targets::{disable_targets, enable_targets, print_targets};
use uninstall::uninstall_targets;
use update::update_targets;
use ureq::{
    http::{HeaderMap, HeaderName, HeaderValue},
    Proxy,
};
use utils::{progress_enabled, set_color, set_progress};

mod cli;
mod install;
mod logging;
mod progress;
mod targets;
mod uninstall;
mod update;
mod utils;

fn create_context() -> AvalonResult<(AvalonContext, Option<ProgressGuard>)> {
    let config = get_config();

    if progress_enabled() {
        let (sink, receiver) = ChannelSink::new();
        let events: EventSinkHandle = Arc::new(sink);
        let ctx = AvalonContext::new(config, events)?;
        let guard = spawn_event_handler(receiver);
        Ok((ctx, Some(guard)))
    } else {
        let events: EventSinkHandle = Arc::new(NullSink);
        Ok((AvalonContext::new(config, events)?, None))
    }
}

fn parse_headers(headers: &[String]) -> AvalonResult<HeaderMap> {
    let mut map = HeaderMap::new();
    for header in headers {
        let (key, value) = header
            .split_once(':')
            .ok_or_else(|| AvalonError::Custom(format!("Invalid header `{header}`, expected key:value")))?;
        let key: HeaderName = key
            .trim()
            .parse()
            .map_err(|_| AvalonError::Custom(format!("Invalid header name `{key}`")))?;
        let value = HeaderValue::from_str(value.trim())
            .map_err(|_| AvalonError::Custom(format!("Invalid value for header `{key}`")))?;
        map.insert(key, value);
    }
    Ok(map)
}

fn setup_http_client(args: &Args) -> AvalonResult<()> {
    let proxy = args
        .proxy
        .as_deref()
        .map(|proxy| {
            Proxy::new(proxy)
                .map_err(|err| AvalonError::Custom(format!("Invalid proxy `{proxy}`: {err}")))
        })
        .transpose()?;
    let headers = args.header.as_deref().map(parse_headers).transpose()?;
    let user_agent = args.user_agent.clone();

    configure_http_client(|config| {
        if proxy.is_some() {
            config.proxy = proxy;
        }
        if user_agent.is_some() {
            config.user_agent = user_agent;
        }
        if headers.is_some() {
            config.headers = headers;
        }
    });
    Ok(())
}

/// Writes the annotated default config to the configured path. Needs no loaded config.
fn defconfig() -> AvalonResult<()> {
    generate_default_config()?;
    Ok(())
}

async fn run_command(ctx: &AvalonContext, command: Commands) -> AvalonResult<()> {
    match command {
        Commands::Update {
            targets,
        } => update_targets(ctx, &targets).await,
        Commands::Install {
            targets,
        } => install_targets(ctx, &targets).await,
        Commands::Upgrade {
            targets,
        } => upgrade_targets(ctx, &targets).await,
        Commands::Uninstall {
            targets,
        } => uninstall_targets(ctx, &targets).await,
        Commands::Enable {
            targets,
        } => enable_targets(ctx, &targets),
        Commands::Disable {
            targets,
        } => disable_targets(ctx, &targets),
        Commands::List => print_targets(ctx),
        Commands::DefConfig => unreachable!("defconfig runs before the configuration is loaded"),
    }
}

async fn handle_cli() -> AvalonResult<()> {
    let args = Args::parse();

    setup_logging(&args);
    if args.no_color {
        set_color(false);
    }
    if args.no_progress {
        set_progress(false);
    }

    if let Some(ref path) = args.config {
        let path = resolve_path(path)?;
        let path = std::path::absolute(&path)
            .with_context(|| format!("resolving config path {}", path.display()))?;
        set_config_path(path);
    }

    setup_http_client(&args)?;

    match args.command {
        Commands::DefConfig => defconfig(),
        command => {
            config::init()?;

            let (ctx, progress_guard) = create_context()?;
            let result = run_command(&ctx, command).await;

            // Dropping the context closes the event channel so the handler thread can drain.
            drop(ctx);
            if let Some(guard) = progress_guard {
                guard.finish();
            }
            progress::stop();

            result
        }
    }
}

#[tokio::main]
async fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli().await {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_loadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("avalon/config.toml");
        set_config_path(path.clone());

        defconfig().unwrap();
        config::init().unwrap();

        assert!(path.exists());
        assert!(get_config().targets.enabled.is_empty());
        assert!(defconfig().is_err());
    }

    #[test]
    fn test_parse_headers() {
        let headers = vec!["X-Token: abc".to_string(), "Accept:text/plain".to_string()];
        let map = parse_headers(&headers).unwrap();
        assert_eq!(map.get("x-token").unwrap(), "abc");
        assert_eq!(map.get("accept").unwrap(), "text/plain");
    }

    #[test]
    fn test_parse_headers_rejects_missing_colon() {
        let err = parse_headers(&["nocolon".to_string()]).unwrap_err();
        assert!(err.to_string().contains("key:value"));
    }
}
