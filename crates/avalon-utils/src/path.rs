use std::{
    env,
    iter::Peekable,
    path::{Path, PathBuf},
    str::Chars,
};

use crate::{
    error::{PathError, PathResult},
    user::get_username,
};

/// Resolves user-supplied path strings and XDG base directories.
pub trait PathResolver {
    /// Expands `$VAR`, `${VAR}` and a leading `~`, then makes the result absolute relative to
    /// the current working directory.
    ///
    /// # Errors
    ///
    /// * [`PathError::Empty`] if the path is blank
    /// * [`PathError::UnclosedVariable`] for a `${` without a closing brace
    /// * [`PathError::MissingEnvVar`] if a referenced variable is unset
    /// * [`PathError::CurrentDir`] if a relative path cannot be anchored
    fn resolve_path(&self, path: &str) -> PathResult<PathBuf>;

    /// `$HOME`, or `/home/<user>` when it is unset.
    fn home_dir(&self) -> PathBuf;

    /// `$XDG_CONFIG_HOME`, defaulting to `~/.config`.
    fn xdg_config_home(&self) -> PathBuf;

    /// `$XDG_DATA_HOME`, defaulting to `~/.local/share`.
    fn xdg_data_home(&self) -> PathBuf;

    /// `$XDG_CACHE_HOME`, defaulting to `~/.cache`.
    fn xdg_cache_home(&self) -> PathBuf;
}

/// [`PathResolver`] backed by the process environment.
pub struct SystemPathResolver;

impl PathResolver for SystemPathResolver {
    fn resolve_path(&self, path: &str) -> PathResult<PathBuf> {
        let path = path.trim();
        if path.is_empty() {
            return Err(PathError::Empty);
        }

        let expanded = PathBuf::from(self.expand(path)?);
        if expanded.is_absolute() {
            return Ok(expanded);
        }

        env::current_dir()
            .map(|cwd| cwd.join(expanded))
            .map_err(|source| PathError::CurrentDir { source })
    }

    fn home_dir(&self) -> PathBuf {
        env_dir("HOME").unwrap_or_else(|| PathBuf::from("/home").join(get_username()))
    }

    fn xdg_config_home(&self) -> PathBuf {
        env_dir("XDG_CONFIG_HOME").unwrap_or_else(|| self.home_dir().join(".config"))
    }

    fn xdg_data_home(&self) -> PathBuf {
        env_dir("XDG_DATA_HOME").unwrap_or_else(|| self.home_dir().join(".local/share"))
    }

    fn xdg_cache_home(&self) -> PathBuf {
        env_dir("XDG_CACHE_HOME").unwrap_or_else(|| self.home_dir().join(".cache"))
    }
}

fn env_dir(key: &str) -> Option<PathBuf> {
    env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

impl SystemPathResolver {
    fn expand(&self, input: &str) -> PathResult<String> {
        let mut out = String::with_capacity(input.len());
        let mut chars = input.chars().peekable();

        if chars.next_if_eq(&'~').is_some() {
            if matches!(chars.peek(), None | Some('/') | Some('\\')) {
                out.push_str(&self.home_dir().to_string_lossy());
            } else {
                out.push('~');
            }
        }

        while let Some(c) = chars.next() {
            if c != '$' {
                out.push(c);
                continue;
            }

            let name = if chars.next_if_eq(&'{').is_some() {
                read_braced(&mut chars)?
            } else {
                read_bare(&mut chars)
            };

            if name.is_empty() {
                out.push('$');
            } else {
                out.push_str(&self.lookup(&name, input)?);
            }
        }

        Ok(out)
    }

    fn lookup(&self, name: &str, input: &str) -> PathResult<String> {
        let dir = match name {
            "HOME" => self.home_dir(),
            "XDG_CONFIG_HOME" => self.xdg_config_home(),
            "XDG_DATA_HOME" => self.xdg_data_home(),
            "XDG_CACHE_HOME" => self.xdg_cache_home(),
            _ => {
                return env::var(name).map_err(|_| PathError::MissingEnvVar {
                    var: name.into(),
                    input: input.into(),
                })
            }
        };
        Ok(dir.to_string_lossy().into_owned())
    }
}

fn read_braced(chars: &mut Peekable<Chars>) -> PathResult<String> {
    let mut name = String::new();
    for c in chars.by_ref() {
        if c == '}' {
            return Ok(name);
        }
        name.push(c);
    }
    Err(PathError::UnclosedVariable {
        input: format!("${{{name}"),
    })
}

fn read_bare(chars: &mut Peekable<Chars>) -> String {
    let mut name = String::new();
    while let Some(c) = chars.next_if(|c| c.is_alphanumeric() || *c == '_') {
        name.push(c);
    }
    name
}

/// Resolves a path string with [`SystemPathResolver`].
pub fn resolve_path(path: &str) -> PathResult<PathBuf> {
    SystemPathResolver.resolve_path(path)
}

pub fn home_dir() -> PathBuf {
    SystemPathResolver.home_dir()
}

pub fn xdg_config_home() -> PathBuf {
    SystemPathResolver.xdg_config_home()
}

pub fn xdg_data_home() -> PathBuf {
    SystemPathResolver.xdg_data_home()
}

pub fn xdg_cache_home() -> PathBuf {
    SystemPathResolver.xdg_cache_home()
}

/// Joins `name` onto `base` after checking it is a single normal path component.
///
/// Target names and version strings end up as directory names, so a value like `../x` or
/// `a/b` must never escape its parent.
pub fn join_component(base: &Path, name: &str) -> Option<PathBuf> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(std::path::Component::Normal(part)), None) if part == name => {
            Some(base.join(part))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    fn with_vars<F: FnOnce()>(vars: &[(&str, Option<&str>)], f: F) {
        let saved: Vec<_> = vars.iter().map(|(k, _)| (*k, env::var(k).ok())).collect();
        for (key, value) in vars {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
        f();
        for (key, value) in saved {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }

    #[test]
    #[serial]
    fn test_expand_plain_and_braced() {
        with_vars(&[("AVALON_TEST_VAR", Some("value"))], || {
            let resolver = SystemPathResolver;
            assert_eq!(resolver.expand("$AVALON_TEST_VAR/a").unwrap(), "value/a");
            assert_eq!(resolver.expand("${AVALON_TEST_VAR}/a").unwrap(), "value/a");
            assert_eq!(resolver.expand("x$AVALON_TEST_VAR").unwrap(), "xvalue");
        });
    }

    #[test]
    #[serial]
    fn test_expand_errors() {
        with_vars(&[("AVALON_UNSET_VAR", None)], || {
            let resolver = SystemPathResolver;
            assert!(matches!(
                resolver.expand("${AVALON_TEST_VAR"),
                Err(PathError::UnclosedVariable { .. })
            ));
            assert!(matches!(
                resolver.expand("$AVALON_UNSET_VAR"),
                Err(PathError::MissingEnvVar { .. })
            ));
        });
    }

    #[test]
    #[serial]
    fn test_expand_edge_cases() {
        with_vars(&[("HOME", Some("/tmp/home"))], || {
            let resolver = SystemPathResolver;
            assert_eq!(resolver.expand("path/$").unwrap(), "path/$");
            assert_eq!(resolver.expand("path/$!x").unwrap(), "path/$!x");
            assert_eq!(resolver.expand("~").unwrap(), "/tmp/home");
            assert_eq!(resolver.expand("~/data").unwrap(), "/tmp/home/data");
            assert_eq!(resolver.expand("~user").unwrap(), "~user");
            assert_eq!(resolver.expand("a/~/b").unwrap(), "a/~/b");
        });
    }

    #[test]
    #[serial]
    fn test_xdg_directories() {
        with_vars(
            &[
                ("HOME", Some("/tmp/home")),
                ("XDG_CONFIG_HOME", None),
                ("XDG_DATA_HOME", None),
                ("XDG_CACHE_HOME", Some("/tmp/cache")),
            ],
            || {
                assert_eq!(home_dir(), PathBuf::from("/tmp/home"));
                assert_eq!(xdg_config_home(), PathBuf::from("/tmp/home/.config"));
                assert_eq!(xdg_data_home(), PathBuf::from("/tmp/home/.local/share"));
                assert_eq!(xdg_cache_home(), PathBuf::from("/tmp/cache"));
            },
        );
    }

    #[test]
    #[serial]
    fn test_resolve_path() {
        with_vars(&[("HOME", Some("/tmp/home"))], || {
            assert!(matches!(resolve_path("  "), Err(PathError::Empty)));
            assert_eq!(
                resolve_path("/absolute/path").unwrap(),
                PathBuf::from("/absolute/path")
            );
            assert_eq!(
                resolve_path("relative").unwrap(),
                env::current_dir().unwrap().join("relative")
            );
            assert_eq!(
                resolve_path("$XDG_DATA_HOME/avalon").unwrap(),
                PathBuf::from("/tmp/home/.local/share/avalon")
            );
        });
    }

    #[test]
    fn test_join_component() {
        let base = Path::new("/data");
        assert_eq!(
            join_component(base, "apkeep"),
            Some(PathBuf::from("/data/apkeep"))
        );
        assert_eq!(
            join_component(base, "0.17.0"),
            Some(PathBuf::from("/data/0.17.0"))
        );
        assert_eq!(join_component(base, ".."), None);
        assert_eq!(join_component(base, "a/b"), None);
        assert_eq!(join_component(base, ""), None);
        assert_eq!(join_component(base, "/etc"), None);
    }
}
