use std::env;

/// Returns the name of the user running the process.
///
/// Checks `USER` (or `USERNAME` on Windows) first and falls back to the passwd entry of the
/// real uid on Unix.
pub fn get_username() -> String {
    if let Ok(name) = env::var("USER").or_else(|_| env::var("USERNAME")) {
        if !name.is_empty() {
            return name;
        }
    }

    #[cfg(unix)]
    {
        let uid = nix::unistd::getuid();
        if let Ok(Some(user)) = nix::unistd::User::from_uid(uid) {
            return user.name;
        }
        uid.to_string()
    }

    #[cfg(not(unix))]
    {
        String::from("user")
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn test_get_username_from_env() {
        let old = env::var("USER").ok();
        env::set_var("USER", "avalon-tester");
        assert_eq!(get_username(), "avalon-tester");
        match old {
            Some(v) => env::set_var("USER", v),
            None => env::remove_var("USER"),
        }
    }

    #[test]
    #[serial]
    fn test_get_username_not_empty() {
        assert!(!get_username().is_empty());
    }
}
