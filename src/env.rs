//! Defines the environment variables to use.

#![cfg(feature = "env")]

#[cfg(feature = "env_request_timeout")]
use crate::static_lazy_lock;

#[cfg(feature = "env_request_timeout")]
use std::time::Duration;

/// Parses an environment variable from [`String`] to something else, wrapping any error in [`anyhow::Error`].
#[macro_export]
macro_rules! parse_env {
    ($key:expr => |$var:ident| $expr:expr) => {
        std::env::var($key)
            .map_err(|e| anyhow::anyhow!("{}: {e}", $key))
            .and_then(|$var| $expr)
    };
    ($key:expr => |$var:ident| $expr:expr; anyhow) => {
        $crate::parse_env!($key => |$var| $expr.map_err(|e| anyhow::anyhow!(e)))
    };
}

pub use parse_env;

/// The environment variable holding the GitHub token.
#[cfg(feature = "env_github_token")]
pub const GITHUB_TOKEN_VAR: &str = "GITHUB_TOKEN";

/// The environment variable overriding [`REQUEST_TIMEOUT`], in seconds.
#[cfg(feature = "env_request_timeout")]
pub const REQUEST_TIMEOUT_VAR: &str = "WALL_REQUEST_TIMEOUT_SECS";

#[cfg(feature = "env_request_timeout")]
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[cfg(feature = "env_request_timeout")]
static_lazy_lock! {
    /// The timeout applied to every request sent to the workflow provider.
    pub REQUEST_TIMEOUT: Duration = parse_env!(REQUEST_TIMEOUT_VAR => |s| s.trim().parse::<u64>(); anyhow)
        .ok()
        .filter(|secs| *secs > 0)
        .map_or(DEFAULT_REQUEST_TIMEOUT, Duration::from_secs);
}

/// Reads the GitHub token from [`GITHUB_TOKEN_VAR`].
///
/// # Errors
///
/// Returns an error if the variable is unset, not unicode, or blank.
#[cfg(feature = "env_github_token")]
pub fn github_token() -> anyhow::Result<String> {
    parse_env!(GITHUB_TOKEN_VAR => |token| non_blank(token))
}

#[cfg(feature = "env_github_token")]
fn non_blank(token: String) -> anyhow::Result<String> {
    match token.trim() {
        "" => Err(anyhow::anyhow!("{GITHUB_TOKEN_VAR} is set but empty")),
        trimmed if trimmed.len() == token.len() => Ok(token),
        trimmed => Ok(trimmed.to_owned()),
    }
}

#[cfg(all(test, feature = "env_github_token"))]
mod tests {
    use super::non_blank;

    #[test]
    fn blank_tokens_are_rejected() {
        assert!(non_blank(String::new()).is_err());
        assert!(non_blank(String::from("  \n")).is_err());
    }

    #[test]
    fn tokens_are_trimmed() {
        assert_eq!(non_blank(String::from("ghp_abc")).unwrap(), "ghp_abc");
        assert_eq!(non_blank(String::from(" ghp_abc\n")).unwrap(), "ghp_abc");
    }
}
