//! Live git adapter using `git` CLI commands.

use std::path::Path;
use std::process::Command;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::ports::git::{GitRepo, HttpCredentials};

/// Live git adapter that shells out to the `git` CLI.
pub struct LiveGitRepo;

impl GitRepo for LiveGitRepo {
    fn available(&self) -> bool {
        Command::new("git").arg("--version").output().is_ok_and(|o| o.status.success())
    }

    fn shallow_clone(
        &self,
        url: &str,
        reference: &str,
        dest: &Path,
        credentials: Option<&HttpCredentials>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut command = Command::new("git");
        command
            .args(["clone", "--quiet", "--depth", "1", "--single-branch", "--branch"])
            .arg(reference)
            .arg(url)
            .arg(dest)
            .env("GIT_TERMINAL_PROMPT", "0");
        if let Some(credentials) = credentials {
            match auth_config(url, credentials) {
                // Environment-supplied config applies to this process only and is
                // not persisted into the clone.
                Some((key, value)) => {
                    command
                        .env("GIT_CONFIG_COUNT", "1")
                        .env("GIT_CONFIG_KEY_0", key)
                        .env("GIT_CONFIG_VALUE_0", value);
                }
                None => log::debug!("not sending credentials to non-HTTPS remote for {reference}"),
            }
        }

        let output = command.output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("git clone of '{reference}' failed: {}", stderr.trim()).into());
        }
        Ok(())
    }
}

/// The `http.<origin>/.extraHeader` config entry carrying basic auth for the
/// host of `url`, or `None` for non-HTTPS URLs.
fn auth_config(url: &str, credentials: &HttpCredentials) -> Option<(String, String)> {
    let rest = url.strip_prefix("https://")?;
    let authority = rest.split('/').next().unwrap_or(rest);
    let host = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    if host.is_empty() {
        return None;
    }
    let token = STANDARD.encode(format!("{}:{}", credentials.user(), credentials.secret()));
    Some((format!("http.https://{host}/.extraHeader"), format!("Authorization: Basic {token}")))
}
