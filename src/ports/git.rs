//! Git port for materializing branch snapshots.

use std::fmt;
use std::path::Path;

/// HTTPS credentials for a clone. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct HttpCredentials {
    user: String,
    secret: String,
}

impl HttpCredentials {
    /// Credentials for `user` with token or password `secret`.
    #[must_use]
    pub fn new(user: &str, secret: &str) -> Self {
        Self { user: user.to_string(), secret: secret.to_string() }
    }

    /// The user name.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// The token or password.
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for HttpCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpCredentials").field("user", &self.user).field("secret", &"***").finish()
    }
}

/// Provides the git operations needed to check out the two trees.
pub trait GitRepo: Send + Sync {
    /// Returns `true` if a usable `git` executable is present.
    fn available(&self) -> bool;

    /// Clones only the tip of `reference` from `url` into `dest`.
    ///
    /// `credentials` authenticate HTTPS requests to the host of `url`. They
    /// are never written into the URL or the clone's `.git/config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the clone fails (unknown ref, auth, network).
    fn shallow_clone(
        &self,
        url: &str,
        reference: &str,
        dest: &Path,
        credentials: Option<&HttpCredentials>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
