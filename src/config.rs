//! Runtime settings shared by the one-shot commands and the shell.

use std::path::PathBuf;
use std::time::Duration;

use crate::dispatch::DispatchPolicy;
use crate::download::DEFAULT_PREFIX;
use crate::notice::DEFAULT_NOTICE_TTL;
use crate::resolver::ResolverPolicy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub resolver: ResolverPolicy,
    pub dispatch: DispatchPolicy,
    /// Directory saved results are written to.
    pub save_dir: PathBuf,
    /// File name prefix for saved results.
    pub save_prefix: String,
    pub notice_ttl: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            resolver: ResolverPolicy::default(),
            dispatch: DispatchPolicy::default(),
            save_dir: PathBuf::from("."),
            save_prefix: DEFAULT_PREFIX.to_string(),
            notice_ttl: DEFAULT_NOTICE_TTL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.resolver.allow_result_fallback_on_decrypt);
        assert!(settings.dispatch.empty_plaintext_is_failure);
        assert_eq!(settings.save_prefix, "textlock");
        assert_eq!(settings.notice_ttl, Duration::from_secs(5));
    }
}
