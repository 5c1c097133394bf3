use std::error::Error as StdError;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCategory {
    /// Any failure that cannot be confidently attributed to any other error
    /// category in this enum.
    ///
    /// Use of Internal is never a guarantee that the error is not, for
    /// example, caused by the user - merely that the code cannot tell.
    Internal,

    /// The user provided invalid input or performed an action that is
    /// unsupported or impossible to complete.
    User,
}

/// Fine-grained condition flags for consumers that want to branch on error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// No password was supplied for an operation.
    MissingPassword,
    /// Neither a file, the text field, nor (when allowed) the displayed
    /// result provided anything to process.
    MissingPayload,
    /// The loaded file could not be read as UTF-8 text.
    FileRead,
    /// Decryption did not produce usable text. Almost always a wrong
    /// password; may also be a damaged ciphertext.
    WrongPasswordOrInvalidCiphertext,
    /// The cipher construction rejected the input or failed internally.
    CipherError,
    /// An operation was triggered while another one was still pending.
    OperationInFlight,
    /// A save was requested while no result is displayed.
    NothingToSave,
    /// The armored representation is malformed (prefix or unsupported version).
    ArmoringInvalid,
    /// Base64 decoding of the armored payload failed.
    ArmoringDecode,
    /// Input claimed to be textlock but used a future/unsupported version.
    ArmoringFromFuture,
    /// Length fields or binary layout are invalid.
    BinaryFormat,
    /// Input data ended before the expected component could be read.
    TruncatedInput,
    /// Additional bytes were present after the sealed box.
    TrailingData,
    /// Authentication failed due to an incorrect password, tampering
    /// or corruption.
    AuthenticationFailed,
    /// Low-level scrypt key derivation failed.
    ScryptFailure,
    /// NaCl secretbox (XSalsa20Poly1305) failed to seal data.
    SecretboxFailure,
    /// Password could not be obtained from the configured reader.
    PassphraseUnavailable,
    /// Interaction with the filesystem, stdin/stdout, or other I/O failed.
    Io,
}

#[derive(Debug, Error)]
#[error("{msg}")]
pub struct TextlockError {
    /// Broad error category, always provided.
    pub category: ErrorCategory,
    /// Optional specific condition tag for consumers that need to
    /// branch their behavior. Any code consuming errors MUST handle
    /// the absence of a defined kind.
    pub kind: Option<ErrorKind>,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    msg: String,
}

impl TextlockError {
    /// Creates a new error with a required category and display message.
    pub fn new(category: ErrorCategory, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: None,
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that also tags the failure with a kind.
    pub fn with_kind(category: ErrorCategory, kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that carries both a kind tag and the originating source error.
    pub fn with_kind_and_source(
        category: ErrorCategory,
        kind: ErrorKind,
        msg: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: Some(Box::new(source)),
            msg: msg.into(),
        }
    }

    /// The user-facing message carried by the error.
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// Returns the preserved source error if present.
    pub fn source_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// Wraps the current error with a higher-level message while preserving the original as source.
    pub fn with_context(self, msg: impl Into<String>) -> Self {
        let category = self.category;
        let kind = self.kind;
        Self {
            category,
            kind,
            source: Some(Box::new(self)),
            msg: msg.into(),
        }
    }

    /// Like [`with_context`](Self::with_context), but re-tags the wrapper
    /// with a different kind. The original kind stays reachable through
    /// the source chain.
    pub fn reclassify(self, kind: ErrorKind, msg: impl Into<String>) -> Self {
        let category = self.category;
        Self {
            category,
            kind: Some(kind),
            source: Some(Box::new(self)),
            msg: msg.into(),
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, TextlockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_preserves_category_and_kind() {
        let err = TextlockError::with_kind(
            ErrorCategory::User,
            ErrorKind::TruncatedInput,
            "input likely truncated",
        )
        .with_context("failed to decrypt");

        assert_eq!(err.category, ErrorCategory::User);
        assert_eq!(err.kind, Some(ErrorKind::TruncatedInput));
        assert_eq!(err.message(), "failed to decrypt");
        assert_eq!(
            err.source_error().map(|s| s.to_string()),
            Some("input likely truncated".to_string())
        );
    }

    #[test]
    fn test_reclassify_keeps_original_in_chain() {
        let err = TextlockError::with_kind(
            ErrorCategory::User,
            ErrorKind::AuthenticationFailed,
            "bad passphrase",
        )
        .reclassify(ErrorKind::WrongPasswordOrInvalidCiphertext, "wrong password");

        assert_eq!(err.kind, Some(ErrorKind::WrongPasswordOrInvalidCiphertext));
        let inner = err
            .source_error()
            .and_then(|s| s.downcast_ref::<TextlockError>())
            .unwrap();
        assert_eq!(inner.kind, Some(ErrorKind::AuthenticationFailed));
    }

    #[test]
    fn test_new_has_no_kind() {
        let err = TextlockError::new(ErrorCategory::Internal, "boom");
        assert_eq!(err.kind, None);
        assert!(err.source_error().is_none());
        assert_eq!(err.to_string(), "boom");
    }
}
