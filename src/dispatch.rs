//! Cipher dispatch
//!
//! Runs one resolved [`CipherRequest`] through a [`CipherPrimitive`] and
//! classifies the outcome. Every failure ends up as either
//! [`ErrorKind::WrongPasswordOrInvalidCiphertext`] or
//! [`ErrorKind::CipherError`], with the primitive's own error kept in the
//! source chain.

use tracing::{debug, warn};

use crate::error::{ErrorCategory, ErrorKind, TextlockError};
use crate::primitive::{CipherPrimitive, SecretboxPrimitive};
use crate::resolver::{CipherRequest, Operation};

/// Outcome of a single dispatch. Exactly one of success or failure.
#[derive(Debug)]
pub enum CipherResult {
    Success { text: String },
    Failure(TextlockError),
}

impl CipherResult {
    pub fn is_success(&self) -> bool {
        matches!(self, CipherResult::Success { .. })
    }

    /// The failure kind, or `None` on success.
    pub fn reason(&self) -> Option<ErrorKind> {
        match self {
            CipherResult::Success { .. } => None,
            CipherResult::Failure(err) => err.kind,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            CipherResult::Success { text } => Some(text),
            CipherResult::Failure(_) => None,
        }
    }

    pub fn into_result(self) -> crate::error::Result<String> {
        match self {
            CipherResult::Success { text } => Ok(text),
            CipherResult::Failure(err) => Err(err),
        }
    }
}

impl From<TextlockError> for CipherResult {
    fn from(err: TextlockError) -> Self {
        CipherResult::Failure(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchPolicy {
    /// Treat a decryption that yields no text as a wrong password rather
    /// than as a valid empty plaintext.
    pub empty_plaintext_is_failure: bool,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            empty_plaintext_is_failure: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CipherDispatcher<P = SecretboxPrimitive> {
    primitive: P,
    policy: DispatchPolicy,
}

impl<P: CipherPrimitive> CipherDispatcher<P> {
    pub fn new(primitive: P, policy: DispatchPolicy) -> Self {
        Self { primitive, policy }
    }

    pub fn primitive(&self) -> &P {
        &self.primitive
    }

    pub fn dispatch(&self, request: &CipherRequest) -> CipherResult {
        debug!(
            operation = %request.operation(),
            payload_len = request.payload().len(),
            "dispatching"
        );
        let result = match request.operation() {
            Operation::Encrypt => self.encrypt(request),
            Operation::Decrypt => self.decrypt(request),
        };
        if let CipherResult::Failure(err) = &result {
            warn!(operation = %request.operation(), kind = ?err.kind, "operation failed: {}", err);
        }
        result
    }

    fn encrypt(&self, request: &CipherRequest) -> CipherResult {
        match self.primitive.encrypt(request.payload(), request.password()) {
            Ok(text) => CipherResult::Success { text },
            Err(e) => e
                .reclassify(ErrorKind::CipherError, "encryption failed; please try again")
                .into(),
        }
    }

    fn decrypt(&self, request: &CipherRequest) -> CipherResult {
        let bytes = match self.primitive.decrypt(request.payload(), request.password()) {
            Ok(bytes) => bytes,
            Err(e) if e.kind == Some(ErrorKind::AuthenticationFailed) => {
                return wrong_password(Some(e));
            }
            Err(e) => {
                return e
                    .reclassify(
                        ErrorKind::CipherError,
                        "decryption failed; check the password and that the text was encrypted with textlock",
                    )
                    .into();
            }
        };

        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                return TextlockError::with_kind_and_source(
                    ErrorCategory::User,
                    ErrorKind::WrongPasswordOrInvalidCiphertext,
                    "wrong password or invalid ciphertext",
                    e.utf8_error(),
                )
                .into();
            }
        };

        if text.is_empty() && self.policy.empty_plaintext_is_failure {
            return wrong_password(None);
        }
        CipherResult::Success { text }
    }
}

fn wrong_password(source: Option<TextlockError>) -> CipherResult {
    let msg = "wrong password or invalid ciphertext";
    let err = match source {
        Some(e) => e.reclassify(ErrorKind::WrongPasswordOrInvalidCiphertext, msg),
        None => TextlockError::with_kind(
            ErrorCategory::User,
            ErrorKind::WrongPasswordOrInvalidCiphertext,
            msg,
        ),
    };
    CipherResult::Failure(err)
}
