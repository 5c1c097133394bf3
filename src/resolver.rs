//! Input resolution
//!
//! Decides what text an operation works on and with which password,
//! given the current contents of the form. Precedence for the payload is
//! loaded file, then the text field, then (decrypt only, if allowed) the
//! result currently on display.
//!
//! Resolution is two-phase when a file is loaded: [`InputResolver::resolve`]
//! hands back a [`PendingRead`], the caller reads the file however it
//! likes, and [`PendingRead::complete`] turns the outcome into a request.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use zeroize::Zeroizing;

use crate::error::{ErrorCategory, ErrorKind, Result, TextlockError};
use crate::file_ops;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Encrypt,
    Decrypt,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Encrypt => f.write_str("encrypt"),
            Operation::Decrypt => f.write_str("decrypt"),
        }
    }
}

/// A fully resolved unit of work: non-empty payload, non-empty password.
pub struct CipherRequest {
    operation: Operation,
    payload: String,
    password: Zeroizing<Vec<u8>>,
}

impl CipherRequest {
    /// Build a request, rejecting an empty password first and an empty
    /// payload second.
    pub fn new(
        operation: Operation,
        payload: impl Into<String>,
        password: Zeroizing<Vec<u8>>,
    ) -> Result<Self> {
        if password.is_empty() {
            return Err(missing_password());
        }
        let payload = payload.into();
        if payload.is_empty() {
            return Err(missing_payload(operation));
        }
        Ok(Self {
            operation,
            payload,
            password,
        })
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn password(&self) -> &[u8] {
        &self.password
    }
}

impl fmt::Debug for CipherRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherRequest")
            .field("operation", &self.operation)
            .field("payload_len", &self.payload.len())
            .finish_non_exhaustive()
    }
}

/// Snapshot of the form fields an operation reads.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormInput<'a> {
    pub text: &'a str,
    pub file: Option<&'a Path>,
    pub previous_result: Option<&'a str>,
    pub password: &'a [u8],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverPolicy {
    /// When decrypting with an empty text field and no file, fall back to
    /// the result currently on display (e.g. the ciphertext just produced).
    pub allow_result_fallback_on_decrypt: bool,
}

impl Default for ResolverPolicy {
    fn default() -> Self {
        Self {
            allow_result_fallback_on_decrypt: true,
        }
    }
}

#[derive(Debug)]
pub enum Resolution {
    Ready(CipherRequest),
    AwaitFile(PendingRead),
}

/// A resolution waiting on the contents of a loaded file.
///
/// Consumed by [`complete`](Self::complete), so each resolution finishes
/// at most once.
pub struct PendingRead {
    operation: Operation,
    path: PathBuf,
    password: Zeroizing<Vec<u8>>,
}

impl PendingRead {
    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Finish resolution with the outcome of reading [`path`](Self::path).
    ///
    /// A failed read is reported as [`ErrorKind::FileRead`]; there is no
    /// fallback to other fields.
    pub fn complete(self, read: io::Result<String>) -> Result<CipherRequest> {
        let contents = read.map_err(|e| file_ops::read_error(&self.path, e))?;
        debug!(operation = %self.operation, path = %self.path.display(), "file payload loaded");
        CipherRequest::new(self.operation, contents.trim(), self.password)
    }
}

impl fmt::Debug for PendingRead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingRead")
            .field("operation", &self.operation)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InputResolver {
    policy: ResolverPolicy,
}

impl InputResolver {
    pub fn new(policy: ResolverPolicy) -> Self {
        Self { policy }
    }

    /// Resolve the payload and password for `operation`.
    ///
    /// The password is taken verbatim and checked before anything else.
    pub fn resolve(&self, operation: Operation, input: &FormInput<'_>) -> Result<Resolution> {
        if input.password.is_empty() {
            return Err(missing_password());
        }
        let password = Zeroizing::new(input.password.to_vec());

        if let Some(path) = input.file {
            return Ok(Resolution::AwaitFile(PendingRead {
                operation,
                path: path.to_path_buf(),
                password,
            }));
        }

        let typed = input.text.trim();
        let payload = match operation {
            Operation::Encrypt => typed,
            Operation::Decrypt if !typed.is_empty() => typed,
            Operation::Decrypt if self.policy.allow_result_fallback_on_decrypt => {
                debug!("text field empty, decrypting displayed result");
                input.previous_result.map(str::trim).unwrap_or_default()
            }
            Operation::Decrypt => typed,
        };

        CipherRequest::new(operation, payload, password).map(Resolution::Ready)
    }
}

fn missing_password() -> TextlockError {
    TextlockError::with_kind(
        ErrorCategory::User,
        ErrorKind::MissingPassword,
        "please enter a password",
    )
}

fn missing_payload(operation: Operation) -> TextlockError {
    let msg = match operation {
        Operation::Encrypt => "please enter some text or load a file",
        Operation::Decrypt => {
            "there is no ciphertext; paste it into the text field, load a file or encrypt first"
        }
    };
    TextlockError::with_kind(ErrorCategory::User, ErrorKind::MissingPayload, msg)
}
