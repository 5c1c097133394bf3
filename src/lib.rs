//! textlock - password-based text encryption
//!
//! Text or a small text file goes in, a copy-pasteable `textlock1:...`
//! string comes out, and the same password turns it back. Key derivation
//! is scrypt; encryption is NaCl secretbox (XSalsa20Poly1305).

#![forbid(unsafe_code)]

pub mod config;
pub mod dispatch;
pub mod download;
pub mod error;
pub mod file_ops;
pub mod form;
pub mod notice;
pub mod passphrase;
pub mod primitive;
pub mod resolver;
pub mod secretcrypt;
pub mod shell;
pub mod varmor;

pub use config::Settings;
pub use dispatch::{CipherDispatcher, CipherResult, DispatchPolicy};
pub use error::{ErrorCategory, ErrorKind, Result, TextlockError};
pub use form::{CipherForm, FormState, Submission};
pub use primitive::{CipherPrimitive, SecretboxPrimitive};
pub use resolver::{CipherRequest, InputResolver, Operation, ResolverPolicy};
