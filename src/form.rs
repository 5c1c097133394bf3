//! The encryption form
//!
//! [`CipherForm`] owns everything a user sees and edits: the text field,
//! an optionally loaded file, the password, the displayed result and the
//! status notice. It resolves input, dispatches, and updates the display
//! according to the outcome.
//!
//! The form is gated: while an operation is in flight (a file read is
//! pending) further submissions are rejected with
//! [`ErrorKind::OperationInFlight`].

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::debug;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::dispatch::{CipherDispatcher, CipherResult};
use crate::download;
use crate::error::{ErrorCategory, ErrorKind, Result, TextlockError};
use crate::file_ops::TextSource;
use crate::notice::NoticeBoard;
use crate::primitive::{CipherPrimitive, SecretboxPrimitive};
use crate::resolver::{FormInput, InputResolver, Operation, PendingRead, Resolution};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Busy,
}

/// What [`CipherForm::submit`] produced.
#[derive(Debug)]
pub enum Submission {
    Finished(CipherResult),
    /// The loaded file must be read and handed to [`CipherForm::finish_read`].
    /// Dropping it leaves the form `Busy` until [`CipherForm::clear`].
    Reading(PendingRead),
}

pub struct CipherForm<P = SecretboxPrimitive> {
    resolver: InputResolver,
    dispatcher: CipherDispatcher<P>,
    text: String,
    file: Option<PathBuf>,
    password: Zeroizing<Vec<u8>>,
    result: String,
    notices: NoticeBoard,
    state: FormState,
    save_dir: PathBuf,
    save_prefix: String,
}

impl<P: CipherPrimitive> CipherForm<P> {
    pub fn new(primitive: P, settings: &Settings) -> Self {
        Self {
            resolver: InputResolver::new(settings.resolver),
            dispatcher: CipherDispatcher::new(primitive, settings.dispatch),
            text: String::new(),
            file: None,
            password: Zeroizing::new(Vec::new()),
            result: String::new(),
            notices: NoticeBoard::new(settings.notice_ttl),
            state: FormState::Idle,
            save_dir: settings.save_dir.clone(),
            save_prefix: settings.save_prefix.clone(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// The result currently on display.
    pub fn result(&self) -> &str {
        &self.result
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn dispatcher(&self) -> &CipherDispatcher<P> {
        &self.dispatcher
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn set_password(&mut self, password: Zeroizing<Vec<u8>>) {
        self.password = password;
    }

    pub fn load_file(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.notices.success(format!("loaded file: {}", name));
        self.file = Some(path);
    }

    pub fn unload_file(&mut self) {
        self.file = None;
    }

    /// Start `operation` on the current form contents.
    pub fn submit(&mut self, operation: Operation) -> Submission {
        if self.state == FormState::Busy {
            let err = TextlockError::with_kind(
                ErrorCategory::User,
                ErrorKind::OperationInFlight,
                "another operation is still in progress",
            );
            self.notices.error(err.message());
            return Submission::Finished(CipherResult::Failure(err));
        }

        let input = FormInput {
            text: &self.text,
            file: self.file.as_deref(),
            previous_result: Some(self.result.as_str()).filter(|r| !r.is_empty()),
            password: &self.password,
        };
        let resolution = match self.resolver.resolve(operation, &input) {
            Ok(resolution) => resolution,
            Err(e) => return Submission::Finished(self.settle(operation, false, e.into())),
        };

        self.state = FormState::Busy;
        match resolution {
            Resolution::Ready(request) => {
                let result = self.dispatcher.dispatch(&request);
                Submission::Finished(self.settle(operation, false, result))
            }
            Resolution::AwaitFile(pending) => {
                debug!(operation = %operation, path = %pending.path().display(), "awaiting file");
                Submission::Reading(pending)
            }
        }
    }

    /// Complete a submission that was waiting on a file.
    pub fn finish_read(
        &mut self,
        pending: PendingRead,
        read: std::io::Result<String>,
    ) -> CipherResult {
        let operation = pending.operation();
        let result = match pending.complete(read) {
            Ok(request) => self.dispatcher.dispatch(&request),
            Err(e) => e.into(),
        };
        self.settle(operation, true, result)
    }

    /// Submit and, if a file is loaded, read it through `source` and finish.
    pub fn run(&mut self, operation: Operation, source: &dyn TextSource) -> CipherResult {
        match self.submit(operation) {
            Submission::Finished(result) => result,
            Submission::Reading(pending) => {
                let read = source.read_text(pending.path());
                self.finish_read(pending, read)
            }
        }
    }

    fn settle(
        &mut self,
        operation: Operation,
        from_file: bool,
        result: CipherResult,
    ) -> CipherResult {
        self.state = FormState::Idle;
        match &result {
            CipherResult::Success { text } => {
                self.result = text.clone();
                let msg = match (operation, from_file) {
                    (Operation::Encrypt, true) => {
                        self.text.clear();
                        "file encrypted; save the result to decrypt it later"
                    }
                    (Operation::Encrypt, false) => "text encrypted",
                    (Operation::Decrypt, _) => "text decrypted",
                };
                self.notices.success(msg);
            }
            CipherResult::Failure(err) => self.notices.error(err.message()),
        }
        result
    }

    /// Save the displayed result under a timestamped name.
    pub fn save_result(&mut self) -> Result<PathBuf> {
        self.save_result_at(&Local::now())
    }

    pub fn save_result_at(&mut self, at: &DateTime<Local>) -> Result<PathBuf> {
        let saved = match self.result.trim() {
            "" => Err(TextlockError::with_kind(
                ErrorCategory::User,
                ErrorKind::NothingToSave,
                "nothing to save; encrypt or decrypt something first",
            )),
            text => download::save(&self.save_dir, &self.save_prefix, text, at),
        };
        match &saved {
            Ok(path) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                self.notices.success(format!("saved file: {}", name));
            }
            Err(e) => self.notices.error(e.message()),
        }
        saved
    }

    /// Reset text, file and result. The password is kept.
    ///
    /// Also returns the form to `Idle`, abandoning a read that was never
    /// finished.
    pub fn clear(&mut self) {
        if self.state == FormState::Busy {
            debug!("abandoning pending file read");
        }
        self.state = FormState::Idle;
        self.text.clear();
        self.file = None;
        self.result.clear();
        self.notices.success("fields cleared");
    }
}
