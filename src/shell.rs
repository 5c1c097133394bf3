//! Interactive form session
//!
//! A line-oriented front end for [`CipherForm`]. The form lives for the
//! whole session, so the result of one operation stays on display for
//! the next (e.g. encrypt, then decrypt the shown ciphertext).

use std::io::{BufRead, Write};

use tracing::debug;

use crate::error::{ErrorCategory, ErrorKind, Result, TextlockError};
use crate::file_ops::TextSource;
use crate::form::CipherForm;
use crate::passphrase::PassphraseReader;
use crate::primitive::CipherPrimitive;
use crate::resolver::Operation;

const HELP: &str = "\
commands:
  text <value>   set the text field (no value clears it)
  file <path>    load a text file; it takes precedence over the text field
  unfile         unload the file
  password       enter the password
  encrypt        encrypt the file or text
  decrypt        decrypt the file, text, or the displayed result
  show           print the displayed result
  save           save the displayed result to a timestamped file
  clear          clear text, file and result
  status         show what the form currently holds
  help           show this help
  quit           leave";

pub struct Shell<'a, P, R, W> {
    form: CipherForm<P>,
    passwords: &'a mut dyn PassphraseReader,
    source: &'a dyn TextSource,
    input: R,
    output: W,
}

impl<'a, P, R, W> Shell<'a, P, R, W>
where
    P: CipherPrimitive,
    R: BufRead,
    W: Write,
{
    pub fn new(
        form: CipherForm<P>,
        passwords: &'a mut dyn PassphraseReader,
        source: &'a dyn TextSource,
        input: R,
        output: W,
    ) -> Self {
        Self {
            form,
            passwords,
            source,
            input,
            output,
        }
    }

    pub fn form(&self) -> &CipherForm<P> {
        &self.form
    }

    /// Process commands until `quit` or end of input.
    pub fn run(&mut self) -> Result<()> {
        let mut line = String::new();
        loop {
            self.write("textlock> ")?;
            self.output.flush().map_err(output_error)?;

            line.clear();
            let n = self.input.read_line(&mut line).map_err(|e| {
                TextlockError::with_kind_and_source(
                    ErrorCategory::Internal,
                    ErrorKind::Io,
                    "failed to read command",
                    e,
                )
            })?;
            if n == 0 {
                self.write("\n")?;
                return Ok(());
            }

            let line = line.trim_end_matches(['\r', '\n']);
            let (command, arg) = match line.trim_start().split_once(' ') {
                Some((command, arg)) => (command, arg),
                None => (line.trim(), ""),
            };
            debug!(command, "shell command");

            let posted_before = self.form.notices().posted();
            match command {
                "" => continue,
                "quit" | "exit" => return Ok(()),
                "help" => self.writeln(HELP)?,
                "text" => self.form.set_text(arg),
                "file" if arg.trim().is_empty() => self.writeln("usage: file <path>")?,
                "file" => self.form.load_file(arg.trim()),
                "unfile" => self.form.unload_file(),
                "password" => match self.passwords.read_passphrase() {
                    Ok(password) => self.form.set_password(password),
                    Err(e) => self.writeln(&format!("error: {}", e))?,
                },
                "encrypt" => self.operate(Operation::Encrypt)?,
                "decrypt" => self.operate(Operation::Decrypt)?,
                "show" => {
                    let shown = self.form.result().to_string();
                    self.writeln(&shown)?;
                }
                "save" => {
                    // Outcome is reported through the notice.
                    let _ = self.form.save_result();
                }
                "clear" => self.form.clear(),
                "status" => self.status()?,
                other => self.writeln(&format!("unknown command: {} (try help)", other))?,
            }

            // Only report what this command posted.
            if self.form.notices().posted() != posted_before {
                if let Some(notice) = self.form.notices().visible() {
                    let rendered = notice.to_string();
                    self.writeln(&rendered)?;
                }
            }
        }
    }

    fn operate(&mut self, operation: Operation) -> Result<()> {
        let result = self.form.run(operation, self.source);
        if let Some(text) = result.text() {
            self.writeln(text)?;
        }
        Ok(())
    }

    fn status(&mut self) -> Result<()> {
        let file = self
            .form
            .file()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none)".to_string());
        let summary = format!(
            "text: {} chars\nfile: {}\nresult: {} chars",
            self.form.text().chars().count(),
            file,
            self.form.result().chars().count()
        );
        self.writeln(&summary)
    }

    fn write(&mut self, s: &str) -> Result<()> {
        self.output.write_all(s.as_bytes()).map_err(output_error)
    }

    fn writeln(&mut self, s: &str) -> Result<()> {
        writeln!(self.output, "{}", s).map_err(output_error)
    }
}

fn output_error(e: std::io::Error) -> TextlockError {
    TextlockError::with_kind_and_source(
        ErrorCategory::Internal,
        ErrorKind::Io,
        "failed to write output",
        e,
    )
}
