//! textlock CLI - password-based text encryption
//!
//! One-shot `encrypt` / `decrypt` commands print the result on stdout;
//! `shell` runs an interactive form session.

use clap::{Args, Parser, Subcommand};
use std::error::Error as StdError;
use std::io;
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use textlock::config::Settings;
use textlock::dispatch::DispatchPolicy;
use textlock::download::DEFAULT_PREFIX;
use textlock::error::{ErrorCategory, Result, TextlockError};
use textlock::file_ops::FsTextSource;
use textlock::form::CipherForm;
use textlock::passphrase::{PassphraseReader, ReaderPassphraseReader, TerminalPassphraseReader};
use textlock::primitive::SecretboxPrimitive;
use textlock::resolver::{Operation, ResolverPolicy};
use textlock::shell::Shell;

#[derive(Parser)]
#[command(name = "textlock")]
#[command(version)]
#[command(about = "Password-based text encryption.", long_about = None)]
struct Cli {
    /// Read the password from stdin (verbatim, up to end of input) instead of from the terminal
    #[arg(long, global = true)]
    passphrase_stdin: bool,

    /// Never decrypt the previously displayed result when the text field is empty
    #[arg(long, global = true, env = "TEXTLOCK_NO_RESULT_FALLBACK")]
    no_result_fallback: bool,

    /// Accept a decryption that yields empty text instead of reporting a wrong password
    #[arg(long, global = true, env = "TEXTLOCK_ALLOW_EMPTY_PLAINTEXT")]
    allow_empty_plaintext: bool,

    /// Directory saved results are written to
    #[arg(long, global = true, env = "TEXTLOCK_SAVE_DIR", value_name = "DIR", default_value = ".")]
    save_dir: PathBuf,

    /// File name prefix for saved results
    #[arg(long, global = true, env = "TEXTLOCK_SAVE_PREFIX", value_name = "PREFIX", default_value = DEFAULT_PREFIX)]
    save_prefix: String,

    /// Seconds a status message stays visible in the shell
    #[arg(long, global = true, value_name = "SECS", default_value_t = 5)]
    notice_ttl: u64,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "error")]
    log_level: String,

    /// Output logs as JSON instead of human-readable
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt text or a text file
    #[command(alias = "e")]
    Encrypt(OperationArgs),

    /// Decrypt text or a text file
    #[command(alias = "d")]
    Decrypt(OperationArgs),

    /// Interactive session; the result stays on display between commands
    Shell,
}

#[derive(Args)]
struct OperationArgs {
    /// Text to process
    #[arg(short, long, value_name = "TEXT")]
    text: Option<String>,

    /// Text file to process; takes precedence over --text
    #[arg(short, long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Also save the result to a timestamped file
    #[arg(short, long)]
    save: bool,
}

impl Cli {
    fn settings(&self) -> Settings {
        Settings {
            resolver: ResolverPolicy {
                allow_result_fallback_on_decrypt: !self.no_result_fallback,
            },
            dispatch: DispatchPolicy {
                empty_plaintext_is_failure: !self.allow_empty_plaintext,
            },
            save_dir: self.save_dir.clone(),
            save_prefix: self.save_prefix.clone(),
            notice_ttl: Duration::from_secs(self.notice_ttl),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.json_logs);
    let settings = cli.settings();

    let result = match &cli.command {
        Commands::Encrypt(args) => {
            let mut reader = get_passphrase_reader(cli.passphrase_stdin);
            run_once(Operation::Encrypt, args, &settings, &mut *reader)
        }
        Commands::Decrypt(args) => {
            let mut reader = get_passphrase_reader(cli.passphrase_stdin);
            run_once(Operation::Decrypt, args, &settings, &mut *reader)
        }
        Commands::Shell => run_shell(&settings, cli.passphrase_stdin),
    };

    if let Err(e) = result {
        tracing::debug!(category = ?e.category, kind = ?e.kind, "command failed");
        eprintln!("Error: {}", render_chain(&e));
        process::exit(1);
    }
}

fn run_once(
    operation: Operation,
    args: &OperationArgs,
    settings: &Settings,
    passwords: &mut dyn PassphraseReader,
) -> Result<()> {
    let mut form = CipherForm::new(SecretboxPrimitive, settings);
    if let Some(text) = &args.text {
        form.set_text(text.as_str());
    }
    if let Some(file) = &args.file {
        form.load_file(file);
    }
    form.set_password(passwords.read_passphrase()?);

    let text = form.run(operation, &FsTextSource).into_result()?;
    println!("{}", text);

    if args.save {
        let path = form.save_result()?;
        eprintln!("saved to {}", path.display());
    }
    Ok(())
}

fn run_shell(settings: &Settings, passphrase_stdin: bool) -> Result<()> {
    if passphrase_stdin {
        return Err(TextlockError::new(
            ErrorCategory::User,
            "--passphrase-stdin cannot be combined with shell; stdin carries the commands",
        ));
    }
    let mut passwords = TerminalPassphraseReader;
    let stdin = io::stdin();
    let mut shell = Shell::new(
        CipherForm::new(SecretboxPrimitive, settings),
        &mut passwords,
        &FsTextSource,
        stdin.lock(),
        io::stdout(),
    );
    shell.run()
}

fn get_passphrase_reader(use_stdin: bool) -> Box<dyn PassphraseReader> {
    if use_stdin {
        Box::new(ReaderPassphraseReader::new(Box::new(io::stdin())))
    } else {
        Box::new(TerminalPassphraseReader)
    }
}

fn init_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries results only.
    if json {
        registry
            .with(fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(io::stderr))
            .init();
    }
}

/// `outer: inner: innermost`
fn render_chain(err: &TextlockError) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(s) = source {
        rendered.push_str(": ");
        rendered.push_str(&s.to_string());
        source = s.source();
    }
    rendered
}
