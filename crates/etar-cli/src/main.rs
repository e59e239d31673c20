//! encrypt-tar: password-based file encryption/decryption
//!
//! Usage:
//!   encrypt-tar --encrypt --input <file> --output <file> [--password <pw>]
//!   encrypt-tar --decrypt --input <file> --output <file> [--password <pw>]
//!
//! The password comes from `--password`, else `ENCRYPTION_PASSWORD`, else an
//! interactive prompt.

mod output;
mod password;

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{debug, info};

use etar_core::{EtarConfig, LogFormat, Mode};
use etar_crypto::{CryptoError, FileCipher, KdfParams};

use crate::output::AtomicOutput;

/// Exit status for a failed authentication check
const EXIT_AUTH_FAILED: u8 = 2;

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "encrypt-tar",
    version,
    about = "File encryption/decryption utility",
    long_about = "encrypt-tar: encrypt or decrypt a single file with a password \
                  (PBKDF2-HMAC-SHA256 + AES-256-GCM)"
)]
#[command(group(ArgGroup::new("mode").required(true).args(["encrypt", "decrypt"])))]
struct Cli {
    /// Encrypt the input file
    #[arg(long)]
    encrypt: bool,

    /// Decrypt the input file
    #[arg(long)]
    decrypt: bool,

    /// File to read
    #[arg(long, short = 'i')]
    input: PathBuf,

    /// File to write (replaced only after the operation succeeds)
    #[arg(long, short = 'o')]
    output: PathBuf,

    /// Password (prompted for when neither this nor the env var is set)
    #[arg(long, short = 'p', env = password::PASSWORD_ENV, hide_env_values = true)]
    password: Option<String>,

    /// Path to etar.toml configuration file
    #[arg(long, short = 'c', env = "ETAR_CONFIG")]
    config: Option<PathBuf>,

    /// Streaming chunk size in bytes (overrides config)
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Log level (trace, debug, info, warn, error; overrides config)
    #[arg(long, env = "ETAR_LOG")]
    log: Option<String>,

    /// Log format (text, json; overrides config)
    #[arg(long, env = "ETAR_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// No progress bar or status message
    #[arg(long, short = 'q')]
    quiet: bool,
}

impl Cli {
    fn mode(&self) -> Mode {
        if self.encrypt {
            Mode::Encrypt
        } else {
            Mode::Decrypt
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            if is_authentication_failure(&e) {
                eprintln!("The password is wrong or the file is corrupted; no output was written.");
                ExitCode::from(EXIT_AUTH_FAILED)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref(), cli.chunk_size)?;

    let level = cli.log.as_deref().unwrap_or(&config.log.level);
    init_logging(level, cli.log_format.unwrap_or(config.log.format));

    let mode = cli.mode();
    info!(
        version = env!("CARGO_PKG_VERSION"),
        %mode,
        input = %cli.input.display(),
        output = %cli.output.display(),
        "encrypt-tar starting"
    );

    ensure_distinct(&cli.input, &cli.output)?;

    let password = password::resolve(cli.password.clone(), password::prompt_terminal)?;

    let cipher = FileCipher::new(KdfParams::default()).with_chunk_size(config.crypto.chunk_size);
    debug!(
        chunk_size = cipher.chunk_size(),
        iterations = cipher.kdf_params().iterations,
        "cipher configured"
    );

    let input = File::open(&cli.input)
        .with_context(|| format!("opening input: {}", cli.input.display()))?;
    let input_len = input
        .metadata()
        .with_context(|| format!("reading metadata: {}", cli.input.display()))?
        .len();

    let pb = make_progress_bar(input_len, mode, cli.quiet);
    let reader = pb.wrap_read(BufReader::new(input));

    let mut out = AtomicOutput::create(&cli.output)?;
    let writer = BufWriter::new(out.file_mut());

    let result = match mode {
        Mode::Encrypt => cipher.encrypt(reader, writer, &password),
        Mode::Decrypt => cipher.decrypt(reader, writer, &password),
    };
    pb.finish_and_clear();

    let bytes = result.with_context(|| format!("failed to {mode} {}", cli.input.display()))?;
    out.commit()?;

    info!(plaintext_bytes = bytes, %mode, "done");
    if !cli.quiet {
        println!(
            "File {} successfully and saved to {}",
            mode.past_tense(),
            cli.output.display()
        );
    }
    Ok(())
}

// ── Config loading ────────────────────────────────────────────────────────────

/// Load the config file (if any) and apply command-line overrides on top.
fn load_config(path: Option<&Path>, chunk_size: Option<usize>) -> Result<EtarConfig> {
    let mut config = match path {
        Some(path) => EtarConfig::load(path)
            .with_context(|| format!("loading config: {}", path.display()))?,
        None => EtarConfig::default(),
    };

    if let Some(chunk_size) = chunk_size {
        config.crypto.chunk_size = chunk_size;
        config.validate().context("invalid --chunk-size")?;
    }
    Ok(config)
}

fn init_logging(level: &str, format: LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Refuse to overwrite the input with its own transform.
fn ensure_distinct(input: &Path, output: &Path) -> Result<()> {
    if !output.exists() {
        return Ok(());
    }
    let a = input
        .canonicalize()
        .with_context(|| format!("resolving input: {}", input.display()))?;
    let b = output
        .canonicalize()
        .with_context(|| format!("resolving output: {}", output.display()))?;
    if a == b {
        bail!("input and output are the same file: {}", a.display());
    }
    Ok(())
}

fn is_authentication_failure(err: &anyhow::Error) -> bool {
    err.downcast_ref::<CryptoError>()
        .is_some_and(CryptoError::is_authentication)
}

fn make_progress_bar(total: u64, mode: Mode, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total);
    if let Ok(style) =
        ProgressStyle::with_template("{prefix:.bold} [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
    {
        pb.set_style(style.progress_chars("=>-"));
    }
    pb.set_prefix(mode.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
