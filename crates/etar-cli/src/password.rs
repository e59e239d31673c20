//! Password resolution: `--password`, then `ENCRYPTION_PASSWORD`, then a prompt.
//!
//! clap folds the first two together (the flag carries `env`), so this module
//! only decides between an already-supplied value and the interactive prompt.

use anyhow::{bail, Context, Result};
use secrecy::SecretString;

pub const PASSWORD_ENV: &str = "ENCRYPTION_PASSWORD";

/// Use `supplied` if present, otherwise ask `prompt`. Empty passwords are
/// refused here; the cipher itself would accept them.
pub fn resolve<F>(supplied: Option<String>, prompt: F) -> Result<SecretString>
where
    F: FnOnce() -> std::io::Result<String>,
{
    let password = match supplied {
        Some(p) => p,
        None => prompt().context("reading password from terminal")?,
    };

    if password.is_empty() {
        bail!("password is required (use --password, {PASSWORD_ENV}, or the prompt)");
    }
    Ok(SecretString::from(password))
}

/// Prompt on the controlling terminal without echo.
pub fn prompt_terminal() -> std::io::Result<String> {
    rpassword::prompt_password("Enter password: ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_supplied_password_skips_prompt() {
        let pw = resolve(Some("from-flag".into()), || panic!("prompt must not run")).unwrap();
        assert_eq!(pw.expose_secret(), "from-flag");
    }

    #[test]
    fn test_prompt_when_not_supplied() {
        let pw = resolve(None, || Ok("typed".into())).unwrap();
        assert_eq!(pw.expose_secret(), "typed");
    }

    #[test]
    fn test_empty_password_rejected() {
        assert!(resolve(Some(String::new()), || Ok("unused".into())).is_err());
        assert!(resolve(None, || Ok(String::new())).is_err());
    }

    #[test]
    fn test_prompt_failure_propagates() {
        let err = resolve(None, || {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no tty"))
        })
        .unwrap_err();
        assert!(format!("{err:#}").contains("no tty"));
    }
}
