use anyhow::{Context, Result, bail};
use log::{debug, info};
use std::{
    fs,
    path::Path,
    process::{Command, Stdio},
};

/// Tokenizer state for a shell-like command line.
#[derive(Debug, Default)]
struct Splitter {
    tokens: Vec<String>,
    current: String,
    quote: Option<char>,
    escaped: bool,
}

impl Splitter {
    fn step(mut self, c: char) -> Self {
        if self.escaped {
            self.current.push(c);
            self.escaped = false;
            return self;
        }
        match (self.quote, c) {
            (Some(q), c) if c == q => self.quote = None,
            (Some('"'), '\\') => self.escaped = true,
            (Some(_), c) => self.current.push(c),
            (None, '"' | '\'') => self.quote = Some(c),
            (None, '\\') => self.escaped = true,
            (None, c) if c.is_whitespace() => {
                if !self.current.is_empty() {
                    self.tokens.push(std::mem::take(&mut self.current));
                }
            }
            (None, c) => self.current.push(c),
        }
        self
    }

    fn finish(mut self) -> Result<Vec<String>> {
        if self.quote.is_some() {
            bail!("Unterminated quote in --command");
        }
        if self.escaped {
            self.current.push('\\');
        }
        if !self.current.is_empty() {
            self.tokens.push(self.current);
        }
        Ok(self.tokens)
    }
}

/// Splits a command line on whitespace, honoring single and double quotes.
/// A backslash escapes the next character outside quotes and inside double
/// quotes. Single quotes take everything literally.
pub fn split_command_line(input: &str) -> Result<Vec<String>> {
    input.chars().fold(Splitter::default(), Splitter::step).finish()
}

/// Runs `command_line` with inherited stdio and returns its exit code.
pub fn run_command(command_line: &str, cwd: &Path) -> Result<i32> {
    let parts = split_command_line(command_line)?;
    let Some((program, args)) = parts.split_first() else {
        bail!("Empty --command");
    };
    info!("Running release command: {}", command_line);
    let status = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .with_context(|| format!("Failed to run {}", program))?;
    debug!("Release command exited with {}", status);
    // Killed by a signal: no code
    Ok(status.code().unwrap_or(1))
}

/// Copies the manifest to the backup location.
pub fn ensure_backup(package: &Path, backup: &Path) -> Result<()> {
    if !package.exists() {
        bail!("package.json not found: {}", package.display());
    }
    debug!("Backing up {} to {}", package.display(), backup.display());
    fs::copy(package, backup)
        .with_context(|| format!("Failed to back up {}", package.display()))?;
    Ok(())
}

/// Copies the backup over the manifest.
pub fn restore_manifest(package: &Path, backup: &Path) -> Result<()> {
    if !backup.exists() {
        bail!("Backup file not found: {}", backup.display());
    }
    debug!("Restoring {} from {}", package.display(), backup.display());
    fs::copy(backup, package)
        .with_context(|| format!("Failed to restore {}", package.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn split(input: &str) -> Vec<String> {
        split_command_line(input).unwrap()
    }

    #[test]
    fn test_split_on_whitespace() {
        assert_eq!(split("npm  publish --tag next"), vec!["npm", "publish", "--tag", "next"]);
        assert_eq!(split("  "), Vec::<String>::new());
    }

    #[test]
    fn test_split_quotes() {
        assert_eq!(split(r#"sh -c "echo 'hi there'""#), vec!["sh", "-c", "echo 'hi there'"]);
        assert_eq!(split("echo 'a \"b\"'"), vec!["echo", "a \"b\""]);
        assert_eq!(split("echo pre'fix'post"), vec!["echo", "prefixpost"]);
    }

    #[test]
    fn test_split_escapes() {
        assert_eq!(split(r"echo a\ b"), vec!["echo", "a b"]);
        assert_eq!(split(r#"echo "a\"b""#), vec!["echo", "a\"b"]);
        assert_eq!(split(r"echo 'a\b'"), vec!["echo", r"a\b"]);
        assert_eq!(split(r"echo trailing\"), vec!["echo", r"trailing\"]);
    }

    #[test]
    fn test_split_unterminated_quote() {
        let err = split_command_line("echo \"oops").unwrap_err();
        assert_eq!(err.to_string(), "Unterminated quote in --command");
    }

    #[test]
    fn test_empty_command_is_rejected() {
        let temp = TempDir::new().unwrap();
        let err = run_command("   ", temp.path()).unwrap_err();
        assert_eq!(err.to_string(), "Empty --command");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_command_returns_exit_code() {
        let temp = TempDir::new().unwrap();
        assert_eq!(run_command("sh -c 'exit 3'", temp.path()).unwrap(), 3);
        assert_eq!(run_command("true", temp.path()).unwrap(), 0);
    }

    #[test]
    fn test_backup_and_restore() {
        let temp = TempDir::new().unwrap();
        let package = temp.path().join("package.json");
        let backup = temp.path().join(".package.json.release.bak");
        fs::write(&package, "original").unwrap();

        ensure_backup(&package, &backup).unwrap();
        fs::write(&package, "pruned").unwrap();
        restore_manifest(&package, &backup).unwrap();
        assert_eq!(fs::read_to_string(&package).unwrap(), "original");
    }

    #[test]
    fn test_restore_without_backup_fails() {
        let temp = TempDir::new().unwrap();
        let err = restore_manifest(&temp.path().join("package.json"), &temp.path().join("missing.bak"))
            .unwrap_err();
        assert!(err.to_string().starts_with("Backup file not found"));
    }

    #[test]
    fn test_backup_requires_manifest() {
        let temp = TempDir::new().unwrap();
        let err = ensure_backup(&temp.path().join("package.json"), &temp.path().join("b.bak")).unwrap_err();
        assert!(err.to_string().starts_with("package.json not found"));
    }
}
