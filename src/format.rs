//! Solidity formatting through an external command.
//!
//! The command reads the source on stdin and writes the formatted source to
//! stdout. A missing program is not fatal: generation still succeeds with the
//! unformatted text.
use anyhow::{anyhow, Context, Result};
use std::env;
use std::io::Write;
use std::process::{Command, Stdio};

pub const FORMATTER_ENV: &str = "LMGEN_FORMATTER";
pub const DEFAULT_FORMATTER: &str = "forge fmt --raw -";
/// Formatter value that turns formatting off.
pub const NO_FORMATTER: &str = "none";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatter {
    argv: Option<Vec<String>>,
}

impl Formatter {
    /// Resolve the command from the flag, then `LMGEN_FORMATTER`, then the default.
    pub fn resolve(flag: Option<&str>) -> Result<Self> {
        let env_value = env::var(FORMATTER_ENV).ok();
        let raw = flag
            .map(str::to_string)
            .or(env_value)
            .unwrap_or_else(|| DEFAULT_FORMATTER.to_string());
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() || raw.trim() == NO_FORMATTER {
            return Ok(Self::disabled());
        }
        let argv = shell_words::split(raw).with_context(|| format!("parse formatter command: {raw}"))?;
        if argv.is_empty() {
            return Err(anyhow!("formatter command is empty"));
        }
        Ok(Self { argv: Some(argv) })
    }

    pub fn disabled() -> Self {
        Self { argv: None }
    }

    pub fn format(&self, source: &str) -> Result<String> {
        let Some(argv) = &self.argv else {
            return Ok(source.to_string());
        };
        let program = match which::which(&argv[0]) {
            Ok(program) => program,
            Err(err) => {
                tracing::warn!(program = %argv[0], error = %err, "formatter not found; writing unformatted source");
                return Ok(source.to_string());
            }
        };

        let mut child = Command::new(&program)
            .args(&argv[1..])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("spawn formatter: {}", program.display()))?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(source.as_bytes())
                .context("write source to formatter stdin")?;
        }
        let output = child.wait_with_output().context("wait for formatter")?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "formatter failed with status {}: {}",
                output.status,
                stderr.trim()
            ));
        }
        tracing::debug!(
            input_bytes = source.len(),
            output_bytes = output.stdout.len(),
            "formatted source"
        );
        String::from_utf8(output.stdout).context("decode formatter stdout as UTF-8")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_disables_formatting() {
        let formatter = Formatter::parse("none").expect("parse");
        assert_eq!(formatter, Formatter::disabled());
        assert_eq!(formatter.format("contract X {}").expect("format"), "contract X {}");
    }

    #[test]
    fn quoted_arguments_are_split_like_a_shell() {
        let formatter = Formatter::parse("fmt --config 'a b.toml' -").expect("parse");
        assert_eq!(
            formatter.argv,
            Some(vec![
                "fmt".to_string(),
                "--config".to_string(),
                "a b.toml".to_string(),
                "-".to_string(),
            ])
        );
        assert!(Formatter::parse("fmt 'unterminated").is_err());
    }

    #[test]
    fn missing_program_leaves_source_untouched() {
        let formatter = Formatter::parse("lmgen-no-such-formatter-binary -").expect("parse");
        assert_eq!(formatter.format("a\n").expect("format"), "a\n");
    }

    #[cfg(unix)]
    #[test]
    fn source_is_piped_through_the_command() {
        let formatter = Formatter::parse("tr a-z A-Z").expect("parse");
        assert_eq!(formatter.format("contract x").expect("format"), "CONTRACT X");
    }
}
