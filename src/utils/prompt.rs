// Values from the environment, or asked for on the terminal
use std::io::{self, BufRead, Write};

use crate::errors::Result;

/// Returns `name` from the lookup when set, otherwise prompts on stdin.
///
/// An empty answer falls back to `default`.
pub fn get_arg<F>(lookup: &F, name: &str, prompt: &str, default: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(name) {
        return Ok(value);
    }
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    ask(&mut input, &mut output, prompt, default)
}

pub fn ask<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
    default: &str,
) -> Result<String> {
    if default.is_empty() {
        write!(output, "{}: ", prompt)?;
    } else {
        write!(output, "{} [{}]: ", prompt, default)?;
    }
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let answer = line.trim();
    if answer.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(answer.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_environment_value_wins() -> anyhow::Result<()> {
        let lookup = |key: &str| (key == "CLIENT_PLAN").then(|| "pro".to_string());
        assert_eq!(get_arg(&lookup, "CLIENT_PLAN", "Enter client plan", "extra")?, "pro");
        Ok(())
    }

    #[test]
    fn test_empty_answer_uses_default() -> anyhow::Result<()> {
        let mut input = Cursor::new("\n");
        let mut output = Vec::new();
        let value = ask(&mut input, &mut output, "Enter client plan", "extra")?;

        assert_eq!(value, "extra");
        assert_eq!(String::from_utf8(output)?, "Enter client plan [extra]: ");
        Ok(())
    }

    #[test]
    fn test_answer_is_trimmed() -> anyhow::Result<()> {
        let mut input = Cursor::new("  discord \n");
        let mut output = Vec::new();
        assert_eq!(ask(&mut input, &mut output, "type", "")?, "discord");
        Ok(())
    }
}
