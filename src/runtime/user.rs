//! User interaction operations (confirmation prompts).

use anyhow::Result;

use super::RealRuntime;

use std::io::{self, BufRead, Write};

/// Ask a yes/no question on `output` and read the answer from `input`.
/// Anything other than y/yes (case-insensitive) counts as no.
pub(crate) fn confirm_with_io<R: BufRead, W: Write>(
    prompt: &str,
    input: &mut R,
    output: &mut W,
) -> Result<bool> {
    write!(output, "{} [y/N] ", prompt)?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;

    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

impl RealRuntime {
    pub(crate) fn confirm_impl(&self, prompt: &str) -> Result<bool> {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        confirm_with_io(prompt, &mut input, &mut io::stderr())
    }
}
