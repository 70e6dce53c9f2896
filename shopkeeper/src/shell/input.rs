//! Line-oriented input helpers for the interactive shell.
//!
//! Every reader prompts, reads one line, and re-prompts until the input
//! parses. `Ok(None)` means the input stream ended, which the menus treat
//! as leaving the current screen.

use std::io::{self, BufRead, Write};

use chrono::NaiveDate;

use crate::types::Money;

/// Prompt and read one trimmed line. `None` when the stream is exhausted.
///
/// # Errors
///
/// Returns any I/O error from the underlying reader or writer.
pub fn read_line<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> io::Result<Option<String>> {
    write!(output, "{prompt}")?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Prompt until a non-empty line arrives.
///
/// # Errors
///
/// Returns any I/O error from the underlying reader or writer.
pub fn read_nonempty<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> io::Result<Option<String>> {
    loop {
        let Some(line) = read_line(input, output, prompt)? else {
            return Ok(None);
        };
        if !line.is_empty() {
            return Ok(Some(line));
        }
        writeln!(output, "A value is required.")?;
    }
}

/// Prompt until a menu choice in `0..=max` arrives.
///
/// # Errors
///
/// Returns any I/O error from the underlying reader or writer.
pub fn read_choice<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
    max: usize,
) -> io::Result<Option<usize>> {
    loop {
        let Some(line) = read_line(input, output, prompt)? else {
            return Ok(None);
        };
        match line.parse::<usize>() {
            Ok(choice) if choice <= max => return Ok(Some(choice)),
            _ => writeln!(output, "Enter a number between 0 and {max}.")?,
        }
    }
}

/// Prompt until an unsigned quantity arrives.
///
/// # Errors
///
/// Returns any I/O error from the underlying reader or writer.
pub fn read_u32<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> io::Result<Option<u32>> {
    loop {
        let Some(line) = read_line(input, output, prompt)? else {
            return Ok(None);
        };
        match line.parse::<u32>() {
            Ok(value) => return Ok(Some(value)),
            Err(_) => writeln!(output, "Enter a whole number.")?,
        }
    }
}

/// Prompt until a signed adjustment arrives.
///
/// # Errors
///
/// Returns any I/O error from the underlying reader or writer.
pub fn read_i64<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> io::Result<Option<i64>> {
    loop {
        let Some(line) = read_line(input, output, prompt)? else {
            return Ok(None);
        };
        match line.parse::<i64>() {
            Ok(value) => return Ok(Some(value)),
            Err(_) => writeln!(output, "Enter a whole number, negative to deduct.")?,
        }
    }
}

/// Prompt until a dollar amount such as `12.50` arrives.
///
/// # Errors
///
/// Returns any I/O error from the underlying reader or writer.
pub fn read_money<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> io::Result<Option<Money>> {
    loop {
        let Some(line) = read_line(input, output, prompt)? else {
            return Ok(None);
        };
        match line.parse::<Money>() {
            Ok(amount) => return Ok(Some(amount)),
            Err(error) => writeln!(output, "{error}")?,
        }
    }
}

/// Prompt until a `YYYY-MM-DD` date arrives.
///
/// # Errors
///
/// Returns any I/O error from the underlying reader or writer.
pub fn read_date<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> io::Result<Option<NaiveDate>> {
    loop {
        let Some(line) = read_line(input, output, prompt)? else {
            return Ok(None);
        };
        match NaiveDate::parse_from_str(&line, "%Y-%m-%d") {
            Ok(date) => return Ok(Some(date)),
            Err(_) => writeln!(output, "Enter a date as YYYY-MM-DD.")?,
        }
    }
}
