//! Identifier and folder naming.
//!
//! Contract names must be legal Solidity identifiers, so the date is suffixed;
//! folder names only need to sort chronologically, so the date is prefixed.
use crate::types::{PoolId, RunOptions};
use time::OffsetDateTime;

pub const MAX_TITLE_LEN: usize = 80;

/// Upper-case the first character of every word-run, dropping everything else
/// that is not an ASCII word character.
pub fn pascal_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut at_word_start = true;
    for ch in input.chars() {
        if is_word_char(ch) {
            if at_word_start {
                out.push(ch.to_ascii_uppercase());
            } else {
                out.push(ch);
            }
            at_word_start = false;
        } else {
            at_word_start = true;
        }
    }
    out
}

/// Derive the identifier fragment used in contract and folder names.
///
/// On top of [`pascal_case`], underscores are dropped and a leading digit gets a
/// `T` prefix so the fragment is a valid identifier on its own.
pub fn short_name(title: &str) -> String {
    let mut name: String = pascal_case(title)
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric())
        .collect();
    if !name.starts_with(|ch: char| ch.is_ascii_alphabetic()) {
        name.insert(0, 'T');
    }
    name
}

fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

pub fn contract_name(options: &RunOptions, pool: Option<PoolId>) -> String {
    let mut name = match pool {
        Some(pool) => format!("{pool}_"),
        None => String::new(),
    };
    name.push_str(options.feature.name_tag());
    name.push_str(&options.short_name);
    name.push('_');
    name.push_str(&options.date);
    name
}

pub fn folder_name(options: &RunOptions) -> String {
    format!(
        "{}_{}{}_{}",
        options.date,
        options.feature.name_tag(),
        options.pool,
        options.short_name
    )
}

/// Today's date as `YYYYMMDD`, in local time when the offset is known.
pub fn date_stamp() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    format!(
        "{:04}{:02}{:02}",
        now.year(),
        u8::from(now.month()),
        now.day()
    )
}

pub fn is_date_stamp(value: &str) -> bool {
    value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit())
}

/// Prompt-side title rule: non-empty and at most 80 characters once trimmed.
pub fn validate_title(input: &str) -> Result<(), String> {
    if input.is_empty() {
        return Err("Your title can't be empty".to_string());
    }
    if input.trim().chars().count() > MAX_TITLE_LEN {
        return Err("Your title is too long".to_string());
    }
    Ok(())
}
