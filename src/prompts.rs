//! Interactive prompt boundary.
//!
//! Feature modules talk to a [`Prompter`] so collection can be scripted in
//! tests; the terminal implementation sits on `dialoguer`. Validation failures
//! never leave this layer: the user is asked again until the rule passes.
use crate::chain::is_address;
use crate::util::parse_amount;
use anyhow::{anyhow, Context, Result};
use dialoguer::{Confirm, Input, MultiSelect, Select};
use rust_decimal::Decimal;

pub type Validator<'a> = &'a dyn Fn(&str) -> Result<(), String>;

pub trait Prompter {
    /// Pick one item; returns its index.
    fn select(&mut self, message: &str, items: &[String]) -> Result<usize>;
    /// Pick at least one item; returns the selected indices in list order.
    fn multi_select(&mut self, message: &str, items: &[String]) -> Result<Vec<usize>>;
    fn input(&mut self, message: &str, validate: Validator<'_>) -> Result<String>;
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool>;
}

/// Terminal prompts on stderr.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn select(&mut self, message: &str, items: &[String]) -> Result<usize> {
        Select::new()
            .with_prompt(message)
            .items(items)
            .default(0)
            .interact()
            .with_context(|| format!("prompt: {message}"))
    }

    fn multi_select(&mut self, message: &str, items: &[String]) -> Result<Vec<usize>> {
        loop {
            let picked = MultiSelect::new()
                .with_prompt(message)
                .items(items)
                .interact()
                .with_context(|| format!("prompt: {message}"))?;
            if !picked.is_empty() {
                return Ok(picked);
            }
            eprintln!("Select at least one entry (space to toggle, enter to confirm)");
        }
    }

    fn input(&mut self, message: &str, validate: Validator<'_>) -> Result<String> {
        Input::<String>::new()
            .with_prompt(message)
            .validate_with(|value: &String| validate(value.as_str()))
            .interact_text()
            .with_context(|| format!("prompt: {message}"))
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        Confirm::new()
            .with_prompt(message)
            .default(default)
            .interact()
            .with_context(|| format!("prompt: {message}"))
    }
}

/// Mark a prompt message as mandatory.
pub fn flag_as_required(message: &str, required: bool) -> String {
    if required {
        format!("{message}*")
    } else {
        message.to_string()
    }
}

pub fn validate_address(input: &str) -> Result<(), String> {
    if is_address(input.trim()) {
        Ok(())
    } else {
        Err("Enter a 0x-prefixed 20 byte hex address".to_string())
    }
}

pub fn validate_days(input: &str) -> Result<(), String> {
    match input.trim().parse::<u32>() {
        Ok(days) if days > 0 => Ok(()),
        _ => Err("Enter a whole number of days greater than zero".to_string()),
    }
}

pub fn validate_amount(input: &str) -> Result<(), String> {
    match parse_amount(input) {
        Ok(amount) if !amount.is_zero() => Ok(()),
        Ok(_) => Err("Amount must be greater than zero".to_string()),
        Err(err) => Err(err.to_string()),
    }
}

pub fn address_prompt(prompter: &mut dyn Prompter, message: &str) -> Result<String> {
    let value = prompter.input(&flag_as_required(message, true), &validate_address)?;
    Ok(value.trim().to_string())
}

pub fn days_prompt(prompter: &mut dyn Prompter, message: &str) -> Result<u32> {
    let value = prompter.input(&flag_as_required(message, true), &validate_days)?;
    value
        .trim()
        .parse()
        .map_err(|_| anyhow!("invalid day count {value:?}"))
}

pub fn amount_prompt(prompter: &mut dyn Prompter, message: &str) -> Result<Decimal> {
    let value = prompter.input(&flag_as_required(message, true), &validate_amount)?;
    parse_amount(&value)
}
