//! Interactive run plan input

use crate::config::RunPlan;
use crate::{Error, Result};
use std::io::{BufRead, Write};

/// Ask for a number until a valid one is entered or input ends
fn ask_number<I: BufRead, O: Write>(
    input: &mut I,
    output: &mut O,
    question: &str,
    min: u64,
) -> Result<u64> {
    loop {
        write!(output, "{}", question)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(Error::Config(format!(
                "No answer given for \"{}\"",
                question.trim_end_matches(": ")
            )));
        }

        match line.trim().parse::<u64>() {
            Ok(value) if value >= min => return Ok(value),
            _ => writeln!(output, "Please enter a whole number of at least {}.", min)?,
        }
    }
}

/// Fill in whichever run plan values were not given on the command line
pub fn read_run_plan<I: BufRead, O: Write>(
    input: &mut I,
    output: &mut O,
    transactions_per_wallet: Option<u64>,
    wait_seconds: Option<u64>,
) -> Result<RunPlan> {
    let transactions = match transactions_per_wallet {
        Some(n) => n,
        None => ask_number(
            input,
            output,
            "Enter the number of transactions per wallet: ",
            1,
        )?,
    };

    let wait = match wait_seconds {
        Some(s) => s,
        None => ask_number(
            input,
            output,
            "Enter the time between transactions (in seconds): ",
            0,
        )?,
    };

    Ok(RunPlan::new(transactions, wait))
}
