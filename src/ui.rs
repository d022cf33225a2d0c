// UI layer: provides a simple interactive menu using `dialoguer`.
// The functions are small and synchronous to make the flow easy to follow.
// No error reaching this layer is fatal; everything prints a message and
// falls back to the menu.

use crate::error::Error;
use crate::session::{LoginState, SessionController};
use crossterm::style::Stylize;
use dialoguer::{Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Main interactive menu. Receives the session controller and runs a
/// select loop until the user chooses "Exit".
///
/// Note: `Select::interact()` is keyboard-driven: arrow keys and Enter
/// choose an option.
pub fn main_menu(mut controller: SessionController) -> anyhow::Result<()> {
    if controller.state() == LoginState::Authenticated {
        println!("{}", "Resumed previous session from saved tokens.".green());
    }
    loop {
        let items = vec!["Login", "Check balance", "Check vouchers", "Exit"];
        let selection = Select::new().items(&items).default(0).interact()?;
        match selection {
            0 => handle_login(&mut controller)?,
            1 => handle_balance(&controller),
            2 => handle_vouchers(&controller),
            3 => {
                println!("Goodbye!");
                break;
            }
            _ => {}
        }
    }
    Ok(())
}

/// Login flow: phone number prompt, OTP request, OTP code prompt,
/// verification. Each half reports its own failure and returns to the
/// menu without touching the other.
fn handle_login(controller: &mut SessionController) -> anyhow::Result<()> {
    let phone: String = Input::new()
        .with_prompt("Phone number (0... or +62...)")
        .interact_text()?;

    let spinner = network_spinner("Requesting OTP...");
    let requested = controller.login(&phone);
    spinner.finish_and_clear();
    if let Err(e) = requested {
        report(&e);
        return Ok(());
    }
    println!("{}", "OTP sent, check your phone.".green());

    let code: String = Input::new().with_prompt("OTP code").interact_text()?;

    let spinner = network_spinner("Verifying OTP...");
    let verified = controller.verify_otp(&code);
    spinner.finish_and_clear();
    match verified {
        Ok(()) => println!("{}", "Login successful!".green()),
        Err(e) => report(&e),
    }
    Ok(())
}

fn handle_balance(controller: &SessionController) {
    let spinner = network_spinner("Fetching balance...");
    let result = controller.check_balance();
    spinner.finish_and_clear();
    match result {
        Ok(amount) => println!("{}", format!("Your balance: Rp {}", amount).green()),
        Err(e) => report(&e),
    }
}

fn handle_vouchers(controller: &SessionController) {
    let spinner = network_spinner("Fetching vouchers...");
    let result = controller.check_vouchers();
    spinner.finish_and_clear();
    match result {
        Ok(vouchers) if vouchers.is_empty() => {
            println!("{}", "No vouchers available.".yellow());
        }
        Ok(vouchers) => {
            println!("Your vouchers:");
            for v in vouchers {
                println!("- {} (expires: {})", v.title, v.expiry_date);
            }
        }
        Err(e) => report(&e),
    }
}

/// Spinner shown while a blocking network call is in flight.
fn network_spinner(msg: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(msg);
    spinner
}

/// Print a failure in red. `AuthRequired` already reads as "please log
/// in first", so every variant displays through the same path.
fn report(err: &Error) {
    println!("{}", format!("Error: {}", err).red());
}
