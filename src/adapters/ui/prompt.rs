//! Interactive prompts (inquire): hidden secrets and confirmations.

use crate::domain::DomainError;
use inquire::ui::{Color, RenderConfig, StyleSheet, Styled};
use inquire::{Confirm, Password, PasswordDisplayMode};

/// Prompt styling shared by every inquire prompt in the process.
pub fn apply_theme() {
    let mut config = RenderConfig::default_colored();
    config.prompt_prefix = Styled::new("?").with_fg(Color::LightCyan);
    config.answered_prompt_prefix = Styled::new("✔").with_fg(Color::LightGreen);
    config.help_message = StyleSheet::new().with_fg(Color::DarkGrey);
    inquire::set_global_render_config(config);
}

fn ui_err(e: inquire::InquireError) -> DomainError {
    DomainError::Ui(e.to_string())
}

/// Hidden single entry, e.g. the client secret.
pub fn secret(message: &str) -> Result<String, DomainError> {
    Password::new(message)
        .with_display_mode(PasswordDisplayMode::Hidden)
        .without_confirmation()
        .prompt()
        .map_err(ui_err)
}

/// New password, typed twice.
pub fn new_password(message: &str) -> Result<String, DomainError> {
    Password::new(message)
        .with_display_mode(PasswordDisplayMode::Masked)
        .with_custom_confirmation_message("Repeat password:")
        .with_custom_confirmation_error_message("Passwords do not match")
        .prompt()
        .map_err(ui_err)
}

/// Ask before an irreversible action. `assume_yes` skips the prompt.
pub fn confirm(message: &str, assume_yes: bool) -> Result<bool, DomainError> {
    if assume_yes {
        return Ok(true);
    }
    Confirm::new(message)
        .with_default(false)
        .with_help_message("pass --yes to skip this question")
        .prompt()
        .map_err(ui_err)
}
