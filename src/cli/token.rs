// src/cli/token.rs
use super::CliError;
use crate::forecast::api::auth;

pub fn set_token(token: &str) -> Result<(), CliError> {
    auth::store_token(token)?;
    println!("Token stored in the OS keyring.");
    Ok(())
}

pub fn clear_token() -> Result<(), CliError> {
    auth::clear_token()?;
    println!("Token removed from the OS keyring.");
    Ok(())
}
