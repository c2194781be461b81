//! Interactive token prompt

use std::io::{BufRead, Write};

use gitlab_archive_dl::{Error, Result};

/// Use the token from the command line or environment, prompting when blank
pub fn resolve_token(provided: Option<String>) -> Result<String> {
    match provided {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => read_token(std::io::stdin().lock()),
    }
}

/// Ask for the token on stderr and read one line from `reader`
pub fn read_token<R: BufRead>(mut reader: R) -> Result<String> {
    eprint!("🔑 GitLab personal access token: ");
    std::io::stderr().flush().map_err(Error::IoError)?;

    let mut input = String::new();
    reader.read_line(&mut input).map_err(Error::IoError)?;

    let token = input.trim();
    if token.is_empty() {
        return Err(Error::InvalidInput("Token cannot be empty".to_string()));
    }
    Ok(token.to_string())
}
