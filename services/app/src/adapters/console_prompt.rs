//! services/app/src/adapters/console_prompt.rs
//!
//! An `AuthorizationPrompt` for terminals: prints the authorization URL, then
//! reads back the redirect URL the browser landed on.

use async_trait::async_trait;
use reqwest::Url;
use task_keeper_core::ports::{
    AuthorizationOutcome, AuthorizationPrompt, AuthorizationRequest, PortError, PortResult,
};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, Clone, Copy, Default)]
pub struct ConsolePrompt;

#[async_trait]
impl AuthorizationPrompt for ConsolePrompt {
    async fn prompt(&self, request: &AuthorizationRequest) -> PortResult<AuthorizationOutcome> {
        println!("Open this address in a browser and sign in:\n\n  {}\n", request.url);
        println!("Paste the address you were redirected to (empty line cancels):");

        let mut line = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut line)
            .await
            .map_err(|e| PortError::Unexpected(format!("failed to read redirect: {}", e)))?;

        Ok(parse_redirect(&line))
    }
}

/// Interprets the redirect URL the provider sent the user agent to.
pub fn parse_redirect(redirect: &str) -> AuthorizationOutcome {
    let redirect = redirect.trim();
    if redirect.is_empty() {
        return AuthorizationOutcome::Cancelled;
    }

    let url = match Url::parse(redirect) {
        Ok(url) => url,
        Err(e) => return AuthorizationOutcome::Failed(format!("not a redirect address: {}", e)),
    };

    let mut code = None;
    let mut state = None;
    let mut error = None;
    let mut error_description = None;
    for (name, value) in url.query_pairs() {
        match name.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            "error_description" => error_description = Some(value.into_owned()),
            _ => {}
        }
    }

    match (error, code) {
        (Some(error), _) if error == "access_denied" => AuthorizationOutcome::Cancelled,
        (Some(error), _) => AuthorizationOutcome::Failed(match error_description {
            Some(description) => format!("{error}: {description}"),
            None => error,
        }),
        (None, Some(code)) if !code.is_empty() => AuthorizationOutcome::Success { code, state },
        _ => AuthorizationOutcome::Failed("the redirect carried no authorization code".to_string()),
    }
}
