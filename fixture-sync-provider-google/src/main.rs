//! fixture-sync-provider-google - Google Calendar store provider for fixture-sync
//!
//! Implements the fixture-sync provider protocol, one JSON request per line
//! on stdin and one JSON response per line on stdout.
//!
//! The provider manages its own credentials and tokens:
//!   ~/.config/fixture-sync/providers/google/app_config.toml
//!   ~/.config/fixture-sync/providers/google/session/{account}.toml

mod app_config;
mod commands;
mod convert;
mod remote_config;
mod session;

use std::io::{self, BufRead, Write};

use anyhow::Result;
use fixture_sync_core::remote::protocol::{Command, Request, Response};
use serde::Serialize;

#[tokio::main]
async fn main() {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Failed to read stdin: {}", e);
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => handle_request(request).await,
            Err(e) => Response::error(&format!("Failed to parse request: {}", e)),
        };

        if writeln!(stdout, "{}", response)
            .and_then(|_| stdout.flush())
            .is_err()
        {
            break;
        }
    }
}

async fn handle_request(request: Request) -> String {
    let params = request.params;
    match request.command {
        Command::ListEntries => respond(commands::list_entries::handle(params).await),
        Command::CreateEntry => respond(commands::create_entry::handle(params).await),
        Command::UpdateEntry => respond(commands::update_entry::handle(params).await),
        Command::DeleteEntry => respond(commands::delete_entry::handle(params).await),
    }
}

fn respond<T: Serialize>(result: Result<T>) -> String {
    match result {
        Ok(data) => Response::success(data),
        Err(e) => {
            let message = format!("{:#}", e);
            eprintln!("{}", message);
            if commands::is_retryable(&e) {
                Response::error_retryable(&message)
            } else {
                Response::error(&message)
            }
        }
    }
}
