//! Frontdesk server binary for deployments behind a public webhook URL.
//! Run with: cargo run --bin frontdesk-server

use std::process::ExitCode;

use frontdesk_agent::start_frontdesk_agent;

fn main() -> ExitCode {
    start_frontdesk_agent::run()
}
