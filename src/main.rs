//! Binary entrypoint that launches the Frontdesk agent server.

use std::process::ExitCode;

use frontdesk_agent::start_frontdesk_agent;

/// Start the agent: load the business document, wire the channels, serve.
fn main() -> ExitCode {
    start_frontdesk_agent::run()
}
