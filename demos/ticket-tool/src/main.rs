//! Command-line helper for issuing and checking tickets.
//!
//! ```text
//! ticket-tool <config.json> issue <name> [custom-data]
//! ticket-tool <config.json> verify <ticket>
//! ```
//!
//! `issue` prints the sealed ticket on stdout. `verify` prints the
//! recovered ticket as JSON, or exits with status 1 if it is invalid.
//! Set `RUST_LOG=debug` to see why a ticket was rejected.

use std::process::ExitCode;

use authticket::prelude::*;

const USAGE: &str = "usage:
  ticket-tool <config.json> issue <name> [custom-data]
  ticket-tool <config.json> verify <ticket>";

fn main() -> ExitCode {
    authticket::init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "ticket-tool failed");
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}

fn run(args: &[String]) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let (config_path, command, rest) = match args {
        [path, command, rest @ ..] => (path, command.as_str(), rest),
        _ => {
            eprintln!("{USAGE}");
            return Ok(ExitCode::from(2));
        }
    };

    let codec = TicketCodecBuilder::from_json_file(config_path)?.build()?;

    match (command, rest) {
        ("issue", [name, custom @ ..]) => {
            let mut params = TicketParams::new(name.as_str());
            if let Some(data) = custom.first() {
                params = params.with_custom_data(data.as_str());
            }
            let sealed = codec.generate(&params)?;
            println!("{sealed}");
            Ok(ExitCode::SUCCESS)
        }
        ("verify", [ticket]) => {
            // Raw-mode tickets are printed as hex by `issue`; undo that here.
            let input = match codec.config().output() {
                OutputEncoding::Hex => ticket.trim().as_bytes().to_vec(),
                OutputEncoding::Raw => hex::decode(ticket.trim())?,
            };
            verify(&codec, &input)
        }
        _ => {
            eprintln!("{USAGE}");
            Ok(ExitCode::from(2))
        }
    }
}

fn verify(codec: &TicketCodec, input: &[u8]) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match codec.validate(input) {
        Some(ticket) => {
            println!("{}", serde_json::to_string_pretty(&ticket)?);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("invalid ticket");
            Ok(ExitCode::FAILURE)
        }
    }
}
