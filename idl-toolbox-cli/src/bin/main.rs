//! `idl-cli`: inspect, decode and encode program payloads from an IDL document.
//!
//! Usage:
//!   idl-cli --idl program.json inspect
//!   idl-cli --idl program.json decode-account <HEX|base58:..|base64:..>
//!   idl-cli --idl program.json encode-instruction deposit --args '{"amount": "5"}' \
//!       --account vault=<ADDRESS> --account depositor=<ADDRESS>
//!   idl-cli pda --program-id <ADDRESS> '"vault"' '{"base58": "<ADDRESS>"}'
//!
//! Set `RUST_LOG=debug` to trace parsing and address resolution on stderr.

use clap::Parser;
use idl_toolbox_cli::cli::Cli;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match idl_toolbox_cli::run(cli).await {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }
}
