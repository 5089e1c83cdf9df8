#[macro_use]
extern crate prettytable;

use anyhow::{Context, Result};
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

use commands::{decode_header, print_value, string_block};

mod commands;
mod options;

#[derive(StructOpt)]
#[structopt(
    name = "ocaml-inspect-tools",
    about = "look at OCaml values the way the runtime lays them out"
)]
enum BaseCli {
    PrintValue(print_value::Options),
    DecodeHeader(decode_header::Options),
    StringBlock(string_block::Options),
}

fn main() -> Result<()> {
    setup_pipes()?;
    setup_logging();

    let subcommand = BaseCli::from_args();
    match subcommand {
        BaseCli::PrintValue(opts) => print_value::run(opts),
        BaseCli::DecodeHeader(opts) => decode_header::run(opts),
        BaseCli::StringBlock(opts) => string_block::run(opts),
    }
}

// stop broken pipe errors for these tools
fn setup_pipes() -> Result<()> {
    #[cfg(target_family = "unix")]
    {
        use nix::sys::signal;

        unsafe {
            signal::signal(signal::SIGPIPE, signal::SigHandler::SigDfl)
                .context("Failed to set up broken pipe handler")?;
        }
    }

    Ok(())
}

// Library log records come through the subscriber's log bridge
fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
