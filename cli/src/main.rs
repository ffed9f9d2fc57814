//! spire-supply - provisions a SPIRE agent sidecar into buildpack builds

use clap::Parser;
use spire_supply::cli::Cli;
use spire_supply::output::OutputContext;

fn main() {
    let cli = Cli::parse();
    let no_color = cli.no_color;
    if let Err(e) = spire_supply::logging::init(no_color) {
        eprintln!("Warning: {e}");
    }
    if let Err(e) = cli.run() {
        OutputContext::new(no_color, false).error(&format!("{e:#}"));
        std::process::exit(1);
    }
}
