pub mod candidates;
pub mod console;
pub mod error;
pub mod liveness;
pub mod params;
pub mod pipeline;
pub mod resolve;
pub mod sink;
pub mod wordlist;

use colored::Colorize;

pub use error::{PipelineError, Result};

pub fn print_banner() {
    let banner = "\n  ╔═╗╦ ╦╔╗ ╔═╗╔═╗╦╔╦╗╔═╗╦═╗\n  ╚═╗║ ║╠╩╗╚═╗╠═╝║ ║║║╣ ╠╦╝\n  ╚═╝╚═╝╚═╝╚═╝╩  ╩═╩╝╚═╝╩╚═";
    println!("{}", banner.cyan().bold());
    println!(
        "  {} {}\n",
        "subdomain discovery and liveness probing".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
}
