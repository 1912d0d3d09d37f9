use clap::{ArgAction, arg, command};
use std::path::PathBuf;
use url::Url;

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("subspider")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("subspider")
        .about("Discover live subdomains from a wordlist: DNS resolution, then HTTP/HTTPS probing")
        .styles(CLAP_STYLING)
        .subcommand_negates_reqs(true)
        .arg(
            arg!(-q --"quiet" "Suppress banner and non-essential output")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(-v --"verbose" "Emit debug logs on stderr")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(<DOMAINS_FILE>)
                .help("Newline-delimited file of base domains")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            arg!(-w --"wordlist" <PATH>)
                .required(false)
                .help("Local wordlist of subdomain fragments (default: download from SecLists)")
                .value_parser(clap::value_parser!(PathBuf))
                .conflicts_with("wordlist-url"),
        )
        .arg(
            arg!(--"wordlist-url" <URL>)
                .required(false)
                .help("Download the subdomain wordlist from this URL")
                .value_parser(clap::value_parser!(Url))
                .conflicts_with("wordlist"),
        )
        .arg(
            arg!(-o --"output" <PATH>)
                .required(false)
                .help("File receiving one live URL per line")
                .value_parser(clap::value_parser!(PathBuf))
                .default_value("found.txt"),
        )
        .arg(
            arg!(--"json" <PATH>)
                .required(false)
                .help("Also write a JSON report of the run")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            arg!(--"dns-concurrency" <NUM>)
                .required(false)
                .help("Maximum DNS lookups in flight")
                .value_parser(clap::value_parser!(usize))
                .default_value("200"),
        )
        .arg(
            arg!(--"http-concurrency" <NUM>)
                .required(false)
                .help("Maximum HTTP probes in flight")
                .value_parser(clap::value_parser!(usize))
                .default_value("200"),
        )
        .arg(
            arg!(--"timeout" <SECONDS>)
                .required(false)
                .help("Per-lookup and per-request timeout in seconds")
                .value_parser(clap::value_parser!(u64).range(1..))
                .default_value("5"),
        )
        .arg(
            arg!(-r --"resolver" <IP>)
                .required(false)
                .help("Nameserver to query instead of the system resolver (repeatable)")
                .action(ArgAction::Append),
        )
        .arg(
            arg!(--"insecure")
                .required(false)
                .help("Accept invalid TLS certificates (self-signed, expired, wrong host)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            arg!(--"no-progress")
                .required(false)
                .help("Disable progress bars")
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            command!("update")
                .about("Explains how to update subspider; the binary never rewrites itself"),
        )
        .subcommand(
            command!("params")
                .about("Brute-force query parameter names accepted by a single URL")
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("The URL to test")
                        .value_parser(clap::value_parser!(Url)),
                )
                .arg(
                    arg!(-w --"wordlist" <PATH>)
                        .required(false)
                        .help("Local wordlist of parameter names (default: download from SecLists)")
                        .value_parser(clap::value_parser!(PathBuf))
                        .conflicts_with("wordlist-url"),
                )
                .arg(
                    arg!(--"wordlist-url" <URL>)
                        .required(false)
                        .help("Download the parameter wordlist from this URL")
                        .value_parser(clap::value_parser!(Url))
                        .conflicts_with("wordlist"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("File receiving one accepted URL per line")
                        .value_parser(clap::value_parser!(PathBuf))
                        .default_value("params.txt"),
                )
                .arg(
                    arg!(-t --"threads" <NUM_WORKERS>)
                        .required(false)
                        .help("The number of async workers in the pool")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("200"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .value_parser(clap::value_parser!(u64).range(1..))
                        .default_value("5"),
                )
                .arg(
                    arg!(--"insecure")
                        .required(false)
                        .help("Accept invalid TLS certificates (self-signed, expired, wrong host)")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"no-progress")
                        .required(false)
                        .help("Disable progress bars")
                        .action(ArgAction::SetTrue),
                ),
        )
}
