use colored::Colorize;
use subspider::command_argument_builder;
use subspider::handlers::{handle_params, handle_scan, handle_update, init_tracing};
use subspider_core::print_banner;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    init_tracing(chosen_command.get_flag("verbose"));

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    let result = match chosen_command.subcommand() {
        Some(("update", _)) => {
            handle_update();
            Ok(())
        }
        Some(("params", primary_command)) => handle_params(primary_command).await,
        Some(_) => unreachable!("clap should ensure we don't get here"),
        None => handle_scan(&chosen_command).await,
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}
