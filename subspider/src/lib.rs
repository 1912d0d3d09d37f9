pub mod commands;
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    load_domains_from_file,
    param_options_from_matches,
    parse_domain_line,
    scan_options_from_matches,
};

pub use commands::command_argument_builder;
