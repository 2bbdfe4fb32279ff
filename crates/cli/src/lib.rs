pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use perfex_core::config::{ConfigOverrides, LoadOptions};

#[derive(Debug, Parser)]
#[command(
    name = "perfex",
    about = "Perfex CRM tool CLI",
    long_about = "Inspect the Perfex tool catalog and configuration, or run a single tool call against the CRM.",
    after_help = "Examples:\n  perfex tools\n  perfex config\n  perfex call get_customer_by_id --args '{\"id\":42}'"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a perfex.toml config file")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Override logging.level (trace|debug|info|warn|error)")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Print the tool catalog with routes and input schemas as JSON")]
    Tools,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Run one tool call against the configured CRM")]
    Call {
        #[arg(help = "Tool name, e.g. search_customers")]
        tool: String,
        #[arg(long, help = "Tool arguments as a JSON object")]
        args: Option<String>,
    },
}

impl Cli {
    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            config_path: self.config.clone(),
            require_file: self.config.is_some(),
            overrides: ConfigOverrides { log_level: self.log_level.clone(), ..Default::default() },
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = cli.load_options();

    let result = match cli.command {
        Command::Tools => commands::tools::run(),
        Command::Config => commands::config::run(options),
        Command::Call { tool, args } => commands::call::run(options, &tool, args.as_deref()),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
