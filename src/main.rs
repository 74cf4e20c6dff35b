/**
 * Command line front-end: loads the configuration, initializes the process
 * logger and emits a single message through it.
 */
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use applog::config::Settings;
use applog::{errorf, logging, LogFacility, LogLevel};
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "applog", version, about = "Emit a message through the configured log facility")]
struct Cli {
    /// Extra configuration file, read after the applog*.yaml files
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Level of the message: debug, info, warn, error or fatal
    #[arg(short, long, default_value = "info")]
    level: String,

    /// Message to emit, words are joined with spaces
    message: Vec<String>,
}

/**
 * Represents what the application hands to its components.
 *
 * Fields:
 * - `settings`: The resolved configuration.
 * - `log`: The process log facility.
 */
#[derive(Debug)]
struct Context {
    settings: Settings,
    log: Arc<LogFacility>,
}

/**
 * Emits the requested message.
 *
 * @return The process exit status: 0, or 2 for an unknown level. A fatal
 *         message does not return.
 */
fn run(context: &Context, cli: &Cli) -> i32 {
    let log = &context.log;
    slog::debug!(log.logger(), "configuration loaded";
        "environment" => context.settings.environment.as_str());

    let level = match cli.level.parse::<LogLevel>() {
        Ok(level) => level,
        Err(e) => {
            errorf!(log, "{e}");
            return 2;
        }
    };

    let message = cli.message.join(" ");
    match level {
        LogLevel::Fatal => log.fatal(&message),
        _ => log.log(level, format_args!("{message}")),
    }
    0
}

fn main() {
    let cli = Cli::parse();

    // logging setup must never keep the application from starting
    let settings = Settings::load(cli.config.as_deref()).unwrap_or_else(|e| {
        eprintln!("Failed to load configuration, using defaults: {e}");
        Settings::default()
    });

    let context = Context {
        log: logging::init(&settings.general.log),
        settings,
    };

    let code = run(&context, &cli);
    context.log.shutdown();
    process::exit(code);
}
