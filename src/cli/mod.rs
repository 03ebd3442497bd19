//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod say;

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::say::run_say;
use crate::core::config::data::{path_display, Config, SettingsOverrides};
use crate::core::framing::WireFormat;
use crate::ui::chat_loop::run_chat;
use crate::utils::logging::{init_logging, LogTarget};

#[derive(Parser)]
#[command(name = "llamabot")]
#[command(version)]
#[command(about = "A terminal chat client that streams replies from a LlamaBot backend")]
#[command(
    long_about = "LlamaBot is a full-screen terminal chat client. Each message is posted to the \
configured endpoint and the reply is rendered as it streams in, with markdown formatting and \
one-key copying of code blocks.\n\n\
Environment Variables:\n\
  LLAMABOT_ENDPOINT  Chat endpoint URL (overrides the config file)\n\
  LLAMABOT_LOG       Log filter directives, e.g. \"llamabot=debug\" (default: warn)\n\n\
Controls:\n\
  Enter              Send the message\n\
  Alt+Enter          Insert a new line\n\
  Esc                Stop the reply being generated\n\
  Ctrl+Y             Copy the newest code block\n\
  Alt+1..9           Copy code block N\n\
  PageUp/PageDown    Scroll the conversation\n\
  Ctrl+C             Quit"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Chat endpoint URL
    #[arg(short = 'e', long, global = true, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Response framing: "chunked" (one JSON object or raw text per read) or "ndjson"
    #[arg(long, global = true, value_name = "FORMAT")]
    pub wire_format: Option<WireFormat>,

    /// Write diagnostic logs to this file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Show replies as plain text
    #[arg(long, global = true)]
    pub no_markdown: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Send one message and stream the reply to stdout
    Say {
        /// The message to send
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        prompt: Vec<String>,
    },
    /// Set a configuration value
    Set {
        /// Configuration key (endpoint, wire-format, markdown)
        key: String,
        /// Value to set
        value: String,
    },
    /// Unset a configuration value
    Unset {
        /// Configuration key to unset
        key: String,
    },
    /// Show the configuration file and effective settings
    Config,
}

impl Args {
    fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            endpoint: self.endpoint.clone(),
            wire_format: self.wire_format,
            no_markdown: self.no_markdown,
        }
    }
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let overrides = args.overrides();

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            let target = match args.log_file.as_deref() {
                Some(path) => LogTarget::File(path),
                None => LogTarget::Disabled,
            };
            init_logging(target)?;
            let config = Config::load()?;
            run_chat(config.resolve(&overrides)).await
        }
        Commands::Say { prompt } => {
            let target = match args.log_file.as_deref() {
                Some(path) => LogTarget::File(path),
                None => LogTarget::Stderr,
            };
            init_logging(target)?;
            let config = Config::load()?;
            run_say(prompt, config.resolve(&overrides)).await
        }
        Commands::Set { key, value } => {
            let mut config = Config::load()?;
            match config.set_value(&key, &value) {
                Ok(key) => {
                    let path = config.save()?;
                    println!("✅ Set {key} to: {value}");
                    println!("   (saved to {})", path_display(path));
                    Ok(())
                }
                Err(err) => {
                    eprintln!("❌ {err}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Unset { key } => {
            let mut config = Config::load()?;
            match config.unset_value(&key) {
                Ok(key) => {
                    config.save()?;
                    println!("✅ Unset {key}");
                    Ok(())
                }
                Err(err) => {
                    eprintln!("❌ {err}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Config => {
            let config = Config::load()?;
            match Config::config_path() {
                Ok(path) => println!("Config file: {}", path_display(path)),
                Err(err) => println!("Config file: unavailable ({err})"),
            }
            config.print_all();
            println!();
            config.resolve(&overrides).print_effective();
            Ok(())
        }
    }
}
