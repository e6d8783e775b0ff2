use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "ytsum",
    about = "Summarize YouTube videos from their captions",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// Show configuration and extraction details
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the web front end
    Serve {
        /// Address to listen on (overrides config `bind`)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Summarize a single video and print the result
    Summarize {
        /// YouTube video URL or video ID
        url: String,

        /// Print the flattened captions instead of summarizing
        #[arg(short, long)]
        transcript_only: bool,
    },
}
