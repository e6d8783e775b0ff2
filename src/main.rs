use std::path::PathBuf;
use std::process::Command as Process;
use std::sync::Arc;

use eyre::{Result, WrapErr};
use log::{debug, info};

mod cli;

use cli::{Cli, Command};
use ytsum::captions::CaptionChain;
use ytsum::config::{self, Config, Settings};
use ytsum::pipeline::SummaryService;
use ytsum::summarize::Summarizer;

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytsum.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytsum")
        .join("logs")
}

fn tool_version(name: &str) -> Option<String> {
    Process::new(name)
        .arg("--version")
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| {
            String::from_utf8_lossy(&o.stdout)
                .trim()
                .lines()
                .next()
                .unwrap_or("")
                .to_string()
        })
}

fn build_after_help() -> String {
    let yt_dlp_line = match tool_version("yt-dlp") {
        Some(v) => format!("  \x1b[32m✅\x1b[0m yt-dlp     {v}"),
        None => "  \x1b[31m❌\x1b[0m yt-dlp     (not found, last caption fallback disabled)".to_string(),
    };
    let key_line = if std::env::var(config::API_KEY_ENV).is_ok() {
        format!("  \x1b[32m✅\x1b[0m {}", config::API_KEY_ENV)
    } else {
        format!("  \x1b[31m❌\x1b[0m {} (not set, summaries will fail)", config::API_KEY_ENV)
    };

    format!(
        "\nREQUIREMENTS:\n{yt_dlp_line}\n{key_line}\n\nConfig: {}\nLogs are written to: {}",
        config::config_path().display(),
        log_dir().join("ytsum.log").display()
    )
}

fn build_service(settings: &Settings) -> Result<SummaryService> {
    let captions = CaptionChain::from_settings(settings.caption_client()?, settings);
    let summarizer = Summarizer::new(settings.api_client()?, settings);
    Ok(SummaryService::new(captions, summarizer))
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let after_help = build_after_help();
    let cmd = <Cli as clap::CommandFactory>::command().after_help(after_help);
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    let mut config = Config::load()?;
    if let Command::Serve { bind: Some(ref bind) } = cli.command {
        config.bind = Some(bind.clone());
    }
    let settings = Settings::from_env(config)?;
    debug!("Settings: lang={} model={} api_base={}", settings.lang, settings.model, settings.api_base);

    if cli.verbose {
        let config_path = config::config_path();
        if config_path.exists() {
            eprintln!("Config: {}", config_path.display());
        }
        eprintln!("Model: {} ({})", settings.model, settings.api_base);
        if let Some(ref proxy) = settings.proxy {
            eprintln!("Caption proxy: {proxy}");
        }
    }

    let service = build_service(&settings)?;

    match cli.command {
        Command::Serve { .. } => {
            eprintln!("Listening on http://{}", settings.bind);
            ytsum::server::serve(Arc::new(service), settings.bind)
                .await
                .wrap_err_with(|| format!("server on {} failed", settings.bind))?;
        }
        Command::Summarize { url, transcript_only } => {
            if transcript_only {
                let track = service.captions_for_url(&url).await?;
                if cli.verbose {
                    eprintln!(
                        "Video: {}\nSource: {}\nLanguage: {}",
                        track.video_id, track.origin, track.language
                    );
                }
                println!("{}", track.text());
            } else {
                let summary = service.summarize_url(&url).await?;
                println!("{summary}");
            }
        }
    }

    Ok(())
}
