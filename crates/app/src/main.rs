use clap::Parser;

mod cli;
mod commands;
mod error;
mod settings;
mod terminal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = cli::Cli::parse();
    let settings = settings::Settings::load(&cli)?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(format!(
            "kakebo={level},engine={level}",
            level = settings.level
        ))
        .init();

    if let Err(err) = commands::run(cli, settings).await {
        tracing::debug!("command failed: {err:?}");
        eprintln!("error: {err}");
        std::process::exit(1);
    }

    Ok(())
}
