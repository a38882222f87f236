use std::path::PathBuf;

use clap::Parser;
use gamba::prelude::*;
use tracing_subscriber::EnvFilter;

/// Dice-game automation extension for a packet-intercepting game host.
#[derive(Debug, Parser)]
#[command(name = "gamba", version)]
struct Cli {
    /// Address the host bridge connects to.
    #[arg(long, default_value = "127.0.0.1:9092")]
    bind: String,

    /// Match command keywords exactly instead of by suffix.
    #[arg(long)]
    strict_commands: bool,

    /// Directory holding poker_display_config.json.
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Write the template file (filling in missing keys) and exit.
    #[arg(long)]
    init_templates: bool,
}

impl Cli {
    fn template_store(&self) -> Result<TemplateStore, GambaError> {
        Ok(match &self.config_dir {
            Some(dir) => TemplateStore::in_dir(dir),
            None => TemplateStore::default_location()?,
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), GambaError> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let store = cli.template_store()?;
    if cli.init_templates {
        store.save(&store.load())?;
        return Ok(());
    }

    let config = ExtensionConfig {
        bind: cli.bind.clone(),
        template_path: Some(store.path().to_path_buf()),
        engine: EngineConfig {
            strict_commands: cli.strict_commands,
            ..EngineConfig::default()
        },
        ..ExtensionConfig::default()
    };

    let server = GambaServer::builder().config(config).build().await?;
    server.run().await
}
