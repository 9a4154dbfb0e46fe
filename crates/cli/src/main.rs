use anyhow::Result;
use clap::Parser;
use papercat_core::config;
use papercat_core::index::Index;
use std::path::Path;

use cli::shell;

#[derive(Parser)]
#[command(name = "papercat")]
#[command(about = "Tag and browse a directory of documents", long_about = None)]
struct Cli {
    /// Directory to catalog; defaults to the configured root.
    path: Option<String>,

    /// Path to config TOML
    #[arg(short, long)]
    config: Option<String>,

    /// Run one shell command instead of the interactive loop; may be
    /// repeated, lines run in order against the same session.
    #[arg(short = 'e', long = "command")]
    commands: Vec<String>,

    /// In command mode, keep executing after a failed command.
    #[arg(long, default_value_t = false)]
    keep_going: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref())?;
    let root = cli.path.unwrap_or_else(|| cfg.catalog.root.clone());

    // A catalog that cannot be enumerated is the one fatal error.
    let index = Index::build(Path::new(&root), &cfg.catalog.exclude)?;
    let mut session = shell::Session::new(index, cfg);

    if cli.commands.is_empty() {
        shell::run_interactive(&mut session)
    } else {
        shell::run_script(&mut session, &cli.commands, cli.keep_going)
    }
}
