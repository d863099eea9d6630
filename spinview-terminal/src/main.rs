/// spinview terminal viewer
///
/// Loads an STL model (or a demo cube) and lets you spin it with the mouse.
/// Controls:
///   - Left drag on the model: Rotate, release to let it coast
///   - R: Reset orientation
///   - Q/ESC: Quit
use anyhow::Context;
use clap::Parser;
use log::info;
use spinview_core::{load_model, Mesh, Node, ViewerConfig};
use spinview_terminal::TerminalApp;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "spinview-terminal", version, about = "Spin a 3D model in the terminal")]
struct Args {
    /// STL file to view; a cube is shown when omitted
    model: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where log output goes while the terminal is in raw mode
    #[arg(long, default_value = "spinview.log")]
    log_file: PathBuf,
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.log_file)?;

    let config = match &args.config {
        Some(path) => ViewerConfig::load(path)
            .with_context(|| format!("invalid configuration in {}", path.display()))?,
        None => ViewerConfig::default(),
    };

    let model = match &args.model {
        Some(path) => load_model(path, &config.model, config.material)
            .with_context(|| format!("cannot load model {}", path.display()))?,
        None => {
            info!("no model given, showing the demo cube");
            Node::with_surface("cube", Mesh::cube(2.0), config.material)
        }
    };

    let mut app = TerminalApp::new(model, config)?;
    app.run()?;

    Ok(())
}
