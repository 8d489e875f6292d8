use std::path::{Path, PathBuf};

use argh::FromArgs;
use color_eyre::Section;
use tracing as trc;

use super::Usage;
use crate::{
    deployment,
    render::{self, ChartRenderer},
};

pub static COMMAND: &str = "deployment-charts";

/// Where the published charts live in this repository
pub static DEFAULT_OUTPUT_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/docs/perf/charts");

#[derive(FromArgs, Debug)]
/// Regenerate the deployment performance charts from the published benchmark figures.
struct Args {
    /// directory for the chart PNGs (default: docs/perf/charts in this repository)
    #[argh(option, default = "PathBuf::from(DEFAULT_OUTPUT_DIR)")]
    output_dir: PathBuf,
}

/// Draw all six deployment charts into `output_dir`
///
/// Unlike the A/B charts there is nothing useful to fall back to here, so a renderer that cannot
/// draw is an error.
pub fn generate(
    output_dir: &Path,
    renderer: &dyn ChartRenderer,
    on_written: impl FnMut(&Path),
) -> eyre::Result<Vec<PathBuf>> {
    renderer.probe().map_err(|reason| {
        let guidance = reason.guidance();
        eyre::Report::new(reason).suggestion(guidance)
    })?;

    let figures = deployment::figures();
    trc::info_span!("Rendering deployment charts", count = figures.len())
        .in_scope(|| render::write_figures(renderer, &figures, output_dir, on_written))
}

/// Start program logic
pub fn start(args: &[&str], renderer: &dyn ChartRenderer) -> eyre::Result<()> {
    let args: Args = super::parse_args(COMMAND, args).map_err(Usage::exit)?;

    println!("Generating performance charts...");
    generate(&args.output_dir, renderer, |path| {
        if let Some(name) = path.file_name() {
            println!("  {}", name.to_string_lossy());
        }
    })?;
    println!("Done. Charts saved to {}/", args.output_dir.display());

    Ok(())
}

/// Run the deployment chart CLI
pub fn run() {
    super::run(|| {
        let args = super::env_args();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        start(&args, &*render::default_renderer())
    })
}
