use std::{
    fs,
    path::{Path, PathBuf},
};

use eyre::WrapErr;
use thiserror::Error;
use tracing as trc;

use crate::chart::Figure;

#[cfg(feature = "png")]
mod png;

#[cfg(feature = "png")]
pub use png::PngRenderer;

/// Why charts cannot be drawn
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    #[error("PNG rendering was not compiled into this build")]
    NotCompiled,
    #[error("No usable font for chart text: {0}")]
    Fonts(String),
}

impl Unavailable {
    /// What the user can do about it
    pub fn guidance(&self) -> String {
        let fix = match self {
            Unavailable::NotCompiled => "\
To enable chart rendering, rebuild with the `png` feature:
  cargo install --path . --features png",
            Unavailable::Fonts(_) => "\
To enable chart rendering, install fontconfig and a sans-serif font:
  apt-get install fontconfig fonts-dejavu-core
  # or
  brew install fontconfig",
        };

        format!(
            "{}. Charts will not be generated.\n\n{}\n\n\
             The A/B comparison report (ab-compare.sh) includes ASCII charts as a fallback.",
            self, fix
        )
    }
}

/// Something that can turn a [`Figure`] into an image file
pub trait ChartRenderer {
    /// Check that rendering can work before any input is read
    fn probe(&self) -> Result<(), Unavailable>;

    /// Draw `figure` into the file at `path`, replacing it if it exists
    fn render(&self, figure: &Figure, path: &Path) -> eyre::Result<()>;
}

/// Renderer used when PNG support is compiled out
#[derive(Clone, Copy, Debug, Default)]
pub struct Disabled;

impl ChartRenderer for Disabled {
    fn probe(&self) -> Result<(), Unavailable> {
        Err(Unavailable::NotCompiled)
    }

    fn render(&self, _figure: &Figure, _path: &Path) -> eyre::Result<()> {
        Err(Unavailable::NotCompiled.into())
    }
}

/// The best renderer this build has
pub fn default_renderer() -> Box<dyn ChartRenderer> {
    #[cfg(feature = "png")]
    {
        Box::new(PngRenderer)
    }
    #[cfg(not(feature = "png"))]
    {
        Box::new(Disabled)
    }
}

/// Render every figure into `dir`, creating it if needed
///
/// `written` is called with each path as soon as its file is complete. Stops at the first failure
/// and leaves whatever was already written in place.
pub fn write_figures(
    renderer: &dyn ChartRenderer,
    figures: &[Figure],
    dir: &Path,
    mut written: impl FnMut(&Path),
) -> eyre::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .wrap_err_with(|| format!("Could not create output directory {}", dir.display()))?;

    let mut paths = Vec::with_capacity(figures.len());
    for figure in figures {
        let path = dir.join(&figure.file_name);

        trc::debug_span!("Rendering chart", file = %figure.file_name).in_scope(|| {
            renderer
                .render(figure, &path)
                .wrap_err_with(|| format!("Could not render {}", path.display()))
        })?;

        written(&path);
        paths.push(path);
    }

    Ok(paths)
}
