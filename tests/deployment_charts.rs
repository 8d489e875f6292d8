use std::{cell::RefCell, fs, path::Path};

use perf_charts::{
    chart::Figure,
    cli::{self, deployment as deployment_cli},
    deployment,
    render::{ChartRenderer, Unavailable},
};
use pretty_assertions::assert_eq;

/// Writes the file name into each chart file instead of drawing
#[derive(Default)]
struct Recorder {
    drawn: RefCell<Vec<String>>,
}

impl ChartRenderer for Recorder {
    fn probe(&self) -> Result<(), Unavailable> {
        Ok(())
    }

    fn render(&self, figure: &Figure, path: &Path) -> eyre::Result<()> {
        fs::write(path, &figure.file_name)?;
        self.drawn.borrow_mut().push(figure.file_name.clone());
        Ok(())
    }
}

#[test]
fn writes_all_six_charts_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("docs/perf/charts");
    let recorder = Recorder::default();

    let mut seen = Vec::new();
    let paths = deployment_cli::generate(&out, &recorder, |path| seen.push(path.to_owned())).unwrap();

    let expected = vec![
        deployment::THROUGHPUT_FILE,
        deployment::LATENCY_FILE,
        deployment::COST_FILE,
        deployment::CLUSTER_OVERHEAD_FILE,
        deployment::MEMORY_FILE,
        deployment::ORDER_CREATE_FILE,
    ];
    assert_eq!(*recorder.drawn.borrow(), expected);
    assert_eq!(seen, paths);
    for (path, name) in paths.iter().zip(&expected) {
        assert_eq!(path, &out.join(name));
        assert_eq!(fs::read_to_string(path).unwrap(), *name);
    }
}

#[test]
fn output_dir_flag_is_honoured() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("elsewhere");
    let out_arg = out.to_str().unwrap();

    deployment_cli::start(&["--output-dir", out_arg], &Recorder::default()).unwrap();

    assert_eq!(fs::read_dir(&out).unwrap().count(), 6);
}

#[test]
fn rerun_overwrites_previous_charts() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("charts");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join(deployment::MEMORY_FILE), "stale").unwrap();

    let recorder = Recorder::default();
    deployment_cli::generate(&out, &recorder, |_| ()).unwrap();
    deployment_cli::generate(&out, &recorder, |_| ()).unwrap();

    assert_eq!(recorder.drawn.borrow().len(), 12);
    assert_eq!(fs::read_dir(&out).unwrap().count(), 6);
    assert_eq!(
        fs::read_to_string(out.join(deployment::MEMORY_FILE)).unwrap(),
        deployment::MEMORY_FILE
    );
}

#[test]
fn unknown_flags_exit_with_an_error() {
    let report = deployment_cli::start(&["--format", "svg"], &Recorder::default()).unwrap_err();
    assert_eq!(cli::exit_code(&report), Some(1));
}

#[cfg(feature = "png")]
#[test]
fn renders_real_pngs_when_fonts_are_available() {
    use perf_charts::render::PngRenderer;

    if let Err(reason) = PngRenderer.probe() {
        eprintln!("skipping PNG rendering: {}", reason);
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let paths = deployment_cli::generate(dir.path(), &PngRenderer, |_| ()).unwrap();

    assert_eq!(paths.len(), 6);
    for path in paths {
        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n", "{}", path.display());
    }
}
