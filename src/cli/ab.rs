use std::path::{Path, PathBuf};

use argh::FromArgs;
use tracing as trc;

use super::Usage;
use crate::{
    compare::{self, Variant},
    k6::ResultDocument,
    render::{self, ChartRenderer, Unavailable},
};

pub static COMMAND: &str = "ab-chart";

#[derive(FromArgs, Debug)]
/// Render PNG bar charts comparing latency, throughput and error rates of two k6 result files.
struct Args {
    /// k6 JSON summaries for variant A and variant B
    #[argh(positional)]
    results: Vec<PathBuf>,

    /// label for variant A (default: "Variant A")
    #[argh(option, default = "String::from(\"Variant A\")")]
    label_a: String,

    /// label for variant B (default: "Variant B")
    #[argh(option, default = "String::from(\"Variant B\")")]
    label_b: String,

    /// directory for the chart PNGs (default: ./charts)
    #[argh(option, default = "PathBuf::from(\"./charts\")")]
    output_dir: PathBuf,
}

/// A validated A/B chart invocation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    pub result_a: PathBuf,
    pub result_b: PathBuf,
    pub label_a: String,
    pub label_b: String,
    pub output_dir: PathBuf,
}

/// What a run ended up doing
#[derive(Debug)]
pub enum Outcome {
    /// Charts could not be drawn, nothing was read or written
    Skipped(Unavailable),
    Written(Vec<PathBuf>),
}

/// Options that take the following argument as their value
static VALUE_OPTIONS: &[&str] = &["--label-a", "--label-b", "--output-dir"];

/// The command line after a first pass over it
#[derive(Debug, PartialEq, Eq)]
enum Scan<'a> {
    /// Help was asked for before anything that could be rejected
    Help,
    /// Arguments for argh, with the result files moved behind `--`
    Args(Vec<&'a str>),
}

/// Walk the arguments in order before argh sees them
///
/// `--help` and `-h` win as soon as they are reached. Result files are passed after `--` so that a
/// file named `help` is never read as argh's help command.
fn scan<'a>(args: &[&'a str]) -> Scan<'a> {
    let mut options = Vec::with_capacity(args.len() + 1);
    let mut files = Vec::new();

    let mut rest = args.iter().copied();
    while let Some(arg) = rest.next() {
        match arg {
            "--help" | "-h" => return Scan::Help,
            "--" => {
                files.extend(rest.by_ref());
            }
            option if VALUE_OPTIONS.contains(&option) => match rest.next() {
                Some(value) => {
                    options.push(option);
                    options.push(value);
                }
                // Leave the missing value for argh to report
                None => return Scan::Args(args.to_vec()),
            },
            unknown if unknown.starts_with('-') => {
                // argh rejects it before looking at anything after it
                options.push(unknown);
                options.extend(rest.by_ref());
            }
            file => files.push(file),
        }
    }

    options.push("--");
    options.extend(files);
    Scan::Args(options)
}

/// Parse the command line, without the program name
pub fn parse(args: &[&str]) -> Result<Options, Usage> {
    let args = match scan(args) {
        Scan::Help => {
            return Err(Usage {
                message: super::help::<Args>(COMMAND),
                code: 0,
            })
        }
        Scan::Args(args) => args,
    };
    let args: Args = super::parse_args(COMMAND, &args)?;

    let mut results = args.results.into_iter();
    let (result_a, result_b) = match (results.next(), results.next()) {
        (Some(a), Some(b)) => (a, b),
        _ => {
            return Err(Usage::error::<Args>(
                COMMAND,
                "Error: Two result JSON files are required.",
            ))
        }
    };

    let extra: Vec<_> = results.collect();
    if !extra.is_empty() {
        trc::warn!(?extra, "Ignoring result files beyond the first two");
    }

    Ok(Options {
        result_a,
        result_b,
        label_a: args.label_a,
        label_b: args.label_b,
        output_dir: args.output_dir,
    })
}

fn load_variant(label: &str, path: &Path) -> eyre::Result<Variant> {
    Ok(Variant::new(label, ResultDocument::load(path)?))
}

/// Render the comparison charts described by `options`
///
/// `on_written` sees every chart path as soon as the file is complete.
pub fn generate(
    options: &Options,
    renderer: &dyn ChartRenderer,
    on_written: impl FnMut(&Path),
) -> eyre::Result<Outcome> {
    if let Err(reason) = renderer.probe() {
        trc::debug!(%reason, "Renderer unavailable");
        return Ok(Outcome::Skipped(reason));
    }

    let a = load_variant(&options.label_a, &options.result_a)?;
    let b = load_variant(&options.label_b, &options.result_b)?;

    compare::log_summary(&a, &b);

    let figures = compare::figures(&a, &b);
    let paths = trc::info_span!("Rendering comparison charts")
        .in_scope(|| render::write_figures(renderer, &figures, &options.output_dir, on_written))?;

    Ok(Outcome::Written(paths))
}

/// Start program logic
pub fn start(args: &[&str], renderer: &dyn ChartRenderer) -> eyre::Result<()> {
    let options = parse(args).map_err(Usage::exit)?;

    match generate(&options, renderer, |path| {
        println!("  Chart saved: {}", path.display())
    })? {
        Outcome::Skipped(reason) => println!("{}", reason.guidance()),
        Outcome::Written(_) => println!(
            "\nAll charts saved to: {}/",
            options.output_dir.display()
        ),
    }

    Ok(())
}

/// Run the A/B chart CLI
pub fn run() {
    super::run(|| {
        let args = super::env_args();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        start(&args, &*render::default_renderer())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let options = parse(&["a.json", "b.json"]).unwrap();
        assert_eq!(
            options,
            Options {
                result_a: "a.json".into(),
                result_b: "b.json".into(),
                label_a: "Variant A".into(),
                label_b: "Variant B".into(),
                output_dir: "./charts".into(),
            }
        );
    }

    #[test]
    fn flags_and_files_mix() {
        let options = parse(&[
            "--label-a",
            "Baseline",
            "a.json",
            "--output-dir",
            "out",
            "b.json",
            "--label-b",
            "Clustered",
        ])
        .unwrap();

        assert_eq!(options.label_a, "Baseline");
        assert_eq!(options.label_b, "Clustered");
        assert_eq!(options.output_dir, PathBuf::from("out"));
        assert_eq!(options.result_b, PathBuf::from("b.json"));
    }

    #[test]
    fn extra_files_are_ignored() {
        let options = parse(&["a.json", "b.json", "c.json"]).unwrap();
        assert_eq!(options.result_a, PathBuf::from("a.json"));
        assert_eq!(options.result_b, PathBuf::from("b.json"));
    }

    #[test]
    fn fewer_than_two_files_is_a_usage_error() {
        for args in [&[][..], &["a.json"][..]].iter() {
            let usage = parse(args).unwrap_err();
            assert_eq!(usage.code, 1);
            assert!(usage.message.starts_with("Error: Two result JSON files are required."));
            assert!(usage.message.contains("Usage: ab-chart"));
        }
    }

    #[test]
    fn unknown_flag_is_a_usage_error() {
        let usage = parse(&["a.json", "b.json", "--colour", "red"]).unwrap_err();
        assert_eq!(usage.code, 1);
        assert!(usage.message.contains("--colour"));
        assert!(usage.message.contains("Usage: ab-chart"));
    }

    #[test]
    fn result_files_go_behind_the_separator() {
        assert_eq!(
            scan(&["a.json", "--label-a", "help", "b.json", "--output-dir", "out"]),
            Scan::Args(vec!["--label-a", "help", "--output-dir", "out", "--", "a.json", "b.json"])
        );
        assert_eq!(
            scan(&["a.json", "--", "-b.json"]),
            Scan::Args(vec!["--", "a.json", "-b.json"])
        );
    }

    #[test]
    fn file_named_help_is_a_file() {
        let options = parse(&["help", "b.json"]).unwrap();
        assert_eq!(options.result_a, PathBuf::from("help"));
        assert_eq!(options.result_b, PathBuf::from("b.json"));
    }

    #[test]
    fn option_values_are_not_help() {
        let options = parse(&["--label-a", "--help", "a.json", "b.json"]).unwrap();
        assert_eq!(options.label_a, "--help");
    }

    #[test]
    fn missing_option_value_is_a_usage_error() {
        let usage = parse(&["a.json", "b.json", "--output-dir"]).unwrap_err();
        assert_eq!(usage.code, 1);
        assert!(usage.message.contains("Usage: ab-chart"));
    }

    #[test]
    fn unknown_flag_before_help_is_an_error() {
        let usage = parse(&["--bogus", "--help"]).unwrap_err();
        assert_eq!(usage.code, 1);
        assert!(usage.message.contains("--bogus"));
    }

    #[test]
    fn help_wins_over_missing_files() {
        let cases = [
            &["--help"][..],
            &["-h"][..],
            &["a.json", "--help"][..],
            &["--help", "--bogus"][..],
            &["a.json", "-h", "b.json", "c.json"][..],
        ];
        for args in cases.iter() {
            let usage = parse(args).unwrap_err();
            assert_eq!(usage.code, 0);
            assert!(usage.message.contains("--label-a"));
            assert!(usage.message.contains("--output-dir"));
        }
    }
}
