use std::io::{self, Write};

use argh::FromArgs;
use thiserror::Error;

pub mod ab;
pub mod deployment;

/// An error that indicates that the program should exit with the given code
#[derive(Error, Debug)]
#[error("Program exited {0}")]
pub struct Exit(pub i32);

/// Help text or a command line mistake, along with the exit code it should produce
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct Usage {
    pub message: String,
    pub code: i32,
}

impl Usage {
    /// A mistake on the command line, followed by the help text for `T`
    pub fn error<T: FromArgs>(command: &str, problem: &str) -> Self {
        Usage {
            message: format!("{}\n\n{}", problem.trim_end(), help::<T>(command)),
            code: 1,
        }
    }

    /// Print the message where it belongs and turn it into an exit request
    pub fn exit(self) -> Exit {
        if self.code == 0 {
            print!("{}", self.message);
        } else {
            eprint!("{}", self.message);
        }
        Exit(self.code)
    }
}

/// The `--help` text of `T`
pub fn help<T: FromArgs>(command: &str) -> String {
    match T::from_args(&[command], &["--help"]) {
        Err(early_exit) => early_exit.output,
        Ok(_) => String::new(),
    }
}

/// Parse `args`, which do not include the program name
pub fn parse_args<T: FromArgs>(command: &str, args: &[&str]) -> Result<T, Usage> {
    T::from_args(&[command], args).map_err(|early_exit| match early_exit.status {
        Ok(()) => Usage {
            message: early_exit.output,
            code: 0,
        },
        Err(()) => Usage::error::<T>(command, &early_exit.output),
    })
}

/// The exit code requested by a report, if it carries an [`Exit`]
pub fn exit_code(report: &eyre::Report) -> Option<i32> {
    report.downcast_ref::<Exit>().map(|exit| exit.0)
}

/// The process arguments without the program name
pub fn env_args() -> Vec<String> {
    std::env::args().skip(1).collect()
}

/// Run a command to completion and exit the process accordingly
pub fn run(start: impl FnOnce() -> eyre::Result<()>) {
    // Install tracing for logs
    install_tracing();

    // Start the application and capture errors
    let result = color_eyre::install().and_then(|()| start());

    match result {
        // Do nothing for happy runs!
        Ok(()) => (),
        // Handle errors
        Err(report) => {
            // Exit codes have already said what they needed to
            if let Some(code) = exit_code(&report) {
                std::process::exit(code);
            // If the error is any other kind of error print it and exit 1
            } else {
                // Not through tracing, the fmt layer would escape the report's colors
                let _ = write_report(&mut std::io::stderr(), &report);
                std::process::exit(1);
            }
        }
    }
}

/// Write a fatal error report
pub fn write_report(out: &mut impl Write, report: &eyre::Report) -> io::Result<()> {
    writeln!(out, "Error: {:?}", report)
}

fn install_tracing() {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{fmt, EnvFilter};

    // Build the tracing layers
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    let filter_layer = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Add all of the layers to the subscriber and initialize it
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .with(ErrorLayer::default())
        .init();
}
