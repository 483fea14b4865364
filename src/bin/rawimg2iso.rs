use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use rawimg2iso::{convert, ConversionReport, ConvertOptions};
use tracing::{error, Level};

#[derive(Parser, Debug)]
#[command(name = "rawimg2iso")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Convert a .raw.xz disk image into an ISO 9660 image", long_about = None)]
struct Cli {
    /// Compressed raw disk image (must end in .raw.xz)
    #[arg(value_name = "INPUT.raw.xz")]
    input: PathBuf,
    /// ISO image to create
    #[arg(value_name = "OUTPUT.iso")]
    output: PathBuf,
    /// Mastering tool to run instead of searching for mkisofs/genisoimage
    #[arg(long, value_name = "PROGRAM")]
    tool: Option<OsString>,
    /// Log debug output, including the mastering tool's own output
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,
    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn log_level(&self) -> Level {
        if self.verbose {
            Level::DEBUG
        } else if self.quiet {
            Level::WARN
        } else {
            Level::INFO
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(parse_exit_code(&e));
        }
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(cli.log_level())
        .init();

    match run(&cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}

fn run(cli: &Cli) -> Result<ConversionReport> {
    let options = ConvertOptions {
        tool: cli.tool.clone(),
        ..Default::default()
    };
    convert(&cli.input, &cli.output, &options).with_context(|| {
        format!(
            "converting '{}' to '{}'",
            cli.input.display(),
            cli.output.display()
        )
    })
}

/// clap uses 2 for usage errors; this tool reports every failure as 1.
/// `--help` and `--version` also arrive as errors and exit 0.
fn parse_exit_code(err: &clap::Error) -> u8 {
    if err.use_stderr() {
        1
    } else {
        0
    }
}

fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<rawimg2iso::Error>()
        .map(rawimg2iso::Error::exit_code)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_two_positionals() {
        let cli = Cli::try_parse_from(["rawimg2iso", "disk.raw.xz", "out.iso"]).unwrap();
        assert_eq!(cli.input, PathBuf::from("disk.raw.xz"));
        assert_eq!(cli.output, PathBuf::from("out.iso"));
        assert!(cli.tool.is_none());
        assert_eq!(cli.log_level(), Level::INFO);
    }

    #[test]
    fn test_wrong_argument_count() {
        for argv in [
            vec!["rawimg2iso"],
            vec!["rawimg2iso", "disk.raw.xz"],
            vec!["rawimg2iso", "disk.raw.xz", "out.iso", "extra"],
        ] {
            let err = Cli::try_parse_from(argv.clone()).unwrap_err();
            assert_eq!(parse_exit_code(&err), 1, "{argv:?}");
            assert!(err.to_string().contains("Usage"), "{argv:?}");
        }
    }

    #[test]
    fn test_help_is_not_an_error_exit() {
        let err = Cli::try_parse_from(["rawimg2iso", "--help"]).unwrap_err();
        assert_eq!(parse_exit_code(&err), 0);

        let err = Cli::try_parse_from(["rawimg2iso", "--version"]).unwrap_err();
        assert_eq!(parse_exit_code(&err), 0);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "rawimg2iso",
            "--tool",
            "/opt/cdrtools/bin/mkisofs",
            "-q",
            "disk.raw.xz",
            "out.iso",
        ])
        .unwrap();
        assert_eq!(cli.tool, Some(OsString::from("/opt/cdrtools/bin/mkisofs")));
        assert_eq!(cli.log_level(), Level::WARN);
    }

    #[test]
    fn test_unknown_flag_exits_one() {
        let err = Cli::try_parse_from(["rawimg2iso", "--bogus", "disk.raw.xz", "out.iso"])
            .unwrap_err();
        assert_eq!(parse_exit_code(&err), 1);
    }

    #[test]
    fn test_exit_code_mapping() {
        let err = anyhow::Error::new(rawimg2iso::Error::argument("bad suffix"))
            .context("converting 'disk.img' to 'out.iso'");
        assert_eq!(exit_code(&err), 1);
        assert_eq!(exit_code(&anyhow::anyhow!("other failure")), 1);
    }
}
