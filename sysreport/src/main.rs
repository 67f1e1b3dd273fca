use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use sysreport::collector::run_collector;
use sysreport::config::Config;
use sysreport::logging::setup_logging;
use sysreport::reporter::run_reporter;

#[derive(Parser, Debug)]
#[command(name = "sysreport", version, about = "Log host metrics to CSV or send the daily PDF report")]
struct Cli {
    /// Sample the host once and append a row to the CSV log
    #[arg(long, conflicts_with = "report")]
    log: bool,

    /// Aggregate the CSV log into a PDF and send it to the webhook
    #[arg(long)]
    report: bool,

    /// Skip the network speed test when logging
    #[arg(long, requires = "log")]
    no_speedtest: bool,
}

#[derive(Debug, PartialEq)]
enum Mode {
    Log { skip_speedtest: bool },
    Report,
}

impl Cli {
    /// `None` when neither mode flag was given.
    fn mode(&self) -> Option<Mode> {
        if self.report {
            Some(Mode::Report)
        } else if self.log {
            Some(Mode::Log {
                skip_speedtest: self.no_speedtest,
            })
        } else {
            None
        }
    }
}

fn print_usage() {
    eprintln!("⚠️  Please pass a mode:");
    eprintln!("   sysreport --log     (record one sample to the CSV log)");
    eprintln!("   sysreport --report  (build and send the PDF report)");
}

#[tokio::main]
async fn main() -> ExitCode {
    let Some(mode) = Cli::parse().mode() else {
        print_usage();
        return ExitCode::FAILURE;
    };

    if let Err(e) = setup_logging() {
        eprintln!("{e}");
    }

    let config = Config::from_env();

    let result = match mode {
        Mode::Report => run_reporter(&config).await.map(|_| ()),
        Mode::Log { skip_speedtest } => run_collector(&config, skip_speedtest).await.map(|_| ()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Run aborted");
            eprintln!("❌ {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(args)
    }

    #[test]
    fn log_and_report_are_exclusive() {
        let err = parse(&["sysreport", "--log", "--report"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn no_speedtest_needs_log() {
        let err = parse(&["sysreport", "--no-speedtest", "--report"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
        assert!(parse(&["sysreport", "--no-speedtest"]).is_err());
    }

    #[test]
    fn bare_invocation_selects_no_mode() {
        let cli = parse(&["sysreport"]).unwrap();
        assert!(!cli.log && !cli.report);
        assert_eq!(cli.mode(), None);
    }

    #[test]
    fn flags_select_mode() {
        assert_eq!(parse(&["sysreport", "--report"]).unwrap().mode(), Some(Mode::Report));
        assert_eq!(
            parse(&["sysreport", "--log"]).unwrap().mode(),
            Some(Mode::Log { skip_speedtest: false })
        );
        assert_eq!(
            parse(&["sysreport", "--log", "--no-speedtest"]).unwrap().mode(),
            Some(Mode::Log { skip_speedtest: true })
        );
    }
}
