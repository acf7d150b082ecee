use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use crate::affordance::AffordanceKind;
use crate::controller::SubmitMode;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file to read instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Root URL of the analysis service
    #[arg(long, global = true, value_name = "URL")]
    pub endpoint: Option<String>,

    /// How the target URL is sent to the service
    #[arg(long, global = true, value_enum)]
    pub submit: Option<Submit>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// More log output on stderr (repeatable)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze a URL and show the extracted metadata
    Analyze {
        #[arg(value_name = "URL")]
        url: Option<String>,
        /// Expand the raw JSON view
        #[arg(long)]
        raw: bool,
        /// Show the response headers
        #[arg(long)]
        headers: bool,
        /// Copy a displayed value to the clipboard
        #[arg(long, value_enum, value_name = "FIELD")]
        copy: Vec<CopyTarget>,
    },
    /// Send a URL for analysis and only report whether it was accepted
    Send {
        #[arg(value_name = "URL")]
        url: Option<String>,
    },
    /// Print the effective configuration
    Config,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Submit {
    /// `?url=` query parameter
    Query,
    /// form-encoded request body
    Form,
}

impl From<Submit> for SubmitMode {
    fn from(s: Submit) -> Self {
        match s {
            Submit::Query => SubmitMode::Query,
            Submit::Form => SubmitMode::Form,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CopyTarget {
    Url,
    Pid,
    AnalysisId,
}

impl From<CopyTarget> for AffordanceKind {
    fn from(t: CopyTarget) -> Self {
        match t {
            CopyTarget::Url => AffordanceKind::Url,
            CopyTarget::Pid => AffordanceKind::PersistentId,
            CopyTarget::AnalysisId => AffordanceKind::AnalysisId,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_accepts_flags_and_repeated_copy() {
        let cli = Cli::try_parse_from([
            "craap",
            "analyze",
            "https://example.com",
            "--raw",
            "--copy",
            "pid",
            "--copy",
            "analysis-id",
        ])
        .expect("parse");
        match cli.command {
            Command::Analyze {
                url,
                raw,
                headers,
                copy,
            } => {
                assert_eq!(url.as_deref(), Some("https://example.com"));
                assert!(raw);
                assert!(!headers);
                assert_eq!(copy, vec![CopyTarget::Pid, CopyTarget::AnalysisId]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn url_is_optional() {
        let cli = Cli::try_parse_from(["craap", "send"]).expect("parse");
        assert!(matches!(cli.command, Command::Send { url: None }));
    }

    #[test]
    fn global_options_work_after_subcommand() {
        let cli = Cli::try_parse_from([
            "craap",
            "analyze",
            "-vv",
            "--submit",
            "form",
            "--endpoint",
            "http://h:1",
        ])
        .expect("parse");
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.submit.map(SubmitMode::from), Some(SubmitMode::Form));
        assert_eq!(cli.endpoint.as_deref(), Some("http://h:1"));
    }

    #[test]
    fn unknown_copy_target_is_rejected() {
        assert!(Cli::try_parse_from(["craap", "analyze", "--copy", "title"]).is_err());
    }
}
