//! Command-line argument parsing for fetchbench

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use super::defaults::Defaults;
use super::{ConcurrencyMode, OutputConfig, ProxyConfig, RunConfig};
use crate::errors::{BenchError, ErrorContext, Result};

/// Concurrency mode for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConcurrencyModeArg {
    /// Fetch one URL at a time
    Sequential,
    /// Fetch all URLs at once, one worker per URL
    Parallel,
}

/// Top-level command line
#[derive(Parser, Debug, Clone)]
#[command(
    name = "fetchbench",
    version,
    about = "Benchmark HTTP fetch latency over repeated runs and report summary statistics",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Fetch every URL repeatedly, export the timings and print a report
    Run(RunArgs),
    /// Print the statistics report of an exported table
    Report(ReportArgs),
    /// Average several exported tables into one
    Fuse(FuseArgs),
}

/// Raw `run` arguments
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Number of fetches per URL
    #[arg(
        short = 'n',
        long = "runs",
        value_name = "COUNT",
        default_value_t = Defaults::RUN_COUNT,
        help = "Number of fetch runs per URL"
    )]
    pub runs: u32,

    /// Scheduling strategy
    #[arg(
        short = 'm',
        long = "mode",
        value_enum,
        default_value = "sequential",
        help = "Concurrency mode"
    )]
    pub mode: ConcurrencyModeArg,

    /// Enable verbose output
    #[arg(
        short = 'v',
        long = "verbose",
        help = "Print per-URL statistics during the run and enable debug logging"
    )]
    pub verbose: bool,

    /// Target URLs
    #[arg(
        short = 'u',
        long = "url",
        value_name = "URL",
        action = clap::ArgAction::Append,
        help = "URL to benchmark (can be used multiple times)"
    )]
    pub urls: Vec<String>,

    /// File with one URL per line
    #[arg(
        long = "urls-file",
        value_name = "PATH",
        help = "Read URLs from a file, one per line ('#' starts a comment)"
    )]
    pub urls_file: Option<PathBuf>,

    /// Proxy for http:// URLs
    #[arg(long = "http-proxy", value_name = "URL", help = "Proxy used for http URLs")]
    pub http_proxy: Option<String>,

    /// Proxy for https:// URLs
    #[arg(long = "https-proxy", value_name = "URL", help = "Proxy used for https URLs")]
    pub https_proxy: Option<String>,

    /// Per-fetch timeout in seconds
    #[arg(
        long = "timeout",
        value_name = "SECONDS",
        default_value_t = Defaults::TIMEOUT_SECONDS,
        help = "Per-fetch timeout in seconds; a timed out fetch counts as failed"
    )]
    pub timeout: u64,

    /// Parallel worker limit
    #[arg(
        long = "max-workers",
        value_name = "COUNT",
        help = "Maximum URLs fetched at the same time in parallel mode (default: all)"
    )]
    pub max_workers: Option<usize>,

    /// Custom headers
    #[arg(
        short = 'H',
        long = "header",
        value_name = "HEADER",
        action = clap::ArgAction::Append,
        help = "Custom headers in 'Key: Value' format (can be used multiple times)"
    )]
    pub headers: Vec<String>,

    /// Allow insecure connections
    #[arg(
        long = "insecure",
        help = "Allow insecure TLS connections (skip certificate verification)"
    )]
    pub insecure: bool,

    /// Export target
    #[arg(
        short = 'o',
        long = "output",
        value_name = "PATH",
        help = "CSV file for the results table (default: seq_fetch_times.csv or par_fetch_times.csv)"
    )]
    pub output: Option<PathBuf>,

    /// Skip the export step
    #[arg(long = "no-export", conflicts_with = "output", help = "Do not write the results table")]
    pub no_export: bool,

    /// JSON summary target
    #[arg(
        long = "summary-json",
        value_name = "PATH",
        help = "Also write the per-URL statistics as JSON"
    )]
    pub summary_json: Option<PathBuf>,
}

/// Raw `report` arguments
#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Exported results table
    #[arg(value_name = "CSV")]
    pub input: PathBuf,

    /// Print JSON instead of text
    #[arg(long = "json", help = "Print the summary as JSON")]
    pub json: bool,
}

/// Raw `fuse` arguments
#[derive(Args, Debug, Clone)]
pub struct FuseArgs {
    /// Exported results tables, at least two
    #[arg(value_name = "CSV", num_args = 2.., required = true)]
    pub inputs: Vec<PathBuf>,

    /// Target for the averaged table
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: PathBuf,
}

impl Cli {
    /// Parse from command line arguments.
    ///
    /// Argument errors exit with status 1 like every other configuration
    /// error; `--help` and `--version` exit 0.
    pub fn parse_from_args() -> Self {
        Self::try_parse().unwrap_or_else(|e| {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        })
    }
}

impl RunArgs {
    /// Collect URLs from `--url` and `--urls-file`, falling back to the sample site
    fn collect_urls(&self) -> Result<Vec<String>> {
        let mut urls = self.urls.clone();

        if let Some(path) = &self.urls_file {
            let content = std::fs::read_to_string(path)
                .with_config_context(&format!("Cannot read URL file '{}'", path.display()))?;
            urls.extend(parse_url_list(&content));
            if urls.is_empty() {
                return Err(BenchError::config(format!(
                    "URL file '{}' contains no URLs",
                    path.display()
                )));
            }
        }

        if urls.is_empty() {
            urls = Defaults::sample_urls();
        }

        Ok(urls)
    }
}

/// One URL per line; blank lines and `#` comments are skipped
fn parse_url_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| strip_comment(line).trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// A `#` opens a comment only at line start or after whitespace, so URL
/// fragments survive
fn strip_comment(line: &str) -> &str {
    let mut previous: Option<char> = None;
    for (index, c) in line.char_indices() {
        if c == '#' && previous.is_none_or(char::is_whitespace) {
            return &line[..index];
        }
        previous = Some(c);
    }
    line
}

impl TryFrom<RunArgs> for RunConfig {
    type Error = BenchError;

    fn try_from(raw: RunArgs) -> Result<Self> {
        let urls = raw.collect_urls()?;

        let concurrency_mode = match raw.mode {
            ConcurrencyModeArg::Sequential => ConcurrencyMode::Sequential,
            ConcurrencyModeArg::Parallel => ConcurrencyMode::Parallel,
        };

        let proxy = ProxyConfig {
            http: raw.http_proxy,
            https: raw.https_proxy,
        };

        let path = if raw.no_export {
            None
        } else {
            Some(
                raw.output
                    .unwrap_or_else(|| RunConfig::default_output_path(concurrency_mode)),
            )
        };

        let mut config = RunConfig::with_urls(urls);
        config.run_count = raw.runs;
        config.concurrency_mode = concurrency_mode;
        config.proxy = (!proxy.is_empty()).then_some(proxy);
        config.timeout = Duration::from_secs(raw.timeout);
        config.max_workers = raw.max_workers;
        config.headers = raw.headers;
        config.insecure = raw.insecure;
        config.output = OutputConfig {
            verbose: raw.verbose,
            path,
            summary_json: raw.summary_json,
        };
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_run(args: &[&str]) -> RunConfig {
        let cli = Cli::try_parse_from(
            std::iter::once("fetchbench")
                .chain(std::iter::once("run"))
                .chain(args.iter().copied()),
        )
        .unwrap();
        match cli.command {
            Command::Run(raw) => RunConfig::try_from(raw).unwrap(),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_run_defaults() {
        let config = parse_run(&[]);
        assert_eq!(config.run_count, 100);
        assert_eq!(config.concurrency_mode, ConcurrencyMode::Sequential);
        assert_eq!(config.urls, Defaults::sample_urls());
        assert!(config.proxy.is_none());
        assert_eq!(
            config.output.path,
            Some(PathBuf::from(Defaults::SEQUENTIAL_OUTPUT))
        );
    }

    #[test]
    fn test_run_parallel_with_proxy() {
        let config = parse_run(&[
            "-n",
            "5",
            "-m",
            "parallel",
            "-u",
            "http://a.example/",
            "-u",
            "http://b.example/",
            "--http-proxy",
            "http://127.0.0.1:8888",
            "-v",
        ]);
        assert_eq!(config.run_count, 5);
        assert_eq!(config.concurrency_mode, ConcurrencyMode::Parallel);
        assert_eq!(config.urls, vec!["http://a.example/", "http://b.example/"]);
        let proxy = config.proxy.unwrap();
        assert_eq!(proxy.http.as_deref(), Some("http://127.0.0.1:8888"));
        assert!(proxy.https.is_none());
        assert!(config.output.verbose);
        assert_eq!(
            config.output.path,
            Some(PathBuf::from(Defaults::PARALLEL_OUTPUT))
        );
    }

    #[test]
    fn test_no_export_clears_output() {
        let config = parse_run(&["--no-export"]);
        assert!(config.output.path.is_none());
    }

    #[test]
    fn test_no_export_conflicts_with_output() {
        let result = Cli::try_parse_from(["fetchbench", "run", "--no-export", "-o", "x.csv"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_urls_file_extends_cli_urls() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("urls.txt");
        std::fs::write(
            &path,
            "# sample\nhttp://b.example/\n\n  http://c.example/x  # trailing\n",
        )
        .unwrap();
        let config = parse_run(&[
            "-u",
            "http://a.example/",
            "--urls-file",
            path.to_str().unwrap(),
        ]);
        assert_eq!(
            config.urls,
            vec!["http://a.example/", "http://b.example/", "http://c.example/x"]
        );
    }

    #[test]
    fn test_urls_file_keeps_fragments() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("urls.txt");
        std::fs::write(
            &path,
            "http://a.example/page#top\nhttp://a.example/page#bottom # second\n  # indented\n",
        )
        .unwrap();
        let config = parse_run(&["--urls-file", path.to_str().unwrap()]);
        assert_eq!(
            config.urls,
            vec!["http://a.example/page#top", "http://a.example/page#bottom"]
        );
    }

    #[test]
    fn test_fuse_requires_two_inputs() {
        assert!(Cli::try_parse_from(["fetchbench", "fuse", "a.csv", "-o", "out.csv"]).is_err());
        assert!(
            Cli::try_parse_from(["fetchbench", "fuse", "a.csv", "b.csv", "-o", "out.csv"]).is_ok()
        );
    }
}
