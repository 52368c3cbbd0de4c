//! Report rendering and output formatting

use super::{Stats, TableSummary, UrlSummary};
use crate::constants::{RATE_PRECISION, REPORT_RULE, STDDEV_PRECISION, TIME_PRECISION};
use crate::errors::Result;

use std::fmt::Write;
use std::time::Duration;

impl UrlSummary {
    /// Summary printed right after a URL's runs finish (verbose mode)
    pub fn render_run_summary(&self) -> String {
        let Some(stats) = &self.stats else {
            return format!("{} was not fetched successfully!\n", self.url);
        };

        let mut out = format!(
            "It took {:.p$} seconds to fetch benchmark {}\n",
            stats.sum,
            self.url,
            p = TIME_PRECISION
        );
        write_stat_lines(&mut out, "->", stats);
        let _ = writeln!(out, "-> Was fetched {} successfully!", self.successful);
        out
    }

    /// Block of the table-level report for this URL
    pub fn render_report_entry(&self) -> String {
        let mut out = format!("Fetching {} results:\n", self.url);
        let _ = writeln!(
            out,
            "=> {:.p$}% of all URL fetches have been successful.",
            self.success_rate,
            p = RATE_PRECISION
        );
        match &self.stats {
            Some(stats) => write_stat_lines(&mut out, "=>", stats),
            None => {
                let _ = writeln!(out, "=> {} was not fetched successfully!", self.url);
            }
        }
        out
    }
}

fn write_stat_lines(out: &mut String, bullet: &str, stats: &Stats) {
    let _ = writeln!(
        out,
        "{} The average fetch time was {:.p$} seconds",
        bullet,
        stats.mean,
        p = TIME_PRECISION
    );
    let _ = writeln!(
        out,
        "{} The median fetch time was {:.p$} seconds",
        bullet,
        stats.median,
        p = TIME_PRECISION
    );
    let _ = writeln!(
        out,
        "{} The standard deviation was {:.p$}",
        bullet,
        stats.stddev,
        p = STDDEV_PRECISION
    );
    let _ = writeln!(
        out,
        "{} The fastest fetch took {:.p$}",
        bullet,
        stats.min,
        p = TIME_PRECISION
    );
    let _ = writeln!(
        out,
        "{} The slowest fetch took {:.p$}",
        bullet,
        stats.max,
        p = TIME_PRECISION
    );
}

impl TableSummary {
    /// Print the table-level report
    pub fn print_report(&self, run_duration: Option<Duration>) {
        print!("{}", self.render_report(run_duration));
    }

    pub fn render_report(&self, run_duration: Option<Duration>) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "\n📊 Fetch Benchmark Results");
        let _ = writeln!(out, "{}", REPORT_RULE);

        let total: usize = self.urls.iter().map(|u| u.runs).sum();
        let successful: usize = self.urls.iter().map(|u| u.successful).sum();
        let _ = writeln!(out, "\n📈 Overall Results:");
        if let Some(duration) = run_duration {
            let _ = writeln!(out, "   Run Duration:     {:.2}s", duration.as_secs_f64());
        }
        let _ = writeln!(out, "   URLs:             {}", self.urls.len());
        let _ = writeln!(out, "   Runs per URL:     {}", self.run_count);
        let _ = writeln!(out, "   Fetches:          {}", total);
        let _ = writeln!(out, "   Successful:       {}", successful);
        let _ = writeln!(out, "   Failed:           {}", total - successful);

        let _ = writeln!(out, "\n🔄 Per-URL Results:");
        for entry in &self.urls {
            let _ = writeln!(out);
            out.push_str(&entry.render_report_entry());
        }

        let _ = writeln!(out, "{}", REPORT_RULE);
        out
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
