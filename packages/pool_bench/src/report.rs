//! HTML rendering of benchmark results.

use std::fmt;
use std::fs;
use std::path::Path;

use itertools::Itertools;

use crate::{BenchmarkRun, Environment, Error, MedianRow, Result, Strategy};

/// Default file name of the report, relative to the working directory.
pub const DEFAULT_REPORT_PATH: &str = "report.html";

const TITLE: &str = "Multithreading/Multiprocessing benchmark results";

const STYLE: &str = "
body {
  font-size: 10pt;
}

h2 {
  padding-top: 10pt;
}

table {
  font-family: arial, sans-serif;
  border-collapse: collapse;
  width: 100%;
  table-layout: fixed;
}

td, th {
  border: 2px solid #b9b9b9;
  padding: 10px;
  text-align: center;
  width: 25%;
}

th {
  background-color: #d5d5d5;
}

tr:nth-child(odd) {
  background-color: #eeeeee;
}
";

/// A complete HTML5 report of a benchmark run.
///
/// The `Display` form is the document itself. It contains the execution environment, a table
/// with every trial and a table with the per-strategy medians. Timings are given in seconds
/// with three decimal places.
///
/// # Examples
///
/// ```
/// use pool_bench::{BenchmarkRun, Environment, MedianRow, Report, TrialResult};
///
/// # fn main() -> pool_bench::Result<()> {
/// let run = BenchmarkRun::new(vec![TrialResult::new([4.0, 1.5, 1.25, 1.0])])?;
/// let medians = MedianRow::from_run(&run);
/// let environment = Environment::detect();
///
/// let html = Report::new(&run, &medians, &environment).to_string();
/// assert!(html.contains("<td>Medians:</td><td>4.000</td>"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Report<'a> {
    run: &'a BenchmarkRun,
    medians: &'a MedianRow,
    environment: &'a Environment,
}

impl<'a> Report<'a> {
    /// Prepares a report of `run`, summarized by `medians`, measured in `environment`.
    #[must_use]
    pub fn new(run: &'a BenchmarkRun, medians: &'a MedianRow, environment: &'a Environment) -> Self {
        Self {
            run,
            medians,
            environment,
        }
    }

    /// Writes the report to `path`, replacing any file that already exists there.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WriteReport`] if the file cannot be created or written.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_string()).map_err(|source| Error::WriteReport {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(path = %path.display(), "report written");

        Ok(())
    }

    fn write_environment(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let env = self.environment;

        writeln!(f, "<h2>Execution environment</h2>")?;
        writeln!(f, "<p>")?;
        writeln!(f, "Runtime: {}<br/>", Escaped(env.runtime_name()))?;
        writeln!(f, "Compiler version: {}<br/>", Escaped(env.runtime_version()))?;
        writeln!(f, "Benchmark version: {}<br/>", Escaped(env.package_version()))?;
        writeln!(f, "Operating system: {}<br/>", Escaped(env.os_name()))?;
        writeln!(f, "Operating system version: {}<br/>", Escaped(env.os_version()))?;
        writeln!(f, "Processor: {}<br/>", Escaped(env.processor()))?;
        writeln!(f, "CPUs: {}", env.cpu_count())?;
        writeln!(f, "</p>")
    }

    fn write_trials_table(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<table>")?;
        write_header_row(f)?;

        for (number, trial) in (1_usize..).zip(self.run.trials()) {
            writeln!(f, "  {}", table_row(&number.to_string(), trial.samples()))?;
        }

        writeln!(f, "</table>")
    }

    fn write_medians_table(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<table>")?;
        write_header_row(f)?;
        writeln!(f, "  {}", table_row("Medians:", self.medians.values()))?;
        writeln!(f, "</table>")
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<!DOCTYPE html>")?;
        writeln!(f, "<html>")?;
        writeln!(f, "<head>")?;
        writeln!(f, "<meta charset=\"utf-8\" />")?;
        writeln!(f, "<title>{TITLE}</title>")?;
        writeln!(f, "<style>{STYLE}</style>")?;
        writeln!(f, "</head>")?;
        writeln!(f, "<body>")?;
        writeln!(f)?;
        writeln!(f, "<h1>{TITLE}</h1>")?;
        writeln!(f)?;

        self.write_environment(f)?;
        writeln!(f)?;

        writeln!(f, "<h2>Test results</h2>")?;
        writeln!(f, "<p>The following table shows detailed test results:</p>")?;
        self.write_trials_table(f)?;
        writeln!(f)?;

        writeln!(f, "<h2>Summary</h2>")?;
        writeln!(f, "<p>The following table shows the median of all results:</p>")?;
        self.write_medians_table(f)?;
        writeln!(f)?;

        writeln!(f, "</body>")?;
        writeln!(f, "</html>")
    }
}

fn write_header_row(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "  <tr>")?;
    writeln!(f, "    <th>Execution:</th>")?;

    for strategy in Strategy::ALL {
        writeln!(f, "    <th>{}</th>", strategy.column_header())?;
    }

    writeln!(f, "  </tr>")
}

/// `<tr>` with a label cell followed by one cell per sample, formatted to three decimals.
fn table_row(label: &str, seconds: &[f64]) -> String {
    let cells = seconds
        .iter()
        .map(|s| format!("{s:.3}"))
        .format("</td><td>");

    format!("<tr><td>{label}</td><td>{cells}</td></tr>")
}

/// Displays a string with the characters that are significant in HTML text escaped.
struct Escaped<'a>(&'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0.chars() {
            match c {
                '&' => f.write_str("&amp;")?,
                '<' => f.write_str("&lt;")?,
                '>' => f.write_str("&gt;")?,
                '"' => f.write_str("&quot;")?,
                '\'' => f.write_str("&#39;")?,
                other => write!(f, "{other}")?,
            }
        }

        Ok(())
    }
}
