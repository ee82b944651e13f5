mod fixtures;
mod memory;
mod reports;
mod scenarios;
mod util;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use scenarios::{ScenarioResult, list_scenarios, run_scenarios, scenario_keys};
use util::{parse_seeds, split_csv};

#[derive(Debug, Parser)]
#[command(name = "nomic-tester", version = "0.1.0")]
#[command(about = "Scenario QA for the Nomic famine engine - rosters, dice grammar and notice flows")]
struct Args {
    /// Scenarios to run (comma-separated; 'all' expands the whole catalog)
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// Print the scenario catalog and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Engine seeds to exercise, comma-separated
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Famine cycles granted to the long-arc scenarios
    #[arg(long, default_value_t = 4)]
    cycles: u32,

    /// Report format for the run summary
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Print per-check progress while scenarios run
    #[arg(short, long)]
    verbose: bool,

    /// Write the report to this file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let scenario_names = expand_scenarios(&args.scenarios);
    let seeds = parse_seeds(&split_csv(&args.seeds))?;
    let results = run_scenarios(&scenario_names, &seeds, args.cycles, args.verbose);

    write_reports(&args, &results, start_time)?;

    if results.iter().any(|result| !result.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut target = ReportTarget::new(args.output.clone())?;
    writeln!(target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(target.writer(), "  {key:20} - {description}")?;
    }
    target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🌾 Nomic Famine Tester".bright_cyan().bold());
    println!("{}", "=".repeat(30).cyan());
}

fn expand_scenarios(scenarios_arg: &str) -> Vec<String> {
    let mut scenario_names = split_csv(scenarios_arg);
    if scenario_names.contains(&"all".to_string()) {
        scenario_names.retain(|name| name != "all");
        scenario_names.extend(scenario_keys());
    }
    scenario_names
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut target = ReportTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => {
            if results.is_empty() {
                writeln!(&mut target, "[]")?;
            } else {
                reports::generate_json_report(&mut target, results)?;
            }
        }
        "markdown" => {
            if results.is_empty() {
                writeln!(
                    &mut target,
                    "# Nomic Famine Test Results\n\n_No scenarios executed._"
                )?;
            } else {
                reports::generate_markdown_report(&mut target, results)?;
            }
        }
        _ => {
            if results.is_empty() {
                writeln!(&mut target, "No scenarios executed.")?;
            } else {
                reports::generate_console_report(&mut target, results, start_time.elapsed())?;
            }
        }
    }

    let duration = start_time.elapsed();
    writeln!(&mut target)?;
    writeln!(&mut target, "🏁 Total time: {duration:?}")?;
    target.flush_inner()?;
    Ok(())
}

enum ReportTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl ReportTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        match path {
            Some(path) => {
                let file = File::create(&path)
                    .with_context(|| format!("failed to create {}", path.display()))?;
                Ok(Self::File(BufWriter::new(file)))
            }
            None => Ok(Self::Stdout(BufWriter::new(stdout()))),
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(writer) => writer,
            Self::File(writer) => writer,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(writer) => writer.flush(),
            Self::File(writer) => writer.flush(),
        }
    }
}

impl Write for ReportTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn base_args() -> Args {
        Args {
            scenarios: "smoke".to_string(),
            list_scenarios: false,
            seeds: "1337".to_string(),
            cycles: 4,
            report: "console".to_string(),
            verbose: false,
            output: None,
        }
    }

    fn sample_result(passed: bool) -> ScenarioResult {
        ScenarioResult {
            scenario_name: "smoke".to_string(),
            seed: 1337,
            passed,
            failures: if passed {
                Vec::new()
            } else {
                vec!["failure".to_string()]
            },
            duration: Duration::from_millis(10),
        }
    }

    fn temp_file(label: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        std::env::temp_dir().join(format!("nomic-tester-{label}-{nanos}"))
    }

    #[test]
    fn expands_the_all_keyword() {
        let expanded = expand_scenarios("all,smoke");
        assert!(expanded.contains(&"smoke".to_string()));
        assert!(expanded.contains(&"village-decline".to_string()));
        assert!(expanded.contains(&"dice-grammar".to_string()));
    }

    #[test]
    fn expanding_without_all_keeps_the_given_order() {
        let expanded = expand_scenarios("smoke,wipeout");
        assert_eq!(expanded, vec!["smoke".to_string(), "wipeout".to_string()]);
    }

    #[test]
    fn listing_scenarios_writes_the_catalog() {
        let temp = temp_file("scenarios");
        let args = Args {
            list_scenarios: true,
            output: Some(temp.clone()),
            ..base_args()
        };
        assert!(maybe_list_scenarios(&args).unwrap());
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("Available scenarios"));
        assert!(content.contains("smoke"));
    }

    #[test]
    fn listing_is_skipped_unless_requested() {
        let args = base_args();
        assert!(!maybe_list_scenarios(&args).unwrap());
    }

    #[test]
    fn write_reports_emits_json_for_empty_results() {
        let temp = temp_file("empty.json");
        let args = Args {
            report: "json".to_string(),
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("[]"));
    }

    #[test]
    fn json_report_includes_scenario_fields() {
        let temp = temp_file("full.json");
        let args = Args {
            report: "json".to_string(),
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[sample_result(true)], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("scenario_name"));
    }

    #[test]
    fn markdown_report_lists_each_scenario() {
        let temp = temp_file("report.md");
        let args = Args {
            report: "markdown".to_string(),
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[sample_result(false)], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("# Nomic Famine Test Results"));
        assert!(content.contains("smoke"));
    }

    #[test]
    fn console_report_prints_the_summary() {
        let temp = temp_file("report.txt");
        let args = Args {
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[sample_result(true)], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("Famine Test Results Summary"));
        assert!(content.contains("Total time"));
    }

    #[test]
    fn report_target_stdout_writes() {
        let mut target = ReportTarget::new(None).unwrap();
        target.write_all(b"ok").unwrap();
        target.flush().unwrap();
    }
}
