// Output formatting for the benchmark report

use anyhow::Result;
use clap::ValueEnum;

use crate::bench::{BenchReport, Partition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn print_report(&self, report: &BenchReport) -> Result<()> {
        match self {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(report)?);
            }
            OutputFormat::Text => print!("{}", render_text(report)),
        }
        Ok(())
    }
}

fn title(partition: Partition) -> &'static str {
    match partition {
        Partition::Strided => "Strided",
        Partition::Blocked => "Blocked",
    }
}

pub fn render_text(report: &BenchReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<14} {}\n{:<14} {}\n{:<14} {}\n{:<14} {}\n",
        "started:",
        report.started_at.to_rfc3339(),
        "elements:",
        report.elements,
        "workers:",
        report.workers,
        "busy:",
        report.pool.busy(),
    ));

    for mode in &report.modes {
        out.push('\n');
        out.push_str(&format!("{}: ---------------------\n", title(mode.partition)));
        out.push_str(&format!(
            "Get: {} in {:.6} sec (expected {})\n",
            mode.total, mode.elapsed_secs, mode.expected
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use weft_core::{PoolPhase, PoolStatus};

    use super::*;
    use crate::bench::ModeReport;

    fn report() -> BenchReport {
        BenchReport {
            started_at: Utc::now(),
            elements: 8,
            value: 1.0,
            workers: 2,
            modes: vec![ModeReport {
                partition: Partition::Blocked,
                tasks: 2,
                total: 8.0,
                expected: 8.0,
                elapsed_secs: 0.25,
            }],
            pool: PoolStatus {
                workers: 2,
                live_workers: 2,
                idle: 2,
                queued: 0,
                phase: PoolPhase::Running,
            },
        }
    }

    #[test]
    fn text_lists_each_mode() {
        let text = render_text(&report());
        assert!(text.contains("workers:       2"));
        assert!(text.contains("busy:          0"));
        assert!(text.contains("Blocked: ---"));
        assert!(text.contains("Get: 8 in 0.250000 sec (expected 8)"));
    }

    #[test]
    fn json_contains_pool_status() {
        let value = serde_json::to_value(report()).unwrap();
        assert_eq!(value["modes"][0]["partition"], "blocked");
        assert_eq!(value["pool"]["phase"], "running");
    }
}
