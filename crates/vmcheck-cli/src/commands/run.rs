use crate::support::{load_snapshots_or_exit, print_json_or_exit, resolve_config_or_exit};
use serde_json::json;
use vmcheck_kernel::{CbtCheck, CheckRunner, CycleOutcome, CycleReport};
use vmcheck_metrics::MetricsRegistry;

pub struct Args {
    pub snapshots: Vec<String>,
    pub config: Option<String>,
    pub property_key: Option<String>,
    pub no_metrics: bool,
    pub json: bool,
}

pub fn run(args: Args) {
    let config = resolve_config_or_exit(args.config.as_deref(), args.property_key);
    let snapshots = load_snapshots_or_exit(&args.snapshots);

    let registry = MetricsRegistry::new();
    let sink = registry.register_check(&config).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    });

    let mut runner = CheckRunner::new();
    runner.register(Box::new(CbtCheck::new(&config, Box::new(sink))));

    let outcomes: Vec<(String, CycleOutcome)> = snapshots
        .iter()
        .map(|snapshot| {
            (
                snapshot.path.display().to_string(),
                runner.run_cycle(&snapshot.records),
            )
        })
        .collect();

    let metrics = if args.no_metrics {
        None
    } else {
        Some(registry.encode_text().unwrap_or_else(|e| {
            eprintln!("error: {e}");
            std::process::exit(1);
        }))
    };

    if args.json {
        let cycles: Vec<_> = outcomes
            .iter()
            .map(|(path, outcome)| json!({ "snapshot": path, "outcome": outcome }))
            .collect();
        print_json_or_exit(&json!({
            "property_key": config.property_key,
            "metric_name": config.metric_name,
            "cycles": cycles,
            "metrics": metrics,
        }));
    } else {
        println!(
            "vmcheck run --property-key {} ({} cycle(s))",
            config.property_key,
            outcomes.len()
        );
        for (path, outcome) in &outcomes {
            println!(
                "  Cycle {}: {path}: {} node(s) checked, {} skipped",
                outcome.cycle,
                outcome.nodes_checked,
                outcome.nodes_skipped.len()
            );
            for report in &outcome.reports {
                println!("    {}", summary_line(report));
                if !report.zeroed.is_empty() {
                    println!("      Zeroed: {}", report.zeroed.join(", "));
                }
                for failure in &report.sink_failures {
                    println!("      Sink failure: {} ({})", failure.label, failure.reason);
                }
            }
            for failure in &outcome.failures {
                match &failure.node {
                    Some(node) => println!("    Failure: {} on {node}: {}", failure.check, failure.error),
                    None => println!("    Failure: {}: {}", failure.check, failure.error),
                }
            }
        }
        if let Some(text) = metrics {
            println!();
            print!("{text}");
        }
    }
}

fn summary_line(report: &CycleReport) -> String {
    let counts: Vec<String> = report
        .counts
        .iter()
        .map(|(label, count)| format!("{label}={count}"))
        .collect();
    let counts = if counts.is_empty() {
        "no nodes".to_string()
    } else {
        counts.join(" ")
    };
    format!(
        "{}: {counts} mismatch={}",
        report.check,
        if report.mismatch { "yes" } else { "no" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn summary_line_lists_counts_in_label_order() {
        let report = CycleReport {
            check: "CollectNodeCBT".to_string(),
            counts: BTreeMap::from([("ENABLED".to_string(), 2), ("DISABLED".to_string(), 1)]),
            mismatch: true,
            zeroed: Vec::new(),
            sink_failures: Vec::new(),
        };
        assert_eq!(
            summary_line(&report),
            "CollectNodeCBT: DISABLED=1 ENABLED=2 mismatch=yes"
        );
    }
}
