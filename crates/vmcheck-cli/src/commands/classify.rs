use crate::support::{load_snapshots_or_exit, print_json_or_exit, resolve_config_or_exit};
use serde_json::json;
use vmcheck_kernel::classify;

pub fn run(snapshot: String, config: Option<String>, property_key: Option<String>, json_output: bool) {
    let config = resolve_config_or_exit(config.as_deref(), property_key);
    let snapshots = load_snapshots_or_exit(&[snapshot]);
    let Some(snapshot) = snapshots.into_iter().next() else {
        return;
    };
    let key = config.property_key.as_str();

    let rows: Vec<_> = snapshot
        .records
        .iter()
        .map(|record| {
            let vm = record.vm.as_ref();
            let raw = vm
                .and_then(|vm| vm.extra_config.lookup(key))
                .map(|entry| entry.rendered());
            let classification = vm.map(|vm| classify(&vm.extra_config, key));
            (record.node.name.as_str(), raw, classification)
        })
        .collect();

    if json_output {
        let nodes: Vec<_> = rows
            .iter()
            .map(|(node, raw, classification)| {
                json!({
                    "node": node,
                    "value": raw,
                    "classification": classification,
                })
            })
            .collect();
        print_json_or_exit(&json!({
            "snapshot": snapshot.path.display().to_string(),
            "property_key": key,
            "nodes": nodes,
        }));
    } else {
        println!("vmcheck classify {} --property-key {key}", snapshot.path.display());
        for (node, raw, classification) in &rows {
            match classification {
                Some(c) => println!(
                    "  {node}: {c} ({})",
                    raw.as_deref().map_or("property not found".to_string(), |v| format!("value {v}"))
                ),
                None => println!("  {node}: skipped (no VM)"),
            }
        }
    }
}
