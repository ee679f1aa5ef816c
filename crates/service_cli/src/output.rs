//! Console output formatting.

use risk_sim::SimulationResult;

const RULE: &str = "==================================================";

/// Pretty-prints a simulation result to stdout.
pub fn print_result(result: &SimulationResult) {
    if !result.success {
        println!("Simulation failed:");
        for error in &result.errors {
            println!("  - {error}");
        }
        return;
    }

    let metadata = result.metadata.as_ref();
    let symbol = metadata
        .and_then(|m| m.currency.as_deref())
        .unwrap_or("$");
    let code = metadata
        .and_then(|m| m.currency_code.as_deref())
        .unwrap_or("USD");

    println!("\n{RULE}");
    println!("Cyrisk Simulation Results");
    println!("{RULE}");
    if let Some(meta) = metadata {
        if let Some(name) = &meta.model_name {
            println!("Model: {name}");
        }
        println!("Runs: {}", meta.runs);
        if let Some(seed) = meta.seed {
            println!("Seed: {seed}");
        }
        if let Some(runtime) = meta.runtime_ms {
            println!("Runtime: {runtime:.2} ms");
        }
    }
    println!("Currency: {code} ({symbol})");

    println!("\n{RULE}");
    println!("Risk Metrics");
    println!("{RULE}");
    if let Some(metrics) = &result.metrics {
        println!("EAL (Expected Annual Loss):  {symbol}{:.2}", metrics.eal);
        println!("VaR 95%:                     {symbol}{:.2}", metrics.var_95);
        println!("VaR 99%:                     {symbol}{:.2}", metrics.var_99);
        println!("VaR 99.9%:                   {symbol}{:.2}", metrics.var_999);
        println!();
        println!("Min Loss:                    {symbol}{:.2}", metrics.min);
        println!("Max Loss:                    {symbol}{:.2}", metrics.max);
        println!("Median Loss:                 {symbol}{:.2}", metrics.median);
        println!("Std Deviation:               {symbol}{:.2}", metrics.std_dev);
    }
    println!("{RULE}\n");
}
