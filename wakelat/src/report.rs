use wakelat_common::{BenchConfig, Scenario};

use crate::drivers::ScenarioReport;

/// Scenario label used in every report line, e.g. `single` or `periodic, 10us`.
pub fn scenario_tag(report: &ScenarioReport) -> String {
    match report.scenario {
        Scenario::WakeupSingle => "single".to_string(),
        Scenario::WakeupPeriodic => format!("periodic, {}us", report.arrival_rate_us),
    }
}

/// The eight text lines for one scenario, in report order.
pub fn render_text(report: &ScenarioReport) -> Vec<String> {
    let tag = scenario_tag(report);
    report
        .costs
        .labeled()
        .iter()
        .map(|(label, value)| format!("wakeup cost {label:<8}({tag}): {value} \t\tus"))
        .collect()
}

/// One JSON object per scenario.
pub fn render_json(report: &ScenarioReport) -> serde_json::Result<String> {
    serde_json::to_string(report)
}

/// Configuration dump printed before real-time runs.
pub fn render_config(config: &BenchConfig) -> Vec<String> {
    vec![
        "test configuration:".to_string(),
        format!("\twakeup interval: {} us", config.arrival_rate_us),
        format!("\tnum_loops: {}", config.loop_count),
        format!("\tnum_threads: {}", config.thread_count),
        format!("\tRT policy: {}", config.scheduling.policy_name()),
    ]
}
