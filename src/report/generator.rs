//! Report generation.
//!
//! This module renders a dispatch [`Report`] as plain text, Markdown or JSON.

use crate::agent::AgentKind;
use crate::analysis::{failures, group_by_agent, group_by_kind, slowest_deliveries, success_rate};
use crate::models::{AgentStatus, BatchSummary, Report, ReportMetadata, TaskOutcome};
use anyhow::Result;

const KINDS: [AgentKind; 3] = [AgentKind::Ground, AgentKind::Air, AgentKind::Sea];

/// Generate the plain-text rendering: one line per task, then a summary.
pub fn generate_text_report(report: &Report) -> String {
    let mut output = String::new();

    output.push_str("Delivery Management System\n\n");

    let statuses: std::collections::HashMap<&str, &str> = report
        .fleet
        .iter()
        .map(|s| (s.agent_id.as_str(), s.status.as_str()))
        .collect();

    for outcome in &report.outcomes {
        output.push_str(&format!(
            "[{}] {} -> {}: {}\n",
            outcome.task_index, outcome.agent_id, outcome.destination, outcome.outcome
        ));
        if let Some(status) = statuses.get(outcome.agent_id.as_str()) {
            output.push_str(&format!("    Transport status: {}\n", status));
        }
    }

    output.push_str(&format!(
        "\n{} delivered, {} failed, {} total in {:.1}s\n",
        report.summary.delivered,
        report.summary.failed,
        report.summary.total,
        report.metadata.duration_seconds
    ));

    output
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    output.push_str("# Dispatch Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_fleet_section(&report.fleet));
    output.push_str(&generate_summary_section(&report.summary, &report.outcomes));
    output.push_str(&generate_outcomes_section(&report.outcomes));
    output.push_str(&generate_failures_section(&report.outcomes));

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!(
        "- **Dispatched At:** {}\n",
        metadata.dispatched_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Agents:** {}\n", metadata.agents));
    section.push_str(&format!("- **Tasks:** {}\n", metadata.tasks));
    section.push_str(&format!("- **Delivered:** {}\n", metadata.delivered));
    if metadata.failed > 0 {
        section.push_str(&format!("- **Failed:** {}\n", metadata.failed));
    }
    section.push_str(&format!(
        "- **Batch Duration:** {:.1}s\n\n",
        metadata.duration_seconds
    ));

    section
}

/// Generate the fleet status section.
fn generate_fleet_section(fleet: &[AgentStatus]) -> String {
    if fleet.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Fleet\n\n");
    section.push_str("| Agent | Kind | Status |\n");
    section.push_str("|:---|:---:|:---|\n");
    for agent in fleet {
        section.push_str(&format!(
            "| `{}` | {} | {} |\n",
            agent.agent_id, agent.agent_kind, agent.status
        ));
    }
    section.push('\n');

    section
}

/// Generate the summary section.
fn generate_summary_section(summary: &BatchSummary, outcomes: &[TaskOutcome]) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str("| Delivered | Failed | **Total** | Success Rate |\n");
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | **{}** | {:.0}% |\n\n",
        summary.delivered,
        summary.failed,
        summary.total,
        success_rate(summary) * 100.0
    ));

    let by_kind = group_by_kind(outcomes);
    if !by_kind.is_empty() {
        section.push_str("### By Transport Kind\n\n");
        section.push_str("| Kind | Tasks | Delivered | Failed |\n");
        section.push_str("|:---|:---:|:---:|:---:|\n");
        for kind in KINDS {
            if let Some(tasks) = by_kind.get(&kind) {
                let counts = summary.by_kind.get(&kind).copied().unwrap_or_default();
                section.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    kind,
                    tasks.len(),
                    counts.delivered,
                    counts.failed
                ));
            }
        }
        section.push('\n');
    }

    let by_agent = group_by_agent(outcomes);
    if !by_agent.is_empty() {
        section.push_str("### By Agent\n\n");
        section.push_str("| Agent | Destinations |\n");
        section.push_str("|:---|:---|\n");

        let mut agents: Vec<_> = by_agent.into_iter().collect();
        agents.sort_by(|a, b| a.0.cmp(&b.0));
        for (agent, tasks) in agents {
            let destinations: Vec<_> = tasks.iter().map(|t| t.destination.as_str()).collect();
            section.push_str(&format!("| `{}` | {} |\n", agent, destinations.join(", ")));
        }
        section.push('\n');
    }

    let slowest = slowest_deliveries(outcomes, 3);
    if !slowest.is_empty() {
        section.push_str("### Slowest Deliveries\n\n");
        for o in slowest {
            section.push_str(&format!(
                "- `{}` to {}: {} ms\n",
                o.agent_id, o.destination, o.elapsed_ms
            ));
        }
        section.push('\n');
    }

    section
}

/// Generate the per-task outcome table.
fn generate_outcomes_section(outcomes: &[TaskOutcome]) -> String {
    let mut section = String::new();

    section.push_str("## Outcomes\n\n");

    if outcomes.is_empty() {
        section.push_str("No tasks were dispatched.\n\n");
        return section;
    }

    section.push_str("| # | Agent | Destination | Result | Detail |\n");
    section.push_str("|:---:|:---|:---|:---:|:---|\n");
    for o in outcomes {
        let badge = if o.outcome.is_delivered() {
            "✅ delivered"
        } else {
            "❌ failed"
        };
        section.push_str(&format!(
            "| {} | `{}` | {} | {} | {} |\n",
            o.task_index,
            o.agent_id,
            o.destination,
            badge,
            o.outcome.text()
        ));
    }
    section.push('\n');

    section
}

/// Generate the failures section.
fn generate_failures_section(outcomes: &[TaskOutcome]) -> String {
    let failed = failures(outcomes);
    if failed.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Failures\n\n");
    for o in failed {
        section.push_str(&format!(
            "- **{} {} → {}:** {}\n",
            o.agent_kind.vehicle(),
            o.agent_id,
            o.destination,
            o.outcome.text()
        ));
    }
    section.push('\n');

    section
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
