//! HTML Report Generation with Chart.js

use crate::analytics::metrics::{CumulativeDataPoint, MetricsCalculator};
use crate::simulation::orchestrator::Scenario;
use crate::simulation::SimulationResults;
use anyhow::{Context, Result};
use minijinja::{context, Environment};
use std::fs;
use std::path::Path;
use tracing::info;

const REPORT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Front-Running Simulation Report</title>
    <script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
    <style>
        :root {
            --bg-primary: #0a0a0a;
            --bg-card: #1c1c1c;
            --text-primary: #ffffff;
            --text-secondary: #888888;
            --accent-green: #10b981;
            --accent-red: #ef4444;
        }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: var(--bg-primary);
            color: var(--text-primary);
            margin: 0;
        }
        .container { max-width: 1200px; margin: 0 auto; padding: 2rem; }
        header { text-align: center; padding: 3rem 1rem; }
        header .timestamp { color: var(--text-secondary); font-size: 0.875rem; }
        .stats-grid { display: grid; grid-template-columns: repeat(3, 1fr); gap: 1.25rem; margin-bottom: 3rem; }
        .card { background: var(--bg-card); border-radius: 12px; padding: 1.5rem; }
        .card .label { color: var(--text-secondary); font-size: 0.85rem; text-transform: uppercase; }
        .card .value { font-size: 2rem; font-weight: 700; }
        .bad { color: var(--accent-red); }
        .good { color: var(--accent-green); }
        .chart-box { background: var(--bg-card); border-radius: 12px; padding: 1.5rem; margin-bottom: 2rem; height: 360px; }
        table { width: 100%; border-collapse: collapse; }
        td, th { padding: 0.5rem; border-bottom: 1px solid #333; text-align: left; }
    </style>
</head>
<body>
<div class="container">
    <header>
        <h1>Front-Running Simulation</h1>
        <p>{{ total }} registrations · {{ attack_pct }}% attack probability · strategy {{ strategy }}</p>
        <p class="timestamp">Generated {{ timestamp }}</p>
    </header>

    <div class="stats-grid">
        <div class="card"><div class="label">Stolen (unprotected)</div><div class="value bad">{{ unprotected.names_stolen }}</div></div>
        <div class="card"><div class="label">Stolen (protected)</div><div class="value good">{{ protected.names_stolen }}</div></div>
        <div class="card"><div class="label">Protection rate</div><div class="value good">{{ protection_rate }}%</div></div>
        <div class="card"><div class="label">Victim refunds (unprotected)</div><div class="value">{{ unprotected.soft_abort_refunds }}</div></div>
        <div class="card"><div class="label">Revenue (protected)</div><div class="value">{{ protected.controller_revenue }}</div></div>
        <div class="card"><div class="label">Stale commitments purged</div><div class="value">{{ protected.stale_commitments_purged }}</div></div>
    </div>

    <div class="chart-box"><canvas id="theftChart"></canvas></div>
    <div class="chart-box"><canvas id="revenueChart"></canvas></div>

    <div class="card">
        <h3>Victim reveal outcomes</h3>
        <table>
            <tr><th>Scenario</th><th>Registered</th><th>Refunded</th><th>Rejected</th></tr>
            <tr><td>Unprotected</td><td>{{ unprotected_outcomes.registered }}</td><td>{{ unprotected_outcomes.refunded }}</td><td>{{ unprotected_outcomes.rejected }}</td></tr>
            <tr><td>Protected</td><td>{{ protected_outcomes.registered }}</td><td>{{ protected_outcomes.refunded }}</td><td>{{ protected_outcomes.rejected }}</td></tr>
        </table>
    </div>

    <div class="card">
        <h3>Why protected attacks failed</h3>
        <table>
            <tr><th>Reason</th><th>Count</th></tr>
            {% for reason in failure_reasons %}
            <tr><td>{{ reason[0] }}</td><td>{{ reason[1] }}</td></tr>
            {% else %}
            <tr><td colspan="2">No failed attacks</td></tr>
            {% endfor %}
        </table>
    </div>
</div>
<script>
    new Chart(document.getElementById('theftChart'), {
        type: 'line',
        data: {
            labels: {{ labels | tojson }},
            datasets: [
                { label: 'Unprotected', data: {{ unprotected_thefts | tojson }}, borderColor: '#ef4444', fill: false },
                { label: 'Protected', data: {{ protected_thefts | tojson }}, borderColor: '#10b981', fill: false }
            ]
        },
        options: {
            responsive: true,
            maintainAspectRatio: false,
            scales: {
                y: { beginAtZero: true, title: { display: true, text: 'Names Stolen (cumulative)' } },
                x: { title: { display: true, text: 'Registration' } }
            }
        }
    });
    new Chart(document.getElementById('revenueChart'), {
        type: 'line',
        data: {
            labels: {{ labels | tojson }},
            datasets: [
                { label: 'Unprotected', data: {{ unprotected_revenue | tojson }}, borderColor: '#ef4444', fill: false },
                { label: 'Protected', data: {{ protected_revenue | tojson }}, borderColor: '#10b981', fill: false }
            ]
        },
        options: {
            responsive: true,
            maintainAspectRatio: false,
            scales: {
                y: { beginAtZero: true, title: { display: true, text: 'Controller Balance' } },
                x: { title: { display: true, text: 'Registration' } }
            }
        }
    });
</script>
</body>
</html>
"#;

/// Generate an HTML report with interactive charts
pub fn generate_report(results: &SimulationResults, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).context("Failed to create report directory")?;
    }

    let html = render_report(results)?;
    fs::write(output_path, html).context("Failed to write report file")?;

    info!("Report generated: {}", output_path.display());
    Ok(())
}

/// Render the report to a string
pub fn render_report(results: &SimulationResults) -> Result<String> {
    let unprotected_thefts = MetricsCalculator::cumulative_thefts(results, Scenario::Unprotected);
    let protected_thefts = MetricsCalculator::cumulative_thefts(results, Scenario::Protected);
    let failure_reasons = MetricsCalculator::failure_reasons(results, Scenario::Protected);

    let values = |points: Vec<CumulativeDataPoint>| -> Vec<f64> { points.iter().map(|p| p.value).collect() };
    let unprotected_revenue = values(MetricsCalculator::revenue_over_time(results, Scenario::Unprotected));
    let protected_revenue = values(MetricsCalculator::revenue_over_time(results, Scenario::Protected));

    let labels: Vec<u32> = unprotected_thefts.iter().map(|p| p.registration).collect();
    let unprotected_values = values(unprotected_thefts);
    let protected_values = values(protected_thefts);

    let mut env = Environment::new();
    env.add_template("report", REPORT_TEMPLATE)
        .context("Invalid report template")?;
    let template = env.get_template("report").context("Missing report template")?;

    let s = &results.summary;
    template
        .render(context! {
            total => s.total_registrations,
            attack_pct => format!("{:.0}", results.config.attack_probability * 100.0),
            strategy => format!("{:?}", results.config.attack_strategy),
            timestamp => chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            unprotected => &s.unprotected,
            protected => &s.protected,
            protection_rate => format!("{:.1}", s.protection_rate),
            failure_reasons => failure_reasons,
            labels => labels,
            unprotected_thefts => unprotected_values,
            protected_thefts => protected_values,
            unprotected_revenue => unprotected_revenue,
            protected_revenue => protected_revenue,
            unprotected_outcomes => MetricsCalculator::outcome_breakdown(results, Scenario::Unprotected),
            protected_outcomes => MetricsCalculator::outcome_breakdown(results, Scenario::Protected),
        })
        .context("Failed to render report")
}
