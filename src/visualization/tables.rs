use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, ContentArrangement, Table};

use crate::analysis::{ConvergenceSummary, ImplicationReport, ScenarioEngine, SensitivityReport};
use crate::models::{Milestone, ProjectionPoint};

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn heading(output: &mut String, title: &str) {
    output.push_str(&format!("\n{}\n", title.bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(50)));
}

fn opt(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => "n/a".to_string(),
    }
}

fn pct(rate: f64) -> String {
    format!("{:.2}%", rate * 100.0)
}

/// Format the headline convergence figures as a string.
pub fn format_convergence_summary(summary: &ConvergenceSummary) -> String {
    let mut output = String::new();
    heading(
        &mut output,
        &format!("Convergence: {} -> {}", summary.chaser, summary.target),
    );

    let mut table = new_table(vec!["Metric", "Value"]);
    table.add_row(vec![Cell::new("Base Year"), Cell::new(summary.base_year)]);
    table.add_row(vec![
        Cell::new("Chaser Income"),
        Cell::new(format!("{:.0}", summary.chaser_income)),
    ]);
    table.add_row(vec![
        Cell::new("Target Income"),
        Cell::new(format!("{:.0}", summary.target_income)),
    ]);
    table.add_row(vec![
        Cell::new("Chaser Growth"),
        Cell::new(pct(summary.chaser_growth_rate)),
    ]);
    table.add_row(vec![
        Cell::new("Target Growth"),
        Cell::new(pct(summary.target_growth_rate)),
    ]);
    table.add_row(vec![
        Cell::new("Time to Converge"),
        Cell::new(summary.convergence.to_string()),
    ]);
    table.add_row(vec![
        Cell::new("Convergence Year"),
        Cell::new(
            summary
                .convergence_year
                .map(|y| y.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ),
    ]);
    if let Some(rate) = summary.required_growth_rate {
        table.add_row(vec![Cell::new("Growth Needed (horizon)"), Cell::new(pct(rate))]);
    }

    output.push_str(&format!("{table}"));
    output
}

/// Print the headline convergence figures.
pub fn print_convergence_summary(summary: &ConvergenceSummary) {
    print!("{}", format_convergence_summary(summary));
}

/// Format a projection as a table, showing every `step`-th year plus the last.
pub fn format_projection_table(points: &[ProjectionPoint], step: usize) -> String {
    let mut output = String::new();
    heading(&mut output, "Income Projection");

    let mut table = new_table(vec!["Year", "Chaser", "Target", "Ratio"]);
    let step = step.max(1);
    for (i, point) in points.iter().enumerate() {
        if i % step != 0 && i + 1 != points.len() {
            continue;
        }
        table.add_row(vec![
            Cell::new(point.year),
            Cell::new(format!("{:.0}", point.chaser_value)),
            Cell::new(format!("{:.0}", point.target_value)),
            Cell::new(opt(point.ratio().map(|r| r * 100.0), 1) + "%"),
        ]);
    }

    output.push_str(&format!("{table}"));
    output
}

/// Print a projection table.
pub fn print_projection_table(points: &[ProjectionPoint], step: usize) {
    print!("{}", format_projection_table(points, step));
}

/// Format milestone crossings as a string.
pub fn format_milestone_table(milestones: &[Milestone]) -> String {
    let mut output = String::new();
    heading(&mut output, "Milestones");

    if milestones.is_empty() {
        output.push_str("  No milestone reached within the horizon.\n");
        return output;
    }

    let mut table = new_table(vec!["Share of Target", "Year", "Chaser", "Target"]);
    for m in milestones {
        table.add_row(vec![
            Cell::new(format!("{:.0}%", m.percentage * 100.0)),
            Cell::new(m.year),
            Cell::new(format!("{:.0}", m.chaser_value)),
            Cell::new(format!("{:.0}", m.target_value)),
        ]);
    }

    output.push_str(&format!("{table}"));
    output
}

/// Print milestone crossings.
pub fn print_milestone_table(milestones: &[Milestone]) {
    print!("{}", format_milestone_table(milestones));
}

/// Format sensitivity bands as a string.
pub fn format_sensitivity_table(report: &SensitivityReport) -> String {
    let mut output = String::new();
    heading(&mut output, "Growth Sensitivity");

    let mut table = new_table(vec!["Case", "Chaser Growth", "Years", "Year"]);
    for (label, case) in [
        ("Optimistic", &report.optimistic),
        ("Baseline", &report.baseline),
        ("Pessimistic", &report.pessimistic),
    ] {
        table.add_row(vec![
            Cell::new(label),
            Cell::new(pct(case.chaser_growth_rate)),
            Cell::new(case.convergence.to_string()),
            Cell::new(
                case.convergence_year
                    .map(|y| y.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]);
    }

    output.push_str(&format!("{table}"));
    output
}

/// Print sensitivity bands.
pub fn print_sensitivity_table(report: &SensitivityReport) {
    print!("{}", format_sensitivity_table(report));
}

/// Format implied metric levels and totals as a string.
pub fn format_implications_table(report: &ImplicationReport) -> String {
    let mut output = String::new();
    heading(
        &mut output,
        &format!(
            "Implications in {} ({} scenario, {} donors)",
            report.target_year, report.scenario, report.donor_pool
        ),
    );
    output.push_str(&format!(
        "{}\n",
        format!(
            "Income {:.0} -> {:.0} | Population {} -> {}",
            report.income_current,
            report.income_future,
            opt(report.population_current, 0),
            opt(report.population_future, 0)
        )
        .dimmed()
    ));

    let mut table = new_table(vec![
        "Metric",
        "Current",
        "Implied",
        "Current Total",
        "Implied Total",
        "Unit",
        "Basis",
    ]);
    for row in &report.rows {
        let basis = if row.implication.anchored {
            "anchored"
        } else if row.adjusted.is_some() {
            "template"
        } else {
            "-"
        };
        table.add_row(vec![
            Cell::new(&row.label),
            Cell::new(opt(row.implication.entity_current, 1)),
            Cell::new(opt(row.adjusted, 1)),
            Cell::new(opt(row.totals.current_total, 1)),
            Cell::new(opt(row.totals.implied_total, 1)),
            Cell::new(row.total_unit.unwrap_or("")),
            Cell::new(basis),
        ]);
    }

    output.push_str(&format!("{table}"));
    output
}

/// Print implied metric levels and totals.
pub fn print_implications_table(report: &ImplicationReport) {
    print!("{}", format_implications_table(report));
}

/// Format the scenario table as a string.
pub fn format_scenario_table(engine: &ScenarioEngine) -> String {
    let mut output = String::new();
    heading(&mut output, "Scenarios");

    let mut table = new_table(vec!["Id", "Name", "Adjustments"]);
    for scenario in engine.scenarios() {
        let adjustments = scenario
            .adjustments
            .iter()
            .map(|(code, adj)| {
                let mut parts = Vec::new();
                if let Some(m) = adj.multiplier {
                    parts.push(format!("x{m}"));
                }
                if let Some(p) = adj.additive_points {
                    parts.push(format!("{p:+} pts"));
                }
                format!("{code}: {}", parts.join(", "))
            })
            .collect::<Vec<_>>()
            .join("\n");
        table.add_row(vec![
            Cell::new(&scenario.id),
            Cell::new(&scenario.name),
            Cell::new(if adjustments.is_empty() {
                "none".to_string()
            } else {
                adjustments
            }),
        ]);
    }

    output.push_str(&format!("{table}"));
    output
}

/// Print the scenario table.
pub fn print_scenario_table(engine: &ScenarioEngine) {
    print!("{}", format_scenario_table(engine));
}
