mod tables;

pub use tables::{
    format_convergence_summary, print_convergence_summary,
    format_projection_table, print_projection_table,
    format_milestone_table, print_milestone_table,
    format_sensitivity_table, print_sensitivity_table,
    format_implications_table, print_implications_table,
    format_scenario_table, print_scenario_table,
};
