// ABOUTME: Renders the plain-text envelope a finished subagent task returns.

/// Closing line of every report.
pub const REPORT_FOOTER: &str = "=== Task Complete ===";

/// Wrap a subagent's raw answer in the report envelope.
/// `raw_output` is copied verbatim, without escaping.
pub fn format_report(task: &str, type_description: &str, model: &str, raw_output: &str) -> String {
    format!(
        "=== Subagent Task: {} ===\nType: {}\nModel: {}\n\n{}\n\n{}",
        task, type_description, model, raw_output, REPORT_FOOTER
    )
}
