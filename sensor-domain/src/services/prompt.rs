// Explanation prompt template

/// Wraps the descriptive summary of the abnormal rows in the fixed request
/// for causes, risks and corrective actions.
pub fn build_explanation_prompt(anomaly_summary: &str) -> String {
    format!(
        "The following sensor readings were detected as abnormal:\n\n\
{summary}\n\n\
Explain in simple terms:\n\
1. What might have caused these abnormal readings\n\
2. Possible risks to the system\n\
3. Suggested corrective actions\n\
Keep the explanation practical and engineering-focused.\n",
        summary = anomaly_summary.trim_end()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_summary_and_numbered_requests() {
        let prompt = build_explanation_prompt("       temperature\ncount  5.000000\n");
        assert!(prompt.starts_with("The following sensor readings were detected as abnormal:\n\n"));
        assert!(prompt.contains("count  5.000000\n\nExplain in simple terms:"));
        assert!(prompt.contains("1. What might have caused"));
        assert!(prompt.contains("2. Possible risks"));
        assert!(prompt.contains("3. Suggested corrective actions"));
    }
}
