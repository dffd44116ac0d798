//! Context assembly and prompt templates

use crate::types::record::keys;
use crate::types::Match;

/// Placeholder replaced by the assembled context
const CONTEXT_PLACEHOLDER: &str = "{context}";

/// System instruction for the local backend; `{context}` is substituted
pub const SYSTEM_PROMPT_TEMPLATE: &str = r#"You are an AI assistant specialized in analyzing macroeconomic data.
You will be provided with relevant economic indicators and data points to answer user questions.

Instructions:
1. Use only the provided context to answer questions
2. If the context doesn't contain enough information, say so clearly
3. Provide specific numbers, years, and indicators when available
4. Format your response in a clear, professional manner
5. If asked about trends, compare multiple data points from the context

Context Information:
{context}
"#;

/// System message sent alongside the context to external backends
pub const EXTERNAL_SYSTEM_MESSAGE: &str = "You are an AI assistant specialized in analyzing macroeconomic data. Use the provided context to answer the user's question.";

/// Metadata fields rendered after each match, in order, with their labels
const SUMMARY_FIELDS: [(&str, &str); 3] = [
    (keys::INDICATOR, "Indicator"),
    (keys::UNITS, "Units"),
    (keys::YEAR, "Year"),
];

/// Prompt builder for RAG queries
pub struct PromptBuilder;

impl PromptBuilder {
    /// Render matches into one context string, keeping their order
    pub fn assemble(matches: &[Match]) -> String {
        matches
            .iter()
            .map(Self::render_match)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn render_match(m: &Match) -> String {
        let summary: Vec<String> = SUMMARY_FIELDS
            .iter()
            .filter_map(|(key, label)| {
                m.metadata
                    .get(*key)
                    .map(|value| format!("{}: {}", label, value))
            })
            .collect();

        if summary.is_empty() {
            m.content.clone()
        } else {
            format!("{} ({})", m.content, summary.join(", "))
        }
    }

    /// Substitute the context into the local system prompt
    pub fn build_system_prompt(context: &str) -> String {
        SYSTEM_PROMPT_TEMPLATE.replace(CONTEXT_PLACEHOLDER, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Metadata;

    fn matched(content: &str, fields: &[(&str, &str)]) -> Match {
        let metadata: Metadata = fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Match::new(content, metadata, 0.9)
    }

    #[test]
    fn test_renders_fields_in_fixed_order() {
        let m = matched(
            "In 2007/08, Revenues was 22.7 Annual % Change",
            &[
                ("year", "2007/08"),
                ("source", "indicators.csv"),
                ("units", "Annual % Change"),
                ("indicator", "Revenues"),
                ("value", "22.7"),
            ],
        );

        assert_eq!(
            PromptBuilder::assemble(&[m]),
            "In 2007/08, Revenues was 22.7 Annual % Change \
             (Indicator: Revenues, Units: Annual % Change, Year: 2007/08)"
        );
    }

    #[test]
    fn test_absent_fields_are_skipped() {
        let only_year = matched("a", &[("year", "2008")]);
        let no_summary = matched("b", &[("source", "x.csv")]);

        assert_eq!(PromptBuilder::assemble(&[only_year]), "a (Year: 2008)");
        assert_eq!(PromptBuilder::assemble(&[no_summary]), "b");
    }

    #[test]
    fn test_joins_in_input_order() {
        let low = Match::new("low", Metadata::new(), 0.1);
        let high = Match::new("high", Metadata::new(), 0.9);
        assert_eq!(PromptBuilder::assemble(&[low, high]), "low\n\nhigh");
    }

    #[test]
    fn test_empty_input_is_empty_string() {
        assert_eq!(PromptBuilder::assemble(&[]), "");
    }

    #[test]
    fn test_assemble_is_repeatable() {
        let matches = vec![
            matched("a", &[("indicator", "Revenues")]),
            matched("b", &[("units", "%")]),
        ];
        assert_eq!(
            PromptBuilder::assemble(&matches),
            PromptBuilder::assemble(&matches)
        );
    }

    #[test]
    fn test_system_prompt_embeds_context() {
        let prompt = PromptBuilder::build_system_prompt("In 2008, Revenues was 22.7 %");
        assert!(prompt.contains("Context Information:\nIn 2008, Revenues was 22.7 %"));
        assert!(!prompt.contains("{context}"));
    }
}
