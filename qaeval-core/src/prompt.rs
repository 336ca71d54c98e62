//! Judge prompt for scoring a question/answer pair

/// Criteria used when the caller gives none
pub const DEFAULT_CRITERIA: &str = "standard QA evaluation";

const TEMPLATE: &str = r#"You are an expert reviewer of question-answer quality. Evaluate the pair below.

[Question]
{question}

[Answer]
{answer}

[Evaluation criteria]
{criteria}

Score the answer on these 5 dimensions, each an integer from 0 to 100:

1. accuracy (准确性): does the answer correctly address the question
2. completeness (完整性): does it cover every aspect of the question
3. clarity (清晰度): is it clearly expressed and easy to follow
4. professionalism (专业性): does it show professional expertise
5. relevance (相关性): how closely does it stay on the question

Return ONLY the following JSON, with no other text:

{
    "accuracy": 85,
    "completeness": 90,
    "clarity": 88,
    "professionalism": 87,
    "relevance": 92,
    "total_score": 88.4,
    "reasoning": "detailed explanation of the scores..."
}

Note: total_score is the mean of the five dimension scores. Make sure the JSON is valid and the field names are in English.
"#;

/// Render the judge prompt. Blank criteria fall back to [`DEFAULT_CRITERIA`].
pub fn render_evaluation_prompt(question: &str, answer: &str, criteria: &str) -> String {
    let criteria = if criteria.trim().is_empty() {
        DEFAULT_CRITERIA
    } else {
        criteria
    };

    // Fill back to front so placeholders inside user text are never matched.
    TEMPLATE
        .replacen("{criteria}", criteria, 1)
        .replacen("{answer}", answer, 1)
        .replacen("{question}", question, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_all_placeholders() {
        let prompt = render_evaluation_prompt("What is SQL?", "A query language.", "");
        assert!(prompt.contains("[Question]\nWhat is SQL?"));
        assert!(prompt.contains("[Answer]\nA query language."));
        assert!(prompt.contains(DEFAULT_CRITERIA));
        assert!(!prompt.contains("{question}"));
        assert!(!prompt.contains("{answer}"));
        assert!(!prompt.contains("{criteria}"));
    }

    #[test]
    fn user_text_is_not_reinterpolated() {
        let prompt = render_evaluation_prompt("{answer}", "real answer", "strict");
        assert!(prompt.contains("[Question]\n{answer}"));
        assert!(prompt.contains("[Answer]\nreal answer"));
    }
}
