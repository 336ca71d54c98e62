//! Evaluation response parsing
//!
//! LLM judges are asked for a JSON object with five 0-100 sub-scores, a total
//! and a free-text rationale. Replies are rarely clean, so parsing degrades in
//! stages:
//!
//! ```text
//! reply → fenced ```json block → any fenced {...} block → first '{'..last '}' → raw text
//!       → serde_json → normalized keys (English or Chinese aliases)
//!       ↘ on JSON failure: per-field regex over bilingual patterns
//!       ↘ nothing found: all zeros + error reason
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const NO_REASONING: &str = "no detailed reasoning provided";

/// A single scored dimension (or the total)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreField {
    Accuracy,
    Completeness,
    Clarity,
    Professionalism,
    Relevance,
    Total,
}

impl ScoreField {
    /// The five sub-scores, in prompt order.
    pub const SUB_SCORES: [ScoreField; 5] = [
        ScoreField::Accuracy,
        ScoreField::Completeness,
        ScoreField::Clarity,
        ScoreField::Professionalism,
        ScoreField::Relevance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accuracy => "accuracy",
            Self::Completeness => "completeness",
            Self::Clarity => "clarity",
            Self::Professionalism => "professionalism",
            Self::Relevance => "relevance",
            Self::Total => "total_score",
        }
    }

    /// Map a normalized JSON key to its field.
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "accuracy" | "准确性" => Some(Self::Accuracy),
            "completeness" | "完整性" => Some(Self::Completeness),
            "clarity" | "清晰度" => Some(Self::Clarity),
            "professionalism" | "专业性" => Some(Self::Professionalism),
            "relevance" | "相关性" => Some(Self::Relevance),
            "total_score" | "totalscore" | "总分" | "总体分数" => Some(Self::Total),
            _ => None,
        }
    }

    /// Label used in free-text replies ("准确性: 85").
    fn chinese_label(&self) -> &'static str {
        match self {
            Self::Accuracy => "准确性",
            Self::Completeness => "完整性",
            Self::Clarity => "清晰度",
            Self::Professionalism => "专业性",
            Self::Relevance => "相关性",
            Self::Total => "总分",
        }
    }
}

fn is_reasoning_key(key: &str) -> bool {
    matches!(key, "reasoning" | "评价理由" | "理由")
}

/// Scores for one question/answer pair
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EvaluationScores {
    pub accuracy: f64,
    pub completeness: f64,
    pub clarity: f64,
    pub professionalism: f64,
    pub relevance: f64,
    pub total_score: f64,
    pub reasoning: String,
}

impl EvaluationScores {
    /// All-zero evaluation carrying a reason.
    pub fn zero(reason: impl Into<String>) -> Self {
        Self {
            reasoning: reason.into(),
            ..Self::default()
        }
    }

    pub fn get(&self, field: ScoreField) -> f64 {
        match field {
            ScoreField::Accuracy => self.accuracy,
            ScoreField::Completeness => self.completeness,
            ScoreField::Clarity => self.clarity,
            ScoreField::Professionalism => self.professionalism,
            ScoreField::Relevance => self.relevance,
            ScoreField::Total => self.total_score,
        }
    }

    fn set(&mut self, field: ScoreField, value: f64) {
        let slot = match field {
            ScoreField::Accuracy => &mut self.accuracy,
            ScoreField::Completeness => &mut self.completeness,
            ScoreField::Clarity => &mut self.clarity,
            ScoreField::Professionalism => &mut self.professionalism,
            ScoreField::Relevance => &mut self.relevance,
            ScoreField::Total => &mut self.total_score,
        };
        *slot = value.clamp(0.0, 100.0);
    }

    /// Arithmetic mean of the five sub-scores.
    pub fn sub_score_mean(&self) -> f64 {
        let sum: f64 = ScoreField::SUB_SCORES.iter().map(|f| self.get(*f)).sum();
        sum / ScoreField::SUB_SCORES.len() as f64
    }
}

/// Which stage produced the scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMethod {
    Json,
    Regex,
    Failed,
}

/// Result of parsing one LLM reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedEvaluation {
    pub scores: EvaluationScores,
    pub method: ParseMethod,
    /// Set whenever the reply was not clean JSON
    pub error: Option<String>,
}

impl ParsedEvaluation {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Evaluation that never reached parsing (provider error, unknown model).
    pub fn failed(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            scores: EvaluationScores::zero(reason.clone()),
            method: ParseMethod::Failed,
            error: Some(reason),
        }
    }
}

/// Locate the JSON candidate inside a reply.
pub fn extract_json(response: &str) -> &str {
    if let Some(start) = response.find("```json") {
        let body_start = start + "```json".len();
        if let Some(len) = response[body_start..].find("```") {
            return response[body_start..body_start + len].trim();
        }
    }

    if response.contains("```") {
        for part in response.split("```") {
            let part = part.trim();
            if part.starts_with('{') && part.ends_with('}') {
                return part;
            }
        }
    }

    if let (Some(start), Some(end)) = (response.find('{'), response.rfind('}')) {
        if start < end {
            return &response[start..=end];
        }
    }

    response.trim()
}

/// Parse a judge reply into scores.
pub fn parse_evaluation(response: &str) -> ParsedEvaluation {
    let candidate = extract_json(response);

    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) => match scores_from_object(&map) {
            Some(scores) => ParsedEvaluation {
                scores,
                method: ParseMethod::Json,
                error: None,
            },
            None => ParsedEvaluation::failed("parse error: no score fields in reply"),
        },
        Ok(other) => ParsedEvaluation::failed(format!(
            "parse error: expected a JSON object, got {}",
            json_kind(&other)
        )),
        Err(e) => {
            let error = format!("JSON parse failed: {}", e);
            match scores_from_text(response) {
                Some(scores) => ParsedEvaluation {
                    scores,
                    method: ParseMethod::Regex,
                    error: Some(error),
                },
                None => ParsedEvaluation::failed(error),
            }
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Numbers pass through; strings keep only digits and dots ("85分" → 85).
fn lenient_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let digits: String = s.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
            digits.parse().ok()
        }
        _ => None,
    }
}

fn scores_from_object(map: &Map<String, Value>) -> Option<EvaluationScores> {
    let mut scores = EvaluationScores::default();
    let mut found = Vec::new();
    let mut reasoning = None;

    for (key, value) in map {
        let key = normalize_key(key);
        if is_reasoning_key(&key) {
            reasoning = Some(match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            });
        } else if let Some(field) = ScoreField::from_key(&key) {
            if let Some(n) = lenient_number(value) {
                scores.set(field, n);
                found.push(field);
            }
        }
    }

    if found.is_empty() {
        return None;
    }
    scores.reasoning = reasoning.unwrap_or_else(|| NO_REASONING.to_owned());
    settle_total(&mut scores, &found);
    Some(scores)
}

static FIELD_PATTERNS: Lazy<Vec<(ScoreField, Vec<Regex>)>> = Lazy::new(|| {
    let number = r"(\d+(?:\.\d+)?)";
    ScoreField::SUB_SCORES
        .iter()
        .chain(std::iter::once(&ScoreField::Total))
        .map(|field| {
            let patterns = [
                format!(r"(?i){}[：:]\s*{}", field.chinese_label(), number),
                format!(r"(?i){}[：:]\s*{}", field.as_str(), number),
                format!(r#"(?i)"{}"\s*:\s*{}"#, field.as_str(), number),
            ]
            .iter()
            .map(|p| Regex::new(p).expect("invalid score regex"))
            .collect();
            (*field, patterns)
        })
        .collect()
});

/// Regex fallback. `None` when not a single score could be found.
fn scores_from_text(response: &str) -> Option<EvaluationScores> {
    let mut scores = EvaluationScores::zero("regex extraction");
    let mut found = Vec::new();

    for (field, patterns) in FIELD_PATTERNS.iter() {
        let hit = patterns
            .iter()
            .find_map(|re| re.captures(response))
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok());
        if let Some(value) = hit {
            scores.set(*field, value);
            found.push(*field);
        }
    }

    if found.is_empty() {
        return None;
    }
    settle_total(&mut scores, &found);
    Some(scores)
}

/// With all five sub-scores the total is their mean; otherwise a reported
/// total is kept and a missing one falls back to the mean when any
/// sub-score is positive.
fn settle_total(scores: &mut EvaluationScores, found: &[ScoreField]) {
    let all_subs = ScoreField::SUB_SCORES.iter().all(|f| found.contains(f));
    if all_subs {
        scores.total_score = scores.sub_score_mean();
        return;
    }

    if scores.total_score == 0.0
        && ScoreField::SUB_SCORES.iter().any(|f| scores.get(*f) > 0.0)
    {
        scores.total_score = scores.sub_score_mean();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEAN: &str = r#"{
        "accuracy": 85,
        "completeness": 90,
        "clarity": 88,
        "professionalism": 87,
        "relevance": 92,
        "total_score": 50,
        "reasoning": "solid answer"
    }"#;

    #[test]
    fn extracts_fenced_json_block() {
        let reply = "Here you go:\n```json\n{\"accuracy\": 1}\n```\nthanks";
        assert_eq!(extract_json(reply), "{\"accuracy\": 1}");
    }

    #[test]
    fn extracts_unlabeled_fence() {
        let reply = "```\n{\"clarity\": 2}\n```";
        assert_eq!(extract_json(reply), "{\"clarity\": 2}");
    }

    #[test]
    fn extracts_brace_span() {
        let reply = "Score: {\"relevance\": 3} end";
        assert_eq!(extract_json(reply), "{\"relevance\": 3}");
    }

    #[test]
    fn falls_back_to_trimmed_text() {
        assert_eq!(extract_json("  no json here  "), "no json here");
    }

    #[test]
    fn total_is_mean_when_all_sub_scores_parse() {
        let parsed = parse_evaluation(CLEAN);
        assert!(parsed.is_success());
        assert_eq!(parsed.method, ParseMethod::Json);
        assert!((parsed.scores.total_score - 88.4).abs() < 1e-9);
        assert_eq!(parsed.scores.reasoning, "solid answer");
    }

    #[test]
    fn normalizes_chinese_and_spaced_keys() {
        let reply = r#"{"准确性": 80, " Completeness ": "90分", "清晰度": 70,
                        "专业性": 60, "相关性": 100, "评价理由": "ok"}"#;
        let parsed = parse_evaluation(reply);
        assert_eq!(parsed.scores.accuracy, 80.0);
        assert_eq!(parsed.scores.completeness, 90.0);
        assert_eq!(parsed.scores.total_score, 80.0);
        assert_eq!(parsed.scores.reasoning, "ok");
    }

    #[test]
    fn keeps_reported_total_when_sub_scores_missing() {
        let parsed = parse_evaluation(r#"{"accuracy": 90, "total_score": 75}"#);
        assert_eq!(parsed.scores.total_score, 75.0);
        assert_eq!(parsed.scores.reasoning, NO_REASONING);
    }

    #[test]
    fn computes_total_from_partial_sub_scores() {
        let parsed = parse_evaluation(r#"{"accuracy": 50}"#);
        assert_eq!(parsed.scores.total_score, 10.0);
    }

    #[test]
    fn regex_fallback_on_broken_json() {
        let reply = "准确性: 80\ncompleteness：70\n\"clarity\": 60\nprofessionalism: 50, relevance: 40 {oops";
        let parsed = parse_evaluation(reply);
        assert_eq!(parsed.method, ParseMethod::Regex);
        assert!(!parsed.is_success());
        assert!(parsed.error.as_deref().unwrap().starts_with("JSON parse failed"));
        assert_eq!(parsed.scores.accuracy, 80.0);
        assert_eq!(parsed.scores.relevance, 40.0);
        assert_eq!(parsed.scores.total_score, 60.0);
    }

    #[test]
    fn total_failure_is_all_zero_with_reason() {
        let parsed = parse_evaluation("I cannot evaluate this.");
        assert_eq!(parsed.method, ParseMethod::Failed);
        let scores = &parsed.scores;
        for field in ScoreField::SUB_SCORES {
            assert_eq!(scores.get(field), 0.0);
        }
        assert_eq!(scores.total_score, 0.0);
        assert!(parsed.error.is_some());
        assert_eq!(Some(scores.reasoning.as_str()), parsed.error.as_deref());
    }

    #[test]
    fn object_without_score_fields_is_a_failure() {
        let parsed = parse_evaluation(r#"{"score": 85, "reasoning": "good"}"#);
        assert!(!parsed.is_success());
        assert_eq!(parsed.method, ParseMethod::Failed);
        assert_eq!(parsed.scores.total_score, 0.0);
        assert!(parsed.error.unwrap().contains("no score fields"));
    }

    #[test]
    fn non_object_json_is_a_failure() {
        let parsed = parse_evaluation("[1, 2, 3]");
        assert_eq!(parsed.method, ParseMethod::Failed);
        assert!(parsed.error.unwrap().contains("an array"));
    }

    #[test]
    fn scores_are_clamped_to_percent_range() {
        let parsed = parse_evaluation(r#"{"accuracy": 150, "total_score": -5}"#);
        assert_eq!(parsed.scores.accuracy, 100.0);
        assert_eq!(parsed.scores.total_score, 20.0);
    }
}
