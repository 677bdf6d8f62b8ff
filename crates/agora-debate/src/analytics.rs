//! Post-debate analytics: keyword extraction, sentiment scoring and idea drift.

use agora_llm::{LlmProvider, LlmRequest};
use indexmap::{IndexMap, IndexSet};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::prompts;
use crate::transcript::DebateTranscript;

pub const STOP_WORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
    "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
    "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
    "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
    "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by",
    "for", "with", "about", "against", "between", "into", "through", "during", "before",
    "after", "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over",
    "under", "again", "further", "then", "once", "here", "there", "when", "where", "why",
    "how", "all", "any", "both", "each", "few", "more", "most", "other", "some", "such", "no",
    "nor", "not", "only", "own", "same", "so", "than", "too", "very", "s", "t", "can", "will",
    "just", "don", "should", "now",
];

fn word_pattern() -> &'static Regex {
    static WORD: OnceLock<Regex> = OnceLock::new();
    WORD.get_or_init(|| Regex::new(r"\b\w+\b").expect("valid regex"))
}

fn number_pattern() -> &'static Regex {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    NUMBER.get_or_init(|| Regex::new(r"-?\d+(\.\d+)?").expect("valid regex"))
}

/// Sort `(term, count)` pairs by count descending; ties keep first-seen order.
fn most_common(counts: IndexMap<String, usize>, limit: usize) -> Vec<(String, usize)> {
    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(limit);
    ranked
}

/// Top `count` terms of `text` with their frequencies.
///
/// Lowercased word tokens, minus stop words and single characters.
pub fn extract_keywords(text: &str, count: usize) -> Vec<(String, usize)> {
    let lowered = text.to_lowercase();
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for word in word_pattern().find_iter(&lowered).map(|m| m.as_str()) {
        if word.chars().count() <= 1 || STOP_WORDS.contains(&word) {
            continue;
        }
        *counts.entry(word.to_string()).or_insert(0) += 1;
    }
    most_common(counts, count)
}

/// First number in `raw`, clamped to [-1, 1]. Anything unparseable is neutral.
pub fn parse_sentiment(raw: &str) -> f64 {
    number_pattern()
        .find(raw.trim())
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map(|score| score.clamp(-1.0, 1.0))
        .unwrap_or(0.0)
}

/// Score the tone of `text`. Call failures are logged and score as neutral.
pub async fn analyze_sentiment<L: LlmProvider + ?Sized>(llm: &L, text: &str, max_tokens: u32) -> f64 {
    let request = LlmRequest::with_role(prompts::SENTIMENT_SYSTEM, &prompts::sentiment(text))
        .max_tokens(max_tokens);
    match llm.complete(request).await {
        Ok(response) => parse_sentiment(&response.content),
        Err(e) => {
            warn!(error = %e, "Sentiment analysis failed");
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentCategory {
    Positive,
    Negative,
    Neutral,
}

impl SentimentCategory {
    pub fn of(score: f64) -> Self {
        if score > 0.3 {
            Self::Positive
        } else if score < -0.3 {
            Self::Negative
        } else {
            Self::Neutral
        }
    }
}

impl std::fmt::Display for SentimentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Positive => write!(f, "Positive"),
            Self::Negative => write!(f, "Negative"),
            Self::Neutral => write!(f, "Neutral"),
        }
    }
}

/// Direction of tone change between the first and last statement
pub fn tone_shift(change: f64) -> &'static str {
    if change > 0.2 {
        "more positive"
    } else if change < -0.2 {
        "more negative"
    } else {
        "relatively unchanged"
    }
}

/// Point in an agent's journey that gets its own keyword and tone reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Initial,
    Critiques,
    Response,
    CommonGround,
    Final,
}

/// Keyword themes gained, lost and kept between the first and last statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeShift {
    pub new: Vec<String>,
    pub dropped: Vec<String>,
    pub persistent: Vec<String>,
}

impl ThemeShift {
    pub fn between(initial: &[(String, usize)], fin: &[(String, usize)]) -> Self {
        let initial: IndexSet<&str> = initial.iter().map(|(k, _)| k.as_str()).collect();
        let fin: IndexSet<&str> = fin.iter().map(|(k, _)| k.as_str()).collect();
        Self {
            new: fin.difference(&initial).map(|k| k.to_string()).collect(),
            dropped: initial.difference(&fin).map(|k| k.to_string()).collect(),
            persistent: initial.intersection(&fin).map(|k| k.to_string()).collect(),
        }
    }
}

/// One agent's path through the debate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentJourney {
    pub agent: String,
    pub initial: Option<String>,
    /// `(critic, critique)` in critic order
    pub critiques_received: Vec<(String, String)>,
    pub response: Option<String>,
    pub common_ground: Option<String>,
    pub final_position: Option<String>,
    pub keywords: IndexMap<Stage, Vec<(String, usize)>>,
    pub sentiment: IndexMap<Stage, f64>,
}

impl AgentJourney {
    fn stage_text(&self, stage: Stage) -> Option<String> {
        match stage {
            Stage::Initial => self.initial.clone(),
            Stage::Critiques if self.critiques_received.is_empty() => None,
            Stage::Critiques => Some(
                self.critiques_received
                    .iter()
                    .map(|(_, text)| text.as_str())
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            Stage::Response => self.response.clone(),
            Stage::CommonGround => self.common_ground.clone(),
            Stage::Final => self.final_position.clone(),
        }
    }

    pub fn theme_shift(&self) -> Option<ThemeShift> {
        let initial = self.keywords.get(&Stage::Initial)?;
        let fin = self.keywords.get(&Stage::Final)?;
        Some(ThemeShift::between(initial, fin))
    }

    /// Final minus initial tone, when both were scored
    pub fn sentiment_change(&self) -> Option<f64> {
        let initial = self.sentiment.get(&Stage::Initial)?;
        let fin = self.sentiment.get(&Stage::Final)?;
        Some(fin - initial)
    }
}

/// Stages whose tone is scored
const SCORED_STAGES: [Stage; 4] = [Stage::Initial, Stage::Critiques, Stage::Response, Stage::Final];

/// Idea-evolution analysis of a finished transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionAnalysis {
    pub journeys: Vec<AgentJourney>,
    /// Cross-cutting themes: how many stage keyword lists each term topped
    pub themes: Vec<(String, usize)>,
}

impl EvolutionAnalysis {
    /// Keyword analysis only. Sentiment is filled in by [`EvolutionAnalysis::score_sentiment`].
    pub fn from_transcript(
        transcript: &DebateTranscript,
        keyword_count: usize,
        theme_count: usize,
    ) -> Self {
        let journeys: Vec<AgentJourney> = transcript
            .agent_names()
            .iter()
            .map(|agent| {
                let mut journey = AgentJourney {
                    agent: agent.clone(),
                    initial: transcript.perspectives().and_then(|p| p.get(agent)).cloned(),
                    critiques_received: transcript
                        .critiques_received(agent)
                        .into_iter()
                        .map(|(critic, text)| (critic.to_string(), text.to_string()))
                        .collect(),
                    response: transcript
                        .responses()
                        .and_then(|r| r.get(agent))
                        .map(|r| r.response_text.clone()),
                    common_ground: transcript.common_ground().and_then(|c| c.get(agent)).cloned(),
                    final_position: transcript
                        .final_positions()
                        .and_then(|f| f.get(agent))
                        .cloned(),
                    keywords: IndexMap::new(),
                    sentiment: IndexMap::new(),
                };
                for stage in [
                    Stage::Initial,
                    Stage::Critiques,
                    Stage::Response,
                    Stage::CommonGround,
                    Stage::Final,
                ] {
                    if let Some(text) = journey.stage_text(stage) {
                        journey
                            .keywords
                            .insert(stage, extract_keywords(&text, keyword_count));
                    }
                }
                journey
            })
            .collect();

        let mut counts: IndexMap<String, usize> = IndexMap::new();
        for keywords in journeys.iter().flat_map(|j| j.keywords.values()) {
            for (term, _) in keywords {
                *counts.entry(term.clone()).or_insert(0) += 1;
            }
        }

        Self {
            journeys,
            themes: most_common(counts, theme_count),
        }
    }

    /// Score every present initial, critique, response and final block.
    ///
    /// Calls are independent of each other and run concurrently.
    pub async fn score_sentiment<L: LlmProvider + ?Sized>(&mut self, llm: &L, max_tokens: u32) {
        let mut jobs = Vec::new();
        for (index, journey) in self.journeys.iter().enumerate() {
            for stage in SCORED_STAGES {
                if let Some(text) = journey.stage_text(stage) {
                    jobs.push((index, stage, text));
                }
            }
        }
        debug!(count = jobs.len(), "Scoring sentiment");

        let scores = futures::future::join_all(
            jobs.iter()
                .map(|(_, _, text)| analyze_sentiment(llm, text, max_tokens)),
        )
        .await;

        for ((index, stage, _), score) in jobs.into_iter().zip(scores) {
            if let Some(journey) = self.journeys.get_mut(index) {
                journey.sentiment.insert(stage, score);
            }
        }
    }
}
