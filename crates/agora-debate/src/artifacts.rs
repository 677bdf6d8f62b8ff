//! Deterministic renderers for the run artifacts.
//!
//! Nothing here calls a model; all input comes from the finished transcript
//! and its [`EvolutionAnalysis`].

use agora_core::KnowledgeReference;

use crate::analytics::{extract_keywords, tone_shift, AgentJourney, EvolutionAnalysis, SentimentCategory, Stage};
use crate::transcript::DebateTranscript;

/// First `limit` characters followed by `...`
fn preview(text: &str, limit: usize) -> String {
    let mut out: String = text.chars().take(limit).collect();
    out.push_str("...");
    out
}

fn key_terms(out: &mut String, heading: &str, terms: Option<&Vec<(String, usize)>>) {
    let Some(terms) = terms else { return };
    out.push_str(&format!("**{}:**\n", heading));
    for (term, count) in terms {
        out.push_str(&format!("- {} ({})\n", term, count));
    }
    out.push('\n');
}

fn journey_section(journey: &AgentJourney) -> String {
    let mut out = format!("### {}'s Journey\n\n", journey.agent);

    if let Some(initial) = &journey.initial {
        out.push_str(&format!("**Initial Perspective:**\n> {}\n\n", preview(initial, 150)));
    }
    key_terms(&mut out, "Key Terms", journey.keywords.get(&Stage::Initial));
    if let Some(score) = journey.sentiment.get(&Stage::Initial) {
        out.push_str(&format!("**Tone:** {} ({:.2})\n\n", SentimentCategory::of(*score), score));
    }

    out.push_str("**Critiques Received:**\n");
    if journey.critiques_received.is_empty() {
        out.push_str("- *No direct critiques received*\n");
    }
    for (critic, critique) in &journey.critiques_received {
        out.push_str(&format!("- From {}: {}\n", critic, preview(critique, 100)));
    }
    out.push('\n');

    if let Some(response) = &journey.response {
        out.push_str(&format!("**Response to Critiques:**\n> {}\n\n", preview(response, 150)));
        key_terms(&mut out, "Key Terms Shift", journey.keywords.get(&Stage::Response));
    }

    if let Some(common) = &journey.common_ground {
        out.push_str(&format!("**Common Ground Identified:**\n> {}\n\n", preview(common, 150)));
    }

    if let Some(fin) = &journey.final_position {
        out.push_str(&format!("**Final Position:**\n> {}\n\n", preview(fin, 200)));
        key_terms(&mut out, "Final Key Terms", journey.keywords.get(&Stage::Final));
        if let Some(change) = journey.sentiment_change() {
            out.push_str(&format!(
                "**Sentiment Evolution:** Tone became {} ({:.2} shift)\n\n",
                tone_shift(change),
                change
            ));
        }
    }

    out.push_str("**Key Concept Evolution:**\n");
    if let Some(shift) = journey.theme_shift() {
        if !shift.new.is_empty() {
            out.push_str(&format!("- New concepts introduced: {}\n", shift.new.join(", ")));
        }
        if !shift.dropped.is_empty() {
            out.push_str(&format!(
                "- Concepts no longer emphasized: {}\n",
                shift.dropped.join(", ")
            ));
        }
        if !shift.persistent.is_empty() {
            out.push_str(&format!("- Persistent themes: {}\n", shift.persistent.join(", ")));
        }
    }
    out.push_str("\n---\n\n");
    out
}

fn score_cell(score: Option<&f64>) -> String {
    score
        .map(|s| format!("{:.2}", s))
        .unwrap_or_else(|| "N/A".to_string())
}

/// One row per agent; unscored blocks show `N/A`.
pub fn sentiment_table(journeys: &[AgentJourney]) -> String {
    let mut out = String::from(
        "| Agent | Initial | After Critiques | After Response | Final | Net Change |\n\
         |-------|---------|-----------------|----------------|-------|------------|\n",
    );
    for journey in journeys {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            journey.agent,
            score_cell(journey.sentiment.get(&Stage::Initial)),
            score_cell(journey.sentiment.get(&Stage::Critiques)),
            score_cell(journey.sentiment.get(&Stage::Response)),
            score_cell(journey.sentiment.get(&Stage::Final)),
            score_cell(journey.sentiment_change().as_ref()),
        ));
    }
    out
}

/// The idea-evolution narrative.
pub fn idea_evolution(analysis: &EvolutionAnalysis, ledger: &[KnowledgeReference]) -> String {
    let mut out = String::from(
        "# Evolution of Ideas Throughout the Debate\n\n\
         ## How Ideas Evolved Through the Debate\n\n\
         This visualization tracks how each expert's thinking developed throughout the debate process.\n\n",
    );

    for journey in &analysis.journeys {
        out.push_str(&journey_section(journey));
    }

    out.push_str(
        "## Cross-Cutting Themes\n\n\
         The following themes emerged and evolved throughout the debate:\n\n",
    );
    for (i, (keyword, count)) in analysis.themes.iter().enumerate() {
        out.push_str(&format!("{}. **{}** (mentioned {} times)\n", i + 1, keyword, count));
    }

    out.push_str(
        "\n## Debate Flow Visualization\n\n\
         The following Mermaid diagram shows the flow of the debate and how concepts evolved:\n\n\
         ```mermaid\n\
         graph TD\n    \
         Problem[Problem Statement] --> Perspectives[Initial Perspectives]\n    \
         Perspectives --> Critiques[Critiques]\n    \
         Critiques --> Responses[Responses]\n    \
         Responses --> CommonGround[Common Ground]\n    \
         CommonGround --> FinalPositions[Final Positions]\n\
         ```\n\n\
         ## Sentiment Evolution Chart\n\n\
         The following chart shows how sentiment evolved for each agent throughout the debate phases:\n\n",
    );
    out.push_str(&sentiment_table(&analysis.journeys));

    if !ledger.is_empty() {
        out.push_str(
            "\n## External Knowledge References\n\n\
             The following external sources were referenced during the debate:\n\n",
        );
        for (i, reference) in ledger.iter().enumerate() {
            out.push_str(&format!(
                "{}. **{}** (by {} in {})\n   {}\n\n",
                i + 1,
                reference.query,
                reference.requesting_agent,
                reference.phase,
                reference.source_excerpt
            ));
        }
    }
    out
}

/// Mermaid node identifier for the agent at `index`; names may collide once
/// sanitized, positions never do.
fn node_id(index: usize) -> String {
    format!("A{}", index)
}

/// Quoted mermaid label text
fn label(text: &str) -> String {
    format!(
        "\"{}\"",
        text.replace('"', "#quot;")
            .replace('[', "#91;")
            .replace(']', "#93;")
    )
}

fn quoted_terms(text: Option<&String>, count: usize) -> String {
    text.map(|t| {
        extract_keywords(t, count)
            .into_iter()
            .map(|(k, _)| format!("'{}'", k))
            .collect::<Vec<_>>()
            .join(", ")
    })
    .unwrap_or_default()
}

/// Mermaid graph: the fixed phase skeleton plus an initial/final keyword
/// node pair per agent.
pub fn flow_diagram(transcript: &DebateTranscript, keyword_count: usize) -> String {
    let mut out = String::from(
        "graph TD\n    \
         Problem[Problem Statement] --> Debate[Structured Debate]\n    \
         Debate --> Perspectives[Initial Perspectives]\n    \
         Perspectives --> Critiques[Critiques]\n    \
         Critiques --> Responses[Responses]\n    \
         Responses --> CommonGround[Common Ground]\n    \
         CommonGround --> FinalPositions[Final Positions]\n    \
         FinalPositions --> Report[Synthesized Report]\n\n    \
         classDef default fill:#f9f9f9,stroke:#333,stroke-width:1px;\n    \
         classDef problem fill:#d1e7dd,stroke:#333,stroke-width:1px;\n    \
         classDef phase fill:#d9e2ef,stroke:#333,stroke-width:1px;\n    \
         classDef report fill:#ffeeba,stroke:#333,stroke-width:1px;\n\n    \
         class Problem problem;\n    \
         class Perspectives,Critiques,Responses,CommonGround,FinalPositions phase;\n    \
         class Report report;\n\n    \
         %% Agent Evolution\n",
    );

    for (index, agent) in transcript.agent_names().iter().enumerate() {
        let id = node_id(index);
        let initial = quoted_terms(
            transcript.perspectives().and_then(|p| p.get(agent)),
            keyword_count,
        );
        let fin = quoted_terms(
            transcript.final_positions().and_then(|p| p.get(agent)),
            keyword_count,
        );
        let initial = label(&format!("{agent}<br>Initial: {initial}"));
        let fin = label(&format!("{agent}<br>Final: {fin}"));
        out.push_str(&format!("    {id}_initial[{initial}]\n"));
        out.push_str(&format!("    {id}_final[{fin}]\n"));
        out.push_str(&format!("    {id}_initial --> {id}_final\n"));
        out.push_str(&format!("    Perspectives --> {id}_initial\n"));
        out.push_str(&format!("    {id}_final --> FinalPositions\n"));
    }
    out
}

/// One line per (critic, target) pair.
pub fn influence_network(transcript: &DebateTranscript) -> String {
    let mut out = String::from(
        "# Agent Influence Network\n\n\
         This is a simplified representation of how agents influenced each other:\n\n",
    );
    for (critic, targets) in transcript.critiques().into_iter().flatten() {
        for target in targets.keys() {
            out.push_str(&format!("* {} → {} (critique)\n", critic, target));
        }
    }
    out
}

pub fn knowledge_references(ledger: &[KnowledgeReference]) -> String {
    let mut out = String::from(
        "# External Knowledge References\n\n\
         The following external sources were referenced during the debate:\n\n",
    );
    for (i, reference) in ledger.iter().enumerate() {
        out.push_str(&format!(
            "{}. **Query:** {}\n   **Type:** {}\n   **Source:** {}\n   **Used by:** {}\n   **Phase:** {}\n\n",
            i + 1,
            reference.query,
            reference.source_type,
            reference.source_excerpt,
            reference.requesting_agent,
            reference.phase
        ));
    }
    out
}

/// Report assembled from the transcript alone, used when synthesis fails.
pub fn basic_report(transcript: &DebateTranscript) -> String {
    let mut out = format!(
        "## Executive Summary\n\n\
         A structured debate on '{}' was held between {}. The synthesized report could not be \
         generated, so this summary is assembled directly from the transcript.\n\n",
        transcript.problem_statement(),
        transcript
            .agent_names()
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    );

    out.push_str("## Key Perspectives\n\n");
    for (agent, text) in transcript.perspectives().into_iter().flatten() {
        out.push_str(&format!("**{}:** {}\n\n", agent, text));
    }

    out.push_str("## Final Positions\n\n");
    for (agent, text) in transcript.final_positions().into_iter().flatten() {
        out.push_str(&format!("**{}:** {}\n\n", agent, text));
    }
    out
}
