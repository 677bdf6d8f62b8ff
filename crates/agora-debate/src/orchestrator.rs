//! Debate orchestrator: drives a run through every phase in order.

use agora_core::DebatePhase;
use agora_knowledge::{contains_integration_marker, strip_references, KnowledgeResolver};
use agora_llm::{LlmProvider, LlmRequest};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::analytics::EvolutionAnalysis;
use crate::artifacts;
use crate::error::DebateError;
use crate::persona::{PersonaAgent, PersonaKind};
use crate::prompts;
use crate::transcript::{AgentResponse, DebateTranscript, ModeratorCue};

/// Fewest agents a debate can start with
pub const MIN_AGENTS: usize = 2;

/// Name under which moderator references are recorded
pub const MODERATOR: &str = "Moderator";

/// Result-length caps per kind of call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenCaps {
    pub moderator: u32,
    pub perspective: u32,
    pub target_selection: u32,
    pub critique: u32,
    pub response: u32,
    pub reflection: u32,
    pub common_ground: u32,
    pub final_position: u32,
    pub synthesis: u32,
    pub sentiment: u32,
}

impl Default for TokenCaps {
    fn default() -> Self {
        Self {
            moderator: 200,
            perspective: 300,
            target_selection: 100,
            critique: 300,
            response: 300,
            reflection: 250,
            common_ground: 350,
            final_position: 350,
            synthesis: 1800,
            sentiment: 50,
        }
    }
}

/// Configuration for a debate run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebateConfig {
    /// Resolve reference markers (requires a resolver)
    pub knowledge_enabled: bool,
    /// Score tone during the artifacts phase
    pub score_sentiment: bool,
    /// Keywords per statement in the evolution narrative
    pub keyword_count: usize,
    /// Keywords per node in the flow diagram
    pub diagram_keyword_count: usize,
    /// Cross-cutting themes reported
    pub theme_count: usize,
    pub caps: TokenCaps,
}

impl Default for DebateConfig {
    fn default() -> Self {
        Self {
            knowledge_enabled: false,
            score_sentiment: true,
            keyword_count: 5,
            diagram_keyword_count: 3,
            theme_count: 10,
            caps: TokenCaps::default(),
        }
    }
}

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct DebateOutcome {
    pub transcript: DebateTranscript,
    pub analysis: EvolutionAnalysis,
    /// Idea-evolution markdown
    pub idea_evolution: String,
    /// Mermaid graph source
    pub flow_diagram: String,
    pub influence_network: String,
    /// References ledger markdown, when anything was resolved
    pub references: Option<String>,
}

/// Pick the agent `critic` critiques from a free-text selection.
///
/// The first other agent, in list order, whose name occurs in `response`;
/// otherwise the first other agent. `None` only when there is no other agent.
pub fn select_critique_target(critic: &str, agents: &[String], response: &str) -> Option<String> {
    let mut others = agents.iter().filter(|name| name.as_str() != critic);
    let first_other = others.clone().next();
    others
        .find(|name| response.contains(name.as_str()))
        .or(first_other)
        .cloned()
}

fn unavailable(error: &impl std::fmt::Display) -> String {
    format!("[Contribution unavailable: {}]", error)
}

/// State carried between phases of one run
struct Run {
    problem: String,
    moderator_system: String,
    agents: Vec<PersonaAgent>,
    names: Vec<String>,
    transcript: DebateTranscript,
    /// Ledger length before this run started
    ledger_offset: usize,
}

/// Runs debates.
///
/// Phases execute strictly in sequence and agents strictly in list order.
/// Per-agent failures are recorded as placeholders; only startup validation
/// can fail a run.
#[derive(Debug)]
pub struct DebateOrchestrator<L: LlmProvider> {
    llm: Arc<L>,
    knowledge: Option<Arc<KnowledgeResolver<L>>>,
    config: DebateConfig,
}

impl<L: LlmProvider> DebateOrchestrator<L> {
    pub fn new(llm: Arc<L>, config: DebateConfig) -> Self {
        Self {
            llm,
            knowledge: None,
            config,
        }
    }

    /// Resolve references through `resolver` and enable knowledge integration.
    pub fn with_knowledge(mut self, resolver: Arc<KnowledgeResolver<L>>) -> Self {
        self.knowledge = Some(resolver);
        self.config.knowledge_enabled = true;
        self
    }

    pub fn config(&self) -> &DebateConfig {
        &self.config
    }

    fn knowledge(&self) -> Option<&KnowledgeResolver<L>> {
        if self.config.knowledge_enabled {
            self.knowledge.as_deref()
        } else {
            None
        }
    }

    /// Check the startup requirements without running anything.
    pub fn validate(problem: &str, agents: &[PersonaAgent]) -> Result<(), DebateError> {
        if problem.trim().is_empty() {
            return Err(DebateError::EmptyProblem);
        }
        if agents.len() < MIN_AGENTS {
            return Err(DebateError::TooFewAgents {
                min: MIN_AGENTS,
                got: agents.len(),
            });
        }
        let mut seen = IndexSet::new();
        for agent in agents {
            if !seen.insert(agent.name()) {
                return Err(DebateError::DuplicateAgent(agent.name().to_string()));
            }
        }
        Ok(())
    }

    /// Run a full debate on `problem`.
    pub async fn run(
        &self,
        problem: &str,
        mut agents: Vec<PersonaAgent>,
    ) -> Result<DebateOutcome, DebateError> {
        Self::validate(problem, &agents)?;
        let problem = problem.trim().to_string();

        if self.config.knowledge_enabled && self.knowledge.is_none() {
            warn!("Knowledge integration requested without a resolver; references will not be resolved");
        }
        if self.knowledge().is_some() {
            for agent in &mut agents {
                let directive = format!("{}{}", agent.directive(), prompts::REFERENCE_INSTRUCTION);
                agent.replace_directive(directive);
            }
        }

        let names: Vec<String> = agents.iter().map(|a| a.name().to_string()).collect();
        let ledger_offset = match self.knowledge() {
            Some(resolver) => resolver.ledger().len().await,
            None => 0,
        };
        info!(
            problem = %problem,
            agents = ?names,
            provider = %self.llm.name(),
            knowledge = self.knowledge().is_some(),
            "Starting debate"
        );

        let mut run = Run {
            moderator_system: prompts::moderator_system(&problem),
            transcript: DebateTranscript::new(problem.clone(), names.clone()),
            problem,
            agents,
            names,
            ledger_offset,
        };

        let mut phase = DebatePhase::Welcome;
        while !phase.is_terminal() {
            info!(phase = %phase, "Entering phase");
            match phase {
                DebatePhase::Welcome => self.welcome(&mut run).await,
                DebatePhase::Perspectives => self.perspectives(&mut run).await?,
                DebatePhase::Critiques => self.critiques(&mut run).await?,
                DebatePhase::Responses => self.responses(&mut run).await?,
                DebatePhase::CommonGround => self.common_ground(&mut run).await?,
                DebatePhase::FinalPositions => self.final_positions(&mut run).await?,
                DebatePhase::Synthesis => self.synthesis(&mut run).await,
                DebatePhase::Artifacts => {}
            }
            self.sync_ledger(&mut run).await;
            phase = phase.next().unwrap_or(DebatePhase::Artifacts);
        }

        info!(phase = %phase, "Entering phase");
        Ok(self.derive_artifacts(run).await)
    }

    async fn sync_ledger(&self, run: &mut Run) {
        if let Some(resolver) = self.knowledge() {
            let fresh = resolver
                .ledger()
                .snapshot()
                .await
                .into_iter()
                .skip(run.ledger_offset)
                .collect();
            run.transcript.sync_knowledge(fresh);
        }
    }

    async fn welcome(&self, run: &mut Run) {
        let welcome = self
            .moderate(run, &prompts::welcome(&run.problem), None, DebatePhase::Welcome)
            .await;
        run.transcript
            .set_moderator_message(ModeratorCue::Welcome, welcome);

        let intro = self
            .moderate(run, prompts::PERSPECTIVES_INTRO, None, DebatePhase::Welcome)
            .await;
        run.transcript
            .set_moderator_message(ModeratorCue::PerspectivesIntro, intro);
    }

    async fn perspectives(&self, run: &mut Run) -> Result<(), DebateError> {
        let mut perspectives = IndexMap::new();
        for agent in &run.agents {
            let perspective = self.perspective(agent, &run.problem).await;
            debug!(agent = %agent.name(), chars = perspective.len(), "Perspective recorded");
            perspectives.insert(agent.name().to_string(), perspective);
        }
        run.transcript.record_perspectives(perspectives)?;

        let summary = self
            .moderate(
                run,
                prompts::PERSPECTIVES_SUMMARY,
                Some(&run.transcript.perspectives_text()),
                DebatePhase::Perspectives,
            )
            .await;
        run.transcript
            .set_moderator_message(ModeratorCue::PerspectivesSummary, summary);
        Ok(())
    }

    async fn perspective(&self, agent: &PersonaAgent, problem: &str) -> String {
        let phase = DebatePhase::Perspectives;
        match agent.produce_argument(problem, self.knowledge()).await {
            Ok(argument) => {
                info!(agent = %agent.name(), "Argument produced");
                self.integrate(argument, agent.name(), phase, problem).await
            }
            Err(e) => {
                debug!(agent = %agent.name(), reason = %e, "Using direct perspective generation");
                let prompt = prompts::perspective(problem, self.knowledge().is_some());
                let request = LlmRequest::with_role(agent.directive(), &prompt)
                    .max_tokens(self.config.caps.perspective);
                self.contribute(agent, request, phase, problem).await
            }
        }
    }

    async fn critiques(&self, run: &mut Run) -> Result<(), DebateError> {
        let phase = DebatePhase::Critiques;
        let perspectives_text = run.transcript.perspectives_text();
        let mut critiques: IndexMap<String, IndexMap<String, String>> = IndexMap::new();

        for agent in &run.agents {
            let request = LlmRequest::with_role(
                agent.directive(),
                &prompts::target_selection(&run.problem, &perspectives_text),
            )
            .max_tokens(self.config.caps.target_selection);
            let selection = match self.llm.complete(request).await {
                Ok(response) => response.content,
                Err(e) => {
                    warn!(agent = %agent.name(), error = %e, "Target selection failed");
                    String::new()
                }
            };

            let Some(target) = select_critique_target(agent.name(), &run.names, &selection) else {
                continue;
            };
            info!(agent = %agent.name(), target = %target, "Critique target selected");

            let target_perspective = run
                .transcript
                .perspectives()
                .and_then(|p| p.get(&target))
                .cloned()
                .unwrap_or_default();
            let request = LlmRequest::with_role(
                agent.directive(),
                &prompts::critique(&run.problem, &target, &target_perspective),
            )
            .max_tokens(self.config.caps.critique);
            let critique = self.contribute(agent, request, phase, &run.problem).await;

            critiques
                .entry(agent.name().to_string())
                .or_default()
                .insert(target, critique);
        }
        run.transcript.record_critiques(critiques)?;

        let summary = self
            .moderate(
                run,
                prompts::CRITIQUES_SUMMARY,
                Some(&run.transcript.critiques_text()),
                phase,
            )
            .await;
        run.transcript
            .set_moderator_message(ModeratorCue::CritiquesSummary, summary);
        Ok(())
    }

    async fn responses(&self, run: &mut Run) -> Result<(), DebateError> {
        let phase = DebatePhase::Responses;
        let mut responses = IndexMap::new();

        for agent in &run.agents {
            let received: Vec<(String, String)> = run
                .transcript
                .critiques_received(agent.name())
                .into_iter()
                .map(|(critic, text)| (critic.to_string(), text.to_string()))
                .collect();

            let (prompt, cap) = if received.is_empty() {
                (prompts::reflection(&run.problem), self.config.caps.reflection)
            } else {
                let received_text = received
                    .iter()
                    .map(|(critic, text)| format!("From {}:\n{}", critic, text))
                    .collect::<Vec<_>>()
                    .join("\n\n");
                (
                    prompts::response(&run.problem, &received_text),
                    self.config.caps.response,
                )
            };

            let request = LlmRequest::with_role(agent.directive(), &prompt).max_tokens(cap);
            let response_text = self.contribute(agent, request, phase, &run.problem).await;
            responses.insert(
                agent.name().to_string(),
                AgentResponse {
                    critics_addressed: received.into_iter().map(|(critic, _)| critic).collect(),
                    response_text,
                },
            );
        }
        run.transcript.record_responses(responses)?;

        let summary = self
            .moderate(
                run,
                prompts::RESPONSES_SUMMARY,
                Some(&run.transcript.responses_text()),
                phase,
            )
            .await;
        run.transcript
            .set_moderator_message(ModeratorCue::ResponsesSummary, summary);
        Ok(())
    }

    async fn common_ground(&self, run: &mut Run) -> Result<(), DebateError> {
        let phase = DebatePhase::CommonGround;
        let prompt = prompts::common_ground(&run.transcript.debate_context());
        let mut common_ground = IndexMap::new();

        for agent in &run.agents {
            let request = LlmRequest::with_role(agent.directive(), &prompt)
                .max_tokens(self.config.caps.common_ground);
            let text = self.contribute(agent, request, phase, &run.problem).await;
            common_ground.insert(agent.name().to_string(), text);
        }
        run.transcript.record_common_ground(common_ground)?;

        let summary = self
            .moderate(
                run,
                prompts::COMMON_GROUND_SUMMARY,
                Some(&run.transcript.common_ground_text()),
                phase,
            )
            .await;
        run.transcript
            .set_moderator_message(ModeratorCue::CommonGroundSummary, summary);
        Ok(())
    }

    async fn final_positions(&self, run: &mut Run) -> Result<(), DebateError> {
        let phase = DebatePhase::FinalPositions;
        let context = run.transcript.debate_context();
        let mut final_positions = IndexMap::new();

        for agent in &run.agents {
            let initial = run
                .transcript
                .perspectives()
                .and_then(|p| p.get(agent.name()))
                .cloned()
                .unwrap_or_default();
            let request = LlmRequest::with_context(
                agent.directive(),
                &context,
                &prompts::final_position(&run.problem, &initial),
            )
            .max_tokens(self.config.caps.final_position);
            let text = self.contribute(agent, request, phase, &run.problem).await;
            final_positions.insert(agent.name().to_string(), text);
        }
        run.transcript.record_final_positions(final_positions)?;

        let conclusion = self
            .moderate(
                run,
                prompts::CONCLUSION,
                Some(&run.transcript.final_positions_text()),
                phase,
            )
            .await;
        run.transcript
            .set_moderator_message(ModeratorCue::Conclusion, conclusion);
        Ok(())
    }

    async fn synthesis(&self, run: &mut Run) {
        let phase = DebatePhase::Synthesis;
        let prompt = format!(
            "{}\n\n{}",
            run.transcript.full_context(),
            prompts::final_report(&run.problem)
        );
        let request = LlmRequest::with_role(&run.moderator_system, &prompt)
            .max_tokens(self.config.caps.synthesis);

        let report = match self.llm.complete(request).await {
            Ok(response) => self.resolve_only(response.content, MODERATOR, phase).await,
            Err(e) => {
                warn!(error = %e, "Report synthesis failed, assembling basic report");
                artifacts::basic_report(&run.transcript)
            }
        };
        info!(chars = report.len(), "Final report generated");
        run.transcript.set_final_report(report);
    }

    async fn derive_artifacts(&self, mut run: Run) -> DebateOutcome {
        self.sync_ledger(&mut run).await;
        let transcript = run.transcript;

        let mut analysis = EvolutionAnalysis::from_transcript(
            &transcript,
            self.config.keyword_count,
            self.config.theme_count,
        );
        if self.config.score_sentiment {
            analysis
                .score_sentiment(&*self.llm, self.config.caps.sentiment)
                .await;
        }

        let ledger = transcript.knowledge_ledger();
        let idea_evolution = artifacts::idea_evolution(&analysis, ledger);
        let flow_diagram = artifacts::flow_diagram(&transcript, self.config.diagram_keyword_count);
        let influence_network = artifacts::influence_network(&transcript);
        let references = (!ledger.is_empty()).then(|| artifacts::knowledge_references(ledger));

        info!(
            references = ledger.len(),
            themes = analysis.themes.len(),
            "Debate complete"
        );
        DebateOutcome {
            transcript,
            analysis,
            idea_evolution,
            flow_diagram,
            influence_network,
            references,
        }
    }

    /// Moderator message for `prompt`, with optional prior context.
    async fn moderate(
        &self,
        run: &Run,
        prompt: &str,
        context: Option<&str>,
        phase: DebatePhase,
    ) -> String {
        let request = match context {
            Some(context) => LlmRequest::with_context(&run.moderator_system, context, prompt),
            None => LlmRequest::with_role(&run.moderator_system, prompt),
        }
        .max_tokens(self.config.caps.moderator);

        match self.llm.complete(request).await {
            Ok(response) => {
                debug!(phase = %phase, "Moderator message generated");
                self.resolve_only(response.content, MODERATOR, phase).await
            }
            Err(e) => {
                warn!(phase = %phase, error = %e, "Moderator message failed");
                format!("[Moderator message unavailable: {}]", e)
            }
        }
    }

    /// One agent contribution: generate, then integrate references.
    async fn contribute(
        &self,
        agent: &PersonaAgent,
        request: LlmRequest,
        phase: DebatePhase,
        problem: &str,
    ) -> String {
        match self.llm.complete(request).await {
            Ok(response) => {
                self.integrate(response.content, agent.name(), phase, problem)
                    .await
            }
            Err(e) => {
                warn!(agent = %agent.name(), phase = %phase, error = %e, "Contribution failed");
                unavailable(&e)
            }
        }
    }

    /// Resolve markers without forcing a reference in.
    async fn resolve_only(&self, text: String, agent: &str, phase: DebatePhase) -> String {
        match self.knowledge() {
            Some(resolver) => resolver.rewrite_references(&text, agent, phase).await,
            None => strip_references(&text),
        }
    }

    /// Resolve markers, then append a reference if the text still shows none.
    async fn integrate(&self, text: String, agent: &str, phase: DebatePhase, problem: &str) -> String {
        let Some(resolver) = self.knowledge() else {
            return strip_references(&text);
        };
        let text = resolver.rewrite_references(&text, agent, phase).await;
        if contains_integration_marker(&text) {
            return text;
        }

        let query = match PersonaKind::matching_name(agent) {
            Some(kind) => kind.primary_query(problem),
            None => problem.to_string(),
        };
        info!(agent = %agent, phase = %phase, query = %query, "Adding knowledge reference");
        match resolver.resolve_query(&query, agent, phase).await {
            Some(resolution) => format!(
                "{}\n\n{}",
                text,
                resolution.annotate_brief(&query, resolver.config().excerpt_limit)
            ),
            None => text,
        }
    }
}
