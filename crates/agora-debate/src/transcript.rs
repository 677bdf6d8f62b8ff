//! The structured record of one debate run.

use agora_core::{DebatePhase, KnowledgeReference};
use chrono::{DateTime, Utc};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TranscriptError;

/// Named slots for moderator messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeratorCue {
    Welcome,
    PerspectivesIntro,
    PerspectivesSummary,
    CritiquesSummary,
    ResponsesSummary,
    CommonGroundSummary,
    Conclusion,
}

impl ModeratorCue {
    /// Phase during which the cue is spoken
    pub fn phase(self) -> DebatePhase {
        match self {
            Self::Welcome | Self::PerspectivesIntro => DebatePhase::Welcome,
            Self::PerspectivesSummary => DebatePhase::Perspectives,
            Self::CritiquesSummary => DebatePhase::Critiques,
            Self::ResponsesSummary => DebatePhase::Responses,
            Self::CommonGroundSummary => DebatePhase::CommonGround,
            Self::Conclusion => DebatePhase::FinalPositions,
        }
    }
}

impl std::fmt::Display for ModeratorCue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Welcome => "welcome",
            Self::PerspectivesIntro => "perspectives_intro",
            Self::PerspectivesSummary => "perspectives_summary",
            Self::CritiquesSummary => "critiques_summary",
            Self::ResponsesSummary => "responses_summary",
            Self::CommonGroundSummary => "common_ground_summary",
            Self::Conclusion => "conclusion",
        };
        f.write_str(name)
    }
}

/// One agent's answer in the Responses phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentResponse {
    /// Critics addressed, in critic order. Empty for a general reflection.
    pub critics_addressed: Vec<String>,
    pub response_text: String,
}

/// Per-phase outputs. A field is `None` until its phase is recorded, and
/// fields serialize in phase order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseOutputs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perspectives: Option<IndexMap<String, String>>,
    /// critic -> target -> critique
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critiques: Option<IndexMap<String, IndexMap<String, String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responses: Option<IndexMap<String, AgentResponse>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common_ground: Option<IndexMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_positions: Option<IndexMap<String, String>>,
}

/// Complete record of a debate.
///
/// Agent phases must be recorded in order starting at
/// [`DebatePhase::Perspectives`], and every agent named in a phase output
/// must be a participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateTranscript {
    id: Uuid,
    started_at: DateTime<Utc>,
    problem_statement: String,
    agent_names: IndexSet<String>,
    moderator_messages: IndexMap<ModeratorCue, String>,
    phase_outputs: PhaseOutputs,
    phase_order: Vec<DebatePhase>,
    knowledge_ledger: Vec<KnowledgeReference>,
    final_report: String,
}

impl DebateTranscript {
    pub fn new<I, S>(problem_statement: impl Into<String>, agent_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            problem_statement: problem_statement.into(),
            agent_names: agent_names.into_iter().map(Into::into).collect(),
            moderator_messages: IndexMap::new(),
            phase_outputs: PhaseOutputs::default(),
            phase_order: Vec::new(),
            knowledge_ledger: Vec::new(),
            final_report: String::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn problem_statement(&self) -> &str {
        &self.problem_statement
    }

    pub fn agent_names(&self) -> &IndexSet<String> {
        &self.agent_names
    }

    pub fn moderator_messages(&self) -> &IndexMap<ModeratorCue, String> {
        &self.moderator_messages
    }

    pub fn moderator_message(&self, cue: ModeratorCue) -> Option<&str> {
        self.moderator_messages.get(&cue).map(String::as_str)
    }

    pub fn phase_outputs(&self) -> &PhaseOutputs {
        &self.phase_outputs
    }

    /// Agent phases in the order they were recorded
    pub fn phase_order(&self) -> &[DebatePhase] {
        &self.phase_order
    }

    pub fn knowledge_ledger(&self) -> &[KnowledgeReference] {
        &self.knowledge_ledger
    }

    pub fn final_report(&self) -> &str {
        &self.final_report
    }

    pub fn perspectives(&self) -> Option<&IndexMap<String, String>> {
        self.phase_outputs.perspectives.as_ref()
    }

    pub fn critiques(&self) -> Option<&IndexMap<String, IndexMap<String, String>>> {
        self.phase_outputs.critiques.as_ref()
    }

    pub fn responses(&self) -> Option<&IndexMap<String, AgentResponse>> {
        self.phase_outputs.responses.as_ref()
    }

    pub fn common_ground(&self) -> Option<&IndexMap<String, String>> {
        self.phase_outputs.common_ground.as_ref()
    }

    pub fn final_positions(&self) -> Option<&IndexMap<String, String>> {
        self.phase_outputs.final_positions.as_ref()
    }

    pub fn set_moderator_message(&mut self, cue: ModeratorCue, message: impl Into<String>) {
        self.moderator_messages.insert(cue, message.into());
    }

    pub fn set_final_report(&mut self, report: impl Into<String>) {
        self.final_report = report.into();
    }

    pub fn record_perspectives(
        &mut self,
        perspectives: IndexMap<String, String>,
    ) -> Result<(), TranscriptError> {
        self.admit(DebatePhase::Perspectives, perspectives.keys())?;
        self.phase_outputs.perspectives = Some(perspectives);
        Ok(())
    }

    pub fn record_critiques(
        &mut self,
        critiques: IndexMap<String, IndexMap<String, String>>,
    ) -> Result<(), TranscriptError> {
        let targets = critiques.values().flat_map(|t| t.keys());
        self.check_members(targets)?;
        self.admit(DebatePhase::Critiques, critiques.keys())?;
        self.phase_outputs.critiques = Some(critiques);
        Ok(())
    }

    pub fn record_responses(
        &mut self,
        responses: IndexMap<String, AgentResponse>,
    ) -> Result<(), TranscriptError> {
        let critics = responses.values().flat_map(|r| r.critics_addressed.iter());
        self.check_members(critics)?;
        self.admit(DebatePhase::Responses, responses.keys())?;
        self.phase_outputs.responses = Some(responses);
        Ok(())
    }

    pub fn record_common_ground(
        &mut self,
        common_ground: IndexMap<String, String>,
    ) -> Result<(), TranscriptError> {
        self.admit(DebatePhase::CommonGround, common_ground.keys())?;
        self.phase_outputs.common_ground = Some(common_ground);
        Ok(())
    }

    pub fn record_final_positions(
        &mut self,
        final_positions: IndexMap<String, String>,
    ) -> Result<(), TranscriptError> {
        self.admit(DebatePhase::FinalPositions, final_positions.keys())?;
        self.phase_outputs.final_positions = Some(final_positions);
        Ok(())
    }

    /// Append ledger entries not yet copied into the transcript.
    pub fn sync_knowledge(&mut self, snapshot: Vec<KnowledgeReference>) {
        let known = self.knowledge_ledger.len();
        self.knowledge_ledger
            .extend(snapshot.into_iter().skip(known));
    }

    fn check_members<'a>(
        &self,
        names: impl IntoIterator<Item = &'a String>,
    ) -> Result<(), TranscriptError> {
        for name in names {
            if !self.agent_names.contains(name) {
                return Err(TranscriptError::UnknownAgent(name.clone()));
            }
        }
        Ok(())
    }

    fn admit<'a>(
        &mut self,
        phase: DebatePhase,
        names: impl IntoIterator<Item = &'a String>,
    ) -> Result<(), TranscriptError> {
        let expected = match self.phase_order.last() {
            Some(last) => last.next(),
            None => Some(DebatePhase::Perspectives),
        };
        if expected != Some(phase) {
            return Err(TranscriptError::PhaseOutOfOrder(phase));
        }
        self.check_members(names)?;
        self.phase_order.push(phase);
        Ok(())
    }

    /// `"<name>: <perspective>"` blocks separated by blank lines
    pub fn perspectives_text(&self) -> String {
        self.perspectives()
            .map(|p| {
                p.iter()
                    .map(|(name, content)| format!("{}: {}", name, content))
                    .collect::<Vec<_>>()
                    .join("\n\n")
            })
            .unwrap_or_default()
    }

    pub fn critiques_text(&self) -> String {
        let mut text = String::new();
        for (critic, targets) in self.critiques().into_iter().flatten() {
            for (target, critique) in targets {
                text.push_str(&format!("{} to {}:\n{}\n\n", critic, target, critique));
            }
        }
        text
    }

    pub fn responses_text(&self) -> String {
        self.responses()
            .map(|r| {
                r.iter()
                    .map(|(name, response)| format!("{}:\n{}", name, response.response_text))
                    .collect::<Vec<_>>()
                    .join("\n\n")
            })
            .unwrap_or_default()
    }

    pub fn common_ground_text(&self) -> String {
        named_blocks(self.common_ground())
    }

    pub fn final_positions_text(&self) -> String {
        named_blocks(self.final_positions())
    }

    /// Running context for the common-ground and final-position prompts.
    pub fn debate_context(&self) -> String {
        let mut context = format!(
            "PROBLEM: '{}'\n\nINITIAL PERSPECTIVES:\n{}\n\nCRITIQUES:\n{}\n\nRESPONSES:\n{}\n",
            self.problem_statement,
            self.perspectives_text(),
            self.critiques_text(),
            self.responses_text(),
        );
        if self.common_ground().is_some() {
            context.push_str(&format!(
                "\nCOMMON GROUND:\n{}\n\nMODERATOR SYNTHESIS:\n{}\n",
                self.common_ground_text(),
                self.moderator_message(ModeratorCue::CommonGroundSummary)
                    .unwrap_or_default(),
            ));
        }
        context
    }

    /// Everything the synthesis report is written from.
    pub fn full_context(&self) -> String {
        let summary = |cue| self.moderator_message(cue).unwrap_or_default();
        format!(
            "PROBLEM STATEMENT: {}\n\n\
             INITIAL PERSPECTIVES:\n{}\n\n\
             CRITIQUES:\n{}\n\n\
             RESPONSES:\n{}\n\n\
             COMMON GROUND:\n{}\n\n\
             FINAL POSITIONS:\n{}\n\n\
             MODERATOR SUMMARIES:\n\
             - After Initial Perspectives: {}\n\
             - After Critiques: {}\n\
             - After Responses: {}\n\
             - After Common Ground: {}\n",
            self.problem_statement,
            self.perspectives_text(),
            self.critiques_text(),
            self.responses_text(),
            self.common_ground_text(),
            self.final_positions_text(),
            summary(ModeratorCue::PerspectivesSummary),
            summary(ModeratorCue::CritiquesSummary),
            summary(ModeratorCue::ResponsesSummary),
            summary(ModeratorCue::CommonGroundSummary),
        )
    }

    /// `(critic, critique)` pairs aimed at `agent`, in critic order
    pub fn critiques_received(&self, agent: &str) -> Vec<(&str, &str)> {
        self.critiques()
            .into_iter()
            .flatten()
            .filter_map(|(critic, targets)| {
                targets
                    .get(agent)
                    .map(|text| (critic.as_str(), text.as_str()))
            })
            .collect()
    }
}

fn named_blocks(map: Option<&IndexMap<String, String>>) -> String {
    map.map(|m| {
        m.iter()
            .map(|(name, content)| format!("{}:\n{}", name, content))
            .collect::<Vec<_>>()
            .join("\n\n")
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::SourceType;

    fn map(entries: &[(&str, &str)]) -> IndexMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn critiques(entries: &[(&str, &str, &str)]) -> IndexMap<String, IndexMap<String, String>> {
        let mut out: IndexMap<String, IndexMap<String, String>> = IndexMap::new();
        for (critic, target, text) in entries {
            out.entry(critic.to_string())
                .or_default()
                .insert(target.to_string(), text.to_string());
        }
        out
    }

    #[test]
    fn test_phases_must_follow_order() {
        let mut t = DebateTranscript::new("X", ["A", "B"]);
        assert_eq!(
            t.record_critiques(critiques(&[("A", "B", "c")])),
            Err(TranscriptError::PhaseOutOfOrder(DebatePhase::Critiques))
        );
        t.record_perspectives(map(&[("A", "a"), ("B", "b")])).unwrap();
        assert_eq!(
            t.record_perspectives(map(&[("A", "a")])),
            Err(TranscriptError::PhaseOutOfOrder(DebatePhase::Perspectives))
        );
        t.record_critiques(critiques(&[("A", "B", "c")])).unwrap();
        assert_eq!(
            t.phase_order(),
            &[DebatePhase::Perspectives, DebatePhase::Critiques]
        );
    }

    #[test]
    fn test_unknown_critique_target_rejected() {
        let mut t = DebateTranscript::new("X", ["A", "B"]);
        t.record_perspectives(map(&[("A", "a"), ("B", "b")])).unwrap();
        assert_eq!(
            t.record_critiques(critiques(&[("A", "Zed", "c")])),
            Err(TranscriptError::UnknownAgent("Zed".to_string()))
        );
        // A rejected phase is not admitted
        assert_eq!(t.phase_order(), &[DebatePhase::Perspectives]);
    }

    #[test]
    fn test_critiques_received_in_critic_order() {
        let mut t = DebateTranscript::new("X", ["A", "B", "C"]);
        t.record_perspectives(map(&[("A", "a"), ("B", "b"), ("C", "c")]))
            .unwrap();
        t.record_critiques(critiques(&[("A", "C", "from a"), ("B", "C", "from b"), ("C", "A", "from c")]))
            .unwrap();

        assert_eq!(t.critiques_received("C"), vec![("A", "from a"), ("B", "from b")]);
        assert!(t.critiques_received("B").is_empty());
        assert_eq!(
            t.critiques_text(),
            "A to C:\nfrom a\n\nB to C:\nfrom b\n\nC to A:\nfrom c\n\n"
        );
    }

    #[test]
    fn test_sync_knowledge_appends_only_new_entries() {
        let entry = |q: &str| {
            KnowledgeReference::new(q, SourceType::WebSearch, "s", "A", DebatePhase::Welcome, 200)
        };
        let mut t = DebateTranscript::new("X", ["A", "B"]);
        t.sync_knowledge(vec![entry("one")]);
        t.sync_knowledge(vec![entry("one"), entry("two")]);
        let queries: Vec<_> = t.knowledge_ledger().iter().map(|r| r.query.as_str()).collect();
        assert_eq!(queries, vec!["one", "two"]);
    }

    #[test]
    fn test_json_keeps_phase_order() {
        let mut t = DebateTranscript::new("X", ["A", "B"]);
        t.record_perspectives(map(&[("A", "a"), ("B", "b")])).unwrap();
        t.record_critiques(critiques(&[("A", "B", "c"), ("B", "A", "d")]))
            .unwrap();
        let json = serde_json::to_string(&t).unwrap();
        let p = json.find("\"perspectives\"").unwrap();
        let c = json.find("\"critiques\"").unwrap();
        assert!(p < c);
        assert!(!json.contains("\"responses\""));

        let back: DebateTranscript = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }
}
