//! Persona agents: fixed identities rendered into a system directive.

use agora_knowledge::KnowledgeResolver;
use agora_llm::LlmProvider;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{info, warn};

use crate::error::{DebateError, PersonaError};

/// The built-in persona catalogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonaKind {
    Business,
    Creative,
    Critical,
    Technical,
}

impl PersonaKind {
    pub const ALL: [PersonaKind; 4] = [
        Self::Business,
        Self::Creative,
        Self::Critical,
        Self::Technical,
    ];

    /// Selection key used on the command line
    pub fn key(self) -> &'static str {
        match self {
            Self::Business => "business",
            Self::Creative => "creative",
            Self::Critical => "critical",
            Self::Technical => "technical",
        }
    }

    /// Agent name of the built-in persona
    pub fn agent_name(self) -> &'static str {
        match self {
            Self::Business => "Morgan_Business",
            Self::Creative => "Nova_Creative",
            Self::Critical => "Sage_Critical",
            Self::Technical => "DrAda_Technical",
        }
    }

    /// Canonical knowledge query for this kind of expert
    pub fn primary_query(self, topic: &str) -> String {
        match self {
            Self::Business => format!("business applications of {}", topic),
            Self::Creative => format!("creative innovations in {}", topic),
            Self::Critical => format!("risks and challenges of {}", topic),
            Self::Technical => format!("technical implementation of {}", topic),
        }
    }

    /// Query used when the knowledge probe finds nothing
    pub fn fallback_query(self, topic: &str) -> String {
        match self {
            Self::Business => format!("market viability of {}", topic),
            Self::Creative => format!("creative approaches to {}", topic),
            Self::Critical => format!("ethical considerations in {}", topic),
            Self::Technical => format!("technical approaches to {}", topic),
        }
    }

    /// The kind whose built-in agent name occurs in `name`, if any
    pub fn matching_name(name: &str) -> Option<PersonaKind> {
        Self::ALL
            .into_iter()
            .find(|kind| name.contains(kind.agent_name()))
    }
}

impl std::fmt::Display for PersonaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for PersonaKind {
    type Err = DebateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "business" => Ok(Self::Business),
            "creative" => Ok(Self::Creative),
            "critical" => Ok(Self::Critical),
            "technical" => Ok(Self::Technical),
            other => Err(DebateError::UnknownPersona(other.to_string())),
        }
    }
}

/// How a persona words the query inside its opening marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryTemplate {
    /// Built-in wording for a catalogue persona
    Kind(PersonaKind),
    /// `"<topic> from <role>'s perspective"`, falling back to the bare topic
    RolePerspective,
}

impl QueryTemplate {
    pub fn primary(&self, topic: &str, role: &str) -> String {
        match self {
            Self::Kind(kind) => kind.primary_query(topic),
            Self::RolePerspective => format!("{} from {}'s perspective", topic, role),
        }
    }

    pub fn fallback(&self, topic: &str, _role: &str) -> String {
        match self {
            Self::Kind(kind) => kind.fallback_query(topic),
            Self::RolePerspective => topic.to_string(),
        }
    }
}

/// Who a persona is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaIdentity {
    pub name: String,
    pub role: String,
    pub expertise: Vec<String>,
    pub thinking_style: String,
    pub priorities: Vec<String>,
    pub personality_traits: Vec<String>,
}

impl PersonaIdentity {
    fn render_directive(&self) -> String {
        format!(
            "You are {name}, a {role} with expertise in {expertise}.\n\
             Your thinking style is {style}. You prioritize {priorities}.\n\
             Your personality is described as {traits}.\n\n\
             Guidelines for participation:\n\
             - Engage in structured debates based on your unique perspective\n\
             - Provide constructive critiques of other perspectives\n\
             - Respond to criticism thoughtfully\n\
             - Identify common ground between differing viewpoints\n\
             - Contribute to a final synthesis and report\n\n\
             Always maintain your distinct voice and perspective throughout the debate.",
            name = self.name,
            role = self.role,
            expertise = self.expertise.join(", "),
            style = self.thinking_style,
            priorities = self.priorities.join(", "),
            traits = self.personality_traits.join(", "),
        )
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// A debate participant.
///
/// The identity never changes after construction. The directive is rendered
/// from it once and can only be swapped wholesale with
/// [`PersonaAgent::replace_directive`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaAgent {
    identity: PersonaIdentity,
    template: QueryTemplate,
    directive: String,
}

impl PersonaAgent {
    pub fn new(identity: PersonaIdentity, template: QueryTemplate) -> Self {
        let directive = identity.render_directive();
        Self {
            identity,
            template,
            directive,
        }
    }

    /// A user-defined persona; its queries are phrased from its role.
    pub fn custom(identity: PersonaIdentity) -> Self {
        Self::new(identity, QueryTemplate::RolePerspective)
    }

    /// One of the catalogue personas
    pub fn builtin(kind: PersonaKind) -> Self {
        let identity = match kind {
            PersonaKind::Business => PersonaIdentity {
                name: kind.agent_name().to_string(),
                role: "Business Strategist".to_string(),
                expertise: strings(&[
                    "market analysis",
                    "business modeling",
                    "strategic planning",
                    "ROI optimization",
                    "competitive landscape assessment",
                ]),
                thinking_style: "strategic and pragmatic".to_string(),
                priorities: strings(&[
                    "market viability",
                    "profitability",
                    "competitive advantage",
                    "scalability",
                    "long-term sustainability",
                ]),
                personality_traits: strings(&[
                    "pragmatic",
                    "results-oriented",
                    "big-picture thinker",
                    "decisive",
                    "data-driven",
                ]),
            },
            PersonaKind::Creative => PersonaIdentity {
                name: kind.agent_name().to_string(),
                role: "Innovation Specialist".to_string(),
                expertise: strings(&[
                    "design thinking",
                    "creative problem-solving",
                    "user experience",
                    "trend forecasting",
                    "human-centered design",
                ]),
                thinking_style: "divergent and explorative".to_string(),
                priorities: strings(&[
                    "innovation",
                    "user-centricity",
                    "adaptability",
                    "emotional impact",
                    "originality",
                ]),
                personality_traits: strings(&[
                    "imaginative",
                    "curious",
                    "empathetic",
                    "open-minded",
                    "optimistic",
                ]),
            },
            PersonaKind::Critical => PersonaIdentity {
                name: kind.agent_name().to_string(),
                role: "Critical Analyst".to_string(),
                expertise: strings(&[
                    "risk assessment",
                    "logical analysis",
                    "ethical evaluation",
                    "systems thinking",
                    "cognitive bias identification",
                ]),
                thinking_style: "analytical and critical".to_string(),
                priorities: strings(&[
                    "logical consistency",
                    "risk mitigation",
                    "ethical considerations",
                    "long-term viability",
                    "unintended consequences",
                ]),
                personality_traits: strings(&[
                    "analytical",
                    "thorough",
                    "skeptical",
                    "principled",
                    "detail-oriented",
                ]),
            },
            PersonaKind::Technical => PersonaIdentity {
                name: kind.agent_name().to_string(),
                role: "Technical Expert".to_string(),
                expertise: strings(&[
                    "software engineering",
                    "system architecture",
                    "data science",
                    "AI/ML",
                    "technical implementation",
                ]),
                thinking_style: "analytical and systematic".to_string(),
                priorities: strings(&[
                    "technical feasibility",
                    "efficiency",
                    "scalability",
                    "robustness",
                    "maintainability",
                ]),
                personality_traits: strings(&[
                    "logical",
                    "detail-oriented",
                    "systematic",
                    "pragmatic",
                    "solution-oriented",
                ]),
            },
        };
        Self::new(identity, QueryTemplate::Kind(kind))
    }

    /// Build the agent list from selection keys such as `["business", "creative"]`.
    pub fn from_keys<S: AsRef<str>>(keys: &[S]) -> Result<Vec<PersonaAgent>, DebateError> {
        keys.iter()
            .map(|key| key.as_ref().parse::<PersonaKind>().map(Self::builtin))
            .collect()
    }

    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn role(&self) -> &str {
        &self.identity.role
    }

    pub fn identity(&self) -> &PersonaIdentity {
        &self.identity
    }

    pub fn template(&self) -> QueryTemplate {
        self.template
    }

    /// The system directive sent with every call made on this persona's behalf
    pub fn directive(&self) -> &str {
        &self.directive
    }

    /// Swap the whole directive. Blank directives are rejected and the current one kept.
    pub fn replace_directive(&mut self, directive: impl Into<String>) {
        let directive = directive.into();
        if directive.trim().is_empty() {
            warn!(agent = %self.identity.name, "Ignoring empty directive replacement");
            return;
        }
        self.directive = directive;
        info!(agent = %self.identity.name, "Updated system directive");
    }

    /// Opening argument: always a reference-request marker, never prose.
    ///
    /// The resolver is probed (without recording) to choose between the
    /// template's primary and fallback query.
    pub async fn produce_argument<L: LlmProvider>(
        &self,
        topic: &str,
        knowledge: Option<&KnowledgeResolver<L>>,
    ) -> Result<String, PersonaError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(PersonaError::EmptyTopic);
        }
        let resolver = knowledge.ok_or(PersonaError::KnowledgeUnavailable)?;

        info!(agent = %self.identity.name, "Generating argument");
        let query = match resolver.probe(topic).await {
            Some(found) => {
                info!(agent = %self.identity.name, items = found.snippets.len(), "Knowledge retrieved");
                self.template.primary(topic, &self.identity.role)
            }
            None => {
                warn!(agent = %self.identity.name, topic = %topic, "No knowledge found, using reference request");
                self.template.fallback(topic, &self.identity.role)
            }
        };

        Ok(format!("[REF: {}]", marker_query(&query)))
    }
}

/// Square brackets would end the marker early; keep them as parentheses.
fn marker_query(query: &str) -> String {
    query.replace('[', "(").replace(']', ")")
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_knowledge::KnowledgeConfig;
    use agora_llm::MockProvider;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_directive_reflects_identity() {
        let agent = PersonaAgent::builtin(PersonaKind::Critical);
        assert!(agent
            .directive()
            .starts_with("You are Sage_Critical, a Critical Analyst with expertise in risk assessment"));
        assert!(agent.directive().contains("Your thinking style is analytical and critical."));
        assert_eq!(agent.role(), "Critical Analyst");
    }

    #[test]
    fn test_replace_directive_is_wholesale() {
        let mut agent = PersonaAgent::builtin(PersonaKind::Business);
        let extended = format!("{}\n\nExtra instruction", agent.directive());
        agent.replace_directive(extended.clone());
        assert_eq!(agent.directive(), extended);

        agent.replace_directive("   ");
        assert_eq!(agent.directive(), extended);
        // Identity untouched
        assert_eq!(agent.name(), "Morgan_Business");
    }

    #[test]
    fn test_parse_persona_keys() {
        let agents = PersonaAgent::from_keys(&["business", " Technical "]).unwrap();
        let names: Vec<_> = agents.iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["Morgan_Business", "DrAda_Technical"]);

        let err = PersonaAgent::from_keys(&["business", "astrologer"]).unwrap_err();
        assert!(matches!(err, DebateError::UnknownPersona(ref k) if k == "astrologer"));
    }

    #[test]
    fn test_matching_name() {
        assert_eq!(
            PersonaKind::matching_name("Team_Nova_Creative_2"),
            Some(PersonaKind::Creative)
        );
        assert_eq!(PersonaKind::matching_name("Alice"), None);
    }

    #[tokio::test]
    async fn test_argument_is_marker_for_every_variant() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("kb.txt"), "Remote work boosts retention").unwrap();
        let llm = Arc::new(MockProvider::smart());
        let resolver = KnowledgeResolver::new(KnowledgeConfig::local_only(dir.path()), llm);

        let expected = [
            (PersonaKind::Business, "[REF: business applications of remote work]"),
            (PersonaKind::Creative, "[REF: creative innovations in remote work]"),
            (PersonaKind::Critical, "[REF: risks and challenges of remote work]"),
            (PersonaKind::Technical, "[REF: technical implementation of remote work]"),
        ];
        for (kind, marker) in expected {
            let argument = PersonaAgent::builtin(kind)
                .produce_argument("remote work", Some(&resolver))
                .await
                .unwrap();
            assert_eq!(argument, marker);
        }
        // Probing never records
        assert!(resolver.ledger().is_empty().await);
    }

    #[tokio::test]
    async fn test_argument_falls_back_when_nothing_found() {
        let dir = TempDir::new().unwrap();
        let llm = Arc::new(MockProvider::smart());
        let resolver = KnowledgeResolver::new(KnowledgeConfig::local_only(dir.path()), llm);

        let custom = PersonaAgent::custom(PersonaIdentity {
            name: "Ella_Ethicist".to_string(),
            role: "Ethicist".to_string(),
            expertise: vec!["applied ethics".to_string()],
            thinking_style: "reflective".to_string(),
            priorities: vec!["fairness".to_string()],
            personality_traits: vec!["calm".to_string()],
        });

        assert_eq!(
            custom.produce_argument("gene editing", Some(&resolver)).await.unwrap(),
            "[REF: gene editing]"
        );
        assert_eq!(
            PersonaAgent::builtin(PersonaKind::Critical)
                .produce_argument("gene editing", Some(&resolver))
                .await
                .unwrap(),
            "[REF: ethical considerations in gene editing]"
        );
    }

    #[tokio::test]
    async fn test_bracketed_topic_stays_inside_marker() {
        let dir = TempDir::new().unwrap();
        let llm = Arc::new(MockProvider::smart());
        let resolver = KnowledgeResolver::new(KnowledgeConfig::local_only(dir.path()), llm);

        let argument = PersonaAgent::builtin(PersonaKind::Business)
            .produce_argument("Is [x] viable?", Some(&resolver))
            .await
            .unwrap();
        assert_eq!(argument, "[REF: market viability of Is (x) viable?]");

        let markers = agora_knowledge::markers::find_markers(&argument);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].end, argument.len());
        assert_eq!(markers[0].query, "market viability of Is (x) viable?");
    }

    #[tokio::test]
    async fn test_argument_errors() {
        let agent = PersonaAgent::builtin(PersonaKind::Creative);
        let none: Option<&KnowledgeResolver<MockProvider>> = None;

        assert_eq!(
            agent.produce_argument("topic", none).await.unwrap_err(),
            PersonaError::KnowledgeUnavailable
        );
        assert_eq!(
            agent.produce_argument("  ", none).await.unwrap_err(),
            PersonaError::EmptyTopic
        );
    }
}
