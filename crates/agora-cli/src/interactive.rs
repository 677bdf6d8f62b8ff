//! Interactive topic and agent selection on the terminal

use agora_debate::{PersonaAgent, PersonaIdentity, PersonaKind, MIN_AGENTS};
use anyhow::{bail, Result};
use std::io::{BufRead, Write};

/// Line-oriented prompts over any reader and writer.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `question` and read one trimmed line. `None` at end of input.
    fn ask(&mut self, question: &str) -> Result<Option<String>> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn ask_required(&mut self, question: &str) -> Result<String> {
        match self.ask(question)? {
            Some(answer) => Ok(answer),
            None => bail!("Input closed during interactive setup"),
        }
    }

    /// Topic prompt; an empty answer keeps `default`.
    pub fn topic(&mut self, default: &str) -> Result<String> {
        let answer = self.ask_required(&format!("Enter the debate topic [{}]: ", default))?;
        Ok(if answer.is_empty() {
            default.to_string()
        } else {
            answer
        })
    }

    /// Build the agent list until at least [`MIN_AGENTS`] exist and the
    /// user declines to add more.
    pub fn agents(&mut self) -> Result<Vec<PersonaAgent>> {
        writeln!(
            self.output,
            "\nYou'll need to create at least {} agents for the debate.",
            MIN_AGENTS
        )?;
        let mut agents: Vec<PersonaAgent> = Vec::new();

        loop {
            let kind = self.ask_required("\nCreate (b)uilt-in or (c)ustom agent? (b/c): ")?;
            let agent = if kind.to_lowercase().starts_with('b') {
                let keys: Vec<&str> = PersonaKind::ALL.iter().map(|k| k.key()).collect();
                writeln!(self.output, "Available agents: {}", keys.join(", "))?;
                let choice = self.ask_required("Which built-in agent? ")?;
                match choice.parse::<PersonaKind>() {
                    Ok(kind) => Some(PersonaAgent::builtin(kind)),
                    Err(_) => {
                        writeln!(self.output, "Unknown agent type: {}", choice)?;
                        None
                    }
                }
            } else {
                self.custom_agent()?
            };

            if let Some(agent) = agent {
                if agents.iter().any(|a| a.name() == agent.name()) {
                    writeln!(self.output, "An agent named {} is already taking part", agent.name())?;
                } else {
                    writeln!(self.output, "Added {} ({})", agent.name(), agent.role())?;
                    agents.push(agent);
                }
            }

            if agents.len() >= MIN_AGENTS {
                let more = self.ask_required("\nAdd another agent? (y/n): ")?;
                if !more.to_lowercase().starts_with('y') {
                    return Ok(agents);
                }
            }
        }
    }

    fn custom_agent(&mut self) -> Result<Option<PersonaAgent>> {
        writeln!(self.output, "\n--- Creating Custom Agent ---")?;
        let name = self.ask_required("Agent name: ")?;
        let role = self.ask_required("Professional role: ")?;
        if name.is_empty() || role.is_empty() {
            writeln!(self.output, "A custom agent needs a name and a role")?;
            return Ok(None);
        }
        let expertise = split_list(&self.ask_required("Areas of expertise (comma-separated): ")?);
        let thinking_style = self.ask_required("Thinking style: ")?;
        let priorities = split_list(&self.ask_required("Priorities (comma-separated): ")?);
        let personality_traits =
            split_list(&self.ask_required("Personality traits (comma-separated): ")?);

        Ok(Some(PersonaAgent::custom(PersonaIdentity {
            name,
            role,
            expertise,
            thinking_style,
            priorities,
            personality_traits,
        })))
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(script: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(script.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_empty_topic_keeps_default() {
        let mut p = prompter("\n");
        assert_eq!(p.topic("Default topic").unwrap(), "Default topic");

        let mut p = prompter("  Four-day work week  \n");
        assert_eq!(p.topic("Default topic").unwrap(), "Four-day work week");
    }

    #[test]
    fn test_builtin_and_custom_agents() {
        let script = "b\nbusiness\n\
                      c\nRiver_Ecologist\nEcologist\nwatersheds, biodiversity\nsystems thinking\nresilience\npatient, curious\n\
                      n\n";
        let mut p = prompter(script);
        let agents = p.agents().unwrap();

        assert_eq!(agents.len(), 2);
        assert_eq!(agents[0].name(), "Morgan_Business");
        assert_eq!(agents[1].name(), "River_Ecologist");
        assert_eq!(
            agents[1].identity().expertise,
            vec!["watersheds".to_string(), "biodiversity".to_string()]
        );
    }

    #[test]
    fn test_unknown_and_duplicate_choices_are_skipped() {
        let script = "b\nwizard\nb\ncritical\nb\ncritical\nb\ntechnical\nn\n";
        let mut p = prompter(script);
        let agents = p.agents().unwrap();

        let names: Vec<&str> = agents.iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["Sage_Critical", "DrAda_Technical"]);

        let transcript = String::from_utf8(p.output).unwrap();
        assert!(transcript.contains("Unknown agent type: wizard"));
        assert!(transcript.contains("already taking part"));
    }

    #[test]
    fn test_closed_input_is_an_error() {
        let mut p = prompter("b\nbusiness\n");
        assert!(p.agents().is_err());
    }

    #[test]
    fn test_split_list_drops_blanks() {
        assert_eq!(split_list(" a, ,b ,"), vec!["a".to_string(), "b".to_string()]);
        assert!(split_list("").is_empty());
    }
}
