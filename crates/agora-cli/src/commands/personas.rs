//! Personas command - List the built-in persona catalogue
//!
//! Usage:
//! ```bash
//! agora personas
//! agora personas --detailed
//! ```

use agora_debate::{PersonaAgent, PersonaKind};
use anyhow::Result;
use clap::Args;
use colored::Colorize;

/// Arguments for the personas command
#[derive(Args)]
pub struct PersonasArgs {
    /// Show expertise, priorities and traits
    #[arg(short, long)]
    pub detailed: bool,
}

/// Run the personas command
pub fn run(args: PersonasArgs) -> Result<()> {
    println!("{}", "Built-in Personas".bold().cyan());
    println!("{}", "═".repeat(50).cyan());

    for kind in PersonaKind::ALL {
        let agent = PersonaAgent::builtin(kind);
        let identity = agent.identity();
        println!();
        println!(
            "  {} {} {}",
            format!("{:<10}", kind.key()).bold(),
            identity.name.green(),
            format!("({})", identity.role).dimmed()
        );
        if args.detailed {
            println!("    {} {}", "Expertise:".dimmed(), identity.expertise.join(", "));
            println!("    {} {}", "Thinking style:".dimmed(), identity.thinking_style);
            println!("    {} {}", "Priorities:".dimmed(), identity.priorities.join(", "));
            println!(
                "    {} {}",
                "Traits:".dimmed(),
                identity.personality_traits.join(", ")
            );
        }
    }
    println!();
    println!(
        "  {} Select with {} or build custom agents with {}",
        "ℹ".blue(),
        "--agents business,critical".cyan(),
        "--interactive".cyan()
    );
    println!();

    Ok(())
}
