//! Team management commands

use clap::{Args, Subcommand};
use roster_core::{Team, TeamMember};

use super::Context;

/// Team management commands
#[derive(Args, Debug)]
pub struct TeamArgs {
    #[command(subcommand)]
    pub command: TeamCommand,
}

#[derive(Subcommand, Debug)]
pub enum TeamCommand {
    /// Create a team with its members
    Add {
        /// Team name
        name: String,

        /// Member as ID:USERNAME, or ID:USERNAME:inactive
        #[arg(short, long = "member", value_parser = parse_member)]
        members: Vec<TeamMember>,
    },

    /// Show a team and its members
    Show {
        /// Team name
        name: String,
    },
}

impl TeamArgs {
    /// Execute the team command
    pub async fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        let roster = ctx.roster().await?;

        match &self.command {
            TeamCommand::Add { name, members } => {
                let team = roster.create_team(&Team::new(name, members.clone())).await?;
                ctx.emit(&team, |team| {
                    println!(
                        "Created team {} with {} member(s)",
                        team.team_name,
                        team.members.len()
                    );
                })
            }
            TeamCommand::Show { name } => {
                let team = roster.get_team(name).await?;
                ctx.emit(&team, print_team)
            }
        }
    }
}

fn print_team(team: &Team) {
    println!();
    println!("Team: {}", team.team_name);
    println!();
    if team.members.is_empty() {
        println!("  (no members)");
    }
    for member in &team.members {
        let state = if member.is_active { "active" } else { "inactive" };
        println!("  {:<16} {:<20} {}", member.user_id, member.username, state);
    }
    println!();
}

/// Parse `ID:USERNAME[:inactive]`
fn parse_member(raw: &str) -> Result<TeamMember, String> {
    let mut parts = raw.split(':');
    let id = parts.next().unwrap_or_default().trim();
    let username = parts.next().map(str::trim).unwrap_or_default();

    if id.is_empty() || username.is_empty() {
        return Err(format!("expected ID:USERNAME[:inactive], got '{}'", raw));
    }

    let is_active = match parts.next() {
        None => true,
        Some("inactive") => false,
        Some("active") => true,
        Some(other) => return Err(format!("unknown member state '{}'", other)),
    };

    if parts.next().is_some() {
        return Err(format!("too many ':' in '{}'", raw));
    }

    Ok(TeamMember::new(id, username, is_active))
}
