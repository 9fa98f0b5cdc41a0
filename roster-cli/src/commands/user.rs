//! User commands - activity toggles, review lists and bulk deactivation

use clap::{Args, Subcommand};
use roster_core::{SkipReason, SlotOutcome};

use super::Context;

/// User management commands
#[derive(Args, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Mark a user active
    Activate {
        /// User id
        id: String,
    },

    /// Mark a user inactive without touching their reviews
    Deactivate {
        /// User id
        id: String,
    },

    /// List pull requests a user reviews
    Reviews {
        /// User id
        id: String,
    },

    /// Deactivate several team members and reassign their open reviews
    BulkDeactivate {
        /// Team the users belong to
        #[arg(short, long)]
        team: String,

        /// User ids to deactivate
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

impl UserArgs {
    /// Execute the user command
    pub async fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        let roster = ctx.roster().await?;

        match &self.command {
            UserCommand::Activate { id } | UserCommand::Deactivate { id } => {
                let active = matches!(self.command, UserCommand::Activate { .. });
                let user = roster.set_user_active(id, active).await?;
                ctx.emit(&user, |user| {
                    let state = if user.is_active { "active" } else { "inactive" };
                    println!("{} ({}) is now {}", user.user_id, user.username, state);
                })
            }
            UserCommand::Reviews { id } => {
                let prs = roster.reviews_for_user(id).await?;
                ctx.emit(&prs, |prs| {
                    if prs.is_empty() {
                        println!("{} has no reviews.", id);
                        return;
                    }
                    println!();
                    println!("Reviews for {}:", id);
                    println!();
                    for pr in prs {
                        println!(
                            "  {:<16} {:<7} {} (by {})",
                            pr.pr_id,
                            pr.status.as_str(),
                            pr.name,
                            pr.author_id
                        );
                    }
                    println!();
                })
            }
            UserCommand::BulkDeactivate { team, ids } => {
                let report = roster.bulk_deactivate(team, ids).await?;
                ctx.emit(&report, |report| {
                    println!(
                        "Deactivated {} user(s) on {}",
                        report.deactivated_users.len(),
                        report.team_name
                    );
                    if report.slots.is_empty() {
                        println!("No open reviews needed reassignment.");
                        return;
                    }
                    println!();
                    for slot in &report.slots {
                        match &slot.outcome {
                            SlotOutcome::Reassigned { new_reviewer } => println!(
                                "  {:<16} {} -> {}",
                                slot.pr_id, slot.old_reviewer, new_reviewer
                            ),
                            SlotOutcome::Skipped(reason) => println!(
                                "  {:<16} {} kept ({})",
                                slot.pr_id,
                                slot.old_reviewer,
                                describe(reason)
                            ),
                        }
                    }
                    println!();
                    println!(
                        "{} reassigned, {} skipped",
                        report.reassigned_count(),
                        report.skipped_count()
                    );
                })
            }
        }
    }
}

fn describe(reason: &SkipReason) -> String {
    match reason {
        SkipReason::ReviewerUnresolved => "reviewer record missing".to_string(),
        SkipReason::NoCandidate => "no eligible replacement".to_string(),
        SkipReason::WriteFailed(detail) => format!("write failed: {}", detail),
    }
}
