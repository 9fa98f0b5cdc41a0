//! Pull request commands

use clap::{Args, Subcommand};
use roster_core::PullRequest;

use super::Context;

/// Pull request commands
#[derive(Args, Debug)]
pub struct PrArgs {
    #[command(subcommand)]
    pub command: PrCommand,
}

#[derive(Subcommand, Debug)]
pub enum PrCommand {
    /// Create a pull request and auto-assign reviewers
    Create {
        /// Pull request id
        id: String,

        /// Pull request title
        name: String,

        /// Author user id
        #[arg(short, long)]
        author: String,
    },

    /// Show a pull request
    Show {
        /// Pull request id
        id: String,
    },

    /// Mark a pull request merged
    Merge {
        /// Pull request id
        id: String,
    },

    /// Replace one reviewer with another member of their team
    Reassign {
        /// Pull request id
        id: String,

        /// Reviewer to replace
        #[arg(short, long)]
        old: String,
    },
}

impl PrArgs {
    /// Execute the pr command
    pub async fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        let roster = ctx.roster().await?;

        match &self.command {
            PrCommand::Create { id, name, author } => {
                let pr = roster.create_pr(id, name, author).await?;
                ctx.emit(&pr, print_pr)
            }
            PrCommand::Show { id } => {
                let pr = roster.get_pr(id).await?;
                ctx.emit(&pr, print_pr)
            }
            PrCommand::Merge { id } => {
                let pr = roster.merge_pr(id).await?;
                ctx.emit(&pr, print_pr)
            }
            PrCommand::Reassign { id, old } => {
                let reassignment = roster.reassign_reviewer(id, old).await?;
                ctx.emit(&reassignment, |r| {
                    println!("Replaced {} with {} on {}", old, r.replaced_by, r.pr.pr_id);
                    print_pr(&r.pr);
                })
            }
        }
    }
}

fn print_pr(pr: &PullRequest) {
    println!();
    println!("{}: {}", pr.pr_id, pr.name);
    println!();
    println!("Status: {}", pr.status);
    println!("Author: {}", pr.author_id);
    if pr.assigned_reviewers.is_empty() {
        println!("Reviewers: (none)");
    } else {
        println!("Reviewers: {}", pr.assigned_reviewers.join(", "));
    }
    println!("Created: {}", pr.created_at.format("%Y-%m-%d %H:%M UTC"));
    if let Some(merged_at) = pr.merged_at {
        println!("Merged: {}", merged_at.format("%Y-%m-%d %H:%M UTC"));
    }
    println!();
}
