//! Stats command - assignment totals per user and per PR

use super::Context;

/// Execute the stats command
pub async fn execute(ctx: &Context) -> anyhow::Result<()> {
    let stats = ctx.roster().await?.stats().await?;

    ctx.emit(&stats, |stats| {
        println!("Pull requests: {}", stats.total_prs);
        println!("Users: {}", stats.total_users);
        println!(
            "Average reviewers per PR: {:.2}",
            stats.average_reviewers_per_pr
        );

        if !stats.assignments_by_user.is_empty() {
            println!();
            println!("Assignments by user:");
            for entry in &stats.assignments_by_user {
                println!(
                    "  {:<16} {:<20} {}",
                    entry.user_id, entry.username, entry.assignment_count
                );
            }
        }

        if !stats.reviewers_per_pr.is_empty() {
            println!();
            println!("Reviewers per PR:");
            for entry in &stats.reviewers_per_pr {
                println!(
                    "  {:<16} {:<30} {}",
                    entry.pr_id, entry.pr_name, entry.reviewer_count
                );
            }
        }
    })
}
