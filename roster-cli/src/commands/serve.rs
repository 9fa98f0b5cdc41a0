//! Serve command - run the HTTP API

use clap::Args;

use super::Context;

/// Run the HTTP API server
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind (overrides config and env)
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides config and env)
    #[arg(short, long)]
    port: Option<u16>,
}

impl ServeArgs {
    /// Execute the serve command
    pub async fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        let mut settings = ctx.config.server.clone();
        if let Some(host) = &self.host {
            settings.host = host.clone();
        }
        if let Some(port) = self.port {
            settings.port = port;
        }

        let roster = ctx.roster().await?;
        roster_server::serve(roster, &settings).await?;
        Ok(())
    }
}
