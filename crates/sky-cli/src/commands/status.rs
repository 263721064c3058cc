use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// `skywatch status`: research service availability.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let status = ctx.client.research_status().await?;
    if !status.is_available() {
        tracing::warn!(status = %status.status, "research service not available");
    }
    output(&status, flags.format)
}
