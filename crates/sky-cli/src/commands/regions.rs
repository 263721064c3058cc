use anyhow::anyhow;
use sky_map::StateIndex;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// `skywatch regions`: the region selector entries.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let index = StateIndex::new(ctx.client.clone());
    let options = index
        .options()
        .await
        .map_err(|e| anyhow!(e.user_message()))?;
    output(&options, flags.format)
}
