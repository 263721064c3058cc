use std::sync::Arc;

use serde::Serialize;
use sky_core::{RecordId, ResearchTier};
use sky_research::{Citation, ModalState, ResearchCache, ResearchModalController, ResearchView};

use crate::cli::root_commands::ResearchArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::context::AppContext;
use crate::output::{output, table, table_options};

#[derive(Debug, Serialize)]
struct ResearchResponse<'a> {
    record_id: &'a RecordId,
    tier: ResearchTier,
    narrative: &'a str,
    html: &'a str,
    references: &'a [Citation],
}

/// `skywatch research <id> [--full]`.
pub async fn handle(
    args: &ResearchArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let mut modal = ResearchModalController::new(
        Arc::new(ctx.client.clone()),
        Arc::new(ResearchCache::new()),
    );

    let record_id = RecordId::new(args.id.trim());
    modal.open_and_wait(record_id).await;
    if args.full && matches!(modal.state(), ModalState::Shown { .. }) {
        modal.request_full_and_wait().await?;
    }

    let (record_id, tier, view) = match modal.state() {
        ModalState::Shown {
            record_id,
            tier,
            view,
        } => (record_id, *tier, view),
        ModalState::Error { message, .. } => anyhow::bail!("{message}"),
        ModalState::Closed | ModalState::Loading { .. } => {
            anyhow::bail!("research did not complete")
        }
    };

    match flags.format {
        OutputFormat::Raw => {
            println!("{}", view.formatted.html);
            Ok(())
        }
        OutputFormat::Json => output(
            &ResearchResponse {
                record_id,
                tier,
                narrative: view.result.narrative(),
                html: &view.formatted.html,
                references: &view.formatted.references,
            },
            flags.format,
        ),
        OutputFormat::Table => {
            println!("{}", plain_report(tier, view));
            Ok(())
        }
    }
}

/// Narrative text followed by the numbered reference list.
fn plain_report(tier: ResearchTier, view: &ResearchView) -> String {
    let heading = match tier {
        ResearchTier::Quick => "Quick analysis",
        ResearchTier::Full => "Full report",
    };
    let mut out = format!("{heading}\n\n{}", view.result.narrative().trim());
    if !view.formatted.references.is_empty() {
        let rows: Vec<Vec<String>> = view
            .formatted
            .references
            .iter()
            .map(|c| vec![format!("[{}]", c.number), c.title.clone(), c.url.clone()])
            .collect();
        out.push_str("\n\nReferences\n");
        out.push_str(&table::render_table(&["#", "title", "url"], &rows, table_options()));
    }
    out
}
