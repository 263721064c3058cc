use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to its handler.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Map(args) => commands::map::handle(&args, ctx, flags).await,
        Commands::Regions => commands::regions::handle(ctx, flags).await,
        Commands::Research(args) => commands::research::handle(&args, ctx, flags).await,
        Commands::Status => commands::status::handle(ctx, flags).await,
    }
}
