use crate::cli::actions::{server, Action};
use anyhow::Result;

/// Execute the given action
/// # Errors
/// Returns an error if the action fails
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Server(args) => server::execute(args).await?,
    }

    Ok(())
}
