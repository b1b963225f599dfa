//! Refresh a cached release index.

use anyhow::Result;
use zigup_core::{Error, ExitCode};
use zigup_index::{IndexKind, IndexStore};
use zigup_ui::Output;

pub async fn run(kind: IndexKind, output: &Output) -> Result<i32> {
    match go(kind, output).await {
        Ok(code) => Ok(code),
        Err(e) => {
            output.print_error(&e);
            Ok(ExitCode::UserError.into())
        }
    }
}

async fn go(kind: IndexKind, output: &Output) -> Result<i32, Error> {
    let mut store = IndexStore::new()?;
    let releases = store.refresh(kind).await.map_err(Error::from)?.len();

    output.status(
        "Fetched",
        &format!("{} index ({} releases)", kind, releases),
    );
    output.result(&store.cache_path(kind).display().to_string());
    Ok(0)
}
