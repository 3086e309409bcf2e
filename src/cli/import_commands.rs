use std::path::Path;

use super::context::CliContext;
use crate::error::TrackResult;
use crate::import::{self, ImportKind};

pub fn import(ctx: &CliContext, file: &Path, kind: ImportKind) -> TrackResult<()> {
    let stats = import::import_file(&ctx.conn, file, kind)?;
    if ctx.json {
        return ctx.print_json(&stats);
    }

    println!("Import completed!");
    println!("{}", stats);
    Ok(())
}
