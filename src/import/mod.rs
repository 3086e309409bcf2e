pub mod layout;
pub mod reconciler;
pub mod row;
pub mod values;

use std::fmt;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use rusqlite::Connection;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{TrackError, TrackResult};
use reconciler::RowOutcome;
use row::{CarryForward, SheetRow};

/// Which spreadsheet export is being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    Open,
    Completed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EntityCounts {
    pub created: usize,
    pub updated: usize,
}

impl EntityCounts {
    fn merge(&mut self, other: EntityCounts) {
        self.created += other.created;
        self.updated += other.updated;
    }
}

/// Entity changes made by one or more rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChangeCounts {
    pub units: EntityCounts,
    pub organizations: EntityCounts,
    pub positions: EntityCounts,
    pub members: EntityCounts,
    pub callings: EntityCounts,
}

impl ChangeCounts {
    pub fn merge(&mut self, other: &ChangeCounts) {
        self.units.merge(other.units);
        self.organizations.merge(other.organizations);
        self.positions.merge(other.positions);
        self.members.merge(other.members);
        self.callings.merge(other.callings);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportStats {
    pub rows_processed: usize,
    pub rows_skipped: usize,
    pub changes: ChangeCounts,
}

impl fmt::Display for ImportStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.changes;
        writeln!(f, "Rows processed: {}", self.rows_processed)?;
        writeln!(f, "Rows skipped: {}", self.rows_skipped)?;
        writeln!(f, "Units created: {}", c.units.created)?;
        writeln!(f, "Organizations created: {}", c.organizations.created)?;
        writeln!(f, "Positions created: {}", c.positions.created)?;
        writeln!(
            f,
            "Members created: {} (updated: {})",
            c.members.created, c.members.updated
        )?;
        writeln!(f, "Callings created: {}", c.callings.created)?;
        write!(f, "Callings updated: {}", c.callings.updated)
    }
}

/// Imports a sheet from disk. A leading byte order mark is ignored.
pub fn import_file(conn: &Connection, path: &Path, kind: ImportKind) -> TrackResult<ImportStats> {
    if !path.exists() {
        return Err(TrackError::not_found("File", path.display()));
    }
    let text = std::fs::read_to_string(path)?;
    let body = text.strip_prefix('\u{feff}').unwrap_or(&text);

    info!(file = %path.display(), kind = ?kind, "importing callings");
    import_reader(conn, body.as_bytes(), kind)
}

/// Reads the preamble and header, then reconciles each data row in order.
/// Empty lines count as blank rows. Failed rows are rolled back, logged and
/// counted as skipped.
pub fn import_reader<R: Read>(conn: &Connection, reader: R, kind: ImportKind) -> TrackResult<ImportStats> {
    let mut stats = ImportStats::default();

    // Lines are split here rather than by the csv reader, which would drop
    // empty ones.
    let mut lines = BufReader::new(reader).lines();
    for _ in 0..layout::PREAMBLE_ROWS {
        if lines.next().transpose()?.is_none() {
            return Ok(stats);
        }
    }

    match lines.next().transpose()? {
        Some(header) => {
            let header = parse_line(&header)?;
            debug!(columns = header.as_ref().map_or(0, |h| h.len()), header = ?header, "import header");
        }
        None => return Ok(stats),
    }

    let mut carry = CarryForward::default();
    let first_data_line = layout::PREAMBLE_ROWS + 2;

    for (index, text) in lines.enumerate() {
        let line = first_data_line + index;
        stats.rows_processed += 1;

        let record = match text.map_err(TrackError::from).and_then(|t| Ok(parse_line(&t)?)) {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!(line, "empty line skipped");
                stats.rows_skipped += 1;
                continue;
            }
            Err(e) => {
                warn!(line, error = %e, "unreadable row");
                stats.rows_skipped += 1;
                continue;
            }
        };

        let row = SheetRow::new(line, record.iter());
        carry = carry.advance(&row);

        match reconciler::apply_row(conn, kind, &carry, &row) {
            Ok(RowOutcome::Applied(changes)) => stats.changes.merge(&changes),
            Ok(RowOutcome::Skipped(reason)) => {
                debug!(line, reason = %reason, "row skipped");
                stats.rows_skipped += 1;
            }
            Err(e) => {
                warn!(line, unit = ?carry.unit, error = %e, "row failed and was rolled back");
                stats.rows_skipped += 1;
            }
        }
    }

    info!(
        processed = stats.rows_processed,
        skipped = stats.rows_skipped,
        callings_created = stats.changes.callings.created,
        callings_updated = stats.changes.callings.updated,
        "import finished"
    );
    Ok(stats)
}

/// One sheet line as a record; `None` for a line with nothing on it.
fn parse_line(text: &str) -> Result<Option<csv::StringRecord>, csv::Error> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes())
        .records()
        .next()
        .transpose()
}
