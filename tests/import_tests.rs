use std::io::Write;
use std::path::Path;

use calltrack::db::{calling_repo, history_repo, member_repo, schema, unit_repo};
use calltrack::error::TrackError;
use calltrack::import::{self, ChangeCounts, ImportKind};
use calltrack::model::*;
use chrono::NaiveDate;
use rusqlite::Connection;

const OPEN_WIDTH: usize = 16;
const COMPLETED_WIDTH: usize = 17;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// A CSV line of `width` cells with the given columns filled in.
fn line(width: usize, cells: &[(usize, &str)]) -> String {
    let mut row = vec![""; width];
    for &(col, value) in cells {
        row[col] = value;
    }
    row.join(",")
}

fn sheet(width: usize, rows: &[String]) -> String {
    let header: Vec<String> = (0..width).map(|i| format!("Column {}", i)).collect();
    let mut text = format!("Stake Callings\n\n{}\n", header.join(","));
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    text
}

fn import_open(conn: &Connection, rows: &[String]) -> import::ImportStats {
    let text = sheet(OPEN_WIDTH, rows);
    import::import_reader(conn, text.as_bytes(), ImportKind::Open).unwrap()
}

fn import_completed(conn: &Connection, rows: &[String]) -> import::ImportStats {
    let text = sheet(COMPLETED_WIDTH, rows);
    import::import_reader(conn, text.as_bytes(), ImportKind::Completed).unwrap()
}

fn ward_rows() -> Vec<String> {
    vec![
        line(
            OPEN_WIDTH,
            &[
                (0, "Twin Falls 2nd Ward"),
                (1, "Relief Society"),
                (2, "President"),
                (5, "06/01/2025"),
                (6, "Jane Smith"),
                (8, "05/25/2025"),
                (11, "Bishop Jones"),
                (13, "06/08/2025"),
                (14, "06/15/2025"),
                (15, "TRUE"),
            ],
        ),
        line(
            OPEN_WIDTH,
            &[(2, "1st Counselor"), (5, "06/01/2025"), (6, "Mary Jones")],
        ),
    ]
}

fn only_calling_for(conn: &Connection, holder: &str) -> Calling {
    let mut matches: Vec<Calling> = calling_repo::find_all(conn)
        .unwrap()
        .into_iter()
        .filter(|c| c.holder_name() == Some(holder))
        .collect();
    assert_eq!(matches.len(), 1, "callings held by {}", holder);
    matches.remove(0)
}

// ==========================================================================
// OPEN CALLINGS
// ==========================================================================

#[test]
fn open_rows_create_reference_data_and_callings() {
    let conn = schema::test_connection();
    let stats = import_open(&conn, &ward_rows());

    assert_eq!(stats.rows_processed, 2);
    assert_eq!(stats.rows_skipped, 0);
    assert_eq!(stats.changes.units.created, 1);
    assert_eq!(stats.changes.organizations.created, 1);
    assert_eq!(stats.changes.positions.created, 2);
    assert_eq!(stats.changes.members.created, 2);
    assert_eq!(stats.changes.callings.created, 2);

    let jane = only_calling_for(&conn, "Jane Smith");
    assert_eq!(jane.status, CallingStatus::Called);
    assert!(jane.is_active);
    assert_eq!(jane.date_called, Some(d(2025, 6, 1)));
    assert_eq!(jane.date_sustained, Some(d(2025, 6, 8)));
    assert_eq!(jane.date_set_apart, Some(d(2025, 6, 15)));
    assert_eq!(jane.presidency_approved, Some(d(2025, 5, 25)));
    assert_eq!(jane.called_by.as_deref(), Some("Bishop Jones"));
    assert!(jane.lcr_updated);
    assert!(jane.notes.as_deref().unwrap().starts_with("Imported from CSV on "));

    let history = history_repo::find_by_calling(&conn, jane.id).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].action, HistoryAction::Called);
    assert_eq!(history[0].changed_by, None);
}

#[test]
fn unit_and_organization_carry_forward() {
    let conn = schema::test_connection();
    import_open(&conn, &ward_rows());

    let listings = calling_repo::find_listings(&conn).unwrap();
    assert_eq!(listings.len(), 2);
    for listing in &listings {
        assert_eq!(listing.unit_name, "Twin Falls 2nd Ward");
        assert_eq!(listing.organization_name, "Relief Society");
    }

    let unit = unit_repo::find_by_name(&conn, "Twin Falls 2nd Ward").unwrap().unwrap();
    assert_eq!(unit.unit_type, UnitType::Ward);
}

#[test]
fn new_unit_resets_organization() {
    let conn = schema::test_connection();
    let rows = vec![
        line(OPEN_WIDTH, &[(0, "Buhl Ward"), (1, "Primary"), (2, "President"), (6, "Ann Lee")]),
        line(OPEN_WIDTH, &[(0, "Kimberly Branch"), (2, "Teacher"), (6, "Sam Hill")]),
    ];
    let stats = import_open(&conn, &rows);

    assert_eq!(stats.rows_skipped, 1);
    assert_eq!(stats.changes.callings.created, 1);
    assert!(unit_repo::find_by_name(&conn, "Kimberly Branch").unwrap().is_none());
}

#[test]
fn reimport_changes_nothing() {
    let conn = schema::test_connection();
    let first = import_open(&conn, &ward_rows());
    let second = import_open(&conn, &ward_rows());

    assert_eq!(second.rows_processed, first.rows_processed);
    assert_eq!(second.rows_skipped, 0);
    assert_eq!(second.changes, ChangeCounts::default());
    assert_eq!(calling_repo::count(&conn).unwrap(), 2);
    assert_eq!(member_repo::find_all(&conn).unwrap().len(), 2);

    let jane = only_calling_for(&conn, "Jane Smith");
    assert_eq!(history_repo::count_by_calling(&conn, jane.id).unwrap(), 1);
}

#[test]
fn changed_row_updates_existing_calling() {
    let conn = schema::test_connection();
    import_open(&conn, &ward_rows());

    let mut rows = ward_rows();
    rows[1] = line(
        OPEN_WIDTH,
        &[(2, "1st Counselor"), (5, "06/01/2025"), (6, "Mary Jones"), (13, "06/08/2025")],
    );
    let stats = import_open(&conn, &rows);

    assert_eq!(stats.changes.callings.created, 0);
    assert_eq!(stats.changes.callings.updated, 1);
    let mary = only_calling_for(&conn, "Mary Jones");
    assert_eq!(mary.date_sustained, Some(d(2025, 6, 8)));
}

#[test]
fn date_like_name_is_skipped() {
    let conn = schema::test_connection();
    let rows = vec![line(
        OPEN_WIDTH,
        &[(0, "Buhl Ward"), (1, "Primary"), (2, "President"), (6, "06/29/2025")],
    )];
    let stats = import_open(&conn, &rows);

    assert_eq!(stats.rows_processed, 1);
    assert_eq!(stats.rows_skipped, 1);
    assert!(member_repo::find_all(&conn).unwrap().is_empty());
    assert_eq!(calling_repo::count(&conn).unwrap(), 0);
}

#[test]
fn placeholder_name_is_not_a_member() {
    let conn = schema::test_connection();
    let rows = vec![line(
        OPEN_WIDTH,
        &[(0, "Buhl Ward"), (1, "Primary"), (2, "President"), (3, "N/A"), (6, "Vacant")],
    )];
    let stats = import_open(&conn, &rows);

    assert_eq!(stats.rows_skipped, 0);
    assert_eq!(stats.changes.positions.created, 1);
    assert!(member_repo::find_all(&conn).unwrap().is_empty());
}

#[test]
fn out_of_order_dates_are_skipped() {
    let conn = schema::test_connection();
    let rows = vec![line(
        OPEN_WIDTH,
        &[
            (0, "Buhl Ward"),
            (1, "Primary"),
            (2, "President"),
            (5, "06/10/2025"),
            (6, "Ann Lee"),
            (13, "06/01/2025"),
        ],
    )];
    let stats = import_open(&conn, &rows);

    assert_eq!(stats.rows_skipped, 1);
    assert!(unit_repo::find_by_name(&conn, "Buhl Ward").unwrap().is_none());
}

#[test]
fn blank_and_contextless_rows_are_skipped() {
    let conn = schema::test_connection();
    let rows = vec![
        line(OPEN_WIDTH, &[(2, "President"), (6, "Ann Lee")]),
        line(OPEN_WIDTH, &[]),
        line(OPEN_WIDTH, &[(0, "Buhl Ward"), (1, "Primary"), (6, "Ann Lee")]),
    ];
    let stats = import_open(&conn, &rows);

    assert_eq!(stats.rows_processed, 3);
    assert_eq!(stats.rows_skipped, 3);
    assert_eq!(stats.changes, ChangeCounts::default());
}

#[test]
fn currently_called_column_releases_holder() {
    let conn = schema::test_connection();
    let rows = vec![
        line(
            OPEN_WIDTH,
            &[(0, "Buhl Ward"), (1, "Primary"), (2, "President"), (5, "01/05/2025"), (6, "Bob Brown")],
        ),
        line(
            OPEN_WIDTH,
            &[
                (2, "President"),
                (3, "Bob Brown"),
                (4, "Bishop Jones"),
                (5, "06/01/2025"),
                (6, "Jane Smith"),
            ],
        ),
    ];
    let stats = import_open(&conn, &rows);

    assert_eq!(stats.changes.callings.created, 2);
    assert_eq!(stats.changes.callings.updated, 1);

    let bob = only_calling_for(&conn, "Bob Brown");
    assert_eq!(bob.status, CallingStatus::Released);
    assert!(!bob.is_active);
    assert_eq!(bob.released_by.as_deref(), Some("Bishop Jones"));
    let history = history_repo::find_by_calling(&conn, bob.id).unwrap();
    assert_eq!(history[0].action, HistoryAction::Released);

    let jane = only_calling_for(&conn, "Jane Smith");
    assert_eq!(jane.status, CallingStatus::Called);
}

#[test]
fn home_unit_column_sets_member_unit() {
    let conn = schema::test_connection();
    let rows = vec![line(
        OPEN_WIDTH,
        &[
            (0, "Twin Falls Stake"),
            (1, "High Council"),
            (2, "High Councilor"),
            (6, "Ann Lee"),
            (7, "Kimberly Branch"),
        ],
    )];
    let stats = import_open(&conn, &rows);
    assert_eq!(stats.changes.units.created, 2);

    let branch = unit_repo::find_by_name(&conn, "Kimberly Branch").unwrap().unwrap();
    assert_eq!(branch.unit_type, UnitType::Branch);
    let stake = unit_repo::find_by_name(&conn, "Twin Falls Stake").unwrap().unwrap();
    assert_eq!(stake.unit_type, UnitType::Stake);

    let ann = member_repo::find_by_name(&conn, "Ann Lee").unwrap();
    assert_eq!(ann[0].home_unit_id, Some(branch.id));
    assert_eq!(only_calling_for(&conn, "Ann Lee").home_unit_id, Some(branch.id));
}

#[test]
fn unhomed_member_is_adopted() {
    let conn = schema::test_connection();
    let loose = Member::create("Jane Smith".into(), None);
    member_repo::insert(&conn, &loose).unwrap();

    let stats = import_open(&conn, &ward_rows()[..1]);
    assert_eq!(stats.changes.members.created, 0);
    assert_eq!(stats.changes.members.updated, 1);

    let stored = member_repo::find_by_id(&conn, loose.id).unwrap().unwrap();
    assert!(stored.home_unit_id.is_some());
    assert_eq!(
        only_calling_for(&conn, "Jane Smith").holder.map(|h| h.member_id),
        Some(loose.id)
    );
}

#[test]
fn release_finds_holder_homed_elsewhere() {
    let conn = schema::test_connection();
    let rows = vec![
        line(
            OPEN_WIDTH,
            &[(0, "Buhl Ward"), (1, "Primary"), (2, "President"), (6, "Bob Brown"), (7, "Kimberly Branch")],
        ),
        line(OPEN_WIDTH, &[(2, "President"), (3, "Bob Brown"), (6, "Jane Smith")]),
    ];
    let stats = import_open(&conn, &rows);

    assert_eq!(stats.changes.members.created, 2);
    assert_eq!(member_repo::find_by_name(&conn, "Bob Brown").unwrap().len(), 1);
    assert_eq!(only_calling_for(&conn, "Bob Brown").status, CallingStatus::Released);
}

#[test]
fn release_of_unknown_holder_creates_one_member() {
    let conn = schema::test_connection();
    let rows = vec![line(
        OPEN_WIDTH,
        &[(0, "Buhl Ward"), (1, "Primary"), (2, "President"), (3, "Bob Brown"), (6, "Jane Smith")],
    )];
    import_open(&conn, &rows);
    import_open(&conn, &rows);

    assert_eq!(member_repo::find_by_name(&conn, "Bob Brown").unwrap().len(), 1);
}

#[test]
fn empty_lines_count_as_skipped_rows() {
    let conn = schema::test_connection();
    let rows = ward_rows();
    let with_gap = vec![rows[0].clone(), String::new(), rows[1].clone()];
    let stats = import_open(&conn, &with_gap);

    assert_eq!(stats.rows_processed, 3);
    assert_eq!(stats.rows_skipped, 1);
    assert_eq!(stats.changes.callings.created, 2);
}

#[test]
fn preamble_only_imports_nothing() {
    let conn = schema::test_connection();
    let stats = import::import_reader(&conn, "Stake Callings\n".as_bytes(), ImportKind::Open).unwrap();
    assert_eq!(stats, import::ImportStats::default());
}

// ==========================================================================
// COMPLETED CALLINGS
// ==========================================================================

#[test]
fn completed_row_closes_matching_open_calling() {
    let conn = schema::test_connection();
    import_open(&conn, &ward_rows());

    let rows = vec![line(
        COMPLETED_WIDTH,
        &[
            (0, "Twin Falls 2nd Ward"),
            (1, "Relief Society"),
            (2, "President"),
            (3, "Jane Smith"),
            (4, "Bishop Jones"),
            (5, "09/01/2025"),
            (13, "06/01/2025"),
        ],
    )];
    let stats = import_completed(&conn, &rows);

    assert_eq!(stats.changes.callings.created, 0);
    assert_eq!(stats.changes.callings.updated, 1);

    let jane = only_calling_for(&conn, "Jane Smith");
    assert_eq!(jane.status, CallingStatus::Completed);
    assert!(!jane.is_active);
    assert_eq!(jane.date_released, Some(d(2025, 9, 1)));
    assert_eq!(jane.released_by.as_deref(), Some("Bishop Jones"));
    assert!(jane.notes.as_deref().unwrap().starts_with("Imported from CSV on "));
}

#[test]
fn completed_row_without_home_closes_holder_homed_elsewhere() {
    let conn = schema::test_connection();
    import_open(
        &conn,
        &[line(
            OPEN_WIDTH,
            &[
                (0, "Buhl Ward"),
                (1, "Primary"),
                (2, "President"),
                (5, "01/05/2025"),
                (6, "Bob Brown"),
                (7, "Kimberly Branch"),
            ],
        )],
    );
    let branch = unit_repo::find_by_name(&conn, "Kimberly Branch").unwrap().unwrap();

    let rows = vec![line(
        COMPLETED_WIDTH,
        &[
            (0, "Buhl Ward"),
            (1, "Primary"),
            (2, "President"),
            (3, "Bob Brown"),
            (5, "09/01/2025"),
            (13, "01/05/2025"),
        ],
    )];
    let stats = import_completed(&conn, &rows);

    assert_eq!(stats.changes.members.created, 0);
    assert_eq!(stats.changes.callings.created, 0);
    assert_eq!(stats.changes.callings.updated, 1);
    assert_eq!(member_repo::find_by_name(&conn, "Bob Brown").unwrap().len(), 1);

    let bob = only_calling_for(&conn, "Bob Brown");
    assert_eq!(bob.status, CallingStatus::Completed);
    assert_eq!(bob.home_unit_id, Some(branch.id));
}

#[test]
fn completed_row_without_match_creates_closed_calling() {
    let conn = schema::test_connection();
    let rows = vec![line(
        COMPLETED_WIDTH,
        &[
            (0, "Buhl Ward"),
            (1, "Primary"),
            (2, "Chorister"),
            (3, "Ann Lee"),
            (4, "Bishop Jones"),
            (5, "09/01/2025"),
            (6, "Sam Hill"),
            (13, "01/01/2024"),
        ],
    )];
    let stats = import_completed(&conn, &rows);
    assert_eq!(stats.changes.callings.created, 1);

    let ann = only_calling_for(&conn, "Ann Lee");
    assert_eq!(ann.status, CallingStatus::Completed);
    assert_eq!(ann.proposed_replacement.as_deref(), Some("Sam Hill"));
    assert_eq!(
        ann.notes.as_deref(),
        Some("Imported from completed callings. Released by: Bishop Jones Proposed replacement: Sam Hill")
    );
    assert!(!ann.is_current());
}

#[test]
fn completed_row_needs_holder() {
    let conn = schema::test_connection();
    let rows = vec![line(
        COMPLETED_WIDTH,
        &[(0, "Buhl Ward"), (1, "Primary"), (2, "Chorister"), (5, "09/01/2025")],
    )];
    let stats = import_completed(&conn, &rows);
    assert_eq!(stats.rows_skipped, 1);
    assert_eq!(calling_repo::count(&conn).unwrap(), 0);
}

#[test]
fn completed_release_before_call_is_skipped() {
    let conn = schema::test_connection();
    let rows = vec![line(
        COMPLETED_WIDTH,
        &[
            (0, "Buhl Ward"),
            (1, "Primary"),
            (2, "Chorister"),
            (3, "Ann Lee"),
            (5, "01/01/2024"),
            (13, "09/01/2025"),
        ],
    )];
    let stats = import_completed(&conn, &rows);
    assert_eq!(stats.rows_skipped, 1);
    assert!(member_repo::find_all(&conn).unwrap().is_empty());
}

// ==========================================================================
// FILES
// ==========================================================================

#[test]
fn missing_file_is_not_found() {
    let conn = schema::test_connection();
    let err = import::import_file(&conn, Path::new("/nonexistent/callings.csv"), ImportKind::Open)
        .unwrap_err();
    assert!(matches!(err, TrackError::NotFound { ref entity_type, .. } if entity_type == "File"));
}

#[test]
fn file_with_byte_order_mark_imports() {
    let conn = schema::test_connection();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "\u{feff}{}", sheet(OPEN_WIDTH, &ward_rows())).unwrap();
    file.flush().unwrap();

    let stats = import::import_file(&conn, file.path(), ImportKind::Open).unwrap();
    assert_eq!(stats.rows_processed, 2);
    assert_eq!(stats.changes.callings.created, 2);
}
