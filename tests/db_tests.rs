use calltrack::db::*;
use calltrack::model::*;
use chrono::{NaiveDate, NaiveTime};

struct Fixture {
    conn: rusqlite::Connection,
    unit: Unit,
    org: Organization,
    position: Position,
    member: Member,
}

fn setup() -> Fixture {
    let conn = schema::test_connection();

    let unit = Unit::create("Twin Falls 1st Ward".into(), UnitType::Ward);
    unit_repo::insert(&conn, &unit).unwrap();

    let org = Organization::create("Relief Society".into());
    organization_repo::insert(&conn, &org).unwrap();

    let position = Position::create(org.id, "President".into());
    position_repo::insert(&conn, &position).unwrap();

    let member = Member::create("Jane Smith".into(), Some(unit.id));
    member_repo::insert(&conn, &member).unwrap();

    Fixture {
        conn,
        unit,
        org,
        position,
        member,
    }
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn calling_for(f: &Fixture) -> Calling {
    Calling::create(f.unit.id, f.org.id, f.position.id, Some(Holder::from(&f.member)))
}

// ==========================================================================
// REFERENCE DATA
// ==========================================================================

#[test]
fn unit_round_trip() {
    let f = setup();
    let mut unit = Unit::create("Kimberly Branch".into(), UnitType::Branch);
    unit.meeting_time = NaiveTime::from_hms_opt(10, 30, 0);
    unit.location = Some("Main St chapel".into());
    unit.sort_order = 3;
    unit.parent_id = Some(f.unit.id);
    unit_repo::insert(&f.conn, &unit).unwrap();

    let found = unit_repo::find_by_id(&f.conn, unit.id).unwrap().unwrap();
    assert_eq!(found.name, "Kimberly Branch");
    assert_eq!(found.unit_type, UnitType::Branch);
    assert_eq!(found.meeting_time, NaiveTime::from_hms_opt(10, 30, 0));
    assert_eq!(found.parent_id, Some(f.unit.id));
    assert_eq!(found.sort_order, 3);
}

#[test]
fn unit_names_are_unique_ignoring_case() {
    let f = setup();
    let dup = Unit::create("twin falls 1st ward".into(), UnitType::Ward);
    assert!(unit_repo::insert(&f.conn, &dup).is_err());
    assert!(unit_repo::find_by_name(&f.conn, "TWIN FALLS 1ST WARD").unwrap().is_some());
}

#[test]
fn units_list_by_sort_order_then_name() {
    let f = setup();
    let mut stake = Unit::create("Twin Falls Stake".into(), UnitType::Stake);
    stake.sort_order = -1;
    unit_repo::insert(&f.conn, &stake).unwrap();
    unit_repo::insert(&f.conn, &Unit::create("Buhl Ward".into(), UnitType::Ward)).unwrap();

    let names: Vec<String> = unit_repo::find_all(&f.conn)
        .unwrap()
        .into_iter()
        .map(|u| u.name)
        .collect();
    assert_eq!(names, vec!["Twin Falls Stake", "Buhl Ward", "Twin Falls 1st Ward"]);
}

#[test]
fn positions_are_unique_within_an_organization() {
    let f = setup();
    let dup = Position::create(f.org.id, "president".into());
    assert!(position_repo::insert(&f.conn, &dup).is_err());

    let other_org = Organization::create("Primary".into());
    organization_repo::insert(&f.conn, &other_org).unwrap();
    let same_title = Position::create(other_org.id, "President".into());
    assert!(position_repo::insert(&f.conn, &same_title).is_ok());
}

#[test]
fn find_position_by_title_ignores_case() {
    let f = setup();
    let found = position_repo::find_by_title(&f.conn, f.org.id, "PRESIDENT").unwrap();
    assert_eq!(found.map(|p| p.id), Some(f.position.id));
}

#[test]
fn members_may_share_names() {
    let f = setup();
    let twin = Member::create("Jane Smith".into(), None);
    member_repo::insert(&f.conn, &twin).unwrap();

    let found = member_repo::find_by_name(&f.conn, "jane smith").unwrap();
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].id, f.member.id);
}

// ==========================================================================
// CALLINGS
// ==========================================================================

#[test]
fn calling_round_trip() {
    let f = setup();
    let mut calling = calling_for(&f);
    calling.status = CallingStatus::Called;
    calling.date_called = Some(d(2025, 6, 1));
    calling.date_sustained = Some(d(2025, 6, 8));
    calling.presidency_approved = Some(d(2025, 5, 25));
    calling.called_by = Some("Bishop Jones".into());
    calling.lcr_updated = true;
    calling.home_unit_id = Some(f.unit.id);
    calling_repo::insert(&f.conn, &calling).unwrap();

    let found = calling_repo::find_by_id(&f.conn, calling.id).unwrap().unwrap();
    assert_eq!(found, calling);
    assert_eq!(found.holder_name(), Some("Jane Smith"));
}

#[test]
fn calling_update_persists() {
    let f = setup();
    let mut calling = calling_for(&f);
    calling_repo::insert(&f.conn, &calling).unwrap();

    calling.status = CallingStatus::Released;
    calling.is_active = false;
    calling.release_notes = Some("Moved".into());
    calling_repo::update(&f.conn, &calling).unwrap();

    let found = calling_repo::find_by_id(&f.conn, calling.id).unwrap().unwrap();
    assert_eq!(found.status, CallingStatus::Released);
    assert!(!found.is_active);
    assert_eq!(found.release_notes.as_deref(), Some("Moved"));
}

#[test]
fn position_with_callings_cannot_be_deleted() {
    let f = setup();
    calling_repo::insert(&f.conn, &calling_for(&f)).unwrap();

    assert!(position_repo::delete(&f.conn, f.position.id).is_err());
    assert_eq!(position_repo::count_callings(&f.conn, f.position.id).unwrap(), 1);
}

#[test]
fn deleting_member_leaves_calling_without_holder() {
    let f = setup();
    let calling = calling_for(&f);
    calling_repo::insert(&f.conn, &calling).unwrap();

    member_repo::delete(&f.conn, f.member.id).unwrap();
    let found = calling_repo::find_by_id(&f.conn, calling.id).unwrap().unwrap();
    assert!(found.holder.is_none());
}

#[test]
fn find_by_key_respects_status() {
    let f = setup();
    let mut calling = calling_for(&f);
    calling.status = CallingStatus::Called;
    calling_repo::insert(&f.conn, &calling).unwrap();

    let key = |status| {
        calling_repo::find_by_key(&f.conn, f.unit.id, f.org.id, f.position.id, f.member.id, status)
            .unwrap()
    };
    assert!(key(Some(CallingStatus::Called)).is_some());
    assert!(key(Some(CallingStatus::Released)).is_none());
    assert!(key(None).is_some());
}

#[test]
fn find_called_by_holder_name_only_matches_called() {
    let f = setup();
    let mut calling = calling_for(&f);
    calling_repo::insert(&f.conn, &calling).unwrap();

    let find = || {
        calling_repo::find_called_by_holder_name(&f.conn, f.unit.id, f.position.id, "JANE SMITH")
            .unwrap()
    };
    assert!(find().is_none());

    calling.status = CallingStatus::Called;
    calling_repo::update(&f.conn, &calling).unwrap();
    assert_eq!(find().map(|c| c.id), Some(calling.id));
}

#[test]
fn position_callings_newest_first_undated_last() {
    let f = setup();
    let mut undated = calling_for(&f);
    undated.date_called = None;
    let mut older = calling_for(&f);
    older.date_called = Some(d(2024, 1, 1));
    let mut newer = calling_for(&f);
    newer.date_called = Some(d(2025, 1, 1));
    for c in [&undated, &older, &newer] {
        calling_repo::insert(&f.conn, c).unwrap();
    }

    let ids: Vec<_> = calling_repo::find_by_position(&f.conn, f.position.id)
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, vec![newer.id, older.id, undated.id]);
}

#[test]
fn listings_carry_names() {
    let f = setup();
    calling_repo::insert(&f.conn, &calling_for(&f)).unwrap();

    let listings = calling_repo::find_listings(&f.conn).unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].unit_name, "Twin Falls 1st Ward");
    assert_eq!(listings[0].organization_name, "Relief Society");
    assert_eq!(listings[0].position_title, "President");
}

// ==========================================================================
// HISTORY AND GROUPS
// ==========================================================================

#[test]
fn history_is_listed_newest_first_and_cascades() {
    let f = setup();
    let calling = calling_for(&f);
    calling_repo::insert(&f.conn, &calling).unwrap();

    let first = CallingHistory::record(&calling, HistoryAction::Called, Some("clerk"), None).unwrap();
    history_repo::insert(&f.conn, &first).unwrap();
    let second =
        CallingHistory::record(&calling, HistoryAction::Updated, None, Some("fixed".into())).unwrap();
    history_repo::insert(&f.conn, &second).unwrap();

    let entries = history_repo::find_by_calling(&f.conn, calling.id).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].action, HistoryAction::Updated);
    assert_eq!(entries[0].notes.as_deref(), Some("fixed"));
    assert_eq!(entries[1].changed_by.as_deref(), Some("clerk"));

    calling_repo::delete(&f.conn, calling.id).unwrap();
    assert_eq!(history_repo::count_by_calling(&f.conn, calling.id).unwrap(), 0);
}

#[test]
fn group_membership_round_trip() {
    let f = setup();
    assert!(group_repo::ensure_group(&f.conn, "Bishop").unwrap());
    assert!(!group_repo::ensure_group(&f.conn, "Bishop").unwrap());
    group_repo::add_permission(&f.conn, "Bishop", "approve_calling").unwrap();
    group_repo::add_permission(&f.conn, "Bishop", "approve_calling").unwrap();
    assert_eq!(
        group_repo::find_permissions(&f.conn, "Bishop").unwrap(),
        vec!["approve_calling"]
    );

    let user = User::create("bishop.jones".into(), false);
    group_repo::insert_user(&f.conn, &user).unwrap();
    group_repo::add_user_to_group(&f.conn, user.id, "Bishop").unwrap();

    let found = group_repo::find_user_by_username(&f.conn, "Bishop.Jones").unwrap().unwrap();
    assert_eq!(found.id, user.id);
    assert_eq!(group_repo::find_user_groups(&f.conn, user.id).unwrap(), vec!["Bishop"]);
}
