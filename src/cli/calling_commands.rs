use chrono::NaiveDate;
use clap::{Args, Subcommand};

use super::context::{format_date, parse_calling_id, parse_date_arg, CliContext};
use crate::db::calling_repo::CallingListing;
use crate::db::{organization_repo, position_repo, unit_repo};
use crate::error::{TrackError, TrackResult};
use crate::model::*;
use crate::ops::calling_ops::{self, CallingChanges, ReleaseRequest};
use crate::queries::calling_queries::{
    self, CallingFilter, SortKey, SortOrder, StatusFilter,
};
use crate::queries::dashboard_queries;

#[derive(Debug, Subcommand)]
pub enum CallingCommand {
    /// Start a new calling (status PENDING)
    Add {
        #[arg(long)]
        unit: String,
        #[arg(long)]
        org: String,
        #[arg(long)]
        position: String,
        #[command(flatten)]
        fields: CallingFields,
    },

    /// Edit dates, holder and notes of a calling
    Edit {
        #[arg(value_parser = parse_calling_id)]
        id: Id<Calling>,
        #[command(flatten)]
        fields: CallingFields,
    },

    /// List callings
    List {
        /// Case-insensitive text to look for in names and titles
        #[arg(short, long)]
        search: Option<String>,
        /// all, active, pending, released or cancelled
        #[arg(long, default_value = "all")]
        status: String,
        /// default, holder, position, date or status
        #[arg(long, default_value = "default")]
        sort: String,
        #[arg(long)]
        desc: bool,
        #[arg(long, default_value = "1")]
        page: usize,
        #[arg(long)]
        page_size: Option<usize>,
    },

    /// Show a calling and its history
    Show {
        #[arg(value_parser = parse_calling_id)]
        id: Id<Calling>,
    },

    /// Record presidency approval
    Approve {
        #[arg(value_parser = parse_calling_id)]
        id: Id<Calling>,
        /// Approval date (defaults to today)
        #[arg(long, value_parser = parse_date_arg)]
        on: Option<NaiveDate>,
    },

    /// Record high council approval
    HcApprove {
        #[arg(value_parser = parse_calling_id)]
        id: Id<Calling>,
        #[arg(long, value_parser = parse_date_arg)]
        on: Option<NaiveDate>,
    },

    /// Set any status, e.g. CALLED or ON_HOLD
    Status {
        #[arg(value_parser = parse_calling_id)]
        id: Id<Calling>,
        status: String,
    },

    /// Release the holder of a calling
    Release {
        #[arg(value_parser = parse_calling_id)]
        id: Id<Calling>,
        #[arg(long, value_parser = parse_date_arg)]
        on: Option<NaiveDate>,
        #[arg(long)]
        by: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Mark a calling as recorded in LCR
    Lcr {
        #[arg(value_parser = parse_calling_id)]
        id: Id<Calling>,
    },

    /// Delete a calling and its history
    Delete {
        #[arg(value_parser = parse_calling_id)]
        id: Id<Calling>,
    },
}

#[derive(Debug, Args)]
pub struct CallingFields {
    /// Member id or unique name; a new name creates the member
    #[arg(long)]
    member: Option<String>,
    #[arg(long)]
    home_unit: Option<String>,
    #[arg(long, value_parser = parse_date_arg)]
    called: Option<NaiveDate>,
    #[arg(long, value_parser = parse_date_arg)]
    sustained: Option<NaiveDate>,
    #[arg(long, value_parser = parse_date_arg)]
    set_apart: Option<NaiveDate>,
    /// Planned release date; use `calling release` to release
    #[arg(long, value_parser = parse_date_arg)]
    release_date: Option<NaiveDate>,
    #[arg(long, value_parser = parse_date_arg)]
    presidency_approved: Option<NaiveDate>,
    #[arg(long, value_parser = parse_date_arg)]
    hc_approved: Option<NaiveDate>,
    #[arg(long)]
    bishop_consulted_by: Option<String>,
    #[arg(long)]
    called_by: Option<String>,
    #[arg(long)]
    replacement: Option<String>,
    #[arg(long)]
    notes: Option<String>,
}

pub fn run(ctx: &CliContext, command: CallingCommand) -> TrackResult<()> {
    match command {
        CallingCommand::Add {
            unit,
            org,
            position,
            fields,
        } => add(ctx, &unit, &org, &position, fields),
        CallingCommand::Edit { id, fields } => edit(ctx, id, fields),
        CallingCommand::List {
            search,
            status,
            sort,
            desc,
            page,
            page_size,
        } => {
            let filter = CallingFilter {
                search,
                status: StatusFilter::parse(&status).ok_or_else(|| {
                    TrackError::validation("status", format!("unknown status tab '{}'", status))
                })?,
                sort: SortKey::parse(&sort).ok_or_else(|| {
                    TrackError::validation("sort", format!("unknown sort key '{}'", sort))
                })?,
                order: if desc { SortOrder::Desc } else { SortOrder::Asc },
                page,
                page_size: page_size.unwrap_or(ctx.page_size),
            };
            list(ctx, &filter)
        }
        CallingCommand::Show { id } => show(ctx, id),
        CallingCommand::Approve { id, on } => {
            let principal = ctx.principal()?;
            let calling = calling_ops::record_approval(
                &ctx.conn,
                &principal,
                id,
                on.unwrap_or_else(CliContext::today),
            )?;
            print_outcome(ctx, &calling)
        }
        CallingCommand::HcApprove { id, on } => {
            let principal = ctx.principal()?;
            let calling = calling_ops::record_hc_approval(
                &ctx.conn,
                &principal,
                id,
                on.unwrap_or_else(CliContext::today),
            )?;
            print_outcome(ctx, &calling)
        }
        CallingCommand::Status { id, status } => {
            let principal = ctx.principal()?;
            let status = CallingStatus::parse_label(&status).ok_or_else(|| {
                TrackError::validation("status", format!("unknown status '{}'", status))
            })?;
            let calling = calling_ops::set_status(&ctx.conn, &principal, id, status)?;
            print_outcome(ctx, &calling)
        }
        CallingCommand::Release { id, on, by, notes } => {
            let principal = ctx.principal()?;
            let request = ReleaseRequest {
                date_released: on,
                released_by: by,
                release_notes: notes,
            };
            let calling = calling_ops::release(&ctx.conn, &principal, id, &request)?;
            print_outcome(ctx, &calling)
        }
        CallingCommand::Lcr { id } => {
            let principal = ctx.principal()?;
            let calling = calling_ops::mark_lcr_updated(&ctx.conn, &principal, id)?;
            print_outcome(ctx, &calling)
        }
        CallingCommand::Delete { id } => {
            let principal = ctx.principal()?;
            calling_ops::delete_calling(&ctx.conn, &principal, id)?;
            println!("Deleted calling {}", id);
            Ok(())
        }
    }
}

fn add(ctx: &CliContext, unit: &str, org: &str, position: &str, fields: CallingFields) -> TrackResult<()> {
    let principal = ctx.principal()?;
    let unit = ctx.unit_by_name(unit)?;
    let org = ctx.organization_by_name(org)?;
    let position = ctx.position_by_title(&org, position)?;

    let changes = to_changes(ctx, fields)?;
    let calling = calling_ops::create_calling(&ctx.conn, &principal, unit.id, org.id, position.id, &changes)?;
    print_outcome(ctx, &calling)
}

fn edit(ctx: &CliContext, id: Id<Calling>, fields: CallingFields) -> TrackResult<()> {
    let principal = ctx.principal()?;
    let changes = to_changes(ctx, fields)?;
    let calling = calling_ops::update_calling(&ctx.conn, &principal, id, &changes)?;
    print_outcome(ctx, &calling)
}

// Flags that were not given leave the field alone. An unknown member name is
// created along with the calling.
fn to_changes(ctx: &CliContext, fields: CallingFields) -> TrackResult<CallingChanges> {
    let home_unit = match fields.home_unit.as_deref() {
        Some(name) => Some(ctx.unit_by_name(name)?.id),
        None => None,
    };
    let (member_id, new_member) = match fields.member {
        Some(name) => match ctx.member(&name) {
            Ok(member) => (Some(Some(member.id)), None),
            Err(TrackError::NotFound { .. }) => (None, Some(name)),
            Err(e) => return Err(e),
        },
        None => (None, None),
    };

    Ok(CallingChanges {
        member_id,
        new_member,
        home_unit_id: home_unit.map(Some),
        date_called: fields.called.map(Some),
        date_sustained: fields.sustained.map(Some),
        date_set_apart: fields.set_apart.map(Some),
        date_released: fields.release_date.map(Some),
        presidency_approved: fields.presidency_approved.map(Some),
        hc_approved: fields.hc_approved.map(Some),
        bishop_consulted_by: fields.bishop_consulted_by.map(Some),
        called_by: fields.called_by.map(Some),
        proposed_replacement: fields.replacement.map(Some),
        notes: fields.notes.map(Some),
    })
}

fn list(ctx: &CliContext, filter: &CallingFilter) -> TrackResult<()> {
    let page = calling_queries::list_callings(&ctx.conn, filter)?;
    if ctx.json {
        return ctx.print_json(&page);
    }

    let counts = calling_queries::status_counts(&ctx.conn, filter.search.as_deref())?;
    let tabs: Vec<String> = StatusFilter::ALL
        .iter()
        .map(|f| format!("{} {}", f.label(), counts.get(*f)))
        .collect();
    println!("[{}]", tabs.join(" | "));

    if page.items.is_empty() {
        println!("No callings found.");
        return Ok(());
    }

    for group in calling_queries::group_by_unit(&page.items) {
        println!();
        println!("{}", group.unit_name);
        for listing in &group.callings {
            println!("  {}", listing_line(listing));
        }
    }
    println!();
    println!(
        "Page {} of {} ({} callings)",
        page.page,
        page.total_pages().max(1),
        page.total
    );
    Ok(())
}

fn show(ctx: &CliContext, id: Id<Calling>) -> TrackResult<()> {
    let calling = calling_ops::get_calling(&ctx.conn, id)?;
    let history = calling_ops::history(&ctx.conn, id)?;
    if ctx.json {
        return ctx.print_json(&serde_json::json!({ "calling": calling, "history": history }));
    }

    let unit = unit_repo::find_by_id(&ctx.conn, calling.unit_id)?;
    let org = organization_repo::find_by_id(&ctx.conn, calling.organization_id)?;
    let position = position_repo::find_by_id(&ctx.conn, calling.position_id)?;

    println!(
        "{} / {} / {}",
        unit.map(|u| u.name).unwrap_or_default(),
        org.map(|o| o.name).unwrap_or_default(),
        position.map(|p| p.title).unwrap_or_default()
    );
    println!("  Holder:      {}", calling.display_name().unwrap_or_else(|| "(none)".into()));
    println!(
        "  Status:      {} [{}]",
        calling.status.display_name(),
        calling.status_badge().css_class()
    );
    println!("  Called:      {}", format_date(calling.date_called));
    println!("  Sustained:   {}", format_date(calling.date_sustained));
    println!("  Set apart:   {}", format_date(calling.date_set_apart));
    println!("  Released:    {}", format_date(calling.date_released));
    println!("  Presidency:  {}", format_date(calling.presidency_approved));
    println!("  HC:          {}", format_date(calling.hc_approved));
    println!("  LCR updated: {}", if calling.lcr_updated { "yes" } else { "no" });
    if let Some(notes) = &calling.notes {
        println!("  Notes:       {}", notes);
    }
    if let Some(notes) = &calling.release_notes {
        println!("  Release:     {}", notes);
    }

    if !history.is_empty() {
        println!();
        println!("History:");
        for entry in &history {
            println!(
                "  {} {} by {}",
                entry.changed_at.format("%Y-%m-%d %H:%M"),
                entry.action.display_name(),
                entry.changed_by.as_deref().unwrap_or("import")
            );
        }
    }
    Ok(())
}

pub fn dashboard(ctx: &CliContext) -> TrackResult<()> {
    let board = dashboard_queries::dashboard(&ctx.conn, CliContext::today())?;
    if ctx.json {
        return ctx.print_json(&board);
    }

    println!("Units: {}", board.unit_count);
    println!("Active callings: {}", board.active_callings);
    println!("Currently called: {}", board.called_callings);

    if !board.status_breakdown.is_empty() {
        println!();
        println!("By status:");
        for (status, n) in &board.status_breakdown {
            println!("  {:<12} {}", status.display_name(), n);
        }
    }
    print_section("Recent callings", &board.recent_callings);
    print_section("Upcoming releases", &board.upcoming_releases);
    print_section("Upcoming events", &board.upcoming_events);

    if !board.recent_history.is_empty() {
        println!();
        println!("Recent activity:");
        for entry in &board.recent_history {
            println!(
                "  {} {} {}",
                entry.changed_at.format("%Y-%m-%d"),
                entry.action.display_name(),
                entry.calling_id
            );
        }
    }
    Ok(())
}

fn print_section(title: &str, listings: &[CallingListing]) {
    if listings.is_empty() {
        return;
    }
    println!();
    println!("{}:", title);
    for listing in listings {
        println!("  {}", listing_line(listing));
    }
}

fn listing_line(listing: &CallingListing) -> String {
    let c = &listing.calling;
    format!(
        "{} / {}: {} [{}] called {} ({})",
        listing.organization_name,
        listing.position_title,
        c.display_name().unwrap_or_else(|| "(vacant)".into()),
        c.status.display_name(),
        format_date(c.date_called),
        c.id
    )
}

fn print_outcome(ctx: &CliContext, calling: &Calling) -> TrackResult<()> {
    if ctx.json {
        return ctx.print_json(calling);
    }
    println!(
        "{}: {} [{}]",
        calling.id,
        calling.display_name().unwrap_or_else(|| "(no holder)".into()),
        calling.status.display_name()
    );
    Ok(())
}
