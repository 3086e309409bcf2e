use clap::Subcommand;

use super::context::CliContext;
use crate::db::{organization_repo, unit_repo};
use crate::error::{TrackError, TrackResult};
use crate::model::UnitType;
use crate::ops::{group_ops, member_ops, organization_ops, position_ops, unit_ops};
use crate::queries::position_queries;

#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Register a user
    Add {
        username: String,
        #[arg(long)]
        superuser: bool,
    },
    /// Put a user in a permission group
    Grant { username: String, group: String },
}

#[derive(Debug, Subcommand)]
pub enum UnitCommand {
    /// Add a ward, branch or stake
    Add {
        name: String,
        /// ward, branch or stake; guessed from the name when omitted
        #[arg(long = "type")]
        unit_type: Option<String>,
        /// Name of the parent unit
        #[arg(long)]
        parent: Option<String>,
    },
    List,
}

#[derive(Debug, Subcommand)]
pub enum OrgCommand {
    Add {
        name: String,
        #[arg(long)]
        unit: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    List,
}

#[derive(Debug, Subcommand)]
pub enum PositionCommand {
    Add {
        #[arg(long)]
        org: String,
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        set_apart: bool,
    },
    /// Positions of an organization with their current holders
    Roster { org: String },
}

pub fn create_groups(ctx: &CliContext) -> TrackResult<()> {
    let reports = group_ops::bootstrap_groups(&ctx.conn)?;
    if ctx.json {
        return ctx.print_json(&reports);
    }
    for report in &reports {
        let verb = if report.created { "Created" } else { "Updated" };
        println!("{} group '{}' ({} permissions)", verb, report.name, report.permissions);
    }
    Ok(())
}

pub fn cleanup_members(ctx: &CliContext) -> TrackResult<()> {
    let removed = member_ops::cleanup_date_like_members(&ctx.conn)?;
    if removed.is_empty() {
        println!("No members with date-like names found");
        return Ok(());
    }
    println!("Deleted {} members with date-like names:", removed.len());
    for member in &removed {
        println!("  - {} ({})", member.name, member.id);
    }
    Ok(())
}

pub fn user(ctx: &CliContext, command: UserCommand) -> TrackResult<()> {
    match command {
        UserCommand::Add {
            username,
            superuser,
        } => {
            let user = group_ops::add_user(&ctx.conn, &username, superuser)?;
            println!("Added user {}", user.username);
        }
        UserCommand::Grant { username, group } => {
            group_ops::assign_group(&ctx.conn, &username, &group)?;
            println!("{} is now in {}", username, group);
        }
    }
    Ok(())
}

pub fn unit(ctx: &CliContext, command: UnitCommand) -> TrackResult<()> {
    match command {
        UnitCommand::Add {
            name,
            unit_type,
            parent,
        } => {
            let principal = ctx.principal()?;
            let unit_type = match unit_type.as_deref() {
                Some(t) => UnitType::from_db_str(&t.trim().to_uppercase()).ok_or_else(|| {
                    TrackError::validation("unit_type", format!("unknown unit type '{}'", t))
                })?,
                None => UnitType::infer_from_name(&name),
            };
            let parent_id = match parent.as_deref() {
                Some(p) => Some(ctx.unit_by_name(p)?.id),
                None => None,
            };
            let unit = unit_ops::create_unit(&ctx.conn, &principal, &name, unit_type, parent_id)?;
            println!("Added {}", unit);
        }
        UnitCommand::List => {
            let units = unit_repo::find_all(&ctx.conn)?;
            if ctx.json {
                return ctx.print_json(&units);
            }
            if units.is_empty() {
                println!("No units yet.");
            }
            for unit in &units {
                let callings = unit_repo::count_callings(&ctx.conn, unit.id)?;
                println!("  {} - {} callings", unit, callings);
            }
        }
    }
    Ok(())
}

pub fn org(ctx: &CliContext, command: OrgCommand) -> TrackResult<()> {
    match command {
        OrgCommand::Add {
            name,
            unit,
            description,
        } => {
            let principal = ctx.principal()?;
            let unit_id = match unit.as_deref() {
                Some(u) => Some(ctx.unit_by_name(u)?.id),
                None => None,
            };
            let org = organization_ops::create_organization(
                &ctx.conn,
                &principal,
                &name,
                unit_id,
                description.as_deref(),
            )?;
            println!("Added organization {}", org.name);
        }
        OrgCommand::List => {
            let orgs = organization_repo::find_all(&ctx.conn)?;
            if ctx.json {
                return ctx.print_json(&orgs);
            }
            if orgs.is_empty() {
                println!("No organizations yet.");
            }
            for org in &orgs {
                println!("  {}", org.name);
            }
        }
    }
    Ok(())
}

pub fn position(ctx: &CliContext, command: PositionCommand) -> TrackResult<()> {
    match command {
        PositionCommand::Add {
            org,
            title,
            description,
            set_apart,
        } => {
            let principal = ctx.principal()?;
            let org = ctx.organization_by_name(&org)?;
            let position = position_ops::create_position(
                &ctx.conn,
                &principal,
                org.id,
                &title,
                description.as_deref(),
                set_apart,
            )?;
            let kind = if position.is_leadership { " (leadership)" } else { "" };
            println!("Added position {} in {}{}", position.title, org.name, kind);
        }
        PositionCommand::Roster { org } => {
            let org = ctx.organization_by_name(&org)?;
            let roster = position_queries::position_roster(&ctx.conn, org.id)?;
            if ctx.json {
                return ctx.print_json(&roster);
            }
            println!("{}:", org.name);
            for entry in &roster {
                let holder = entry
                    .current
                    .as_ref()
                    .and_then(|c| c.display_name())
                    .unwrap_or_else(|| "(vacant)".into());
                println!("  {:<28} {}", entry.position.title, holder);
            }
        }
    }
    Ok(())
}
