//! Operator entry point over `stockroom_core`.
//!
//! # Responsibility
//! - Resolve config, start logging, open the store, bootstrap the allocator.
//! - Refuse to run any part command when bootstrap fails.

mod args;

use anyhow::{anyhow, Context, Result};
use args::{Cli, Command};
use clap::Parser;
use log::error;
use rusqlite::Connection;
use std::process::ExitCode;
use std::sync::Arc;
use stockroom_core::db::open_db;
use stockroom_core::{
    bootstrap_allocator, init_logging, NewPart, Part, PartListQuery, PartService,
    SqlitePartRepository, StockroomConfig,
};

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_exit module=cli status=error error={err:#}");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Command::Ping = cli.command {
        println!("stockroom_core ping={}", stockroom_core::ping());
        println!("stockroom_core version={}", stockroom_core::core_version());
        return Ok(());
    }

    let config = resolve_config(&cli)?;
    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(config.resolved_log_level(), log_dir)
            .map_err(|err| anyhow!("failed to initialize logging: {err}"))?;
    }

    let db_path = config.resolved_db_path();
    let conn = open_db(&db_path)
        .with_context(|| format!("failed to open database `{}`", db_path.display()))?;
    run_part_command(cli.command, &config, &conn)
}

fn resolve_config(cli: &Cli) -> Result<StockroomConfig> {
    let mut config = match cli.config.as_ref() {
        Some(path) => StockroomConfig::load(path)?,
        None => StockroomConfig::default(),
    };
    if let Some(db) = cli.db.clone() {
        config.db_path = Some(db);
    }
    if let Some(level) = cli.log_level.clone() {
        config.log_level = Some(level);
    }
    if let Some(dir) = cli.log_dir.clone() {
        config.log_dir = Some(dir);
    }
    Ok(config)
}

fn run_part_command(command: Command, config: &StockroomConfig, conn: &Connection) -> Result<()> {
    let format = config.sku.to_format()?;
    let repo = SqlitePartRepository::try_new(conn)?;
    let allocator = bootstrap_allocator(&repo, format)
        .context("sku allocator bootstrap failed; refusing to serve part commands")?;
    let service = PartService::new(repo, Arc::new(allocator));

    match command {
        Command::Ping => {}
        Command::NextSku => {
            let allocator = service.allocator();
            println!("{}", allocator.format().format(allocator.next_counter()));
        }
        Command::CreatePart {
            name,
            description,
            quantity,
            count,
        } => {
            for _ in 0..count {
                let part = service.create_part(NewPart {
                    name: name.clone(),
                    description: description.clone(),
                    quantity_on_hand: quantity,
                })?;
                print_part(&part);
            }
        }
        Command::ListParts {
            include_deleted,
            limit,
            offset,
        } => {
            let query = PartListQuery {
                include_deleted,
                limit,
                offset,
            };
            for part in service.list_parts(&query)? {
                print_part(&part);
            }
        }
        Command::GetPart { sku } => {
            let sku = service.allocator().format().parse(sku.trim())?;
            let part = service
                .get_part_by_sku(&sku)?
                .ok_or_else(|| anyhow!("no active part with sku {sku}"))?;
            print_part(&part);
        }
    }

    Ok(())
}

fn print_part(part: &Part) {
    let deleted = if part.is_deleted { "\tdeleted" } else { "" };
    println!(
        "{}\t{}\t{}\t{}{}",
        part.sku, part.id, part.quantity_on_hand, part.name, deleted
    );
}
