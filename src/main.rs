// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Perimeter-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Perimeter and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Perimeter CLI entrypoint.
//!
//! Reads site folders (`list`), prints the wire schema (`schema`) and runs the scripted editor
//! walkthrough against a throwaway site folder (`demo`). Logging goes to stderr and is filtered
//! through `RUST_LOG`.

use std::error::Error;

use perimeter::config::EditorConfig;
use perimeter::format::{boundary_to_json, wire_schema, BoundaryJson};
use perimeter::model::SiteId;
use perimeter::store::{SiteFolder, WriteDurability};
use tracing_subscriber::EnvFilter;

const DEMO_SITE_ID: &str = "demo";

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--site-dir <dir>] [--durable-writes] list <site-id>\n  {program} schema\n  {program} [--durable-writes] demo\n\nIf --site-dir is omitted, the current working directory is used.\ndemo writes into a fresh temporary site folder and cannot be combined with --site-dir.\n\n--durable-writes opts into slower, best-effort durable persistence (fsync/sync where supported).\n\nEnvironment: PERIMETER_PALETTE, PERIMETER_GATEWAY_TIMEOUT_MS, PERIMETER_HISTORY_LIMIT, RUST_LOG."
    );
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    List { site_id: String },
    Schema,
    Demo,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    site_dir: Option<String>,
    durable_writes: bool,
    command: Option<Command>,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();
    let mut positional = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--site-dir" => {
                if options.site_dir.is_some() {
                    return Err(());
                }
                let dir = args.next().ok_or(())?;
                options.site_dir = Some(dir);
            }
            "--durable-writes" => {
                if options.durable_writes {
                    return Err(());
                }
                options.durable_writes = true;
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    options.command = match positional.next().as_deref() {
        None => None,
        Some("list") => Some(Command::List {
            site_id: positional.next().ok_or(())?,
        }),
        Some("schema") => Some(Command::Schema),
        Some("demo") => Some(Command::Demo),
        Some(_) => return Err(()),
    };
    if positional.next().is_some() {
        return Err(());
    }

    if options.command == Some(Command::Demo) && options.site_dir.is_some() {
        return Err(());
    }

    Ok(options)
}

fn site_folder(dir: String, durable_writes: bool) -> SiteFolder {
    if durable_writes {
        SiteFolder::new(dir).with_durability(WriteDurability::Durable)
    } else {
        SiteFolder::new(dir)
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "perimeter".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };
        let Some(command) = options.command else {
            print_usage(&program);
            std::process::exit(2);
        };

        match command {
            Command::Schema => print_json(&wire_schema()),
            Command::List { site_id } => {
                let site_id = SiteId::new(site_id)?;
                let dir = options.site_dir.unwrap_or_else(|| ".".to_owned());
                let folder = site_folder(dir, options.durable_writes);
                let records: Vec<BoundaryJson> =
                    folder.load_site(&site_id)?.iter().map(boundary_to_json).collect();
                print_json(&records)
            }
            Command::Demo => {
                let config = EditorConfig::from_env()?;
                let now_millis = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .map(|d| d.as_millis())
                    .unwrap_or(0);
                let demo_dir = std::env::temp_dir()
                    .join(format!("perimeter-demo-{}-{now_millis}", std::process::id()));
                let folder = site_folder(
                    demo_dir.to_string_lossy().into_owned(),
                    options.durable_writes,
                );
                let site_id = SiteId::new(DEMO_SITE_ID)?;

                let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
                let report = runtime.block_on(perimeter::demo::run_demo(folder, site_id, config))?;

                for render in &report.renders {
                    let name = report
                        .boundaries
                        .iter()
                        .find(|record| record.boundary_id() == &render.boundary_id)
                        .map(|record| record.name())
                        .unwrap_or("?");
                    println!(
                        "{}\t{}\tvisible={}\tz={}\tfill={}\tstroke={}",
                        render.boundary_id,
                        name,
                        render.options.visible,
                        render.options.z_index,
                        render.options.fill_color,
                        render.options.stroke_color,
                    );
                }
                let records: Vec<BoundaryJson> =
                    report.boundaries.iter().map(boundary_to_json).collect();
                print_json(&records)?;
                eprintln!("perimeter: demo site folder at {}", demo_dir.display());
                Ok(())
            }
        }
    })();

    if let Err(err) = result {
        eprintln!("perimeter: {err}");
        std::process::exit(1);
    }
}
