// ==========================================
// Brick Buildability - command line entry point
// ==========================================
// Subcommands work on the local SQLite store, or on the
// remote provider when provider_base_url is configured.
// Output goes to stdout; logs go to stderr.
// ==========================================

use anyhow::{bail, Context};
use brick_buildability::app::{get_default_db_path, AppState};
use brick_buildability::config::{config_keys, ConfigManager, EngineConfig, ReportSort};
use brick_buildability::domain::{CoverageReport, PartKey, RequirementLine};
use brick_buildability::engine::ApplyReport;
use brick_buildability::importer::InventoryCsvImporter;
use brick_buildability::provider::StaticCredentials;
use brick_buildability::LoadOutcome;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

/// Environment variable holding the remote provider bearer token.
const TOKEN_ENV: &str = "BRICK_BUILDABILITY_TOKEN";

#[derive(Parser, Debug)]
#[command(name = "brick-buildability", version, about = "Can I build this set from the parts I own?")]
struct Cli {
    /// Database file (default: $BRICK_BUILDABILITY_DB_PATH or the user data dir)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Coverage of a set by the current inventory
    Report {
        set_id: String,
        /// Line order: requirement_order | shortfall (default from config)
        #[arg(long)]
        sort: Option<ReportSort>,
        /// Only lines that are short
        #[arg(long)]
        missing_only: bool,
    },
    /// Add an owned-parts CSV export to the inventory
    ImportInventory {
        file: PathBuf,
        /// Leave spare parts out
        #[arg(long)]
        skip_spares: bool,
        /// Parse and report without writing
        #[arg(long)]
        dry_run: bool,
    },
    /// Stage one inventory change against a set's report and apply it
    Adjust {
        set_id: String,
        part_num: String,
        color_id: i64,
        /// Signed change, e.g. 2 or -1
        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },
    /// Store a set's parts list from a CSV (part_num,color_id,quantity)
    SeedSet {
        set_id: String,
        file: PathBuf,
        #[arg(long)]
        name: Option<String>,
    },
    /// Reserve a set's parts as a completed build
    RecordBuild { set_id: String },
    /// Release a completed build
    ReleaseBuild { build_id: String },
    /// Show or change settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    Show,
    Set { key: String, value: String },
    Unset { key: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    brick_buildability::logging::init();

    let cli = Cli::parse();
    let db_path = cli
        .db
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(get_default_db_path);
    tracing::debug!(db_path = %db_path, version = brick_buildability::VERSION, "starting");

    let credentials = Arc::new(StaticCredentials::new(
        std::env::var(TOKEN_ENV).unwrap_or_default(),
    ));
    let state = AppState::new(db_path, credentials)
        .await
        .map_err(anyhow::Error::msg)?;

    match cli.command {
        Command::Report {
            set_id,
            sort,
            missing_only,
        } => {
            let report = load(&state, &set_id).await?;
            let sort = sort.unwrap_or(state.engine_config.report_sort);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report, sort, missing_only);
            }
        }

        Command::ImportInventory {
            file,
            skip_spares,
            dry_run,
        } => {
            let importer = InventoryCsvImporter::new().skip_spares(skip_spares);
            if dry_run {
                let parsed = importer
                    .parse(&file)
                    .with_context(|| format!("reading {}", file.display()))?;
                println!(
                    "{} rows read, {} lines, {} rejected, {} spares skipped (dry run)",
                    parsed.rows_read,
                    parsed.lines.len(),
                    parsed.rejected.len(),
                    parsed.spares_skipped
                );
                for err in &parsed.rejected {
                    println!("  {}", err);
                }
            } else {
                let summary = importer
                    .import_into(state.local.inventory_repo(), &file)
                    .with_context(|| format!("importing {}", file.display()))?;
                if cli.json {
                    println!("{}", serde_json::to_string_pretty(&summary)?);
                } else {
                    println!(
                        "{} rows read, {} lines written, {} rejected, {} spares skipped",
                        summary.rows_read,
                        summary.lines_written,
                        summary.rows_rejected,
                        summary.spares_skipped
                    );
                    for msg in &summary.rejected_messages {
                        println!("  {}", msg);
                    }
                }
            }
        }

        Command::Adjust {
            set_id,
            part_num,
            color_id,
            delta,
        } => {
            let report = load(&state, &set_id).await?;
            let api = &state.buildability_api;
            let mut session = api.begin_editing(report).await?;
            let key = PartKey::new(part_num, color_id);
            let staged = session.stage(&key, delta)?;
            tracing::info!(part_key = %key, staged, "staged");

            let applied = api.apply(&mut session).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&applied)?);
            } else {
                print_apply(&applied);
            }
            if !applied.is_complete() {
                bail!("{} of {} changes failed", applied.failed().count(), applied.outcomes.len());
            }
        }

        Command::SeedSet { set_id, file, name } => {
            let parsed = InventoryCsvImporter::new()
                .skip_spares(true)
                .parse(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            if !parsed.rejected.is_empty() {
                for err in &parsed.rejected {
                    eprintln!("  {}", err);
                }
                bail!("{} rows rejected, set not stored", parsed.rejected.len());
            }
            let lines: Vec<RequirementLine> = parsed
                .lines
                .into_iter()
                .map(|l| RequirementLine {
                    part_key: l.part_key,
                    needed: l.have,
                })
                .collect();
            let count = state
                .local
                .bom_repo()
                .replace_set(&set_id, name.as_deref(), &lines)?;
            println!("{}: {} lines stored", set_id, count);
        }

        Command::RecordBuild { set_id } => {
            let lines = state.local.bom_repo().find_requirements(&set_id)?;
            let build_id = state.local.build_repo().record_completed_build(&set_id, &lines)?;
            println!("{}", build_id);
        }

        Command::ReleaseBuild { build_id } => {
            state.local.build_repo().release_build(&build_id)?;
            println!("released {}", build_id);
        }

        Command::Config { action } => {
            run_config(&state.config_manager, &state.engine_config, action, cli.json)?;
        }
    }

    Ok(())
}

/// `config show|set|unset`. Config errors are boxed, so they are wrapped
/// as messages for anyhow.
fn run_config(
    cfg: &ConfigManager,
    engine_config: &EngineConfig,
    action: ConfigAction,
    json: bool,
) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            println!("{}", serde_json::to_string_pretty(engine_config)?);
            if !json {
                let stored = cfg.get_config_snapshot().map_err(anyhow::Error::msg)?;
                println!("stored: {}", stored);
            }
        }
        ConfigAction::Set { key, value } => {
            cfg.set_global_config_value(&key, &value)
                .map_err(anyhow::Error::msg)?;
            println!("{} = {}", key, value);
        }
        ConfigAction::Unset { key } => {
            if !config_keys::ALL.contains(&key.as_str()) {
                bail!("unknown config key: {}", key);
            }
            cfg.clear_global_config_value(&key)
                .map_err(anyhow::Error::msg)?;
            println!("{} reset to default", key);
        }
    }
    Ok(())
}

async fn load(state: &AppState, set_id: &str) -> anyhow::Result<CoverageReport> {
    match state.buildability_api.load_report(set_id).await? {
        LoadOutcome::Fresh(report) => Ok(report),
        LoadOutcome::Superseded { set_id } => bail!("load of {} was superseded", set_id),
    }
}

fn print_report(report: &CoverageReport, sort: ReportSort, missing_only: bool) {
    println!(
        "{}  {:.1}% ({} of {} parts){}",
        report.set_id,
        report.coverage_percent(),
        report.total_have,
        report.total_needed,
        if report.is_buildable() { "  buildable" } else { "" }
    );
    for line in sort.order(report) {
        if missing_only && line.short == 0 {
            continue;
        }
        println!(
            "  {:<16} need {:>4}  have {:>4}  short {:>4}",
            line.part_key.to_string(),
            line.needed,
            line.have,
            line.short
        );
    }
}

fn print_apply(applied: &ApplyReport) {
    for outcome in &applied.outcomes {
        match &outcome.result {
            Ok(line) => println!("  ok      {} -> {}", outcome.op, line.have),
            Err(e) => println!("  failed  {}: {}", outcome.op, e),
        }
    }
    if applied.outcomes.is_empty() {
        println!("  nothing to apply");
    }
}
