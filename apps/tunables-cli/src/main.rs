use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tunables_persist::{BackupConfig, BackupError, ChangeStatus, RestorePlan, Snapshot};
use tunables_table::{robot_address, wait_for_connection, JsonTable};

#[derive(Parser)]
#[command(
    name = "tunables",
    about = "Backup or restore tuning variables published on the robot's dashboard table"
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Table file standing in for the robot's published table
    #[arg(long, env = "TUNABLES_TABLE", default_value = "table.json")]
    table: PathBuf,

    /// Directory holding backup files [default: <install dir>/backups]
    #[arg(long)]
    backup_dir: Option<PathBuf>,

    /// FRC team number of the robot
    #[arg(long)]
    team: Option<u16>,

    /// Extra key suffix to treat as telemetry (repeatable)
    #[arg(long = "ignore-suffix", value_name = "SUFFIX")]
    ignore_suffixes: Vec<String>,

    /// Wait after a restore before reporting success, in milliseconds
    #[arg(long)]
    settle_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Save current tuning variables to a new backup file
    Backup,
    /// Push a backup file back to the robot
    Restore {
        /// The config_backup_YYYYMMDD_HHMMSS.json file to restore
        file: String,
        /// Do not ask for confirmation before overwriting live values
        #[arg(short, long)]
        yes: bool,
    },
    /// List available backups, newest first
    List,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let cfg = resolve_config(&cli);
    tracing::debug!(?cfg, "resolved configuration");

    match &cli.command {
        Commands::Backup => {
            let table = connect(&cli.table, &cfg)?;
            backup(&table, &cfg)?;
        }
        Commands::Restore { file, yes } => {
            let mut table = connect(&cli.table, &cfg)?;
            restore(&mut table, &cfg, file, *yes)?;
        }
        Commands::List => list(&cfg)?,
    }

    Ok(())
}

/// Defaults, then environment, then command-line flags.
fn resolve_config(cli: &Cli) -> BackupConfig {
    let mut cfg = BackupConfig::from_env().with_extra_suffixes(cli.ignore_suffixes.iter().cloned());
    if let Some(dir) = &cli.backup_dir {
        cfg = cfg.with_backup_dir(dir);
    }
    if let Some(team) = cli.team {
        cfg = cfg.with_team_number(team);
    }
    if let Some(ms) = cli.settle_ms {
        cfg = cfg.with_settle_delay(Duration::from_millis(ms));
    }
    cfg
}

fn connect(path: &Path, cfg: &BackupConfig) -> anyhow::Result<JsonTable> {
    println!(
        "Connecting to Robot {} at {}...",
        cfg.team_number,
        robot_address(cfg.team_number)
    );
    let table =
        JsonTable::open(path).with_context(|| format!("open table {}", path.display()))?;
    wait_for_connection(&table, cfg.connect_timeout, cfg.poll_interval)
        .context("could not connect to the robot, is it turned on?")?;
    println!("[OK] Connected to table {}\n", path.display());
    Ok(table)
}

fn backup(table: &JsonTable, cfg: &BackupConfig) -> anyhow::Result<()> {
    println!("Extracting configuration values...");
    let snap = match Snapshot::capture(table, &cfg.classifier()) {
        Ok(snap) => snap,
        Err(e @ (BackupError::EmptySource | BackupError::NoConfigurationFound)) => {
            eprintln!("[WARNING] {e}");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    for (key, value) in &snap {
        println!("  Found: {key} = {value}");
    }

    let dir = cfg.open_backup_dir();
    let name = dir.write(&snap)?;
    println!(
        "\n[SUCCESS] Backed up {} variables to {}",
        snap.len(),
        dir.path_of(&name).display()
    );
    Ok(())
}

fn restore(table: &mut JsonTable, cfg: &BackupConfig, file: &str, yes: bool) -> anyhow::Result<()> {
    println!("Reading configuration from {file}...");
    let snap = cfg.open_backup_dir().load(file)?;

    let plan = RestorePlan::compute(&*table, &snap)?;
    print_plan(&plan);
    if !yes && !plan.is_noop() && !confirm("Overwrite the live values above?")? {
        println!("Restore cancelled, nothing was written.");
        return Ok(());
    }

    println!(
        "Pushing {} variables back to Robot {}...",
        snap.len(),
        cfg.team_number
    );
    let result = cfg.restorer().restore(table, &snap)?;
    for (key, value) in &snap {
        if !result.failed_key(key.as_str()) {
            println!("  Restored: {key} -> {value}");
        }
    }
    for failure in &result.failures {
        eprintln!(
            "  [WARNING] Failed to restore: {} ({})",
            failure.key, failure.reason
        );
    }

    println!("\n[SUCCESS] Restore complete, {result}");
    Ok(())
}

fn print_plan(plan: &RestorePlan) {
    for change in plan.changes() {
        match &change.status {
            ChangeStatus::Unchanged => {}
            ChangeStatus::Added => println!("  + {} = {}", change.key, change.restored),
            ChangeStatus::Changed { current } => {
                println!("  ~ {}: {} -> {}", change.key, current, change.restored)
            }
            ChangeStatus::Conflict { current } => println!(
                "  ! {}: live {} is a {}, backup holds a {} (will be refused)",
                change.key,
                current,
                current.kind(),
                change.restored.kind()
            ),
        }
    }
    println!(
        "{} changed, {} added, {} conflicting, {} unchanged",
        plan.changed_count(),
        plan.added_count(),
        plan.conflict_count(),
        plan.unchanged_count()
    );
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(matches!(
        line.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

fn list(cfg: &BackupConfig) -> anyhow::Result<()> {
    let dir = cfg.open_backup_dir();
    let entries = dir.list()?;
    if entries.is_empty() {
        println!("No backups available in {}", dir.root().display());
        return Ok(());
    }
    for entry in entries {
        println!("{}  {}", entry.created.format("%Y-%m-%d %H:%M:%S"), entry.name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_restore_with_flags() {
        let cli = Cli::try_parse_from([
            "tunables",
            "--team",
            "254",
            "--ignore-suffix",
            "_Amps",
            "--ignore-suffix",
            "_RPM",
            "restore",
            "config_backup_20240101_100000.json",
            "--yes",
        ])
        .unwrap();
        assert_eq!(cli.team, Some(254));
        assert_eq!(cli.ignore_suffixes, vec!["_Amps", "_RPM"]);
        match cli.command {
            Commands::Restore { file, yes } => {
                assert_eq!(file, "config_backup_20240101_100000.json");
                assert!(yes);
            }
            _ => panic!("expected restore"),
        }
    }

    #[test]
    fn restore_requires_a_file() {
        assert!(Cli::try_parse_from(["tunables", "restore"]).is_err());
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::try_parse_from([
            "tunables",
            "--backup-dir",
            "/tmp/bk",
            "--settle-ms",
            "0",
            "--ignore-suffix",
            "_Amps",
            "backup",
        ])
        .unwrap();
        let cfg = resolve_config(&cli);
        assert_eq!(cfg.backup_dir, PathBuf::from("/tmp/bk"));
        assert_eq!(cfg.settle_delay, Duration::ZERO);
        assert!(cfg.classifier().is_telemetry("Intake_Amps"));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
