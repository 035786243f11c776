//! CLI subcommand handlers.

use crate::Commands;
use crate::ConfigAction;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};

use arbore_core::ArboreConfig;
use arbore_core::config::{load_config, workspace_config_path};
use arbore_gen::pipeline::{generate_catalog, generate_dataset, write_catalog, write_dataset};
use arbore_ingest::rows::{CLAIMS_TABLE, ORDERS_TABLE};
use arbore_ingest::status::RECENT_HISTORY;
use arbore_ingest::{
    InsertLoader, JsonLinesWriter, LocalPipe, LocalStage, Session, SqliteWarehouse, StagedLoader,
    Warehouse, drain_pipes, pipe_status, validate_input_path,
};

/// Handle a CLI subcommand.
pub fn handle_command(
    command: Commands,
    workspace: &Path,
    config_file: Option<&Path>,
) -> anyhow::Result<()> {
    match command {
        Commands::Generate {
            orders,
            claims,
            suppliers,
            seed,
            out,
            format,
        } => {
            let config = load(workspace, config_file, |config| {
                let generator = &mut config.generator;
                generator.orders = orders.unwrap_or(generator.orders);
                generator.claims = claims.unwrap_or(generator.claims);
                generator.suppliers = suppliers.unwrap_or(generator.suppliers);
                generator.seed = seed.or(generator.seed);
                if let Some(out) = out {
                    generator.output_dir = out;
                }
                if let Some(format) = format {
                    generator.format = format.into();
                }
            })?;
            handle_generate(&config)
        }
        Commands::Catalog { seed, out } => {
            let config = load(workspace, config_file, |config| {
                config.generator.seed = seed.or(config.generator.seed);
                if let Some(out) = out {
                    config.generator.output_dir = out;
                }
            })?;
            handle_catalog(&config)
        }
        Commands::Insert { file, stdin } => {
            let config = load(workspace, config_file, |_| {})?;
            handle_insert(&config, file.as_deref(), stdin)
        }
        Commands::Stage { file, batch_size } => {
            let config = load(workspace, config_file, |config| {
                config.staging.batch_size = batch_size.unwrap_or(config.staging.batch_size);
            })?;
            handle_stage(&config, &file)
        }
        Commands::Drain => handle_drain(&load(workspace, config_file, |_| {})?),
        Commands::Status => handle_status(&load(workspace, config_file, |_| {})?),
        Commands::Config { action } => handle_config(action, workspace, config_file),
    }
}

/// Load layered configuration, apply CLI overrides, anchor relative paths in
/// the workspace and validate.
fn load(
    workspace: &Path,
    config_file: Option<&Path>,
    apply: impl FnOnce(&mut ArboreConfig),
) -> anyhow::Result<ArboreConfig> {
    let mut config = load_config(Some(workspace), config_file)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    apply(&mut config);
    config.resolve_paths(workspace);
    config.validate()?;
    Ok(config)
}

fn seed_or_random(seed: Option<u64>) -> u64 {
    match seed {
        Some(seed) => seed,
        None => {
            let seed = rand::random::<u64>();
            tracing::info!(seed, "no seed configured; pass --seed {seed} to replay this run");
            seed
        }
    }
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

fn warehouse(config: &ArboreConfig) -> SqliteWarehouse {
    SqliteWarehouse::new(&config.warehouse.database, &config.warehouse.query_tag)
}

fn handle_generate(config: &ArboreConfig) -> anyhow::Result<()> {
    let generator = &config.generator;
    let seed = seed_or_random(generator.seed);
    let mut rng = StdRng::seed_from_u64(seed);

    println!("Generating dirty data for Arboré ETL project...");
    let dataset = generate_dataset(&mut rng, generator, today())?;
    if !dataset.claims.date_fallbacks.is_empty() {
        println!(
            "Note: {} claim(s) used today's date because the order date was unreadable",
            dataset.claims.date_fallbacks.len()
        );
    }
    let manifest = write_dataset(&dataset, &generator.output_dir, generator.format, seed)?;

    println!("Data generation complete! (seed {seed})");
    for entry in &manifest.files {
        println!("- {}: {} records", entry.path, entry.records);
    }
    println!("Files written to {}", generator.output_dir.display());
    Ok(())
}

fn handle_catalog(config: &ArboreConfig) -> anyhow::Result<()> {
    let seed = seed_or_random(config.generator.seed);
    let mut rng = StdRng::seed_from_u64(seed);
    let catalog = generate_catalog(&mut rng, config.generator.product_count, today())?;
    for entry in write_catalog(&catalog, &config.generator.output_dir)? {
        println!("Wrote {} records to {}", entry.records, entry.path);
    }
    Ok(())
}

fn handle_insert(config: &ArboreConfig, file: Option<&Path>, stdin: bool) -> anyhow::Result<()> {
    if let Some(file) = file {
        validate_input_path(file)?;
    }

    let mut loader = InsertLoader::new(warehouse(config).connect()?);
    let outcome = match file {
        Some(file) if !stdin => {
            println!("Loading data from {}...", file.display());
            loader.load_json_file(file)
        }
        _ => {
            println!("Reading from stdin...");
            loader.load_lines(std::io::stdin().lock())
        }
    };
    let closed = loader.finish();

    let stats = outcome.inspect_err(|e| tracing::error!(error = %e, "error during insertion"))?;
    closed?;
    println!(
        "Inserted {} orders and {} claims ({} unknown records skipped)",
        stats.orders, stats.claims, stats.skipped
    );
    Ok(())
}

fn handle_stage(config: &ArboreConfig, file: &Path) -> anyhow::Result<()> {
    validate_input_path(file)?;
    let staging = &config.staging;
    let wh = warehouse(config);

    println!(
        "Loading {} via staged pipes with batch size {}...",
        file.display(),
        staging.batch_size
    );
    let loader = StagedLoader::new(
        Box::new(JsonLinesWriter),
        Box::new(LocalStage::new(&staging.stage_root)),
        Box::new(LocalPipe::new(&staging.orders_pipe, ORDERS_TABLE, wh.connect()?)),
        Box::new(LocalPipe::new(&staging.claims_pipe, CLAIMS_TABLE, wh.connect()?)),
        staging.batch_size,
    )?;
    let report = loader
        .stage_json_file(file)
        .inspect_err(|e| tracing::error!(error = %e, "error during staged processing"))?;

    println!("Staging complete!");
    println!("  Orders staged: {}", report.orders);
    println!("  Claims staged: {}", report.claims);
    if report.unknown > 0 {
        println!("  Unknown records skipped: {}", report.unknown);
    }
    println!("  Files queued: {}", report.files.len());
    println!("Rows appear in the tables after `arbore drain` runs.");
    Ok(())
}

fn handle_drain(config: &ArboreConfig) -> anyhow::Result<()> {
    let mut session = warehouse(config).connect()?;
    let report = drain_pipes(&mut session, &LocalStage::new(&config.staging.stage_root))?;
    session.close()?;

    if report.files.is_empty() {
        println!("No queued files.");
        return Ok(());
    }
    for file in &report.files {
        match &file.error {
            None => println!(
                "{} {}: {} ({} rows loaded)",
                file.pipe_name, file.file_name, file.status, file.rows_loaded
            ),
            Some(err) => println!("{} {}: {} ({})", file.pipe_name, file.file_name, file.status, err),
        }
    }
    println!(
        "Loaded {} file(s), {} row(s); {} failed",
        report.loaded(),
        report.rows_loaded(),
        report.failed()
    );
    Ok(())
}

fn handle_status(config: &ArboreConfig) -> anyhow::Result<()> {
    let mut session = warehouse(config).connect()?;
    let status = pipe_status(&mut session, RECENT_HISTORY)?;
    session.close()?;

    println!("Current Data Counts:");
    println!("  {ORDERS_TABLE}: {} records", status.orders);
    println!("  {CLAIMS_TABLE}: {} records", status.claims);
    println!();

    if status.history.is_empty() {
        println!("No pipe history yet.");
        return Ok(());
    }
    println!("Recent Pipe Processing:");
    println!("{}", "=".repeat(80));
    let show = |v: Option<i64>| v.map_or_else(|| "-".to_string(), |v| v.to_string());
    for row in &status.history {
        println!("Pipe: {}", row.pipe_name);
        println!("  File: {}", row.file_name);
        println!("  Status: {}", row.status);
        println!("  File Size: {} bytes", show(row.file_size));
        println!("  Rows Loaded: {}", show(row.rows_loaded));
        println!("  Load Time: {}", row.load_time.as_deref().unwrap_or("-"));
        println!();
    }
    Ok(())
}

fn handle_config(
    action: ConfigAction,
    workspace: &Path,
    config_file: Option<&Path>,
) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            let config_path: PathBuf = config_file
                .map(Path::to_path_buf)
                .unwrap_or_else(|| workspace_config_path(workspace));
            if config_path.exists() {
                println!(
                    "Configuration file already exists at: {}",
                    config_path.display()
                );
                return Ok(());
            }
            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let toml_str = toml::to_string_pretty(&ArboreConfig::default())?;
            std::fs::write(&config_path, &toml_str)?;
            println!(
                "Created default configuration at: {}",
                config_path.display()
            );
            Ok(())
        }
        ConfigAction::Show => {
            let config = load_config(Some(workspace), config_file)
                .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
            let toml_str = toml::to_string_pretty(&config)?;
            println!("{}", toml_str);
            Ok(())
        }
    }
}
