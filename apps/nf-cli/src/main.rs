use clap::{Parser, Subcommand, ValueEnum};
use nf_app::{AppError, AppResult, InventoryService, load_scenario, load_tables};
use nf_factors::{FactorEntry, FactorKey, MethodEntry};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nf-cli")]
#[command(about = "NitroFlow CLI - Livestock manure nitrogen emissions inventory", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and validate every herd of a scenario
    Validate {
        /// Path to the scenario YAML file
        scenario_path: PathBuf,
        /// Directory holding the reference tables
        #[arg(long, default_value = "data/tables")]
        tables: PathBuf,
    },
    /// Resolve an animal type to its reference category
    Resolve {
        animal_type: String,
        /// Directory holding the reference tables
        #[arg(long, default_value = "data/tables")]
        tables: PathBuf,
        /// Fail instead of warning when the type is unknown
        #[arg(long)]
        strict: bool,
    },
    /// List the emission factors compiled for an animal type
    Factors {
        animal_type: String,
        /// Directory holding the reference tables
        #[arg(long, default_value = "data/tables")]
        tables: PathBuf,
        /// Slurry stored with a natural surface crust
        #[arg(long)]
        crust: bool,
        #[arg(long, value_enum, default_value_t = Format::Yaml)]
        format: Format,
    },
    /// Run the inventory for every herd of a scenario
    Run {
        /// Path to the scenario YAML file
        scenario_path: PathBuf,
        /// Directory holding the reference tables
        #[arg(long, default_value = "data/tables")]
        tables: PathBuf,
        /// Verify mass balance after each run
        #[arg(long)]
        check: bool,
        #[arg(long, value_enum, default_value_t = Format::Yaml)]
        format: Format,
        /// Output file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Yaml,
    Json,
}

#[derive(Serialize)]
struct FactorListing {
    animal_type: String,
    category: String,
    slurry_crust: bool,
    factors: Vec<FactorEntry>,
    application_methods: Vec<MethodEntry>,
    missing: Vec<FactorKey>,
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate {
            scenario_path,
            tables,
        } => cmd_validate(&scenario_path, &tables),
        Commands::Resolve {
            animal_type,
            tables,
            strict,
        } => cmd_resolve(&animal_type, &tables, strict),
        Commands::Factors {
            animal_type,
            tables,
            crust,
            format,
        } => cmd_factors(&animal_type, &tables, crust, format),
        Commands::Run {
            scenario_path,
            tables,
            check,
            format,
            output,
        } => cmd_run(&scenario_path, &tables, check, format, output.as_deref()),
    }
}

fn cmd_validate(scenario_path: &Path, tables: &Path) -> AppResult<()> {
    println!("Validating scenario: {}", scenario_path.display());
    let scenario = load_scenario(scenario_path)?;
    let service = InventoryService::for_scenario(load_tables(tables)?, &scenario)?;

    let mut invalid = 0;
    for herd in &scenario.herds {
        let outcome = service.validate(herd)?;
        if outcome.is_valid() {
            println!("✓ {} ({})", outcome.record.animal_type, outcome.record.category);
        } else {
            invalid += 1;
            println!("✗ {}", outcome.record.animal_type);
            println!("{}", outcome.report());
        }
    }

    if invalid > 0 {
        return Err(AppError::Input(format!(
            "{invalid} of {} herds failed validation",
            scenario.herds.len()
        )));
    }
    println!("✓ Scenario is valid");
    Ok(())
}

fn cmd_resolve(animal_type: &str, tables: &Path, strict: bool) -> AppResult<()> {
    let service = InventoryService::new(load_tables(tables)?)?;
    let resolution = service.resolve(animal_type, strict)?;
    match resolution.warning {
        Some(warning) => println!("{} (warning: {warning})", resolution.category),
        None => println!("{}", resolution.category),
    }
    Ok(())
}

fn cmd_factors(animal_type: &str, tables: &Path, crust: bool, format: Format) -> AppResult<()> {
    let service = InventoryService::new(load_tables(tables)?)?;
    let factors = service.factors(animal_type, crust)?;
    let listing = FactorListing {
        animal_type: factors.animal_type().to_string(),
        category: factors.category().to_string(),
        slurry_crust: factors.slurry_crust(),
        factors: factors.entries(),
        application_methods: factors.method_entries(),
        missing: factors.missing(),
    };
    print!("{}", render(&listing, format)?);
    Ok(())
}

fn cmd_run(
    scenario_path: &Path,
    tables: &Path,
    check: bool,
    format: Format,
    output: Option<&Path>,
) -> AppResult<()> {
    let scenario = load_scenario(scenario_path)?;
    tracing::debug!(
        scenario = %scenario.name,
        herds = scenario.herds.len(),
        "scenario loaded"
    );
    let service = InventoryService::for_scenario(load_tables(tables)?, &scenario)?;
    let service = if check {
        service.with_consistency_check(true)
    } else {
        service
    };

    let run = service.run_scenario(&scenario)?;
    let rendered = render(&run, format)?;

    match output {
        Some(path) => {
            std::fs::write(path, rendered).map_err(|e| AppError::OutputFileWrite {
                path: path.to_path_buf(),
                source: e,
            })?;
            eprintln!("✓ Results written to {}", path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

fn render<T: Serialize>(value: &T, format: Format) -> AppResult<String> {
    Ok(match format {
        Format::Yaml => serde_yaml::to_string(value)?,
        Format::Json => {
            let mut s = serde_json::to_string_pretty(value)?;
            s.push('\n');
            s
        }
    })
}
