use clap::{Parser, Subcommand};
use dw_core::ensure_finite;
use dw_engine::{
    DesignEngine, DimensionChange, DimensionProperty, EngineConfig, EngineResult,
    require_entity, snapshot_service,
};
use dw_model::EntitySnapshot;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "dw-cli")]
#[command(about = "Ductwork CLI - connection detection and airflow analysis", long_about = None)]
struct Cli {
    /// Engine config YAML (defaults are used when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate snapshot file syntax and references
    Validate {
        /// Path to the snapshot file (.yaml, .yml or .json)
        snapshot_path: PathBuf,
    },
    /// Detect connections for one duct
    Detect {
        /// Path to the snapshot file
        snapshot_path: PathBuf,
        /// Duct to detect connections for
        duct_id: String,
    },
    /// Calculate duct airflows and check source capacity
    Flows {
        /// Path to the snapshot file
        snapshot_path: PathBuf,
    },
    /// List entities affected by a change to one entity
    Affected {
        /// Path to the snapshot file
        snapshot_path: PathBuf,
        /// Changed entity ID
        entity_id: String,
    },
    /// Apply a dimension change and report cascading updates
    Cascade {
        /// Path to the snapshot file
        snapshot_path: PathBuf,
        /// Changed entity ID
        entity_id: String,
        /// Property (diameter, width, height, length, airflow)
        property: DimensionProperty,
        /// Previous value
        #[arg(long, default_value_t = 0.0)]
        old: f64,
        /// New value
        #[arg(long)]
        new: f64,
    },
}

fn main() -> EngineResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let mut engine = DesignEngine::new(config);

    match cli.command {
        Commands::Validate { snapshot_path } => cmd_validate(&mut engine, &snapshot_path),
        Commands::Detect {
            snapshot_path,
            duct_id,
        } => cmd_detect(&engine, &snapshot_path, &duct_id, cli.json),
        Commands::Flows { snapshot_path } => cmd_flows(&mut engine, &snapshot_path, cli.json),
        Commands::Affected {
            snapshot_path,
            entity_id,
        } => cmd_affected(&mut engine, &snapshot_path, &entity_id, cli.json),
        Commands::Cascade {
            snapshot_path,
            entity_id,
            property,
            old,
            new,
        } => {
            let change = DimensionChange::new(
                entity_id,
                property,
                ensure_finite(old, "old value")?,
                ensure_finite(new, "new value")?,
            );
            cmd_cascade(&mut engine, &snapshot_path, &change, cli.json)
        }
    }
}

fn load_config(path: Option<&Path>) -> EngineResult<EngineConfig> {
    match path {
        Some(path) => {
            let config = EngineConfig::load(path)?;
            info!(path = %path.display(), "loaded engine config");
            Ok(config)
        }
        None => Ok(EngineConfig::default()),
    }
}

fn load(snapshot_path: &Path) -> EngineResult<EntitySnapshot> {
    snapshot_service::load_snapshot(snapshot_path)
}

fn print_json<T: Serialize>(value: &T) -> EngineResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_validate(engine: &mut DesignEngine, snapshot_path: &Path) -> EngineResult<()> {
    println!("Validating snapshot: {}", snapshot_path.display());
    let snapshot = load(snapshot_path)?;
    let graph = engine.check_graph(&snapshot)?;
    let summary = snapshot_service::summarize(&snapshot);
    println!("✓ Snapshot is valid");
    println!(
        "  {} entities ({} ducts, {} fittings, {} equipment, {} other)",
        summary.entity_count, summary.ducts, summary.fittings, summary.equipment, summary.other
    );
    println!(
        "  {} connections across {} nodes",
        graph.edge_count(),
        graph.node_count()
    );
    Ok(())
}

fn cmd_detect(
    engine: &DesignEngine,
    snapshot_path: &Path,
    duct_id: &str,
    json: bool,
) -> EngineResult<()> {
    let snapshot = load(snapshot_path)?;
    require_entity(&snapshot, duct_id)?;
    let connections = engine.detect_connections(&snapshot, duct_id);
    if json {
        return print_json(&connections);
    }

    if connections.is_empty() {
        println!("No connections detected for {duct_id}");
        return Ok(());
    }
    println!("Connections for {duct_id}:");
    for c in &connections {
        println!(
            "  {:?} ({:.1}, {:.1}) -> {} {:?}: {} at {:.1}°",
            c.new_duct.end_point,
            c.new_duct.position.0,
            c.new_duct.position.1,
            c.existing_duct.entity_id,
            c.existing_duct.end_point,
            c.fitting_type,
            c.angle
        );
    }
    Ok(())
}

fn cmd_flows(engine: &mut DesignEngine, snapshot_path: &Path, json: bool) -> EngineResult<()> {
    let snapshot = load(snapshot_path)?;
    let flows = engine.calculate_flows(&snapshot);
    let issues = engine.system_capacity_report(&snapshot);

    if json {
        #[derive(Serialize)]
        struct FlowReport<'a> {
            flows: &'a dw_engine::FlowMap,
            issues: &'a [dw_engine::ValidationIssue],
        }
        return print_json(&FlowReport {
            flows: &flows,
            issues: &issues,
        });
    }

    println!("Duct airflow:");
    for (id, cfm) in &flows {
        println!("  {id}: {cfm:.0} CFM");
    }
    if issues.is_empty() {
        println!("✓ Source equipment capacity is sufficient");
    } else {
        for issue in &issues {
            println!("  {issue}");
        }
    }
    Ok(())
}

fn cmd_affected(
    engine: &mut DesignEngine,
    snapshot_path: &Path,
    entity_id: &str,
    json: bool,
) -> EngineResult<()> {
    let snapshot = load(snapshot_path)?;
    require_entity(&snapshot, entity_id)?;
    let affected = engine.affected_entities(&snapshot, entity_id);
    if json {
        return print_json(&affected);
    }

    println!("Directly affected ({}):", affected.directly_affected.len());
    for id in &affected.directly_affected {
        println!("  {id}");
    }
    println!("Indirectly affected ({}):", affected.indirectly_affected.len());
    for id in &affected.indirectly_affected {
        let path = affected
            .paths
            .get(id)
            .map(|p| {
                p.iter()
                    .map(|step| step.as_str())
                    .collect::<Vec<_>>()
                    .join(" -> ")
            })
            .unwrap_or_default();
        println!("  {id}  [{path}]");
    }
    Ok(())
}

fn cmd_cascade(
    engine: &mut DesignEngine,
    snapshot_path: &Path,
    change: &DimensionChange,
    json: bool,
) -> EngineResult<()> {
    let snapshot = load(snapshot_path)?;
    require_entity(&snapshot, change.entity_id.as_str())?;
    let result = engine.apply_dimension_change(&snapshot, change);
    if json {
        return print_json(&result);
    }

    println!(
        "{} {}: {} -> {} (undo group {})",
        change.entity_id, change.property, change.old_value, change.new_value, result.undo_group_id
    );
    println!("Updated entities ({}):", result.updated_entity_ids.len());
    for id in &result.updated_entity_ids {
        println!("  {id}");
    }
    if result.validation_issues.is_empty() {
        println!("✓ No validation issues");
    } else {
        println!("Validation issues:");
        for issue in &result.validation_issues {
            println!("  {issue}");
        }
    }
    Ok(())
}
