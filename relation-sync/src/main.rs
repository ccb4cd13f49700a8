use clap::{Parser, Subcommand};
use dotenv::dotenv;
use relation_sync::config::Config;
use relation_sync::relations::{columns, view_config, wikilink};
use relation_sync::{FrontmatterMutator, NoteHandle, NoteStore, RelationEditService, SyncError};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "relation-sync")]
#[command(about = "Relation columns and bidirectional back-links for a markdown vault")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Vault directory (overrides RELATION_SYNC_VAULT_DIR)
    #[arg(long, global = true)]
    vault: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the columns of the notes in a folder and which are relations
    Columns {
        /// Folder relative to the vault root
        folder: String,
    },

    /// Set a relation cell and sync back-links per the view config
    SetRelation {
        /// Note path relative to the vault root
        note: String,

        /// Column id (`note.project`) or property name (`project`)
        column: String,

        /// New links; plain names are written as `[[name]]`
        links: Vec<String>,
    },
}

fn main() -> ExitCode {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(vault) = cli.vault {
        config = config.with_vault_dir(vault);
    }

    let result = match cli.command {
        Commands::Columns { folder } => show_columns(&config, &folder),
        Commands::SetRelation {
            note,
            column,
            links,
        } => set_relation(&config, &note, &column, &links),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn open_store(config: &Config) -> Result<Arc<NoteStore>, String> {
    NoteStore::open(config.vault_dir.clone())
        .map(Arc::new)
        .map_err(|e| format!("Failed to open vault {}: {}", config.vault_dir.display(), e))
}

fn show_columns(config: &Config, folder: &str) -> Result<(), String> {
    let store = open_store(config)?;
    let view = view_config::load_view_config(&config.view_config_path).map_err(|e| e.to_string())?;

    let mut rows = Vec::new();
    for note in store.notes_in_folder(folder) {
        match store.read_frontmatter(&note) {
            Ok(fm) => rows.push(columns::TableRow::from_frontmatter(note, &fm)),
            Err(e) => log::warn!("[RELATIONS] Skipping {}: {}", note, e),
        }
    }
    if rows.is_empty() {
        println!("No notes in {} under {}", folder, store.vault_dir().display());
        return Ok(());
    }

    let property_ids: Vec<String> = rows
        .iter()
        .flat_map(|row| row.values.keys().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let base = columns::base_folder(rows.iter().map(|row| row.note.path()));
    let mut metas = columns::describe_columns(
        &property_ids,
        &BTreeMap::new(),
        &rows,
        base.as_deref(),
        store.as_ref(),
    );
    metas.extend(columns::rollup_columns(&view.rollups));

    println!("{} note(s), base folder: {}", rows.len(), base.as_deref().unwrap_or("(none)"));
    for meta in metas {
        if meta.is_rollup {
            let aggregation = meta
                .rollup
                .as_ref()
                .map(|r| r.aggregation.label())
                .unwrap_or_default();
            println!("  {:<28} rollup ({})", meta.display_name, aggregation);
        } else if meta.is_relation {
            let bidi = view_config::find_bidi_rule(&view.bidi, &meta.property_id)
                .map(|rule| format!(" <-> {}", rule.reverse_property))
                .unwrap_or_default();
            println!(
                "  {:<28} relation -> {}{}",
                meta.property_id,
                meta.relation_folder_filter.as_deref().unwrap_or("(any)"),
                bidi
            );
        } else {
            println!("  {}", meta.property_id);
        }
    }
    Ok(())
}

fn set_relation(config: &Config, note: &str, column: &str, links: &[String]) -> Result<(), String> {
    let store = open_store(config)?;
    let view = view_config::load_view_config(&config.view_config_path).map_err(|e| e.to_string())?;
    let service = RelationEditService::new(store.clone(), store.clone(), view.bidi);

    let property_id = columns::note_property_id(column);
    let links: Vec<String> = links
        .iter()
        .map(|link| {
            if wikilink::is_link(link) {
                link.clone()
            } else {
                wikilink::format(link, None)
            }
        })
        .collect();

    let handle = NoteHandle::new(note);
    match service.update_relation(&handle, &property_id, &links) {
        Ok(None) => println!("Updated {} on {} (no bidi rule)", property_id, handle),
        Ok(Some(report)) => println!(
            "Updated {} on {}: {} linked, {} unlinked, {} skipped",
            property_id,
            handle,
            report.linked.len(),
            report.unlinked.len(),
            report.skipped.len()
        ),
        Err(SyncError::TargetsFailed { report }) => {
            for failure in &report.failed {
                eprintln!("  {}: {}", failure.target, failure.error);
            }
            return Err(format!(
                "Updated {} on {}, but {} back-link write(s) failed",
                property_id,
                handle,
                report.failed.len()
            ));
        }
        Err(e) => return Err(e.to_string()),
    }
    Ok(())
}
