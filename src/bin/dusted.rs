use anyhow::{Context, Result, anyhow};
use chrono::Local;
use clap::{Parser, Subcommand};
use dusted::config::Config;
use dusted::model::{ExportFormat, StatusFilter, ViewFilter};
use dusted::storage::LocalStorage;
use dusted::store::Store;
use dusted::{clipboard, logging};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dusted", version, about = "Done and Dusted: nested task lists in your terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print every list with its progress
    Lists,
    /// Add a task; in advanced mode `!high @tomorrow #tag` tokens are parsed
    Add {
        #[arg(required = true, num_args = 1..)]
        input: Vec<String>,
        #[arg(short, long)]
        list: Option<String>,
    },
    /// Export a list to stdout, a file or the clipboard
    Export {
        #[arg(short, long)]
        format: Option<ExportFormat>,
        #[arg(short, long)]
        list: Option<String>,
        #[arg(short, long, default_value = "all")]
        status: StatusFilter,
        #[arg(short, long)]
        tag: Option<String>,
        #[arg(short, long, conflicts_with = "clipboard")]
        output: Option<PathBuf>,
        #[arg(long)]
        clipboard: bool,
    },
}

fn resolve_list(store: &Store, name: Option<&str>) -> Result<uuid::Uuid> {
    match name {
        Some(name) => store
            .list_by_name(name)
            .map(|l| l.id)
            .ok_or_else(|| anyhow!("no list named {:?}", name)),
        None => store
            .active_list_id()
            .ok_or_else(|| anyhow!("no active list")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, config_error) = match Config::load() {
        Ok(cfg) => (cfg, None),
        Err(e) => (Config::default(), Some(e)),
    };

    let data_dir = LocalStorage::resolve_dir(config.data_dir.as_deref())
        .context("could not determine a data directory")?;
    let storage = LocalStorage::new(&data_dir)?;

    if let Err(e) = logging::init_logging(&config.log_level, &data_dir.join("logs")) {
        eprintln!("warning: logging disabled: {:#}", e);
    }
    logging::install_panic_hook(&data_dir);
    if let Some(e) = config_error {
        log::warn!("event=config_invalid error={:#}", e);
        eprintln!("warning: using default config: {:#}", e);
    }

    let mut store = Store::open(storage, &config.default_list);
    let today = Local::now().date_naive();

    match cli.command {
        None => dusted::tui::run(store).await,
        Some(Command::Lists) => {
            for list in store.lists() {
                let marker = if Some(list.id) == store.active_list_id() { "*" } else { " " };
                if let Some(stats) = store.stats(list.id, today) {
                    println!(
                        "{} {} ({}/{} done, {}%{})",
                        marker,
                        list.name,
                        stats.completed,
                        stats.total,
                        stats.completion,
                        if stats.overdue > 0 {
                            format!(", {} overdue", stats.overdue)
                        } else {
                            String::new()
                        }
                    );
                }
            }
            Ok(())
        }
        Some(Command::Add { input, list }) => {
            let list_id = resolve_list(&store, list.as_deref())?;
            let input = input.join(" ");
            match store.add_task_smart(list_id, &input, today) {
                Some(id) => {
                    println!("Added {}", id);
                    Ok(())
                }
                None => Err(anyhow!("task text is empty")),
            }
        }
        Some(Command::Export {
            format,
            list,
            status,
            tag,
            output,
            clipboard: to_clipboard,
        }) => {
            let list_id = resolve_list(&store, list.as_deref())?;
            let format = match (format, to_clipboard) {
                (Some(f), _) => f,
                (None, true) => ExportFormat::Clipboard,
                (None, false) => config.export_format,
            };
            let filter = ViewFilter {
                status,
                tag,
                ..Default::default()
            };
            let text = store.export(list_id, &filter, format)?;
            if to_clipboard {
                clipboard::copy(&text)?;
                eprintln!("Copied to clipboard.");
            } else if let Some(path) = output {
                std::fs::write(&path, text)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                eprintln!("Exported to {}", path.display());
            } else {
                print!("{}", text);
            }
            Ok(())
        }
    }
}
