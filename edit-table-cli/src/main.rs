//! edit-table - render, extract and script edits of HTML tables

mod script;

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, Subcommand};
use edit_table::{
    CommitMode, EditConfig, EditableTable, InitOptions, RowData, TableDom, TableError,
    TableOptions, TextChange, array_to_table, fetch_table_data, init_editable_table,
};
use futures::FutureExt;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode, WriteLogger};
use tabledom::{Document, NodeId};
use tokio::sync::mpsc;

use crate::script::Command;

#[derive(Parser)]
#[command(name = "edit-table")]
#[command(author, version, about = "Render, extract and script edits of HTML tables")]
struct Cli {
    /// Write the log to this file instead of stderr
    #[arg(long, global = true)]
    log: Option<PathBuf>,

    /// Log more (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a JSON array of objects as a table
    Render {
        /// JSON file holding an array of row objects
        rows: PathBuf,

        /// Render into an existing page and print the whole page
        #[arg(long)]
        into: Option<PathBuf>,

        /// Table to fill inside the page (default: the first table)
        #[arg(short, long, requires = "into")]
        selector: Option<String>,

        /// Id for a newly created table
        #[arg(long, conflicts_with = "into")]
        id: Option<String>,
    },

    /// Print a table as a JSON array of objects
    Extract {
        /// HTML page
        page: PathBuf,

        /// Selector of the table
        #[arg(short, long)]
        selector: String,
    },

    /// Make a table editable and replay a script against it
    Edit {
        /// HTML page
        page: PathBuf,

        /// Selector of the table
        #[arg(short, long)]
        selector: String,

        /// Script file, one command per line
        #[arg(long)]
        script: PathBuf,

        /// Keep typed text on commit instead of restoring the old text
        #[arg(long)]
        apply: bool,

        /// Class marking cells that cannot be edited
        #[arg(long)]
        readonly_class: Option<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log.as_deref(), cli.verbose)?;

    match cli.command {
        Commands::Render {
            rows,
            into,
            selector,
            id,
        } => render(
            &rows,
            into.as_deref(),
            selector.as_deref().unwrap_or("table"),
            id.as_deref(),
        ),
        Commands::Extract { page, selector } => extract(&page, &selector),
        Commands::Edit {
            page,
            selector,
            script,
            apply,
            readonly_class,
        } => {
            let mut config = EditConfig::new();
            if apply {
                config = config.commit(CommitMode::Apply);
            }
            if let Some(class) = readonly_class {
                config = config.readonly_class(class);
            }
            edit(&page, &selector, &script, config).await
        }
    }
}

fn init_logging(path: Option<&Path>, verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file '{}'", path.display()))?;
            WriteLogger::init(level.max(LevelFilter::Debug), Config::default(), file)
                .context("Failed to initialize logger")?;
        }
        None => {
            TermLogger::init(
                level,
                Config::default(),
                TerminalMode::Stderr,
                ColorChoice::Auto,
            )
            .context("Failed to initialize logger")?;
        }
    }
    Ok(())
}

fn read_rows(path: &Path) -> Result<Vec<RowData>> {
    let src = fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    serde_json::from_str(&src)
        .with_context(|| format!("'{}' is not a JSON array of objects", path.display()))
}

fn load_page(path: &Path) -> Result<Document> {
    let src = fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    Document::parse_html(&src).with_context(|| format!("Failed to parse '{}'", path.display()))
}

fn render(rows: &Path, into: Option<&Path>, selector: &str, id: Option<&str>) -> Result<()> {
    let data = read_rows(rows)?;
    let count = data.len();

    match into {
        Some(page) => {
            let mut doc = load_page(page)?;
            array_to_table(&mut doc, TableOptions::new(data).selector(selector))?;
            println!("{}", doc.inner_html(doc.root()));
        }
        None => {
            let mut doc = Document::new();
            let table = array_to_table(&mut doc, TableOptions::new(data))?;
            if let Some(id) = id {
                if let Some(element) = doc.element_mut(table) {
                    element.set_attribute("id", id);
                }
            }
            println!("{}", doc.outer_html(table));
        }
    }

    log::info!("rendered {count} row(s)");
    Ok(())
}

fn extract(page: &Path, selector: &str) -> Result<()> {
    let doc = load_page(page)?;
    let rows = fetch_table_data(&doc, selector)?;
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

async fn edit(page: &Path, selector: &str, script: &Path, config: EditConfig) -> Result<()> {
    let mut doc = load_page(page)?;
    let src = fs::read_to_string(script)
        .with_context(|| format!("Failed to read '{}'", script.display()))?;
    let commands = script::parse_script(&src)
        .with_context(|| format!("Invalid script '{}'", script.display()))?;

    let (tx, mut changes) = mpsc::unbounded_channel();
    let options = InitOptions::<Document>::new(selector)
        .config(config)
        .on_text_changed(move |change| {
            let tx = tx.clone();
            async move {
                let _ = tx.send(change);
            }
            .boxed()
        });
    let table = init_editable_table(&mut doc, options)?;
    println!("{}: {} data row(s)", table.selector(), table.len());

    for (line, command) in commands {
        if let Err(e) = run_command(&mut doc, &table, command) {
            println!("line {line}: {e}");
        }

        // Let spawned notifications run before reporting them
        tokio::task::yield_now().await;
        while let Ok(change) = changes.try_recv() {
            print_change(&change);
        }
    }

    if let Some(node) = TableDom::query_selector(&doc, selector) {
        println!("{}", doc.outer_html(node));
    }
    Ok(())
}

fn run_command(
    doc: &mut Document,
    table: &EditableTable<Document>,
    command: Command,
) -> Result<()> {
    match command {
        Command::DoubleClick { row, cell } => {
            let node = cell_at(doc, table.selector(), row, cell)?;
            doc.double_click(node);
        }
        Command::Type(text) => {
            if !doc.type_text(&text) {
                bail!("no input has focus");
            }
        }
        Command::Key { key, modifiers } => {
            let result = doc.press_key(key, modifiers);
            log::trace!("{key:?}: {result:?}");
        }
        Command::Blur => doc.blur(),
        Command::Get { row, cell } => {
            println!("{}", table.get_cell_value(doc, row, cell)?);
        }
        Command::Set { row, cell, text } => table.update_table_cell(doc, row, cell, &text)?,
        Command::Last { cell, text } => table.update_last_row_cell(doc, cell, &text)?,
        Command::Add(values) => {
            table.add_row(doc, values.as_slice())?;
        }
        Command::Update { row, values } => {
            let outcome = table.update_row(doc, row, values.as_slice())?;
            if !outcome.is_complete() {
                println!("row {row}: no cell for value(s) {:?}", outcome.missing);
            }
        }
        Command::Delete(row) => table.delete_row(doc, row)?,
        Command::Rows => {
            table.for_each(doc, |texts, index, _| {
                println!("{index}: {}", texts.join(" | "));
            })?;
        }
        Command::Dump => {
            let rows = table.fetch_table_data(doc)?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }
    Ok(())
}

fn cell_at(doc: &Document, selector: &str, row: usize, cell: usize) -> Result<NodeId> {
    let table = TableDom::query_selector(doc, selector)
        .ok_or_else(|| TableError::table_not_found(selector))?;
    let row_node = doc
        .rows(table)
        .get(row)
        .copied()
        .ok_or_else(|| TableError::row_not_found(selector, row))?;
    let node = doc
        .cells(row_node)
        .get(cell)
        .copied()
        .ok_or_else(|| TableError::cell_not_found(selector, row, cell))?;
    Ok(node)
}

fn print_change(change: &TextChange<NodeId>) {
    println!(
        "changed row {} cell {}: {:?} -> {:?} (typed {:?})",
        change.row_index, change.cell_index, change.old_text, change.new_text, change.draft
    );
}
