//! blockpage - edit a block-based micro-site from the command line.
//!
//! # Usage
//!
//! ```bash
//! blockpage render -o index.html
//! blockpage --edit render -o index.html --watch
//! blockpage add image --at 1
//! blockpage set-block 1 src assets/images/portada.png
//! blockpage export -o data/content.json
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use blockpage::app::{App, Message, Model, TextFormat, ToastLevel};
use blockpage::config::{
    ConfigFlags, clear_config_flags, default_storage_dir, global_config_path, load_config_flags,
    local_override_path, parse_flag_tokens, save_config_flags,
};
use blockpage::document::{Block, BlockKind, BlockType};
use blockpage::perf;
use blockpage::storage::{FileStorage, RemoteSource, STORAGE_KEY, remote_tier_enabled};
use blockpage::ui::{TerminalSurface, page_view, render_page};

/// Edit a block-based micro-site
#[derive(Parser, Debug)]
#[command(name = "blockpage", version, about, long_about = None)]
struct Cli {
    /// Start in edit mode
    #[arg(long, global = true)]
    edit: bool,

    /// Hide editing chrome while in edit mode
    #[arg(long, global = true)]
    preview: bool,

    /// Directory holding the local document cache
    #[arg(long, global = true, value_name = "DIR")]
    storage_dir: Option<PathBuf>,

    /// Site origin for the remote content tier; absent means a local file
    #[arg(long, global = true, value_name = "URL")]
    origin: Option<String>,

    /// Print timing of loads, renders and saves
    #[arg(long, global = true)]
    perf: bool,

    /// Write detailed store/render events to a file
    #[arg(long, global = true, value_name = "PATH")]
    render_debug_log: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long, global = true)]
    save: bool,

    /// Clear saved defaults
    #[arg(long, global = true)]
    clear: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the page as HTML
    Render {
        /// Output file (stdout when absent)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Re-render whenever the cached document changes
        #[arg(short, long)]
        watch: bool,
    },
    /// List the blocks of the page
    List,
    /// Export the document as content.json
    Export {
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Replace the document with a JSON file
    Import { file: PathBuf },
    /// Insert a new block
    Add {
        #[arg(value_name = "TYPE")]
        block_type: String,
        /// Insert position (end when absent)
        #[arg(long, value_name = "N")]
        at: Option<usize>,
    },
    /// Duplicate the block at N
    Duplicate { index: usize },
    /// Remove the block at N
    Remove {
        index: usize,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Move a block
    Move { from: usize, to: usize },
    /// Set one field of a block
    SetBlock {
        index: usize,
        field: String,
        value: String,
    },
    /// Set a site or theme field by dotted path
    Set { path: String, value: String },
    /// Cycle the theme mode
    ToggleTheme,
    /// Embed a local file into a media block
    Attach { index: usize, file: PathBuf },
    /// Apply a text toolbar action to a text block
    Format {
        index: usize,
        #[arg(value_name = "FORMAT")]
        format: String,
        /// Selection start in bytes (end of text when absent)
        #[arg(long)]
        start: Option<usize>,
        /// Selection end in bytes (start when absent)
        #[arg(long)]
        end: Option<usize>,
    },
}

fn remote_source(origin: Option<&str>) -> Option<Box<dyn RemoteSource>> {
    let origin = origin?;
    let url = match url::Url::parse(origin) {
        Ok(url) => url,
        Err(err) => {
            tracing::warn!("ignoring invalid origin '{origin}': {err}");
            return None;
        }
    };
    if !remote_tier_enabled(Some(&url)) {
        return None;
    }
    http_source(&url)
}

#[cfg(feature = "remote")]
fn http_source(url: &url::Url) -> Option<Box<dyn RemoteSource>> {
    match blockpage::storage::HttpSource::for_origin(url) {
        Ok(source) => Some(Box::new(source)),
        Err(err) => {
            tracing::warn!("remote tier unavailable: {err}");
            None
        }
    }
}

#[cfg(not(feature = "remote"))]
fn http_source(_url: &url::Url) -> Option<Box<dyn RemoteSource>> {
    tracing::debug!("built without the remote tier");
    None
}

fn ensure_block(model: &Model, index: usize) -> Result<&Block> {
    let blocks = model.document.blocks();
    blocks.get(index).with_context(|| {
        format!(
            "No block at index {index} (the page has {} blocks)",
            blocks.len()
        )
    })
}

fn summary(block: &Block) -> String {
    let text = match &block.kind {
        BlockKind::Text(text) => text.markdown.clone(),
        BlockKind::Image(image) => image.source.src.clone(),
        BlockKind::Audio(media) | BlockKind::Pdf(media) => media.source.src.clone(),
        BlockKind::Youtube(video) => video.url.clone(),
        BlockKind::Quote(quote) => quote.text.clone(),
        BlockKind::Callout(callout) => callout.text.clone(),
        BlockKind::Gallery(gallery) => format!("{} imágenes", gallery.items.len()),
        BlockKind::Links(links) => format!("{} enlaces", links.items.len()),
    };
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() > 60 {
        format!("{}…", line.chars().take(60).collect::<String>())
    } else {
        line.to_string()
    }
}

fn fail_on_error_toast(model: &Model) -> Result<()> {
    if let Some((message, ToastLevel::Error)) = model.active_toast() {
        anyhow::bail!("{message}");
    }
    Ok(())
}

fn watch_storage(
    app: &App,
    model: Model,
    surface: &mut TerminalSurface,
    path: &Path,
) -> Result<Model> {
    eprintln!("Watching {} (Ctrl-C to stop)", path.display());
    app.watch(model, surface, path, Duration::from_millis(250), || true)
}

fn run(cli: Cli, effective: &ConfigFlags) -> Result<()> {
    let storage_dir = effective
        .storage_dir
        .clone()
        .unwrap_or_else(default_storage_dir);
    let storage = FileStorage::new(&storage_dir);
    let cache_path = storage.path_for(STORAGE_KEY);
    let app = App::new(Box::new(storage));

    let remote = remote_source(effective.origin.as_deref());
    let (model, origin) = app.load(remote.as_deref());
    tracing::info!("content loaded from {}", origin.as_str());
    let model = model
        .with_edit_mode(effective.edit)
        .with_preview_mode(effective.preview);

    let mut surface = TerminalSurface::new();
    let model = match cli.command {
        Command::Render { output, watch } => {
            if watch {
                let output = output.context("--watch needs --output")?;
                std::fs::create_dir_all(&storage_dir).with_context(|| {
                    format!("Failed to create storage dir {}", storage_dir.display())
                })?;
                let mut surface = surface.with_output(Some(output));
                watch_storage(&app, model, &mut surface, &cache_path)?
            } else if let Some(output) = output {
                let mut surface = surface.with_output(Some(output));
                app.render(&model, &mut surface);
                model
            } else {
                print!("{}", render_page(&page_view(&model)));
                model
            }
        }
        Command::List => {
            for (index, block) in model.document.blocks().iter().enumerate() {
                println!(
                    "{index:>3}  {:<8} {:<10} {}",
                    block.block_type().as_str(),
                    block.id,
                    summary(block)
                );
            }
            model
        }
        Command::Export { output } => {
            let mut surface = surface.with_download_path(output);
            app.dispatch(model, Message::Export, &mut surface)
        }
        Command::Import { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            app.dispatch(model, Message::Import(text), &mut surface)
        }
        Command::Add { block_type, at } => {
            let block_type: BlockType = block_type.parse()?;
            app.dispatch(
                model,
                Message::InsertBlock {
                    block_type,
                    position: at,
                },
                &mut surface,
            )
        }
        Command::Duplicate { index } => {
            ensure_block(&model, index)?;
            app.dispatch(model, Message::DuplicateBlock(index), &mut surface)
        }
        Command::Remove { index, yes } => {
            ensure_block(&model, index)?;
            let mut surface = surface.with_assume_yes(yes);
            app.dispatch(model, Message::RemoveBlock(index), &mut surface)
        }
        Command::Move { from, to } => {
            ensure_block(&model, from)?;
            app.dispatch(model, Message::MoveBlock { from, to }, &mut surface)
        }
        Command::SetBlock {
            index,
            field,
            value,
        } => {
            ensure_block(&model, index)?;
            app.dispatch(
                model,
                Message::UpdateBlockField {
                    index,
                    field,
                    value,
                },
                &mut surface,
            )
        }
        Command::Set { path, value } => {
            app.dispatch(model, Message::SetField { path, value }, &mut surface)
        }
        Command::ToggleTheme => app.dispatch(model, Message::ToggleThemeMode, &mut surface),
        Command::Attach { index, file } => {
            let block = ensure_block(&model, index)?;
            if block.media_source().is_none() {
                anyhow::bail!(
                    "Block {index} is a {} block; only image, audio and pdf blocks take files",
                    block.block_type()
                );
            }
            app.dispatch(model, Message::BeginAttach { index, path: file }, &mut surface)
        }
        Command::Format {
            index,
            format,
            start,
            end,
        } => {
            let format: TextFormat = format.parse()?;
            let len = match &ensure_block(&model, index)?.kind {
                BlockKind::Text(text) => text.markdown.len(),
                _ => anyhow::bail!("Block {index} is not a text block"),
            };
            let start = start.unwrap_or(len);
            let end = end.unwrap_or(start);
            app.dispatch(
                model,
                Message::ApplyFormat {
                    index,
                    format,
                    start,
                    end,
                },
                &mut surface,
            )
        }
    };
    fail_on_error_toast(&model)
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    perf::set_enabled(effective.perf);
    let render_debug_log_path = effective
        .render_debug_log
        .clone()
        .or_else(perf::debug_log_path_from_env);
    if let Err(err) = perf::set_debug_log_path(render_debug_log_path.as_deref()) {
        eprintln!(
            "[warn] Failed to initialize render debug log {}: {}",
            render_debug_log_path
                .as_ref()
                .map_or_else(|| "<unset>".to_string(), |p| p.display().to_string()),
            err
        );
    }

    run(cli, &effective).context("blockpage failed")
}
