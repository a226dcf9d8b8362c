//! Where effects land.
//!
//! The store never touches a page. The host hands each effect to a
//! [`Surface`], which owns whatever it renders into: a file on disk, a
//! terminal, or a call log in tests.

use std::path::PathBuf;

use crate::app::ToastLevel;
use crate::Result;

use super::html::render_page;
use super::theme::{FontLink, ThemeVars};
use super::view::{BlockView, PageView, SiteHeader, Slot};

/// Reconciliation target for store effects.
pub trait Surface {
    /// Tear down and rebuild the whole page.
    fn rebuild(&mut self, page: &PageView);

    /// Replace the preview markup of one block, leaving its editor alone.
    fn refresh_block(&mut self, block: &BlockView);

    /// Re-render the header texts.
    fn render_site(&mut self, header: &SiteHeader);

    /// Re-apply root properties, mode and the theme font link.
    fn apply_theme(&mut self, theme: &ThemeVars);

    /// Ensure a per-block font stylesheet is present.
    fn load_font(&mut self, link: &FontLink);

    fn scroll_into_view(&mut self, block_id: &str);

    fn show_toast(&mut self, message: &str, level: ToastLevel);

    /// Ask the user to confirm; `false` cancels.
    fn confirm(&mut self, prompt: &str) -> bool;

    /// Hand a file to the user.
    fn download(&mut self, file_name: &str, contents: &str) -> Result<()>;
}

/// Calls received by a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    Rebuild,
    RefreshBlock { index: usize, id: String },
    RenderSite,
    ApplyTheme,
    LoadFont(String),
    ScrollIntoView(String),
    Toast(String, ToastLevel),
    Confirm(String),
    Download(String),
}

/// In-memory surface that records every call.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub calls: Vec<SurfaceCall>,
    /// Last page passed to `rebuild`
    pub page: Option<PageView>,
    /// Downloads by file name
    pub downloads: Vec<(String, String)>,
    /// Answer given to confirmations
    pub confirm_answer: bool,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn confirming(mut self, answer: bool) -> Self {
        self.confirm_answer = answer;
        self
    }

    pub fn count(&self, predicate: impl Fn(&SurfaceCall) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }
}

impl Surface for RecordingSurface {
    fn rebuild(&mut self, page: &PageView) {
        self.calls.push(SurfaceCall::Rebuild);
        self.page = Some(page.clone());
    }

    fn refresh_block(&mut self, block: &BlockView) {
        self.calls.push(SurfaceCall::RefreshBlock {
            index: block.index,
            id: block.id.clone(),
        });
        if let Some(page) = self.page.as_mut() {
            replace_preview(page, block);
        }
    }

    fn render_site(&mut self, header: &SiteHeader) {
        self.calls.push(SurfaceCall::RenderSite);
        if let Some(page) = self.page.as_mut() {
            page.header = header.clone();
        }
    }

    fn apply_theme(&mut self, theme: &ThemeVars) {
        self.calls.push(SurfaceCall::ApplyTheme);
        if let Some(page) = self.page.as_mut() {
            page.theme = theme.clone();
        }
    }

    fn load_font(&mut self, link: &FontLink) {
        self.calls.push(SurfaceCall::LoadFont(link.id.clone()));
    }

    fn scroll_into_view(&mut self, block_id: &str) {
        self.calls.push(SurfaceCall::ScrollIntoView(block_id.to_string()));
    }

    fn show_toast(&mut self, message: &str, level: ToastLevel) {
        self.calls.push(SurfaceCall::Toast(message.to_string(), level));
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        self.calls.push(SurfaceCall::Confirm(prompt.to_string()));
        self.confirm_answer
    }

    fn download(&mut self, file_name: &str, contents: &str) -> Result<()> {
        self.calls.push(SurfaceCall::Download(file_name.to_string()));
        self.downloads
            .push((file_name.to_string(), contents.to_string()));
        Ok(())
    }
}

fn replace_preview(page: &mut PageView, block: &BlockView) {
    for slot in &mut page.slots {
        if let Slot::Block(view) = slot
            && view.index == block.index
        {
            view.preview_html.clone_from(&block.preview_html);
        }
    }
}

/// Surface for the command line host.
///
/// Writes the page to `output` (if set) on every rebuild or refresh, prints
/// toasts to stderr and asks confirmations on the terminal. Downloads go to
/// `download_path`, or to the file name in the working directory.
#[derive(Debug, Default)]
pub struct TerminalSurface {
    output: Option<PathBuf>,
    download_path: Option<PathBuf>,
    assume_yes: bool,
    page: Option<PageView>,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write rendered pages to `path`.
    pub fn with_output(mut self, path: Option<PathBuf>) -> Self {
        self.output = path;
        self
    }

    /// Write downloads to `path` instead of the working directory.
    pub fn with_download_path(mut self, path: Option<PathBuf>) -> Self {
        self.download_path = path;
        self
    }

    /// Answer every confirmation with yes.
    pub const fn with_assume_yes(mut self, assume_yes: bool) -> Self {
        self.assume_yes = assume_yes;
        self
    }

    fn write_page(&self) {
        let (Some(path), Some(page)) = (&self.output, &self.page) else {
            return;
        };
        let html = render_page(page);
        if let Err(err) = std::fs::write(path, html) {
            tracing::warn!("failed to write {}: {err}", path.display());
        } else {
            crate::perf::log_event("surface.write", format!("path={}", path.display()));
        }
    }
}

impl Surface for TerminalSurface {
    fn rebuild(&mut self, page: &PageView) {
        self.page = Some(page.clone());
        self.write_page();
    }

    fn refresh_block(&mut self, block: &BlockView) {
        if let Some(page) = self.page.as_mut() {
            replace_preview(page, block);
        }
        self.write_page();
    }

    fn render_site(&mut self, header: &SiteHeader) {
        if let Some(page) = self.page.as_mut() {
            page.header = header.clone();
        }
        self.write_page();
    }

    fn apply_theme(&mut self, theme: &ThemeVars) {
        if let Some(page) = self.page.as_mut() {
            page.theme = theme.clone();
        }
        self.write_page();
    }

    fn load_font(&mut self, link: &FontLink) {
        if let Some(page) = self.page.as_mut()
            && !page.block_fonts.iter().any(|existing| existing.id == link.id)
        {
            page.block_fonts.push(link.clone());
        }
    }

    fn scroll_into_view(&mut self, block_id: &str) {
        tracing::debug!("scroll into view: {block_id}");
    }

    fn show_toast(&mut self, message: &str, level: ToastLevel) {
        match level {
            ToastLevel::Info => eprintln!("{message}"),
            ToastLevel::Warning => eprintln!("warning: {message}"),
            ToastLevel::Error => eprintln!("error: {message}"),
        }
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        inquire::Confirm::new(prompt)
            .with_default(false)
            .prompt()
            .unwrap_or(false)
    }

    fn download(&mut self, file_name: &str, contents: &str) -> Result<()> {
        let path = self
            .download_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(file_name));
        std::fs::write(&path, contents)?;
        tracing::info!("wrote {}", path.display());
        Ok(())
    }
}
