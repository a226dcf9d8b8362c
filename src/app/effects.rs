use std::collections::VecDeque;

use crate::app::{App, Effect, Message, Model, ToastLevel, update};
use crate::media::read_data_url;
use crate::ui::surface::Surface;
use crate::ui::theme::{block_font_link, theme_vars};
use crate::ui::view::{PageMode, block_view, page_view, site_header};

const CONFIRM_REMOVE: &str = "¿Eliminar este bloque?";

impl App {
    /// Run `msg` through [`update`] and apply every effect it queues.
    ///
    /// Effects that complete with a message (confirmations, file reads) feed
    /// it back in before returning.
    pub fn dispatch(&self, model: Model, msg: Message, surface: &mut dyn Surface) -> Model {
        let mut model = model;
        let mut queue = VecDeque::from([msg]);
        while let Some(msg) = queue.pop_front() {
            crate::perf::log_event("app.dispatch", msg.name());
            model = update(model, msg);
            self.apply_effects(&mut model, surface, &mut queue);
        }
        model
    }

    /// Apply queued effects until none are left, collecting follow-up messages.
    pub(super) fn apply_effects(
        &self,
        model: &mut Model,
        surface: &mut dyn Surface,
        queue: &mut VecDeque<Message>,
    ) {
        loop {
            let effects = model.take_effects();
            if effects.is_empty() {
                break;
            }
            for effect in effects {
                if let Some(next) = self.handle_effect(model, surface, effect) {
                    queue.push_back(next);
                }
            }
        }
    }

    /// Render the whole page for `model`.
    pub fn render(&self, model: &Model, surface: &mut dyn Surface) {
        surface.rebuild(&page_view(model));
    }

    fn handle_effect(
        &self,
        model: &mut Model,
        surface: &mut dyn Surface,
        effect: Effect,
    ) -> Option<Message> {
        match effect {
            Effect::Persist => {
                if let Err(err) = self.persist(model) {
                    tracing::warn!("could not save locally: {err}");
                    crate::perf::log_event("app.persist.error", format!("{err}"));
                    model.show_toast(ToastLevel::Warning, "No se pudo guardar localmente.");
                }
            }
            Effect::RenderAll => self.render(model, surface),
            Effect::RefreshBlock(index) => {
                let mode = PageMode::from_flags(model.edit_mode, model.preview_mode);
                if let Some(block) = model.document.blocks().get(index) {
                    surface.refresh_block(&block_view(block, index, mode));
                }
            }
            Effect::RenderSite => surface.render_site(&site_header(&model.document)),
            Effect::ApplyTheme => surface.apply_theme(&theme_vars(&model.document.theme)),
            Effect::LoadFont(choice) => {
                if let Some(link) = block_font_link(choice) {
                    surface.load_font(&link);
                }
            }
            Effect::ScrollIntoView(id) => surface.scroll_into_view(&id),
            Effect::ConfirmRemove { index, id } => {
                if surface.confirm(CONFIRM_REMOVE) {
                    return Some(Message::RemoveConfirmed(id));
                }
                tracing::debug!("removal of block {index} ({id}) declined");
            }
            Effect::ReadMedia { ticket, path } => match read_data_url(&path) {
                Ok(file) => {
                    return Some(Message::MediaLoaded {
                        ticket,
                        file_name: file.file_name,
                        data_url: file.data_url,
                    });
                }
                Err(err) => {
                    tracing::warn!("could not read {}: {err}", path.display());
                    model.show_toast(
                        ToastLevel::Warning,
                        format!("No se pudo leer el archivo: {}", path.display()),
                    );
                }
            },
            Effect::Download {
                file_name,
                contents,
            } => {
                if let Err(err) = surface.download(&file_name, &contents) {
                    tracing::warn!("download of {file_name} failed: {err}");
                    model.show_toast(ToastLevel::Error, format!("No se pudo exportar: {err}"));
                }
            }
            Effect::ShowToast(message, level) => surface.show_toast(&message, level),
        }
        None
    }
}
