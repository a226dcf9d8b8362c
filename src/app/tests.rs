use std::path::PathBuf;
use std::time::{Duration, Instant};

use tempfile::tempdir;

use crate::document::{
    BlockKind, BlockType, Document, FontChoice, Layout, SourceMode, ThemeMode, new_block, seed,
};
use crate::storage::{MemoryStorage, STORAGE_KEY, Storage};
use crate::ui::{RecordingSurface, SurfaceCall};

use super::{
    App, AttachTicket, EXPORT_FILE_NAME, Effect, Message, Model, TextFormat, ToastLevel,
    edit_mode_from_fragment, update,
};

fn document_with(types: &[BlockType]) -> Document {
    let mut document = seed();
    *document.blocks_mut() = types.iter().map(|t| new_block(*t)).collect();
    document
}

fn create_test_model(types: &[BlockType]) -> Model {
    Model::new(document_with(types), seed()).with_edit_mode(true)
}

fn ids(model: &Model) -> Vec<String> {
    model.document.blocks().iter().map(|b| b.id.clone()).collect()
}

fn create_test_app() -> App {
    App::new(Box::new(MemoryStorage::new()))
}

fn stored_document(app: &App) -> Option<serde_json::Value> {
    app.storage()
        .get(app.storage_key())
        .unwrap()
        .map(|text| serde_json::from_str(&text).unwrap())
}

// Structure

#[test]
fn test_insert_block_shifts_following_blocks() {
    let mut model = create_test_model(&[BlockType::Text, BlockType::Quote, BlockType::Image]);
    let before = ids(&model);

    let id = model.insert_block(BlockType::Callout, Some(1));

    let after = ids(&model);
    assert_eq!(after.len(), 4);
    assert_eq!(after[1], id);
    assert_eq!(after[0], before[0]);
    assert_eq!(&after[2..], &before[1..]);
    assert_eq!(
        model.take_effects(),
        vec![Effect::RenderAll, Effect::Persist, Effect::ScrollIntoView(id)]
    );
}

#[test]
fn test_insert_block_without_valid_position_appends() {
    let mut model = create_test_model(&[BlockType::Text]);
    let appended = model.insert_block(BlockType::Quote, None);
    assert_eq!(ids(&model)[1], appended);
    let past_end = model.insert_block(BlockType::Links, Some(99));
    assert_eq!(ids(&model)[2], past_end);
}

#[test]
fn test_insert_closes_inline_picker() {
    let model = create_test_model(&[BlockType::Text]);
    let model = update(model, Message::OpenInlinePicker(1));
    assert_eq!(model.inline_picker, Some(1));
    let model = update(
        model,
        Message::InsertBlock {
            block_type: BlockType::Image,
            position: Some(0),
        },
    );
    assert_eq!(model.inline_picker, None);
}

#[test]
fn test_pick_block_type_inserts_at_picker_position() {
    let model = create_test_model(&[BlockType::Text, BlockType::Text]);
    let model = update(model, Message::OpenInlinePicker(1));
    let model = update(model, Message::PickBlockType(BlockType::Gallery));
    assert_eq!(model.document.blocks()[1].block_type(), BlockType::Gallery);
    assert_eq!(model.inline_picker, None);
}

#[test]
fn test_pick_block_type_without_open_picker_is_ignored() {
    let model = create_test_model(&[BlockType::Text]);
    let model = update(model, Message::PickBlockType(BlockType::Quote));
    assert_eq!(model.document.blocks().len(), 1);
}

#[test]
fn test_inline_picker_needs_edit_chrome() {
    let model = create_test_model(&[]).with_edit_mode(false);
    let model = update(model, Message::OpenInlinePicker(0));
    assert_eq!(model.inline_picker, None);
}

#[test]
fn test_palette_drop_unknown_type_becomes_text() {
    let model = create_test_model(&[BlockType::Quote]);
    let model = update(
        model,
        Message::PaletteDrop {
            block_type: "carousel".to_string(),
            position: Some(0),
        },
    );
    assert_eq!(model.document.blocks()[0].block_type(), BlockType::Text);

    let model = update(
        model,
        Message::PaletteDrop {
            block_type: "pdf".to_string(),
            position: None,
        },
    );
    assert_eq!(model.document.blocks()[2].block_type(), BlockType::Pdf);
}

#[test]
fn test_duplicate_inserts_copy_with_new_id_after_original() {
    let mut model = create_test_model(&[BlockType::Quote, BlockType::Text]);
    model
        .update_block_field(0, "text", "Saber es poder".to_string())
        .unwrap();

    let copy_id = model.duplicate_block(0).unwrap();

    let blocks = model.document.blocks();
    assert_eq!(blocks.len(), 3);
    assert_eq!(blocks[1].id, copy_id);
    assert_ne!(blocks[0].id, blocks[1].id);
    assert_eq!(blocks[0].kind, blocks[1].kind);
    assert_eq!(blocks[2].block_type(), BlockType::Text);
}

#[test]
fn test_move_block_preserves_relative_order() {
    let mut model = create_test_model(&[
        BlockType::Text,
        BlockType::Image,
        BlockType::Quote,
        BlockType::Links,
    ]);
    let before = ids(&model);

    assert!(model.move_block(0, 2).unwrap());

    let after = ids(&model);
    assert_eq!(
        after,
        vec![
            before[1].clone(),
            before[2].clone(),
            before[0].clone(),
            before[3].clone()
        ]
    );
}

#[test]
fn test_move_block_to_same_index_is_noop() {
    let mut model = create_test_model(&[BlockType::Text, BlockType::Image]);
    assert!(!model.move_block(1, 1).unwrap());
    assert!(model.pending_effects().is_empty());
}

#[test]
fn test_remove_block_keeps_other_identities() {
    let mut model = create_test_model(&[BlockType::Text, BlockType::Image, BlockType::Quote]);
    let before = ids(&model);
    let removed = model.remove_block(1).unwrap();
    assert_eq!(removed.id, before[1]);
    assert_eq!(ids(&model), vec![before[0].clone(), before[2].clone()]);
}

#[test]
fn test_out_of_range_operations_are_noops() {
    let model = create_test_model(&[BlockType::Text]);
    let before = model.document.clone();
    let model = update(model, Message::DuplicateBlock(5));
    let model = update(model, Message::RemoveBlock(5));
    let model = update(model, Message::MoveBlock { from: 5, to: 0 });
    let mut model = update(
        model,
        Message::UpdateBlockField {
            index: 5,
            field: "markdown".to_string(),
            value: "x".to_string(),
        },
    );
    assert_eq!(model.document, before);
    assert!(model.take_effects().is_empty());
}

// Field routing

#[test]
fn test_update_block_field_refreshes_only_that_block() {
    let mut model = create_test_model(&[BlockType::Text, BlockType::Text]);
    model
        .update_block_field(1, "markdown", "**hola**".to_string())
        .unwrap();
    assert_eq!(
        model.take_effects(),
        vec![Effect::RefreshBlock(1), Effect::Persist]
    );
    let BlockKind::Text(text) = &model.document.blocks()[1].kind else {
        panic!("expected text block");
    };
    assert_eq!(text.markdown, "**hola**");
}

#[test]
fn test_gallery_and_links_items_are_parsed() {
    let mut model = create_test_model(&[BlockType::Gallery, BlockType::Links]);
    model
        .update_block_field(
            0,
            "items",
            "a.png | Uno | Primera\n\n b.png|Dos".to_string(),
        )
        .unwrap();
    model
        .update_block_field(1, "items", "Programa|programa.pdf".to_string())
        .unwrap();

    let BlockKind::Gallery(gallery) = &model.document.blocks()[0].kind else {
        panic!("expected gallery");
    };
    assert_eq!(gallery.items.len(), 2);
    assert_eq!(gallery.items[0].caption, "Primera");
    assert_eq!(gallery.items[1].src, "b.png");
    assert_eq!(gallery.items[1].caption, "");

    let BlockKind::Links(links) = &model.document.blocks()[1].kind else {
        panic!("expected links");
    };
    assert_eq!(links.items[0].label, "Programa");
    assert_eq!(links.items[0].url, "programa.pdf");
}

#[test]
fn test_text_style_fields_are_sanitized() {
    let mut model = create_test_model(&[BlockType::Text]);
    model.update_block_field(0, "fontSize", "9".to_string()).unwrap();
    model.update_block_field(0, "lineHeight", "abc".to_string()).unwrap();
    model.update_block_field(0, "textColor", "red".to_string()).unwrap();
    model.update_block_field(0, "align", "center".to_string()).unwrap();

    let BlockKind::Text(text) = &model.document.blocks()[0].kind else {
        panic!("expected text block");
    };
    assert_eq!(text.font_size, "3");
    assert_eq!(text.line_height, "");
    assert_eq!(text.text_color, "");
    assert_eq!(text.align, "center");
}

#[test]
fn test_font_choice_loads_block_font() {
    let mut model = create_test_model(&[BlockType::Text]);
    model.update_block_field(0, "fontChoice", "lato".to_string()).unwrap();
    assert_eq!(
        model.take_effects(),
        vec![
            Effect::LoadFont(FontChoice::Lato),
            Effect::RefreshBlock(0),
            Effect::Persist
        ]
    );

    model.update_block_field(0, "fontChoice", "comic".to_string()).unwrap();
    let BlockKind::Text(text) = &model.document.blocks()[0].kind else {
        panic!("expected text block");
    };
    assert_eq!(text.font_choice, FontChoice::Inherit);
}

#[test]
fn test_image_width_is_clamped() {
    let mut model = create_test_model(&[BlockType::Image]);
    model.update_block_field(0, "width", "150".to_string()).unwrap();
    let BlockKind::Image(image) = &model.document.blocks()[0].kind else {
        panic!("expected image");
    };
    assert_eq!(image.width, "100");
}

#[test]
fn test_media_src_switches_to_repo_source() {
    let mut model = create_test_model(&[BlockType::Audio]);
    {
        let source = model.document.blocks_mut()[0].media_source_mut().unwrap();
        source.source_mode = SourceMode::Local;
        source.source_name = "clase.mp3".to_string();
    }
    model
        .update_block_field(0, "src", "assets/audio/clase.mp3".to_string())
        .unwrap();

    let source = model.document.blocks()[0].media_source().unwrap();
    assert_eq!(source.src, "assets/audio/clase.mp3");
    assert_eq!(source.repo_path, "assets/audio/clase.mp3");
    assert_eq!(source.source_mode, SourceMode::Repo);
    assert_eq!(source.source_name, "");
}

#[test]
fn test_source_mode_toggle_restores_repo_path() {
    let mut model = create_test_model(&[BlockType::Image]);
    {
        let source = model.document.blocks_mut()[0].media_source_mut().unwrap();
        source.src = "data:image/png;base64,AA".to_string();
        source.source_mode = SourceMode::Local;
        source.source_name = "foto.png".to_string();
        source.repo_path = "assets/images/foto.png".to_string();
    }

    model.update_block_field(0, "sourceMode", "local".to_string()).unwrap();
    let source = model.document.blocks()[0].media_source().unwrap();
    assert_eq!(source.src, "data:image/png;base64,AA");

    model.update_block_field(0, "sourceMode", "repo".to_string()).unwrap();
    let source = model.document.blocks()[0].media_source().unwrap();
    assert_eq!(source.source_mode, SourceMode::Repo);
    assert_eq!(source.src, "assets/images/foto.png");
    assert_eq!(source.source_name, "");
}

#[test]
fn test_id_and_type_cannot_be_assigned() {
    let mut model = create_test_model(&[BlockType::Quote]);
    let before = model.document.clone();
    assert!(model.update_block_field(0, "id", "x".to_string()).is_err());
    assert!(model.update_block_field(0, "type", "image".to_string()).is_err());
    assert_eq!(model.document, before);
}

#[test]
fn test_unknown_block_field_is_kept_as_extra() {
    let mut model = create_test_model(&[BlockType::Callout]);
    model.update_block_field(0, "icon", "💡".to_string()).unwrap();
    let block = &model.document.blocks()[0];
    assert_eq!(block.extra.get("icon").and_then(|v| v.as_str()), Some("💡"));
}

#[test]
fn test_apply_format_updates_markdown_and_selection() {
    let mut model = create_test_model(&[BlockType::Text]);
    model
        .update_block_field(0, "markdown", "hola mundo".to_string())
        .unwrap();
    let model = update(
        model,
        Message::ApplyFormat {
            index: 0,
            format: TextFormat::Bold,
            start: 5,
            end: 10,
        },
    );
    let BlockKind::Text(text) = &model.document.blocks()[0].kind else {
        panic!("expected text block");
    };
    assert_eq!(text.markdown, "hola **mundo**");
    let selection = model.selection.clone().unwrap();
    assert_eq!(selection.index, 0);
    assert_eq!(&text.markdown[selection.range], "mundo");
}

#[test]
fn test_apply_format_on_non_text_block_is_rejected() {
    let mut model = create_test_model(&[BlockType::Quote]);
    assert!(model.apply_text_format(0, TextFormat::Italic, 0..0).is_err());
    assert!(model.pending_effects().is_empty());
}

// Media attachment

#[test]
fn test_attach_completion_embeds_file() {
    let mut model = create_test_model(&[BlockType::Text, BlockType::Pdf]);
    let ticket = model.begin_attach(1, PathBuf::from("guia.pdf")).unwrap();
    assert!(matches!(
        model.take_effects().as_slice(),
        [Effect::ReadMedia { ticket: t, .. }] if *t == ticket
    ));

    assert!(model.finish_attach(&ticket, "guia.pdf", "data:application/pdf;base64,AA".to_string()));

    let source = model.document.blocks()[1].media_source().unwrap();
    assert_eq!(source.src, "data:application/pdf;base64,AA");
    assert_eq!(source.source_mode, SourceMode::Local);
    assert_eq!(source.source_name, "guia.pdf");
}

#[test]
fn test_attach_follows_block_after_reorder() {
    let mut model = create_test_model(&[BlockType::Image, BlockType::Text]);
    let ticket = model.begin_attach(0, PathBuf::from("a.png")).unwrap();
    model.move_block(0, 1).unwrap();
    assert!(model.finish_attach(&ticket, "a.png", "data:image/png;base64,AA".to_string()));
    assert_eq!(
        model.document.blocks()[1].media_source().unwrap().source_name,
        "a.png"
    );
}

#[test]
fn test_stale_attach_after_src_edit_is_dropped() {
    let mut model = create_test_model(&[BlockType::Image]);
    let ticket = model.begin_attach(0, PathBuf::from("a.png")).unwrap();
    model
        .update_block_field(0, "src", "assets/images/b.png".to_string())
        .unwrap();
    model.take_effects();

    assert!(!model.finish_attach(&ticket, "a.png", "data:image/png;base64,AA".to_string()));
    assert_eq!(
        model.document.blocks()[0].media_source().unwrap().src,
        "assets/images/b.png"
    );
    assert!(model.pending_effects().is_empty());
}

#[test]
fn test_newer_attach_supersedes_older() {
    let mut model = create_test_model(&[BlockType::Audio]);
    let first = model.begin_attach(0, PathBuf::from("a.mp3")).unwrap();
    let second = model.begin_attach(0, PathBuf::from("b.mp3")).unwrap();
    assert!(model.finish_attach(&second, "b.mp3", "data:audio/mpeg;base64,Ag".to_string()));
    assert!(!model.finish_attach(&first, "a.mp3", "data:audio/mpeg;base64,AQ".to_string()));
    assert_eq!(
        model.document.blocks()[0].media_source().unwrap().source_name,
        "b.mp3"
    );
}

#[test]
fn test_attach_to_non_media_block_fails() {
    let mut model = create_test_model(&[BlockType::Youtube]);
    assert!(model.begin_attach(0, PathBuf::from("v.mp4")).is_err());
    let forged = AttachTicket {
        block_id: model.document.blocks()[0].id.clone(),
        generation: 1,
    };
    assert!(!model.finish_attach(&forged, "v.mp4", "data:video/mp4;base64,AA".to_string()));
}

// Site and theme

#[test]
fn test_set_site_field_rerenders_header_only() {
    let mut model = create_test_model(&[]);
    model.set_field("site.title", "Biología 2".to_string()).unwrap();
    assert_eq!(model.document.site.title, "Biología 2");
    assert_eq!(
        model.take_effects(),
        vec![Effect::RenderSite, Effect::Persist]
    );
}

#[test]
fn test_set_layout_applies_theme_and_rebuilds() {
    let mut model = create_test_model(&[BlockType::Text]);
    model.set_field("theme.layout", "narrow".to_string()).unwrap();
    assert_eq!(model.document.theme.layout, Layout::Narrow);
    assert_eq!(
        model.take_effects(),
        vec![
            Effect::ApplyTheme,
            Effect::RenderAll,
            Effect::RenderSite,
            Effect::Persist
        ]
    );
}

#[test]
fn test_invalid_theme_values_keep_current() {
    let mut model = create_test_model(&[]);
    model.set_field("theme.scale", "-2".to_string()).unwrap();
    model.set_field("theme.mode", "sepia".to_string()).unwrap();
    assert!((model.document.theme.scale - 1.0).abs() < f64::EPSILON);
    assert_eq!(model.document.theme.mode, ThemeMode::Auto);

    model.set_field("theme.scale", "1.25".to_string()).unwrap();
    assert!((model.document.theme.scale - 1.25).abs() < f64::EPSILON);
}

#[test]
fn test_unknown_path_is_rejected_without_effects() {
    let mut model = create_test_model(&[]);
    assert!(model.set_field("site.footer", "x".to_string()).is_err());
    assert!(model.set_field("sections.0.title", "x".to_string()).is_err());
    assert!(model.pending_effects().is_empty());
}

#[test]
fn test_toggle_theme_mode_cycles_and_announces() {
    let model = create_test_model(&[]);
    let model = update(model, Message::ToggleThemeMode);
    assert_eq!(model.document.theme.mode, ThemeMode::Light);
    assert_eq!(
        model.active_toast(),
        Some(("Modo del tema: Claro.", ToastLevel::Info))
    );
    let model = update(model, Message::ToggleThemeMode);
    let model = update(model, Message::ToggleThemeMode);
    assert_eq!(model.document.theme.mode, ThemeMode::Auto);
    assert_eq!(
        model.active_toast(),
        Some(("Modo del tema: Automático.", ToastLevel::Info))
    );
}

// Modes

#[test]
fn test_edit_mode_from_fragment() {
    assert!(edit_mode_from_fragment("#edit"));
    assert!(edit_mode_from_fragment("#/page?edit=1"));
    assert!(!edit_mode_from_fragment(""));
    assert!(!edit_mode_from_fragment("#intro"));
}

#[test]
fn test_leaving_edit_mode_turns_preview_off() {
    let model = create_test_model(&[]).with_preview_mode(true);
    assert!(model.preview_mode);
    let model = update(model, Message::HashChanged(String::new()));
    assert!(!model.edit_mode);
    assert!(!model.preview_mode);

    let mut model = update(model, Message::HashChanged("#edit".to_string()));
    assert!(model.edit_mode);
    assert!(model.take_effects().contains(&Effect::RenderAll));
}

#[test]
fn test_unchanged_fragment_does_not_rerender() {
    let mut model = update(
        create_test_model(&[]),
        Message::HashChanged("#edit".to_string()),
    );
    assert!(model.take_effects().is_empty());
}

#[test]
fn test_toggle_edit_flips_mode() {
    let model = create_test_model(&[]);
    let model = update(model, Message::ToggleEdit);
    assert!(!model.edit_mode);
    let model = update(model, Message::ToggleEdit);
    assert!(model.edit_mode);
}

#[test]
fn test_preview_only_toggles_in_edit_mode() {
    let model = create_test_model(&[]).with_edit_mode(false);
    let model = update(model, Message::TogglePreview);
    assert!(!model.preview_mode);

    let model = update(model.with_edit_mode(true), Message::TogglePreview);
    assert!(model.preview_mode);
}

#[test]
fn test_toast_expires_after_timeout() {
    let mut model = create_test_model(&[]);
    model.show_toast(ToastLevel::Info, "hola");
    assert!(!model.expire_toast(Instant::now()));
    assert!(model.active_toast().is_some());
    assert!(model.expire_toast(Instant::now() + Duration::from_secs(5)));
    assert!(model.active_toast().is_none());
}

#[test]
fn test_message_names_are_stable() {
    assert_eq!(Message::Save.name(), "save");
    assert_eq!(Message::Import(String::from("{}")).name(), "import");
    assert_eq!(
        Message::MoveBlock { from: 0, to: 1 }.name(),
        "move_block"
    );
}

// Host

#[test]
fn test_dispatch_remove_asks_and_removes_on_confirm() {
    let app = create_test_app();
    let model = create_test_model(&[BlockType::Text, BlockType::Quote]);
    let kept = ids(&model)[1].clone();
    let mut surface = RecordingSurface::new().confirming(true);

    let model = app.dispatch(model, Message::RemoveBlock(0), &mut surface);

    assert_eq!(ids(&model), vec![kept]);
    assert_eq!(
        surface.calls[0],
        SurfaceCall::Confirm("¿Eliminar este bloque?".to_string())
    );
    assert_eq!(surface.count(|c| *c == SurfaceCall::Rebuild), 1);
    assert!(stored_document(&app).is_some());
}

#[test]
fn test_dispatch_remove_declined_changes_nothing() {
    let app = create_test_app();
    let model = create_test_model(&[BlockType::Text]);
    let before = model.document.clone();
    let mut surface = RecordingSurface::new().confirming(false);

    let model = app.dispatch(model, Message::RemoveBlock(0), &mut surface);

    assert_eq!(model.document, before);
    assert_eq!(surface.count(|c| *c == SurfaceCall::Rebuild), 0);
    assert!(stored_document(&app).is_none());
}

#[test]
fn test_dispatch_field_edit_refreshes_block_and_persists() {
    let app = create_test_app();
    let model = create_test_model(&[BlockType::Callout]);
    let id = ids(&model)[0].clone();
    let mut surface = RecordingSurface::new();
    app.render(&model, &mut surface);

    let model = app.dispatch(
        model,
        Message::UpdateBlockField {
            index: 0,
            field: "text".to_string(),
            value: "Examen el **lunes**".to_string(),
        },
        &mut surface,
    );

    assert_eq!(
        surface.calls,
        vec![
            SurfaceCall::Rebuild,
            SurfaceCall::RefreshBlock { index: 0, id },
        ]
    );
    let page = surface.page.as_ref().unwrap();
    let block = page.blocks().next().unwrap();
    assert!(block.preview_html.contains("<strong>lunes</strong>"));
    let stored = stored_document(&app).unwrap();
    assert_eq!(
        stored["sections"][0]["blocks"][0]["text"],
        "Examen el **lunes**"
    );
    assert_eq!(model.document.blocks().len(), 1);
}

#[test]
fn test_dispatch_attach_reads_file_into_block() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("foto.png");
    std::fs::write(&path, b"png").unwrap();
    let app = create_test_app();
    let model = create_test_model(&[BlockType::Image]);
    let mut surface = RecordingSurface::new();

    let model = app.dispatch(model, Message::BeginAttach { index: 0, path }, &mut surface);

    let source = model.document.blocks()[0].media_source().unwrap();
    assert_eq!(source.src, "data:image/png;base64,cG5n");
    assert_eq!(source.source_name, "foto.png");
    assert_eq!(source.source_mode, SourceMode::Local);
    assert_eq!(
        surface.count(|c| matches!(c, SurfaceCall::RefreshBlock { .. })),
        1
    );
}

#[test]
fn test_dispatch_attach_missing_file_warns() {
    let dir = tempdir().unwrap();
    let app = create_test_app();
    let model = create_test_model(&[BlockType::Image]);
    let before = model.document.clone();
    let mut surface = RecordingSurface::new();

    let model = app.dispatch(
        model,
        Message::BeginAttach {
            index: 0,
            path: dir.path().join("missing.png"),
        },
        &mut surface,
    );

    assert_eq!(model.document, before);
    assert!(matches!(model.active_toast(), Some((_, ToastLevel::Warning))));
}

#[test]
fn test_dispatch_font_choice_loads_font_link() {
    let app = create_test_app();
    let model = create_test_model(&[BlockType::Text]);
    let mut surface = RecordingSurface::new();
    app.dispatch(
        model,
        Message::UpdateBlockField {
            index: 0,
            field: "fontChoice".to_string(),
            value: "merriweather".to_string(),
        },
        &mut surface,
    );
    assert_eq!(
        surface.calls[0],
        SurfaceCall::LoadFont("block-font-merriweather".to_string())
    );
}

#[test]
fn test_save_persists_and_confirms() {
    let app = create_test_app();
    let model = create_test_model(&[BlockType::Text]);
    let mut surface = RecordingSurface::new();

    let model = app.dispatch(model, Message::Save, &mut surface);

    let stored = stored_document(&app).unwrap();
    assert_eq!(stored, serde_json::to_value(&model.document).unwrap());
    assert!(surface.calls.contains(&SurfaceCall::Toast(
        "Cambios guardados en este navegador.".to_string(),
        ToastLevel::Info
    )));
}

#[test]
fn test_persist_failure_warns_and_keeps_editing() {
    let app = App::new(Box::new(MemoryStorage::read_only()));
    let model = create_test_model(&[BlockType::Text]);
    let mut surface = RecordingSurface::new();

    let model = app.dispatch(
        model,
        Message::InsertBlock {
            block_type: BlockType::Quote,
            position: None,
        },
        &mut surface,
    );

    assert_eq!(model.document.blocks().len(), 2);
    assert_eq!(
        model.active_toast(),
        Some(("No se pudo guardar localmente.", ToastLevel::Warning))
    );
    assert!(surface.calls.contains(&SurfaceCall::Toast(
        "No se pudo guardar localmente.".to_string(),
        ToastLevel::Warning
    )));
}

#[test]
fn test_export_downloads_pretty_json() {
    let app = create_test_app();
    let model = create_test_model(&[BlockType::Text, BlockType::Links]);
    let mut surface = RecordingSurface::new();

    let model = app.dispatch(model, Message::Export, &mut surface);

    let (name, contents) = &surface.downloads[0];
    assert_eq!(name, EXPORT_FILE_NAME);
    assert!(contents.contains("\n  \"site\""));
    let exported: serde_json::Value = serde_json::from_str(contents).unwrap();
    assert_eq!(exported, serde_json::to_value(&model.document).unwrap());
    assert!(matches!(model.active_toast(), Some((_, ToastLevel::Info))));
}

#[test]
fn test_import_replaces_document_and_persists() {
    let app = create_test_app();
    let model = create_test_model(&[BlockType::Text]);
    let mut surface = RecordingSurface::new();
    let json = r#"{
        "site": {"title": "Química"},
        "sections": [{"blocks": [{"type": "quote", "text": "Nada se pierde"}, {"type": "mystery"}]}]
    }"#;

    let model = app.dispatch(model, Message::Import(json.to_string()), &mut surface);

    assert_eq!(model.document.site.title, "Química");
    assert_eq!(model.document.sections[0].title, "Inicio");
    let types: Vec<_> = model
        .document
        .blocks()
        .iter()
        .map(crate::document::Block::block_type)
        .collect();
    assert_eq!(types, vec![BlockType::Quote, BlockType::Text]);
    assert_eq!(
        model.active_toast(),
        Some(("Contenido importado correctamente.", ToastLevel::Info))
    );
    assert!(surface.calls.contains(&SurfaceCall::Rebuild));
    assert!(surface.calls.contains(&SurfaceCall::ApplyTheme));
    assert_eq!(stored_document(&app).unwrap()["site"]["title"], "Química");
}

#[test]
fn test_import_invalid_json_keeps_document() {
    let app = create_test_app();
    let model = create_test_model(&[BlockType::Text]);
    let before = model.document.clone();
    let mut surface = RecordingSurface::new();

    let model = app.dispatch(model, Message::Import("{oops".to_string()), &mut surface);

    assert_eq!(model.document, before);
    assert_eq!(
        model.active_toast(),
        Some(("El archivo no es un JSON válido.", ToastLevel::Error))
    );
    assert!(stored_document(&app).is_none());
}

#[test]
fn test_import_drops_pending_attachments() {
    let mut model = create_test_model(&[BlockType::Image]);
    let ticket = model.begin_attach(0, PathBuf::from("a.png")).unwrap();
    let exported = model.export_json().unwrap();
    model.import_json(&exported).unwrap();
    assert!(!model.finish_attach(&ticket, "a.png", "data:image/png;base64,AA".to_string()));
}

#[test]
fn test_load_prefers_cache_and_reload_picks_up_changes() {
    let storage = MemoryStorage::new().with_entry(
        STORAGE_KEY,
        r#"{"site": {"title": "Desde caché"}, "sections": [{"blocks": [{"type": "callout"}]}]}"#,
    );
    let app = App::new(Box::new(storage));
    let (mut model, origin) = app.load(None);
    assert_eq!(origin, crate::storage::ContentOrigin::Cache);
    assert_eq!(model.document.site.title, "Desde caché");

    app.storage()
        .set(STORAGE_KEY, r#"{"site": {"title": "Actualizado"}}"#)
        .unwrap();
    let mut surface = RecordingSurface::new();
    app.reload(&mut model, &mut surface);

    assert_eq!(model.document.site.title, "Actualizado");
    assert!(surface.calls.contains(&SurfaceCall::Rebuild));
    assert!(surface.calls.contains(&SurfaceCall::RenderSite));
}

#[test]
fn test_reload_ignores_unreadable_cache() {
    let app = create_test_app();
    let (mut model, origin) = app.load(None);
    assert_eq!(origin, crate::storage::ContentOrigin::Seed);
    app.storage().set(STORAGE_KEY, "{broken").unwrap();
    let before = model.document.clone();
    let mut surface = RecordingSurface::new();
    app.reload(&mut model, &mut surface);
    assert_eq!(model.document, before);
    assert!(surface.calls.is_empty());
}
