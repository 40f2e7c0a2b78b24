use std::{path::Path, time::Duration};

use client_core::{ImageSelection, StoryState};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::{SelectionId, StorySegment};

use crate::{
    backend_bridge::commands::BackendCommand,
    controller::{
        events::UiEvent,
        orchestration::{request_description, request_narration, request_story},
        reducer::{apply_ui_event, Effect},
    },
    ui::widgets::{load_texture, ILLUSTRATION_MAX_DIMENSION, PREVIEW_MAX_DIMENSION},
};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];
const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(220, 80, 80);
const ACCENT_COLOR: egui::Color32 = egui::Color32::from_rgb(236, 178, 74);

pub struct ImageTalesApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    state: StoryState,
    backend_url: String,
    status: String,
    /// Problems outside the story pipeline, e.g. an unreadable file.
    notice: Option<String>,
    /// Decoded preview, valid while its id matches the state's preview.
    preview_texture: Option<(SelectionId, Option<egui::TextureHandle>)>,
    illustrations: Vec<Option<egui::TextureHandle>>,
}

impl ImageTalesApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        backend_url: String,
    ) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            state: StoryState::new(),
            backend_url,
            status: "Starting backend worker...".to_string(),
            notice: None,
            preview_texture: None,
            illustrations: Vec::new(),
        }
    }

    fn process_ui_events(&mut self, ctx: &egui::Context) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match apply_ui_event(&mut self.state, event) {
                Effect::Nothing => {}
                Effect::Status(message) => self.status = message,
                Effect::StoryInstalled => {
                    self.load_illustrations(ctx);
                    self.status = "Story ready".to_string();
                }
                Effect::WorkerDown(message) => {
                    self.status = "Backend worker unavailable".to_string();
                    self.notice = Some(message);
                }
            }
        }
    }

    fn pick_image(&mut self, ctx: &egui::Context) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_file()
        else {
            return;
        };
        self.select_image_from(ctx, &path);
    }

    fn select_image_from(&mut self, ctx: &egui::Context, path: &Path) {
        let image = match ImageSelection::from_path(path) {
            Ok(image) => image,
            Err(err) => {
                self.notice = Some(err.to_string());
                return;
            }
        };
        self.state.select_image(image);
        self.sync_preview(ctx);
        self.illustrations.clear();
        self.notice = None;
    }

    fn sync_preview(&mut self, ctx: &egui::Context) {
        let Some(preview) = self.state.preview() else {
            self.preview_texture = None;
            return;
        };
        if matches!(&self.preview_texture, Some((id, _)) if *id == preview.selection_id) {
            return;
        }
        let selection_id = preview.selection_id;
        self.status = format!("Selected {}", preview.file_name);
        let texture = self.state.selection().and_then(|image| {
            load_texture(
                ctx,
                format!("preview:{}", selection_id.0),
                image.bytes(),
                PREVIEW_MAX_DIMENSION,
            )
        });
        self.preview_texture = Some((selection_id, texture));
    }

    fn load_illustrations(&mut self, ctx: &egui::Context) {
        self.illustrations = match self.state.story() {
            Some(story) => story
                .segments()
                .iter()
                .map(|segment| {
                    let image = segment.image.as_ref()?;
                    let bytes = match image.decode() {
                        Ok(bytes) => bytes,
                        Err(err) => {
                            tracing::warn!(segment = segment.position.0, "{err}");
                            return None;
                        }
                    };
                    load_texture(
                        ctx,
                        format!("segment:{}", segment.position.0),
                        &bytes,
                        ILLUSTRATION_MAX_DIMENSION,
                    )
                })
                .collect(),
            None => Vec::new(),
        };
    }

    fn show_header(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("app_header")
            .resizable(false)
            .show(ctx, |ui| {
                ui.add_space(6.0);
                ui.vertical_centered(|ui| {
                    ui.heading(egui::RichText::new("ImageTales").strong());
                    ui.label(
                        egui::RichText::new("Uncover the Magic Hidden in Every Moment")
                            .italics()
                            .color(ACCENT_COLOR),
                    );
                });
                ui.add_space(6.0);
            });
    }

    fn show_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.small(self.status.as_str());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.small(format!("backend: {}", self.backend_url));
                    });
                });
            });
    }

    fn show_control_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("control_panel")
            .resizable(false)
            .exact_width(PREVIEW_MAX_DIMENSION as f32 + 24.0)
            .show(ctx, |ui| {
                ui.add_space(8.0);
                let upload_label = if self.state.selection().is_some() {
                    "Change Image"
                } else {
                    "Upload Image"
                };
                if ui.button(upload_label).clicked() {
                    self.pick_image(ui.ctx());
                }

                if let Some((_, texture)) = &self.preview_texture {
                    ui.add_space(8.0);
                    match texture {
                        Some(texture) => {
                            ui.add(egui::Image::new(texture).max_size(egui::vec2(
                                PREVIEW_MAX_DIMENSION as f32,
                                PREVIEW_MAX_DIMENSION as f32,
                            )));
                        }
                        None => {
                            ui.label("Preview not available.");
                        }
                    }
                }

                ui.add_space(12.0);
                ui.separator();
                self.show_action_buttons(ui);

                if let Some(notice) = &self.notice {
                    ui.add_space(8.0);
                    ui.colored_label(ERROR_COLOR, notice.as_str());
                }
                if let Some(error) = self.state.error() {
                    ui.add_space(8.0);
                    ui.colored_label(ERROR_COLOR, error);
                }
                if let Some(progress) = self.state.status().progress_text() {
                    ui.add_space(8.0);
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label(progress);
                    });
                }
            });
    }

    fn show_action_buttons(&mut self, ui: &mut egui::Ui) {
        let in_flight = self.state.in_flight();

        let describe_label = if in_flight.describing {
            "Generating..."
        } else {
            "Generate Scenario"
        };
        if ui
            .add_enabled(self.state.can_describe(), egui::Button::new(describe_label))
            .clicked()
        {
            request_description(&mut self.state, &self.cmd_tx);
        }

        let story_label = if in_flight.generating {
            "Generating..."
        } else {
            "Generate Story"
        };
        if ui
            .add_enabled(
                self.state.can_generate_story(),
                egui::Button::new(story_label),
            )
            .clicked()
        {
            request_story(&mut self.state, &self.cmd_tx);
        }

        let can_play = self.state.can_narrate() && !in_flight.loading();
        if ui
            .add_enabled(can_play, egui::Button::new("🔊 Play Story"))
            .on_hover_text("Play story audio")
            .clicked()
        {
            request_narration(&mut self.state, &self.cmd_tx);
        }
    }

    fn show_story_panel(&self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                if let Some(description) = self.state.description() {
                    ui.heading("STORY SCENARIO");
                    egui::Frame::group(ui.style()).show(ui, |ui| {
                        ui.label(description);
                    });
                    ui.add_space(16.0);
                }

                let Some(story) = self.state.story() else {
                    if self.state.description().is_none() {
                        ui.label("Upload an image and generate a scenario to begin.");
                    }
                    return;
                };
                ui.heading("GENERATED VISUAL STORY");
                for (index, segment) in story.segments().iter().enumerate() {
                    ui.add_space(8.0);
                    egui::Frame::group(ui.style()).show(ui, |ui| {
                        self.show_segment(ui, index, segment);
                    });
                }
            });
        });
    }

    /// Odd segments mirror the layout so text and pictures alternate sides.
    fn show_segment(&self, ui: &mut egui::Ui, index: usize, segment: &StorySegment) {
        let (image_column, text_column) = if index % 2 == 1 { (1, 0) } else { (0, 1) };
        let illustration = self.illustrations.get(index).and_then(Option::as_ref);
        ui.columns(2, |columns| {
            let image_ui = &mut columns[image_column];
            match (illustration, &segment.image) {
                (Some(texture), _) => {
                    image_ui.add(egui::Image::new(texture).max_size(egui::vec2(
                        ILLUSTRATION_MAX_DIMENSION as f32,
                        ILLUSTRATION_MAX_DIMENSION as f32,
                    )));
                }
                (None, Some(_)) => {
                    image_ui.label(format!("Story scene {} could not be displayed.", index + 1));
                }
                (None, None) => {}
            }

            let text_ui = &mut columns[text_column];
            text_ui.label(segment.paragraph.as_str());
            text_ui.add_space(6.0);
            text_ui.label(egui::RichText::new("Scene Description:").strong());
            text_ui.label(egui::RichText::new(segment.description.as_str()).italics());
        });
    }
}

impl eframe::App for ImageTalesApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events(ctx);
        self.sync_preview(ctx);

        self.show_header(ctx);
        self.show_status_bar(ctx);
        self.show_control_panel(ctx);
        self.show_story_panel(ctx);

        if self.state.in_flight().any() {
            ctx.request_repaint_after(Duration::from_millis(16));
        } else {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
