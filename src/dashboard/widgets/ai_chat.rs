use super::{Widget, WidgetEvent};
use crate::api::ApiError;
use crate::dashboard::dashboard::DashboardContext;
use eframe::egui;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;

pub const AI_CHAT_HISTORY_FILE: &str = "ai_chat_history.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

pub fn load_history(path: impl AsRef<Path>) -> anyhow::Result<Vec<ChatMessage>> {
    let content = std::fs::read_to_string(path).unwrap_or_default();
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(&content)?)
}

pub fn save_history(path: impl AsRef<Path>, messages: &[ChatMessage]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(messages)?;
    std::fs::write(path, json)?;
    Ok(())
}

enum StreamEvent {
    Chunk(String),
    Done(Option<String>),
}

/// Chat box streaming replies from the AI endpoint; the transcript is kept on
/// disk so the conversation survives restarts.
pub struct AiChatWidget {
    history_path: PathBuf,
    messages: Vec<ChatMessage>,
    input: String,
    stream: Option<Receiver<StreamEvent>>,
    pending: String,
    last_error: Option<String>,
}

impl AiChatWidget {
    pub fn new(data_dir: &Path) -> Self {
        let history_path = data_dir.join(AI_CHAT_HISTORY_FILE);
        let messages = load_history(&history_path).unwrap_or_default();
        Self {
            history_path,
            messages,
            input: String::new(),
            stream: None,
            pending: String::new(),
            last_error: None,
        }
    }

    fn save(&self) {
        if let Err(e) = save_history(&self.history_path, &self.messages) {
            tracing::warn!("failed to save chat history: {e}");
        }
    }

    fn send(&mut self, ui: &egui::Ui, ctx: &DashboardContext<'_>) {
        let message = self.input.trim().to_string();
        if message.is_empty() || self.stream.is_some() {
            return;
        }
        self.input.clear();
        self.last_error = None;
        self.messages.push(ChatMessage {
            role: ChatRole::User,
            text: message.clone(),
        });
        self.save();

        let (tx, rx) = channel();
        self.stream = Some(rx);
        self.pending.clear();

        let api = Arc::clone(ctx.api);
        let data = Arc::clone(ctx.data);
        let provider = ctx.ai_provider.to_string();
        let egui_ctx = ui.ctx().clone();
        std::thread::spawn(move || {
            let chunk_tx = tx.clone();
            let chunk_ctx = egui_ctx.clone();
            let result = api.stream_ai_message(&message, &provider, move |chunk| {
                let _ = chunk_tx.send(StreamEvent::Chunk(chunk.to_string()));
                chunk_ctx.request_repaint();
            });
            let error = match result {
                Ok(_) => None,
                Err(ApiError::Unauthorized) => {
                    data.mark_auth_expired();
                    Some("authentication expired".to_string())
                }
                Err(e) => Some(e.to_string()),
            };
            let _ = tx.send(StreamEvent::Done(error));
            egui_ctx.request_repaint();
        });
    }

    fn drain_stream(&mut self) {
        let Some(rx) = &self.stream else {
            return;
        };
        let mut finished = None;
        while let Ok(event) = rx.try_recv() {
            match event {
                StreamEvent::Chunk(chunk) => self.pending.push_str(&chunk),
                StreamEvent::Done(error) => {
                    finished = Some(error);
                    break;
                }
            }
        }
        if let Some(error) = finished {
            if !self.pending.is_empty() {
                self.messages.push(ChatMessage {
                    role: ChatRole::Assistant,
                    text: std::mem::take(&mut self.pending),
                });
                self.save();
            }
            self.last_error = error;
            self.stream = None;
        }
    }
}

impl Widget for AiChatWidget {
    fn render(&mut self, ui: &mut egui::Ui, ctx: &DashboardContext<'_>) -> Option<WidgetEvent> {
        self.drain_stream();

        ui.horizontal(|ui| {
            ui.strong("AI Chat");
            ui.weak(ctx.ai_provider);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if !self.messages.is_empty() && ui.small_button("Clear").clicked() {
                    self.messages.clear();
                    self.save();
                }
            });
        });

        if let Some(err) = &self.last_error {
            ui.colored_label(ui.visuals().error_fg_color, err);
        }

        egui::ScrollArea::vertical()
            .id_source(("ai-chat-log", &self.history_path))
            .max_height(160.0)
            .auto_shrink([false, true])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for message in &self.messages {
                    let prefix = match message.role {
                        ChatRole::User => "You",
                        ChatRole::Assistant => "AI",
                    };
                    ui.label(format!("{prefix}: {}", message.text));
                }
                if self.stream.is_some() {
                    if self.pending.is_empty() {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.weak("Thinking…");
                        });
                    } else {
                        ui.label(format!("AI: {}", self.pending));
                    }
                }
            });

        let streaming = self.stream.is_some();
        let mut submit = false;
        ui.horizontal(|ui| {
            let edit = ui.add_enabled(
                !streaming,
                egui::TextEdit::singleline(&mut self.input).hint_text("Ask something"),
            );
            if edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                submit = true;
            }
            if ui
                .add_enabled(!streaming, egui::Button::new("Send"))
                .clicked()
            {
                submit = true;
            }
        });
        if submit {
            self.send(ui, ctx);
        }
        None
    }
}
