//! Telegram channel — long-polls the Bot API for updates.
//!
//! Updates are parsed into [`InboundEvent`]s here; callback data becomes a
//! typed [`Action`] or is dropped with a warning. Outbound render
//! instructions become sendMessage calls with an inline keyboard.

use std::pin::Pin;

use futures::Stream;

use crate::channels::{Action, EventKind, InboundEvent, RenderInstruction};
use crate::error::ChannelError;
use crate::session::model::UserId;

/// Maximum message length for Telegram's sendMessage API.
const TELEGRAM_MAX_MESSAGE_LENGTH: usize = 4096;

pub type EventStream = Pin<Box<dyn Stream<Item = InboundEvent> + Send>>;

/// Telegram channel — connects to the Bot API via long-polling.
pub struct TelegramChannel {
    bot_token: String,
    client: reqwest::Client,
}

impl TelegramChannel {
    pub fn new(bot_token: String) -> Self {
        Self {
            bot_token,
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{method}", self.bot_token)
    }

    /// Start long-polling and return the stream of inbound events.
    pub async fn listen(&self) -> Result<EventStream, ChannelError> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let bot_token = self.bot_token.clone();
        let client = self.client.clone();

        tokio::spawn(async move {
            let mut offset: i64 = 0;

            tracing::info!("Telegram channel listening for updates...");

            loop {
                let url = format!("https://api.telegram.org/bot{bot_token}/getUpdates");
                let body = serde_json::json!({
                    "offset": offset,
                    "timeout": 30,
                    "allowed_updates": ["message", "callback_query"]
                });

                let resp = match client.post(&url).json(&body).send().await {
                    Ok(r) => r,
                    Err(e) => {
                        tracing::warn!("Telegram poll error: {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                        continue;
                    }
                };

                let data: serde_json::Value = match resp.json().await {
                    Ok(d) => d,
                    Err(e) => {
                        tracing::warn!("Telegram parse error: {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                        continue;
                    }
                };

                if let Some(results) = data.get("result").and_then(serde_json::Value::as_array) {
                    for update in results {
                        if let Some(uid) =
                            update.get("update_id").and_then(serde_json::Value::as_i64)
                        {
                            offset = uid + 1;
                        }

                        // Clear the button spinner regardless of what the
                        // callback parses into.
                        if let Some(cq_id) = update
                            .pointer("/callback_query/id")
                            .and_then(serde_json::Value::as_str)
                        {
                            let ack = serde_json::json!({"callback_query_id": cq_id});
                            let url = format!(
                                "https://api.telegram.org/bot{bot_token}/answerCallbackQuery"
                            );
                            let client = client.clone();
                            tokio::spawn(async move {
                                let _ = client.post(&url).json(&ack).send().await;
                            });
                        }

                        let Some(event) = event_from_update(update) else {
                            continue;
                        };

                        if tx.send(event).is_err() {
                            tracing::info!("Telegram listener channel closed");
                            return;
                        }
                    }
                }
            }
        });

        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        });

        Ok(Box::pin(stream))
    }

    /// Send a render instruction to a user's private chat.
    ///
    /// Splits long texts at Telegram's 4096 char limit; the inline keyboard
    /// rides on the last chunk so the buttons sit under the full message.
    pub async fn send(
        &self,
        user_id: UserId,
        instruction: &RenderInstruction,
    ) -> Result<(), ChannelError> {
        let chunks = split_message(&instruction.text, TELEGRAM_MAX_MESSAGE_LENGTH);
        let keyboard = keyboard_json(instruction);

        for (i, chunk) in chunks.iter().enumerate() {
            let markup = if i + 1 == chunks.len() {
                keyboard.clone()
            } else {
                None
            };
            self.send_chunk(user_id, chunk, markup).await?;
        }
        Ok(())
    }

    /// Send a single chunk, Markdown-first with plain-text fallback.
    async fn send_chunk(
        &self,
        user_id: UserId,
        text: &str,
        reply_markup: Option<serde_json::Value>,
    ) -> Result<(), ChannelError> {
        let mut markdown_body = serde_json::json!({
            "chat_id": user_id,
            "text": text,
            "parse_mode": "Markdown"
        });
        if let Some(ref markup) = reply_markup {
            markdown_body["reply_markup"] = markup.clone();
        }

        let markdown_resp = self
            .client
            .post(self.api_url("sendMessage"))
            .json(&markdown_body)
            .send()
            .await
            .map_err(|e| ChannelError::SendFailed {
                name: "telegram".into(),
                reason: e.to_string(),
            })?;

        if markdown_resp.status().is_success() {
            return Ok(());
        }

        let markdown_status = markdown_resp.status();
        tracing::warn!(
            status = ?markdown_status,
            "Telegram sendMessage with Markdown failed; retrying without parse_mode"
        );

        let mut plain_body = serde_json::json!({
            "chat_id": user_id,
            "text": text,
        });
        if let Some(markup) = reply_markup {
            plain_body["reply_markup"] = markup;
        }
        let plain_resp = self
            .client
            .post(self.api_url("sendMessage"))
            .json(&plain_body)
            .send()
            .await
            .map_err(|e| ChannelError::SendFailed {
                name: "telegram".into(),
                reason: e.to_string(),
            })?;

        if !plain_resp.status().is_success() {
            let plain_err = plain_resp.text().await.unwrap_or_default();
            return Err(ChannelError::SendFailed {
                name: "telegram".into(),
                reason: format!(
                    "sendMessage failed (markdown: {markdown_status}, plain: {plain_err})"
                ),
            });
        }

        Ok(())
    }

    /// Verify the token against getMe.
    pub async fn health_check(&self) -> Result<(), ChannelError> {
        let resp = self
            .client
            .get(self.api_url("getMe"))
            .send()
            .await
            .map_err(|e| ChannelError::Http(e.to_string()))?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ChannelError::Http(format!("getMe returned {}", resp.status())))
        }
    }
}

// ── Update parsing ──────────────────────────────────────────────────

/// Parse one Bot API update into an inbound event. `None` for anything the
/// bot doesn't handle (edits, unknown callback data, media types).
fn event_from_update(update: &serde_json::Value) -> Option<InboundEvent> {
    if let Some(callback) = update.get("callback_query") {
        let user_id = callback.pointer("/from/id").and_then(serde_json::Value::as_i64)?;
        let data = callback.get("data").and_then(serde_json::Value::as_str)?;
        let Some(action) = Action::parse(data) else {
            tracing::warn!(user_id, data, "unparseable callback data");
            return None;
        };
        return Some(InboundEvent {
            user_id,
            kind: EventKind::MenuChoice(action),
        });
    }

    let message = update.get("message")?;
    let user_id = message.pointer("/from/id").and_then(serde_json::Value::as_i64)?;

    if let Some(text) = message.get("text").and_then(serde_json::Value::as_str) {
        let kind = match text.strip_prefix('/') {
            Some(command) => {
                // "/start@mybot extra" → "start"
                let command = command
                    .split_whitespace()
                    .next()
                    .unwrap_or_default()
                    .split('@')
                    .next()
                    .unwrap_or_default();
                EventKind::Command(command.to_string())
            }
            None => EventKind::FreeText(text.to_string()),
        };
        return Some(InboundEvent { user_id, kind });
    }

    if let Some(location) = message.get("location") {
        let lat = location.get("latitude").and_then(serde_json::Value::as_f64)?;
        let lon = location.get("longitude").and_then(serde_json::Value::as_f64)?;
        return Some(InboundEvent {
            user_id,
            kind: EventKind::Location { lat, lon },
        });
    }

    if let Some(photos) = message.get("photo").and_then(serde_json::Value::as_array) {
        // Telegram sends several sizes; the last is the largest.
        let file_id = photos
            .last()
            .and_then(|p| p.get("file_id"))
            .and_then(serde_json::Value::as_str)?;
        return Some(InboundEvent {
            user_id,
            kind: EventKind::Photo(file_id.to_string()),
        });
    }

    None
}

/// Inline keyboard markup for an instruction, one button per row.
fn keyboard_json(instruction: &RenderInstruction) -> Option<serde_json::Value> {
    if instruction.choices.is_empty() {
        return None;
    }
    let rows: Vec<serde_json::Value> = instruction
        .choices
        .iter()
        .map(|choice| {
            serde_json::json!([{
                "text": choice.label,
                "callback_data": choice.action.encode(),
            }])
        })
        .collect();
    Some(serde_json::json!({ "inline_keyboard": rows }))
}

/// Split a message into chunks that fit Telegram's character limit.
/// Tries to split on newlines, then spaces, then hard-cuts.
///
/// The limit counts chars, not bytes, and every cut lands on a char
/// boundary so multibyte text (emoji, "₽", Cyrillic) never splits
/// mid-character.
fn split_message(text: &str, max_len: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut remaining = text;

    loop {
        // Byte offset of the first char past the limit, if any.
        let window_end = match remaining.char_indices().nth(max_len) {
            Some((offset, _)) => offset,
            None => {
                chunks.push(remaining.to_string());
                break;
            }
        };

        let window = &remaining[..window_end];
        let split_at = window
            .rfind('\n')
            .or_else(|| window.rfind(' '))
            // Don't split at position 0 (infinite loop guard)
            .filter(|&at| at > 0)
            .unwrap_or(window_end);

        chunks.push(remaining[..split_at].to_string());
        remaining = remaining[split_at..].trim_start();
        if remaining.is_empty() {
            break;
        }
    }

    chunks
}
