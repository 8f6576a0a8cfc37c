//! Telegram bot front end.
//!
//! The webhook hands each [`Update`] to [`handle_update`], which answers
//! `/start` with a greeting and treats any other text as an address. The
//! answer is a photo of the map with the ranked list as its caption; if
//! the map cannot be rendered the caption alone is sent, so the ranking
//! is never lost.

use std::time::Duration;

use hydrant_map_geocoder::GeocodeFailure;
use hydrant_map_resolver::ResolveError;
use hydrant_map_server_models::telegram::{ApiResponse, Message, SendMessage, Update};
use reqwest::multipart;
use thiserror::Error;

use crate::AppState;

const API_BASE: &str = "https://api.telegram.org";

/// Greeting sent in reply to `/start`.
pub const GREETING: &str = "Привет, Тушила! Вводи адрес, и я покажу тебе ближайшие пожарные \
    гидранты. \n \nРаботаю я пока что только по району выезда 5 ПСЧ города Орла, потому что \
    гидранты только там в базе - да и то не все \n \nДа и вообще это тестовый бот, доработок \
    ещё много будет";

/// Follow-up hint sent [`HINT_DELAY`] after the greeting.
pub const HINT: &str = "К чёрту предисловие, вводи адрес, как будто ты вводишь его в \
    навигаторе. Город тоже уточнить не забудь )";

/// Delay between the greeting and the hint.
pub const HINT_DELAY: Duration = Duration::from_secs(10);

/// Reply when the geocoder found nothing for the text.
pub const NOT_FOUND_REPLY: &str = "Не удалось найти такой адрес. Проверь адрес и укажи город.";

/// Reply for every other failure.
pub const ERROR_REPLY: &str = "Ошибка. Проверь адрес или попробуй позже.";

/// Errors from Bot API calls.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// HTTP request failed. The request URL is stripped, since it carries
    /// the bot token.
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    /// The Bot API answered `ok: false`.
    #[error("Telegram API error: {description}")]
    Api {
        /// Error description from Telegram.
        description: String,
    },
}

impl From<reqwest::Error> for TelegramError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.without_url())
    }
}

/// Minimal Bot API client.
#[derive(Debug, Clone)]
pub struct TelegramClient {
    client: reqwest::Client,
    base_url: String,
}

impl TelegramClient {
    /// Creates a client for the bot identified by `token`.
    ///
    /// # Errors
    ///
    /// Returns [`TelegramError::Http`] if the HTTP client cannot be built.
    pub fn new(token: &str) -> Result<Self, TelegramError> {
        Self::with_api_base(token, API_BASE)
    }

    /// Creates a client that talks to a Bot API server at `api_base`
    /// instead of `api.telegram.org`.
    ///
    /// # Errors
    ///
    /// Returns [`TelegramError::Http`] if the HTTP client cannot be built.
    pub fn with_api_base(token: &str, api_base: &str) -> Result<Self, TelegramError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_url: format!("{}/bot{token}", api_base.trim_end_matches('/')),
        })
    }

    /// Sends a text message.
    ///
    /// # Errors
    ///
    /// Returns [`TelegramError`] if the request fails or Telegram rejects it.
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<&str>,
    ) -> Result<(), TelegramError> {
        let resp = self
            .client
            .post(format!("{}/sendMessage", self.base_url))
            .json(&SendMessage {
                chat_id,
                text,
                parse_mode,
            })
            .send()
            .await?;

        check(resp.json().await?)
    }

    /// Uploads a PNG straight from memory with a Markdown caption.
    ///
    /// # Errors
    ///
    /// Returns [`TelegramError`] if the request fails or Telegram rejects it.
    pub async fn send_photo(
        &self,
        chat_id: i64,
        png: Vec<u8>,
        caption: &str,
    ) -> Result<(), TelegramError> {
        let photo = multipart::Part::bytes(png)
            .file_name("map.png")
            .mime_str("image/png")?;
        let form = multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .text("parse_mode", "Markdown")
            .part("photo", photo);

        let resp = self
            .client
            .post(format!("{}/sendPhoto", self.base_url))
            .multipart(form)
            .send()
            .await?;

        check(resp.json().await?)
    }
}

fn check(response: ApiResponse) -> Result<(), TelegramError> {
    if response.ok {
        Ok(())
    } else {
        Err(TelegramError::Api {
            description: response
                .description
                .unwrap_or_else(|| "no description".to_string()),
        })
    }
}

/// What the bot should do with an incoming message.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Intent<'a> {
    Start,
    Resolve(&'a str),
}

fn intent(text: &str) -> Intent<'_> {
    let text = text.trim();
    // `/start` may arrive as `/start@BotName` or with a deep-link payload.
    let command = text.split_whitespace().next().unwrap_or_default();
    if command == "/start" || command.starts_with("/start@") {
        Intent::Start
    } else {
        Intent::Resolve(text)
    }
}

/// Reply text for a failed resolution.
#[must_use]
pub fn failure_reply(err: &ResolveError) -> &'static str {
    match err {
        ResolveError::Geocode(e) if e.reason() == GeocodeFailure::NotFound => NOT_FOUND_REPLY,
        ResolveError::Geocode(_) => ERROR_REPLY,
    }
}

fn log_message(message: &Message, text: &str) {
    let (id, username, name) = message.from.as_ref().map_or((0, "-", String::new()), |u| {
        (
            u.id,
            u.username.as_deref().unwrap_or("нет username"),
            format!("{} {}", u.first_name, u.last_name.as_deref().unwrap_or_default()),
        )
    });
    log::info!("ID: {id} (@{username}), Имя: {}, Текст: {text:?}", name.trim());
}

/// Handles one webhook update. Failures are logged, never returned: the
/// webhook always acknowledges the update so Telegram does not resend it.
pub async fn handle_update(state: &AppState, bot: &TelegramClient, update: Update) {
    let Some(message) = update.message else {
        log::debug!("Ignoring update {} without a message", update.update_id);
        return;
    };
    let Some(text) = message.text.as_deref() else {
        log::debug!("Ignoring non-text message {}", message.message_id);
        return;
    };
    let chat_id = message.chat.id;

    log_message(&message, text);

    match intent(text) {
        Intent::Start => {
            send_text(bot, chat_id, GREETING, None).await;

            let bot = bot.clone();
            actix_rt::spawn(async move {
                actix_rt::time::sleep(HINT_DELAY).await;
                send_text(&bot, chat_id, HINT, None).await;
            });
        }
        Intent::Resolve(address) => answer_address(state, bot, chat_id, address).await,
    }
}

async fn answer_address(state: &AppState, bot: &TelegramClient, chat_id: i64, address: &str) {
    let resolution = match state.pipeline.resolve(address).await {
        Ok(resolution) => resolution,
        Err(e) => {
            log::error!("Failed to resolve '{address}' for chat {chat_id}: {e}");
            send_text(bot, chat_id, failure_reply(&e), None).await;
            return;
        }
    };

    let caption = resolution.caption();

    if resolution.entries.is_empty() {
        send_text(bot, chat_id, &caption, None).await;
        return;
    }

    match state.renderer.render(&resolution.map_request).await {
        Ok(png) => {
            if let Err(e) = bot.send_photo(chat_id, png, &caption).await {
                log::error!("sendPhoto to chat {chat_id} failed: {e}");
                send_text(bot, chat_id, &caption, Some("Markdown")).await;
            }
        }
        Err(e) => {
            log::warn!("Map rendering failed for '{address}', sending text only: {e}");
            send_text(bot, chat_id, &caption, Some("Markdown")).await;
        }
    }
}

async fn send_text(bot: &TelegramClient, chat_id: i64, text: &str, parse_mode: Option<&str>) {
    if let Err(e) = bot.send_message(chat_id, text, parse_mode).await {
        log::error!("sendMessage to chat {chat_id} failed: {e}");
    }
}
