use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Sender, TrySendError};
use crossterm::event::{self, Event, KeyEventKind};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::api::ApiClient;
use crate::chat::{ChatEvent, ChatSession, ChatTransport};
use crate::render::RenderState;
use crate::tea::{update, Command, Message, Model, Screen};
use crate::{hlog_debug, hlog_error, Result};

const MAX_BG_MESSAGES: usize = 50;

/// Everything the logic thread needs besides the model.
struct Services {
    api: ApiClient,
    chat: ChatSession,
    msg_tx: mpsc::UnboundedSender<Message>,
}

pub struct LogicThread;

impl LogicThread {
    pub fn run(model: Model, state_tx: Sender<RenderState>, shutdown: Arc<AtomicBool>) -> Result<()> {
        Runtime::new()?.block_on(Self::run_async(model, state_tx, shutdown))
    }

    async fn run_async(
        mut model: Model,
        state_tx: Sender<RenderState>,
        shutdown: Arc<AtomicBool>,
    ) -> Result<()> {
        let api = ApiClient::from_config(&model.config)?;
        hlog_debug!(
            "LogicThread::run_async base_url={} screen={:?}",
            api.base_url(),
            model.screen
        );

        let (msg_tx, mut msg_rx) = mpsc::unbounded_channel::<Message>();
        let (chat_tx, mut chat_rx) = mpsc::unbounded_channel::<ChatEvent>();
        let transport: Arc<dyn ChatTransport> = Arc::new(api.clone());
        let chat = ChatSession::new(transport, chat_tx, model.config.chat.poll_interval())
            .with_fetch_timeout(model.config.request_timeout());
        let mut svc = Services { api, chat, msg_tx };

        if model.screen == Screen::Chat {
            if let Some((team_id, title)) = model.chat_target.clone() {
                execute_command(&mut model, Command::OpenChat { team_id, title }, &mut svc);
            }
        }

        model.dirty = true;
        flush_state(&state_tx, &mut model);

        loop {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }

            // Keyboard input (priority)
            while event::poll(Duration::ZERO)? {
                let msg = match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => Message::Key(key),
                    Event::Resize(w, h) => Message::Resize(w, h),
                    _ => continue,
                };
                if dispatch(&mut model, msg, &mut svc) {
                    shutdown.store(true, Ordering::Relaxed);
                    svc.chat.close();
                    return Ok(());
                }
                flush_state(&state_tx, &mut model);
            }

            // Chat events and command callbacks (bounded)
            for _ in 0..MAX_BG_MESSAGES {
                let msg = match chat_rx.try_recv() {
                    Ok(event) => Message::Chat(event),
                    Err(_) => match msg_rx.try_recv() {
                        Ok(msg) => msg,
                        Err(_) => break,
                    },
                };
                if dispatch(&mut model, msg, &mut svc) {
                    shutdown.store(true, Ordering::Relaxed);
                    svc.chat.close();
                    return Ok(());
                }
            }

            flush_state(&state_tx, &mut model);

            tokio::time::sleep(Duration::from_micros(500)).await;
        }

        svc.chat.close();
        Ok(())
    }
}

/// Run `update` and execute its commands. Returns true on quit.
fn dispatch(model: &mut Model, msg: Message, svc: &mut Services) -> bool {
    for cmd in update(model, msg) {
        if execute_command(model, cmd, svc) {
            return true;
        }
    }
    false
}

fn execute_command(model: &mut Model, cmd: Command, svc: &mut Services) -> bool {
    match cmd {
        Command::SubmitIdea(payload) => {
            hlog_debug!("Command::SubmitIdea title={:?}", payload.title);
            let api = svc.api.clone();
            let tx = svc.msg_tx.clone();
            tokio::spawn(async move {
                match api.submit_idea(&payload).await {
                    Ok(()) => {
                        let _ = tx.send(Message::IdeaSubmitted);
                    }
                    Err(e) => {
                        hlog_error!("Idea submit failed: {}", e);
                        let _ = tx.send(Message::IdeaSubmitFailed {
                            error: e.to_string(),
                            retryable: e.is_transport(),
                        });
                    }
                }
            });
        }

        Command::OpenChat { team_id, title } => {
            hlog_debug!("Command::OpenChat team={}", team_id);
            if let Err(e) = svc.chat.open(team_id, title) {
                let _ = svc.msg_tx.send(Message::ChatOpenFailed(e.to_string()));
            }
        }

        Command::CloseChat => {
            hlog_debug!("Command::CloseChat");
            svc.chat.close();
            model.dirty = true;
        }

        Command::SendChat(text) => {
            hlog_debug!("Command::SendChat len={}", text.len());
            if let Err(e) = svc.chat.send(&text) {
                let _ = svc.msg_tx.send(Message::ChatSendRejected(e.to_string()));
            }
        }

        Command::Quit => {
            hlog_debug!("Command::Quit");
            return true;
        }
    }

    false
}

/// Offer the newest snapshot to the render thread without blocking. While
/// the previous snapshot is still unread the model stays dirty, so the
/// newest state goes out on a later iteration instead of being lost.
fn flush_state(state_tx: &Sender<RenderState>, model: &mut Model) {
    if !model.dirty {
        return;
    }
    match state_tx.try_send(model.snapshot()) {
        Ok(()) | Err(TrySendError::Disconnected(_)) => model.dirty = false,
        Err(TrySendError::Full(_)) => {}
    }
}
