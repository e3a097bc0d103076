//! Main Application
//!
//! Owns the [`ChatWidget`], feeds it terminal events and proxy replies, and
//! draws the card scene plus chat overlay every frame.

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::Terminal;
use tokio::sync::mpsc;

use lanyard_core::{ChatWidget, LanyardConfig, OutboundQuery, SceneRenderer};

use crate::card::CardRenderer;
use crate::proxy_client::{ProxyClient, ReplyEvent};
use crate::view;

/// Idle frame interval
const FRAME_DURATION: Duration = Duration::from_millis(100);

/// Lines moved per PageUp/PageDown
const SCROLL_STEP: usize = 5;

/// Frames per typing-cursor blink phase
const BLINK_FRAMES: u64 = 5;

/// Hint shown when nothing else is on the status line
const IDLE_HINT: &str = "Tab: chat · p: portfolio · Esc: quit";

/// Main application state
pub struct App {
    widget: ChatWidget,
    client: ProxyClient,
    replies_tx: mpsc::UnboundedSender<ReplyEvent>,
    replies_rx: mpsc::UnboundedReceiver<ReplyEvent>,
    card: CardRenderer,
    /// Lines scrolled up from the newest message
    scroll_offset: usize,
    last_revision: u64,
    running: bool,
    size: (u16, u16),
    cell_width_px: u32,
    portfolio_url: String,
    status: Option<String>,
    frame: u64,
}

impl App {
    /// Create the app for a terminal of `size` (columns, rows)
    ///
    /// # Errors
    ///
    /// Fails if the proxy client cannot be built.
    pub fn new(config: &LanyardConfig, size: (u16, u16)) -> anyhow::Result<Self> {
        // A hung request would hold every later reply, so the client gives up
        let client = ProxyClient::new(&config.proxy_url, config.request_timeout)?;
        let (replies_tx, replies_rx) = mpsc::unbounded_channel();
        let widget = ChatWidget::new(config.widget());
        let last_revision = widget.revision();

        let mut app = Self {
            widget,
            client,
            replies_tx,
            replies_rx,
            card: CardRenderer::new(),
            scroll_offset: 0,
            last_revision,
            running: true,
            size,
            cell_width_px: config.cell_width_px.max(1),
            portfolio_url: config.portfolio_url.clone(),
            status: None,
            frame: 0,
        };
        app.handle_resize(size.0, size.1);
        Ok(app)
    }

    /// The chat state
    #[must_use]
    pub fn widget(&self) -> &ChatWidget {
        &self.widget
    }

    /// Whether the loop should keep going
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current status line text, if any
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Main event loop
    ///
    /// # Errors
    ///
    /// Fails if drawing to the terminal fails.
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        let mut event_stream = EventStream::new();

        self.render(terminal)?;

        while self.running {
            let wait = self.next_wake(Instant::now());

            tokio::select! {
                biased;

                maybe_event = event_stream.next() => {
                    match maybe_event {
                        // Only handle Press events (not Release or Repeat)
                        Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                            self.handle_key(key);
                        }
                        Some(Ok(Event::Resize(w, h))) => self.handle_resize(w, h),
                        Some(Ok(_)) => {}
                        Some(Err(e)) => tracing::warn!(error = %e, "Terminal event error"),
                        None => self.running = false,
                    }
                }

                Some(reply) = self.replies_rx.recv() => self.apply_reply(reply),

                () = tokio::time::sleep(wait) => {}
            }

            self.update(Instant::now());
            self.render(terminal)?;
        }

        self.widget.teardown();
        Ok(())
    }

    /// Time until the next reveal step or frame, whichever is sooner
    fn next_wake(&self, now: Instant) -> Duration {
        self.widget
            .next_reveal_deadline()
            .map_or(FRAME_DURATION, |deadline| {
                deadline.saturating_duration_since(now).min(FRAME_DURATION)
            })
    }

    /// Handle keyboard input
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.running = false;
            return;
        }

        match key.code {
            KeyCode::Esc => {
                if self.widget.chat_mode() {
                    self.set_chat_mode(false);
                } else {
                    self.running = false;
                }
            }
            KeyCode::Tab => self.set_chat_mode(!self.widget.chat_mode()),
            _ if self.widget.chat_mode() => self.handle_chat_key(key),
            KeyCode::Char('p') => {
                self.status = Some(format!("Portfolio: {}", self.portfolio_url));
            }
            KeyCode::Char('t') | KeyCode::Enter => self.set_chat_mode(true),
            KeyCode::Char('q') => self.running = false,
            _ => {}
        }
    }

    fn handle_chat_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                // Alt+Enter for terminals that cannot report Shift+Enter
                let newline = key
                    .modifiers
                    .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT);
                if let Some(query) = self.widget.handle_enter(newline) {
                    self.dispatch(query);
                }
            }
            KeyCode::Backspace => self.widget.pop_char(),
            KeyCode::PageUp => self.scroll_offset = self.scroll_offset.saturating_add(SCROLL_STEP),
            KeyCode::PageDown => {
                self.scroll_offset = self.scroll_offset.saturating_sub(SCROLL_STEP);
            }
            KeyCode::Char(c) => self.widget.push_char(c),
            _ => {}
        }
    }

    fn dispatch(&mut self, query: OutboundQuery) {
        tracing::debug!(token = %query.token, "Sending chat query");
        self.widget.mark_sent(query.token);
        self.client.spawn(query, self.replies_tx.clone());
        self.status = None;
    }

    /// Hand a proxy reply to the widget
    pub fn apply_reply(&mut self, reply: ReplyEvent) {
        let started = self
            .widget
            .on_reply(reply.token, reply.outcome, Instant::now());
        if !started.is_empty() {
            tracing::debug!(count = started.len(), "Replies started revealing");
        }
    }

    fn set_chat_mode(&mut self, open: bool) {
        if open {
            self.widget.open_chat();
        } else {
            self.widget.close_chat();
        }
        self.scroll_offset = 0;
        self.card.render(&self.widget.scene());
    }

    /// Recompute the layout for a new terminal size
    pub fn handle_resize(&mut self, cols: u16, rows: u16) {
        self.size = (cols, rows);
        let width = u32::from(cols) * self.cell_width_px;
        // Cells are roughly twice as tall as wide
        let height = u32::from(rows) * self.cell_width_px * 2;
        let layout = self.widget.resize(width, height);
        tracing::debug!(width, height, mobile = layout.is_mobile, "Viewport resized");
        self.card.render(&self.widget.scene());
    }

    /// Advance reveals and animation
    pub fn update(&mut self, now: Instant) {
        self.widget.tick(now);
        self.card.tick();
        self.frame = self.frame.wrapping_add(1);

        // New content snaps the view back to the bottom
        let revision = self.widget.revision();
        if revision != self.last_revision {
            self.last_revision = revision;
            self.scroll_offset = 0;
        }
    }

    fn render(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> anyhow::Result<()> {
        terminal.draw(|frame| {
            let area = frame.area();
            self.draw(area, frame.buffer_mut());
        })?;
        Ok(())
    }

    /// Draw one frame into `buf`
    pub fn draw(&mut self, area: Rect, buf: &mut Buffer) {
        if area.height < 2 {
            return;
        }
        let main = Rect::new(area.x, area.y, area.width, area.height - 1);
        let status = Rect::new(area.x, area.bottom() - 1, area.width, 1);

        let layout = self.widget.layout();
        let chat_mode = self.widget.chat_mode();
        let cursor_on = (self.frame / BLINK_FRAMES) % 2 == 0;

        if layout.split_view(chat_mode) {
            let scene_width = main.width / 2;
            let scene = Rect::new(main.x, main.y, scene_width, main.height);
            let chat = Rect::new(
                main.x + scene_width,
                main.y,
                main.width - scene_width,
                main.height,
            );
            self.card.draw(scene, buf);
            view::render_chat(chat, buf, &self.widget, &mut self.scroll_offset, cursor_on);
        } else if chat_mode {
            view::render_chat(main, buf, &self.widget, &mut self.scroll_offset, cursor_on);
        } else {
            self.card.draw(main, buf);
            if main.height > 2 {
                let actions = Rect::new(main.x, main.bottom() - 2, main.width, 1);
                view::render_actions(actions, buf);
            }
        }

        let text = self.status.as_deref().unwrap_or(IDLE_HINT);
        view::render_status(status, buf, text);
    }
}
