//! Terminal UI rendering for the ideahub TUI.
//!
//! Minimal chrome: whitespace as structure, grayscale plus one accent for
//! focus, no box drawing. Renders from [`RenderState`] (an immutable
//! snapshot) and never mutates application state.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::render::{ChatView, FieldView, RenderState, WizardView};
use crate::tea::{Notification, NotificationLevel, Screen};
use crate::wizard::{CounterLevel, Preview, StepMarker, MAX_TAGS};

const COLOR_TEXT_DIMMED: Color = Color::Gray;
const COLOR_TEXT_MUTED: Color = Color::DarkGray;
const COLOR_SEPARATOR: Color = Color::White;
const COLOR_ACCENT: Color = Color::Magenta;

const COLOR_STEP_COMPLETED: Color = Color::Green;
const COLOR_STEP_ACTIVE: Color = Color::Cyan;
const COLOR_STEP_PENDING: Color = Color::DarkGray;

const COLOR_COUNTER_WARNING: Color = Color::Yellow;
const COLOR_COUNTER_DANGER: Color = Color::Red;

const STEP_TITLES: [&str; 4] = ["Basics", "Problem & Solution", "Details", "Review"];

/// Which keybindings the status bar shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeymapContext {
    WizardEditing,
    WizardReview { submitting: bool },
    ChatOpen,
    ChatClosed,
}

impl KeymapContext {
    pub fn from_render_state(state: &RenderState) -> Self {
        match state.screen {
            Screen::Wizard if state.wizard.preview.is_some() => KeymapContext::WizardReview {
                submitting: state.wizard.submitting,
            },
            Screen::Wizard => KeymapContext::WizardEditing,
            Screen::Chat if state.chat.is_some() => KeymapContext::ChatOpen,
            Screen::Chat => KeymapContext::ChatClosed,
        }
    }
}

struct Keybinding(&'static str, &'static str);

struct KeybindingGroup(Vec<Keybinding>);

fn keybindings_for_context(ctx: KeymapContext) -> Vec<KeybindingGroup> {
    match ctx {
        KeymapContext::WizardEditing => vec![
            KeybindingGroup(vec![
                Keybinding("Tab", "next field"),
                Keybinding("←/→", "choose"),
            ]),
            KeybindingGroup(vec![
                Keybinding("^N", "next"),
                Keybinding("^P", "back"),
                Keybinding("F1-F4", "step"),
            ]),
            KeybindingGroup(vec![Keybinding("Esc", "quit")]),
        ],
        KeymapContext::WizardReview { submitting: true } => {
            vec![KeybindingGroup(vec![Keybinding("", "Submitting...")])]
        }
        KeymapContext::WizardReview { submitting: false } => vec![
            KeybindingGroup(vec![Keybinding("Enter", "submit"), Keybinding("^P", "back")]),
            KeybindingGroup(vec![Keybinding("Esc", "quit")]),
        ],
        KeymapContext::ChatOpen => vec![KeybindingGroup(vec![
            Keybinding("Enter", "send"),
            Keybinding("Esc", "close"),
        ])],
        KeymapContext::ChatClosed => vec![KeybindingGroup(vec![
            Keybinding("o", "open"),
            Keybinding("q", "quit"),
        ])],
    }
}

/// Main render function - entry point for all UI drawing.
pub fn draw(frame: &mut Frame, state: &RenderState) {
    let area = frame.area();
    if area.height < 3 {
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .split(area);

    match state.screen {
        Screen::Wizard => render_wizard(frame, &state.wizard, chunks[0]),
        Screen::Chat => match state.chat.as_ref() {
            Some(chat) => render_chat(frame, chat, chunks[0]),
            None => render_chat_closed(frame, state.chat_target.as_deref(), chunks[0]),
        },
    }
    render_separator(frame, chunks[1]);
    render_statusbar(frame, state, chunks[2]);

    if let Some(ref notification) = state.notification {
        render_notification(frame, notification, area);
    }
}

fn render_separator(frame: &mut Frame, area: Rect) {
    let solid = "─".repeat(area.width as usize);
    let line = Line::from(Span::styled(solid, Style::default().fg(COLOR_SEPARATOR)));
    frame.render_widget(Paragraph::new(line), area);
}

fn render_statusbar(frame: &mut Frame, state: &RenderState, area: Rect) {
    let groups = keybindings_for_context(KeymapContext::from_render_state(state));
    frame.render_widget(Paragraph::new(keymap_line(&groups)), area);
}

fn keymap_line(groups: &[KeybindingGroup]) -> Line<'static> {
    let key_style = Style::default().fg(COLOR_TEXT_DIMMED);
    let desc_style = Style::default().fg(COLOR_TEXT_MUTED);

    let mut spans: Vec<Span> = Vec::new();
    for group in groups.iter().filter(|g| !g.0.is_empty()) {
        if !spans.is_empty() {
            spans.push(Span::styled(" │ ", desc_style));
        }
        for (idx, keybinding) in group.0.iter().enumerate() {
            if idx > 0 {
                spans.push(Span::styled(" • ", desc_style));
            }
            if !keybinding.0.is_empty() {
                spans.push(Span::styled(keybinding.0, key_style));
                spans.push(Span::styled(" ", desc_style));
            }
            spans.push(Span::styled(keybinding.1, desc_style));
        }
    }
    Line::from(spans)
}

// -----------------------------------------------------------------------------
// Wizard
// -----------------------------------------------------------------------------

fn render_wizard(frame: &mut Frame, wizard: &WizardView, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .split(area);

    frame.render_widget(Paragraph::new(step_indicator_line(wizard)), chunks[0]);

    let ratio = if wizard.total_steps == 0 {
        0.0
    } else {
        wizard.current_step as f64 / wizard.total_steps as f64
    };
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(COLOR_STEP_ACTIVE).bg(Color::Reset))
        .ratio(ratio.clamp(0.0, 1.0))
        .label(format!(
            "Step {} of {}",
            wizard.current_step, wizard.total_steps
        ));
    frame.render_widget(gauge, chunks[1]);

    match wizard.preview.as_ref() {
        Some(preview) => render_preview(frame, preview, chunks[3]),
        None => render_fields(frame, wizard, chunks[3]),
    }
}

/// `●` completed, `◉` active, `○` pending.
fn step_indicator_line(wizard: &WizardView) -> Line<'static> {
    let mut spans = Vec::new();
    for (idx, marker) in wizard.markers.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::styled(
                " ── ",
                Style::default().fg(COLOR_TEXT_MUTED),
            ));
        }
        let (symbol, color) = match marker {
            StepMarker::Completed => ("●", COLOR_STEP_COMPLETED),
            StepMarker::Active => ("◉", COLOR_STEP_ACTIVE),
            StepMarker::Pending => ("○", COLOR_STEP_PENDING),
        };
        let title = STEP_TITLES.get(idx).copied().unwrap_or("");
        let mut style = Style::default().fg(color);
        if *marker == StepMarker::Active {
            style = style.add_modifier(Modifier::BOLD);
        }
        spans.push(Span::styled(format!("{} {}", symbol, title), style));
    }
    Line::from(spans)
}

fn render_fields(frame: &mut Frame, wizard: &WizardView, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();

    for view in &wizard.fields {
        lines.extend(field_lines(view));
        lines.push(Line::default());
    }

    if wizard.show_tags {
        lines.push(label_line(
            &format!("Tags ({}/{})", wizard.tags.len(), MAX_TAGS),
            wizard.tags_focused,
        ));
        let mut spans: Vec<Span> = wizard
            .tags
            .iter()
            .map(|t| Span::styled(format!("#{} ", t), Style::default().fg(COLOR_ACCENT)))
            .collect();
        spans.push(Span::raw(wizard.tag_input.clone()));
        if wizard.tags_focused {
            spans.push(cursor());
        }
        lines.push(Line::from(spans));
        lines.push(Line::default());

        let check = if wizard.seeking_collaborators { "[x]" } else { "[ ]" };
        lines.push(label_line(
            &format!("{} Looking for collaborators", check),
            wizard.collaborators_focused,
        ));
        lines.push(Line::default());
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn label_line(label: &str, focused: bool) -> Line<'static> {
    let style = if focused {
        Style::default()
            .fg(COLOR_ACCENT)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(COLOR_TEXT_DIMMED)
    };
    Line::from(Span::styled(label.to_string(), style))
}

fn cursor() -> Span<'static> {
    Span::styled(
        "_",
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::SLOW_BLINK),
    )
}

fn field_lines(view: &FieldView) -> Vec<Line<'static>> {
    let mut header = label_line(view.label, view.focused).spans;
    if let Some(counter) = view.counter {
        let color = match counter.level() {
            CounterLevel::Normal => COLOR_TEXT_MUTED,
            CounterLevel::Warning => COLOR_COUNTER_WARNING,
            CounterLevel::Danger => COLOR_COUNTER_DANGER,
        };
        header.push(Span::styled(
            format!("  {}", counter),
            Style::default().fg(color),
        ));
    }

    let mut value = Vec::new();
    if view.is_choice {
        let shown = if view.value.is_empty() {
            "Select..."
        } else {
            view.value.as_str()
        };
        value.push(Span::raw(format!("‹ {} ›", shown)));
    } else {
        value.push(Span::raw(view.value.clone()));
        if view.focused {
            value.push(cursor());
        }
    }

    let mut lines = vec![Line::from(header), Line::from(value)];
    if let Some(error) = view.error.as_ref() {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    }
    lines
}

fn render_preview(frame: &mut Frame, preview: &Preview, area: Rect) {
    let mut lines = vec![
        Line::from(Span::styled(
            preview.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::default(),
    ];
    for section in &preview.sections {
        lines.push(Line::from(Span::styled(
            section.label,
            Style::default().fg(COLOR_TEXT_DIMMED),
        )));
        lines.push(Line::from(section.content.clone()));
        lines.push(Line::default());
    }
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

// -----------------------------------------------------------------------------
// Chat
// -----------------------------------------------------------------------------

fn render_chat(frame: &mut Frame, chat: &ChatView, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .split(area);

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            format!("Team Chat - {}", chat.title),
            Style::default().add_modifier(Modifier::BOLD),
        ))),
        chunks[0],
    );

    let lines: Vec<Line> = if chat.messages.is_empty() {
        vec![Line::from(Span::styled(
            "No messages yet. Say hi!",
            Style::default().fg(COLOR_TEXT_DIMMED),
        ))]
    } else {
        chat.messages
            .iter()
            .map(|m| {
                let author_style = if m.own {
                    Style::default()
                        .fg(COLOR_ACCENT)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(COLOR_TEXT_DIMMED)
                };
                Line::from(vec![
                    Span::styled(
                        format!("{} ", short_time(&m.timestamp)),
                        Style::default().fg(COLOR_TEXT_MUTED),
                    ),
                    Span::styled(format!("{}: ", m.author), author_style),
                    Span::raw(m.text.clone()),
                ])
            })
            .collect()
    };

    // Keep the newest messages in view.
    let visible = chunks[1].height as usize;
    let skip = lines.len().saturating_sub(visible);
    let lines: Vec<Line> = lines.into_iter().skip(skip).collect();
    frame.render_widget(Paragraph::new(lines), chunks[1]);

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("> ", Style::default().fg(COLOR_TEXT_MUTED)),
            Span::raw(chat.input.clone()),
            cursor(),
        ])),
        chunks[2],
    );
}

fn render_chat_closed(frame: &mut Frame, target: Option<&str>, area: Rect) {
    let text = match target {
        Some(title) => format!("Chat with {} is closed. Press 'o' to open it.", title),
        None => "No chat open.".to_string(),
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            text,
            Style::default().fg(COLOR_TEXT_DIMMED),
        ))),
        area,
    );
}

/// `HH:MM` out of a `YYYY-MM-DD HH:MM:SS` timestamp.
fn short_time(timestamp: &str) -> String {
    chrono::NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d %H:%M:%S")
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|_| truncate(timestamp, 5))
}

fn render_notification(frame: &mut Frame, notification: &Notification, area: Rect) {
    let notification_area = Rect {
        x: area.x,
        y: area.y + area.height.saturating_sub(1),
        width: area.width,
        height: 1,
    };

    frame.render_widget(Clear, notification_area);

    let line = match notification.level {
        NotificationLevel::Error => Line::from(vec![
            Span::styled(
                "Error: ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                notification.message.clone(),
                Style::default().fg(Color::Red),
            ),
        ]),
        NotificationLevel::Info => Line::from(Span::styled(
            notification.message.clone(),
            Style::default().fg(Color::Green),
        )),
    };

    frame.render_widget(Paragraph::new(line), notification_area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if max_len == 0 {
        return String::new();
    }
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 1).collect();
        format!("{}~", truncated)
    }
}
