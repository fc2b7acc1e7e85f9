use std::error::Error;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Frame;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use tokio::sync::{Mutex, mpsc};

use crate::cancel::StopToken;
use crate::client::ApiClient;
use crate::session::ChatSession;

type TuiTerminal = Terminal<CrosstermBackend<io::Stdout>>;
type UiResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

const EXAMPLE_PROMPTS: [&str; 5] = [
    "What is the EU AI Act?",
    "Analyze OpenAI's EU AI Act compliance",
    "Is a recruitment screening AI considered high-risk?",
    "What are the compliance requirements for chatbots?",
    "What's the timeline for EU AI Act enforcement?",
];

// Restores terminal settings even if the loop exits early.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone)]
enum Entry {
    User(String),
    Agent(String),
}

impl Entry {
    fn lines(&self) -> Vec<Line<'static>> {
        let (header, header_color, body_color) = match self {
            Entry::User(_) => ("You:", Color::Blue, Some(Color::Blue)),
            Entry::Agent(_) => ("Agent:", Color::Yellow, None),
        };
        let body = match self {
            Entry::User(body) | Entry::Agent(body) => body,
        };

        let header_style = Style::default()
            .fg(header_color)
            .add_modifier(Modifier::BOLD);
        let body_style = match body_color {
            Some(color) => Style::default().fg(color),
            None => Style::default(),
        };

        let mut lines = vec![Line::from(Span::styled(header.to_string(), header_style))];
        for line in body.lines() {
            lines.push(Line::from(Span::styled(format!("  {line}"), body_style)));
        }
        lines.push(Line::raw(""));
        lines
    }
}

#[derive(Debug)]
enum UiEvent {
    Streaming(String),
    Finished(String),
    Status(String),
}

#[derive(Debug, Default)]
struct InputLine {
    text: String,
    cursor: usize,
}

impl InputLine {
    fn insert(&mut self, c: char) {
        let at = self.byte_offset();
        self.text.insert(at, c);
        self.cursor += 1;
    }

    fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_offset();
            self.text.remove(at);
        }
    }

    fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    fn right(&mut self) {
        if self.cursor < self.text.chars().count() {
            self.cursor += 1;
        }
    }

    fn home(&mut self) {
        self.cursor = 0;
    }

    fn end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }

    fn byte_offset(&self) -> usize {
        self.text
            .char_indices()
            .nth(self.cursor)
            .map(|(at, _)| at)
            .unwrap_or(self.text.len())
    }
}

struct App {
    entries: Vec<Entry>,
    live: Option<String>,
    input: InputLine,
    status: String,
    is_loading: bool,
    should_quit: bool,
    sender: mpsc::Sender<UiEvent>,
    receiver: mpsc::Receiver<UiEvent>,
    session: Arc<Mutex<ChatSession>>,
    stop: StopToken,
    client: ApiClient,
}

impl App {
    fn new(client: ApiClient) -> Self {
        let (sender, receiver) = mpsc::channel(100);
        let session = ChatSession::new(client.clone());
        let stop = session.stop_token();

        Self {
            entries: Vec::new(),
            live: None,
            input: InputLine::default(),
            status: "⏳ checking API…".to_string(),
            is_loading: false,
            should_quit: false,
            sender,
            receiver,
            session: Arc::new(Mutex::new(session)),
            stop,
            client,
        }
    }

    fn spawn_status_probe(&self) {
        let client = self.client.clone();
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let status = match client.health().await {
                Ok(health) => format!("✅ {} v{}", health.service, health.version),
                Err(err) => format!("❌ {err}"),
            };
            let _ = sender.send(UiEvent::Status(status)).await;
        });
    }

    fn submit(&mut self) {
        if self.is_loading {
            return;
        }
        let message = self.input.take();
        if message.trim().is_empty() {
            return;
        }

        self.entries.push(Entry::User(message.clone()));
        self.live = Some(String::new());
        self.is_loading = true;

        let session = Arc::clone(&self.session);
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let mut session = session.lock().await;
            let streaming = sender.clone();
            let transcript = session
                .send(&message, move |rendered| {
                    let _ = streaming.try_send(UiEvent::Streaming(rendered.to_string()));
                })
                .await;
            let _ = sender.send(UiEvent::Finished(transcript.render())).await;
        });
    }

    fn clear_chat(&mut self) {
        if self.is_loading {
            return;
        }
        // The turn lock is free whenever nothing is loading.
        if let Ok(mut session) = self.session.try_lock() {
            session.clear();
            self.entries.clear();
            self.live = None;
        }
    }

    fn drain_ui_events(&mut self) {
        while let Ok(event) = self.receiver.try_recv() {
            match event {
                UiEvent::Streaming(content) => {
                    if self.is_loading {
                        self.live = Some(content);
                    }
                }
                UiEvent::Finished(content) => {
                    self.live = None;
                    self.is_loading = false;
                    self.entries.push(Entry::Agent(content));
                }
                UiEvent::Status(status) => self.status = status,
            }
        }
    }

    fn handle_key_events(&mut self) -> UiResult<()> {
        if !event::poll(Duration::from_millis(50))? {
            return Ok(());
        }
        let Event::Key(key) = event::read()? else {
            return Ok(());
        };

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => self.quit(),
                KeyCode::Char('r') => self.spawn_status_probe(),
                KeyCode::Char('l') => self.clear_chat(),
                _ => {}
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Esc => {
                if self.is_loading {
                    self.stop.cancel();
                } else {
                    self.quit();
                }
            }
            KeyCode::Enter => self.submit(),
            KeyCode::Char(c) => self.input.insert(c),
            KeyCode::Backspace => self.input.backspace(),
            KeyCode::Left => self.input.left(),
            KeyCode::Right => self.input.right(),
            KeyCode::Home => self.input.home(),
            KeyCode::End => self.input.end(),
            _ => {}
        }
        Ok(())
    }

    fn quit(&mut self) {
        if self.is_loading {
            self.stop.cancel();
        }
        self.should_quit = true;
    }

    fn transcript_lines(&self) -> Vec<Line<'static>> {
        if self.entries.is_empty() && self.live.is_none() {
            let mut lines = vec![
                Line::raw("Ask about EU AI Act compliance, risk classification,"),
                Line::raw("or documentation. For example:"),
                Line::raw(""),
            ];
            for prompt in EXAMPLE_PROMPTS {
                lines.push(Line::from(Span::styled(
                    format!("  • {prompt}"),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            return lines;
        }

        let mut lines = Vec::new();
        for entry in &self.entries {
            lines.extend(entry.lines());
        }
        if let Some(live) = &self.live {
            let shown = if live.is_empty() { "…" } else { live.as_str() };
            lines.extend(Entry::Agent(shown.to_string()).lines());
        }
        lines
    }

    fn draw(&self, frame: &mut Frame) {
        let [transcript_area, input_area] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(3)]).areas(frame.area());

        let lines = self.transcript_lines();
        let inner_width = transcript_area.width.saturating_sub(2).max(1);
        let inner_height = transcript_area.height.saturating_sub(2);
        let total_height: u16 = lines
            .iter()
            .map(|line| wrapped_height(line, inner_width))
            .sum();
        let scroll = total_height.saturating_sub(inner_height);

        let transcript = Paragraph::new(Text::from(lines))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" EU AI Act Compliance Agent ")
                    .title_bottom(Line::from(format!(" {} ", self.status)).right_aligned())
                    .border_style(Style::default().fg(Color::DarkGray)),
            )
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0));
        frame.render_widget(transcript, transcript_area);

        let input_title = if self.is_loading {
            " Input (Esc to stop · Ctrl-C to quit) [Thinking…] "
        } else {
            " Input (Enter to send · Esc to quit · Ctrl-L to clear) "
        };
        let input = Paragraph::new(self.input_text()).block(
            Block::default()
                .borders(Borders::ALL)
                .title(input_title)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        frame.render_widget(input, input_area);

        let cursor_x = input_area.x + 1 + self.input.cursor as u16;
        let cursor_y = input_area.y + 1;
        frame.set_cursor_position((
            cursor_x.min(input_area.x + input_area.width.saturating_sub(2)),
            cursor_y,
        ));
    }

    fn input_text(&self) -> Text<'static> {
        if self.input.text.is_empty() {
            Text::from(Span::styled(
                "Type your question here...",
                Style::default().fg(Color::DarkGray),
            ))
        } else {
            Text::raw(self.input.text.clone())
        }
    }
}

fn wrapped_height(line: &Line<'_>, width: u16) -> u16 {
    let width = width as usize;
    let chars = line.width().max(1);
    ((chars + width - 1) / width) as u16
}

pub fn run_tui(client: ApiClient) -> UiResult<()> {
    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen)?;
    let _guard = TerminalGuard;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal: TuiTerminal = Terminal::new(backend)?;

    let mut app = App::new(client);
    app.spawn_status_probe();

    while !app.should_quit {
        app.drain_ui_events();
        app.handle_key_events()?;
        terminal.draw(|frame| app.draw(frame))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::InputLine;

    #[test]
    fn input_line_edits_at_the_cursor() {
        let mut input = InputLine::default();
        for c in "risk".chars() {
            input.insert(c);
        }
        input.left();
        input.left();
        input.insert('e');
        assert_eq!(input.text, "riesk");

        input.backspace();
        assert_eq!(input.text, "risk");

        input.end();
        input.insert('!');
        assert_eq!(input.take(), "risk!");
        assert_eq!(input.text, "");
        assert_eq!(input.cursor, 0);
    }

    #[test]
    fn input_line_handles_multibyte_chars() {
        let mut input = InputLine::default();
        input.insert('é');
        input.insert('u');
        input.home();
        input.insert('>');
        assert_eq!(input.text, ">éu");

        input.right();
        input.right();
        input.backspace();
        assert_eq!(input.text, ">é");
    }
}
