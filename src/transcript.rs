//! Pure reducer from stream events to the single assistant message the UI
//! displays. The rendered content is rewritten on every event, so the view
//! always shows all finalized blocks in arrival order followed by whatever
//! text is still in flight.

use crate::protocol::StreamEvent;

/// Appended exactly once when a turn is cancelled.
pub const STOP_MARKER: &str = "⏹ Stopped by user.";

const ARGUMENTS_LIMIT: usize = 400;
const RESULT_LIMIT: usize = 800;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Block {
    Reasoning {
        before_tool: Option<String>,
        text: String,
    },
    ToolCall {
        name: String,
        arguments: String,
    },
    ToolResult {
        name: String,
        payload: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Transcript {
    blocks: Vec<Block>,
    pending: String,
    response: Option<String>,
    awaiting_result: Option<String>,
    stopped: bool,
    done: bool,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the transcript. Events arriving after the turn
    /// was stopped or finalized are ignored.
    pub fn apply(mut self, event: &StreamEvent) -> Self {
        if self.stopped || self.done {
            return self;
        }

        match event {
            StreamEvent::Thinking { content } => self.pending.push_str(content),
            StreamEvent::Text { content, .. } => self.pending.push_str(content),
            StreamEvent::ToolCall { name, arguments } => {
                self.flush_reasoning(Some(name));
                self.blocks.push(Block::ToolCall {
                    name: name.clone(),
                    arguments: truncate(&pretty(arguments), ARGUMENTS_LIMIT),
                });
                self.awaiting_result = Some(name.clone());
            }
            StreamEvent::ToolResult { name, result } => {
                self.awaiting_result = None;
                self.blocks.push(Block::ToolResult {
                    name: name.clone(),
                    payload: truncate(&pretty(result), RESULT_LIMIT),
                });
            }
            StreamEvent::StepFinish => self.flush_reasoning(None),
            StreamEvent::Error { message } => {
                if !self.pending.is_empty() {
                    self.pending.push_str("\n\n");
                }
                self.pending.push_str("⚠️ ");
                self.pending.push_str(message);
            }
            StreamEvent::Done => {
                self.done = true;
                self.awaiting_result = None;
                self.response = Some(std::mem::take(&mut self.pending));
            }
        }
        self
    }

    /// Freeze the transcript after a user-initiated stop. Idempotent; the
    /// stop marker is rendered exactly once.
    pub fn stop(mut self) -> Self {
        self.stopped = true;
        self.awaiting_result = None;
        self
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Final response text, once a `done` event finalized the turn.
    pub fn response(&self) -> Option<&str> {
        self.response.as_deref()
    }

    /// The full displayable assistant message for the current state.
    pub fn render(&self) -> String {
        let mut sections = Vec::new();

        for block in &self.blocks {
            match block {
                Block::Reasoning { before_tool, text } => {
                    let title = match before_tool {
                        Some(tool) => format!("💭 Reasoning · {tool}"),
                        None => "💭 Reasoning".to_string(),
                    };
                    let quoted = text
                        .lines()
                        .map(|line| format!("> {line}"))
                        .collect::<Vec<_>>()
                        .join("\n");
                    sections.push(format!("{title}\n{quoted}"));
                }
                Block::ToolCall { name, arguments } => {
                    sections.push(format!("🔧 Calling {name}\n```json\n{arguments}\n```"));
                }
                Block::ToolResult { name, payload } => {
                    sections.push(format!("📋 {name} returned\n```json\n{payload}\n```"));
                }
            }
        }

        if let Some(tool) = &self.awaiting_result {
            sections.push(format!("⏳ Running {tool}…"));
        }

        let tail = self.response.as_ref().unwrap_or(&self.pending);
        if !tail.is_empty() {
            sections.push(tail.clone());
        }

        if self.stopped {
            sections.push(STOP_MARKER.to_string());
        }

        sections.join("\n\n")
    }

    fn flush_reasoning(&mut self, before_tool: Option<&str>) {
        let text = self.pending.trim();
        if !text.is_empty() {
            self.blocks.push(Block::Reasoning {
                before_tool: before_tool.map(str::to_string),
                text: text.to_string(),
            });
        }
        self.pending.clear();
    }
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

fn truncate(value: &str, max: usize) -> String {
    if value.len() <= max {
        return value.to_string();
    }
    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…\n[truncated]", &value[..end])
}
