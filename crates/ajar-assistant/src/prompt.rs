//! Prompt assembly.

use ajar_types::{ChatMessage, MemoryNote};

/// System prompt for the coding chat.
pub const SYSTEM_PROMPT: &str = "\
You are a frontend coding assistant.

- Reply in the user's language (Indonesian, English, or a mix).
- Default stack: React + Next.js + TypeScript + Tailwind CSS.
- When slicing a design:
  - First describe the layout structure (sections, grid, spacing, typography).
  - Then give an example component.
- When integrating a backend API:
  - Put fetching in a separate service layer.
  - Show how components consume it (hooks, etc.).
- If the user says your answer was wrong and gives the right version,
  treat it as a preference and do not repeat the mistake.";

/// Query used to pull layout-related notes for the slicing flow.
pub const LAYOUT_QUERY: &str = "layout";

const NO_NOTES: &str = "- (no notes yet)";

/// Bullet list of note contents, or a placeholder when there are none.
pub fn memory_block(notes: &[MemoryNote]) -> String {
    if notes.is_empty() {
        return NO_NOTES.to_string();
    }
    notes
        .iter()
        .map(|n| format!("- {}", n.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Messages for a chat turn: system prompt, the user's notes, the conversation.
pub fn chat_messages(notes: &[MemoryNote], history: &[ChatMessage]) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(SYSTEM_PROMPT));
    messages.push(ChatMessage::system(format!(
        "User preferences & corrections:\n{}",
        memory_block(notes)
    )));
    messages.extend_from_slice(history);
    messages
}

/// Prompt for turning a design image into a layout description and component.
pub fn slice_prompt(notes: &[MemoryNote], instructions: &str) -> String {
    let instructions = instructions.trim();
    let instructions = if instructions.is_empty() {
        "- (none)"
    } else {
        instructions
    };

    format!(
        "\
You are a frontend engineer fluent in React + TypeScript + Tailwind CSS.

Your task:
1. Look at the design in the attached image.
2. First describe the layout structure in text:
   - How many sections?
   - What grid / flex arrangement?
   - Main spacing, padding and margins?
   - Key typography (headings, body).
3. Then write example code:
   - React + TypeScript (functional component).
   - Tailwind CSS for layout and basic styling.
   - Keep dummy data minimal; a representative sample is enough.

User preferences & corrections (if any):
{notes}

Additional user instructions:
{instructions}",
        notes = memory_block(notes),
    )
}
