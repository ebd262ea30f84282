//! Chat context assembly.
//!
//! Client messages become turns in order (`user` stays user, anything else
//! is the assistant). File parts go at the front of turn 0 when that turn is
//! the user's; an empty history gets a synthesized user turn carrying the
//! files. Role alternation is not enforced.

use edital_core::{ClientMessage, ContentSegment, ConversationTurn, Role};

use super::prompts;

/// Turns plus the system instruction for one chat call.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatContext {
    pub contents: Vec<ConversationTurn>,
    pub system_instruction: String,
}

/// Map client history to turns and attach the file parts.
pub fn assemble_turns(
    messages: &[ClientMessage],
    file_parts: Vec<ContentSegment>,
) -> Vec<ConversationTurn> {
    let mut turns: Vec<ConversationTurn> = messages
        .iter()
        .map(|m| ConversationTurn {
            role: Role::from_client(&m.role),
            segments: vec![ContentSegment::text(m.text.clone())],
        })
        .collect();

    if turns.is_empty() {
        let mut segments = file_parts;
        segments.push(ContentSegment::text(prompts::CHAT_FRAMING_TEXT));
        turns.push(ConversationTurn::user(segments));
    } else if turns[0].role == Role::User {
        let mut segments = file_parts;
        segments.append(&mut turns[0].segments);
        turns[0].segments = segments;
    }
    turns
}

/// System instruction stating whether PDFs are attached, plus the fallback text.
pub fn system_instruction(fallback_context: Option<&str>, has_files: bool) -> String {
    let mut instruction = String::from(prompts::CHAT_SYSTEM_PROMPT);
    instruction.push_str("\n\n");
    instruction.push_str(if has_files {
        prompts::CHAT_FILES_ATTACHED
    } else {
        prompts::CHAT_TEXT_ONLY
    });
    if let Some(context) = fallback_context.filter(|c| !c.trim().is_empty()) {
        instruction.push_str("\n\n");
        instruction.push_str(prompts::CHAT_FALLBACK_HEADING);
        instruction.push('\n');
        instruction.push_str(context);
    }
    instruction
}

pub fn assemble(
    messages: &[ClientMessage],
    file_parts: Vec<ContentSegment>,
    fallback_context: Option<&str>,
) -> ChatContext {
    let has_files = file_parts.iter().any(ContentSegment::is_file);
    ChatContext {
        contents: assemble_turns(messages, file_parts),
        system_instruction: system_instruction(fallback_context, has_files),
    }
}
