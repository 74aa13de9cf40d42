//! Synthesis prompt generation for buffered thoughts.
#![allow(dead_code)]

use crate::core::validate::Priority;
use crate::store::Thought;

/// Render the synthesis prompt for a backlog of pending thoughts.
///
/// Output is a pure function of the collection's content: thoughts are
/// ranked by priority tier, then creation time, then id, so any input
/// ordering produces byte-identical text.
pub fn render(thoughts: &[Thought]) -> String {
    if thoughts.is_empty() {
        return "**SYSTEM: No buffered thoughts to synthesize.**".to_string();
    }

    let mut sorted: Vec<&Thought> = thoughts.iter().collect();
    sorted.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut lines = Vec::with_capacity(sorted.len());
    for (i, thought) in sorted.iter().enumerate() {
        let tag = match thought.priority {
            Priority::Critical => " [CRITICAL]",
            Priority::Low => " [low]",
            Priority::Normal => "",
        };
        lines.push(format!(
            "{}. [{}]{} \"{}\"",
            i + 1,
            thought.created_at,
            tag,
            escape_content(&thought.content)
        ));
    }

    let critical_count = sorted
        .iter()
        .filter(|t| t.priority == Priority::Critical)
        .count();
    let critical_note = if critical_count > 0 {
        format!(
            "\n\n**Note:** {} CRITICAL thought(s) — preserve unless clearly obsolete.",
            critical_count
        )
    } else {
        String::new()
    };

    let message_word = if thoughts.len() == 1 {
        "message"
    } else {
        "messages"
    };

    format!(
        "**SYSTEM: NETWORK RECOVERED**\n\n\
         While congested, you drafted {} {}:\n\n\
         {}{}\n\n\
         **TASK:** Review against current channel state.\n\
         - Discard obsolete/superseded thoughts\n\
         - Synthesize remaining into ONE coherent message\n\
         - Do not apologize or mention delays",
        thoughts.len(),
        message_word,
        lines.join("\n"),
        critical_note
    )
}

/// Escape thought content for embedding in a quoted prompt line.
///
/// Backslashes are doubled first so the quote and newline substitutions
/// cannot be double-escaped.
fn escape_content(content: &str) -> String {
    content
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
