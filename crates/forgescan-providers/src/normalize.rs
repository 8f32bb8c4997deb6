use forgescan_types::{
    ContentBlock, MessageContent, MessageIndex, MessageRole, NormalizedMessage, RawRecord,
    ToolInvocation, ToolResult,
};

/// Convert a record into the uniform message view.
///
/// Returns `None` for record types other than user/assistant.
pub fn normalize_record(record: &RawRecord, index: MessageIndex) -> Option<NormalizedMessage> {
    let role = MessageRole::from_kind(record.kind)?;

    let mut text_parts: Vec<&str> = Vec::new();
    let mut tool_invocations = Vec::new();
    let mut tool_results = Vec::new();

    match record.content() {
        Some(MessageContent::Text(text)) => text_parts.push(text),
        Some(MessageContent::Blocks(blocks)) => {
            for block in blocks {
                match block {
                    ContentBlock::Text { text } => text_parts.push(text),
                    ContentBlock::ToolUse { id, name, input } => {
                        tool_invocations.push(ToolInvocation {
                            id: id.clone(),
                            name: name.clone(),
                            input: input.clone(),
                        });
                    }
                    ContentBlock::ToolResult {
                        tool_use_id,
                        content,
                        is_error,
                    } => {
                        let parts = content.as_ref().map(|c| c.text_parts()).unwrap_or_default();
                        text_parts.extend(parts.iter().copied());
                        tool_results.push(ToolResult {
                            tool_use_id: tool_use_id.clone(),
                            content: parts.join("\n"),
                            is_error: is_error.unwrap_or(false),
                        });
                    }
                    ContentBlock::Unknown => {}
                }
            }
        }
        Some(MessageContent::Other(_)) | None => {}
    }

    Some(NormalizedMessage {
        index,
        role,
        text: text_parts.join("\n"),
        tool_invocations,
        tool_results,
        timestamp: record.timestamp.clone(),
    })
}

/// Normalize a whole session, dropping non-message records before indexing so
/// indices are dense over the retained messages.
pub fn normalize_session(records: &[RawRecord]) -> Vec<NormalizedMessage> {
    records
        .iter()
        .filter(|r| MessageRole::from_kind(r.kind).is_some())
        .enumerate()
        .filter_map(|(i, r)| normalize_record(r, MessageIndex::new(i)))
        .collect()
}

/// Display text of any record; empty for records without message content.
pub fn display_text(record: &RawRecord) -> String {
    normalize_record(record, MessageIndex::new(0))
        .map(|m| m.text)
        .unwrap_or_default()
}
