//! Conversation logger
//!
//! Boundary stub for a future persistence integration: validated payloads
//! are recorded as diagnostic output only, and acknowledged with a
//! server-assigned save time and pair count.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// One question/answer exchange from the chat flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationPair {
    pub question: String,
    pub answer: String,
}

/// Inbound save payload (camelCase on the wire).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatLogPayload {
    pub timestamp: String,
    #[serde(default)]
    pub total_questions: Option<u64>,
    pub conversations: Vec<ConversationPair>,
}

/// Acknowledgement data returned to the client (camelCase on the wire).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedChat {
    pub saved_at: DateTime<Utc>,
    pub conversation_count: usize,
}

/// Record a conversation payload.
///
/// Currently diagnostic output only; the Result seam is where a durable
/// store will plug in.
pub fn record(payload: &ChatLogPayload) -> Result<RecordedChat> {
    info!("=== conversation save request ===");
    info!("timestamp: {}", payload.timestamp);
    if let Some(total) = payload.total_questions {
        info!("total questions: {}", total);
    }

    for (index, pair) in payload.conversations.iter().enumerate() {
        info!("{}. Q: {}", index + 1, pair.question);
        info!("   A: {}", pair.answer);
    }

    Ok(RecordedChat {
        saved_at: Utc::now(),
        conversation_count: payload.conversations.len(),
    })
}
