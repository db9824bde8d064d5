use serde::{Deserialize, Serialize};

/// The membership relations that carry a denormalized counter on their parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    PostLike,
    PostSave,
    CommentLike,
}

impl InteractionKind {
    /// Name of the parent entity whose counter this membership drives.
    pub fn target_type(self) -> &'static str {
        match self {
            InteractionKind::PostLike | InteractionKind::PostSave => "Post",
            InteractionKind::CommentLike => "Comment",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InteractionKind::PostLike => "post_like",
            InteractionKind::PostSave => "post_save",
            InteractionKind::CommentLike => "comment_like",
        }
    }
}

/// Result of a membership toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleOutcome {
    /// Whether the membership exists after the toggle.
    pub active: bool,
    /// Parent counter value after commit.
    pub count: i64,
}

/// Result of a block toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockState {
    pub is_blocked: bool,
}
