mod chat_config;
mod checklist;
mod conversation;
mod ids;
mod progress;
mod stage;

pub use chat_config::ChatConfig;
pub use checklist::{Checklist, ChecklistItem, ItemKey, ItemKeyParseError};
pub use conversation::{ConversationMessage, Role};
pub use ids::{ChecklistId, ItemId, StageId, TopicId};
pub use progress::{ChecklistProgress, ProgressSnapshot, UserProgress};
pub use stage::{Stage, Topic};
