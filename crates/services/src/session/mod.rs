mod state;
mod store;

pub use state::{ConversationKey, Page, SessionState};
pub use store::SessionStore;
