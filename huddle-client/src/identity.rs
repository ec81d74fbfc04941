use dashmap::DashMap;
use huddle_core::MemberId;
use tracing::{debug, warn};

/// Key under which the member id is kept for the session.
pub const MEMBER_ID_KEY: &str = "userId";

/// Session-scoped key/value storage owned by the embedding application.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: String);
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: DashMap<String, String>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).map(|v| v.value().clone())
    }

    fn set(&self, key: &str, value: String) {
        self.values.insert(key.to_owned(), value);
    }
}

/// Reuses the member id stored for this session, or mints and stores a fresh one.
pub fn load_member_id(store: &dyn SessionStore) -> MemberId {
    if let Some(stored) = store.get(MEMBER_ID_KEY) {
        match MemberId::parse(stored) {
            Ok(id) => {
                debug!("Reusing session member id {}", id);
                return id;
            }
            Err(e) => warn!("Ignoring stored member id: {}", e),
        }
    }

    let id = MemberId::generate();
    store.set(MEMBER_ID_KEY, id.to_string());
    id
}
