#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tempfile::TempDir;
use tether_db::Database;
use tether_relations::{QueryFacade, RelationshipEngine};
use tether_types::events::{EventPublisher, PublishError, RelationEvent};
use tether_types::models::UserId;
use tether_types::profile::{BriefProfile, ProfileResolver, ResolveError};
use uuid::Uuid;

#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<(UserId, RelationEvent)>>,
}

impl RecordingPublisher {
    pub fn events(&self) -> Vec<(UserId, RelationEvent)> {
        self.events.lock().unwrap().clone()
    }

    pub fn names_for(&self, target: UserId) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _)| *t == target)
            .map(|(_, e)| e.name())
            .collect()
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, target: UserId, event: RelationEvent) -> Result<(), PublishError> {
        self.events.lock().unwrap().push((target, event));
        Ok(())
    }
}

pub struct FailingPublisher;

impl EventPublisher for FailingPublisher {
    fn publish(&self, _target: UserId, _event: RelationEvent) -> Result<(), PublishError> {
        Err(PublishError::Unavailable("transport down".into()))
    }
}

/// Resolves every user except those in `missing`.
#[derive(Default)]
pub struct StubProfiles {
    pub missing: HashSet<UserId>,
    pub calls: Mutex<usize>,
}

impl ProfileResolver for StubProfiles {
    fn resolve(&self, user_id: UserId) -> Result<BriefProfile, ResolveError> {
        *self.calls.lock().unwrap() += 1;
        if self.missing.contains(&user_id) {
            return Err(ResolveError::Unavailable("profile service timeout".into()));
        }
        Ok(BriefProfile {
            user_id,
            nickname: format!("user-{}", &user_id.to_string()[..8]),
            avatar: format!("https://cdn.example/avatars/{}.png", user_id),
            gender: None,
            bio: None,
        })
    }
}

pub struct Harness {
    pub db: Arc<Database>,
    pub engine: RelationshipEngine,
    pub queries: QueryFacade,
    pub events: Arc<RecordingPublisher>,
    pub profiles: Arc<StubProfiles>,
    _dir: Option<TempDir>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_profiles(StubProfiles::default())
    }

    pub fn with_profiles(profiles: StubProfiles) -> Self {
        let db = Database::open_in_memory().unwrap();
        Self::build(db, profiles, None)
    }

    /// WAL file store with the separate reader pool, as the server runs it.
    pub fn file_backed() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("tether.db")).unwrap();
        Self::build(db, StubProfiles::default(), Some(dir))
    }

    fn build(db: Database, profiles: StubProfiles, dir: Option<TempDir>) -> Self {
        let db = Arc::new(db);
        let events = Arc::new(RecordingPublisher::default());
        let profiles = Arc::new(profiles);
        Self {
            engine: RelationshipEngine::new(db.clone(), events.clone()),
            queries: QueryFacade::new(db.clone(), profiles.clone()),
            db,
            events,
            profiles,
            _dir: dir,
        }
    }

    /// Send and accept a request so `a` and `b` end up friends.
    pub fn befriend(&self, a: UserId, b: UserId) -> i64 {
        let sent = self
            .engine
            .send_request(a, b, "", tether_types::models::RequestSource::Search)
            .unwrap();
        self.engine
            .handle_request(b, sent.request_id, tether_types::models::RequestAction::Accept)
            .unwrap();
        sent.request_id
    }
}

pub fn user() -> UserId {
    Uuid::new_v4()
}
