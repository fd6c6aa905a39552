use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use tether_types::events::{EventPublisher, GatewayFrame, PublishError, RelationEvent};
use tether_types::models::UserId;

type SessionMap = HashMap<Uuid, mpsc::UnboundedSender<GatewayFrame>>;

/// Tracks every connected device session and fans relationship events out
/// to all sessions of the target user.
#[derive(Clone, Default)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

#[derive(Default)]
struct DispatcherInner {
    /// user_id -> (session_id -> sender). One entry per connected device.
    sessions: RwLock<HashMap<UserId, SessionMap>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a device session for `user_id`. Returns (session_id, receiver).
    pub fn register_session(
        &self,
        user_id: UserId,
    ) -> (Uuid, mpsc::UnboundedReceiver<GatewayFrame>) {
        let session_id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();

        let mut sessions = self
            .inner
            .sessions
            .write()
            .unwrap_or_else(|e| e.into_inner());
        sessions.entry(user_id).or_default().insert(session_id, tx);
        (session_id, rx)
    }

    /// Drop one device session. Other sessions of the same user stay registered.
    pub fn unregister_session(&self, user_id: UserId, session_id: Uuid) {
        let mut sessions = self
            .inner
            .sessions
            .write()
            .unwrap_or_else(|e| e.into_inner());
        if let Some(devices) = sessions.get_mut(&user_id) {
            devices.remove(&session_id);
            if devices.is_empty() {
                sessions.remove(&user_id);
            }
        }
    }

    /// Number of connected sessions for `user_id`.
    pub fn session_count(&self, user_id: UserId) -> usize {
        self.inner
            .sessions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&user_id)
            .map_or(0, |devices| devices.len())
    }

    /// Send a frame to every session of `user_id`. Returns how many sessions
    /// accepted it; sessions whose receiver is gone are pruned.
    pub fn send_to_user(&self, user_id: UserId, frame: GatewayFrame) -> Result<usize, PublishError> {
        let mut dead = Vec::new();
        let mut delivered = 0;
        let total;
        {
            let sessions = self
                .inner
                .sessions
                .read()
                .unwrap_or_else(|e| e.into_inner());
            let Some(devices) = sessions.get(&user_id) else {
                return Ok(0);
            };
            total = devices.len();
            for (session_id, tx) in devices {
                if tx.send(frame.clone()).is_ok() {
                    delivered += 1;
                } else {
                    dead.push(*session_id);
                }
            }
        }

        for session_id in dead {
            self.unregister_session(user_id, session_id);
        }

        if total > 0 && delivered == 0 {
            return Err(PublishError::SessionsClosed(total));
        }
        Ok(delivered)
    }
}

impl EventPublisher for Dispatcher {
    fn publish(&self, target: UserId, event: RelationEvent) -> Result<(), PublishError> {
        let name = event.name();
        let delivered = self.send_to_user(target, GatewayFrame::event(event))?;
        if delivered == 0 {
            debug!("{} for {}: no connected sessions", name, target);
        } else {
            debug!("{} for {}: delivered to {} session(s)", name, target, delivered);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use tether_types::events::BlacklistAction;

    fn sample_event() -> RelationEvent {
        RelationEvent::BlacklistChanged {
            action: BlacklistAction::Add,
            target: Uuid::new_v4(),
            changed_at: DateTime::from_timestamp_millis(0).unwrap(),
        }
    }

    #[test]
    fn event_reaches_every_device_of_the_user() {
        let dispatcher = Dispatcher::new();
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();
        let (_, mut phone) = dispatcher.register_session(user);
        let (_, mut laptop) = dispatcher.register_session(user);
        let (_, mut bystander) = dispatcher.register_session(other);

        dispatcher.publish(user, sample_event()).unwrap();

        assert!(matches!(phone.try_recv(), Ok(GatewayFrame::Event { .. })));
        assert!(matches!(laptop.try_recv(), Ok(GatewayFrame::Event { .. })));
        assert!(bystander.try_recv().is_err());
    }

    #[test]
    fn offline_user_is_not_an_error() {
        let dispatcher = Dispatcher::new();
        assert!(dispatcher.publish(Uuid::new_v4(), sample_event()).is_ok());
    }

    #[test]
    fn closed_sessions_are_pruned() {
        let dispatcher = Dispatcher::new();
        let user = Uuid::new_v4();
        let (_, rx) = dispatcher.register_session(user);
        drop(rx);

        let err = dispatcher.publish(user, sample_event()).unwrap_err();
        assert!(matches!(err, PublishError::SessionsClosed(1)));
        assert_eq!(dispatcher.session_count(user), 0);
    }

    #[test]
    fn unregister_keeps_other_devices() {
        let dispatcher = Dispatcher::new();
        let user = Uuid::new_v4();
        let (first, _rx1) = dispatcher.register_session(user);
        let (_, mut rx2) = dispatcher.register_session(user);

        dispatcher.unregister_session(user, first);
        assert_eq!(dispatcher.session_count(user), 1);

        assert_eq!(dispatcher.send_to_user(user, GatewayFrame::event(sample_event())).unwrap(), 1);
        assert!(rx2.try_recv().is_ok());
    }
}
