use std::collections::HashMap;

use indexmap::IndexMap;
use sketchsync_shared::UserId;
use uuid::Uuid;

pub type ConnectionId = Uuid;

pub const PALETTE: [&str; 5] = ["#FF0000", "#00FF00", "#0000FF", "#FF00FF", "#00FFFF"];
const MAX_USER_ID_LEN: usize = 64;

#[derive(Clone, Debug, PartialEq)]
pub struct Identity {
    pub user_id: UserId,
    pub color: String,
    pub connection: ConnectionId,
}

#[derive(Default)]
pub struct IdentityRegistry {
    active: IndexMap<UserId, Identity>,
    by_connection: HashMap<ConnectionId, UserId>,
    colors: HashMap<UserId, String>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, connection: ConnectionId, candidate: Option<&str>) -> Identity {
        if let Some(previous) = self.by_connection.remove(&connection) {
            self.active.shift_remove(&previous);
        }

        let user_id = match candidate {
            Some(id)
                if !id.is_empty()
                    && id.len() <= MAX_USER_ID_LEN
                    && !self.active.contains_key(id) =>
            {
                id.to_string()
            }
            _ => connection.to_string(),
        };

        let next_color = PALETTE[self.active.len() % PALETTE.len()];
        let color = self
            .colors
            .entry(user_id.clone())
            .or_insert_with(|| next_color.to_string())
            .clone();

        let identity = Identity {
            user_id: user_id.clone(),
            color,
            connection,
        };
        self.by_connection.insert(connection, user_id.clone());
        self.active.insert(user_id, identity.clone());
        identity
    }

    pub fn resolve(&self, connection: ConnectionId) -> Option<&Identity> {
        let user_id = self.by_connection.get(&connection)?;
        self.active.get(user_id)
    }

    pub fn unregister(&mut self, connection: ConnectionId) -> Option<Identity> {
        let user_id = self.by_connection.remove(&connection)?;
        self.active.shift_remove(&user_id)
    }

    pub fn count(&self) -> usize {
        self.active.len()
    }

    pub fn remembered(&self) -> usize {
        self.colors.len()
    }

    pub fn retain_colors(&mut self, keep: impl Fn(&str) -> bool) {
        let active = &self.active;
        self.colors
            .retain(|user_id, _| active.contains_key(user_id) || keep(user_id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_registration_mints_connection_id() {
        let mut registry = IdentityRegistry::new();
        let connection = Uuid::new_v4();
        let identity = registry.register(connection, None);
        assert_eq!(identity.user_id, connection.to_string());
        assert_eq!(identity.color, PALETTE[0]);
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn colors_round_robin_by_live_count() {
        let mut registry = IdentityRegistry::new();
        let colors = (0..6)
            .map(|_| registry.register(Uuid::new_v4(), None).color)
            .collect::<Vec<_>>();
        assert_eq!(colors[..5], PALETTE.map(String::from));
        assert_eq!(colors[5], PALETTE[0]);
    }

    #[test]
    fn candidate_bound_elsewhere_gets_fresh_identity() {
        let mut registry = IdentityRegistry::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        registry.register(first, Some("alice"));
        let identity = registry.register(second, Some("alice"));
        assert_eq!(identity.user_id, second.to_string());
        assert_eq!(registry.resolve(first).unwrap().user_id, "alice");
    }

    #[test]
    fn reconnect_keeps_original_color() {
        let mut registry = IdentityRegistry::new();
        registry.register(Uuid::new_v4(), Some("bob"));
        let alice_conn = Uuid::new_v4();
        let alice = registry.register(alice_conn, Some("alice"));
        assert_eq!(alice.color, PALETTE[1]);

        registry.unregister(alice_conn);
        assert!(registry.resolve(alice_conn).is_none());

        let back = registry.register(Uuid::new_v4(), Some("alice"));
        assert_eq!(back.user_id, "alice");
        assert_eq!(back.color, PALETTE[1]);
    }

    #[test]
    fn retain_colors_never_drops_live_users() {
        let mut registry = IdentityRegistry::new();
        let gone = Uuid::new_v4();
        registry.register(Uuid::new_v4(), Some("alice"));
        registry.register(gone, Some("bob"));
        registry.register(Uuid::new_v4(), Some("carol"));
        registry.unregister(gone);
        assert_eq!(registry.remembered(), 3);

        registry.retain_colors(|_| false);
        assert_eq!(registry.remembered(), 2);

        let back = registry.register(Uuid::new_v4(), Some("bob"));
        assert_eq!(back.color, PALETTE[2]);
    }

    #[test]
    fn re_register_on_same_connection_replaces_binding() {
        let mut registry = IdentityRegistry::new();
        let connection = Uuid::new_v4();
        registry.register(connection, None);
        let identity = registry.register(connection, Some("carol"));
        assert_eq!(identity.user_id, "carol");
        assert_eq!(registry.count(), 1);
    }
}
