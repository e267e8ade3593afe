//! Collider component
//!
//! Shared by every collider shape. It decides whether an entity takes part
//! in collision at all, which side of a contact gets pushed, and which named
//! handler hears about contacts.

use crate::ecs::Component;
use bitflags::bitflags;
use serde::Deserialize;

bitflags! {
    /// Which half of a positional correction a collider participates in
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CollisionFlags: u8 {
        /// Pushes the other collider out of overlap
        const SEND = 1 << 0;
        /// Can be pushed out of overlap
        const RECEIVE = 1 << 1;
        /// Both directions
        const BIDIRECTIONAL = Self::SEND.bits() | Self::RECEIVE.bits();
    }
}

/// Collision participation settings
///
/// ```json
/// { "handler": "player_hit", "send": true, "receive": true, "enabled": true }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "ColliderData")]
pub struct ColliderComponent {
    /// Name of a registered collision handler to notify on contact
    pub handler: Option<String>,

    /// Send/receive correction flags
    pub flags: CollisionFlags,

    /// Disabled colliders are skipped entirely
    pub enabled: bool,
}

impl Component for ColliderComponent {
    const NAME: &'static str = "collider";
}

impl Default for ColliderComponent {
    fn default() -> Self {
        Self {
            handler: None,
            flags: CollisionFlags::BIDIRECTIONAL,
            enabled: true,
        }
    }
}

impl ColliderComponent {
    /// Builder pattern: notify the named handler on contact
    pub fn with_handler(mut self, name: impl Into<String>) -> Self {
        self.handler = Some(name.into());
        self
    }

    /// Builder pattern: set correction flags
    pub fn with_flags(mut self, flags: CollisionFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Builder pattern: enable or disable
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Whether this collider pushes others
    pub fn sends(&self) -> bool {
        self.flags.contains(CollisionFlags::SEND)
    }

    /// Whether this collider can be pushed
    pub fn receives(&self) -> bool {
        self.flags.contains(CollisionFlags::RECEIVE)
    }
}

/// On-disk shape of [`ColliderComponent`]
#[derive(Deserialize)]
#[serde(default)]
struct ColliderData {
    handler: Option<String>,
    send: bool,
    receive: bool,
    enabled: bool,
}

impl Default for ColliderData {
    fn default() -> Self {
        Self {
            handler: None,
            send: true,
            receive: true,
            enabled: true,
        }
    }
}

impl From<ColliderData> for ColliderComponent {
    fn from(data: ColliderData) -> Self {
        let mut flags = CollisionFlags::empty();
        flags.set(CollisionFlags::SEND, data.send);
        flags.set(CollisionFlags::RECEIVE, data.receive);
        Self {
            handler: data.handler,
            flags,
            enabled: data.enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let collider: ColliderComponent = serde_json::from_value(json!({})).unwrap();
        assert_eq!(collider, ColliderComponent::default());
        assert!(collider.sends());
        assert!(collider.receives());
    }

    #[test]
    fn test_flags_from_data() {
        let collider: ColliderComponent = serde_json::from_value(json!({
            "handler": "wall_hit",
            "send": true,
            "receive": false,
            "enabled": false
        }))
        .unwrap();
        assert_eq!(collider.handler.as_deref(), Some("wall_hit"));
        assert_eq!(collider.flags, CollisionFlags::SEND);
        assert!(!collider.enabled);
    }
}
