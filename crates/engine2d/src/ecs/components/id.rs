//! Optional human-readable entity id, looked up by `World::get_entity`

use crate::ecs::Component;
use serde::{Deserialize, Serialize};

/// String id for entities that content code needs to find by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdComponent(pub String);

impl Component for IdComponent {
    const NAME: &'static str = "id";
}

impl IdComponent {
    /// Create from anything string-like
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
