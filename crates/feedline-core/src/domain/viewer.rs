use uuid::Uuid;

/// The authenticated caller, as supplied by the identity collaborator.
///
/// The engine trusts this value and performs no credential checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub id: Uuid,
    pub role: String,
}

impl Viewer {
    pub fn new(id: Uuid, role: impl Into<String>) -> Self {
        Self {
            id,
            role: role.into(),
        }
    }

    /// A viewer with the default `user` role.
    pub fn user(id: Uuid) -> Self {
        Self::new(id, "user")
    }
}
