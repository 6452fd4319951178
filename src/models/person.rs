use serde::Serialize;

pub const DEFAULT_ROLE: &str = "student";

/// A tracked subject. `name` is an opaque key: two people with the same name
/// are the same person.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Person {
    pub id: i64,
    pub name: String,
    pub role: String,
    pub created_at: String, // ⇔ person.created_at (TEXT, ISO8601)
}
