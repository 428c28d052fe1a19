use std::fmt;

/// Author role of a message (for example `assistant` or `user`).
///
/// Roles compare ordinally, so `Assistant` and `assistant` are different roles.
#[derive(Clone, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Role(pub String);

impl Role {
    /// Creates a role from any string-like value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The role a message gets when no update ever names one.
    pub fn assistant() -> Self {
        Self::new("assistant")
    }

    pub fn user() -> Self {
        Self::new("user")
    }

    pub fn system() -> Self {
        Self::new("system")
    }

    pub fn tool() -> Self {
        Self::new("tool")
    }

    /// Returns the role as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Blank roles carry no opinion and are treated like an absent role.
    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::assistant()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Free-form string-keyed properties carried by updates, messages, and responses.
pub type Properties = serde_json::Map<String, serde_json::Value>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_role_is_assistant() {
        assert_eq!(Role::default(), Role::assistant());
        assert_eq!(Role::default().as_str(), "assistant");
    }

    #[test]
    fn roles_compare_ordinally() {
        assert_ne!(Role::new("Assistant"), Role::assistant());
    }

    #[test]
    fn role_serializes_as_plain_string() {
        let json = serde_json::to_string(&Role::user()).unwrap();
        assert_eq!(json, "\"user\"");
    }
}
