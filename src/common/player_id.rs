use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// Opaque player identifier -- any non-empty string supplied by the transport.
///
/// Identity is by exact equality of the underlying string, never by
/// structural comparison of anything else. Cloning is cheap (an `Arc`
/// bump) since the same id is looked up repeatedly on every operation a
/// player makes.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct PlayerId(Arc<str>);

impl PlayerId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        PlayerId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        PlayerId::new(id)
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        PlayerId::new(id)
    }
}

impl Debug for PlayerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "PlayerId({:?})", self.0)
    }
}

impl Display for PlayerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(feature = "serde")]
mod player_id_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::PlayerId;

    impl Serialize for PlayerId {
        fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            s.serialize_str(self.as_str())
        }
    }

    impl<'de> Deserialize<'de> for PlayerId {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            let s = String::deserialize(deserializer)?;
            Ok(PlayerId::new(s))
        }
    }
}
