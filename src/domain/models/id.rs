use std::fmt::Display;

/// Identifies one live subscription on a broadcast streamer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriberId(String);
impl SubscriberId {
    pub fn new() -> Self {
        let mut buf = [0u8; 32];
        let s = uuid::Uuid::new_v4().simple().encode_lower(&mut buf);
        Self(s.to_owned())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}
impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}
impl AsRef<str> for SubscriberId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Display for SubscriberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The first 8 hex digits are plenty to tell subscribers apart in logs.
        f.write_str(&self.0[..8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_hex() {
        let a = SubscriberId::new();
        let b = SubscriberId::new();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 32);
        assert!(a.as_str().bytes().all(|x| x.is_ascii_hexdigit()));
        assert_eq!(a.to_string().len(), 8);
    }
}
