// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inline entity IDs.
//!
//! Handles that never leave the orchestrator (runs, alerts, patterns,
//! occurrences, labels, agents) are short prefixed nanoids stored
//! inline, so they stay `Copy` and hash without touching the heap.
//! Issues and projects carry UUIDs instead — their identity is visible
//! to external collaborators.

/// Inline ID capacity: a 4-char type prefix plus a 19-char nanoid.
pub const ID_LEN: usize = 23;

/// Returns a string slice truncated to at most `n` characters.
pub fn short(s: &str, n: usize) -> &str {
    if s.len() <= n {
        s
    } else {
        &s[..n]
    }
}

/// A stack-allocated ASCII ID of at most [`ID_LEN`] bytes.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct InlineId {
    buf: [u8; ID_LEN],
    len: u8,
}

impl InlineId {
    /// Build from a string, truncating past [`ID_LEN`] bytes. Callers
    /// produce IDs through `define_id!`, which never exceeds the cap;
    /// the debug assertion catches hand-rolled oversized inputs.
    pub fn new(s: &str) -> Self {
        debug_assert!(s.len() <= ID_LEN, "ID exceeds {} bytes: {:?}", ID_LEN, s);
        let len = s.len().min(ID_LEN);
        let mut buf = [0u8; ID_LEN];
        buf[..len].copy_from_slice(&s.as_bytes()[..len]);
        Self { buf, len: len as u8 }
    }

    pub fn as_str(&self) -> &str {
        // Construction only ever copies from &str, so the active bytes
        // are valid UTF-8.
        std::str::from_utf8(&self.buf[..self.len as usize]).unwrap_or_default()
    }
}

impl std::hash::Hash for InlineId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        // Only the active bytes participate, mirroring str::hash.
        self.as_str().hash(state);
    }
}

impl std::fmt::Debug for InlineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl std::fmt::Display for InlineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl serde::Serialize for InlineId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for InlineId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;

        impl serde::de::Visitor<'_> for IdVisitor {
            type Value = InlineId;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "an ID string of at most {} bytes", ID_LEN)
            }

            fn visit_str<E: serde::de::Error>(self, s: &str) -> Result<InlineId, E> {
                if s.len() > ID_LEN {
                    return Err(E::custom(format!("ID exceeds {} bytes: {:?}", ID_LEN, s)));
                }
                Ok(InlineId::new(s))
            }
        }

        deserializer.deserialize_str(IdVisitor)
    }
}

/// Define a `Copy` newtype ID over [`InlineId`] with a 4-char prefix.
///
/// `new()` generates `{prefix}{nanoid19}`; `from_string()` wraps an
/// existing value for parsing and tests.
///
/// ```ignore
/// define_id! {
///     /// Doc comment for the ID type.
///     pub struct RunId("run-");
/// }
/// ```
#[macro_export]
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident($prefix:literal);
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub $crate::id::InlineId);

        impl $name {
            pub const PREFIX: &'static str = $prefix;

            /// Generate a fresh random ID.
            pub fn new() -> Self {
                Self($crate::id::InlineId::new(&format!(
                    "{}{}",
                    Self::PREFIX,
                    nanoid::nanoid!(19)
                )))
            }

            /// Wrap an existing ID string.
            pub fn from_string(id: impl AsRef<str>) -> Self {
                Self($crate::id::InlineId::new(id.as_ref()))
            }

            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }

            /// The ID without its type prefix.
            pub fn suffix(&self) -> &str {
                self.as_str().strip_prefix(Self::PREFIX).unwrap_or(self.as_str())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::from_string(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::from_string(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.as_str() == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.as_str() == *other
            }
        }
    };
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
