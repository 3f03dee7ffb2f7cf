use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Identifier of a topic node. Allocated sequentially by the owning map,
/// starting at zero, and never reused. Rendered as `node-N`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

/// Identifier of a link. Allocated sequentially, rendered as `link-N`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(u32);

macro_rules! sequential_id {
    ($ty:ident, $prefix:literal) => {
        impl $ty {
            pub const PREFIX: &'static str = $prefix;

            pub const fn from_raw(n: u32) -> Self {
                Self(n)
            }

            pub const fn raw(self) -> u32 {
                self.0
            }

            /// Parse the display form (`node-3`) back into an id.
            pub fn parse(s: &str) -> Option<Self> {
                s.strip_prefix(Self::PREFIX)?
                    .strip_prefix('-')?
                    .parse()
                    .ok()
                    .map(Self)
            }
        }

        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", Self::PREFIX, self.0)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", Self::PREFIX, self.0)
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::parse(&s).ok_or_else(|| {
                    serde::de::Error::custom(format!("invalid {} id `{s}`", Self::PREFIX))
                })
            }
        }
    };
}

sequential_id!(NodeId, "node");
sequential_id!(LinkId, "link");

/// Monotonic counter handing out ids. Owned by a single map, so ids are
/// unique per document and tests start from a known state.
#[derive(Debug, Clone, Default)]
pub struct IdCounter {
    next_node: u32,
    next_link: u32,
}

impl IdCounter {
    pub fn next_node(&mut self) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        id
    }

    pub fn next_link(&mut self) -> LinkId {
        let id = LinkId(self.next_link);
        self.next_link += 1;
        id
    }
}
