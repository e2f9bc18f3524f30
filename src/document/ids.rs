//! Opaque identifiers issued by a [`MapDocument`](super::MapDocument).
//!
//! Two ids compare equal only when they were issued for the same object by
//! the same document. The decimal `Display` form is the stable string key
//! used by overlay face lists.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub(crate) u32);

        impl $name {
            pub fn get(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<u32>().map($name)
            }
        }
    };
}

define_id!(SolidId);
define_id!(FaceId);
define_id!(EntityId);
