//! Identifier newtypes for chat-platform entities.
//!
//! All identifiers are snowflake strings assigned by the platform. Wrapping
//! them in distinct newtypes keeps a guild id from ever being passed where a
//! channel id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Return the raw snowflake string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// A guild (server) identifier.
    GuildId
);
id_type!(
    /// A user identifier, unique within the platform.
    UserId
);
id_type!(
    /// A channel identifier. Reputation is scoped per channel.
    ChannelId
);
id_type!(
    /// A message identifier. Converted answers are keyed by the message id.
    MessageId
);
