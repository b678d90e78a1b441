use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Which end of a connection a peer is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Client,
    Server,
}

impl Side {
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Client => Self::Server,
            Self::Server => Self::Client,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client => f.write_str("client"),
            Self::Server => f.write_str("server"),
        }
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "client" => Ok(Self::Client),
            "server" => Ok(Self::Server),
            other => Err(format!("unknown side: {other}")),
        }
    }
}

/// Phase and direction of a packet on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkDirection {
    PlayToServer,
    PlayToClient,
    LoginToServer,
    LoginToClient,
}

impl NetworkDirection {
    pub const ALL: &'static [NetworkDirection] = &[
        Self::PlayToServer,
        Self::PlayToClient,
        Self::LoginToServer,
        Self::LoginToClient,
    ];

    /// The direction a response to a packet in this direction travels.
    #[must_use]
    pub fn reply(self) -> Self {
        match self {
            Self::PlayToServer => Self::PlayToClient,
            Self::PlayToClient => Self::PlayToServer,
            Self::LoginToServer => Self::LoginToClient,
            Self::LoginToClient => Self::LoginToServer,
        }
    }

    /// Side that sends packets in this direction.
    #[must_use]
    pub fn origination_side(self) -> Side {
        match self {
            Self::PlayToServer | Self::LoginToServer => Side::Client,
            Self::PlayToClient | Self::LoginToClient => Side::Server,
        }
    }

    /// Side that receives packets in this direction.
    #[must_use]
    pub fn reception_side(self) -> Side {
        self.origination_side().opposite()
    }

    #[must_use]
    pub fn is_login(self) -> bool {
        matches!(self, Self::LoginToServer | Self::LoginToClient)
    }
}

impl fmt::Display for NetworkDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::PlayToServer => "play-to-server",
            Self::PlayToClient => "play-to-client",
            Self::LoginToServer => "login-to-server",
            Self::LoginToClient => "login-to-client",
        };
        f.write_str(s)
    }
}

impl FromStr for NetworkDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .iter()
            .copied()
            .find(|d| d.to_string() == normalized)
            .ok_or_else(|| format!("unknown network direction: {s}"))
    }
}
