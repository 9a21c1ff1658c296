// CurveMsg, Curve25519 and Ed25519 operations over structured messages
// Copyright (C) 2025 A. Russon
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Request validation.
//!
//! Every field a command needs is extracted and checked before any
//! cryptographic code runs. Fixed-size fields only become fixed-size arrays
//! after an exact length check.

use curvemsg_crypto::{
    array::{
        Array,
        ZeroizeArray
    },
    curve25519::KEY_LEN,
    ed25519::Ed25519
};

use crate::{
    errors::{
        Error,
        Result
    },
    message::{
        CallId,
        Message,
        Value
    }
};

pub const FIELD_COMMAND: &str = "command";
pub const FIELD_CALL_ID: &str = "call_id";
pub const FIELD_PRIV: &str = "priv";
pub const FIELD_PUB: &str = "pub";
pub const FIELD_MSG: &str = "msg";
pub const FIELD_SIG: &str = "sig";

pub type PrivKey = ZeroizeArray<KEY_LEN>;
pub type PubKey = Array<KEY_LEN>;
pub type Signature = Array<{ Ed25519::SIG_LEN }>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    BytesToPriv,
    PrivToPub,
    Ecdhe,
    Ed25519Sign,
    Ed25519Verify,
    Unrecognized(String)
}

impl Command {
    pub const BYTES_TO_PRIV: &str = "bytesToPriv";
    pub const PRIV_TO_PUB: &str = "privToPub";
    pub const ECDHE: &str = "ECDHE";
    pub const ED25519_SIGN: &str = "Ed25519Sign";
    pub const ED25519_VERIFY: &str = "Ed25519Verify";

    pub fn tag(&self) -> &str {
        match self {
            Self::BytesToPriv => Self::BYTES_TO_PRIV,
            Self::PrivToPub => Self::PRIV_TO_PUB,
            Self::Ecdhe => Self::ECDHE,
            Self::Ed25519Sign => Self::ED25519_SIGN,
            Self::Ed25519Verify => Self::ED25519_VERIFY,
            Self::Unrecognized(tag) => tag
        }
    }
}

// tags are case-sensitive
impl From<&str> for Command {
    fn from(tag: &str) -> Self {
        match tag {
            Self::BYTES_TO_PRIV => Self::BytesToPriv,
            Self::PRIV_TO_PUB => Self::PrivToPub,
            Self::ECDHE => Self::Ecdhe,
            Self::ED25519_SIGN => Self::Ed25519Sign,
            Self::ED25519_VERIFY => Self::Ed25519Verify,
            _ => Self::Unrecognized(tag.to_string())
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// A request whose arguments all passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    BytesToPriv { private_key: PrivKey },
    PrivToPub { private_key: PrivKey },
    Ecdhe { private_key: PrivKey, public_key: PubKey },
    Ed25519Sign { private_key: PrivKey, msg: Vec<u8> },
    Ed25519Verify { public_key: PubKey, msg: Vec<u8>, sig: Signature }
}

impl Request {
    /// Validates `message` and returns its correlation token with the typed
    /// request. The call id and the command tag are checked first, then every
    /// field the command requires; any failure rejects the whole message.
    pub fn validate(message: &Message) -> Result<(CallId, Self)> {
        let call_id = CallId::from_value(required(message, FIELD_CALL_ID)?)?;
        let command = match required(message, FIELD_COMMAND)? {
            Value::Str(tag) => Command::from(tag.as_str()),
            _ => return Err(Error::WrongType(FIELD_COMMAND))
        };

        let request = match command {
            Command::BytesToPriv => Self::BytesToPriv {
                private_key: fixed(message, FIELD_PRIV)?
            },
            Command::PrivToPub => Self::PrivToPub {
                private_key: fixed(message, FIELD_PRIV)?
            },
            Command::Ecdhe => Self::Ecdhe {
                private_key: fixed(message, FIELD_PRIV)?,
                public_key: fixed(message, FIELD_PUB)?
            },
            Command::Ed25519Sign => Self::Ed25519Sign {
                private_key: fixed(message, FIELD_PRIV)?,
                msg: variable(message, FIELD_MSG)?
            },
            Command::Ed25519Verify => Self::Ed25519Verify {
                public_key: fixed(message, FIELD_PUB)?,
                msg: variable(message, FIELD_MSG)?,
                sig: fixed(message, FIELD_SIG)?
            },
            Command::Unrecognized(tag) => return Err(Error::UnrecognizedCommand(tag))
        };
        Ok((call_id, request))
    }

    pub fn command(&self) -> Command {
        match self {
            Self::BytesToPriv { .. } => Command::BytesToPriv,
            Self::PrivToPub { .. } => Command::PrivToPub,
            Self::Ecdhe { .. } => Command::Ecdhe,
            Self::Ed25519Sign { .. } => Command::Ed25519Sign,
            Self::Ed25519Verify { .. } => Command::Ed25519Verify
        }
    }

    /// Builds the message carrying this request.
    pub fn to_message(&self, call_id: CallId) -> Message {
        use curvemsg_crypto::traits::arrayt::AsSlice;

        let mut message = Message::new();
        message
            .insert(FIELD_COMMAND, self.command().tag())
            .insert(FIELD_CALL_ID, call_id);
        match self {
            Self::BytesToPriv { private_key } | Self::PrivToPub { private_key } => {
                message.insert(FIELD_PRIV, private_key.as_slice());
            },
            Self::Ecdhe { private_key, public_key } => {
                message
                    .insert(FIELD_PRIV, private_key.as_slice())
                    .insert(FIELD_PUB, public_key.as_slice());
            },
            Self::Ed25519Sign { private_key, msg } => {
                message
                    .insert(FIELD_PRIV, private_key.as_slice())
                    .insert(FIELD_MSG, msg.as_slice());
            },
            Self::Ed25519Verify { public_key, msg, sig } => {
                message
                    .insert(FIELD_PUB, public_key.as_slice())
                    .insert(FIELD_MSG, msg.as_slice())
                    .insert(FIELD_SIG, sig.as_slice());
            }
        }
        message
    }
}

fn required<'a>(message: &'a Message, field: &'static str) -> Result<&'a Value> {
    message.get(field).ok_or(Error::MissingField(field))
}

fn bytes<'a>(message: &'a Message, field: &'static str) -> Result<&'a [u8]> {
    match required(message, field)? {
        Value::Bytes(b) => Ok(b),
        _ => Err(Error::WrongType(field))
    }
}

// exact length, converted only once the length is known to match
fn fixed<T>(message: &Message, field: &'static str) -> Result<T>
where
    T: for<'b> TryFrom<&'b [u8], Error = curvemsg_crypto::array::Error>
{
    T::try_from(bytes(message, field)?).map_err(|err| Error::from_array(field, err))
}

// any length, including 0
fn variable(message: &Message, field: &'static str) -> Result<Vec<u8>> {
    Ok(bytes(message, field)?.to_vec())
}
