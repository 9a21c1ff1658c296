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

use curvemsg_crypto::array;

use crate::message::CallId;

#[derive(Debug)]
pub enum Error {
    // common errors
    Io(std::io::Error),
    Json(serde_json::Error),
    CannotGetHomeDir,

    // request validation
    NotAMapping,
    LineTooLong(usize),
    MissingField(&'static str),
    WrongType(&'static str),
    InvalidLength {
        field: &'static str,
        expected: usize,
        found: usize
    },
    InvalidCallId,
    UnrecognizedCommand(String),

    // caller side
    UnknownCallId(CallId),
    UnexpectedResult(CallId),
    NoResponse(CallId),
    InvalidKeyFormat,

    // configuration
    Config(&'static str)
}

impl Error {
    pub(crate) fn from_array(field: &'static str, err: array::Error) -> Self {
        match err {
            array::Error::InvalidLength { expected, found } => Self::InvalidLength {
                field,
                expected,
                found
            }
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "Message: {err}."),
            Self::CannotGetHomeDir => write!(f, "Cannot retrieve home path."),

            // request validation
            Self::NotAMapping => write!(f, "Request: not a mapping."),
            Self::LineTooLong(l) => write!(f, "Request: line too long ({l} bytes)."),
            Self::MissingField(field) => write!(f, "Request: missing field \"{field}\"."),
            Self::WrongType(field) => write!(f, "Request: field \"{field}\" has the wrong type."),
            Self::InvalidLength { field, expected, found } => write!(
                f,
                "Request: field \"{field}\" must be {expected} bytes long (found {found})."
            ),
            Self::InvalidCallId => write!(f, "Request: \"call_id\" is not an integer."),
            Self::UnrecognizedCommand(cmd) => write!(f, "Request: unrecognized command \"{cmd}\"."),

            // caller side
            Self::UnknownCallId(id) => write!(f, "Response: no pending request with id {id}."),
            Self::UnexpectedResult(id) => write!(
                f,
                "Response: result of request {id} does not match its command."
            ),
            Self::NoResponse(id) => write!(f, "Response: request {id} was dropped."),
            Self::InvalidKeyFormat => write!(f, "Key: invalid public key format."),

            Self::Config(s) => write!(f, "Configuration: {s}.")
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;
