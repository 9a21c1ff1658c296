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

mod config;
mod dispatch;
mod handler;
mod response;
pub mod client;
pub mod codec;
pub mod errors;
pub mod keys;
pub mod message;
pub mod request;

pub use config::{
    Config,
    get_configuration_file,
    MAX_WORKERS
};

pub use dispatch::{
    Outcome,
    dispatch
};

pub use handler::{
    handle,
    try_handle
};

pub use message::{
    CallId,
    Message,
    Value
};

pub use request::{
    Command,
    Request
};

pub use response::{
    FIELD_RES,
    Response
};

#[cfg(target_family="unix")]
const CONFIGURATION_FILE: &str = ".curvemsg/curvemsg.conf";
#[cfg(target_family="windows")]
const CONFIGURATION_FILE: &str = "Documents/curvemsg/curvemsg.conf";
