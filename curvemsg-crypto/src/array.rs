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

use zeroize::{
    Zeroize,
    ZeroizeOnDrop
};

use crate::traits::arrayt::{
    AsSlice,
    NewArray
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    InvalidLength { expected: usize, found: usize }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLength { expected, found } => write!(
                f,
                "Array: invalid length (expected {expected} bytes, found {found})."
            )
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;

// exact length only, a mismatch is never truncated nor padded
fn check_length<const N: usize>(value: &[u8]) -> Result<[u8; N]> {
    <[u8; N]>::try_from(value).map_err(|_| Error::InvalidLength {
        expected: N,
        found: value.len()
    })
}

// --- Generic array
#[derive(Clone, PartialEq, Eq)]
pub struct Array<const N: usize>([u8; N]);

impl<const N: usize> Array<N> {
    pub const LEN: usize = N;
}

impl<const N: usize> NewArray for Array<N> {
    fn new() -> Self {
        Self([0u8; N])
    }
}

impl<const N: usize> AsSlice for Array<N> {
    fn as_slice(&self) -> &[u8] {
        &self.0
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.0
    }
}

impl<const N: usize> AsMut<[u8; N]> for Array<N> {
    fn as_mut(&mut self) -> &mut [u8; N] {
        &mut self.0
    }
}

impl<const N: usize> AsRef<[u8; N]> for Array<N> {
    fn as_ref(&self) -> &[u8; N] {
        &self.0
    }
}

impl<const N: usize> From<[u8; N]> for Array<N> {
    fn from(value: [u8; N]) -> Self {
        Self(value)
    }
}

impl<const N: usize> TryFrom<&[u8]> for Array<N> {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self> {
        Ok(Self(check_length(value)?))
    }
}

impl<const N: usize> std::fmt::Debug for Array<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Array<{N}>(")?;
        for b in self.0.iter() {
            write!(f, "{b:02x}")?;
        }
        write!(f, ")")
    }
}

// --- Generic array with zeroize on drop
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ZeroizeArray<const N: usize>([u8; N]);

impl<const N: usize> ZeroizeArray<N> {
    pub const LEN: usize = N;
}

impl<const N: usize> NewArray for ZeroizeArray<N> {
    fn new() -> Self {
        Self([0u8; N])
    }
}

impl<const N: usize> AsSlice for ZeroizeArray<N> {
    fn as_slice(&self) -> &[u8] {
        &self.0
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.0
    }
}

impl<const N: usize> From<[u8; N]> for ZeroizeArray<N> {
    fn from(mut value: [u8; N]) -> Self {
        let array = Self(value);
        value.zeroize();
        array
    }
}

impl<const N: usize> TryFrom<&[u8]> for ZeroizeArray<N> {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self> {
        Ok(Self::from(check_length::<N>(value)?))
    }
}

impl<const N: usize> AsMut<[u8; N]> for ZeroizeArray<N> {
    fn as_mut(&mut self) -> &mut [u8; N] {
        &mut self.0
    }
}

impl<const N: usize> AsRef<[u8; N]> for ZeroizeArray<N> {
    fn as_ref(&self) -> &[u8; N] {
        &self.0
    }
}

impl<const N: usize> PartialEq for ZeroizeArray<N> {
    fn eq(&self, other: &Self) -> bool {
        use subtle::ConstantTimeEq;
        self.0[..].ct_eq(&other.0[..]).into()
    }
}

impl<const N: usize> Eq for ZeroizeArray<N> {}

// never print secret bytes
impl<const N: usize> std::fmt::Debug for ZeroizeArray<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ZeroizeArray<{N}>([REDACTED])")
    }
}
