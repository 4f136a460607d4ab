// Copyright (C) 2025 Paul Hampson
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License version 3 as  published by the
// Free Software Foundation.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along with
// this program.  If not, see <https://www.gnu.org/licenses/>.

use minicbor::{CborLen, Decode, Encode};

/// Ask the node to run one of its named functions.
#[derive(Debug, PartialEq, Encode, Decode, CborLen)]
pub struct FunctionCall<'a> {
    #[b(0)] pub name: &'a str,
    #[b(1)] pub argument: &'a str,
}

/// Status the function returned. Negative means the call was not accepted.
#[derive(Debug, PartialEq, Clone, Copy, Default, Encode, Decode, CborLen)]
pub struct FunctionResult {
    #[n(0)] pub status: i32,
}
