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

use crate::NodeMessages;
use crate::custom_data_types::VersionNumber;
use crate::general::hello::{Hello, HelloResp};
use crate::remote::function_call::{FunctionCall, FunctionResult};

/// A builder for creating `NodeMessages`.
pub struct NodeMessagesBuilder;

impl NodeMessagesBuilder {
    /// Creates a new `NodeMessagesBuilder`.
    pub fn new() -> Self {
        Self
    }

    /// Builds a `NodeMessages::Hello` message.
    pub fn hello(self) -> NodeMessages<'static> {
        NodeMessages::Hello(Hello {})
    }

    /// Begins building a `NodeMessages::HelloResp` message.
    pub fn hello_resp(self) -> HelloRespBuilder {
        HelloRespBuilder::new()
    }

    /// Begins building a `NodeMessages::FunctionCall` message.
    pub fn function_call<'a>(self) -> FunctionCallBuilder<'a> {
        FunctionCallBuilder::new()
    }

    /// Builds a `NodeMessages::FunctionResult` message.
    pub fn function_result(self, status: i32) -> NodeMessages<'static> {
        NodeMessages::FunctionResult(FunctionResult { status })
    }
}

impl Default for NodeMessagesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A builder for creating a `NodeMessages::HelloResp` message.
pub struct HelloRespBuilder {
    version: Option<VersionNumber>,
}

impl HelloRespBuilder {
    fn new() -> Self {
        Self { version: None }
    }

    /// Sets the version number for the `HelloResp` message.
    pub fn version(mut self, version: VersionNumber) -> Self {
        self.version = Some(version);
        self
    }

    /// Builds the `NodeMessages::HelloResp` message.
    ///
    /// # Panics
    ///
    /// Panics if `version` has not been set.
    pub fn build(self) -> NodeMessages<'static> {
        NodeMessages::HelloResp(HelloResp {
            version: self.version.expect("version must be set"),
        })
    }
}

/// A builder for creating a `NodeMessages::FunctionCall` message.
pub struct FunctionCallBuilder<'a> {
    name: Option<&'a str>,
    argument: &'a str,
}

impl<'a> FunctionCallBuilder<'a> {
    fn new() -> Self {
        Self {
            name: None,
            argument: "",
        }
    }

    pub fn name(mut self, name: &'a str) -> Self {
        self.name = Some(name);
        self
    }

    /// Defaults to an empty argument.
    pub fn argument(mut self, argument: &'a str) -> Self {
        self.argument = argument;
        self
    }

    /// Builds the `NodeMessages::FunctionCall` message.
    ///
    /// # Panics
    ///
    /// Panics if `name` has not been set.
    pub fn build(self) -> NodeMessages<'a> {
        NodeMessages::FunctionCall(FunctionCall {
            name: self.name.expect("name must be set"),
            argument: self.argument,
        })
    }
}
