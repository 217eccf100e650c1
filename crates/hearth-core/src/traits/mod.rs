// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability traits the loader depends on.

pub mod module;

pub use module::{Module, ModuleImporter, ModuleRef};
