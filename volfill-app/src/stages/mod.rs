// SPDX-License-Identifier: GPL-3.0-only

//! The individual steps of a fill run, in execution order

pub mod capacity;
pub mod credentials;
pub mod endpoint;
pub mod path;
pub mod policy;
pub mod verify;

pub use credentials::CredentialSource;
pub use path::JunctionPath;
pub use policy::AccessVerdict;
pub use verify::Verification;
