// src/system/collaborators.rs

//! Interfaces to the services the option resolution engine consults.
//!
//! Directory binding, credential issuance and hostname lookup are provided by
//! the front-end that owns those connections. The core only calls through the
//! traits below and treats every call as "returns a value or fails".

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// A failure reported by an external collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct CollaboratorError(pub String);

/// Which numeric ID space an allocation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
    User,
    Group,
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Group => write!(f, "group"),
        }
    }
}

/// Resolves the local host's fully qualified domain name.
pub trait HostResolver: fmt::Debug {
    fn fqdn(&self) -> Result<String, CollaboratorError>;
}

/// The directory service holding account entries.
pub trait DirectoryService: fmt::Debug {
    /// Availability probe for a candidate server URI.
    fn is_available(&self, server: &str) -> bool;

    /// Numeric IDs of the given kind already assigned below `base`.
    fn ids_in_use(
        &self,
        server: &str,
        base: &str,
        kind: IdKind,
    ) -> Result<BTreeSet<u32>, CollaboratorError>;
}

/// Acquires and destroys the credentials used to bind to the directory.
pub trait CredentialIssuer: fmt::Debug {
    fn acquire(&self, principal: &str, keytab: &Path) -> Result<(), CollaboratorError>;
    fn destroy(&self) -> Result<(), CollaboratorError>;
}

/// The collaborators one resolution session may call.
#[derive(Debug, Clone, Copy)]
pub struct Collaborators<'a> {
    pub host: &'a dyn HostResolver,
    pub directory: &'a dyn DirectoryService,
}
