// src/core/test_support.rs

//! In-memory collaborators shared by the unit tests.

use crate::system::collaborators::{
    CollaboratorError, CredentialIssuer, DirectoryService, HostResolver, IdKind,
};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::path::Path;

#[derive(Debug)]
pub(crate) struct FakeHost {
    fqdn: Option<String>,
}

impl FakeHost {
    pub(crate) fn new(fqdn: &str) -> Self {
        Self {
            fqdn: Some(fqdn.to_string()),
        }
    }

    /// A host whose name cannot be looked up.
    pub(crate) fn unresolvable() -> Self {
        Self { fqdn: None }
    }
}

impl HostResolver for FakeHost {
    fn fqdn(&self) -> Result<String, CollaboratorError> {
        self.fqdn
            .clone()
            .ok_or_else(|| CollaboratorError("hostname lookup failed".to_string()))
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeDirectory {
    available: BTreeSet<String>,
    users: BTreeSet<u32>,
    groups: BTreeSet<u32>,
    unreachable: bool,
}

impl FakeDirectory {
    /// A directory that answers on exactly the given server URIs.
    pub(crate) fn accepting(servers: &[&str]) -> Self {
        Self {
            available: servers.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    pub(crate) fn with_ids(mut self, kind: IdKind, ids: &[u32]) -> Self {
        let target = match kind {
            IdKind::User => &mut self.users,
            IdKind::Group => &mut self.groups,
        };
        target.extend(ids.iter().copied());
        self
    }

    /// Every ID query fails.
    pub(crate) fn failing(mut self) -> Self {
        self.unreachable = true;
        self
    }
}

impl DirectoryService for FakeDirectory {
    fn is_available(&self, server: &str) -> bool {
        self.available.contains(server)
    }

    fn ids_in_use(
        &self,
        server: &str,
        _base: &str,
        kind: IdKind,
    ) -> Result<BTreeSet<u32>, CollaboratorError> {
        if self.unreachable {
            return Err(CollaboratorError(format!("cannot bind to {}", server)));
        }
        Ok(match kind {
            IdKind::User => self.users.clone(),
            IdKind::Group => self.groups.clone(),
        })
    }
}

/// Records every call so tests can assert on the acquire/destroy pairing.
#[derive(Debug, Default)]
pub(crate) struct FakeIssuer {
    pub(crate) calls: RefCell<Vec<String>>,
    pub(crate) reject_acquire: bool,
    pub(crate) reject_destroy: bool,
}

impl CredentialIssuer for FakeIssuer {
    fn acquire(&self, principal: &str, keytab: &Path) -> Result<(), CollaboratorError> {
        self.calls
            .borrow_mut()
            .push(format!("acquire {} {}", principal, keytab.display()));
        if self.reject_acquire {
            return Err(CollaboratorError("keytab rejected".to_string()));
        }
        Ok(())
    }

    fn destroy(&self) -> Result<(), CollaboratorError> {
        self.calls.borrow_mut().push("destroy".to_string());
        if self.reject_destroy {
            return Err(CollaboratorError("credential cache busy".to_string()));
        }
        Ok(())
    }
}
