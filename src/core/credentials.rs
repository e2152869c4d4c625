// src/core/credentials.rs

use crate::{
    core::option_resolver::{ResolveError, Session},
    system::collaborators::{CollaboratorError, CredentialIssuer},
};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("Could not acquire credentials for '{principal}': {source}")]
    Acquire {
        principal: String,
        #[source]
        source: CollaboratorError,
    },
}

/// Directory credentials held for as long as the scope lives.
///
/// Dropping the scope destroys them. A destroy failure is only logged.
#[derive(Debug)]
pub struct CredentialScope<'i> {
    issuer: &'i dyn CredentialIssuer,
    principal: String,
}

impl<'i> CredentialScope<'i> {
    /// Resolves `principal` and `keytab`, then acquires credentials for them.
    pub fn acquire(
        session: &mut Session<'_>,
        issuer: &'i dyn CredentialIssuer,
    ) -> Result<Self, CredentialError> {
        let principal = session.require("principal")?;
        let keytab = session.require("keytab")?;

        issuer
            .acquire(&principal, Path::new(&keytab))
            .map_err(|source| CredentialError::Acquire {
                principal: principal.clone(),
                source,
            })?;
        log::debug!("Credentials acquired for '{}' from '{}'", principal, keytab);

        Ok(Self { issuer, principal })
    }

    pub fn principal(&self) -> &str {
        &self.principal
    }
}

impl Drop for CredentialScope<'_> {
    fn drop(&mut self) {
        match self.issuer.destroy() {
            Ok(()) => log::debug!("Credentials for '{}' destroyed", self.principal),
            Err(e) => log::warn!(
                "Could not destroy credentials for '{}': {}",
                self.principal,
                e
            ),
        }
    }
}
