// src/core/id_allocator.rs

use crate::{
    core::option_resolver::{ResolveError, Session},
    system::collaborators::{CollaboratorError, IdKind},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AllocationError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("Option '{option}' holds '{value}', which is not a numeric id")]
    NotNumeric { option: String, value: String },
    #[error("Empty {kind} id range: minid {min} is greater than maxid {max}")]
    EmptyRange { kind: IdKind, min: u32, max: u32 },
    #[error("No free {kind} id left between {min} and {max}")]
    Exhausted { kind: IdKind, min: u32, max: u32 },
    #[error("Directory query for {kind} ids failed: {source}")]
    Directory {
        kind: IdKind,
        #[source]
        source: CollaboratorError,
    },
}

/// Returns the lowest `kind` id in `[minid, maxid]` the directory does not use.
///
/// `server`, `base` and the range bounds are resolved through the session,
/// so unset options fall back to their defaults.
pub fn next_free_id(session: &mut Session<'_>, kind: IdKind) -> Result<u32, AllocationError> {
    let min = require_id(session, "minid")?;
    let max = require_id(session, "maxid")?;
    if min > max {
        return Err(AllocationError::EmptyRange { kind, min, max });
    }

    let server = session.require("server")?;
    let base = session.require("base")?;

    let in_use = session
        .collaborators()
        .directory
        .ids_in_use(&server, &base, kind)
        .map_err(|source| AllocationError::Directory { kind, source })?;
    log::debug!(
        "{} {} id(s) in use under '{}' on '{}'",
        in_use.len(),
        kind,
        base,
        server
    );

    let id = (min..=max)
        .find(|id| !in_use.contains(id))
        .ok_or(AllocationError::Exhausted { kind, min, max })?;
    log::debug!("Next free {} id: {}", kind, id);
    Ok(id)
}

fn require_id(session: &mut Session<'_>, option: &str) -> Result<u32, AllocationError> {
    let value = session.require(option)?;
    value.parse().map_err(|_| AllocationError::NotNumeric {
        option: option.to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{
            option_defaults::standard_registry,
            test_support::{FakeDirectory, FakeHost},
        },
        system::collaborators::Collaborators,
    };

    const SERVER: &str = "ldap://ldap.example.com";

    fn allocate(directory: &FakeDirectory, options: &[(&str, &str)]) -> Result<u32, AllocationError> {
        let host = FakeHost::new("ws1.example.com");
        let mut session = Session::new(
            standard_registry(),
            Collaborators {
                host: &host,
                directory,
            },
        );
        session.handle_option("server", SERVER).unwrap();
        session.handle_option("base", "dc=example,dc=com").unwrap();
        for (name, value) in options {
            session.handle_option(name, value).unwrap();
        }
        next_free_id(&mut session, IdKind::User)
    }

    #[test]
    fn test_lowest_free_id_is_returned() {
        let directory = FakeDirectory::accepting(&[SERVER]).with_ids(IdKind::User, &[1000, 1001, 1003]);
        assert_eq!(allocate(&directory, &[]).unwrap(), 1002);
    }

    #[test]
    fn test_group_ids_do_not_block_user_ids() {
        let directory = FakeDirectory::accepting(&[SERVER]).with_ids(IdKind::Group, &[1000, 1001]);
        assert_eq!(allocate(&directory, &[]).unwrap(), 1000);
    }

    #[test]
    fn test_custom_range() {
        let directory = FakeDirectory::accepting(&[SERVER]).with_ids(IdKind::User, &[5000]);
        let id = allocate(&directory, &[("minid", "5000"), ("maxid", "5010")]).unwrap();
        assert_eq!(id, 5001);
    }

    #[test]
    fn test_exhausted_range() {
        let directory = FakeDirectory::accepting(&[SERVER]).with_ids(IdKind::User, &[10, 11]);
        let err = allocate(&directory, &[("minid", "10"), ("maxid", "11")]).unwrap_err();
        assert!(matches!(err, AllocationError::Exhausted { min: 10, max: 11, .. }));
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let directory = FakeDirectory::accepting(&[SERVER]);
        let err = allocate(&directory, &[("minid", "20"), ("maxid", "10")]).unwrap_err();
        assert!(matches!(err, AllocationError::EmptyRange { .. }));
    }

    #[test]
    fn test_directory_failure_is_reported() {
        let directory = FakeDirectory::accepting(&[SERVER]).failing();
        let err = allocate(&directory, &[]).unwrap_err();
        assert!(matches!(err, AllocationError::Directory { kind: IdKind::User, .. }));
    }
}
