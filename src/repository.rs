//! Configuration Manager object repository
//!
//! In-memory store mapping (namespace, object id, token) to one object
//! record. Discovery inserts fully-formed records through the single write
//! path; the generation pipeline reads them back through `get` and
//! `enumerate`. The repository owns every inserted record; raw table
//! payloads inside request records stay borrowed from the producer.
//!
//! Structural invariants (declared counts matching trailing array lengths)
//! are enforced at insert time, so no generator can ever observe a
//! malformed record.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!

extern crate alloc;

use alloc::vec::Vec;

use crate::error::CmError;
use crate::object::{
    CM_NULL_TOKEN, CmNamespace, CmObject, CmObjectToken, ConfigurationManagerInfo, MAX_SLOT_PEER_GROUP, StdObjectId,
};

/// One stored record together with its identity key.
#[derive(Debug, Clone)]
struct RepoEntry<'buf> {
    namespace: CmNamespace,
    object_id: StdObjectId,
    token: CmObjectToken,
    object: CmObject<'buf>,
}

/// The Configuration Manager object repository.
///
/// Explicitly constructed and torn down with one discovery/generation
/// session; passed by reference to the pipeline. Records are kept in
/// insertion order so enumeration is deterministic.
#[derive(Default)]
pub struct CmObjRepository<'buf> {
    entries: Vec<RepoEntry<'buf>>,
}

impl<'buf> CmObjRepository<'buf> {
    /// Creates an empty repository for one session.
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Inserts a record under (namespace, object id, token).
    ///
    /// The object id is derived from the record kind. For record kinds that
    /// carry their own token field, `token` must equal it. Tokens identify
    /// one object instance process-wide, so a token may key at most one
    /// record per namespace regardless of kind; [`CM_NULL_TOKEN`] never
    /// identifies an object and is accepted only for singleton kinds, whose
    /// instance is reachable without a token.
    ///
    /// # Errors
    ///
    /// * `CmError::DuplicateSingleton` - a [`ConfigurationManagerInfo`] is already present
    /// * `CmError::DuplicateToken` - `token` already identifies a record in `namespace`
    /// * `CmError::MalformedRecord` - a declared count disagrees with the
    ///   record's trailing array, `token` disagrees with the record's own
    ///   token field, or a non-singleton record is keyed by the NULL token
    ///
    /// All insert errors indicate a corrupt discovery source and are fatal
    /// to the session.
    pub fn insert(
        &mut self,
        namespace: CmNamespace,
        token: CmObjectToken,
        object: CmObject<'buf>,
    ) -> Result<(), CmError> {
        let object_id = object.object_id();

        validate_structure(&object)?;

        if let Some(intrinsic) = object.intrinsic_token()
            && intrinsic != token
        {
            log::error!(
                "insert token {:#x} disagrees with record's own token {:#x} for {:?}",
                token,
                intrinsic,
                object_id
            );
            return Err(CmError::MalformedRecord);
        }

        if token == CM_NULL_TOKEN && !object_id.is_singleton() {
            log::error!("NULL token used to key a {:?} record; only singleton kinds may omit a token", object_id);
            return Err(CmError::MalformedRecord);
        }

        if object_id.is_singleton() && self.entries.iter().any(|e| e.namespace == namespace && e.object_id == object_id)
        {
            log::error!("second {:?} inserted; singleton kinds allow exactly one instance", object_id);
            return Err(CmError::DuplicateSingleton);
        }

        if token != CM_NULL_TOKEN && self.entries.iter().any(|e| e.namespace == namespace && e.token == token) {
            log::error!("token {:#x} already identifies a record in {:?}", token, namespace);
            return Err(CmError::DuplicateToken);
        }

        self.entries.push(RepoEntry { namespace, object_id, token, object });
        Ok(())
    }

    /// Returns the record stored under (namespace, object id, token).
    ///
    /// A [`CM_NULL_TOKEN`] lookup of a kind with exactly one stored instance
    /// returns that instance directly, so callers of single-instance kinds
    /// need not know the producer's token.
    ///
    /// # Errors
    ///
    /// Returns `CmError::NotFound` if no record matches, or if a NULL-token
    /// lookup is ambiguous because several instances of the kind exist.
    pub fn get(
        &self,
        namespace: CmNamespace,
        object_id: StdObjectId,
        token: CmObjectToken,
    ) -> Result<&CmObject<'buf>, CmError> {
        if token == CM_NULL_TOKEN {
            let mut matches = self.entries.iter().filter(|e| e.namespace == namespace && e.object_id == object_id);
            return match (matches.next(), matches.next()) {
                (Some(entry), None) => Ok(&entry.object),
                _ => Err(CmError::NotFound),
            };
        }

        self.entries
            .iter()
            .find(|e| e.namespace == namespace && e.object_id == object_id && e.token == token)
            .map(|e| &e.object)
            .ok_or(CmError::NotFound)
    }

    /// Finds the record identified by `token` anywhere in `namespace`,
    /// regardless of kind. Used by the token resolver for reference fields
    /// whose target kind is not fixed.
    pub fn find_by_token(&self, namespace: CmNamespace, token: CmObjectToken) -> Option<&CmObject<'buf>> {
        if token == CM_NULL_TOKEN {
            return None;
        }
        self.entries.iter().find(|e| e.namespace == namespace && e.token == token).map(|e| &e.object)
    }

    /// Returns a lazy, restartable iterator over all records of one kind, in
    /// insertion order.
    pub fn enumerate(&self, namespace: CmNamespace, object_id: StdObjectId) -> CmObjectIter<'_, 'buf> {
        CmObjectIter { entries: &self.entries, position: 0, namespace, object_id }
    }

    /// Returns the session's [`ConfigurationManagerInfo`] singleton.
    pub fn cfg_mgr_info(&self) -> Result<&ConfigurationManagerInfo, CmError> {
        match self.get(CmNamespace::Standard, StdObjectId::CfgMgrInfo, CM_NULL_TOKEN)? {
            CmObject::CfgMgrInfo(info) => Ok(info),
            // insert() keys records by their own kind, so this arm is unreachable
            _ => Err(CmError::NotFound),
        }
    }

    /// Number of records stored.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no records have been inserted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Rejects records whose declared counts disagree with their actual
/// variable-length contents.
fn validate_structure(object: &CmObject<'_>) -> Result<(), CmError> {
    match object {
        CmObject::BaseboardInfo(board) => {
            if board.number_of_contained_object_handles as usize != board.contained_objects.len() {
                log::error!(
                    "baseboard {:#x} declares {} contained objects but carries {}",
                    board.token,
                    board.number_of_contained_object_handles,
                    board.contained_objects.len()
                );
                return Err(CmError::MalformedRecord);
            }
        }
        CmObject::SystemSlotInfo(slot) => {
            if slot.peer_grouping_count as usize > MAX_SLOT_PEER_GROUP {
                log::error!(
                    "slot {:#x} declares {} peer groups, capacity is {}",
                    slot.token,
                    slot.peer_grouping_count,
                    MAX_SLOT_PEER_GROUP
                );
                return Err(CmError::MalformedRecord);
            }
        }
        _ => {}
    }
    Ok(())
}

/// Iterator over repository records of one (namespace, object id) kind.
///
/// Yields records in insertion order. The iterator borrows the repository,
/// so it is restartable by calling [`CmObjRepository::enumerate`] again.
pub struct CmObjectIter<'a, 'buf> {
    entries: &'a [RepoEntry<'buf>],
    position: usize,
    namespace: CmNamespace,
    object_id: StdObjectId,
}

impl<'a, 'buf> Iterator for CmObjectIter<'a, 'buf> {
    type Item = (CmObjectToken, &'a CmObject<'buf>);

    fn next(&mut self) -> Option<Self::Item> {
        while self.position < self.entries.len() {
            let entry = &self.entries[self.position];
            self.position += 1;

            if entry.namespace == self.namespace && entry.object_id == self.object_id {
                return Some((entry.token, &entry.object));
            }
        }

        None
    }
}
