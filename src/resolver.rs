//! Token reference resolution
//!
//! Resolves token references found inside one record to the records they
//! designate in the repository. Resolution is pure and read-only; it never
//! mutates the repository.
//!
//! Self-reference policy is per reference field: a baseboard's chassis token
//! must not name the board itself, while slot peer groups legitimately
//! describe bidirectional bus links and may form cycles.
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
    BaseboardInfo, CM_NULL_TOKEN, CmNamespace, CmObject, CmObjectToken, StdObjectId, SystemSlotInfo,
};
use crate::repository::CmObjRepository;

/// Resolves `token` to the record of kind `expected` it designates.
///
/// `referencing_token` is the token of the record holding the reference; it
/// is used for self-reference detection, which callers opt out of by passing
/// [`CM_NULL_TOKEN`] for fields where self-reference is legitimate.
///
/// # Errors
///
/// * `CmError::SelfReference` - the token names the referencing record itself
/// * `CmError::DanglingToken` - no live record carries the token
/// * `CmError::TypeMismatch` - the resolved record is not of kind `expected`
pub fn resolve<'a, 'buf>(
    repo: &'a CmObjRepository<'buf>,
    referencing_token: CmObjectToken,
    token: CmObjectToken,
    expected: StdObjectId,
) -> Result<&'a CmObject<'buf>, CmError> {
    if referencing_token != CM_NULL_TOKEN && token == referencing_token {
        return Err(CmError::SelfReference);
    }

    let target = repo.find_by_token(CmNamespace::Standard, token).ok_or(CmError::DanglingToken)?;

    if target.object_id() != expected {
        log::error!(
            "token {:#x} resolves to {:?}, reference expects {:?}",
            token,
            target.object_id(),
            expected
        );
        return Err(CmError::TypeMismatch);
    }

    Ok(target)
}

/// Resolves a baseboard's chassis reference.
///
/// A NULL chassis token means the board reports no chassis and resolves to
/// `None`. A board cannot be its own chassis, so self-reference is rejected.
/// The chassis record's kind is not fixed by the Standard namespace, so any
/// live record satisfies the reference.
pub fn resolve_chassis<'a, 'buf>(
    repo: &'a CmObjRepository<'buf>,
    board: &BaseboardInfo,
) -> Result<Option<&'a CmObject<'buf>>, CmError> {
    if board.chassis_token == CM_NULL_TOKEN {
        return Ok(None);
    }
    if board.chassis_token == board.token {
        log::error!("baseboard {:#x} names itself as its chassis", board.token);
        return Err(CmError::SelfReference);
    }

    repo.find_by_token(CmNamespace::Standard, board.chassis_token).map(Some).ok_or(CmError::DanglingToken)
}

/// Resolves every contained-object reference of a baseboard.
///
/// Each entry must designate a live record whose kind renders through the
/// generator id the entry declares; a disagreement is a `TypeMismatch`. A
/// board cannot contain itself.
pub fn resolve_contained<'a, 'buf>(
    repo: &'a CmObjRepository<'buf>,
    board: &BaseboardInfo,
) -> Result<Vec<&'a CmObject<'buf>>, CmError> {
    let mut resolved = Vec::with_capacity(board.contained_objects.len());

    for contained in &board.contained_objects {
        if contained.token == board.token {
            return Err(CmError::SelfReference);
        }

        let target = repo.find_by_token(CmNamespace::Standard, contained.token).ok_or(CmError::DanglingToken)?;

        match target.object_id().std_smbios_generator() {
            Some(expected) if expected == contained.generator_id => {}
            _ => {
                log::error!(
                    "contained token {:#x} declares generator {:?} but resolves to {:?}",
                    contained.token,
                    contained.generator_id,
                    target.object_id()
                );
                return Err(CmError::TypeMismatch);
            }
        }

        resolved.push(target);
    }

    Ok(resolved)
}

/// Resolves the described peer slots of a bifurcated link.
///
/// Only entries up to `peer_grouping_count` are read. Peer references are
/// bidirectional by nature, so cycles (including a slot naming itself) are
/// permitted; a non-NULL peer token must still designate a live slot record.
pub fn resolve_peer_slots<'a, 'buf>(
    repo: &'a CmObjRepository<'buf>,
    slot: &SystemSlotInfo,
) -> Result<Vec<&'a CmObject<'buf>>, CmError> {
    let count = slot.peer_grouping_count as usize;
    let mut resolved = Vec::with_capacity(count);

    for peer in slot.peer_groups.iter().take(count) {
        if peer.peer_slot_token == CM_NULL_TOKEN {
            continue;
        }

        // Self-reference detection is deliberately skipped here
        let target = resolve(repo, CM_NULL_TOKEN, peer.peer_slot_token, StdObjectId::SystemSlotInfo)?;
        resolved.push(target);
    }

    Ok(resolved)
}

/// Walks every cross-referencing record in the repository and resolves all
/// of its references. Discovery can call this once it finishes populating
/// the repository, before the generation pass begins.
pub fn verify_cross_references(repo: &CmObjRepository<'_>) -> Result<(), CmError> {
    for (_, object) in repo.enumerate(CmNamespace::Standard, StdObjectId::BaseboardInfo) {
        if let CmObject::BaseboardInfo(board) = object {
            resolve_chassis(repo, board)?;
            resolve_contained(repo, board)?;
        }
    }

    for (_, object) in repo.enumerate(CmNamespace::Standard, StdObjectId::SystemSlotInfo) {
        if let CmObject::SystemSlotInfo(slot) = object {
            resolve_peer_slots(repo, slot)?;
        }
    }

    Ok(())
}
