//! Table generator interface and registry
//!
//! A generator is a pure function of (resolved CM objects, OEM defaults)
//! producing the bytes of one firmware table. Generators are registered
//! ahead of the generation pass under a (table standard, generator id) key;
//! a request naming an id with no registered generator yields a localized
//! `UnknownGenerator` failure for that one table, which is how the pipeline
//! stays forward compatible with generator ids it does not recognize.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!

extern crate alloc;

use alloc::boxed::Box;
use alloc::collections::btree_map::BTreeMap;
use alloc::vec::Vec;

use crate::error::CmError;
use crate::object::{AcpiTableInfo, ConfigurationManagerInfo, SmbiosTableInfo, StdObjectId};
use crate::repository::CmObjRepository;

/// The binary table standards this pipeline can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TableStandard {
    /// ACPI description tables
    Acpi,
    /// SMBIOS structures
    Smbios,
}

/// Identifies one table generator within a table standard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct GeneratorId(pub u32);

impl GeneratorId {
    /// Generator id for a standard ACPI table generator.
    pub const fn std_acpi(table_id: u32) -> Self {
        Self(table_id)
    }

    /// Generator id for a standard SMBIOS structure generator. The id
    /// carries the SMBIOS structure type it renders.
    pub const fn std_smbios(table_type: u8) -> Self {
        Self(table_type as u32)
    }
}

/// Standard ACPI RAW generator: installs a caller-supplied table image.
pub const STD_ACPI_GENERATOR_RAW: GeneratorId = GeneratorId::std_acpi(0x01);
/// Standard DSDT generator (payload supplied by the platform).
pub const STD_ACPI_GENERATOR_DSDT: GeneratorId = GeneratorId::std_acpi(0x02);
/// Standard SSDT generator (payload supplied by the platform).
pub const STD_ACPI_GENERATOR_SSDT: GeneratorId = GeneratorId::std_acpi(0x03);

/// Standard SMBIOS RAW generator: installs a caller-supplied structure.
pub const STD_SMBIOS_GENERATOR_RAW: GeneratorId = GeneratorId::std_smbios(0x80);
/// Standard SMBIOS Type 2 (baseboard information) generator.
pub const STD_SMBIOS_GENERATOR_TYPE02: GeneratorId = GeneratorId::std_smbios(2);
/// Standard SMBIOS Type 9 (system slots) generator.
pub const STD_SMBIOS_GENERATOR_TYPE09: GeneratorId = GeneratorId::std_smbios(9);
/// Standard SMBIOS Type 38 (IPMI device information) generator.
pub const STD_SMBIOS_GENERATOR_TYPE38: GeneratorId = GeneratorId::std_smbios(38);

impl StdObjectId {
    /// The standard SMBIOS generator that renders records of this kind, for
    /// kinds that map onto one SMBIOS structure type. Contained-object
    /// references are checked against this mapping.
    pub fn std_smbios_generator(self) -> Option<GeneratorId> {
        match self {
            Self::BaseboardInfo => Some(STD_SMBIOS_GENERATOR_TYPE02),
            Self::SystemSlotInfo => Some(STD_SMBIOS_GENERATOR_TYPE09),
            Self::IpmiDeviceInfo => Some(STD_SMBIOS_GENERATOR_TYPE38),
            _ => None,
        }
    }
}

/// The table request a generator was dispatched for.
#[derive(Debug, Clone, Copy)]
pub enum TableRequest<'a, 'buf> {
    /// An ACPI table request
    Acpi(&'a AcpiTableInfo<'buf>),
    /// An SMBIOS structure request
    Smbios(&'a SmbiosTableInfo<'buf>),
}

/// Everything a generator may consult while building one table: the
/// repository of resolved CM objects, the session's OEM defaults, and the
/// request record that named the generator.
pub struct GeneratorContext<'a, 'buf> {
    /// The session's object repository, read-only during the pass
    pub repo: &'a CmObjRepository<'buf>,
    /// The Configuration Manager information singleton
    pub cfg_mgr: &'a ConfigurationManagerInfo,
    /// The request being generated
    pub request: TableRequest<'a, 'buf>,
    /// The resolved minor revision for the table: the request's override, or
    /// the generator's latest supported minor revision
    pub minor_revision: u8,
}

/// One binary table generator.
///
/// For ACPI, `build` returns the table body excluding the standard
/// description header; the pipeline prepends and stamps the header. For
/// SMBIOS, `build` returns the complete structure including its 4-byte
/// header and string pool.
pub trait TableGenerator {
    /// Builds the table bytes from the resolved CM objects in the context.
    fn build(&self, ctx: &GeneratorContext<'_, '_>) -> Result<Vec<u8>, CmError>;

    /// The latest minor revision of the table this generator supports, used
    /// when the request leaves the minor revision unset.
    fn latest_minor_revision(&self) -> u8 {
        0
    }
}

/// Registry mapping (table standard, generator id) to a generator.
#[derive(Default)]
pub struct GeneratorRegistry {
    generators: BTreeMap<(TableStandard, GeneratorId), Box<dyn TableGenerator>>,
}

impl GeneratorRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self { generators: BTreeMap::new() }
    }

    /// Registers a generator under (standard, id).
    ///
    /// # Errors
    ///
    /// Returns `CmError::AlreadyRegistered` if the key is taken; the
    /// existing registration is left in place.
    pub fn register(
        &mut self,
        standard: TableStandard,
        id: GeneratorId,
        generator: Box<dyn TableGenerator>,
    ) -> Result<(), CmError> {
        if self.generators.contains_key(&(standard, id)) {
            log::error!("generator ({:?}, {:?}) is already registered", standard, id);
            return Err(CmError::AlreadyRegistered);
        }
        self.generators.insert((standard, id), generator);
        Ok(())
    }

    /// Looks up the generator registered under (standard, id).
    ///
    /// # Errors
    ///
    /// Returns `CmError::UnknownGenerator` if nothing is registered.
    pub fn lookup(&self, standard: TableStandard, id: GeneratorId) -> Result<&dyn TableGenerator, CmError> {
        self.generators.get(&(standard, id)).map(|g| g.as_ref()).ok_or(CmError::UnknownGenerator)
    }

    /// Number of registered generators.
    pub fn len(&self) -> usize {
        self.generators.len()
    }

    /// True when no generators are registered.
    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}
