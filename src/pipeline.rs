//! Table generation pipeline
//!
//! Orchestrates one generation pass: for each table requested through the
//! repository's ACPI and SMBIOS request lists, resolve the governing CM
//! objects, dispatch the matching generator, then size, stamp and checksum
//! the resulting image. Finished images are handed back to the caller; the
//! pipeline does not install tables.
//!
//! A failure while generating one table is isolated to that request and
//! recorded in the outcome's failure list, so one bad request never blocks
//! unrelated tables.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!

extern crate alloc;

use alloc::vec::Vec;

use zerocopy::{FromBytes, IntoBytes};
use zerocopy_derive::{FromBytes as DeriveFromBytes, Immutable, IntoBytes as DeriveIntoBytes, KnownLayout};

use crate::error::CmError;
use crate::generator::{GeneratorContext, GeneratorId, GeneratorRegistry, TableRequest, TableStandard};
use crate::object::{AcpiTableInfo, CmNamespace, CmObject, ConfigurationManagerInfo, SmbiosTableInfo, StdObjectId};
use crate::repository::CmObjRepository;

/// Creator id stamped into every synthesized ACPI table header.
pub const TABLE_CREATOR_ID: [u8; 4] = *b"DYNT";

/// Creator revision stamped into every synthesized ACPI table header.
pub const TABLE_CREATOR_REVISION: u32 = 0x0001_0000;

/// Standard ACPI description header
/// Per ACPI specification 6.5, section 5.2.6
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, PartialEq, DeriveFromBytes, DeriveIntoBytes, Immutable, KnownLayout)]
pub struct AcpiDescriptionHeader {
    /// ASCII table signature (0x00)
    pub signature: [u8; 4],
    /// Length of the entire table including this header (0x04)
    pub length: u32,
    /// Table revision (0x08)
    pub revision: u8,
    /// Checksum: entire table must sum to zero (0x09)
    pub checksum: u8,
    /// OEM identification (0x0A)
    pub oem_id: [u8; 6],
    /// OEM table identification (0x10)
    pub oem_table_id: u64,
    /// OEM revision (0x18)
    pub oem_revision: u32,
    /// Vendor id of the utility that created the table (0x1C)
    pub creator_id: [u8; 4],
    /// Revision of the utility that created the table (0x20)
    pub creator_revision: u32,
}

impl AcpiDescriptionHeader {
    /// Size of the header structure in bytes
    pub const SIZE: usize = core::mem::size_of::<Self>();

    /// Byte offset of the checksum field
    pub const CHECKSUM_OFFSET: usize = 9;
}

/// One successfully generated table image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedTable {
    /// The table standard the image conforms to
    pub standard: TableStandard,
    /// The table signature, for ACPI images
    pub signature: Option<[u8; 4]>,
    /// The complete binary image, header first
    pub image: Vec<u8>,
}

/// One table request the pipeline could not satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFailure {
    /// The table standard of the failed request
    pub standard: TableStandard,
    /// Position of the request within its standard's enumeration
    pub index: usize,
    /// The generator id the request named
    pub generator_id: GeneratorId,
    /// Why generation failed
    pub error: CmError,
}

/// The result of one generation pass: every successfully generated image
/// plus a diagnostic entry for every request that failed.
#[derive(Debug, Default)]
pub struct GenerationOutcome {
    /// Successfully generated table images
    pub tables: Vec<GeneratedTable>,
    /// Requests that failed, with their error kind
    pub failures: Vec<TableFailure>,
}

impl GenerationOutcome {
    /// True when every requested table was generated.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// The table generation pipeline.
///
/// Borrows the session's repository and generator registry for the duration
/// of one pass; the repository is read-only once the pass starts.
pub struct GenerationPipeline<'a, 'buf> {
    repo: &'a CmObjRepository<'buf>,
    registry: &'a GeneratorRegistry,
}

impl<'a, 'buf> GenerationPipeline<'a, 'buf> {
    /// Creates a pipeline over one repository and registry.
    pub fn new(repo: &'a CmObjRepository<'buf>, registry: &'a GeneratorRegistry) -> Self {
        Self { repo, registry }
    }

    /// Runs one generation pass over every requested ACPI and SMBIOS table.
    ///
    /// Per-table failures are collected in the outcome rather than aborting
    /// the pass.
    ///
    /// # Errors
    ///
    /// Returns `CmError::NotFound` if the repository holds no
    /// [`ConfigurationManagerInfo`]: without OEM defaults no header can be
    /// stamped, so the whole pass is meaningless.
    pub fn run(&self) -> Result<GenerationOutcome, CmError> {
        let cfg_mgr = self.repo.cfg_mgr_info()?;
        let mut outcome = GenerationOutcome::default();

        for (index, (_, object)) in
            self.repo.enumerate(CmNamespace::Standard, StdObjectId::AcpiTableList).enumerate()
        {
            let CmObject::AcpiTableInfo(info) = object else { continue };
            match self.generate_acpi(cfg_mgr, info) {
                Ok(image) => outcome.tables.push(GeneratedTable {
                    standard: TableStandard::Acpi,
                    signature: Some(info.signature),
                    image,
                }),
                Err(error) => {
                    log::warn!(
                        "ACPI request {} (signature {:?}, generator {:?}) failed: {:?}",
                        index,
                        core::str::from_utf8(&info.signature).unwrap_or("????"),
                        info.generator_id,
                        error
                    );
                    outcome.failures.push(TableFailure {
                        standard: TableStandard::Acpi,
                        index,
                        generator_id: info.generator_id,
                        error,
                    });
                }
            }
        }

        for (index, (_, object)) in
            self.repo.enumerate(CmNamespace::Standard, StdObjectId::SmbiosTableList).enumerate()
        {
            let CmObject::SmbiosTableInfo(info) = object else { continue };
            match self.generate_smbios(cfg_mgr, info) {
                Ok(image) => {
                    outcome.tables.push(GeneratedTable { standard: TableStandard::Smbios, signature: None, image })
                }
                Err(error) => {
                    log::warn!("SMBIOS request {} (generator {:?}) failed: {:?}", index, info.generator_id, error);
                    outcome.failures.push(TableFailure {
                        standard: TableStandard::Smbios,
                        index,
                        generator_id: info.generator_id,
                        error,
                    });
                }
            }
        }

        log::debug!("generation pass complete: {} tables, {} failures", outcome.tables.len(), outcome.failures.len());
        Ok(outcome)
    }

    /// Generates one ACPI table image.
    ///
    /// A supplied payload is authoritative: it is re-validated, restamped
    /// with the resolved OEM fields and resealed, and no generator runs.
    fn generate_acpi(
        &self,
        cfg_mgr: &ConfigurationManagerInfo,
        info: &AcpiTableInfo<'buf>,
    ) -> Result<Vec<u8>, CmError> {
        let oem_table_id = resolved_oem_table_id(info, cfg_mgr);
        let oem_revision = info.oem_revision.unwrap_or(cfg_mgr.revision);

        if let Some(data) = info.table_data {
            let mut image = validate_raw_acpi_payload(data)?;
            // Keep the payload's revision and creator fields; restamp identity
            image[0..4].copy_from_slice(&info.signature);
            image[10..16].copy_from_slice(&cfg_mgr.oem_id);
            image[16..24].copy_from_slice(&oem_table_id.to_le_bytes());
            image[24..28].copy_from_slice(&oem_revision.to_le_bytes());
            seal_checksum(&mut image, AcpiDescriptionHeader::CHECKSUM_OFFSET);
            return Ok(image);
        }

        let generator = self.registry.lookup(TableStandard::Acpi, info.generator_id)?;
        let minor_revision = info.minor_revision.unwrap_or_else(|| generator.latest_minor_revision());

        let ctx = GeneratorContext {
            repo: self.repo,
            cfg_mgr,
            request: TableRequest::Acpi(info),
            minor_revision,
        };
        let body = generator.build(&ctx)?;

        let header = AcpiDescriptionHeader {
            signature: info.signature,
            length: (AcpiDescriptionHeader::SIZE + body.len()) as u32,
            revision: info.revision,
            checksum: 0,
            oem_id: cfg_mgr.oem_id,
            oem_table_id,
            oem_revision,
            creator_id: TABLE_CREATOR_ID,
            creator_revision: TABLE_CREATOR_REVISION,
        };

        let mut image = Vec::with_capacity(AcpiDescriptionHeader::SIZE + body.len());
        image.extend_from_slice(header.as_bytes());
        image.extend_from_slice(&body);
        seal_checksum(&mut image, AcpiDescriptionHeader::CHECKSUM_OFFSET);
        Ok(image)
    }

    /// Generates one SMBIOS structure image.
    ///
    /// A supplied payload is authoritative after structural validation;
    /// otherwise the registered generator builds the structure and its
    /// output is validated the same way.
    fn generate_smbios(
        &self,
        cfg_mgr: &ConfigurationManagerInfo,
        info: &SmbiosTableInfo<'buf>,
    ) -> Result<Vec<u8>, CmError> {
        if let Some(data) = info.table_data {
            validate_smbios_structure(data)?;
            return Ok(data.to_vec());
        }

        let generator = self.registry.lookup(TableStandard::Smbios, info.generator_id)?;
        let ctx = GeneratorContext {
            repo: self.repo,
            cfg_mgr,
            request: TableRequest::Smbios(info),
            minor_revision: 0,
        };
        let image = generator.build(&ctx)?;
        validate_smbios_structure(&image)?;
        Ok(image)
    }
}

/// Synthesizes the OEM table id when the request leaves it unset: the low
/// 32 bits come from the first four OEM id bytes, the high 32 bits from the
/// table signature.
fn resolved_oem_table_id(info: &AcpiTableInfo<'_>, cfg_mgr: &ConfigurationManagerInfo) -> u64 {
    info.oem_table_id.unwrap_or_else(|| {
        let oem = u32::from_le_bytes([cfg_mgr.oem_id[0], cfg_mgr.oem_id[1], cfg_mgr.oem_id[2], cfg_mgr.oem_id[3]]);
        let signature = u32::from_le_bytes(info.signature);
        oem as u64 | (signature as u64) << 32
    })
}

/// Validates an externally supplied ACPI table image and returns an owned
/// copy ready for restamping.
fn validate_raw_acpi_payload(data: &[u8]) -> Result<Vec<u8>, CmError> {
    let (header, _rest) =
        AcpiDescriptionHeader::read_from_prefix(data).map_err(|_| CmError::MalformedRecord)?;

    let declared = header.length;
    if declared as usize != data.len() {
        log::error!("raw ACPI payload declares {} bytes, buffer holds {}", declared, data.len());
        return Err(CmError::MalformedRecord);
    }

    if byte_sum(data) != 0 {
        return Err(CmError::ChecksumMismatch);
    }

    Ok(data.to_vec())
}

/// Validates an SMBIOS structure: 4-byte header, formatted area contained in
/// the buffer, and a string pool terminated by a double null with no empty
/// strings in the middle.
pub fn validate_smbios_structure(data: &[u8]) -> Result<(), CmError> {
    // type, length, handle
    if data.len() < 4 {
        return Err(CmError::MalformedRecord);
    }

    let formatted_length = data[1] as usize;
    if formatted_length < 4 || formatted_length + 2 > data.len() {
        return Err(CmError::MalformedRecord);
    }

    let string_pool = &data[formatted_length..];
    let len = string_pool.len();
    if len < 2 || string_pool[len - 1] != 0 || string_pool[len - 2] != 0 {
        return Err(CmError::MalformedRecord);
    }

    // Empty pool is just the double null
    if len == 2 {
        return Ok(());
    }

    // Consecutive nulls before the terminator would produce an empty string
    if string_pool[..len - 2].split(|&b| b == 0).any(|s| s.is_empty()) {
        return Err(CmError::MalformedRecord);
    }

    Ok(())
}

/// Unsigned byte sum of the image, modulo 256.
fn byte_sum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// Writes the checksum byte so the entire image sums to zero. Computed last,
/// over the fully assembled image with the checksum field zeroed.
fn seal_checksum(image: &mut [u8], checksum_offset: usize) {
    image[checksum_offset] = 0;
    image[checksum_offset] = 0u8.wrapping_sub(byte_sum(image));
}

#[cfg(test)]
mod tests {
    use super::*;
    extern crate std;
    use std::vec;

    use alloc::boxed::Box;
    use alloc::vec::Vec;

    use crate::generator::TableGenerator;
    use crate::object::CM_NULL_TOKEN;

    /// Generator that emits a fixed table body.
    struct FixedBodyGenerator(&'static [u8]);

    impl TableGenerator for FixedBodyGenerator {
        fn build(&self, _ctx: &GeneratorContext<'_, '_>) -> Result<Vec<u8>, CmError> {
            Ok(self.0.to_vec())
        }
    }

    /// Generator that emits a minimal valid SMBIOS structure.
    struct FixedSmbiosGenerator;

    impl TableGenerator for FixedSmbiosGenerator {
        fn build(&self, _ctx: &GeneratorContext<'_, '_>) -> Result<Vec<u8>, CmError> {
            let mut bytes = vec![38u8, 4, 0x01, 0x00];
            bytes.extend_from_slice(b"IPMI Device\0\0");
            Ok(bytes)
        }
    }

    /// Generator that reports minor revision support without a payload.
    struct MinorRevProbe;

    impl TableGenerator for MinorRevProbe {
        fn build(&self, ctx: &GeneratorContext<'_, '_>) -> Result<Vec<u8>, CmError> {
            Ok(vec![ctx.minor_revision])
        }

        fn latest_minor_revision(&self) -> u8 {
            4
        }
    }

    fn repo_with_cfg_mgr<'buf>() -> CmObjRepository<'buf> {
        let mut repo = CmObjRepository::new();
        repo.insert(
            CmNamespace::Standard,
            CM_NULL_TOKEN,
            CmObject::CfgMgrInfo(ConfigurationManagerInfo { revision: 42, oem_id: *b"ARMLTD" }),
        )
        .expect("insert failed");
        repo
    }

    fn acpi_request(signature: [u8; 4], generator_id: GeneratorId) -> CmObject<'static> {
        CmObject::AcpiTableInfo(AcpiTableInfo {
            signature,
            revision: 2,
            minor_revision: None,
            generator_id,
            table_data: None,
            oem_table_id: None,
            oem_revision: None,
        })
    }

    /// Builds a complete, correctly checksummed ACPI image for raw payload tests.
    fn sealed_acpi_image(signature: [u8; 4], body: &[u8]) -> Vec<u8> {
        let header = AcpiDescriptionHeader {
            signature,
            length: (AcpiDescriptionHeader::SIZE + body.len()) as u32,
            revision: 1,
            checksum: 0,
            oem_id: *b"OEMID ",
            oem_table_id: 0x1122_3344_5566_7788,
            oem_revision: 9,
            creator_id: *b"UTIL",
            creator_revision: 5,
        };
        let mut image = Vec::new();
        image.extend_from_slice(header.as_bytes());
        image.extend_from_slice(body);
        seal_checksum(&mut image, AcpiDescriptionHeader::CHECKSUM_OFFSET);
        image
    }

    #[test]
    fn test_acpi_header_size() {
        assert_eq!(AcpiDescriptionHeader::SIZE, 36);
    }

    #[test]
    fn test_generated_acpi_header_fields() {
        let mut repo = repo_with_cfg_mgr();
        repo.insert(CmNamespace::Standard, 1, acpi_request(*b"SSDT", GeneratorId(3))).expect("insert failed");

        let mut registry = GeneratorRegistry::new();
        registry
            .register(TableStandard::Acpi, GeneratorId(3), Box::new(FixedBodyGenerator(b"BODYDATA")))
            .expect("register failed");

        let outcome = GenerationPipeline::new(&repo, &registry).run().expect("run failed");
        assert!(outcome.is_complete());
        assert_eq!(outcome.tables.len(), 1);

        let image = &outcome.tables[0].image;
        assert_eq!(&image[0..4], b"SSDT");
        assert_eq!(u32::from_le_bytes(image[4..8].try_into().unwrap()), 36 + 8);
        assert_eq!(image[8], 2); // revision
        assert_eq!(&image[10..16], b"ARMLTD");
        assert_eq!(&image[28..32], &TABLE_CREATOR_ID);
        assert_eq!(&image[36..], b"BODYDATA");
    }

    #[test]
    fn test_oem_table_id_synthesized_from_oem_id_and_signature() {
        let mut repo = repo_with_cfg_mgr();
        repo.insert(CmNamespace::Standard, 1, acpi_request(*b"SSDT", GeneratorId(3))).expect("insert failed");

        let mut registry = GeneratorRegistry::new();
        registry
            .register(TableStandard::Acpi, GeneratorId(3), Box::new(FixedBodyGenerator(b"")))
            .expect("register failed");

        let outcome = GenerationPipeline::new(&repo, &registry).run().expect("run failed");
        let image = &outcome.tables[0].image;

        let oem_table_id = u64::from_le_bytes(image[16..24].try_into().unwrap());
        let expected = u32::from_le_bytes(*b"ARML") as u64 | (u32::from_le_bytes(*b"SSDT") as u64) << 32;
        assert_ne!(oem_table_id, 0);
        assert_eq!(oem_table_id, expected);

        // OEM revision defaults to the Configuration Manager revision
        assert_eq!(u32::from_le_bytes(image[24..28].try_into().unwrap()), 42);
    }

    #[test]
    fn test_oem_overrides_respected() {
        let mut repo = repo_with_cfg_mgr();
        repo.insert(
            CmNamespace::Standard,
            1,
            CmObject::AcpiTableInfo(AcpiTableInfo {
                signature: *b"SSDT",
                revision: 2,
                minor_revision: None,
                generator_id: GeneratorId(3),
                table_data: None,
                oem_table_id: Some(0x4142_4344_4546_4748),
                oem_revision: Some(7),
            }),
        )
        .expect("insert failed");

        let mut registry = GeneratorRegistry::new();
        registry
            .register(TableStandard::Acpi, GeneratorId(3), Box::new(FixedBodyGenerator(b"")))
            .expect("register failed");

        let outcome = GenerationPipeline::new(&repo, &registry).run().expect("run failed");
        let image = &outcome.tables[0].image;
        assert_eq!(u64::from_le_bytes(image[16..24].try_into().unwrap()), 0x4142_4344_4546_4748);
        assert_eq!(u32::from_le_bytes(image[24..28].try_into().unwrap()), 7);
    }

    #[test]
    fn test_every_generated_image_checksums_to_zero() {
        let mut repo = repo_with_cfg_mgr();
        repo.insert(CmNamespace::Standard, 1, acpi_request(*b"SSDT", GeneratorId(3))).expect("insert failed");
        repo.insert(CmNamespace::Standard, 2, acpi_request(*b"APIC", GeneratorId(4))).expect("insert failed");

        let mut registry = GeneratorRegistry::new();
        registry
            .register(TableStandard::Acpi, GeneratorId(3), Box::new(FixedBodyGenerator(b"BODYDATA")))
            .expect("register failed");
        registry
            .register(TableStandard::Acpi, GeneratorId(4), Box::new(FixedBodyGenerator(&[0xFF, 0x01, 0x7E])))
            .expect("register failed");

        let outcome = GenerationPipeline::new(&repo, &registry).run().expect("run failed");
        assert_eq!(outcome.tables.len(), 2);
        for table in &outcome.tables {
            assert_eq!(byte_sum(&table.image), 0);
        }
    }

    #[test]
    fn test_unknown_generator_is_partial_failure() {
        let mut repo = repo_with_cfg_mgr();
        repo.insert(CmNamespace::Standard, 1, acpi_request(*b"SSDT", GeneratorId(3))).expect("insert failed");
        repo.insert(CmNamespace::Standard, 2, acpi_request(*b"XENO", GeneratorId(0x99))).expect("insert failed");

        let mut registry = GeneratorRegistry::new();
        registry
            .register(TableStandard::Acpi, GeneratorId(3), Box::new(FixedBodyGenerator(b"BODYDATA")))
            .expect("register failed");

        let outcome = GenerationPipeline::new(&repo, &registry).run().expect("run failed");
        assert_eq!(outcome.tables.len(), 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].error, CmError::UnknownGenerator);
        assert_eq!(outcome.failures[0].index, 1);
        assert_eq!(outcome.failures[0].generator_id, GeneratorId(0x99));
        assert!(!outcome.is_complete());
    }

    #[test]
    fn test_supplied_payload_is_authoritative() {
        let payload = sealed_acpi_image(*b"DSDT", b"AML BYTECODE");
        let mut repo = repo_with_cfg_mgr();
        repo.insert(
            CmNamespace::Standard,
            1,
            CmObject::AcpiTableInfo(AcpiTableInfo {
                signature: *b"DSDT",
                revision: 1,
                minor_revision: None,
                generator_id: GeneratorId(3),
                table_data: Some(&payload),
                oem_table_id: None,
                oem_revision: None,
            }),
        )
        .expect("insert failed");

        // A generator is registered under the same id but must not run
        let mut registry = GeneratorRegistry::new();
        registry
            .register(TableStandard::Acpi, GeneratorId(3), Box::new(FixedBodyGenerator(b"SYNTHESIZED")))
            .expect("register failed");

        let outcome = GenerationPipeline::new(&repo, &registry).run().expect("run failed");
        assert!(outcome.is_complete());

        let image = &outcome.tables[0].image;
        assert_eq!(&image[36..], b"AML BYTECODE");
        // Identity restamped from the session's OEM defaults
        assert_eq!(&image[10..16], b"ARMLTD");
        assert_eq!(byte_sum(image), 0);
    }

    #[test]
    fn test_supplied_payload_bad_checksum_rejected() {
        let mut payload = sealed_acpi_image(*b"DSDT", b"AML BYTECODE");
        payload[40] ^= 0xFF;

        let mut repo = repo_with_cfg_mgr();
        repo.insert(
            CmNamespace::Standard,
            1,
            CmObject::AcpiTableInfo(AcpiTableInfo {
                signature: *b"DSDT",
                revision: 1,
                minor_revision: None,
                generator_id: GeneratorId(3),
                table_data: Some(&payload),
                oem_table_id: None,
                oem_revision: None,
            }),
        )
        .expect("insert failed");

        let registry = GeneratorRegistry::new();
        let outcome = GenerationPipeline::new(&repo, &registry).run().expect("run failed");
        assert_eq!(outcome.tables.len(), 0);
        assert_eq!(outcome.failures[0].error, CmError::ChecksumMismatch);
    }

    #[test]
    fn test_supplied_payload_length_mismatch_rejected() {
        let mut payload = sealed_acpi_image(*b"DSDT", b"AML BYTECODE");
        payload.push(0); // buffer longer than the declared length

        let mut repo = repo_with_cfg_mgr();
        repo.insert(
            CmNamespace::Standard,
            1,
            CmObject::AcpiTableInfo(AcpiTableInfo {
                signature: *b"DSDT",
                revision: 1,
                minor_revision: None,
                generator_id: GeneratorId(3),
                table_data: Some(&payload),
                oem_table_id: None,
                oem_revision: None,
            }),
        )
        .expect("insert failed");

        let registry = GeneratorRegistry::new();
        let outcome = GenerationPipeline::new(&repo, &registry).run().expect("run failed");
        assert_eq!(outcome.failures[0].error, CmError::MalformedRecord);
    }

    #[test]
    fn test_supplied_payload_too_short_rejected() {
        let payload = [0u8; 10];
        let mut repo = repo_with_cfg_mgr();
        repo.insert(
            CmNamespace::Standard,
            1,
            CmObject::AcpiTableInfo(AcpiTableInfo {
                signature: *b"DSDT",
                revision: 1,
                minor_revision: None,
                generator_id: GeneratorId(3),
                table_data: Some(&payload),
                oem_table_id: None,
                oem_revision: None,
            }),
        )
        .expect("insert failed");

        let registry = GeneratorRegistry::new();
        let outcome = GenerationPipeline::new(&repo, &registry).run().expect("run failed");
        assert_eq!(outcome.failures[0].error, CmError::MalformedRecord);
    }

    #[test]
    fn test_minor_revision_defaults_to_generator_support() {
        let mut repo = repo_with_cfg_mgr();
        repo.insert(CmNamespace::Standard, 1, acpi_request(*b"FACP", GeneratorId(6))).expect("insert failed");

        let mut registry = GeneratorRegistry::new();
        registry.register(TableStandard::Acpi, GeneratorId(6), Box::new(MinorRevProbe)).expect("register failed");

        let outcome = GenerationPipeline::new(&repo, &registry).run().expect("run failed");
        // MinorRevProbe echoes the resolved minor revision as its body
        assert_eq!(outcome.tables[0].image[36], 4);
    }

    #[test]
    fn test_minor_revision_override_respected() {
        let mut repo = repo_with_cfg_mgr();
        repo.insert(
            CmNamespace::Standard,
            1,
            CmObject::AcpiTableInfo(AcpiTableInfo {
                signature: *b"FACP",
                revision: 6,
                minor_revision: Some(2),
                generator_id: GeneratorId(6),
                table_data: None,
                oem_table_id: None,
                oem_revision: None,
            }),
        )
        .expect("insert failed");

        let mut registry = GeneratorRegistry::new();
        registry.register(TableStandard::Acpi, GeneratorId(6), Box::new(MinorRevProbe)).expect("register failed");

        let outcome = GenerationPipeline::new(&repo, &registry).run().expect("run failed");
        assert_eq!(outcome.tables[0].image[36], 2);
    }

    #[test]
    fn test_smbios_generation_and_raw_payload() {
        let mut raw = vec![2u8, 4, 0x02, 0x00];
        raw.extend_from_slice(b"ACME Corp\0Board\0\0");

        let mut repo = repo_with_cfg_mgr();
        repo.insert(
            CmNamespace::Standard,
            1,
            CmObject::SmbiosTableInfo(SmbiosTableInfo { generator_id: GeneratorId(38), table_data: None }),
        )
        .expect("insert failed");
        repo.insert(
            CmNamespace::Standard,
            2,
            CmObject::SmbiosTableInfo(SmbiosTableInfo { generator_id: GeneratorId(0x80), table_data: Some(&raw) }),
        )
        .expect("insert failed");

        let mut registry = GeneratorRegistry::new();
        registry
            .register(TableStandard::Smbios, GeneratorId(38), Box::new(FixedSmbiosGenerator))
            .expect("register failed");

        let outcome = GenerationPipeline::new(&repo, &registry).run().expect("run failed");
        assert!(outcome.is_complete());
        assert_eq!(outcome.tables.len(), 2);
        assert_eq!(outcome.tables[1].image, raw);
    }

    #[test]
    fn test_smbios_bad_string_pool_rejected() {
        // Formatted area followed by a pool with no double-null terminator
        let raw = [2u8, 4, 0x02, 0x00, b'A', 0];

        let mut repo = repo_with_cfg_mgr();
        repo.insert(
            CmNamespace::Standard,
            1,
            CmObject::SmbiosTableInfo(SmbiosTableInfo { generator_id: GeneratorId(0x80), table_data: Some(&raw) }),
        )
        .expect("insert failed");

        let registry = GeneratorRegistry::new();
        let outcome = GenerationPipeline::new(&repo, &registry).run().expect("run failed");
        assert_eq!(outcome.failures[0].error, CmError::MalformedRecord);
    }

    #[test]
    fn test_validate_smbios_structure() {
        // Minimal valid structure: header + empty pool
        assert_eq!(validate_smbios_structure(&[1, 4, 0, 0, 0, 0]), Ok(()));
        // Strings
        assert_eq!(validate_smbios_structure(b"\x01\x04\x00\x00one\0two\0\0"), Ok(()));
        // Too short
        assert_eq!(validate_smbios_structure(&[1, 4, 0]), Err(CmError::MalformedRecord));
        // Formatted length exceeds buffer
        assert_eq!(validate_smbios_structure(&[1, 10, 0, 0, 0, 0]), Err(CmError::MalformedRecord));
        // Empty string in the middle of the pool
        assert_eq!(validate_smbios_structure(b"\x01\x04\x00\x00one\0\0two\0\0"), Err(CmError::MalformedRecord));
    }

    #[test]
    fn test_missing_cfg_mgr_info_is_fatal() {
        let repo = CmObjRepository::new();
        let registry = GeneratorRegistry::new();
        assert_eq!(GenerationPipeline::new(&repo, &registry).run().err(), Some(CmError::NotFound));
    }

    #[test]
    fn test_empty_request_lists_yield_empty_outcome() {
        let repo = repo_with_cfg_mgr();
        let registry = GeneratorRegistry::new();
        let outcome = GenerationPipeline::new(&repo, &registry).run().expect("run failed");
        assert!(outcome.tables.is_empty());
        assert!(outcome.failures.is_empty());
        assert!(outcome.is_complete());
    }

    #[test]
    fn test_seal_checksum_round_trip() {
        let mut image = vec![0x12u8, 0x34, 0x56, 0x00, 0x78];
        seal_checksum(&mut image, 3);
        assert_eq!(byte_sum(&image), 0);

        // Resealing an already sealed image is a no-op
        let sealed = image.clone();
        seal_checksum(&mut image, 3);
        assert_eq!(image, sealed);
    }
}
