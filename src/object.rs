//! Standard namespace Configuration Manager object definitions
//!
//! This module defines the token type, the Standard namespace object id
//! enumeration, and the record structures stored in the object repository.
//! Records are created once by platform discovery, inserted into the
//! repository, and are immutable for the duration of one generation pass.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use crate::generator::GeneratorId;

/// Opaque reference identifying one Configuration Manager object instance.
///
/// Tokens differentiate between instances of objects of the same kind. The
/// identification scheme is defined by the producer that creates the record,
/// and a token must remain stable for the lifetime of the repository session.
/// The value 0 is reserved for a NULL token and does not identify any object.
pub type CmObjectToken = u64;

/// Reserved zero token value that does not identify any object.
pub const CM_NULL_TOKEN: CmObjectToken = 0;

/// Maximum number of peer groups a system slot may describe.
pub const MAX_SLOT_PEER_GROUP: usize = 5;

/// Object namespaces known to the Configuration Manager.
///
/// Namespaces partition unrelated object families so that object ids from
/// different families cannot collide. Only the Standard namespace is defined
/// here; a larger system may define others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CmNamespace {
    /// The Standard namespace defined by this crate.
    Standard,
}

/// Object ids in the Standard namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StdObjectId {
    /// Configuration Manager information (singleton)
    CfgMgrInfo,
    /// ACPI table generation request list
    AcpiTableList,
    /// SMBIOS table generation request list
    SmbiosTableList,
    /// IPMI device information
    IpmiDeviceInfo,
    /// Baseboard information
    BaseboardInfo,
    /// System slot information
    SystemSlotInfo,
}

impl StdObjectId {
    /// Interprets a raw object id value from an external producer.
    ///
    /// Values past the end of the enumeration yield `None` rather than a
    /// numeric bound check, so callers get a typed "unrecognized kind"
    /// outcome for ids defined by a newer revision of the namespace.
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::CfgMgrInfo),
            1 => Some(Self::AcpiTableList),
            2 => Some(Self::SmbiosTableList),
            3 => Some(Self::IpmiDeviceInfo),
            4 => Some(Self::BaseboardInfo),
            5 => Some(Self::SystemSlotInfo),
            _ => None,
        }
    }

    /// Returns the raw wire value of this object id.
    pub fn as_raw(self) -> u32 {
        match self {
            Self::CfgMgrInfo => 0,
            Self::AcpiTableList => 1,
            Self::SmbiosTableList => 2,
            Self::IpmiDeviceInfo => 3,
            Self::BaseboardInfo => 4,
            Self::SystemSlotInfo => 5,
        }
    }

    /// True for object kinds of which at most one instance may exist per session.
    pub fn is_singleton(self) -> bool {
        matches!(self, Self::CfgMgrInfo)
    }
}

/// Configuration Manager information.
///
/// Exactly one instance exists per repository session. The OEM id stamps
/// every generated table header; the revision seeds the OEM revision of any
/// table request that does not override it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationManagerInfo {
    /// The Configuration Manager revision. Monotonic across repository rebuilds.
    pub revision: u32,
    /// The OEM ID used to populate ACPI table header information.
    pub oem_id: [u8; 6],
}

/// A request to produce one ACPI table.
///
/// `table_data` may directly provide the binary table image required by the
/// standard RAW/DSDT/SSDT generators. The buffer is borrowed from the caller
/// and must outlive the generation pass. Fields the producer leaves as
/// `None` are synthesized by the pipeline from [`ConfigurationManagerInfo`]
/// and the table signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcpiTableInfo<'buf> {
    /// The signature of the ACPI table to be installed
    pub signature: [u8; 4],
    /// The ACPI table revision
    pub revision: u8,
    /// The minor revision of the ACPI table, if required by the table.
    /// `None` defers to the latest minor revision the generator supports.
    pub minor_revision: Option<u8>,
    /// The ACPI table generator id
    pub generator_id: GeneratorId,
    /// Optional complete table image supplied by the producer
    pub table_data: Option<&'buf [u8]>,
    /// OEM-supplied table id. `None` defers to a value synthesized from the
    /// OEM id and the table signature.
    pub oem_table_id: Option<u64>,
    /// OEM-supplied revision. `None` defers to the Configuration Manager revision.
    pub oem_revision: Option<u32>,
}

impl<'buf> AcpiTableInfo<'buf> {
    /// Builds a request from raw wire values, mapping the zero sentinel in
    /// the OEM table id, OEM revision and minor revision fields to "unset".
    pub fn from_raw(
        signature: [u8; 4],
        revision: u8,
        minor_revision: u8,
        generator_id: GeneratorId,
        table_data: Option<&'buf [u8]>,
        oem_table_id: u64,
        oem_revision: u32,
    ) -> Self {
        Self {
            signature,
            revision,
            minor_revision: (minor_revision != 0).then_some(minor_revision),
            generator_id,
            table_data,
            oem_table_id: (oem_table_id != 0).then_some(oem_table_id),
            oem_revision: (oem_revision != 0).then_some(oem_revision),
        }
    }
}

/// A request to produce one SMBIOS structure.
///
/// `table_data` may directly provide the binary structure required by the
/// standard RAW generator; the buffer is borrowed from the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmbiosTableInfo<'buf> {
    /// The SMBIOS table generator id
    pub generator_id: GeneratorId,
    /// Optional complete structure image supplied by the producer
    pub table_data: Option<&'buf [u8]>,
}

/// IPMI device information.
///
/// Describes the IPMI device on the system. Leaf record: referenced by other
/// tables, never itself referencing others.
///
/// SMBIOS Specification v3.5.0 Type 38,
/// IPMI Specification v2.0 r1.1 SPMI Description Table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpmiDeviceInfo {
    /// IPMI interface type
    pub interface_type: u8,
    /// IPMI specification revision
    pub spec_revision: u8,
    /// IPMI I2C slave address
    pub i2c_slave_address: u8,
    /// IPMI NV storage device address
    pub nv_storage_device_address: u8,
    /// IPMI base address
    pub base_address: u64,
    /// IPMI base address modifier / interrupt information
    pub base_address_modifier_interrupt_info: u8,
    /// IPMI interrupt number
    pub interrupt_number: u8,
    /// IPMI device ACPI `_UID`
    pub uid: u32,
    /// Token identifying this IPMI device record
    pub token: CmObjectToken,
}

/// One object physically mounted on a baseboard: a token designating the
/// component's record paired with the generator id that renders it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainedCmObject {
    /// Token of the contained component's record
    pub token: CmObjectToken,
    /// Generator id expected to render the contained component
    pub generator_id: GeneratorId,
}

/// Baseboard information.
///
/// `chassis_token` is a relation only: the board does not own the chassis
/// record it names. The trailing `contained_objects` sequence is owned, and
/// `number_of_contained_object_handles` is the authoritative count that must
/// equal its length.
///
/// SMBIOS Specification v3.5.0 Type 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseboardInfo {
    /// Token identifying this baseboard record
    pub token: CmObjectToken,
    /// Token of the chassis housing this board
    pub chassis_token: CmObjectToken,
    /// Manufacturer of the baseboard
    pub manufacturer: String,
    /// Product name
    pub product_name: String,
    /// Version of the baseboard
    pub version: String,
    /// Serial number of the baseboard
    pub serial_number: String,
    /// Asset tag of the baseboard
    pub asset_tag: String,
    /// Feature flags of the baseboard
    pub feature_flag: u8,
    /// Location in chassis
    pub location_in_chassis: String,
    /// Board type
    pub board_type: u8,
    /// Declared number of contained object handles
    pub number_of_contained_object_handles: u8,
    /// Objects physically mounted on this board
    pub contained_objects: Vec<ContainedCmObject>,
}

/// One peer (segment/bus/device/function/width) group of a bifurcated link.
///
/// `peer_slot_token` names the peer slot's own record when the peer is
/// described in the repository, or [`CM_NULL_TOKEN`] when it is not. Peer
/// references are legitimately bidirectional, so cycles between slots are
/// permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlotPeerGroup {
    /// Segment group number of the peer
    pub segment_group_number: u16,
    /// Bus number of the peer
    pub bus_number: u8,
    /// Device/function number of the peer
    pub device_function_number: u8,
    /// Data bus width of the peer
    pub data_bus_width: u8,
    /// Token of the peer slot's record, if described
    pub peer_slot_token: CmObjectToken,
}

/// System slot information.
///
/// Describes one physical expansion slot. `peer_grouping_count` is the
/// authoritative number of valid entries in `peer_groups`; capacity past the
/// count is unused and never interpreted.
///
/// SMBIOS Specification v3.5.0 Type 9.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemSlotInfo {
    /// Token identifying this slot record
    pub token: CmObjectToken,
    /// Slot designation
    pub slot_designation: String,
    /// Slot type
    pub slot_type: u8,
    /// Slot data bus width
    pub slot_data_bus_width: u8,
    /// Current usage
    pub current_usage: u8,
    /// Slot length
    pub slot_length: u8,
    /// Slot id
    pub slot_id: u16,
    /// Slot characteristics 1
    pub slot_characteristics1: u8,
    /// Slot characteristics 2
    pub slot_characteristics2: u8,
    /// Segment group number (base)
    pub segment_group_number: u16,
    /// Bus number (base)
    pub bus_number: u8,
    /// Device/function number (base)
    pub device_function_number: u8,
    /// Data bus width (base)
    pub data_bus_width: u8,
    /// Slot information
    pub slot_information: u8,
    /// Slot physical width
    pub slot_physical_width: u8,
    /// Slot pitch
    pub slot_pitch: u16,
    /// Slot height
    pub slot_height: u8,
    /// Number of valid entries in `peer_groups`
    pub peer_grouping_count: u8,
    /// Peer groups of a bifurcated link
    pub peer_groups: [SlotPeerGroup; MAX_SLOT_PEER_GROUP],
}

/// A Standard namespace Configuration Manager object.
///
/// Closed tagged union over the record kinds defined in this namespace. Raw
/// table payloads inside [`AcpiTableInfo`] and [`SmbiosTableInfo`] are
/// borrowed for `'buf`, which must outlive the generation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CmObject<'buf> {
    /// Configuration Manager information (singleton)
    CfgMgrInfo(ConfigurationManagerInfo),
    /// ACPI table generation request
    AcpiTableInfo(AcpiTableInfo<'buf>),
    /// SMBIOS table generation request
    SmbiosTableInfo(SmbiosTableInfo<'buf>),
    /// IPMI device information
    IpmiDeviceInfo(IpmiDeviceInfo),
    /// Baseboard information
    BaseboardInfo(BaseboardInfo),
    /// System slot information
    SystemSlotInfo(SystemSlotInfo),
}

impl CmObject<'_> {
    /// Returns the Standard namespace object id of this record.
    pub fn object_id(&self) -> StdObjectId {
        match self {
            Self::CfgMgrInfo(_) => StdObjectId::CfgMgrInfo,
            Self::AcpiTableInfo(_) => StdObjectId::AcpiTableList,
            Self::SmbiosTableInfo(_) => StdObjectId::SmbiosTableList,
            Self::IpmiDeviceInfo(_) => StdObjectId::IpmiDeviceInfo,
            Self::BaseboardInfo(_) => StdObjectId::BaseboardInfo,
            Self::SystemSlotInfo(_) => StdObjectId::SystemSlotInfo,
        }
    }

    /// Returns the token carried inside the record, for kinds that carry one.
    ///
    /// Request-list and singleton kinds have no intrinsic token; their
    /// identity is the token supplied at insert time.
    pub fn intrinsic_token(&self) -> Option<CmObjectToken> {
        match self {
            Self::IpmiDeviceInfo(info) => Some(info.token),
            Self::BaseboardInfo(info) => Some(info.token),
            Self::SystemSlotInfo(info) => Some(info.token),
            _ => None,
        }
    }
}
