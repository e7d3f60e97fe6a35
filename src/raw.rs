//! Standard RAW table generators
//!
//! The RAW generators install caller-supplied binary table images verbatim.
//! They never synthesize a payload: the pipeline consumes a supplied payload
//! before dispatching to a generator, so these only ever run when a RAW
//! request arrives without data, which is a malformed request.
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
use crate::generator::{GeneratorContext, TableGenerator};

/// RAW ACPI table generator. Requires the request to carry its table image.
pub struct RawAcpiGenerator;

impl TableGenerator for RawAcpiGenerator {
    fn build(&self, _ctx: &GeneratorContext<'_, '_>) -> Result<Vec<u8>, CmError> {
        log::error!("RAW ACPI generator invoked without table data");
        Err(CmError::MalformedRecord)
    }
}

/// RAW SMBIOS structure generator. Requires the request to carry its image.
pub struct RawSmbiosGenerator;

impl TableGenerator for RawSmbiosGenerator {
    fn build(&self, _ctx: &GeneratorContext<'_, '_>) -> Result<Vec<u8>, CmError> {
        log::error!("RAW SMBIOS generator invoked without table data");
        Err(CmError::MalformedRecord)
    }
}
