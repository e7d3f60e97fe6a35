//! Configuration Manager object repository and dynamic table generation
//!
//! This crate provides the data model and generation pipeline for a firmware
//! Configuration Manager (CM): a typed, token-addressed store of platform
//! description records consumed by a table-generation pipeline that emits
//! standards-compliant binary ACPI and SMBIOS table images at boot time.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │              Platform Discovery                      │
//! │  (populates the repository, external to this crate)  │
//! └──────────────────────────┬───────────────────────────┘
//!                            │ insert
//!                            ▼
//!                 ┌──────────────────────┐
//!                 │   CmObjRepository    │
//!                 │                      │
//!                 │ (namespace, id,      │
//!                 │  token) → CmObject   │
//!                 └──────────┬───────────┘
//!                            │ get / enumerate / resolve
//!                            ▼
//!                 ┌──────────────────────┐      ┌───────────────────┐
//!                 │ GenerationPipeline   │─────▶│ GeneratorRegistry │
//!                 │                      │lookup│ (standard, id) →  │
//!                 │ • default-via-zero   │      │  TableGenerator   │
//!                 │ • header stamping    │      └───────────────────┘
//!                 │ • checksum sealing   │
//!                 └──────────┬───────────┘
//!                            │ GenerationOutcome
//!                            ▼
//!                 ┌──────────────────────┐
//!                 │ Hosting environment  │
//!                 │ (installs the images)│
//!                 └──────────────────────┘
//! ```
//!
//! Data flows one direction: discovery fills the repository, the pipeline
//! reads it back through the token resolver, generators turn resolved
//! objects into binary images, and the hosting environment installs them.
//!
//! # Lifecycle
//!
//! All records are created during a discovery phase and inserted through
//! [`repository::CmObjRepository::insert`], the only write path. Once
//! discovery completes, the repository is read-only for the duration of one
//! generation pass; the borrow checker enforces this (the pipeline holds a
//! shared borrow). The subsystem runs single-threaded and run-to-completion
//! in a boot phase, so there are no locks and no suspension points.
//!
//! # Error Handling
//!
//! The [`error::CmError`] enum covers the full taxonomy. Insert errors are
//! fatal to the session (a corrupt discovery source); errors generating one
//! table are isolated to that request and reported in the outcome's failure
//! list, so the hosting environment receives every successful image plus a
//! diagnostic entry per failed request.
//!
//! # Module Organization
//!
//! - [`object`]: Standard namespace record definitions and tokens
//! - [`repository`]: the (namespace, object id, token) keyed object store
//! - [`resolver`]: token cross-reference resolution
//! - [`generator`]: generator trait, ids and registry
//! - [`pipeline`]: the generation pass, header stamping and checksums
//! - [`raw`]: standard RAW generators
//! - [`error`]: error types for all CM operations
//!
//! # License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), no_std)]

pub mod error;
pub mod generator;
pub mod object;
pub mod pipeline;
pub mod raw;
pub mod repository;
pub mod resolver;

pub use error::CmError;
pub use generator::{GeneratorId, GeneratorRegistry, TableGenerator, TableStandard};
pub use object::{CM_NULL_TOKEN, CmNamespace, CmObject, CmObjectToken, StdObjectId};
pub use pipeline::{GeneratedTable, GenerationOutcome, GenerationPipeline, TableFailure};
pub use repository::CmObjRepository;
