//! Error types for Configuration Manager operations
//!
//! This module defines the error types returned by the object repository,
//! token resolver, generator registry and table generation pipeline.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!

/// Configuration Manager operation errors
///
/// This enum represents all possible errors that can occur while populating
/// the object repository, resolving token cross-references, and generating
/// firmware tables.
///
/// Repository insert errors (`DuplicateToken`, `DuplicateSingleton`,
/// `MalformedRecord`) indicate a corrupt discovery source and are fatal to
/// the session. Errors raised while generating one table are isolated to
/// that table request and reported in the pipeline's failure list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CmError {
    // Repository errors
    /// A record with the same (namespace, object id, token) key already exists
    DuplicateToken,
    /// A second instance of a singleton object kind was inserted
    DuplicateSingleton,
    /// No record exists for the requested (namespace, object id, token) key
    NotFound,
    /// A record's declared count disagrees with its actual variable-length contents
    MalformedRecord,

    // Token resolution errors
    /// A token reference does not designate any live record
    DanglingToken,
    /// A token reference designates the referencing record itself where self-reference is meaningless
    SelfReference,
    /// The resolved record's kind is incompatible with what the reference field expects
    TypeMismatch,

    // Generator registry errors
    /// A generator is already registered for the (table standard, generator id) key
    AlreadyRegistered,
    /// No generator is registered for the requested (table standard, generator id) key
    UnknownGenerator,

    // Table validation errors
    /// An externally supplied table payload failed checksum re-validation
    ChecksumMismatch,
}
