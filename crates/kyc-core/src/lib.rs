//! # kyc-core: Foundational Types for KYC Intake
//!
//! This crate defines the data the intake engine works on: the permissive
//! draft [`Record`] filled in by the wizard, the narrowed [`ValidRecord`]
//! produced by validation, the closed value sets of the domain, and the
//! field-level error taxonomy. Every other crate in the workspace depends
//! on `kyc-core`; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Single `DocumentType` enum.** One definition, five variants,
//!    exhaustive `match` everywhere. Adding a document kind forces every
//!    consumer to handle it.
//!
//! 2. **Draft and validated records are different types.** The draft keeps
//!    the raw document tag; the validated record carries a tagged union
//!    with exactly the fields of one document kind.
//!
//! 3. **Messages are keys.** Text is produced only through [`Translate`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `kyc-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod customer;
pub mod domain;
pub mod error;
pub mod identity;
pub mod path;
pub mod record;
pub mod submission;
pub mod translate;
pub mod valid;

// Re-export primary types for ergonomic imports.
pub use customer::Customer;
pub use domain::{
    ContractStatus, CustomerStatus, DocumentType, EntityKind, Gender, MeterStatus, MeterType,
    Region, UsageType, DOCUMENT_TYPE_COUNT,
};
pub use error::{ErrorKind, FieldError, FieldErrors, UnknownTag};
pub use identity::{SessionId, SubmissionId};
pub use path::{paths, FieldPath};
pub use record::{
    ContractDraft, DocumentDraft, FileRef, Location, MeterDraft, NuiDraft, OtherContractEntry,
    OtherContracts, PhoneEntry, PostfixDraft, Record,
};
pub use submission::{Attachment, AttachmentSlot, Submission, RECORD_PART};
pub use translate::{Catalog, CatalogError, FnTranslate, KeyEcho, Translate};
pub use valid::{
    Contract, IdentityDocument, MeterDetails, NuiDocument, OtherContract, Postfix,
    PostfixedDocument, RegisterDocument, ValidRecord,
};
