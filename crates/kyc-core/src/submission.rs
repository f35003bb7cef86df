//! # Submission Payload
//!
//! A validated record plus up to three file attachments, in the shape the
//! submission sink accepts: one JSON part named `formData` and one part
//! per attachment slot.

use serde::Serialize;

use crate::record::FileRef;
use crate::valid::ValidRecord;

/// Multipart part carrying the JSON record.
pub const RECORD_PART: &str = "formData";

/// The attachment slots of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AttachmentSlot {
    /// Front face of the identity document.
    IdFront,
    /// Back face of the identity document.
    IdBack,
    /// Scan of the NUI certificate.
    Nui,
}

impl AttachmentSlot {
    pub fn all() -> &'static [AttachmentSlot] {
        &[Self::IdFront, Self::IdBack, Self::Nui]
    }

    /// Multipart part name expected by the sink.
    pub fn part_name(&self) -> &'static str {
        match self {
            Self::IdFront => "idFrontImage",
            Self::IdBack => "idBackImage",
            Self::Nui => "niuFile",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub slot: AttachmentSlot,
    pub file: FileRef,
}

/// Everything the sink needs to create a KYC record.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub record: ValidRecord,
    pub attachments: Vec<Attachment>,
}

impl Submission {
    /// Collect the attachments referenced by a validated record.
    ///
    /// Every slot is filled, since validation requires all three files.
    pub fn assemble(record: ValidRecord) -> Self {
        let attachments = vec![
            Attachment {
                slot: AttachmentSlot::IdFront,
                file: record.document.front_image().clone(),
            },
            Attachment {
                slot: AttachmentSlot::IdBack,
                file: record.document.back_image().clone(),
            },
            Attachment {
                slot: AttachmentSlot::Nui,
                file: record.nui_document.file.clone(),
            },
        ];
        Self {
            record,
            attachments,
        }
    }

    /// The `formData` part body.
    pub fn record_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.record)
    }

    pub fn attachment(&self, slot: AttachmentSlot) -> Option<&FileRef> {
        self.attachments
            .iter()
            .find(|a| a.slot == slot)
            .map(|a| &a.file)
    }
}
