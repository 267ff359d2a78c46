//! Workflow stage policy: canonical stage order, return reasons and note
//! composition.
//!
//! Stages form a fixed linear sequence. Moving to a later (or the same)
//! stage is always allowed and takes the caller's note, falling back to a
//! per-stage default. Moving to an earlier stage is a return ("devolução")
//! and requires a reason or a free-text justification; its history note is
//! always auto-composed, ignoring any caller note.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::document::DocumentStage;

/// Canonical stage sequence; index order decides forward vs. return moves.
pub const STAGE_SEQUENCE: [DocumentStage; 5] = [
    DocumentStage::Opening,
    DocumentStage::InternalReview,
    DocumentStage::Commitment,
    DocumentStage::Payment,
    DocumentStage::Writeoff,
];

impl DocumentStage {
    /// Zero-based position in the canonical sequence
    pub fn position(&self) -> usize {
        match self {
            DocumentStage::Opening => 0,
            DocumentStage::InternalReview => 1,
            DocumentStage::Commitment => 2,
            DocumentStage::Payment => 3,
            DocumentStage::Writeoff => 4,
        }
    }

    /// Note recorded for a forward move when the caller supplies none
    pub fn default_note(&self) -> &'static str {
        match self {
            DocumentStage::Opening => "process opened",
            DocumentStage::InternalReview => "received for review",
            DocumentStage::Commitment => "received for commitment",
            DocumentStage::Payment => "apt for payment",
            DocumentStage::Writeoff => "paid and process closed",
        }
    }

    /// Human-readable stage name for timelines and logs
    pub fn label(&self) -> &'static str {
        match self {
            DocumentStage::Opening => "Opening",
            DocumentStage::InternalReview => "Internal Review",
            DocumentStage::Commitment => "Commitment",
            DocumentStage::Payment => "Payment",
            DocumentStage::Writeoff => "Writeoff",
        }
    }
}

/// Enumerated justification for returning a document to an earlier stage
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, strum::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ReturnReason {
    PendingDocumentation,
    CommitmentError,
    ValueAdjustment,
    DataMismatch,
    DepartmentRequest,
    Other,
}

impl ReturnReason {
    /// Label used when composing the history note
    pub fn label(&self) -> &'static str {
        match self {
            ReturnReason::PendingDocumentation => "pending documentation",
            ReturnReason::CommitmentError => "commitment error",
            ReturnReason::ValueAdjustment => "value adjustment",
            ReturnReason::DataMismatch => "data mismatch",
            ReturnReason::DepartmentRequest => "department request",
            ReturnReason::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error("reason: returning to an earlier stage requires a reason or a description")]
    MissingReason,
}

/// Whether moving from `current` to `target` is a return to an earlier stage
pub fn is_return(current: DocumentStage, target: DocumentStage) -> bool {
    target.position() < current.position()
}

/// Compose the history note for a transition from `current` to `target`.
///
/// Returns `MissingReason` when a return carries neither a reason nor
/// non-empty free text. Forward and same-stage moves never fail.
pub fn transition_note(
    current: DocumentStage,
    target: DocumentStage,
    reason: Option<ReturnReason>,
    free_text: Option<&str>,
    note: Option<&str>,
) -> Result<String, WorkflowError> {
    if is_return(current, target.clone()) {
        let free_text = free_text.map(str::trim).filter(|t| !t.is_empty());
        if reason.is_none() && free_text.is_none() {
            return Err(WorkflowError::MissingReason);
        }

        let mut parts = vec!["Devolução".to_string()];
        if let Some(reason) = reason {
            parts.push(reason.label().to_string());
        }
        if let Some(text) = free_text {
            parts.push(text.to_string());
        }
        Ok(parts.join(" — "))
    } else {
        let note = note.map(str::trim).filter(|n| !n.is_empty());
        Ok(note.unwrap_or(target.default_note()).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use test_case::test_case;

    #[test]
    fn sequence_positions_are_strictly_increasing() {
        for (index, stage) in STAGE_SEQUENCE.iter().enumerate() {
            assert_eq!(stage.position(), index);
        }
    }

    #[test_case(DocumentStage::Opening, DocumentStage::InternalReview, false)]
    #[test_case(DocumentStage::InternalReview, DocumentStage::InternalReview, false; "same stage is not a return")]
    #[test_case(DocumentStage::Commitment, DocumentStage::InternalReview, true)]
    #[test_case(DocumentStage::Writeoff, DocumentStage::Opening, true; "writeoff can be returned from")]
    fn classifies_moves(current: DocumentStage, target: DocumentStage, expected: bool) {
        assert_eq!(is_return(current, target), expected);
    }

    #[test]
    fn forward_move_uses_caller_note_when_present() {
        let note = transition_note(
            DocumentStage::Opening,
            DocumentStage::InternalReview,
            None,
            None,
            Some("sent with attachments"),
        )
        .unwrap();

        assert_eq!(note, "sent with attachments");
    }

    #[test]
    fn forward_move_falls_back_to_stage_default() {
        let note = transition_note(
            DocumentStage::Opening,
            DocumentStage::InternalReview,
            None,
            None,
            Some("   "),
        )
        .unwrap();

        assert_eq!(note, "received for review");
    }

    #[test]
    fn return_without_justification_is_rejected() {
        let result = transition_note(
            DocumentStage::Commitment,
            DocumentStage::InternalReview,
            None,
            Some("  "),
            Some("this note is ignored for returns"),
        );

        assert_matches!(result, Err(WorkflowError::MissingReason));
    }

    #[test]
    fn return_note_is_composed_from_reason_and_free_text() {
        let note = transition_note(
            DocumentStage::Payment,
            DocumentStage::Commitment,
            Some(ReturnReason::CommitmentError),
            Some("wrong budget line"),
            Some("ignored"),
        )
        .unwrap();

        assert_eq!(note, "Devolução — commitment error — wrong budget line");
    }

    #[test]
    fn return_note_omits_empty_parts() {
        let with_reason_only = transition_note(
            DocumentStage::Commitment,
            DocumentStage::Opening,
            Some(ReturnReason::DataMismatch),
            None,
            None,
        )
        .unwrap();
        assert_eq!(with_reason_only, "Devolução — data mismatch");

        let with_text_only = transition_note(
            DocumentStage::Commitment,
            DocumentStage::Opening,
            None,
            Some("supplier asked to resubmit"),
            None,
        )
        .unwrap();
        assert_eq!(with_text_only, "Devolução — supplier asked to resubmit");
    }
}
