mod common;

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use uuid::Uuid;

use docfinance_api::{
    entities::document::{DocumentKind, DocumentStage},
    errors::ServiceError,
    services::documents::NewDocument,
    services::workflow::StageTransition,
    workflow::ReturnReason,
};

use common::TestApp;

async fn seed_document(app: &TestApp) -> Uuid {
    let supplier = app.seed_supplier("Construtora Alfa Ltda").await;
    let input = NewDocument {
        kind: DocumentKind::ServiceInvoice,
        supplier_id: supplier.id,
        external_number: None,
        budget_unit_id: None,
        budget_line_id: None,
        document_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        payment_date: None,
        gross_amount: dec!(150.00),
        service_tax_amount: None,
        withholding_tax_amount: None,
        description: None,
        process_number: None,
        status: None,
    };
    app.state
        .services
        .documents
        .create(input, None, None)
        .await
        .expect("seed document")
        .id
}

fn forward(target: DocumentStage) -> StageTransition {
    StageTransition {
        target,
        reason: None,
        free_text: None,
        note: None,
    }
}

#[tokio::test]
async fn forward_move_records_the_stage_default_note() {
    let app = TestApp::new().await;
    let document_id = seed_document(&app).await;

    let (document, entry) = app
        .state
        .services
        .workflow
        .transition(document_id, forward(DocumentStage::InternalReview), None, None)
        .await
        .expect("advance stage");

    assert_eq!(document.stage, DocumentStage::InternalReview);
    assert_eq!(entry.stage, DocumentStage::InternalReview);
    assert_eq!(entry.note, "received for review");
}

#[tokio::test]
async fn forward_move_keeps_the_caller_note() {
    let app = TestApp::new().await;
    let document_id = seed_document(&app).await;
    let actor = Uuid::new_v4();

    let request = StageTransition {
        target: DocumentStage::InternalReview,
        reason: None,
        free_text: None,
        note: Some("forwarded with all attachments".to_string()),
    };

    let (_, entry) = app
        .state
        .services
        .workflow
        .transition(document_id, request, Some(actor), Some("10.0.0.9"))
        .await
        .expect("advance stage");

    assert_eq!(entry.note, "forwarded with all attachments");
    assert_eq!(entry.actor_id, Some(actor));
}

#[tokio::test]
async fn returns_require_a_reason_or_free_text() {
    let app = TestApp::new().await;
    let document_id = seed_document(&app).await;

    for stage in [DocumentStage::InternalReview, DocumentStage::Commitment] {
        app.state
            .services
            .workflow
            .transition(document_id, forward(stage), None, None)
            .await
            .expect("advance stage");
    }

    // commitment (index 2) back to internal review (index 1), no reason
    let bare = StageTransition {
        target: DocumentStage::InternalReview,
        reason: None,
        free_text: Some("   ".to_string()),
        note: Some("a note is not a justification".to_string()),
    };
    let result = app
        .state
        .services
        .workflow
        .transition(document_id, bare, None, None)
        .await;
    match result {
        Err(ServiceError::ValidationError(message)) => {
            assert!(message.contains("reason"), "message: {message}");
        }
        other => panic!("expected validation error, got {other:?}"),
    }

    // with a reason the return succeeds and the note is auto-composed
    let justified = StageTransition {
        target: DocumentStage::InternalReview,
        reason: Some(ReturnReason::CommitmentError),
        free_text: Some("wrong budget line".to_string()),
        note: Some("ignored for returns".to_string()),
    };
    let (document, entry) = app
        .state
        .services
        .workflow
        .transition(document_id, justified, None, None)
        .await
        .expect("return stage");

    assert_eq!(document.stage, DocumentStage::InternalReview);
    assert!(entry.note.starts_with("Devolução"), "note: {}", entry.note);
    assert!(entry.note.contains("commitment error"));
    assert!(entry.note.contains("wrong budget line"));
}

#[tokio::test]
async fn writeoff_can_be_reopened_with_justification() {
    let app = TestApp::new().await;
    let document_id = seed_document(&app).await;

    for stage in [
        DocumentStage::InternalReview,
        DocumentStage::Commitment,
        DocumentStage::Payment,
        DocumentStage::Writeoff,
    ] {
        app.state
            .services
            .workflow
            .transition(document_id, forward(stage), None, None)
            .await
            .expect("advance stage");
    }

    let reopen = StageTransition {
        target: DocumentStage::Opening,
        reason: Some(ReturnReason::Other),
        free_text: Some("reopened after external audit".to_string()),
        note: None,
    };
    let (document, entry) = app
        .state
        .services
        .workflow
        .transition(document_id, reopen, None, None)
        .await
        .expect("reopen from writeoff");

    assert_eq!(document.stage, DocumentStage::Opening);
    assert!(entry.note.starts_with("Devolução"));
}

#[tokio::test]
async fn history_is_append_only_and_ordered() {
    let app = TestApp::new().await;
    let document_id = seed_document(&app).await;

    let moves = [
        forward(DocumentStage::InternalReview),
        forward(DocumentStage::Commitment),
        StageTransition {
            target: DocumentStage::InternalReview,
            reason: Some(ReturnReason::PendingDocumentation),
            free_text: None,
            note: None,
        },
        forward(DocumentStage::Commitment),
        forward(DocumentStage::Payment),
    ];
    let total = moves.len();
    for request in moves {
        app.state
            .services
            .workflow
            .transition(document_id, request, None, None)
            .await
            .expect("transition");
    }

    let history = app
        .state
        .services
        .workflow
        .history(document_id)
        .await
        .expect("load history");

    assert_eq!(history.len(), total);
    for pair in history.windows(2) {
        assert!(pair[0].recorded_at <= pair[1].recorded_at);
    }
}

#[tokio::test]
async fn timeline_keeps_the_latest_entry_per_stage() {
    let app = TestApp::new().await;
    let document_id = seed_document(&app).await;

    // visit internal review twice with different notes
    app.state
        .services
        .workflow
        .transition(document_id, forward(DocumentStage::InternalReview), None, None)
        .await
        .expect("first review pass");
    app.state
        .services
        .workflow
        .transition(document_id, forward(DocumentStage::Commitment), None, None)
        .await
        .expect("advance to commitment");
    app.state
        .services
        .workflow
        .transition(
            document_id,
            StageTransition {
                target: DocumentStage::InternalReview,
                reason: Some(ReturnReason::DataMismatch),
                free_text: None,
                note: None,
            },
            None,
            None,
        )
        .await
        .expect("return to review");

    let timeline = app
        .state
        .services
        .workflow
        .timeline(document_id)
        .await
        .expect("load timeline");

    assert_eq!(timeline.len(), 5);
    // opening has no history entry but falls back to the entry timestamp
    assert_eq!(timeline[0].stage, DocumentStage::Opening);
    assert!(timeline[0].recorded_at.is_some());
    // the later (return) entry wins for internal review
    assert_eq!(timeline[1].stage, DocumentStage::InternalReview);
    assert_eq!(
        timeline[1].note.as_deref(),
        Some("Devolução — data mismatch")
    );
    // current stage is internal review: later stages are not completed
    assert!(timeline[1].completed);
    assert!(!timeline[3].completed);
    assert!(!timeline[4].completed);
}

#[tokio::test]
async fn transitions_on_missing_documents_are_not_found() {
    let app = TestApp::new().await;

    let result = app
        .state
        .services
        .workflow
        .transition(Uuid::new_v4(), forward(DocumentStage::Payment), None, None)
        .await;

    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}
