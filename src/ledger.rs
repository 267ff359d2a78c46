//! Document ledger: monetary validation/derivation and number generation.
//!
//! [`validate_and_derive`] is run before every persist of a document. It
//! normalizes the tax fields for the document kind, rejects negative
//! amounts, recomputes the net amount and reconciles the payment date with
//! the payment status. It mutates the document in place and performs no I/O.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::entities::document::{DocumentStatus, Model as Document};

/// Number of digits in the daily sequence portion of a document number
const SEQUENCE_LEN: usize = 4;

/// Recoverable, field-tagged validation failures raised by the ledger
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("{field}: amount cannot be negative")]
    NegativeAmount { field: &'static str },

    #[error("net_amount: net amount cannot be negative")]
    NegativeNet,

    #[error("payment_date: payment date is required when the status is paid")]
    MissingPaymentDate,

    #[error("payment_date: payment date cannot be earlier than the document date")]
    PaymentDateBeforeDocumentDate,
}

/// Validate a document's fields and derive the dependent ones.
///
/// Steps, in order:
/// 1. kinds that carry no withholding get their tax amounts forced to zero;
/// 2. negative amounts are rejected, naming the offending field;
/// 3. the net amount is recomputed as gross minus taxes and must not be
///    negative;
/// 4. a paid document must carry a payment date no earlier than the document
///    date; an unpaid document has its payment date cleared silently.
///
/// Calling this twice in a row is a no-op the second time.
pub fn validate_and_derive(document: &mut Document) -> Result<(), LedgerError> {
    if !document.kind.carries_withholding() {
        document.service_tax_amount = Decimal::ZERO;
        document.withholding_tax_amount = Decimal::ZERO;
    }

    if document.service_tax_amount < Decimal::ZERO {
        return Err(LedgerError::NegativeAmount {
            field: "service_tax_amount",
        });
    }
    if document.withholding_tax_amount < Decimal::ZERO {
        return Err(LedgerError::NegativeAmount {
            field: "withholding_tax_amount",
        });
    }
    if document.gross_amount < Decimal::ZERO {
        return Err(LedgerError::NegativeAmount {
            field: "gross_amount",
        });
    }

    document.net_amount =
        document.gross_amount - document.service_tax_amount - document.withholding_tax_amount;
    if document.net_amount < Decimal::ZERO {
        return Err(LedgerError::NegativeNet);
    }

    match document.status {
        DocumentStatus::Paid => {
            let payment_date = document.payment_date.ok_or(LedgerError::MissingPaymentDate)?;
            if payment_date < document.document_date {
                return Err(LedgerError::PaymentDateBeforeDocumentDate);
            }
        }
        _ => {
            // supplied dates on unpaid documents are discarded, not rejected
            document.payment_date = None;
        }
    }

    Ok(())
}

/// Generate the next document number.
///
/// The number is the local wall-clock timestamp (`DDMMYYYYHHMMSS`) followed
/// by a four-digit daily sequence. The sequence continues from the trailing
/// digits of `last_number_today` (the highest number entered today) and
/// restarts at 1 when there is none or its suffix does not parse.
///
/// Two callers generating within the same second from the same last number
/// produce the same value; the unique constraint on `number` surfaces that
/// collision to the caller for retry.
pub fn generate_number(now: NaiveDateTime, last_number_today: Option<&str>) -> String {
    let prefix = now.format("%d%m%Y%H%M%S");
    let sequence = last_number_today
        .and_then(|number| {
            number
                .len()
                .checked_sub(SEQUENCE_LEN)
                .and_then(|start| number.get(start..))
        })
        .and_then(|suffix| suffix.parse::<u32>().ok())
        .map_or(1, |seq| seq + 1);
    format!("{prefix}{sequence:04}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::document::{DocumentKind, DocumentStage};
    use assert_matches::assert_matches;
    use chrono::{NaiveDate, Utc};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn document(kind: DocumentKind) -> Document {
        Document {
            id: Uuid::new_v4(),
            number: "150120241030000001".to_string(),
            external_number: None,
            kind,
            supplier_id: Uuid::new_v4(),
            budget_unit_id: None,
            budget_line_id: None,
            document_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            payment_date: None,
            entered_at: Utc::now(),
            gross_amount: dec!(100.00),
            service_tax_amount: Decimal::ZERO,
            withholding_tax_amount: Decimal::ZERO,
            net_amount: Decimal::ZERO,
            description: None,
            process_number: None,
            status: DocumentStatus::Pending,
            stage: DocumentStage::Opening,
            settled_at: None,
            settled_by: None,
        }
    }

    #[test]
    fn invoice_taxes_are_forced_to_zero() {
        let mut doc = document(DocumentKind::Invoice);
        doc.service_tax_amount = dec!(5.00);
        doc.withholding_tax_amount = dec!(3.00);

        validate_and_derive(&mut doc).unwrap();

        assert_eq!(doc.service_tax_amount, Decimal::ZERO);
        assert_eq!(doc.withholding_tax_amount, Decimal::ZERO);
        assert_eq!(doc.net_amount, dec!(100.00));
    }

    #[test]
    fn bill_taxes_are_forced_to_zero() {
        let mut doc = document(DocumentKind::Bill);
        doc.service_tax_amount = dec!(1.00);
        doc.withholding_tax_amount = dec!(2.00);

        validate_and_derive(&mut doc).unwrap();

        assert_eq!(doc.net_amount, doc.gross_amount);
    }

    #[test]
    fn net_is_gross_minus_taxes_for_service_invoices() {
        let mut doc = document(DocumentKind::ServiceInvoice);
        doc.gross_amount = dec!(100.00);
        doc.service_tax_amount = dec!(10.00);
        doc.withholding_tax_amount = dec!(5.00);

        validate_and_derive(&mut doc).unwrap();

        assert_eq!(doc.net_amount, dec!(85.00));
    }

    #[test]
    fn negative_gross_is_rejected() {
        let mut doc = document(DocumentKind::Receipt);
        doc.gross_amount = dec!(-1.00);

        assert_matches!(
            validate_and_derive(&mut doc),
            Err(LedgerError::NegativeAmount {
                field: "gross_amount"
            })
        );
    }

    #[test]
    fn negative_service_tax_is_rejected_for_kinds_that_carry_it() {
        let mut doc = document(DocumentKind::ServiceInvoice);
        doc.service_tax_amount = dec!(-0.01);

        assert_matches!(
            validate_and_derive(&mut doc),
            Err(LedgerError::NegativeAmount {
                field: "service_tax_amount"
            })
        );
    }

    #[test]
    fn taxes_exceeding_gross_are_rejected() {
        let mut doc = document(DocumentKind::Receipt);
        doc.gross_amount = dec!(10.00);
        doc.service_tax_amount = dec!(8.00);
        doc.withholding_tax_amount = dec!(8.00);

        assert_matches!(validate_and_derive(&mut doc), Err(LedgerError::NegativeNet));
    }

    #[test]
    fn paid_without_payment_date_is_rejected() {
        let mut doc = document(DocumentKind::Receipt);
        doc.status = DocumentStatus::Paid;
        doc.payment_date = None;

        assert_matches!(
            validate_and_derive(&mut doc),
            Err(LedgerError::MissingPaymentDate)
        );
    }

    #[test]
    fn payment_date_before_document_date_is_rejected() {
        let mut doc = document(DocumentKind::Receipt);
        doc.status = DocumentStatus::Paid;
        doc.payment_date = NaiveDate::from_ymd_opt(2024, 1, 10);

        assert_matches!(
            validate_and_derive(&mut doc),
            Err(LedgerError::PaymentDateBeforeDocumentDate)
        );
    }

    #[test]
    fn unpaid_payment_date_is_cleared_silently() {
        let mut doc = document(DocumentKind::Receipt);
        doc.status = DocumentStatus::Pending;
        doc.payment_date = NaiveDate::from_ymd_opt(2024, 1, 20);

        validate_and_derive(&mut doc).unwrap();

        assert_eq!(doc.payment_date, None);

        let mut overdue = document(DocumentKind::Receipt);
        overdue.status = DocumentStatus::Overdue;
        overdue.payment_date = NaiveDate::from_ymd_opt(2024, 1, 20);

        validate_and_derive(&mut overdue).unwrap();

        assert_eq!(overdue.payment_date, None);
    }

    #[test]
    fn derivation_is_idempotent() {
        let mut doc = document(DocumentKind::ServiceInvoice);
        doc.gross_amount = dec!(250.50);
        doc.service_tax_amount = dec!(12.30);
        doc.withholding_tax_amount = dec!(8.20);
        doc.payment_date = NaiveDate::from_ymd_opt(2024, 1, 20);

        validate_and_derive(&mut doc).unwrap();
        let first_pass = doc.clone();
        validate_and_derive(&mut doc).unwrap();

        assert_eq!(doc, first_pass);
    }

    proptest! {
        #[test]
        fn net_always_equals_gross_minus_taxes(
            gross in 0i64..=10_000_000,
            iss in 0i64..=1_000_000,
            irrf in 0i64..=1_000_000,
        ) {
            let mut doc = document(DocumentKind::StandaloneServiceInvoice);
            doc.gross_amount = Decimal::new(gross, 2);
            doc.service_tax_amount = Decimal::new(iss, 2);
            doc.withholding_tax_amount = Decimal::new(irrf, 2);

            match validate_and_derive(&mut doc) {
                Ok(()) => {
                    prop_assert_eq!(
                        doc.net_amount,
                        doc.gross_amount - doc.service_tax_amount - doc.withholding_tax_amount
                    );
                    prop_assert!(doc.net_amount >= Decimal::ZERO);
                }
                Err(LedgerError::NegativeNet) => {
                    prop_assert!(
                        Decimal::new(gross, 2) < Decimal::new(iss, 2) + Decimal::new(irrf, 2)
                    );
                }
                Err(other) => prop_assert!(false, "unexpected error: {}", other),
            }
        }
    }

    #[test]
    fn first_number_of_the_day_ends_in_0001() {
        let now = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();

        assert_eq!(generate_number(now, None), "150120241030000001");
    }

    #[test]
    fn sequence_continues_from_last_number_today() {
        let now = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(10, 30, 5)
            .unwrap();

        let number = generate_number(now, Some("150120241029590001"));
        assert_eq!(number, "150120241030050002");

        let number = generate_number(now, Some("150120241029590042"));
        assert!(number.ends_with("0043"));
    }

    #[test]
    fn unparseable_suffix_resets_the_sequence() {
        let now = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(10, 30, 5)
            .unwrap();

        assert!(generate_number(now, Some("15012024102959XYZ!")).ends_with("0001"));
        assert!(generate_number(now, Some("abc")).ends_with("0001"));
        assert!(generate_number(now, Some("01")).ends_with("0001"));
    }
}
