mod common;

use docfinance_api::{
    entities::supplier::SupplierKind,
    errors::ServiceError,
    services::suppliers::{NewSupplier, SupplierChanges},
};

use common::{TestApp, VALID_CNPJ, VALID_CPF};

fn supplier_input(kind: SupplierKind, name: &str, tax_id: &str) -> NewSupplier {
    NewSupplier {
        kind,
        name: name.to_string(),
        tax_id: tax_id.to_string(),
        email: None,
        phone: None,
        address: None,
        bank_name: None,
        account_type: None,
        branch_code: None,
        account_number: None,
    }
}

#[tokio::test]
async fn tax_ids_are_normalized_and_unique() {
    let app = TestApp::new().await;

    let saved = app
        .state
        .services
        .suppliers
        .create(
            supplier_input(SupplierKind::Company, "Construtora Alfa Ltda", VALID_CNPJ),
            None,
            None,
        )
        .await
        .expect("create supplier");

    // stored digits-only, formatted on demand
    assert_eq!(saved.tax_id, "11222333000181");
    assert_eq!(saved.formatted_tax_id(), "11.222.333/0001-81");

    // same id, different mask: still a duplicate
    let duplicate = app
        .state
        .services
        .suppliers
        .create(
            supplier_input(SupplierKind::Company, "Outra Empresa", "11222333000181"),
            None,
            None,
        )
        .await;
    assert!(matches!(duplicate, Err(ServiceError::Conflict(_))));
}

#[tokio::test]
async fn tax_id_checksum_is_enforced_per_kind() {
    let app = TestApp::new().await;

    let bad_checksum = app
        .state
        .services
        .suppliers
        .create(
            supplier_input(SupplierKind::Company, "Empresa X", "11.222.333/0001-82"),
            None,
            None,
        )
        .await;
    assert!(matches!(
        bad_checksum,
        Err(ServiceError::ValidationError(message)) if message.contains("tax_id")
    ));

    // a CNPJ is not accepted for an individual
    let wrong_kind = app
        .state
        .services
        .suppliers
        .create(
            supplier_input(SupplierKind::Individual, "Maria Souza", VALID_CNPJ),
            None,
            None,
        )
        .await;
    assert!(wrong_kind.is_err());

    let individual = app
        .state
        .services
        .suppliers
        .create(
            supplier_input(SupplierKind::Individual, "Maria Souza", VALID_CPF),
            None,
            None,
        )
        .await
        .expect("create individual supplier");
    assert_eq!(individual.tax_id, "52998224725");
}

#[tokio::test]
async fn bank_data_formats_are_validated() {
    let app = TestApp::new().await;

    let mut input = supplier_input(SupplierKind::Company, "Empresa Y", VALID_CNPJ);
    input.branch_code = Some("12345".to_string());

    let result = app.state.services.suppliers.create(input, None, None).await;
    assert!(matches!(
        result,
        Err(ServiceError::ValidationError(message)) if message.contains("branch_code")
    ));

    let mut input = supplier_input(SupplierKind::Company, "Empresa Y", VALID_CNPJ);
    input.branch_code = Some("1234-X".to_string());
    input.account_number = Some("1234567-0".to_string());
    let saved = app
        .state
        .services
        .suppliers
        .create(input, None, None)
        .await
        .expect("create supplier with bank data");
    assert_eq!(saved.branch_code.as_deref(), Some("1234-X"));
}

#[tokio::test]
async fn supplier_updates_revalidate_the_tax_id() {
    let app = TestApp::new().await;
    let saved = app.seed_supplier("Construtora Alfa Ltda").await;

    // switching to individual without a matching CPF must fail
    let changes = SupplierChanges {
        kind: Some(SupplierKind::Individual),
        ..Default::default()
    };
    let result = app
        .state
        .services
        .suppliers
        .update(saved.id, changes, None, None)
        .await;
    assert!(result.is_err());

    let changes = SupplierChanges {
        kind: Some(SupplierKind::Individual),
        tax_id: Some(VALID_CPF.to_string()),
        ..Default::default()
    };
    let updated = app
        .state
        .services
        .suppliers
        .update(saved.id, changes, None, None)
        .await
        .expect("update supplier");
    assert_eq!(updated.tax_id, "52998224725");
}

#[tokio::test]
async fn unit_codes_are_acronyms_with_collision_suffixes() {
    let app = TestApp::new().await;
    let budget = &app.state.services.budget;

    let education = budget
        .create_unit("Sec. de Educação", None, None)
        .await
        .expect("create education");
    assert_eq!(education.code, "SDE");

    // same initials, different name: numeric suffix
    let system = budget
        .create_unit("Sistema de Ensino", None, None)
        .await
        .expect("create colliding unit");
    assert_eq!(system.code, "SDE2");

    // same name: rejected outright
    let duplicate = budget.create_unit("Sec. de Educação", None, None).await;
    assert!(matches!(duplicate, Err(ServiceError::Conflict(_))));
}

#[tokio::test]
async fn line_codes_are_prefixed_with_the_unit_code() {
    let app = TestApp::new().await;
    let budget = &app.state.services.budget;

    let unit = budget
        .create_unit("Fundo Municipal Saúde", None, None)
        .await
        .expect("create unit");
    assert_eq!(unit.code, "FMS");

    let line = budget
        .create_line(unit.id, "FUNDEB", None, None)
        .await
        .expect("create line");
    assert_eq!(line.code, "FMS-FUNDEB");

    let colliding = budget
        .create_line(unit.id, "Fundeb", None, None)
        .await
        .expect("create colliding line");
    assert_eq!(colliding.code, "FMS-FUNDEB2");
}

#[tokio::test]
async fn deleting_a_unit_removes_its_lines() {
    let app = TestApp::new().await;
    let budget = &app.state.services.budget;

    let unit = budget
        .create_unit("Sec. de Assistência", None, None)
        .await
        .expect("create unit");
    let line = budget
        .create_line(unit.id, "FMAS", None, None)
        .await
        .expect("create line");

    budget
        .delete_unit(unit.id, None, None)
        .await
        .expect("delete unit");

    let result = budget.get_line(line.id).await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn state_changes_are_recorded_in_the_activity_log() {
    let app = TestApp::new().await;
    let actor = uuid::Uuid::new_v4();

    app.state
        .services
        .suppliers
        .create(
            supplier_input(SupplierKind::Company, "Construtora Alfa Ltda", VALID_CNPJ),
            Some(actor),
            Some("192.0.2.10"),
        )
        .await
        .expect("create supplier");

    let (entries, total) = app
        .state
        .services
        .activity
        .list(1, 20)
        .await
        .expect("list activity");

    assert_eq!(total, 1);
    assert_eq!(entries[0].action, "Supplier created");
    assert_eq!(entries[0].actor_id, Some(actor));
    assert_eq!(entries[0].client_ip.as_deref(), Some("192.0.2.10"));
}
