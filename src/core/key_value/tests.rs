#![allow(clippy::unwrap_used)]
#![allow(clippy::float_cmp)]
use super::*;
use crate::core::convocation::{NewConvocationGroup, create_convocation_group};
use crate::core::ledger::{MovementDraft, issue_movement};
use crate::entities::{Movement, MovementItem, PaymentStatus, movement, movement_item};
use crate::test_utils::*;
use sea_orm::PaginatorTrait;
use serde_json::json;

async fn group_without_rates(
    db: &DatabaseConnection,
    event_id: &str,
) -> Result<convocation_group::Model> {
    create_convocation_group(
        db,
        &BillingSettings::default(),
        NewConvocationGroup {
            event_id: event_id.to_string(),
            name: "Juvenis".to_string(),
            athlete_ids: Vec::new(),
            issued_on: ymd(2024, 1, 1),
            base_fee: None,
            race_fee: None,
            jump_fee: None,
            relay_fee: None,
        },
    )
    .await
}

#[test]
fn test_store_key_round_trip() {
    for key in StoreKey::ALL {
        assert_eq!(StoreKey::parse(key.as_str()), Some(key));
    }
    assert_eq!(StoreKey::parse("club-socios"), None);
    assert_eq!(StoreKey::parse(""), None);
    assert_eq!(
        serde_json::to_value(StoreKey::ConvocationMovements).unwrap(),
        json!("movimentos-convocatoria")
    );
}

#[tokio::test]
async fn test_unsupported_key_is_a_no_op() -> Result<()> {
    let db = setup_test_db().await?;
    let billing = BillingSettings::default();

    assert_eq!(get(&db, "club-socios").await?, None);
    assert_eq!(
        set(&db, &billing, "club-socios", json!([{"id": "x"}]), "nobody").await?,
        None
    );
    assert_eq!(delete(&db, "club-socios").await?, None);
    Ok(())
}

#[tokio::test]
async fn test_get_on_empty_table_is_empty_array() -> Result<()> {
    let db = setup_test_db().await?;

    for key in StoreKey::ALL {
        assert_eq!(get(&db, key.as_str()).await?, Some(json!([])));
    }
    Ok(())
}

#[tokio::test]
async fn test_set_events_upserts_and_formats_start_time() -> Result<()> {
    let db = setup_test_db().await?;
    let billing = BillingSettings::default();
    let actor = create_test_user(&db, "Direção").await?;

    let summary = set(
        &db,
        &billing,
        "club-events",
        json!([
            {"id": "e1", "title": "Treino aberto", "starts_on": "2024-02-03", "start_time": "09:30"},
            {"title": "Regional", "starts_on": "2024-03-09", "registration_fee": 6.5},
        ]),
        &actor.id,
    )
    .await?
    .unwrap();

    assert_eq!(summary.key, StoreKey::Events);
    assert_eq!(summary.inserted, 2);
    assert_eq!(summary.deleted, 0);

    let rows = get(&db, "club-events").await?.unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["id"], "e1");
    assert_eq!(rows[0]["start_time"], "09:30");
    assert_eq!(rows[0]["created_by"], json!(actor.id));
    assert!(rows[1]["start_time"].is_null());
    assert_eq!(rows[1]["registration_fee"], 6.5);
    assert!(!rows[1]["id"].as_str().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_set_events_keeps_known_creator_and_created_at() -> Result<()> {
    let db = setup_test_db().await?;
    let billing = BillingSettings::default();
    let actor = create_test_user(&db, "Direção").await?;
    let coach = create_test_user(&db, "Treinador").await?;

    set(
        &db,
        &billing,
        "club-events",
        json!([
            {"id": "e1", "title": "Treino", "starts_on": "2024-02-03", "created_by": coach.id},
            {"id": "e2", "title": "Treino", "starts_on": "2024-02-04", "created_by": "ghost"},
        ]),
        &actor.id,
    )
    .await?;
    let before = Event::find_by_id("e1".to_string()).one(&db).await?.unwrap();
    assert_eq!(before.created_by, coach.id);
    let ghost = Event::find_by_id("e2".to_string()).one(&db).await?.unwrap();
    assert_eq!(ghost.created_by, actor.id);

    let summary = set(
        &db,
        &billing,
        "club-events",
        json!([{"id": "e1", "title": "Treino técnico", "starts_on": "2024-02-03", "created_by": coach.id}]),
        &actor.id,
    )
    .await?
    .unwrap();
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.deleted, 1);

    let after = Event::find_by_id("e1".to_string()).one(&db).await?.unwrap();
    assert_eq!(after.title, "Treino técnico");
    assert_eq!(after.created_at, before.created_at);
    Ok(())
}

#[tokio::test]
async fn test_set_replaces_whole_table() -> Result<()> {
    let db = setup_test_db().await?;
    let billing = BillingSettings::default();
    let actor = create_test_user(&db, "Direção").await?;

    set(
        &db,
        &billing,
        "club-events",
        json!([
            {"id": "x", "title": "X", "starts_on": "2024-02-03"},
            {"id": "y", "title": "Y", "starts_on": "2024-02-04"},
        ]),
        &actor.id,
    )
    .await?;

    // A second set that omits X deletes X
    set(
        &db,
        &billing,
        "club-events",
        json!([{"id": "y", "title": "Y", "starts_on": "2024-02-04"}]),
        &actor.id,
    )
    .await?;
    assert!(Event::find_by_id("x".to_string()).one(&db).await?.is_none());
    assert_eq!(Event::find().count(&db).await?, 1);

    // An empty set deletes everything
    let summary = set(&db, &billing, "club-events", json!([]), &actor.id)
        .await?
        .unwrap();
    assert_eq!(summary.deleted, 1);
    assert_eq!(Event::find().count(&db).await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_non_array_value_clears_table() -> Result<()> {
    let db = setup_test_db().await?;
    let billing = BillingSettings::default();

    set(
        &db,
        &billing,
        "club-eventos-tipos",
        json!([{"name": "Treino"}, {"name": "Prova"}]),
        "nobody",
    )
    .await?;
    assert_eq!(EventType::find().count(&db).await?, 2);

    let summary = set(
        &db,
        &billing,
        "club-eventos-tipos",
        json!({"name": "Treino"}),
        "nobody",
    )
    .await?
    .unwrap();
    assert_eq!(summary.deleted, 2);
    assert_eq!(EventType::find().count(&db).await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_set_events_requires_existing_actor() -> Result<()> {
    let db = setup_test_db().await?;
    let billing = BillingSettings::default();

    let result = set(
        &db,
        &billing,
        "club-events",
        json!([{"title": "X", "starts_on": "2024-02-03"}]),
        "ghost",
    )
    .await;
    assert!(matches!(result, Err(Error::UserNotFound { .. })));
    assert_eq!(Event::find().count(&db).await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_malformed_record_rolls_back() -> Result<()> {
    let db = setup_test_db().await?;
    let billing = BillingSettings::default();
    let actor = create_test_user(&db, "Direção").await?;
    let event = create_test_event(&db, &actor.id, None).await?;

    set(
        &db,
        &billing,
        "club-presencas",
        json!([{"id": "a1", "user_id": actor.id, "event_id": event.id, "attended_on": "2024-01-13"}]),
        &actor.id,
    )
    .await?;

    let result = set(
        &db,
        &billing,
        "club-presencas",
        json!([
            {"id": "a2", "user_id": actor.id, "event_id": event.id, "attended_on": "2024-01-14"},
            {"id": "a3", "user_id": actor.id, "attended_on": "not a date"},
        ]),
        &actor.id,
    )
    .await;
    assert!(matches!(
        result,
        Err(Error::InvalidRecord { ref key, .. }) if key == "club-presencas"
    ));

    // The earlier state survives untouched
    let rows = Attendance::find().all(&db).await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, "a1");
    assert_eq!(rows[0].status, "present");
    Ok(())
}

#[tokio::test]
async fn test_invalid_start_time_is_rejected() -> Result<()> {
    let db = setup_test_db().await?;
    let billing = BillingSettings::default();
    let actor = create_test_user(&db, "Direção").await?;

    let result = set(
        &db,
        &billing,
        "club-events",
        json!([{"title": "X", "starts_on": "2024-02-03", "start_time": "25:99"}]),
        &actor.id,
    )
    .await;
    assert!(matches!(result, Err(Error::InvalidRecord { .. })));
    Ok(())
}

#[tokio::test]
async fn test_new_group_fires_convocation_cascade_once() -> Result<()> {
    let db = setup_test_db().await?;
    let billing = BillingSettings::default();
    let creator = create_test_user(&db, "Direção").await?;
    let event = create_convocation_event(&db, &creator.id).await?;
    let ana = create_test_user(&db, "Ana").await?;

    let groups = json!([{
        "id": "g1",
        "event_id": event.id,
        "name": "Juvenis",
        "athlete_ids": [ana.id],
        "issued_on": "2024-01-01",
    }]);

    let summary = set(&db, &billing, "club-convocatorias-grupo", groups.clone(), &creator.id)
        .await?
        .unwrap();
    assert_eq!(summary.inserted, 1);

    // Ana costs the base fee; plus the aggregate movement
    assert_eq!(Movement::find().count(&db).await?, 2);
    let group = ConvocationGroup::find_by_id("g1".to_string())
        .one(&db)
        .await?
        .unwrap();
    assert!(group.movement_id.is_some());

    // Updating the group does not charge again
    let summary = set(&db, &billing, "club-convocatorias-grupo", groups, &creator.id)
        .await?
        .unwrap();
    assert_eq!(summary.updated, 1);
    assert_eq!(Movement::find().count(&db).await?, 2);
    let updated = ConvocationGroup::find_by_id("g1".to_string())
        .one(&db)
        .await?
        .unwrap();
    assert_eq!(updated.movement_id, group.movement_id);
    Ok(())
}

#[tokio::test]
async fn test_athletes_reconcile_per_group() -> Result<()> {
    let db = setup_test_db().await?;
    let billing = BillingSettings::default();
    let creator = create_test_user(&db, "Direção").await?;
    let event = create_test_event(&db, &creator.id, None).await?;
    let g1 = group_without_rates(&db, &event.id).await?;
    let g2 = group_without_rates(&db, &event.id).await?;
    let ana = create_test_user(&db, "Ana").await?;
    let rui = create_test_user(&db, "Rui").await?;

    set(
        &db,
        &billing,
        "club-convocatorias-atleta",
        json!([
            {"group_id": g1.id, "athlete_id": ana.id, "races": ["r1"]},
            {"group_id": g1.id, "athlete_id": rui.id},
            {"group_id": g2.id, "athlete_id": ana.id},
        ]),
        &creator.id,
    )
    .await?;
    assert_eq!(ConvocationAthlete::find().count(&db).await?, 3);

    // Rui leaves g1 and g2 disappears from the payload
    let summary = set(
        &db,
        &billing,
        "club-convocatorias-atleta",
        json!([{"group_id": g1.id, "athlete_id": ana.id, "races": ["r1", "r2"], "confirmed": true}]),
        &creator.id,
    )
    .await?
    .unwrap();
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.deleted, 2);

    let rows = ConvocationAthlete::find().all(&db).await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].group_id, g1.id);
    assert_eq!(rows[0].athlete_id, ana.id);
    assert_eq!(rows[0].races, json!(["r1", "r2"]));
    assert!(rows[0].confirmed);
    Ok(())
}

#[tokio::test]
async fn test_movements_are_scoped_and_items_replaced() -> Result<()> {
    let db = setup_test_db().await?;
    let billing = BillingSettings::default();
    let creator = create_test_user(&db, "Direção").await?;
    let event = create_test_event(&db, &creator.id, None).await?;
    let group = group_without_rates(&db, &event.id).await?;

    // A movement outside any convocation is never touched
    let (unscoped, _) = issue_movement(
        &db,
        &billing,
        MovementDraft {
            user_id: None,
            convocation_group_id: None,
            event_id: None,
            issued_on: ymd(2024, 1, 1),
            description: "Piscina".to_string(),
            unit_price: 50.0,
            quantity: 1,
            category: None,
        },
    )
    .await?;

    let summary = set(
        &db,
        &billing,
        "movimentos-convocatoria",
        json!([{
            "id": "m1",
            "convocation_group_id": group.id,
            "issued_on": "2024-01-01",
            "description": "Transporte",
            "items": [
                {"id": "i1", "description": "Autocarro", "unit_price": 20.0},
                {"id": "i2", "description": "Portagens", "unit_price": 2.5, "quantity": 2},
            ],
        }]),
        &creator.id,
    )
    .await?
    .unwrap();
    assert_eq!(summary.inserted, 1);

    let m1 = Movement::find_by_id("m1".to_string()).one(&db).await?.unwrap();
    assert_eq!(m1.total, 25.0);
    assert_eq!(m1.due_on, ymd(2024, 1, 11));
    assert_eq!(m1.status, PaymentStatus::Pending);
    assert_eq!(m1.category.as_deref(), Some("convocatorias"));

    let rows = get(&db, "movimentos-convocatoria").await?.unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["items"].as_array().unwrap().len(), 2);

    // Resend with one item changed and one dropped
    set(
        &db,
        &billing,
        "movimentos-convocatoria",
        json!([{
            "id": "m1",
            "convocation_group_id": group.id,
            "issued_on": "2024-01-01",
            "due_on": "2024-01-31",
            "status": "paid",
            "description": "Transporte",
            "items": [{"id": "i1", "description": "Autocarro", "unit_price": 30.0}],
        }]),
        &creator.id,
    )
    .await?;

    let m1 = Movement::find_by_id("m1".to_string()).one(&db).await?.unwrap();
    assert_eq!(m1.total, 30.0);
    assert_eq!(m1.due_on, ymd(2024, 1, 31));
    assert_eq!(m1.status, PaymentStatus::Paid);
    let items = MovementItem::find()
        .filter(movement_item::Column::MovementId.eq("m1"))
        .all(&db)
        .await?;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].total, 30.0);

    // An empty payload drops m1 and its items but keeps the unscoped movement
    let summary = set(&db, &billing, "movimentos-convocatoria", json!([]), &creator.id)
        .await?
        .unwrap();
    assert_eq!(summary.deleted, 1);
    assert!(Movement::find_by_id("m1".to_string()).one(&db).await?.is_none());
    assert_eq!(
        MovementItem::find()
            .filter(movement_item::Column::MovementId.eq("m1"))
            .count(&db)
            .await?,
        0
    );
    assert!(
        Movement::find_by_id(unscoped.id.clone())
            .one(&db)
            .await?
            .is_some()
    );
    Ok(())
}

#[tokio::test]
async fn test_movement_sync_rejects_ids_outside_its_scope() -> Result<()> {
    let db = setup_test_db().await?;
    let billing = BillingSettings::default();
    let creator = create_test_user(&db, "Direção").await?;
    let event = create_test_event(&db, &creator.id, None).await?;
    let group = group_without_rates(&db, &event.id).await?;

    let (plain, plain_item) = issue_movement(
        &db,
        &billing,
        MovementDraft {
            user_id: None,
            convocation_group_id: None,
            event_id: None,
            issued_on: ymd(2024, 1, 1),
            description: "Piscina".to_string(),
            unit_price: 100.0,
            quantity: 1,
            category: None,
        },
    )
    .await?;

    // Reusing the id of a plain movement
    let result = set(
        &db,
        &billing,
        "movimentos-convocatoria",
        json!([{
            "id": plain.id,
            "convocation_group_id": group.id,
            "issued_on": "2024-01-01",
            "description": "Transporte",
            "total": 1.0,
        }]),
        &creator.id,
    )
    .await;
    assert!(matches!(
        result,
        Err(Error::InvalidRecord { ref key, .. }) if key == "movimentos-convocatoria"
    ));

    // Reusing the id of a plain movement's item
    let result = set(
        &db,
        &billing,
        "movimentos-convocatoria",
        json!([{
            "id": "m1",
            "convocation_group_id": group.id,
            "issued_on": "2024-01-01",
            "description": "Transporte",
            "items": [{"id": plain_item.id, "description": "Autocarro", "unit_price": 20.0}],
        }]),
        &creator.id,
    )
    .await;
    assert!(matches!(result, Err(Error::InvalidRecord { .. })));
    assert!(Movement::find_by_id("m1".to_string()).one(&db).await?.is_none());

    // Clearing the key leaves the plain movement and its item alone
    set(&db, &billing, "movimentos-convocatoria", json!([]), &creator.id).await?;

    let stored = Movement::find_by_id(plain.id.clone()).one(&db).await?.unwrap();
    assert_eq!(stored, plain);
    let stored_item = MovementItem::find_by_id(plain_item.id.clone())
        .one(&db)
        .await?
        .unwrap();
    assert_eq!(stored_item, plain_item);
    Ok(())
}

#[tokio::test]
async fn test_delete_clears_only_scoped_movements() -> Result<()> {
    let db = setup_test_db().await?;
    let billing = BillingSettings::default();
    let creator = create_test_user(&db, "Direção").await?;
    let event = create_convocation_event(&db, &creator.id).await?;
    let ana = create_test_user(&db, "Ana").await?;

    let new_group = NewConvocationGroup {
        event_id: event.id.clone(),
        name: "Juvenis".to_string(),
        athlete_ids: vec![ana.id.clone()],
        issued_on: ymd(2024, 1, 1),
        base_fee: None,
        race_fee: None,
        jump_fee: None,
        relay_fee: None,
    };
    create_convocation_group(&db, &billing, new_group).await?;
    issue_movement(
        &db,
        &billing,
        MovementDraft {
            user_id: Some(ana.id.clone()),
            convocation_group_id: None,
            event_id: Some(event.id.clone()),
            issued_on: ymd(2024, 1, 1),
            description: "Estágio".to_string(),
            unit_price: 80.0,
            quantity: 1,
            category: None,
        },
    )
    .await?;
    assert_eq!(Movement::find().count(&db).await?, 3);

    let summary = delete(&db, "movimentos-convocatoria").await?.unwrap();
    assert_eq!(summary.deleted, 2);

    let remaining = Movement::find().all(&db).await?;
    assert_eq!(remaining.len(), 1);
    assert!(remaining[0].convocation_group_id.is_none());
    assert_eq!(
        Movement::find()
            .filter(movement::Column::ConvocationGroupId.is_not_null())
            .count(&db)
            .await?,
        0
    );
    Ok(())
}

#[tokio::test]
async fn test_delete_empties_table() -> Result<()> {
    let db = setup_test_db().await?;
    let billing = BillingSettings::default();

    set(
        &db,
        &billing,
        "club-eventos-tipos",
        json!([{"name": "Treino"}, {"name": "Prova", "color": "#ff0000"}]),
        "nobody",
    )
    .await?;

    let summary = delete(&db, "club-eventos-tipos").await?.unwrap();
    assert_eq!(summary.key, StoreKey::EventTypes);
    assert_eq!(summary.deleted, 2);
    assert_eq!(get(&db, "club-eventos-tipos").await?, Some(json!([])));
    Ok(())
}
