use super::*;
use crate::foundation::core::{SCALE_MAX, Vec2};
use crate::gateway::catalog::{CatalogItem, InMemoryCatalog};
use crate::gateway::persist::MemoryGateway;
use crate::outfit::category::defaults_for;
use crate::outfit::model::CompositionRecord;
use crate::outfit::serialize::PersistedItem;

fn catalog() -> Arc<InMemoryCatalog> {
    let item = |id: &str, category| CatalogItem {
        id: id.to_string(),
        category,
    };
    Arc::new(InMemoryCatalog::new([
        item("shirt1", Category::Top),
        item("shirt2", Category::Top),
        item("jeans", Category::Bottom),
        item("boots", Category::Shoes),
        item("hat", Category::Accessories),
    ]))
}

fn session() -> EditorSession<MemoryGateway, InMemoryCatalog> {
    EditorSession::new("Friday", "u-1", Arc::new(MemoryGateway::new()), catalog())
}

#[test]
fn choose_item_validates_against_catalog() {
    let mut s = session();
    s.choose_item(Category::Top, Some("shirt1")).unwrap();

    let err = s.choose_item(Category::Top, Some("ghost")).unwrap_err();
    assert!(matches!(err, DrapeError::Validation(_)));
    let err = s.choose_item(Category::Top, Some("jeans")).unwrap_err();
    assert!(err.to_string().contains("bottom"));

    assert_eq!(s.store().entry(Category::Top).unwrap().item_id, "shirt1");
    s.choose_item(Category::Top, None).unwrap();
    assert!(s.store().is_empty());
}

#[test]
fn gestures_flow_through_controller() {
    let mut s = session();
    s.choose_item(Category::Top, Some("shirt1")).unwrap();
    s.handle_gesture(GestureMessage::Begin {
        on: Some(Category::Top),
    });
    s.handle_gesture(GestureMessage::Scale { ds: 10.0 });
    let e = s
        .handle_gesture(GestureMessage::Rotate { degrees: 370.0 })
        .unwrap();
    s.handle_gesture(GestureMessage::End);

    assert_eq!(e.transform.scale, SCALE_MAX);
    assert_eq!(e.transform.rotation_deg, 370.0);

    s.reset_transform(Category::Top);
    assert_eq!(
        s.store().entry(Category::Top).unwrap().transform,
        defaults_for(Category::Top).transform()
    );
}

#[test]
fn apply_command_place_is_catalog_checked() {
    let mut s = session();
    let bad = EditCommand::Place {
        category: Category::Shoes,
        item: "hat".to_string(),
    };
    assert!(s.apply_command(&bad).is_err());
    assert!(s.store().is_empty());

    s.apply_command(&EditCommand::Place {
        category: Category::Shoes,
        item: "boots".to_string(),
    })
    .unwrap();
    s.apply_command(&EditCommand::Select {
        category: Some(Category::Shoes),
    })
    .unwrap();
    assert_eq!(s.store().active(), Some(Category::Shoes));
}

#[tokio::test]
async fn save_then_open_round_trips() {
    let gateway = Arc::new(MemoryGateway::new());
    let mut s = EditorSession::new("Friday", "u-1", Arc::clone(&gateway), catalog());
    s.choose_item(Category::Top, Some("shirt1")).unwrap();
    s.choose_item(Category::Bottom, Some("jeans")).unwrap();
    s.select(Some(Category::Bottom));
    s.handle_gesture(GestureMessage::Translate { dx: 12.5, dy: -4.0 });

    let receipt = s.save(None).await.unwrap();
    assert_eq!(s.composition().id.as_deref(), Some(receipt.id.as_str()));

    let opened = EditorSession::open(&receipt.id, Arc::clone(&gateway), catalog())
        .await
        .unwrap();
    assert!(opened.store().same_entries(s.store()));
    assert_eq!(opened.store().active(), None);
    assert_eq!(opened.composition().name, "Friday");
    assert_eq!(opened.owner_id(), "u-1");
    assert_eq!(
        opened
            .store()
            .entry(Category::Bottom)
            .unwrap()
            .transform
            .translate,
        defaults_for(Category::Bottom).translate + Vec2::new(12.5, -4.0)
    );
}

#[tokio::test]
async fn second_save_while_first_outstanding_is_rejected() {
    let mut s = session();
    s.choose_item(Category::Top, Some("shirt1")).unwrap();

    let first = s.begin_save(None).unwrap();
    assert!(matches!(s.begin_save(None), Err(DrapeError::SaveInFlight)));

    let receipt = first.await.unwrap();
    s.finish_save(&receipt);
    assert!(s.begin_save(None).is_ok());
}

#[tokio::test]
async fn resave_reuses_identity() {
    let gateway = Arc::new(MemoryGateway::new());
    let mut s = EditorSession::new("A", "u-1", Arc::clone(&gateway), catalog());
    let first = s.save(None).await.unwrap();
    s.rename("B");
    let second = s.save(None).await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(gateway.len().await, 1);
    assert_eq!(gateway.load(&first.id).await.unwrap().name, "B");
}

#[tokio::test]
async fn failed_save_keeps_working_copy() {
    let gateway = Arc::new(MemoryGateway::new());
    let mut s = EditorSession::new("Friday", "u-1", Arc::clone(&gateway), catalog());
    s.choose_item(Category::Shoes, Some("boots")).unwrap();

    gateway.set_offline(true);
    let err = s.save(None).await.unwrap_err();
    assert!(matches!(err, DrapeError::Gateway(_)));
    assert_eq!(s.composition().id, None);
    assert_eq!(s.store().entry(Category::Shoes).unwrap().item_id, "boots");

    gateway.set_offline(false);
    assert!(s.save(None).await.is_ok());
}

#[tokio::test]
async fn open_fails_on_missing_or_malformed() {
    let gateway = Arc::new(MemoryGateway::new());
    let missing = EditorSession::open("nope", Arc::clone(&gateway), catalog()).await;
    assert!(matches!(missing, Err(DrapeError::NotFound(_))));

    let top = |id: &str| PersistedItem {
        item_identity: id.to_string(),
        category: Category::Top,
        x: 0.0,
        y: 0.0,
        scale: 1.0,
        rotation: 0.0,
        z_order: 2,
    };
    gateway
        .insert_raw(CompositionRecord {
            id: "dup".to_string(),
            owner_id: "u-1".to_string(),
            name: "broken".to_string(),
            thumbnail_ref: None,
            items: vec![top("shirt1"), top("shirt2")],
            created_at: None,
        })
        .await;
    let malformed = EditorSession::open("dup", Arc::clone(&gateway), catalog()).await;
    assert!(matches!(malformed, Err(DrapeError::Malformed(_))));
}

#[tokio::test]
async fn open_keeps_items_missing_from_catalog() {
    let gateway = Arc::new(MemoryGateway::new());
    let mut s = EditorSession::new("Friday", "u-1", Arc::clone(&gateway), catalog());
    s.choose_item(Category::Top, Some("shirt1")).unwrap();
    s.choose_item(Category::Accessories, Some("hat")).unwrap();
    let receipt = s.save(None).await.unwrap();

    let smaller = Arc::new(InMemoryCatalog::new([CatalogItem {
        id: "shirt1".to_string(),
        category: Category::Top,
    }]));
    let opened = EditorSession::open(&receipt.id, gateway, smaller)
        .await
        .unwrap();
    assert!(opened.store().same_entries(s.store()));
    let unresolved: Vec<Category> = opened
        .unresolved_entries()
        .iter()
        .map(|e| e.category)
        .collect();
    assert_eq!(unresolved, vec![Category::Accessories]);
}

#[tokio::test]
async fn resave_without_catalog_keeps_stored_items() {
    let gateway = Arc::new(MemoryGateway::new());
    let mut s = EditorSession::new("Friday", "u-1", Arc::clone(&gateway), catalog());
    s.choose_item(Category::Top, Some("shirt1")).unwrap();
    let receipt = s.save(None).await.unwrap();

    let mut reopened = EditorSession::open(
        &receipt.id,
        Arc::clone(&gateway),
        Arc::new(InMemoryCatalog::default()),
    )
    .await
    .unwrap();
    assert_eq!(reopened.store().len(), 1);
    reopened.rename("Friday night");
    reopened.save(None).await.unwrap();

    let stored = gateway.load(&receipt.id).await.unwrap();
    assert_eq!(stored.name, "Friday night");
    assert_eq!(stored.items.len(), 1);
    assert_eq!(stored.items[0].item_identity, "shirt1");
}

#[tokio::test]
async fn thumbnail_ref_is_recorded() {
    let mut s = session();
    let thumb = Thumbnail::from_pixel(2, 2, image::Rgba([0, 0, 0, 255]));
    let receipt = s.save(Some(thumb)).await.unwrap();
    assert!(receipt.thumbnail_ref.is_some());
    assert_eq!(s.composition().thumbnail_ref, receipt.thumbnail_ref);
}
