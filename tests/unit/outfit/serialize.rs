use super::*;
use crate::outfit::category::defaults_for;
use crate::outfit::controller::TransformController;

fn item(category: Category, id: &str) -> PersistedItem {
    PersistedItem {
        item_identity: id.to_string(),
        category,
        x: 1.0,
        y: 2.0,
        scale: 1.5,
        rotation: -30.0,
        z_order: defaults_for(category).z_order,
    }
}

#[test]
fn round_trip_reproduces_entries() {
    let mut store = PlacementStore::new();
    let ctl = TransformController::new();
    store.set_item(Category::Top, Some("shirt1"));
    store.set_item(Category::Bottom, Some("jeans"));
    store.set_item(Category::Accessories, Some("hat"));
    store.select(Some(Category::Bottom));
    ctl.apply_translation_delta(&mut store, -17.25, 3.5);
    ctl.apply_rotation_delta(&mut store, 725.0);
    ctl.apply_scale_delta(&mut store, -0.3);

    let items = serialize(&store);
    let back = deserialize(&items).unwrap();
    assert!(back.same_entries(&store));
    assert_eq!(back.active(), None);
}

#[test]
fn scenario_clamped_scale_and_raw_rotation_survive() {
    let mut store = PlacementStore::new();
    let ctl = TransformController::new();
    store.set_item(Category::Top, Some("shirt1"));
    store.select(Some(Category::Top));
    ctl.apply_scale_delta(&mut store, 10.0);
    ctl.apply_rotation_delta(&mut store, 370.0);

    let items = serialize(&store);
    let json = serde_json::to_string(&items).unwrap();
    let items: Vec<PersistedItem> = serde_json::from_str(&json).unwrap();
    let back = deserialize(&items).unwrap();

    let e = back.entry(Category::Top).unwrap();
    assert_eq!(e.transform.scale, 5.0);
    assert_eq!(e.transform.rotation_deg, 370.0);
    assert_eq!(e.transform.translate, defaults_for(Category::Top).translate);
    assert_eq!(e.z_order, 2);
}

#[test]
fn list_order_does_not_decide_paint_order() {
    let mut hat = item(Category::Accessories, "hat");
    hat.z_order = -1;
    let shoes = item(Category::Shoes, "boots");
    let store = deserialize(&[shoes, hat]).unwrap();
    let order: Vec<Category> = store.current_entries().iter().map(|e| e.category).collect();
    assert_eq!(order, vec![Category::Accessories, Category::Shoes]);
}

#[test]
fn duplicate_category_is_malformed() {
    let err = deserialize(&[item(Category::Top, "a"), item(Category::Top, "b")]).unwrap_err();
    assert!(matches!(err, DrapeError::Malformed(_)));
    assert!(err.to_string().contains("top"));
}

#[test]
fn out_of_range_scale_is_malformed_not_clamped() {
    let mut bad = item(Category::Shoes, "boots");
    bad.scale = 7.5;
    assert!(matches!(
        deserialize(&[bad.clone()]),
        Err(DrapeError::Malformed(_))
    ));
    bad.scale = 0.25;
    assert!(matches!(deserialize(&[bad]), Err(DrapeError::Malformed(_))));
}

#[test]
fn non_finite_and_empty_identity_are_malformed() {
    let mut bad = item(Category::Bottom, "jeans");
    bad.rotation = f64::NAN;
    assert!(bad.validate().is_err());

    let empty = item(Category::Bottom, "  ");
    assert!(empty.validate().is_err());
}

#[test]
fn failed_load_leaves_store_untouched() {
    let mut store = PlacementStore::new();
    store.set_item(Category::Top, Some("shirt1"));
    store.select(Some(Category::Top));

    let res = deserialize_into(
        &mut store,
        &[item(Category::Bottom, "a"), item(Category::Bottom, "b")],
    );
    assert!(res.is_err());
    assert_eq!(store.entry(Category::Top).unwrap().item_id, "shirt1");
    assert_eq!(store.active(), Some(Category::Top));
}

#[test]
fn persisted_keys_are_camel_case() {
    let v = serde_json::to_value(item(Category::Top, "shirt1")).unwrap();
    assert_eq!(v["itemIdentity"], "shirt1");
    assert_eq!(v["category"], "TOP");
    assert_eq!(v["zOrder"], 2);
}

#[test]
fn empty_store_serializes_to_empty_list() {
    assert!(serialize(&PlacementStore::new()).is_empty());
    assert!(deserialize(&[]).unwrap().is_empty());
}
