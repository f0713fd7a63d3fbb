use super::*;

#[test]
fn z_order_follows_dressing_order() {
    assert_eq!(defaults_for(Category::Shoes).z_order, 0);
    assert_eq!(defaults_for(Category::Bottom).z_order, 1);
    assert_eq!(defaults_for(Category::Top).z_order, 2);
    assert_eq!(defaults_for(Category::Accessories).z_order, 3);
}

#[test]
fn default_offsets_do_not_overlap() {
    let mut ys: Vec<f64> = Category::ALL
        .iter()
        .map(|c| defaults_for(*c).translate.y)
        .collect();
    ys.sort_by(f64::total_cmp);
    ys.dedup();
    assert_eq!(ys.len(), 4);
}

#[test]
fn default_transform_is_identity_at_offset() {
    let t = defaults_for(Category::Top).transform();
    assert_eq!(t.scale, 1.0);
    assert_eq!(t.rotation_deg, 0.0);
    assert_eq!(t.translate, Vec2::new(0.0, -90.0));
}

#[test]
fn category_serializes_upper_case() {
    let s = serde_json::to_string(&Category::Accessories).unwrap();
    assert_eq!(s, "\"ACCESSORIES\"");
    let c: Category = serde_json::from_str("\"BOTTOM\"").unwrap();
    assert_eq!(c, Category::Bottom);
    assert!(serde_json::from_str::<Category>("\"HAT\"").is_err());
}

#[test]
fn all_is_paint_order() {
    let mut sorted = Category::ALL;
    sorted.sort_by_key(|c| defaults_for(*c).z_order);
    assert_eq!(sorted, Category::ALL);
}
