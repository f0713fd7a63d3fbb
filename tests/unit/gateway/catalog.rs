use super::*;

#[test]
fn resolves_known_items_only() {
    let catalog = InMemoryCatalog::new([
        CatalogItem {
            id: "shirt1".to_string(),
            category: Category::Top,
        },
        CatalogItem {
            id: "boots".to_string(),
            category: Category::Shoes,
        },
    ]);
    assert_eq!(catalog.resolve_item("shirt1"), Some(Category::Top));
    assert_eq!(catalog.resolve_item("boots"), Some(Category::Shoes));
    assert_eq!(catalog.resolve_item("ghost"), None);
    assert_eq!(catalog.len(), 2);
}

#[test]
fn loads_from_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.json");
    std::fs::write(
        &path,
        r#"[{"id": "hat", "category": "ACCESSORIES", "imageRef": "hat.png"}]"#,
    )
    .unwrap();

    let catalog = InMemoryCatalog::from_json_file(&path).unwrap();
    assert_eq!(catalog.resolve_item("hat"), Some(Category::Accessories));
    assert_eq!(catalog.len(), 1);
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(InMemoryCatalog::from_json_file(&dir.path().join("nope.json")).is_err());
}

#[test]
fn insert_replaces_by_id() {
    let mut catalog = InMemoryCatalog::default();
    assert!(catalog.is_empty());
    catalog.insert(CatalogItem {
        id: "x".to_string(),
        category: Category::Top,
    });
    catalog.insert(CatalogItem {
        id: "x".to_string(),
        category: Category::Bottom,
    });
    assert_eq!(catalog.resolve_item("x"), Some(Category::Bottom));
}
