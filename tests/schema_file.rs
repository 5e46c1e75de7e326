use table_bridge::{load_from_path, resolve, Action};

#[tokio::test]
async fn demo_schema_resolves() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/schema.json");
    let config = load_from_path(path).await.unwrap();
    let registry = resolve(&config, "public").unwrap();

    assert_eq!(registry.tables(), ["auditEntry", "post", "postStats", "user"]);

    let post = registry.table("post").unwrap();
    assert_eq!(post.db_name, "posts");
    assert!(post.unique_keys.contains(&vec!["authorId".to_string(), "slug".to_string()]));
    assert!(post.exposed_fields().iter().all(|f| f.name != "searchVector"));

    let stats = registry.operations("postStats").unwrap();
    assert!(stats.contains(&Action::FindMany));
    assert!(!stats.contains(&Action::Create));

    let audit = registry.operations("auditEntry").unwrap();
    assert_eq!(audit.len(), 3);
}

#[tokio::test]
async fn missing_schema_file_is_a_load_error() {
    let err = load_from_path("/nonexistent/schema.json").await.unwrap_err();
    assert!(err.to_string().contains("/nonexistent/schema.json"));
}
