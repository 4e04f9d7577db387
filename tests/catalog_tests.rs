use std::collections::BTreeMap;

use mosaic::{
    CatalogError, CatalogModel, CatalogStore, Guardrail, KnowledgeSource, ListOptions, McpServer,
    OrderField, ParseMode, PropertyValue, Skill, SortOrder, StoreConfig,
};

fn store() -> CatalogStore {
    CatalogStore::open_in_memory().unwrap()
}

fn server(name: &str, transport: &str, status: &str, tools: i64, source: &str) -> McpServer {
    let mut s = McpServer::new(name);
    s.transport = Some(transport.to_string());
    s.status = Some(status.to_string());
    s.tool_count = Some(tools);
    s.source_id = Some(source.to_string());
    s
}

#[test]
fn test_save_and_get_round_trip() {
    let store = store();
    let repo = store.repository::<McpServer>();

    let mut original = server("filesystem", "stdio", "active", 12, "registry-a");
    original.url = Some("stdio://filesystem".to_string());
    original.external_id = Some("srv-001".to_string());

    let saved = repo.save(&original).unwrap();
    assert!(saved.id.is_some());
    assert!(saved.create_time_since_epoch > 0);

    let fetched = repo.get_by_name("filesystem").unwrap();
    assert_eq!(fetched.id, saved.id);
    assert_eq!(fetched.transport.as_deref(), Some("stdio"));
    assert_eq!(fetched.tool_count, Some(12));
    assert_eq!(fetched.external_id.as_deref(), Some("srv-001"));
}

#[test]
fn test_get_by_name_missing_is_not_found() {
    let store = store();
    let repo = store.repository::<Skill>();
    let err = repo.get_by_name("nope").unwrap_err();
    assert!(matches!(err, CatalogError::NotFound { .. }), "{err:?}");
}

#[test]
fn test_upsert_by_name_preserves_create_time() {
    let store = store();
    let repo = store.repository::<McpServer>();

    let first = repo
        .save(&server("github", "sse", "active", 8, "registry-a"))
        .unwrap();
    // Same name, no id: becomes an update, never a duplicate.
    let mut again = server("github", "sse", "active", 9, "registry-a");
    again.external_id = Some("srv-gh".to_string());
    let second = repo.save(&again).unwrap();

    assert_eq!(second.id, first.id);
    assert_eq!(
        second.create_time_since_epoch,
        first.create_time_since_epoch
    );
    assert_eq!(second.tool_count, Some(9));
    assert_eq!(second.external_id.as_deref(), Some("srv-gh"));
    assert_eq!(repo.count_by_source(None).unwrap(), 1);
}

#[test]
fn test_save_with_unknown_id_is_not_found() {
    let store = store();
    let repo = store.repository::<McpServer>();
    let mut s = server("ghost", "stdio", "active", 1, "registry-a");
    s.id = Some(9999);
    let err = repo.save(&s).unwrap_err();
    assert!(matches!(err, CatalogError::NotFound { .. }), "{err:?}");
}

#[test]
fn test_save_with_id_renames() {
    let store = store();
    let repo = store.repository::<McpServer>();
    let saved = repo
        .save(&server("old-name", "stdio", "active", 3, "registry-a"))
        .unwrap();

    let mut renamed = saved.clone();
    renamed.name = "new-name".to_string();
    let updated = repo.save(&renamed).unwrap();

    assert_eq!(updated.id, saved.id);
    assert_eq!(updated.name, "new-name");
    assert!(matches!(
        repo.get_by_name("old-name").unwrap_err(),
        CatalogError::NotFound { .. }
    ));
}

#[test]
fn test_filter_equality_is_exact_and_case_insensitive() {
    let store = store();
    let repo = store.repository::<McpServer>();
    repo.save(&server("a", "stdio", "alpha", 1, "s")).unwrap();
    repo.save(&server("b", "stdio", "alphabet", 1, "s")).unwrap();
    repo.save(&server("c", "stdio", "ALPHA", 1, "s")).unwrap();

    let page = repo
        .list(&ListOptions::with_filter("status = 'alpha'"))
        .unwrap();
    let names: Vec<_> = page.items.iter().map(|s| s.name.as_str()).collect();
    // Equality never matches the longer value, but ignores case.
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"a") && names.contains(&"c"));
}

#[test]
fn test_filter_name_like() {
    let store = store();
    let repo = store.repository::<CatalogModel>();
    repo.save(&CatalogModel::new("phi-4")).unwrap();
    repo.save(&CatalogModel::new("sophia")).unwrap();
    repo.save(&CatalogModel::new("llama")).unwrap();

    let page = repo
        .list(&ListOptions::with_filter("name LIKE '%ph%'"))
        .unwrap();
    assert_eq!(page.items.len(), 2);
}

#[test]
fn test_filter_and_combines_property_clauses() {
    let store = store();
    let repo = store.repository::<McpServer>();
    repo.save(&server("a", "stdio", "active", 20, "s")).unwrap();
    repo.save(&server("b", "stdio", "active", 5, "s")).unwrap();
    repo.save(&server("c", "sse", "active", 30, "s")).unwrap();

    let page = repo
        .list(&ListOptions::with_filter(
            "transport = 'stdio' AND toolCount >= 10",
        ))
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name, "a");
}

#[test]
fn test_filter_in_list() {
    let store = store();
    let repo = store.repository::<McpServer>();
    repo.save(&server("a", "stdio", "active", 1, "s")).unwrap();
    repo.save(&server("b", "sse", "active", 1, "s")).unwrap();
    repo.save(&server("c", "http", "active", 1, "s")).unwrap();

    let page = repo
        .list(&ListOptions::with_filter("transport IN ('stdio', 'sse')"))
        .unwrap();
    assert_eq!(page.items.len(), 2);
}

#[test]
fn test_filter_double_and_bool_properties() {
    let store = store();
    let repo = store.repository::<Guardrail>();
    let mut strict = Guardrail::new("pii");
    strict.threshold = Some(0.9);
    strict.blocking = Some(true);
    repo.save(&strict).unwrap();
    let mut lax = Guardrail::new("tone");
    lax.threshold = Some(0.3);
    lax.blocking = Some(false);
    repo.save(&lax).unwrap();

    let page = repo
        .list(&ListOptions::with_filter("threshold >= 0.5 AND blocking = true"))
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name, "pii");
}

#[test]
fn test_ordering_operator_on_string_field_is_an_error() {
    let store = store();
    let repo = store.repository::<McpServer>();
    let err = repo
        .list(&ListOptions::with_filter("status > 'active'"))
        .unwrap_err();
    assert!(matches!(err, CatalogError::Compile(_)), "{err:?}");
}

#[test]
fn test_strict_mode_rejects_malformed_clause() {
    let store = store();
    let repo = store.repository::<McpServer>();
    let err = repo
        .list(&ListOptions::with_filter("garbage AND status = 'active'"))
        .unwrap_err();
    assert!(matches!(err, CatalogError::Parse(_)), "{err:?}");
}

#[test]
fn test_lenient_mode_drops_malformed_clause() {
    let config = StoreConfig {
        parse_mode: ParseMode::Lenient,
        ..StoreConfig::default()
    };
    let store = CatalogStore::open_in_memory_with(config).unwrap();
    let repo = store.repository::<McpServer>();
    repo.save(&server("a", "stdio", "active", 1, "s")).unwrap();
    repo.save(&server("b", "stdio", "retired", 1, "s")).unwrap();

    let page = repo
        .list(&ListOptions::with_filter("garbage AND status = 'active'"))
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name, "a");
}

#[test]
fn test_unknown_filter_field_matches_custom_property() {
    let store = store();
    let repo = store.repository::<CatalogModel>();
    let mut model = CatalogModel::new("phi-4");
    model
        .custom_properties
        .insert("team".to_string(), PropertyValue::Str("search".to_string()));
    repo.save(&model).unwrap();
    repo.save(&CatalogModel::new("llama")).unwrap();

    let page = repo
        .list(&ListOptions::with_filter("team = 'search'"))
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name, "phi-4");
}

#[test]
fn test_custom_property_types_survive_storage() {
    let store = store();
    let repo = store.repository::<Skill>();
    let mut skill = Skill::new("summarize");
    let mut props = BTreeMap::new();
    props.insert("max_tokens".to_string(), PropertyValue::Int(2048));
    props.insert("temperature".to_string(), PropertyValue::Double(0.2));
    props.insert("streaming".to_string(), PropertyValue::Bool(true));
    props.insert("owner".to_string(), PropertyValue::Str("docs".to_string()));
    skill.custom_properties = props.clone();

    repo.save(&skill).unwrap();
    let fetched = repo.get_by_name("summarize").unwrap();
    assert_eq!(fetched.custom_properties, props);
}

#[test]
fn test_list_query_matches_name_substring() {
    let store = store();
    let repo = store.repository::<KnowledgeSource>();
    repo.save(&KnowledgeSource::new("runbooks")).unwrap();
    repo.save(&KnowledgeSource::new("design-docs")).unwrap();

    let options = ListOptions {
        query: Some("RUN".to_string()),
        ..ListOptions::default()
    };
    let page = repo.list(&options).unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name, "runbooks");
}

#[test]
fn test_list_by_source_set() {
    let store = store();
    let repo = store.repository::<McpServer>();
    repo.save(&server("a", "stdio", "active", 1, "registry-a")).unwrap();
    repo.save(&server("b", "stdio", "active", 1, "registry-b")).unwrap();
    repo.save(&server("c", "stdio", "active", 1, "registry-c")).unwrap();

    let options = ListOptions {
        source_ids: Some(vec!["registry-a".to_string(), "registry-c".to_string()]),
        order_by: OrderField::Name,
        sort_order: SortOrder::Asc,
        ..ListOptions::default()
    };
    let page = repo.list(&options).unwrap();
    let names: Vec<_> = page.items.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["a", "c"]);
}

#[test]
fn test_kind_extras_filter() {
    let store = store();
    let repo = store.repository::<McpServer>();
    repo.save(&server("a", "stdio", "active", 1, "s")).unwrap();
    repo.save(&server("b", "sse", "active", 1, "s")).unwrap();

    let mut options = ListOptions::default();
    options
        .extras
        .insert("transport".to_string(), "SSE".to_string());
    let page = repo.list(&options).unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name, "b");
}

#[test]
fn test_pagination_walks_all_items_once() {
    let store = store();
    let repo = store.repository::<CatalogModel>();
    for i in 0..5 {
        repo.save(&CatalogModel::new(format!("model-{i}"))).unwrap();
    }

    let mut seen = Vec::new();
    let mut token = None;
    loop {
        let options = ListOptions {
            order_by: OrderField::Name,
            sort_order: SortOrder::Asc,
            page_size: Some(2),
            page_token: token.clone(),
            ..ListOptions::default()
        };
        let page = repo.list(&options).unwrap();
        seen.extend(page.items.into_iter().map(|m| m.name));
        match page.next_page_token {
            Some(next) => token = Some(next),
            None => break,
        }
    }
    assert_eq!(
        seen,
        vec!["model-0", "model-1", "model-2", "model-3", "model-4"]
    );
}

#[test]
fn test_zero_page_size_bounds_do_not_break_listing() {
    // A config with zeroed bounds can arrive through deserialization.
    let config: StoreConfig =
        serde_json::from_str(r#"{"max_page_size": 0, "default_page_size": 0}"#).unwrap();
    let store = CatalogStore::open_in_memory_with(config).unwrap();
    let repo = store.repository::<CatalogModel>();
    repo.save(&CatalogModel::new("only")).unwrap();

    let page = repo.list(&ListOptions::default()).unwrap();
    assert_eq!(page.items.len(), 1);
}

#[test]
fn test_like_underscore_matches_literally() {
    let store = store();
    let repo = store.repository::<CatalogModel>();
    repo.save(&CatalogModel::new("a_b")).unwrap();
    repo.save(&CatalogModel::new("axb")).unwrap();

    let page = repo
        .list(&ListOptions::with_filter("name LIKE 'a_b'"))
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name, "a_b");

    let options = ListOptions {
        query: Some("a_b".to_string()),
        ..ListOptions::default()
    };
    let page = repo.list(&options).unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name, "a_b");
}

#[test]
fn test_bad_page_token_is_an_error() {
    let store = store();
    let repo = store.repository::<CatalogModel>();
    let options = ListOptions {
        page_token: Some("not-a-token".to_string()),
        ..ListOptions::default()
    };
    let err = repo.list(&options).unwrap_err();
    assert!(matches!(err, CatalogError::PageToken(_)), "{err:?}");
}

#[test]
fn test_kinds_do_not_see_each_other() {
    let store = store();
    store
        .repository::<CatalogModel>()
        .save(&CatalogModel::new("shared-name"))
        .unwrap();
    store
        .repository::<Skill>()
        .save(&Skill::new("shared-name"))
        .unwrap();

    let models = store.repository::<CatalogModel>().list(&ListOptions::default()).unwrap();
    let skills = store.repository::<Skill>().list(&ListOptions::default()).unwrap();
    assert_eq!(models.items.len(), 1);
    assert_eq!(skills.items.len(), 1);

    // Same name resolves independently per kind.
    assert!(store.repository::<Guardrail>().get_by_name("shared-name").is_err());
}

#[test]
fn test_delete_by_source_and_source_listing() {
    let store = store();
    let repo = store.repository::<McpServer>();
    repo.save(&server("a", "stdio", "active", 1, "registry-a")).unwrap();
    repo.save(&server("b", "stdio", "active", 1, "registry-a")).unwrap();
    repo.save(&server("c", "stdio", "active", 1, "registry-b")).unwrap();

    assert_eq!(
        repo.get_distinct_source_ids().unwrap(),
        vec!["registry-a", "registry-b"]
    );
    assert_eq!(repo.count_by_source(Some("registry-a")).unwrap(), 2);

    let deleted = repo.delete_by_source("registry-a").unwrap();
    assert_eq!(deleted, 2);
    assert_eq!(repo.count_by_source(None).unwrap(), 1);
    assert_eq!(repo.get_distinct_source_ids().unwrap(), vec!["registry-b"]);

    // Property rows went with their entities.
    let orphans: i64 = store
        .repository::<McpServer>()
        .list(&ListOptions::default())
        .unwrap()
        .items
        .len() as i64;
    assert_eq!(orphans, 1);
}

#[test]
fn test_file_backed_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig {
        path: dir.path().join("catalog.db"),
        ..StoreConfig::default()
    };

    {
        let store = CatalogStore::open(config.clone()).unwrap();
        store
            .repository::<McpServer>()
            .save(&server("filesystem", "stdio", "active", 12, "registry-a"))
            .unwrap();
    }

    let store = CatalogStore::open(config).unwrap();
    let fetched = store
        .repository::<McpServer>()
        .get_by_name("filesystem")
        .unwrap();
    assert_eq!(fetched.tool_count, Some(12));
}
