use mdxkit::{
    CategoryPlan, ImportBatch, ImportOptions, NavigationManifest, WriteMode, apply_category_groups,
    category_groups, discover_workspace, import_articles, list_pages, move_articles,
    write_index_pages,
};
use serde_json::json;
use std::fs;

fn workspace() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    let manifest = json!({
        "$schema": "https://mintlify.com/docs.json",
        "name": "Help",
        "navigation": {
            "languages": [
                {
                    "language": "en",
                    "groups": [
                        { "group": "Home", "pages": ["en/index"] }
                    ]
                }
            ]
        },
        "footer": { "socials": {} }
    });
    fs::write(
        dir.path().join("docs.json"),
        serde_json::to_string_pretty(&manifest).unwrap(),
    )
    .unwrap();
    fs::create_dir_all(dir.path().join("en")).unwrap();
    fs::write(dir.path().join("en/index.mdx"), "---\ntitle: \"Home\"\n---\n").unwrap();
    dir
}

#[test]
fn import_reorganize_and_prune_round() {
    let dir = workspace();
    let ws = discover_workspace(dir.path().join("en")).unwrap();
    let root = ws.root();
    let mut manifest = NavigationManifest::load(ws.manifest_path()).unwrap();

    let batch = ImportBatch::from_json_str(
        r#"{"articles": [
            {"title": "Scheduling posts", "slug": "642-scheduling-posts", "bodyMDX": "<p>Queue</p>", "groupName": "Help Center"},
            {"title": "Daily limits", "slug": "646-daily-posting-limits", "bodyMDX": "<p>Limits</p>", "groupName": "Help Center"},
            {"title": "Metrics", "slug": "519-overview", "bodyMDX": "<p>Numbers</p>", "groupName": "Help Center"}
        ]}"#,
    )
    .unwrap();
    let imported = import_articles(
        root,
        &batch,
        &mut manifest,
        &ImportOptions {
            normalize: true,
            ..ImportOptions::default()
        },
    )
    .unwrap();
    assert_eq!(imported.len(), 3);
    assert_eq!(
        manifest.group("en", "Help Center").unwrap().page_refs().len(),
        3
    );

    let plan = CategoryPlan::from_yaml_str(
        r#"
legacy_group: Help Center
categories:
  - name: Publishing
    dir: publishing
    articles: [642-scheduling-posts, 646-daily-posting-limits]
  - name: Analytics
    dir: analytics
    articles: [519-overview]
"#,
    )
    .unwrap();
    let section = plan.section_dir(root);
    let moved = move_articles(&section, &plan, WriteMode::Write).unwrap();
    assert_eq!(moved.moved.len(), 3);
    let engine = plan.index_engine().unwrap();
    let indexes = write_index_pages(&section, &plan, &engine, WriteMode::Write).unwrap();
    assert_eq!(indexes.len(), 2);

    let groups = category_groups(root, &plan).unwrap();
    apply_category_groups(&mut manifest, &plan, groups).unwrap();
    assert_eq!(manifest.group_names("en"), vec!["Home", "Publishing", "Analytics"]);

    // Every reference resolves after reorganizing, so pruning is a no-op.
    let report = manifest.prune_missing(root, "mdx");
    assert!(report.is_empty(), "{report:?}");

    fs::remove_file(section.join("analytics/519-overview.mdx")).unwrap();
    fs::remove_file(section.join("analytics/index.mdx")).unwrap();
    let report = manifest.prune_missing(root, "mdx");
    assert_eq!(
        report.removed_pages,
        vec!["en/help-center/analytics", "en/help-center/analytics/519-overview"]
    );
    assert_eq!(report.removed_groups, vec!["Analytics"]);

    manifest.save(ws.manifest_path()).unwrap();
    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(ws.manifest_path()).unwrap()).unwrap();
    let keys: Vec<&String> = saved.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["$schema", "name", "navigation", "footer"]);
    assert_eq!(
        saved["navigation"]["languages"][0]["groups"][1]["pages"],
        json!([
            "en/help-center/publishing",
            "en/help-center/publishing/642-scheduling-posts",
            "en/help-center/publishing/646-daily-posting-limits"
        ])
    );
}

#[test]
fn sync_group_from_directory_listing() {
    let dir = workspace();
    let root = dir.path();
    fs::create_dir_all(root.join("en/guides")).unwrap();
    for name in ["b.mdx", "a.mdx", "index.mdx", "notes.txt"] {
        fs::write(root.join("en/guides").join(name), "---\ntitle: x\n---\n").unwrap();
    }

    let mut manifest = NavigationManifest::load(&root.join("docs.json")).unwrap();
    let pages = list_pages(root, "en/guides", "mdx", true).unwrap();
    manifest
        .replace_group("en", "Guides", pages.into_iter().map(Into::into).collect())
        .unwrap();

    assert_eq!(
        manifest.group("en", "Guides").unwrap().page_refs(),
        vec!["en/guides/a", "en/guides/b"]
    );
}
