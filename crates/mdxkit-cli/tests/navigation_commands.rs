use assert_cmd::Command;
use predicates::str::contains;
use serde_json::{Value, json};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_mdxkit"))
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn workspace(groups: Value) -> TempDir {
    let temp = TempDir::new().unwrap();
    let manifest = json!({
        "name": "Help",
        "navigation": { "languages": [ { "language": "en", "groups": groups } ] }
    });
    write(
        temp.path(),
        "docs.json",
        &serde_json::to_string_pretty(&manifest).unwrap(),
    );
    write(temp.path(), "en/index.mdx", "---\ntitle: \"Home\"\n---\n");
    temp
}

fn manifest(root: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(root.join("docs.json")).unwrap()).unwrap()
}

#[test]
fn nav_prune_drops_dangling_pages() -> Result<(), Box<dyn std::error::Error>> {
    let temp = workspace(json!([
        { "group": "Home", "pages": ["en/index", "en/gone"] },
        { "group": "Old", "pages": ["en/old/one"] }
    ]));

    let mut cmd = cli();
    cmd.current_dir(temp.path()).args(["nav", "prune"]);

    cmd.assert()
        .success()
        .stdout(contains("Removed 2 page(s) and 1 group(s)"))
        .stdout(contains("en/gone"));

    let groups = &manifest(temp.path())["navigation"]["languages"][0]["groups"];
    assert_eq!(groups, &json!([{ "group": "Home", "pages": ["en/index"] }]));
    Ok(())
}

#[test]
fn nav_prune_dry_run_keeps_manifest() -> Result<(), Box<dyn std::error::Error>> {
    let temp = workspace(json!([{ "group": "Home", "pages": ["en/index", "en/gone"] }]));
    let before = fs::read_to_string(temp.path().join("docs.json"))?;

    let mut cmd = cli();
    cmd.current_dir(temp.path())
        .args(["nav", "prune", "--dry-run"]);

    cmd.assert()
        .success()
        .stdout(contains("Would remove 1 page(s)"));

    assert_eq!(fs::read_to_string(temp.path().join("docs.json"))?, before);
    Ok(())
}

#[test]
fn nav_without_manifest_is_usage_error() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;

    let mut cmd = cli();
    cmd.args(["--workspace", temp.path().to_str().unwrap(), "nav", "prune"]);

    cmd.assert()
        .failure()
        .code(64)
        .stderr(contains("no docs.json found"));
    Ok(())
}

#[test]
fn nav_sync_group_lists_directory() -> Result<(), Box<dyn std::error::Error>> {
    let temp = workspace(json!([{ "group": "Home", "pages": ["en/index"] }]));
    write(temp.path(), "en/help-center/publishing/b-post.mdx", "");
    write(temp.path(), "en/help-center/publishing/a-post.mdx", "");
    write(temp.path(), "en/help-center/publishing/index.mdx", "");

    let mut cmd = cli();
    cmd.current_dir(temp.path()).args([
        "nav",
        "sync-group",
        "--group",
        "Publishing",
        "--dir",
        "en/help-center/publishing",
    ]);

    cmd.assert()
        .success()
        .stdout(contains("Appended group 'Publishing' (en) with 2 page(s)"));

    let groups = &manifest(temp.path())["navigation"]["languages"][0]["groups"];
    assert_eq!(
        groups[1],
        json!({
            "group": "Publishing",
            "pages": [
                "en/help-center/publishing/a-post",
                "en/help-center/publishing/b-post"
            ]
        })
    );
    Ok(())
}

#[test]
fn nav_sync_group_empty_directory_is_noinput() -> Result<(), Box<dyn std::error::Error>> {
    let temp = workspace(json!([]));

    let mut cmd = cli();
    cmd.current_dir(temp.path()).args([
        "nav",
        "sync-group",
        "--group",
        "Publishing",
        "--dir",
        "en/help-center/publishing",
    ]);

    cmd.assert().failure().code(66);
    Ok(())
}

#[test]
fn import_creates_documents_and_navigation() -> Result<(), Box<dyn std::error::Error>> {
    let temp = workspace(json!([{ "group": "Home", "pages": ["en/index"] }]));
    write(
        temp.path(),
        "articles.json",
        r#"{"articles": [
            {"title": "Scheduling posts", "slug": "642-scheduling-posts", "bodyMDX": "<p>Queue now</p>", "groupName": "Help Center"}
        ]}"#,
    );

    let mut cmd = cli();
    cmd.current_dir(temp.path())
        .args(["import", "articles.json", "--normalize"]);

    cmd.assert()
        .success()
        .stdout(contains("Imported 1 article(s)"));

    let document =
        fs::read_to_string(temp.path().join("en/help-center/642-scheduling-posts.mdx"))?;
    assert!(document.starts_with("---\ntitle: \"Scheduling posts\"\n"), "{document}");
    assert!(document.ends_with("---\n\nQueue now\n"), "{document}");

    let groups = &manifest(temp.path())["navigation"]["languages"][0]["groups"];
    assert_eq!(
        groups[1],
        json!({ "group": "Help Center", "pages": ["en/help-center/642-scheduling-posts"] })
    );
    Ok(())
}

#[test]
fn import_rejects_batch_without_articles() -> Result<(), Box<dyn std::error::Error>> {
    let temp = workspace(json!([]));
    write(temp.path(), "articles.json", r#"{"items": []}"#);

    let mut cmd = cli();
    cmd.current_dir(temp.path()).args(["import", "articles.json"]);

    cmd.assert()
        .failure()
        .code(65)
        .stderr(contains("invalid import batch"));
    Ok(())
}

#[test]
fn reorganize_moves_articles_and_rebuilds_groups() -> Result<(), Box<dyn std::error::Error>> {
    let temp = workspace(json!([
        { "group": "Home", "pages": ["en/index"] },
        { "group": "Help Center", "pages": ["en/help-center/642-scheduling-posts"] }
    ]));
    write(
        temp.path(),
        "en/help-center/642-scheduling-posts.mdx",
        "---\ntitle: \"Scheduling posts\"\n---\n\nQueue\n",
    );
    write(
        temp.path(),
        "plan.yaml",
        "legacy_group: Help Center\ncategories:\n  - name: Publishing\n    dir: publishing\n    articles: [642-scheduling-posts]\n",
    );

    let mut cmd = cli();
    cmd.current_dir(temp.path())
        .args(["reorganize", "--plan", "plan.yaml"]);

    cmd.assert()
        .success()
        .stdout(contains("en/help-center: 1 moved"))
        .stdout(contains("[INDEX] en/help-center/publishing/index.mdx"))
        .stdout(contains("[NAV] Appended group 'Publishing'"));

    let section = temp.path().join("en/help-center");
    assert!(section.join("publishing/642-scheduling-posts.mdx").is_file());
    assert!(!section.join("642-scheduling-posts.mdx").exists());
    let index = fs::read_to_string(section.join("publishing/index.mdx"))?;
    assert!(
        index.contains("[Scheduling posts](/en/help-center/publishing/642-scheduling-posts)"),
        "{index}"
    );

    let groups = &manifest(temp.path())["navigation"]["languages"][0]["groups"];
    assert_eq!(
        groups,
        &json!([
            { "group": "Home", "pages": ["en/index"] },
            {
                "group": "Publishing",
                "pages": [
                    "en/help-center/publishing",
                    "en/help-center/publishing/642-scheduling-posts"
                ]
            }
        ])
    );
    Ok(())
}

#[test]
fn reorganize_dry_run_touches_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let temp = workspace(json!([]));
    write(temp.path(), "en/help-center/a.mdx", "---\ntitle: \"A\"\n---\n");
    write(
        temp.path(),
        "plan.yaml",
        "categories:\n  - name: Publishing\n    dir: publishing\n    articles: [a]\n",
    );

    let mut cmd = cli();
    cmd.current_dir(temp.path())
        .args(["reorganize", "--plan", "plan.yaml", "--dry-run"]);

    cmd.assert()
        .success()
        .stdout(contains("Dry run: en/help-center: 1 moved"));

    assert!(temp.path().join("en/help-center/a.mdx").is_file());
    assert!(!temp.path().join("en/help-center/publishing").exists());
    Ok(())
}

#[test]
fn reorganize_rejects_unsafe_plan() -> Result<(), Box<dyn std::error::Error>> {
    let temp = workspace(json!([]));
    write(
        temp.path(),
        "plan.yaml",
        "categories:\n  - name: Escape\n    dir: ../outside\n    articles: []\n",
    );

    let mut cmd = cli();
    cmd.current_dir(temp.path())
        .args(["reorganize", "--plan", "plan.yaml"]);

    cmd.assert()
        .failure()
        .code(78)
        .stderr(contains("not a valid path segment"));
    Ok(())
}
