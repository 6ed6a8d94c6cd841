use mdxkit::{
    ContentWalker, HtmlToMarkdown, MdxkitError, NormalizeOptions, Normalizer, Rebrand, RuleSet,
    WriteMode, check_tree, split_front_matter,
};
use std::fs;
use std::path::Path;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn scraped_tree() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    write(
        root,
        "en/help-center/642-scheduling-posts.mdx",
        "---\ntitle: \"Scheduling posts\"\ndescription: \"Queue basics\"\n---\n\n<article><h2>Queue</h2><p>Open Buffer &amp; pick a slot.</p><ul><li>Pick</li><li>Schedule</li></ul></article>",
    );
    write(
        root,
        "en/help-center/588-character-limits.mdx",
        "---\ntitle: \"Character limits\"\n---\n\n<table><tr><th>Network</th><th>Limit</th></tr><tr><td>X</td><td>280</td></tr></table>",
    );
    write(
        root,
        "en/help-center/already-markdown.mdx",
        "---\ntitle: \"Done\"\n---\n\n## Done\n\nNothing to do.\n",
    );
    write(root, "en/help-center/broken.mdx", "<p>no front matter</p>");
    write(
        root,
        "en/help-center/node_modules/vendored.mdx",
        "---\ntitle: \"Vendored\"\n---\n\n<p>untouched</p>",
    );
    dir
}

#[test]
fn convert_tree_rewrites_only_html_documents() {
    let dir = scraped_tree();
    let root = dir.path().join("en/help-center");

    let report = ContentWalker::new(&root)
        .walk(&HtmlToMarkdown::default(), WriteMode::Write)
        .unwrap();

    assert_eq!(report.examined, 4);
    assert_eq!(report.changed.len(), 2);
    assert!(report.changed.len() <= report.examined);
    assert_eq!(report.skipped.len(), 1);

    let scheduling = fs::read_to_string(root.join("642-scheduling-posts.mdx")).unwrap();
    assert_eq!(
        scheduling,
        "---\ntitle: \"Scheduling posts\"\ndescription: \"Queue basics\"\n---\n\n## Queue\n\nOpen Buffer & pick a slot.\n\n- Pick\n- Schedule\n"
    );

    let limits = fs::read_to_string(root.join("588-character-limits.mdx")).unwrap();
    let body = split_front_matter(&limits).unwrap().body;
    assert!(body.starts_with("| Network | Limit |"), "{body}");

    assert_eq!(
        fs::read_to_string(root.join("node_modules/vendored.mdx")).unwrap(),
        "---\ntitle: \"Vendored\"\n---\n\n<p>untouched</p>"
    );
}

#[test]
fn second_conversion_changes_nothing() {
    let dir = scraped_tree();
    let root = dir.path().join("en/help-center");
    let walker = ContentWalker::new(&root);

    walker.walk(&HtmlToMarkdown::default(), WriteMode::Write).unwrap();
    let again = walker.walk(&HtmlToMarkdown::default(), WriteMode::Write).unwrap();

    assert!(again.changed.is_empty());
}

#[test]
fn dry_run_reports_changes_without_writing() {
    let dir = scraped_tree();
    let root = dir.path().join("en/help-center");
    let before = fs::read_to_string(root.join("642-scheduling-posts.mdx")).unwrap();

    let report = ContentWalker::new(&root)
        .walk(&HtmlToMarkdown::default(), WriteMode::DryRun)
        .unwrap();

    assert_eq!(report.changed.len(), 2);
    assert_eq!(
        fs::read_to_string(root.join("642-scheduling-posts.mdx")).unwrap(),
        before
    );
}

#[test]
fn missing_root_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let err = ContentWalker::new(dir.path().join("en/help-center"))
        .walk(&HtmlToMarkdown::default(), WriteMode::Write)
        .unwrap_err();
    assert!(matches!(err, MdxkitError::MissingRoot(_)));
}

#[test]
fn residual_check_follows_conversion() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(
        root,
        "page.mdx",
        "---\ntitle: \"Nested\"\n---\n\n<p>Click <a href=\"/x\"><strong>here</strong></a></p>",
    );

    ContentWalker::new(root)
        .walk(&HtmlToMarkdown::default(), WriteMode::Write)
        .unwrap();
    let reports = check_tree(&ContentWalker::new(root)).unwrap();
    assert_eq!(reports.len(), 1);

    let stripping = HtmlToMarkdown::new(Normalizer::with_options(NormalizeOptions {
        strip_residual_tags: true,
    }));
    ContentWalker::new(root)
        .walk(&stripping, WriteMode::Write)
        .unwrap();
    assert!(check_tree(&ContentWalker::new(root)).unwrap().is_empty());
}

#[test]
fn rebrand_walks_markdown_and_json() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "docs.json", "{\"name\": \"Mintlify Starter\"}");
    write(root, "en/index.mdx", "---\ntitle: \"Mintlify docs\"\n---\n\nEmail hi@mintlify.com\n");
    write(root, "README.md", "Mintlify");
    write(root, "notes.txt", "Mintlify");

    let rules = RuleSet::from_yaml_str(
        "rules:\n  - from: hi@mintlify.com\n    to: support@aitoearn.ai\n  - from: Mintlify\n    to: Aitoearn\n",
    )
    .unwrap();
    let report = ContentWalker::new(root)
        .with_extensions(["md", "mdx", "json"])
        .walk(&Rebrand::new(rules), WriteMode::Write)
        .unwrap();

    assert_eq!(report.changed.len(), 3);
    assert_eq!(
        fs::read_to_string(root.join("en/index.mdx")).unwrap(),
        "---\ntitle: \"Aitoearn docs\"\n---\n\nEmail support@aitoearn.ai\n"
    );
    assert_eq!(fs::read_to_string(root.join("notes.txt")).unwrap(), "Mintlify");
}
