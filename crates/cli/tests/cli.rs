use assert_cmd::Command;

fn bookshelf(config_dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("bookshelf").unwrap();
    cmd.env("BOOKSHELF_CONFIG_DIR", config_dir)
        .env("BOOKSHELF_ENV", "local");
    cmd
}

#[test]
fn openapi_lists_book_endpoints() {
    let dir = tempfile::tempdir().unwrap();
    let output = bookshelf(dir.path()).arg("openapi").output().unwrap();
    assert!(output.status.success());

    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    for path in ["/books", "/books/{id}", "/books/", "/books/publish/", "/create-book"] {
        assert!(doc["paths"][path].is_object(), "missing {path}");
    }
}

#[test]
fn config_reflects_config_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("base.toml"), "[server]\nport = 9191\n").unwrap();

    let output = bookshelf(dir.path()).arg("config").output().unwrap();
    assert!(output.status.success());

    let settings: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(settings["server"]["port"], 9191);
    assert_eq!(settings["environment"], "local");
}

#[test]
fn unknown_environment_fails() {
    let dir = tempfile::tempdir().unwrap();
    bookshelf(dir.path())
        .env("BOOKSHELF_ENV", "qa")
        .arg("config")
        .assert()
        .failure();
}
