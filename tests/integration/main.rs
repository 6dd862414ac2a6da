//! Integration tests for sandcache

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    /// Command isolated to a temp root and a config file that does not exist
    fn sandcache(temp: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("sandcache");
        cmd.env_remove("SANDCACHE_CONFIG")
            .env_remove("SANDCACHE_ROOT")
            .arg("--config")
            .arg(temp.path().join("config.toml"))
            .arg("--root")
            .arg(temp.path().join("cache"));
        cmd
    }

    fn stdout_of(cmd: &mut Command) -> String {
        let output = cmd.output().unwrap();
        assert!(output.status.success());
        String::from_utf8(output.stdout).unwrap().trim().to_string()
    }

    #[test]
    fn help_displays() {
        let temp = TempDir::new().unwrap();
        sandcache(&temp)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Content-addressed code cache"));
    }

    #[test]
    fn version_displays() {
        let temp = TempDir::new().unwrap();
        sandcache(&temp)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("sandcache"));
    }

    #[test]
    fn put_then_put_again_hits() {
        let temp = TempDir::new().unwrap();

        sandcache(&temp)
            .args(["put", "python", "--suffix", ".py"])
            .write_stdin("print('hello')")
            .assert()
            .success()
            .stderr(predicate::str::contains("miss"))
            .stdout(predicate::str::ends_with(".py\n"));

        sandcache(&temp)
            .args(["put", "python", "--suffix", ".py"])
            .write_stdin("print('hello')")
            .assert()
            .success()
            .stderr(predicate::str::contains("hit"));
    }

    #[test]
    fn put_writes_code_verbatim() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("main.cpp");
        fs::write(&source, "int main() { return 0; }\n").unwrap();

        let path = stdout_of(
            sandcache(&temp)
                .args(["put", "cpp", "--suffix", ".cpp", "--file"])
                .arg(&source),
        );

        assert_eq!(fs::read_to_string(path).unwrap(), "int main() { return 0; }\n");
    }

    #[test]
    fn key_matches_put_file_name() {
        let temp = TempDir::new().unwrap();

        let key = stdout_of(
            sandcache(&temp)
                .args(["key", "go", "--suffix", ".go"])
                .write_stdin("package main"),
        );
        assert_eq!(key.len(), 64);

        let path = stdout_of(
            sandcache(&temp)
                .args(["put", "go", "--suffix", ".go"])
                .write_stdin("package main"),
        );
        assert!(path.ends_with(&format!("{key}.go")));
    }

    #[test]
    fn lookup_missing_fails() {
        let temp = TempDir::new().unwrap();
        sandcache(&temp)
            .args(["lookup", "python", "--suffix", ".py"])
            .write_stdin("never cached")
            .assert()
            .failure()
            .stderr(predicate::str::contains("not cached"));
    }

    #[test]
    fn lookup_after_put_succeeds() {
        let temp = TempDir::new().unwrap();
        let stored = stdout_of(
            sandcache(&temp)
                .args(["put", "ruby", "--suffix", ".rb"])
                .write_stdin("puts 1"),
        );

        let found = stdout_of(
            sandcache(&temp)
                .args(["lookup", "ruby", "--suffix", ".rb"])
                .write_stdin("puts 1"),
        );
        assert_eq!(stored, found);
    }

    #[test]
    fn invalid_suffix_is_rejected() {
        let temp = TempDir::new().unwrap();
        sandcache(&temp)
            .args(["put", "python", "--suffix", "/../../x"])
            .write_stdin("x")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid file suffix"));
    }

    #[test]
    fn stats_json_counts_entries() {
        let temp = TempDir::new().unwrap();
        for code in ["a = 1", "b = 2"] {
            sandcache(&temp)
                .args(["put", "python", "--suffix", ".py"])
                .write_stdin(code)
                .assert()
                .success();
        }

        let out = stdout_of(sandcache(&temp).args(["stats", "--format", "json"]));
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["entry_count"], 2);
        assert_eq!(json["total_size_bytes"], 10);
        assert_eq!(json["status"], "ok");
    }

    #[test]
    fn list_empty() {
        let temp = TempDir::new().unwrap();
        sandcache(&temp)
            .arg("list")
            .assert()
            .success()
            .stdout(predicate::str::contains("No cached entries"));
    }

    #[test]
    fn clear_with_yes_empties_cache() {
        let temp = TempDir::new().unwrap();
        sandcache(&temp)
            .args(["put", "sh", "--suffix", ".sh"])
            .write_stdin("echo hi")
            .assert()
            .success();

        sandcache(&temp)
            .args(["clear", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("cleared 1 entry"));

        sandcache(&temp)
            .args(["stats", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::starts_with("0 0 "));
    }

    #[test]
    fn evict_within_limit() {
        let temp = TempDir::new().unwrap();
        sandcache(&temp)
            .arg("evict")
            .assert()
            .success()
            .stdout(predicate::str::contains("nothing evicted"));
    }

    #[test]
    fn disabled_cache_fails_with_hint() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("config.toml"), "[cache]\nenabled = false\n").unwrap();

        sandcache(&temp)
            .args(["put", "python"])
            .write_stdin("x")
            .assert()
            .failure()
            .stderr(predicate::str::contains("disabled"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn config_set_and_show() {
        let temp = TempDir::new().unwrap();
        sandcache(&temp)
            .args(["config", "set", "cache.ttl_secs", "600"])
            .assert()
            .success();

        sandcache(&temp)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("ttl_secs = 600"));
    }

    #[test]
    fn config_path() {
        let temp = TempDir::new().unwrap();
        sandcache(&temp)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }
}
