#[cfg(test)]
mod cli_help_tests {
    use assert_cmd::prelude::*;
    use predicates::prelude::*;
    use std::process::Command;
    use tempfile::TempDir;

    fn pb(config_dir: &TempDir) -> Command {
        let mut cmd = Command::cargo_bin("pb").unwrap();
        cmd.env("PB_CONFIG_DIR", config_dir.path());
        cmd
    }

    #[test]
    fn test_cli_help_output() {
        let dir = TempDir::new().unwrap();
        let assert_result = pb(&dir).arg("--help").assert().success();
        let output = assert_result.get_output();
        let help_output = String::from_utf8_lossy(&output.stdout);

        assert!(help_output.contains("Usage:"));
        assert!(help_output.contains("Commands:"));
        for group in ["context", "collections", "auth", "backup", "version"] {
            assert!(help_output.contains(group), "missing '{}' in help", group);
        }
        assert!(help_output.contains("-h, --help"));
        assert!(help_output.contains("-V, --version"));
    }

    #[test]
    fn test_cli_subcommand_help_outputs() {
        for subcommand in ["context", "collections", "auth", "backup"] {
            let dir = TempDir::new().unwrap();
            let assert_result = pb(&dir).arg(subcommand).arg("--help").assert().success();
            let output = assert_result.get_output();
            let help_output = String::from_utf8_lossy(&output.stdout);
            assert!(help_output.contains("Usage:"), "no usage for {}", subcommand);
        }
    }

    #[test]
    fn test_abbreviated_group_help() {
        let dir = TempDir::new().unwrap();
        pb(&dir)
            .args(["ba", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("restore"));
    }

    #[test]
    fn test_version_command() {
        let dir = TempDir::new().unwrap();
        pb(&dir)
            .arg("ver")
            .assert()
            .success()
            .stdout(predicate::str::starts_with(format!(
                "pb version {}",
                env!("CARGO_PKG_VERSION")
            )));
    }

    #[test]
    fn test_unknown_option_is_usage_error() {
        let dir = TempDir::new().unwrap();
        pb(&dir).args(["context", "list", "--bogus"]).assert().code(64);
    }
}
