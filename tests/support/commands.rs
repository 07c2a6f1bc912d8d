//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

impl Test {
    /// Create a vault2vault command with an isolated environment.
    ///
    /// Returns a Command configured with:
    /// - HOME and XDG_CONFIG_HOME pointing at the temporary home directory
    /// - Current directory set to the test project directory
    /// - Colors and inherited password settings disabled
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("vault2vault").expect("failed to find vault2vault binary");
        cmd.env("HOME", self.home.path());
        cmd.env("XDG_CONFIG_HOME", self.home.path().join(".config"));
        // Windows uses USERPROFILE instead of HOME for home directory
        cmd.env("USERPROFILE", self.home.path());
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("VAULT2VAULT_OLD_PASS_FILE");
        cmd.env_remove("VAULT2VAULT_NEW_PASS_FILE");
        cmd.env_remove("VAULT2VAULT_LOG");
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// A command with both password files already passed.
    pub fn rekey_cmd(&self) -> Command {
        let mut cmd = self.cmd();
        cmd.arg("--old-pass-file")
            .arg(self.old_pass())
            .arg("--new-pass-file")
            .arg(self.new_pass());
        cmd
    }

    /// Rekey the given paths with extra flags.
    pub fn rekey(&self, args: &[&str]) -> Output {
        self.rekey_cmd()
            .args(args)
            .output()
            .expect("failed to run vault2vault")
    }

    /// Rekey the whole project directory.
    pub fn rekey_all(&self) -> Output {
        self.rekey(&["."])
    }
}
