//! Hermetic sandbox for running the CLI in tests.
//! - Private `HOME` and `XDG_CONFIG_HOME`, so no user config file leaks in
//! - Colors disabled, `RUST_LOG` cleared
//! - Files written relative to a temp root, used as the default cwd
//!
//! Everything lives under an `assert_fs::TempDir` and is cleaned up on drop.
//!
//! ## Quick example
//! ```no_run
//! use rescalc_test_utils::sandbox::Sandbox;
//!
//! let mut sb = Sandbox::new();
//! sb.write("rescalc.toml", "target = 470");
//! let stdout = sb.run("rescalc", ["find"], None).unwrap();
//! println!("{stdout}");
//! ```

use assert_fs::fixture::PathChild;
use assert_fs::TempDir;
use duct::Expression;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Output;

pub struct Sandbox {
    root: TempDir,
    pub home: PathBuf,
    pub config_home: PathBuf,
    default_cwd: PathBuf,
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Sandbox {
    /// Create a new sandbox; all state is under an auto-cleaned TempDir.
    pub fn new() -> Self {
        let root = TempDir::new().expect("create sandbox TempDir");
        let home = root.child("home").to_path_buf();
        let config_home = home.join(".config");
        let default_cwd = root.child("work").to_path_buf();

        fs::create_dir_all(&config_home).expect("create config dir");
        fs::create_dir_all(&default_cwd).expect("create work dir");

        Self {
            root,
            home,
            config_home,
            default_cwd,
        }
    }

    /// Get the current default working directory for commands.
    pub fn default_cwd(&self) -> &Path {
        &self.default_cwd
    }

    /// Set the default working directory for commands. Path is relative to sandbox root if not absolute.
    pub fn set_default_cwd<P: AsRef<Path>>(&mut self, cwd: P) -> &mut Self {
        let cwd = cwd.as_ref();
        self.default_cwd = if cwd.is_absolute() {
            cwd.to_path_buf()
        } else {
            self.root_path().join(cwd)
        };
        fs::create_dir_all(&self.default_cwd).expect("create cwd");
        self
    }

    /// Absolute path to the sandbox root.
    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    /// Write/overwrite a file relative to the default working directory.
    pub fn write<P: AsRef<Path>, S: AsRef<[u8]>>(&mut self, rel: P, contents: S) -> &mut Self {
        let p = self.default_cwd.join(rel);
        if let Some(parent) = p.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(p, contents).expect("write file");
        self
    }

    /// Write the per-user config file that `rescalc` falls back to.
    pub fn write_user_config<S: AsRef<[u8]>>(&mut self, contents: S) -> &mut Self {
        let dir = self.config_home.join("rescalc");
        fs::create_dir_all(&dir).expect("create user config dir");
        fs::write(dir.join("rescalc.toml"), contents).expect("write user config");
        self
    }

    /// Build a `duct::Expression` for a cargo binary, pre-wired with the
    /// sandbox env and default cwd.
    pub fn cmd<I>(&self, program: &str, args: I) -> Expression
    where
        I: IntoIterator,
        I::Item: AsRef<OsStr>,
    {
        let cargo_bin_path = assert_cmd::cargo::cargo_bin(program)
            .to_string_lossy()
            .to_string();
        let args: Vec<_> = args
            .into_iter()
            .map(|arg| arg.as_ref().to_string_lossy().to_string())
            .collect();
        let expr = duct::cmd(&cargo_bin_path, args).dir(&self.default_cwd);
        self.inject_env(expr)
    }

    /// Run a cargo binary inside this sandbox and return stdout as String.
    /// Errors if the process exits with non-zero status.
    pub fn run<I>(&self, program: &str, args: I, cwd: Option<&Path>) -> Result<String, String>
    where
        I: IntoIterator,
        I::Item: AsRef<OsStr>,
    {
        let mut expr = self.cmd(program, args);
        if let Some(dir) = cwd {
            let working_dir = if dir.is_absolute() {
                dir.to_path_buf()
            } else {
                self.root_path().join(dir)
            };
            expr = expr.dir(working_dir);
        }

        expr.read().map_err(|e| format!("command failed: {e}"))
    }

    /// Run a cargo binary and capture its full output whatever the exit status.
    pub fn output<I>(&self, program: &str, args: I) -> Output
    where
        I: IntoIterator,
        I::Item: AsRef<OsStr>,
    {
        self.cmd(program, args)
            .stdout_capture()
            .stderr_capture()
            .unchecked()
            .run()
            .expect("spawn command")
    }

    pub fn inject_env(&self, mut expr: Expression) -> Expression {
        let mut env_map: HashMap<String, String> = HashMap::new();
        if let Ok(path) = std::env::var("PATH") {
            env_map.insert("PATH".into(), path);
        }
        env_map.insert("HOME".into(), self.home.to_string_lossy().into_owned());
        env_map.insert(
            "XDG_CONFIG_HOME".into(),
            self.config_home.to_string_lossy().into_owned(),
        );
        env_map.insert("NO_COLOR".into(), "1".into());
        env_map.insert("CLICOLOR".into(), "0".into());

        expr = expr.full_env(&env_map);
        expr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_relative_to_cwd() {
        let mut sb = Sandbox::new();
        sb.write("nested/rescalc.toml", "target = 1");
        assert!(sb.default_cwd().join("nested/rescalc.toml").is_file());

        sb.set_default_cwd("other");
        assert_eq!(sb.default_cwd(), sb.root_path().join("other"));
        assert!(sb.default_cwd().is_dir());
    }

    #[test]
    fn test_user_config_location() {
        let mut sb = Sandbox::new();
        sb.write_user_config("limit = 1");
        let path = sb.config_home.join("rescalc/rescalc.toml");
        assert_eq!(fs::read_to_string(path).unwrap(), "limit = 1");
    }
}
