use crate::common::file::{FileSpec, write_file};
use crate::common::redirect_temp_dir;
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

pub const AUTHOR_NAME: &str = "fake_user";
pub const AUTHOR_EMAIL: &str = "fake_email@email.com";
pub const AUTHOR_DATE: &str = "1700000000 +0200";

/// An empty repository: just the metadata directory with `objects/`
#[fixture]
pub fn repository_dir() -> TempDir {
    redirect_temp_dir();
    let dir = TempDir::new().expect("Failed to create temp dir");
    std::fs::create_dir_all(dir.path().join(".git").join("objects"))
        .expect("Failed to create objects directory");

    dir
}

/// A repository with `1.txt`, `a/2.txt` and `a/b/3.txt` staged
#[fixture]
pub fn staged_repository_dir(repository_dir: TempDir) -> TempDir {
    write_file(FileSpec::new(
        repository_dir.path().join("1.txt"),
        "one".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("a").join("2.txt"),
        "two".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("a").join("b").join("3.txt"),
        "three".to_string(),
    ));

    run_bit_command(repository_dir.path(), &["update-index", "."])
        .assert()
        .success();

    repository_dir
}

pub fn run_bit_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("bit").expect("Failed to find bit binary");
    cmd.env_remove("GIT_DIR");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn bit_commit_tree(dir: &Path, tree: &str, message: &str, parent: Option<&str>) -> Command {
    let mut cmd = run_bit_command(dir, &["commit-tree", tree, "-m", message]);
    if let Some(parent) = parent {
        cmd.args(["-p", parent]);
    }
    cmd.envs(vec![
        ("GIT_AUTHOR_NAME", AUTHOR_NAME),
        ("GIT_AUTHOR_EMAIL", AUTHOR_EMAIL),
        ("GIT_AUTHOR_DATE", AUTHOR_DATE),
    ]);
    cmd
}

/// Run a bit command and return its trimmed stdout
pub fn bit_output(dir: &Path, args: &[&str]) -> Result<String, Box<dyn std::error::Error>> {
    let output = run_bit_command(dir, args).assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone())?;

    Ok(stdout.trim().to_string())
}
