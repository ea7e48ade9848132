use assert_fs::TempDir;
use assert_fs::fixture::{FileWriteStr, PathChild};
use common::command::{
    AUTHOR_EMAIL, AUTHOR_NAME, bit_commit_tree, bit_output, repository_dir, run_bit_command,
    staged_repository_dir,
};
use fake::Fake;
use fake::faker::lorem::en::Words;
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;

const EMPTY_TREE: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";
const ROOT_TREE: &str = "88484bd9e7919fa9b7dfeb008fb8f6c85743d171";
const NESTED_TREE: &str = "202bc192d34beb85d0301ec8c8940cd0252cc48a";
const ROOT_COMMIT: &str = "653b63966762036dd79c2871b7238ad911f6e88d";
const SECOND_COMMIT: &str = "545535ab8a881b46e2149f80f5e211b45b91502e";

fn commit_output(
    dir: &std::path::Path,
    tree: &str,
    message: &str,
    parent: Option<&str>,
) -> Result<String, Box<dyn std::error::Error>> {
    let output = bit_commit_tree(dir, tree, message, parent).assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone())?;

    Ok(stdout.trim().to_string())
}

#[rstest]
fn write_tree_on_an_empty_index_writes_the_empty_tree(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    run_bit_command(repository_dir.path(), &["write-tree"])
        .assert()
        .success()
        .stdout(format!("{EMPTY_TREE}\n"));

    run_bit_command(repository_dir.path(), &["cat-file", "-t", EMPTY_TREE])
        .assert()
        .success()
        .stdout("tree\n");

    Ok(())
}

#[rstest]
fn write_tree_writes_one_tree_per_directory(
    staged_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let tree = bit_output(staged_repository_dir.path(), &["write-tree"])?;
    assert_eq!(tree, ROOT_TREE);

    let root = run_bit_command(staged_repository_dir.path(), &["cat-file", "-p", ROOT_TREE])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let mut expected = b"100644 1.txt\0".to_vec();
    expected.extend(hex::decode("43dd47ea691c90a5fa7827892c70241913351963")?);
    expected.extend(b"40000 a\0");
    expected.extend(hex::decode(NESTED_TREE)?);
    assert_eq!(root, expected);

    for subtree in [NESTED_TREE, "d864f7793fd2952c217c27d3780442f8943c8663"] {
        run_bit_command(staged_repository_dir.path(), &["cat-file", "-t", subtree])
            .assert()
            .success()
            .stdout("tree\n");
    }

    Ok(())
}

#[rstest]
fn write_tree_is_deterministic(
    staged_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let first = bit_output(staged_repository_dir.path(), &["write-tree"])?;
    let second = bit_output(staged_repository_dir.path(), &["write-tree"])?;

    assert_eq!(first, second);

    Ok(())
}

#[rstest]
fn commit_tree_writes_a_root_commit(
    staged_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let tree = bit_output(staged_repository_dir.path(), &["write-tree"])?;
    let commit = commit_output(staged_repository_dir.path(), &tree, "Initial commit", None)?;

    assert_eq!(commit, ROOT_COMMIT);

    let author = format!("{AUTHOR_NAME} <{AUTHOR_EMAIL}> 1700000000 +0200");
    run_bit_command(staged_repository_dir.path(), &["cat-file", "-p", &commit])
        .assert()
        .success()
        .stdout(format!(
            "tree {ROOT_TREE}\nauthor {author}\ncommitter {author}\n\nInitial commit\n"
        ));

    run_bit_command(staged_repository_dir.path(), &["cat-file", "-t", &commit])
        .assert()
        .success()
        .stdout("commit\n");

    Ok(())
}

#[rstest]
fn commit_tree_links_a_parent(
    staged_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    bit_output(staged_repository_dir.path(), &["write-tree"])?;
    let root = commit_output(staged_repository_dir.path(), ROOT_TREE, "Initial commit", None)?;
    let second = commit_output(
        staged_repository_dir.path(),
        ROOT_TREE,
        "Second commit",
        Some(&root),
    )?;

    assert_eq!(second, SECOND_COMMIT);

    run_bit_command(staged_repository_dir.path(), &["cat-file", "-p", &second])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(format!(
            "tree {ROOT_TREE}\nparent {ROOT_COMMIT}\nauthor "
        )));

    Ok(())
}

#[rstest]
fn commit_tree_trims_the_message(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    bit_output(repository_dir.path(), &["write-tree"])?;
    let message = Words(3..6).fake::<Vec<String>>().join(" ");
    let padded = format!("\n  {message}\n\n");

    let commit = commit_output(repository_dir.path(), EMPTY_TREE, &padded, None)?;

    run_bit_command(repository_dir.path(), &["cat-file", "-p", &commit])
        .assert()
        .success()
        .stdout(predicate::str::ends_with(format!("\n\n{message}\n")));

    Ok(())
}

#[rstest]
fn commit_tree_offsets_keep_their_sign(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    bit_output(repository_dir.path(), &["write-tree"])?;
    let output = run_bit_command(
        repository_dir.path(),
        &["commit-tree", EMPTY_TREE, "-m", "west"],
    )
    .envs(vec![
        ("GIT_AUTHOR_NAME", AUTHOR_NAME),
        ("GIT_AUTHOR_EMAIL", AUTHOR_EMAIL),
        ("GIT_AUTHOR_DATE", "2023-01-01 12:00:00 -0530"),
    ])
    .assert()
    .success()
    .get_output()
    .stdout
    .clone();
    let commit = String::from_utf8(output)?.trim().to_string();

    run_bit_command(repository_dir.path(), &["cat-file", "-p", &commit])
        .assert()
        .success()
        .stdout(predicate::str::contains("1672594200 -0530\n"));

    Ok(())
}

#[rstest]
fn commit_tree_requires_an_author(repository_dir: TempDir) {
    run_bit_command(repository_dir.path(), &["write-tree"])
        .assert()
        .success();

    run_bit_command(repository_dir.path(), &["commit-tree", EMPTY_TREE, "-m", "anonymous"])
        .env_remove("GIT_AUTHOR_NAME")
        .env_remove("GIT_AUTHOR_EMAIL")
        .assert()
        .failure()
        .stderr(predicate::str::contains("GIT_AUTHOR_NAME not set"));
}

#[rstest]
fn commit_tree_rejects_an_unparsable_date(repository_dir: TempDir) {
    run_bit_command(repository_dir.path(), &["write-tree"])
        .assert()
        .success();

    run_bit_command(repository_dir.path(), &["commit-tree", EMPTY_TREE, "-m", "when"])
        .envs(vec![
            ("GIT_AUTHOR_NAME", AUTHOR_NAME),
            ("GIT_AUTHOR_EMAIL", AUTHOR_EMAIL),
            ("GIT_AUTHOR_DATE", "last tuesday"),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GIT_AUTHOR_DATE"));
}

#[rstest]
fn commit_tree_resolves_abbreviated_ids(
    staged_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    bit_output(staged_repository_dir.path(), &["write-tree"])?;

    let root = commit_output(staged_repository_dir.path(), &ROOT_TREE[..7], "Initial commit", None)?;
    assert_eq!(root, ROOT_COMMIT);

    let second = commit_output(
        staged_repository_dir.path(),
        &ROOT_TREE[..10],
        "Second commit",
        Some(&ROOT_COMMIT[..8]),
    )?;
    assert_eq!(second, SECOND_COMMIT);

    Ok(())
}

#[rstest]
fn commit_tree_requires_the_tree_to_exist(repository_dir: TempDir) {
    bit_commit_tree(repository_dir.path(), EMPTY_TREE, "dangling", None)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Object not found"));

    assert!(!repository_dir.child(".git/objects/4b").path().exists());
}

#[rstest]
fn staging_more_files_changes_the_tree(
    staged_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    staged_repository_dir.child("a/b/4.txt").write_str("four")?;
    run_bit_command(staged_repository_dir.path(), &["update-index", "a/b/4.txt"])
        .assert()
        .success();

    let tree = bit_output(staged_repository_dir.path(), &["write-tree"])?;
    assert_ne!(tree, ROOT_TREE);

    let listed = bit_output(staged_repository_dir.path(), &["ls-files"])?;
    assert_eq!(listed, "1.txt\na/2.txt\na/b/3.txt\na/b/4.txt");

    Ok(())
}
