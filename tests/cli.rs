use assert_cmd::Command;
use git_fault::git::test_utils::TmpRepo;
use predicates::prelude::*;

#[test]
fn test_cli_splits_pending_changes() {
    let tmp_repo = TmpRepo::new().unwrap();
    tmp_repo
        .commit_file_by_line("testfile", "hey\nthere\ngeneral kenobi")
        .unwrap();
    tmp_repo
        .write_file("testfile", "hey\nthere\nnew general\n kenobi")
        .unwrap();

    Command::cargo_bin("git-fault")
        .unwrap()
        .current_dir(tmp_repo.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("created 1 commit(s)"));
}

#[test]
fn test_cli_reports_clean_tree() {
    let tmp_repo = TmpRepo::new().unwrap();
    tmp_repo.commit_file_by_line("testfile", "hey\nthere").unwrap();

    Command::cargo_bin("git-fault")
        .unwrap()
        .current_dir(tmp_repo.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("no pending modifications"));
}
