use assert_cmd::Command;
use assert_fs::{prelude::FileWriteStr, NamedTempFile};
use predicates::prelude::{predicate, PredicateBooleanExt};

fn check(
    input_flag: &str,
    content: &str,
    expected: &[&'static str],
) -> Result<(), Box<dyn std::error::Error>> {
    let file = NamedTempFile::new("input.txt")?;
    file.write_str(content)?;
    let mut cmd = Command::cargo_bin("escover")?;
    cmd.arg("check").arg(input_flag).arg(file.path());
    let mut assert = cmd.assert().success();
    for e in expected {
        assert = assert.stdout(predicate::str::contains(*e));
    }
    file.close().unwrap();
    Ok(())
}

#[test]
fn test_check_event_structure() -> Result<(), Box<dyn std::error::Error>> {
    check(
        "-e",
        "(1, Event(pred=(), icnf=()))\n(2, Event(pred=(1), icnf=()))\n(3, Event(pred=(1), icnf=(2)))\n",
        &[
            "3 event(s), including 2 leaf event(s)",
            "0 edge(s)",
            "is a cograph",
        ],
    )
}

#[test]
fn test_check_smt2() -> Result<(), Box<dyn std::error::Error>> {
    check(
        "-s",
        "(declare-const el1 Bool)\n(declare-const el2 Bool)\n(assert (or el1 el2))\n",
        &["2 leaf variable(s)", "2 node(s) and 1 edge(s)", "is a cograph"],
    )
}

#[test]
fn test_check_graph() -> Result<(), Box<dyn std::error::Error>> {
    check(
        "-g",
        "1 2 3 4\n1 2\n2 3\n3 4\n",
        &["4 node(s) and 3 edge(s)", "is not a cograph"],
    )
}

#[test]
fn test_check_dangling_reference() -> Result<(), Box<dyn std::error::Error>> {
    let file = NamedTempFile::new("input.txt")?;
    file.write_str("(1, Event(pred=(7), icnf=()))\n")?;
    let mut cmd = Command::cargo_bin("escover")?;
    cmd.arg("check").arg("-e").arg(file.path());
    cmd.assert().success().stdout(
        predicate::str::contains("event 7 is referenced but never defined")
            .and(predicate::str::contains("1 node(s) and 0 edge(s)")),
    );
    file.close().unwrap();
    Ok(())
}
