use assert_cmd::Command;
use assert_fs::{prelude::FileWriteStr, NamedTempFile};
use paste::paste;
use predicates::{
    prelude::{predicate, PredicateBooleanExt},
    BoxPredicate,
};

const EVENT_STRUCTURE: &str = r#"(1, Event(pred=(), icnf=(), label="init"))
(2, Event(pred=(1), icnf=()))
(3, Event(pred=(1), icnf=(2), pos=[0, {1}]))

(4, Event(pred=(1), icnf=()))
"#;

const SMT2: &str = r#"; two conflicting leaves
(set-logic QF_UF)
(declare-const e1 Bool)
(declare-const el2 Bool)
(declare-const el3 Bool)
(assert (=> el2 e1))
(assert (=> el3 (and e1 (not el2))))
(check-sat)
"#;

const GRAPH: &str = "10 20 30\n10 20\n20 30\n";

fn cover(
    input_flag: &str,
    file_name: &str,
    content: &str,
    additional_args: &[&str],
    possible_answers: &[&'static str],
) -> Result<(), Box<dyn std::error::Error>> {
    let file = NamedTempFile::new(file_name)?;
    file.write_str(content)?;
    let mut cmd = Command::cargo_bin("escover")?;
    cmd.arg("cover")
        .arg(input_flag)
        .arg(file.path())
        .arg("--print-tests")
        .arg("--logging-level")
        .arg("off")
        .args(additional_args);
    let mut pred: BoxPredicate<str> = BoxPredicate::new(predicate::never());
    for a in possible_answers {
        pred = BoxPredicate::new(pred.or(predicate::eq(*a)));
    }
    cmd.assert().success().stdout(pred);
    file.close().unwrap();
    Ok(())
}

macro_rules! test_for_method {
    ($method:ident, $args:expr) => {
        paste! {
            #[test]
            fn [<test_event_structure_ $method>]() -> Result<(), Box<dyn std::error::Error>> {
                cover(
                    "-e",
                    "instance.es",
                    EVENT_STRUCTURE,
                    $args,
                    &["t 2 4\nt 3\n", "t 2 4\nt 3 4\n"],
                )
            }

            #[test]
            fn [<test_smt2_ $method>]() -> Result<(), Box<dyn std::error::Error>> {
                cover("-s", "instance.smt2", SMT2, $args, &["t 2\nt 3\n"])
            }

            #[test]
            fn [<test_empty_event_structure_ $method>]() -> Result<(), Box<dyn std::error::Error>> {
                cover("-e", "instance.es", "", $args, &[""])
            }
        }
    };
}

test_for_method!(optimization, &[]);
test_for_method!(cliques, &["-c"]);

#[test]
fn test_optimization_with_options() -> Result<(), Box<dyn std::error::Error>> {
    cover(
        "--event-structure",
        "instance.es",
        EVENT_STRUCTURE,
        &["--initial-timeout", "60000", "--max-retries", "3"],
        &["t 2 4\nt 3\n", "t 2 4\nt 3 4\n"],
    )
}

#[test]
fn test_cliques_with_options() -> Result<(), Box<dyn std::error::Error>> {
    cover(
        "-e",
        "instance.es",
        EVENT_STRUCTURE,
        &["-c", "--clique-time-limit", "1000", "--check-cograph"],
        &["t 2 4\nt 3\n"],
    )
}

#[test]
fn test_graph() -> Result<(), Box<dyn std::error::Error>> {
    cover("-g", "graph.txt", GRAPH, &[], &["t 20 30\nt 10\n"])
}

#[test]
fn test_event_structure_takes_precedence_over_graph() -> Result<(), Box<dyn std::error::Error>> {
    let graph_file = NamedTempFile::new("graph.txt")?;
    graph_file.write_str(GRAPH)?;
    let graph_path = graph_file.path().to_str().unwrap().to_string();
    cover(
        "-e",
        "instance.es",
        EVENT_STRUCTURE,
        &["-c", "-g", graph_path.as_str()],
        &["t 2 4\nt 3\n"],
    )
}

#[test]
fn test_smt2_takes_precedence_over_event_structure() -> Result<(), Box<dyn std::error::Error>> {
    let es_file = NamedTempFile::new("instance.es")?;
    es_file.write_str(EVENT_STRUCTURE)?;
    let es_path = es_file.path().to_str().unwrap().to_string();
    cover(
        "-s",
        "instance.smt2",
        SMT2,
        &["-e", es_path.as_str()],
        &["t 2\nt 3\n"],
    )
}

#[test]
fn test_logs() -> Result<(), Box<dyn std::error::Error>> {
    let file = NamedTempFile::new("instance.es")?;
    file.write_str(EVENT_STRUCTURE)?;
    let mut cmd = Command::cargo_bin("escover")?;
    cmd.arg("cover").arg("-e").arg(file.path()).arg("-c");
    cmd.assert().success().stdout(
        predicate::str::contains("INPUT: ")
            .and(predicate::str::contains("METHOD: cliques"))
            .and(predicate::str::contains("Tests in cover: 2"))
            .and(predicate::str::contains("total time: ")),
    );
    file.close().unwrap();
    Ok(())
}
