use std::fs;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use scpgen::{
    config::{parse_start_time, ContestSpec, RunConfig},
    pipeline::{self, PipelineError},
    sched::{self, SchedError},
};

fn contest(dir: &Path) -> ContestSpec {
    ContestSpec {
        dir: dir.to_path_buf(),
        start: parse_start_time("2023-01-28T12:00").expect("start"),
        hours: 24,
    }
}

fn qso_line(qrg: u32, date: &str, hhmm: &str, tcall: &str, rcall: &str) -> String {
    format!("QSO: {qrg} CW {date} {hhmm} {tcall} 599 001 {rcall} 599 001")
}

fn write_log(dir: &Path, name: &str, lines: &[String]) {
    let mut content = String::from("START-OF-LOG: 3.0\n");
    for line in lines {
        content.push_str(line);
        content.push('\n');
    }
    content.push_str("END-OF-LOG:\n");
    fs::write(dir.join(name), content).expect("write log");
}

/// Three entrants: A5A runs 14050 and is worked correctly by B1B, while C2C
/// logs the bust A5B at the same time and frequency.
fn write_run_bust_corpus(dir: &Path) {
    write_log(
        dir,
        "a5a.log",
        &[
            qso_line(14_050, "2023-01-28", "2158", "A5A", "K8MM"),
            qso_line(14_050, "2023-01-28", "2200", "A5A", "B1B"),
            qso_line(14_050, "2023-01-28", "2310", "A5A", "K8MM"),
        ],
    );
    write_log(
        dir,
        "b1b.log",
        &[qso_line(14_050, "2023-01-28", "2200", "B1B", "A5A")],
    );
    write_log(
        dir,
        "c2c.log",
        &[qso_line(14_050, "2023-01-28", "2200", "C2C", "A5B")],
    );
}

#[tokio::test]
async fn bust_of_a_running_station_never_reaches_the_output() {
    let tmp = TempDir::new().expect("tempdir");
    write_run_bust_corpus(tmp.path());

    let counts = pipeline::process_directory(
        contest(tmp.path()),
        Arc::new(RunConfig::default()),
    )
    .await
    .expect("pipeline");

    // the bust is gone; the entrants count through each other's logs
    assert_eq!(counts.count("A5B"), 0);
    assert_eq!(counts.count("A5A"), 1);
    assert_eq!(counts.count("B1B"), 1);

    // C2C sent a log but nobody worked it
    assert_eq!(counts.count("C2C"), 0);

    // K8MM was heard twice, clearing the cutoff
    assert_eq!(counts.count("K8MM"), 2);
}

#[tokio::test]
async fn output_is_ordered_by_numeric_area() {
    let tmp = TempDir::new().expect("tempdir");
    write_run_bust_corpus(tmp.path());

    let counts = pipeline::process_directory(
        contest(tmp.path()),
        Arc::new(RunConfig::default()),
    )
    .await
    .expect("pipeline");

    let mut scp = Vec::new();
    counts.write_to(&mut scp, false).expect("write");
    assert_eq!(String::from_utf8(scp).expect("utf8"), "B1B\nA5A\nK8MM\n");

    let mut xscp = Vec::new();
    counts.write_to(&mut xscp, true).expect("write");
    assert_eq!(
        String::from_utf8(xscp).expect("utf8"),
        "B1B 1\nA5A 1\nK8MM 2\n"
    );
}

#[tokio::test]
async fn pipeline_output_is_idempotent() {
    let tmp = TempDir::new().expect("tempdir");
    write_run_bust_corpus(tmp.path());

    let config = Arc::new(RunConfig::default());

    let first = pipeline::process_directory(contest(tmp.path()), Arc::clone(&config))
        .await
        .expect("first run");
    let second = pipeline::process_directory(contest(tmp.path()), Arc::clone(&config))
        .await
        .expect("second run");

    let owned = |counts: &scpgen::output::CallCounts| -> Vec<(String, u64)> {
        counts
            .sorted()
            .into_iter()
            .map(|(call, n)| (call.to_string(), n))
            .collect()
    };

    assert_eq!(owned(&first), owned(&second));
}

#[tokio::test]
async fn scheduler_merges_contests_by_summing_counts() {
    let tmp_a = TempDir::new().expect("tempdir");
    let tmp_b = TempDir::new().expect("tempdir");

    for dir in [tmp_a.path(), tmp_b.path()] {
        write_log(
            dir,
            "k1aa.log",
            &[
                qso_line(7_050, "2023-01-28", "1300", "K1AA", "W9AAA"),
                qso_line(7_050, "2023-01-28", "1400", "K1AA", "W9AAA"),
            ],
        );
        write_log(
            dir,
            "k2bb.log",
            &[
                qso_line(7_052, "2023-01-28", "1305", "K2BB", "W9AAA"),
                qso_line(7_052, "2023-01-28", "1405", "K2BB", "W9AAA"),
            ],
        );
    }

    let config = Arc::new(RunConfig {
        parallel: 2,
        ..RunConfig::default()
    });

    let contests = vec![contest(tmp_a.path()), contest(tmp_b.path())];
    let counts = sched::run_contests(contests, config).await.expect("run");

    assert_eq!(counts.count("W9AAA"), 8);
}

#[tokio::test]
async fn an_empty_corpus_is_fatal() {
    let tmp = TempDir::new().expect("tempdir");

    let result = sched::run_contests(
        vec![contest(tmp.path())],
        Arc::new(RunConfig::default()),
    )
    .await;

    assert!(matches!(
        result,
        Err(SchedError::Pipeline(PipelineError::Ingest(_)))
    ));
}

#[tokio::test]
async fn tl_limit_excludes_small_logs_but_keeps_their_heard_calls() {
    let tmp = TempDir::new().expect("tempdir");

    // K1AA claims only one QSO, below -tl 2, so it is not auto-included;
    // the station it heard still counts through the normal pipeline
    write_log(
        tmp.path(),
        "k1aa.log",
        &[qso_line(14_050, "2023-01-28", "1300", "K1AA", "W9AAA")],
    );
    write_log(
        tmp.path(),
        "k2bb.log",
        &[
            qso_line(14_052, "2023-01-28", "1301", "K2BB", "W9AAA"),
            qso_line(14_052, "2023-01-28", "1430", "K2BB", "W9AAA"),
            qso_line(14_052, "2023-01-28", "1500", "K2BB", "K1AA"),
        ],
    );

    let config = Arc::new(RunConfig {
        tl_limit: 2,
        ..RunConfig::default()
    });

    let counts = pipeline::process_directory(contest(tmp.path()), config)
        .await
        .expect("pipeline");

    // K1AA was not an entrant, so its appearance in K2BB's log must earn
    // its way through the pruner; one appearance is at the cutoff
    assert_eq!(counts.count("K1AA"), 0);
    assert_eq!(counts.count("W9AAA"), 3);
}
