use std::fs;

use tempfile::TempDir;

use scpgen::config::{parse_start_time, resolve_contests, ConfigError, ContestSpec};

#[test]
fn start_time_accepts_all_four_shapes() {
    let midnight = parse_start_time("2023-01-28").expect("date only");
    assert_eq!(parse_start_time("2023-01-28T00").expect("hour"), midnight);
    assert_eq!(
        parse_start_time("2023-01-28T00:00").expect("minute"),
        midnight
    );
    assert_eq!(
        parse_start_time("2023-01-28T00:00:00").expect("second"),
        midnight
    );

    let noon = parse_start_time("2023-01-28T12").expect("noon");
    assert_eq!(noon - midnight, 12 * 3600);

    let precise = parse_start_time("2023-01-28T12:30:15").expect("precise");
    assert_eq!(precise - midnight, 12 * 3600 + 30 * 60 + 15);
}

#[test]
fn bad_timestamps_are_rejected() {
    assert!(matches!(
        parse_start_time("2023/01/28"),
        Err(ConfigError::BadTimestamp(_))
    ));
    assert!(matches!(
        parse_start_time("2023-01-28T25"),
        Err(ConfigError::BadTimestamp(_))
    ));
    assert!(matches!(
        parse_start_time("2023-01-28T12:00:00:00"),
        Err(ConfigError::BadTimestamp(_))
    ));
}

#[test]
fn contest_window_boundaries_are_half_open() {
    let contest = ContestSpec {
        dir: ".".into(),
        start: 1_000_000,
        hours: 48,
    };

    assert!(contest.contains(1_000_000));
    assert!(contest.contains(1_000_000 + 48 * 3600 - 1));
    assert!(!contest.contains(1_000_000 + 48 * 3600));
    assert!(!contest.contains(999_999));
    assert_eq!(contest.max_rel_mins(), 48 * 60 - 1);
}

#[test]
fn a_plain_directory_requires_the_global_window() {
    let tmp = TempDir::new().expect("tempdir");
    let dir = tmp.path().to_str().expect("utf8 path");

    assert!(matches!(
        resolve_contests(dir, None, Some("24")),
        Err(ConfigError::MissingStart)
    ));
    assert!(matches!(
        resolve_contests(dir, Some("2023-01-28"), None),
        Err(ConfigError::MissingHours)
    ));

    let contests =
        resolve_contests(dir, Some("2023-01-28T12:00"), Some("24")).expect("resolve");
    assert_eq!(contests.len(), 1);
    assert_eq!(contests[0].hours, 24);
}

#[test]
fn a_contest_list_file_mixes_bare_and_windowed_lines() {
    let tmp = TempDir::new().expect("tempdir");
    let dir_a = tmp.path().join("cqww");
    let dir_b = tmp.path().join("naqp");
    fs::create_dir(&dir_a).expect("mkdir");
    fs::create_dir(&dir_b).expect("mkdir");

    let list = tmp.path().join("contests.txt");
    fs::write(
        &list,
        format!(
            "# contest corpus\n\n{}\n{} 2023-01-14T18:00 12\n",
            dir_a.display(),
            dir_b.display()
        ),
    )
    .expect("write list");

    let arg = format!("@{}", list.display());
    let contests =
        resolve_contests(&arg, Some("2022-10-29"), Some("48")).expect("resolve");

    assert_eq!(contests.len(), 2);
    assert_eq!(contests[0].hours, 48);
    assert_eq!(contests[1].hours, 12);
    assert_eq!(
        contests[1].start,
        parse_start_time("2023-01-14T18:00").expect("start")
    );
}

#[test]
fn malformed_list_lines_and_missing_directories_are_fatal() {
    let tmp = TempDir::new().expect("tempdir");

    let list = tmp.path().join("contests.txt");
    fs::write(&list, "somedir 2023-01-14T18:00\n").expect("write list");

    let arg = format!("@{}", list.display());
    assert!(matches!(
        resolve_contests(&arg, None, None),
        Err(ConfigError::BadListLine { line: 1, .. })
    ));

    let missing = tmp.path().join("no-such-dir");
    assert!(matches!(
        resolve_contests(
            missing.to_str().expect("utf8 path"),
            Some("2023-01-28"),
            Some("24")
        ),
        Err(ConfigError::MissingDirectory(_))
    ));
}

#[test]
fn zero_hour_contests_are_rejected() {
    let tmp = TempDir::new().expect("tempdir");
    let dir = tmp.path().to_str().expect("utf8 path");

    assert!(matches!(
        resolve_contests(dir, Some("2023-01-28"), Some("0")),
        Err(ConfigError::BadHours(_))
    ));
}
