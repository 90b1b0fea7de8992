use logcluster::output::{self, Format};
use logcluster::patterns::{number_groups, rank_clusters, Cluster};
use std::fs;
use std::io::Write;

fn clusters() -> Vec<Cluster> {
    rank_clusters(vec![
        Cluster::singleton("payment declined".into()),
        Cluster::new("disk full".into(), vec!["disk fulll".into(), "disk fuel".into()]),
        Cluster::new("cache miss".into(), vec!["cache misses".into()]),
        Cluster::singleton("auth ok".into()),
    ])
}

#[test]
fn ranking_is_by_size_then_seed() {
    let ranked = clusters();
    assert_eq!(ranked[0].seed, "disk full");
    assert_eq!(ranked[1].seed, "cache miss");
    assert_eq!(ranked[2].seed, "auth ok");
    assert_eq!(ranked[3].seed, "payment declined");
}

#[test]
fn text_output_numbers_groups_and_separates_them() {
    let mut buf = Vec::new();
    output::write_text(&mut buf, &clusters()).unwrap();
    let text = String::from_utf8(buf).unwrap();
    let expected = "1;disk full\n1;disk fulll\n1;disk fuel\n \n\
                    2;cache miss\n2;cache misses\n \n\
                    3;auth ok\n \n\
                    4;payment declined\n \n";
    assert_eq!(text, expected);
}

#[test]
fn json_output_carries_group_and_size() {
    let mut buf = Vec::new();
    output::write_clusters(&mut buf, &clusters(), Format::Json).unwrap();
    let v: serde_json::Value = serde_json::from_slice(&buf).unwrap();
    let arr = v.as_array().unwrap();
    assert_eq!(arr.len(), 4);
    assert_eq!(arr[0]["group"], 1);
    assert_eq!(arr[0]["size"], 3);
    assert_eq!(arr[0]["seed"], "disk full");
    assert_eq!(arr[0]["members"][1], "disk fuel");
    assert_eq!(arr[3]["members"].as_array().unwrap().len(), 0);
}

#[test]
fn number_groups_is_one_based() {
    let numbered = number_groups(&clusters());
    assert_eq!(numbered.iter().map(|g| g.group).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    assert_eq!(numbered[1].size, 2);
}

#[test]
fn writes_to_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("groups.txt");
    let mut f = fs::File::create(&path).unwrap();
    output::write_clusters(&mut f, &clusters(), Format::Text).unwrap();
    f.flush().unwrap();
    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().filter(|l| *l == " ").count(), 4);
    assert!(content.starts_with("1;disk full\n"));
}

#[test]
fn format_parses_case_insensitively() {
    assert_eq!("JSON".parse::<Format>().unwrap(), Format::Json);
    assert_eq!("text".parse::<Format>().unwrap(), Format::Text);
    assert!("xml".parse::<Format>().is_err());
}
