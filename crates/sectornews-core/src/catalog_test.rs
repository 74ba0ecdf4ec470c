use std::io::Write;

use super::*;

fn raw(pairs: &[(&str, Vec<&str>)]) -> Vec<(String, Vec<String>)> {
    pairs
        .iter()
        .map(|(sector, keywords)| {
            (
                (*sector).to_string(),
                keywords.iter().map(|k| (*k).to_string()).collect(),
            )
        })
        .collect()
}

#[test]
fn pairs_iterate_sorted_sectors_and_file_ordered_keywords() {
    let catalog = KeywordCatalog::new(raw(&[
        ("tech", vec!["chip", "ai", "battery"]),
        ("bio", vec!["vaccine"]),
    ]))
    .unwrap();
    let pairs: Vec<(&str, &str)> = catalog.pairs().collect();
    assert_eq!(
        pairs,
        vec![
            ("bio", "vaccine"),
            ("tech", "chip"),
            ("tech", "ai"),
            ("tech", "battery"),
        ]
    );
    assert_eq!(catalog.keyword_count(), 4);
}

#[test]
fn names_are_trimmed() {
    let catalog = KeywordCatalog::new(raw(&[(" tech ", vec!["  chip "])])).unwrap();
    assert_eq!(catalog.keywords("tech").unwrap(), ["chip".to_string()]);
}

#[test]
fn same_keyword_in_two_sectors_is_allowed() {
    let catalog = KeywordCatalog::new(raw(&[("tech", vec!["battery"]), ("auto", vec!["battery"])]));
    assert!(catalog.is_ok());
}

#[test]
fn duplicate_keyword_in_one_sector_fails() {
    let err = KeywordCatalog::new(raw(&[("tech", vec!["chip", "chip"])])).unwrap_err();
    assert!(
        matches!(err, ConfigError::Validation(ref msg) if msg.contains("duplicate keyword")),
        "unexpected error: {err:?}"
    );
}

#[test]
fn blank_keyword_fails() {
    let err = KeywordCatalog::new(raw(&[("tech", vec!["chip", "   "])])).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)));
}

#[test]
fn blank_sector_fails() {
    let err = KeywordCatalog::new(raw(&[("", vec!["chip"])])).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)));
}

#[test]
fn catalog_without_keywords_fails() {
    let err = KeywordCatalog::new(raw(&[("tech", vec![])])).unwrap_err();
    assert!(
        matches!(err, ConfigError::Validation(ref msg) if msg.contains("at least one keyword"))
    );
}

#[test]
fn restricted_to_keeps_only_requested_sector() {
    let catalog =
        KeywordCatalog::new(raw(&[("tech", vec!["chip"]), ("bio", vec!["vaccine"])])).unwrap();
    let only_bio = catalog.restricted_to("bio").unwrap();
    assert_eq!(only_bio.pairs().collect::<Vec<_>>(), vec![("bio", "vaccine")]);
    let err = catalog.restricted_to("energy").unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref msg) if msg.contains("not found")));
}

#[test]
fn restricted_to_sector_without_keywords_says_so() {
    let catalog = KeywordCatalog::new(raw(&[("tech", vec!["chip"]), ("bio", vec![])])).unwrap();
    let err = catalog.restricted_to("bio").unwrap_err();
    assert!(
        matches!(err, ConfigError::Validation(ref msg) if msg.contains("'bio' has no keywords"))
    );
}

#[test]
fn load_catalog_reads_json() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(file, r#"{{"반도체": ["삼성전자", "HBM"], "tech": ["chip"]}}"#).unwrap();
    let catalog = load_catalog(file.path()).unwrap();
    assert_eq!(catalog.keyword_count(), 3);
    assert_eq!(
        catalog.keywords("반도체").unwrap(),
        ["삼성전자".to_string(), "HBM".to_string()]
    );
}

#[test]
fn load_catalog_reads_yaml() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(file, "tech:\n  - chip\n  - ai").unwrap();
    let catalog = load_catalog(file.path()).unwrap();
    assert_eq!(catalog.pairs().count(), 2);
}

#[test]
fn load_catalog_missing_file_is_io_error() {
    let err = load_catalog(Path::new("/definitely/not/here/keywords.json")).unwrap_err();
    assert!(matches!(err, ConfigError::CatalogIo { .. }));
}

#[test]
fn load_catalog_malformed_json_is_parse_error() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(file, r#"{{"tech": "chip"}}"#).unwrap();
    let err = load_catalog(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::CatalogJson(_)));
}
