use super::*;

#[test]
fn test_parse_minimal() {
    let cfg = Config::parse_str(r#"suffix = "dc=example,dc=com""#).unwrap();
    assert_eq!(cfg.suffix.as_str(), "dc=example,dc=com");
    assert_eq!(cfg.variant, Variant::Flat);
    assert_eq!(cfg.env_path, "./dnindex.db");
}

#[test]
fn test_parse_hierarchical() {
    let toml = r#"
        suffix = "dc=example,dc=com"
        variant = "hierarchical"
        env_path = "/var/lib/dnindex"
        map_size = 1048576
    "#;
    let cfg = Config::parse_str(toml).unwrap();
    assert_eq!(cfg.variant, Variant::Hierarchical);
    assert_eq!(cfg.env_path, "/var/lib/dnindex");
    assert_eq!(cfg.map_size, 1048576);
}

#[test]
fn test_missing_suffix_is_invalid() {
    let err = Config::parse_str("variant = \"flat\"").unwrap_err();
    assert!(matches!(err, crate::Error::Invalid(_, _)));
}

#[test]
fn test_unknown_variant_is_invalid() {
    let toml = r#"
        suffix = "dc=example,dc=com"
        variant = "bogus"
    "#;
    let err = Config::parse_str(toml).unwrap_err();
    assert!(matches!(err, crate::Error::Invalid(_, _)));
}
