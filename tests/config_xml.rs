use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

use dirlink::config::load_config_from_xml_path;
use dirlink::{Config, LogLevel};

fn load(xml: &str) -> anyhow::Result<Config> {
    let td = tempdir().unwrap();
    let path = td.path().join("config.xml");
    fs::write(&path, xml).unwrap();
    load_config_from_xml_path(&path)
}

#[test]
fn reads_all_fields() {
    let cfg = load(
        r#"<config>
  <log_level>debug</log_level>
  <log_file>/var/log/dirlink.log</log_file>
  <create_parents>true</create_parents>
</config>"#,
    )
    .unwrap();
    assert_eq!(cfg.log_level, LogLevel::Debug);
    assert_eq!(cfg.log_file, Some(PathBuf::from("/var/log/dirlink.log")));
    assert!(cfg.create_parents);
    assert!(!cfg.dry_run && !cfg.assume_yes, "never set from XML");
}

#[test]
fn missing_elements_fall_back_to_defaults() {
    assert_eq!(load("<config></config>").unwrap(), Config::default());
}

#[test]
fn whitespace_is_trimmed() {
    let cfg = load(
        "<config><log_level>  info </log_level><log_file>   </log_file><create_parents> true </create_parents></config>",
    )
    .unwrap();
    assert_eq!(cfg.log_level, LogLevel::Info);
    assert_eq!(cfg.log_file, None, "blank log_file disables file logging");
    assert!(cfg.create_parents);
}

#[test]
fn malformed_xml_is_an_error() {
    let err = load("<config><log_level>info</config>").unwrap_err();
    assert!(format!("{err:#}").contains("parse config xml"));
}
