// revgate: serialized gateway to a version-control working copy
//
// SPDX-FileCopyrightText: 2026 revgate contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use super::LogConfig;

#[test]
fn test_log_config_defaults() {
    let config = LogConfig::default();

    assert_eq!(config.console_filter(), "info");
    assert_eq!(config.file_filter(), "debug");
    assert_eq!(config.log_file(), None);
    assert!(!config.show_target());
}

#[test]
fn test_log_config_builder() {
    let config = LogConfig::builder()
        .with_console_filter("warn".to_string())
        .with_file_filter("revgate::vfs=trace,debug".to_string())
        .with_log_file("gate.log".to_string())
        .with_show_target(true)
        .build();

    assert_eq!(config.console_filter(), "warn");
    assert_eq!(config.file_filter(), "revgate::vfs=trace,debug");
    assert_eq!(config.log_file(), Some("gate.log"));
    assert!(config.show_target());
}
