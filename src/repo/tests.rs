// revgate: serialized gateway to a version-control working copy
//
// SPDX-FileCopyrightText: 2026 revgate contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::Path;

use super::{BaselineContent, Revision, RootRegistry};

#[test]
fn test_revision_display() {
    assert_eq!(Revision::new("1234").to_string(), "1234");
    assert_eq!(Revision::from("HEAD").as_str(), "HEAD");
}

#[test]
fn test_owning_root_prefix_match() {
    let registry = RootRegistry::new();
    registry.add_root(Path::new("/work/trunk"));

    assert_eq!(
        registry.owning_root(Path::new("/work/trunk/src/main.rs")),
        Some(Path::new("/work/trunk").to_path_buf())
    );
    assert_eq!(registry.owning_root(Path::new("/work/other/file")), None);
}

#[test]
fn test_owning_root_longest_prefix_wins() {
    let registry = RootRegistry::new();
    registry.add_root(Path::new("/work"));
    registry.add_root(Path::new("/work/vendored"));

    assert_eq!(
        registry.owning_root(Path::new("/work/vendored/lib.rs")),
        Some(Path::new("/work/vendored").to_path_buf())
    );
    assert_eq!(
        registry.owning_root(Path::new("/work/src/lib.rs")),
        Some(Path::new("/work").to_path_buf())
    );
}

#[test]
fn test_component_boundaries_respected() {
    let registry = RootRegistry::new();
    registry.add_root(Path::new("/work/repo"));

    // "/work/repository" shares a string prefix but not a path prefix.
    assert_eq!(registry.owning_root(Path::new("/work/repository/f")), None);
}

#[test]
fn test_add_root_is_idempotent() {
    let registry = RootRegistry::new();
    registry.add_root(Path::new("/a"));
    registry.add_root(Path::new("/a"));
    assert_eq!(registry.roots().len(), 1);
}

#[test]
fn test_remove_root() {
    let registry = RootRegistry::new();
    registry.add_root(Path::new("/a"));
    registry.add_root(Path::new("/b"));
    registry.remove_root(Path::new("/a"));

    assert_eq!(registry.owning_root(Path::new("/a/file")), None);
    assert_eq!(registry.roots(), vec![Path::new("/b").to_path_buf()]);
}

#[test]
fn test_baseline_content_variants() {
    assert_ne!(BaselineContent::Unmodified, BaselineContent::Added);
    assert_eq!(
        BaselineContent::Content(b"old".to_vec()),
        BaselineContent::Content(b"old".to_vec())
    );
}
