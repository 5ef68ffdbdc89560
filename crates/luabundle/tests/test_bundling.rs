#![allow(clippy::disallowed_methods)]

use std::{fs, path::Path};

use luabundle::{
    BundleRequest, Bundler,
    config::{Config, OutputMode},
    dependency_index::DependencyIndex,
    scanner,
    types::{UnresolvedReason, UnresolvedReference},
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Scan `root`, persist the index next to it and return a request for `src/<target>`
fn prepare(temp_dir: &TempDir, target: &str) -> BundleRequest {
    let root = temp_dir.path().join("tree");
    let index_path = temp_dir.path().join("dependencies.json");
    scanner::scan(&root).index.save(&index_path).unwrap();

    BundleRequest {
        root,
        sub_dir: "src".into(),
        target: target.to_owned(),
        index_path,
    }
}

fn prologue(config: &Config, blocks: &[&str]) -> String {
    let mut text = format!("{}\n", config.begin_marker);
    for block in blocks {
        text.push('\n');
        text.push_str(block);
        text.push('\n');
    }
    text.push('\n');
    text.push_str(&config.end_marker);
    text.push_str("\n\n");
    text
}

#[test]
fn test_target_without_requires_gets_empty_prologue() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("tree");
    let original = "local x = 1\nprint(x)\n";
    write(&root, "src/main.lua", original);

    let request = prepare(&temp_dir, "main.lua");
    let config = Config::default();
    let outcome = Bundler::new(config.clone()).bundle(&request).unwrap();

    let expected = format!("{}{original}", prologue(&config, &[]));
    assert_eq!(outcome.output_path, root.join("src/main_new.lua"));
    assert_eq!(fs::read_to_string(&outcome.output_path).unwrap(), expected);
    assert!(outcome.is_complete());
}

#[test]
fn test_single_leaf_function_is_inlined_before_original() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("tree");
    write(
        &root,
        "lib/widget.lua",
        "local Widget = {}\n\nfunction Widget.make(x)\n  return x\nend\n\nfunction Widget.unused()\nend\n\nreturn Widget\n",
    );
    let original = "local Widget = require(\"lib.widget\")\nreturn Widget.make(42)\n";
    write(&root, "src/main.lua", original);

    let request = prepare(&temp_dir, "main.lua");
    let config = Config::default();
    let outcome = Bundler::new(config.clone()).bundle(&request).unwrap();

    let expected = format!(
        "{}{original}",
        prologue(&config, &["function Widget.make(x)\n  return x\nend"])
    );
    assert_eq!(fs::read_to_string(&outcome.output_path).unwrap(), expected);
    assert_eq!(outcome.bundle.functions.len(), 1);
    assert_eq!(outcome.bundle.functions[0].file, root.join("lib/widget.lua"));
}

#[test]
fn test_repeated_runs_append_by_default() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("tree");
    write(&root, "lib/m.lua", "local m = {}\nm.f = function()\n  return 1\nend\nreturn m\n");
    let original = "local m = require 'lib.m'\nm.f()\n";
    write(&root, "src/main.lua", original);

    let request = prepare(&temp_dir, "main.lua");
    let config = Config::default();
    let bundler = Bundler::new(config.clone());
    bundler.bundle(&request).unwrap();
    let outcome = bundler.bundle(&request).unwrap();

    let single = format!(
        "{}{original}",
        prologue(&config, &["m.f = function()\n  return 1\nend"])
    );
    assert_eq!(
        fs::read_to_string(&outcome.output_path).unwrap(),
        format!("{single}{single}")
    );
}

#[test]
fn test_overwrite_mode_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("tree");
    write(&root, "src/main.lua", "print('hi')\n");

    let request = prepare(&temp_dir, "main.lua");
    let bundler = Bundler::new(Config {
        output_mode: OutputMode::Overwrite,
        ..Config::default()
    });
    let first = bundler.bundle(&request).unwrap();
    let first_text = fs::read_to_string(&first.output_path).unwrap();
    let second = bundler.bundle(&request).unwrap();

    assert_eq!(fs::read_to_string(&second.output_path).unwrap(), first_text);
}

#[test]
fn test_transitive_functions_and_utils_alias() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("tree");
    write(
        &root,
        "st/zigbee/zcl/clusters.lua",
        "local zcl_utils = require \"st.utils\"\nlocal clusters = {}\nfunction clusters.level(x)\n  return zcl_utils.clamp(x)\nend\nreturn clusters\n",
    );
    write(
        &root,
        "st/utils.lua",
        "local utils = {}\nfunction utils.clamp(x)\n  if x > 1 then\n    return 1\n  end\n  return x\nend\nreturn utils\n",
    );
    let original = "local zcl = require \"st.zigbee.zcl\"\nprint(zcl.clusters.level(3))\n";
    write(&root, "src/driver.lua", original);

    let request = prepare(&temp_dir, "driver.lua");
    let outcome = Bundler::default().bundle(&request).unwrap();

    assert_eq!(outcome.bundle.functions.len(), 1);
    assert_eq!(
        outcome.bundle.functions[0].text,
        "function zcl_utils.clamp(x)\n  if x > 1 then\n    return 1\n  end\n  return x\nend"
    );
    assert!(outcome.cycles.is_empty());
    assert_eq!(
        outcome.unresolved,
        vec![UnresolvedReference {
            qualified_name: "zcl.clusters".to_owned(),
            file: root.join("st/zigbee/zcl/clusters.lua"),
            reason: UnresolvedReason::ModuleNotInlined,
        }]
    );
}

#[test]
fn test_module_reference_leaves_bundle_incomplete() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("tree");
    write(
        &root,
        "st/zcl/clusters.lua",
        "local utils = require \"st.utils\"\nlocal clusters = {}\nfunction clusters.level(x)\n  return utils.clamp(x)\nend\nreturn clusters\n",
    );
    write(
        &root,
        "st/utils.lua",
        "local utils = {}\nfunction utils.clamp(x)\n  return x\nend\nreturn utils\n",
    );
    write(
        &root,
        "src/main.lua",
        "local zcl = require \"st.zcl\"\nprint(zcl.clusters.level(3))\n",
    );

    let request = prepare(&temp_dir, "main.lua");
    let outcome = Bundler::default().bundle(&request).unwrap();

    let inlined: Vec<&str> = outcome
        .bundle
        .functions
        .iter()
        .map(|function| function.qualified_name.as_str())
        .collect();
    assert_eq!(inlined, vec!["utils.clamp"]);
    assert!(!outcome.is_complete());
    assert_eq!(outcome.unresolved.len(), 1);
    assert_eq!(outcome.unresolved[0].qualified_name, "zcl.clusters");
    assert_eq!(
        outcome.unresolved[0].reason,
        UnresolvedReason::ModuleNotInlined
    );
}

#[test]
fn test_original_without_trailing_newline_is_kept_verbatim() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("tree");
    let original = "print(1)";
    write(&root, "src/main.lua", original);

    let request = prepare(&temp_dir, "main.lua");
    let config = Config::default();
    let bundler = Bundler::new(config.clone());
    bundler.bundle(&request).unwrap();
    let outcome = bundler.bundle(&request).unwrap();

    let single = format!("{}{original}", prologue(&config, &[]));
    assert!(single.ends_with("\n\nprint(1)"));
    assert_eq!(
        fs::read_to_string(&outcome.output_path).unwrap(),
        format!("{single}{single}")
    );
}

#[test]
fn test_unresolved_references_produce_partial_bundle() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("tree");
    write(&root, "lib/m.lua", "local m = {}\nm.value = 3\nreturn m\n");
    let original = "local m = require \"lib.m\"\nlocal gone = require \"lib.gone\"\nprint(m.value, gone.f())\n";
    write(&root, "src/main.lua", original);

    let request = prepare(&temp_dir, "main.lua");
    let outcome = Bundler::default().bundle(&request).unwrap();

    assert!(outcome.bundle.functions.is_empty());
    let reasons: Vec<(&str, UnresolvedReason)> = outcome
        .unresolved
        .iter()
        .map(|reference| (reference.qualified_name.as_str(), reference.reason))
        .collect();
    assert_eq!(
        reasons,
        vec![
            ("m.value", UnresolvedReason::NoDefinition),
            ("gone.f", UnresolvedReason::MissingFile),
        ]
    );
    assert!(fs::read_to_string(&outcome.output_path).unwrap().ends_with(original));
}

#[test]
fn test_cyclic_requires_terminate_and_are_reported() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("tree");
    write(
        &root,
        "pkg/a.lua",
        "local b = require \"pkg.b\"\nlocal a = {}\nfunction a.ping()\n  return b.pong()\nend\nreturn a\n",
    );
    write(
        &root,
        "pkg/b.lua",
        "local a = require \"pkg.a\"\nlocal b = {}\nfunction b.pong()\n  return 1\nend\nreturn b\n",
    );
    write(&root, "src/main.lua", "local pkg = require \"pkg\"\nprint(pkg.a.ping())\n");

    let request = prepare(&temp_dir, "main.lua");
    let outcome = Bundler::default().bundle(&request).unwrap();

    let mut inlined: Vec<&str> = outcome
        .bundle
        .functions
        .iter()
        .map(|function| function.qualified_name.as_str())
        .collect();
    inlined.sort_unstable();
    assert_eq!(inlined, vec!["b.pong"]);
    assert_eq!(outcome.cycles, vec![vec!["a".to_owned(), "b".to_owned()]]);
}

#[test]
fn test_missing_index_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("tree");
    write(&root, "src/main.lua", "print(1)\n");

    let request = BundleRequest {
        root,
        sub_dir: "src".into(),
        target: "main.lua".to_owned(),
        index_path: temp_dir.path().join("missing.json"),
    };
    assert!(Bundler::default().bundle(&request).is_err());
}

#[test]
fn test_malformed_index_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("tree");
    write(&root, "src/main.lua", "print(1)\n");
    let index_path = temp_dir.path().join("dependencies.json");
    fs::write(&index_path, "{\"main.lua\": 7}").unwrap();

    let request = BundleRequest {
        root,
        sub_dir: "src".into(),
        target: "main.lua".to_owned(),
        index_path: index_path.clone(),
    };
    assert!(Bundler::default().bundle(&request).is_err());
    assert!(DependencyIndex::load(&index_path).is_err());
}
