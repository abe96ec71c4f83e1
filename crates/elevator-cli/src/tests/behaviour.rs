//! Behaviour-driven tests for the interactive shortcut session.

use std::fs;
use std::path::PathBuf;
use std::sync::mpsc;

use camino::Utf8PathBuf;
use elevator_config::{Config, DataPaths};
use elevator_launch::{LaunchFlags, RoutingDecision, RoutingMode, RoutingReason};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

use crate::bootstrap::{Application, StartupContext};
use crate::console::Console;
use crate::session::Session;
use crate::store::{JsonShortcutStore, Shortcut, ShortcutStore, default_shortcuts};

struct TestWorld {
    _dir: TempDir,
    store: JsonShortcutStore,
    lines: Vec<String>,
    output: String,
}

impl Default for TestWorld {
    fn default() -> Self {
        let dir = TempDir::new().expect("temp dir");
        let file = dir.path().join("shortcuts.json");
        let config = Config {
            shortcuts_path: Some(Utf8PathBuf::from_path_buf(file).expect("utf-8 temp path")),
            ..Config::default()
        };
        Self {
            store: JsonShortcutStore::new(DataPaths::from_config(&config)),
            _dir: dir,
            lines: Vec::new(),
            output: String::new(),
        }
    }
}

impl TestWorld {
    fn saved(&self) -> Vec<Shortcut> {
        let json = fs::read_to_string(self.store.path()).expect("shortcut file");
        serde_json::from_str(&json).expect("shortcut json")
    }
}

#[fixture]
fn world() -> TestWorld {
    TestWorld::default()
}

#[given("a shortcut file holding the defaults")]
fn given_default_file(world: &mut TestWorld) {
    world.store.save(&default_shortcuts()).expect("seed shortcuts");
}

#[given("a missing shortcut file")]
fn given_missing_file(world: &mut TestWorld) {
    assert!(!world.store.path().exists());
}

#[when("the user types {line}")]
fn when_user_types(world: &mut TestWorld, line: String) {
    world.lines.push(line.trim_matches('"').to_owned());
}

#[when("the session runs")]
fn when_session_runs(world: &mut TestWorld) {
    let (sender, receiver) = mpsc::channel();
    for line in world.lines.drain(..) {
        sender.send(line).expect("queue line");
    }
    drop(sender);
    let context = StartupContext {
        flags: LaunchFlags::default(),
        routing: RoutingDecision {
            mode: RoutingMode::Direct,
            reason: RoutingReason::BrokerAbsent,
        },
    };
    let mut console = Console::new(receiver, Vec::new());
    Session::new(world.store.clone())
        .run(&context, &mut console)
        .expect("session runs");
    world.output = String::from_utf8(console.into_output()).expect("utf-8 output");
}

#[then("the shortcut file binds {key} to {path}")]
fn then_file_binds(world: &mut TestWorld, key: String, path: String) {
    let key = key.trim_matches('"');
    let saved = world.saved();
    let shortcut = saved
        .iter()
        .find(|shortcut| shortcut.key == key)
        .expect("shortcut saved");
    assert_eq!(shortcut.path, PathBuf::from(path.trim_matches('"')));
}

#[then("the shortcut file holds {count} shortcuts")]
fn then_file_holds(world: &mut TestWorld, count: usize) {
    assert_eq!(world.saved().len(), count);
}

#[then("the shortcut file is absent")]
fn then_file_absent(world: &mut TestWorld) {
    assert!(!world.store.path().exists());
}

#[then("the console shows {text}")]
fn then_console_shows(world: &mut TestWorld, text: String) {
    let expected = text.trim_matches('"');
    assert!(
        world.output.lines().any(|line| line == expected),
        "missing {expected:?} in:\n{}",
        world.output
    );
}

#[scenario(
    path = "tests/features/shortcut_session.feature",
    name = "Added shortcuts are persisted"
)]
fn added_shortcuts_are_persisted(world: TestWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/shortcut_session.feature",
    name = "Declined removal leaves the file untouched"
)]
fn declined_removal_leaves_file(world: TestWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/shortcut_session.feature",
    name = "Duplicate keys are rejected"
)]
fn duplicate_keys_are_rejected(world: TestWorld) {
    let _ = world;
}
