use std::fs;
use std::path::Path;

use arch_guard::checks::{layer_deps, no_console_log, no_focused_tests, no_skipped_tests, type_dedup, REGISTRY};
use arch_guard::config::LinterConfig;
use arch_guard::reporter;

#[test]
fn focused_test_is_reported_with_location_and_call() {
    let root = tempfile::tempdir().unwrap();
    write_file(
        &root.path().join("packages/functions/src/services/foo.test.ts"),
        "\
describe('foo', () => {
  it.only('works', () => {
    expect(1).toBe(1);
  });
});
",
    );

    let config = LinterConfig::from_root(root.path());
    let result = no_focused_tests::check(&config);

    assert!(!result.passed);
    assert_eq!(result.violations.len(), 1);
    let violation = &result.violations[0];
    assert!(violation.contains("packages/functions/src/services/foo.test.ts:2"), "{violation}");
    assert!(violation.contains("it.only"));
}

#[test]
fn commented_out_focus_skip_and_console_calls_pass() {
    let root = tempfile::tempdir().unwrap();
    write_file(
        &root.path().join("packages/functions/src/services/foo.test.ts"),
        "\
describe('foo', () => {
  // it.only('works', () => {});
  // it.skip('later', () => {});
  /* describe.only('block', () => {}); */
  it('works', () => {
    expect(1).toBe(1);
  });
});
",
    );
    write_file(
        &root.path().join("packages/functions/src/services/foo.service.ts"),
        "\
// console.log('debug');
 * console.warn('from a doc comment')
export function foo(): number {
  return 1;
}
",
    );

    let config = LinterConfig::from_root(root.path());
    for result in [
        no_focused_tests::check(&config),
        no_skipped_tests::check(&config),
        no_console_log::check(&config),
    ] {
        assert!(result.passed, "{}: {:?}", result.name, result.violations);
    }
}

#[test]
fn console_calls_outside_tests_are_reported() {
    let root = tempfile::tempdir().unwrap();
    write_file(
        &root.path().join("packages/functions/src/services/sync.service.ts"),
        "export function sync(): void {\n  console.error('boom');\n}\n",
    );
    write_file(
        &root.path().join("packages/functions/src/scripts/backfill.ts"),
        "console.log('scripts may print');\n",
    );
    write_file(
        &root.path().join("packages/functions/src/test-utils/index.ts"),
        "console.log('so may test utilities');\n",
    );

    let config = LinterConfig::from_root(root.path());
    let result = no_console_log::check(&config);

    assert_eq!(result.violations.len(), 1);
    assert!(result.violations[0].contains("packages/functions/src/services/sync.service.ts:2"));
    assert!(result.violations[0].contains("console.error"));
}

#[test]
fn service_importing_handler_is_a_layer_violation() {
    let root = tempfile::tempdir().unwrap();
    write_file(
        &root.path().join("packages/functions/src/services/workout.service.ts"),
        "\
import type { Workout } from '../types/workout.js';
import { exercisesApp } from '../handlers/exercises.js';
import { WorkoutRepository } from '../repositories/workout.repository.js';
",
    );

    let config = LinterConfig::from_root(root.path());
    let result = layer_deps::check(&config);

    assert!(!result.passed);
    assert_eq!(result.violations.len(), 1);
    let violation = &result.violations[0];
    assert!(violation.contains("packages/functions/src/services/workout.service.ts:2"));
    assert!(violation.contains("'../handlers/exercises.js'"));
    assert!(violation.contains("services may not import from handlers"));
}

#[test]
fn duplicate_exported_type_names_both_files() {
    let root = tempfile::tempdir().unwrap();
    write_file(
        &root.path().join("packages/functions/src/types/exercise.ts"),
        "export interface Exercise {\n  id: string;\n}\n",
    );
    write_file(
        &root.path().join("packages/functions/src/services/exercise.service.ts"),
        "import { db } from '../firebase.js';\n\nexport interface Exercise {\n  id: string;\n}\n",
    );

    let config = LinterConfig::from_root(root.path());
    let result = type_dedup::check(&config);

    assert_eq!(result.violations.len(), 1);
    let violation = &result.violations[0];
    assert!(violation.contains("Type 'Exercise' defined in multiple files"));
    assert!(violation.contains("packages/functions/src/types/exercise.ts:1"));
    assert!(violation.contains("packages/functions/src/services/exercise.service.ts:3"));
    assert!(violation.contains("Keep the definition in packages/functions/src/types/exercise.ts"));
}

#[test]
fn empty_repository_passes_every_check() {
    let root = tempfile::tempdir().unwrap();
    let config = LinterConfig::from_root(root.path());

    let (results, freshness) = arch_guard::run_all_checks(&config);

    assert_eq!(results.len(), REGISTRY.len());
    for result in &results {
        assert!(result.passed, "{}: {:?}", result.name, result.violations);
    }
    assert!(freshness.stale);
    assert_eq!(reporter::exit_code(&results), 0);
}

#[test]
fn runs_are_deterministic() {
    let root = tempfile::tempdir().unwrap();
    seed_messy_repo(root.path());
    let config = LinterConfig::from_root(root.path());

    let (first, _) = arch_guard::run_all_checks(&config);
    let (second, _) = arch_guard::run_all_checks(&config);

    assert_eq!(first, second);
    assert!(first.iter().any(|r| !r.passed));
    assert_eq!(reporter::exit_code(&first), 1);
}

#[test]
fn a_check_run_alone_matches_its_result_in_a_full_run() {
    let root = tempfile::tempdir().unwrap();
    seed_messy_repo(root.path());
    let config = LinterConfig::from_root(root.path());

    let (all, _) = arch_guard::run_all_checks(&config);
    for (spec, combined) in REGISTRY.iter().zip(&all) {
        let alone = arch_guard::run_check(&config, spec);
        assert_eq!(&alone, combined, "{} differs when run alone", spec.id);
    }
}

fn seed_messy_repo(root: &Path) {
    let src = root.join("packages/functions/src");
    write_file(
        &src.join("services/workout.service.ts"),
        "import { exercisesApp } from '../handlers/exercises.js';\nconsole.log('hi');\nexport interface Workout { id: string }\n",
    );
    write_file(&src.join("handlers/workout.ts"), "export interface Workout { id: string }\n");
    write_file(
        &src.join("handlers/workout.test.ts"),
        "it.skip('later', () => {});\nit.only('now', () => {\n  expect(1).toBe(1);\n});\nit('empty', () => {});\n",
    );
    write_file(&root.join("thoughts/shared/plans/stray-plan.md"), "# Stray\n");
    fs::create_dir_all(root.join("docs/archive")).unwrap();
}

fn write_file(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().expect("parent exists")).unwrap();
    fs::write(path, content).unwrap();
}
