use std::fs;
use std::path::Path;

use arch_guard::checks::{
    agents_md_refs, arch_map_refs, markdown_links, no_archive_dirs, plan_lifecycle, quality_debt,
};
use arch_guard::config::LinterConfig;

const CALENDAR_SERVICE: &str = "\
import { getCyclingActivities } from './firestore-cycling.service.js';

export async function buildCalendar() {
  const activities = await getCyclingActivities();
  for (const activity of activities) {
    days.push({ type: 'cycling', activity });
    dayData.summary.hasCycling = true;
  }
}
";

const CALENDAR_TESTS: &str = "\
it('should include cycling activities in days map', () => {
  expect(days).toHaveLength(1);
});
it('should set hasCycling flag and increment totals when cycling exists', () => {
  expect(summary.hasCycling).toBe(true);
});
";

#[test]
fn unchecked_debt_with_completion_evidence_fails() {
    let root = tempfile::tempdir().unwrap();
    seed_calendar_evidence(root.path());
    write_file(
        &root.path().join("docs/quality-grades.md"),
        "\
# Quality Grades

## Active Tech Debt
- [ ] **Calendar missing cycling activities** - Cycling activities are still pending.
",
    );

    let config = LinterConfig::from_root(root.path());
    let result = quality_debt::check(&config);

    assert!(!result.passed);
    assert_eq!(result.violations.len(), 1);
    let violation = &result.violations[0];
    assert!(violation.contains("docs/quality-grades.md:4 keeps \"Calendar missing cycling activities\" unchecked"));
    assert!(violation.contains("packages/functions/src/services/calendar.service.test.ts"));
}

#[test]
fn checked_debt_or_incomplete_evidence_passes() {
    let root = tempfile::tempdir().unwrap();
    seed_calendar_evidence(root.path());
    write_file(
        &root.path().join("docs/quality-grades.md"),
        "## Active Tech Debt\n- [x] **Calendar missing cycling activities** - Calendar now includes cycling activity counts.\n",
    );
    let config = LinterConfig::from_root(root.path());
    assert!(quality_debt::check(&config).passed);

    write_file(
        &root.path().join("docs/quality-grades.md"),
        "## Active Tech Debt\n- [ ] **Calendar missing cycling activities** - pending.\n",
    );
    write_file(
        &root.path().join("packages/functions/src/services/calendar.service.test.ts"),
        "it('should include cycling activities in days map', () => {});\n",
    );
    assert!(quality_debt::check(&config).passed);
}

#[test]
fn debt_outside_active_section_is_ignored() {
    let root = tempfile::tempdir().unwrap();
    seed_test_utils(root.path(), 3);
    let grades = root.path().join("docs/quality-grades.md");
    write_file(
        &grades,
        "## Active Tech Debt\n- [x] nothing\n\n## Backlog Ideas\n- [ ] **Shared test utilities**\n",
    );

    let config = LinterConfig::from_root(root.path());
    assert!(quality_debt::check(&config).passed);

    write_file(&grades, "## Active Tech Debt\n- [ ] **Shared test utilities**\n\n## Backlog Ideas\n");
    let result = quality_debt::check(&config);
    assert_eq!(result.violations.len(), 1, "{:?}", result.violations);
    assert!(result.violations[0].contains("docs/quality-grades.md:2 keeps \"Shared test utilities\" unchecked"));
    assert!(result.violations[0].contains("at least 3 backend test files importing ../test-utils/index.js"));
}

#[test]
fn shared_test_utilities_need_three_importers() {
    let root = tempfile::tempdir().unwrap();
    seed_test_utils(root.path(), 2);
    write_file(
        &root.path().join("docs/quality-grades.md"),
        "## Active Tech Debt\n- [ ] **Shared test utilities** - mocks are still duplicated.\n",
    );
    write_file(
        &root.path().join("packages/functions/src/services/inline.test.ts"),
        "const utils = '../test-utils/index';\n",
    );

    let config = LinterConfig::from_root(root.path());
    assert!(quality_debt::check(&config).passed);

    write_file(
        &root.path().join("packages/functions/src/handlers/third.test.ts"),
        "import { createMockFirestore } from \"../test-utils/index.js\";\n",
    );
    assert!(!quality_debt::check(&config).passed);
}

#[test]
fn router_factory_needs_a_calling_handler() {
    let root = tempfile::tempdir().unwrap();
    let src = root.path().join("packages/functions/src");
    write_file(
        &src.join("middleware/create-resource-router.ts"),
        "export function createResourceRouter(opts) {}\nexport function createBaseApp(name) {}\n",
    );
    write_file(&src.join("middleware/create-resource-router.test.ts"), "");
    write_file(
        &src.join("handlers/exercises.ts"),
        "// createBaseApp is adopted elsewhere\nexport const exercisesApp = express();\n",
    );
    write_file(
        &root.path().join("docs/quality-grades.md"),
        "## Active Tech Debt\n- [ ] **createResourceRouter factory** - handlers still hand-roll apps.\n",
    );

    let config = LinterConfig::from_root(root.path());
    assert!(quality_debt::check(&config).passed);

    write_file(
        &src.join("handlers/exercises.ts"),
        "export const exercisesApp = createResourceRouter({ resourceName: 'exercises' });\n",
    );
    let result = quality_debt::check(&config);
    assert_eq!(result.violations.len(), 1, "{:?}", result.violations);
    let violation = &result.violations[0];
    assert!(violation.contains("packages/functions/src/middleware/create-resource-router.test.ts"));
    assert!(violation.contains("at least 1 handler calling createResourceRouter or createBaseApp"));
}

#[test]
fn router_factory_without_its_test_file_passes() {
    let root = tempfile::tempdir().unwrap();
    let src = root.path().join("packages/functions/src");
    write_file(
        &src.join("middleware/create-resource-router.ts"),
        "export function createResourceRouter(opts) {}\nexport function createBaseApp(name) {}\n",
    );
    write_file(&src.join("handlers/exercises.ts"), "export const exercisesApp = createBaseApp('exercises');\n");
    write_file(
        &root.path().join("docs/quality-grades.md"),
        "## Active Tech Debt\n- [ ] **createResourceRouter factory**\n",
    );

    let config = LinterConfig::from_root(root.path());
    assert!(quality_debt::check(&config).passed);
}

#[test]
fn unreadable_quality_grades_degrades() {
    let root = tempfile::tempdir().unwrap();
    let grades = root.path().join("docs/quality-grades.md");
    fs::create_dir_all(grades.parent().unwrap()).unwrap();
    fs::write(&grades, b"\xff\xfe\x00\x80").unwrap();

    let config = LinterConfig::from_root(root.path());
    let result = quality_debt::check(&config);

    assert!(!result.passed);
    assert_eq!(result.violations.len(), 1);
    assert!(result.violations[0].contains("docs/quality-grades.md could not be read"));
}

#[test]
fn architecture_map_reference_to_missing_file_fails() {
    let root = tempfile::tempdir().unwrap();
    write_file(
        &root.path().join("docs/architecture/calendar.md"),
        "\
# Calendar

- **Service**: `packages/functions/src/services/missing-calendar.service.ts`
- **Handler**: `packages/functions/src/handlers/calendar.ts`
- **Pattern**: `packages/functions/src/services/<feature>.service.ts`

```
`packages/functions/src/in-a-fence.ts`
```
",
    );
    write_file(
        &root.path().join("packages/functions/src/handlers/calendar.ts"),
        "export {};\n",
    );

    let config = LinterConfig::from_root(root.path());
    let result = arch_map_refs::check(&config);

    assert_eq!(result.violations.len(), 1, "{:?}", result.violations);
    assert!(result.violations[0].contains(
        "docs/architecture/calendar.md:3 references `packages/functions/src/services/missing-calendar.service.ts` but file does not exist."
    ));
}

#[test]
fn agents_guides_link_target_missing_fails() {
    let root = tempfile::tempdir().unwrap();
    write_file(
        &root.path().join("AGENTS.md"),
        "\
# AGENTS\n\n## Guides\n| Guide | File |\n|-------|------|\n| Local Dev Quickstart | [docs/guides/local-dev-quickstart.md](docs/guides/local-dev-quickstart.md) |\n| Missing Guide | [docs/guides/missing-guide.md](docs/guides/missing-guide.md) |\n",
    );
    write_file(
        &root.path().join("docs/guides/local-dev-quickstart.md"),
        "# Local Dev Quickstart\n",
    );

    let config = LinterConfig::from_root(root.path());
    let result = agents_md_refs::check(&config);

    assert_eq!(result.violations.len(), 1, "{:?}", result.violations);
    assert!(result.violations[0].contains("AGENTS.md:7 links to 'docs/guides/missing-guide.md'"));
}

#[test]
fn agents_tables_outside_guides_are_ignored() {
    let root = tempfile::tempdir().unwrap();
    write_file(
        &root.path().join("AGENTS.md"),
        "\
# AGENTS\n\n## Operations\n| Topic | File |\n|-------|------|\n| Missing file in non-guide | [docs/guides/missing-guide.md](docs/guides/missing-guide.md) |\n\n## Guides\n| Guide | File |\n|-------|------|\n| Local Dev Quickstart | [docs/guides/local-dev-quickstart.md](docs/guides/local-dev-quickstart.md) |\n",
    );
    write_file(
        &root.path().join("docs/guides/local-dev-quickstart.md"),
        "# Local Dev Quickstart\n",
    );

    let config = LinterConfig::from_root(root.path());
    let result = agents_md_refs::check(&config);

    assert!(result.passed, "{:?}", result.violations);
}

#[test]
fn agents_backticked_paths_must_exist() {
    let root = tempfile::tempdir().unwrap();
    write_file(
        &root.path().join("AGENTS.md"),
        "Run `scripts/validate.sh` before pushing. Hooks live in `hooks/pre-commit`.\n",
    );
    write_file(&root.path().join("scripts/validate.sh"), "#!/usr/bin/env bash\n");

    let config = LinterConfig::from_root(root.path());
    let result = agents_md_refs::check(&config);

    assert_eq!(result.violations.len(), 1, "{:?}", result.violations);
    assert!(result.violations[0].contains("AGENTS.md:1 references `hooks/pre-commit` but the path does not exist."));
}

#[test]
fn broken_relative_markdown_links_fail() {
    let root = tempfile::tempdir().unwrap();
    write_file(
        &root.path().join("docs/conventions/testing.md"),
        "\
See [workflow](./workflow.md) and [API](../missing/api.md).
External [site](https://example.com) and [anchor](#usage) are fine.
",
    );
    write_file(&root.path().join("docs/conventions/workflow.md"), "# Workflow\n");
    write_file(
        &root.path().join("thoughts/shared/plans/completed/old.md"),
        "[rotted](./gone.md)\n",
    );

    let config = LinterConfig::from_root(root.path());
    let result = markdown_links::check(&config);

    assert_eq!(result.violations.len(), 1, "{:?}", result.violations);
    assert!(result.violations[0].contains("docs/conventions/testing.md:1 links to '../missing/api.md'"));
}

#[test]
fn plans_in_the_plans_root_fail() {
    let root = tempfile::tempdir().unwrap();
    let plans = root.path().join("thoughts/shared/plans");
    write_file(&plans.join("index.md"), "# Plans\n");
    write_file(&plans.join("active/in-flight.md"), "# In flight\n");
    write_file(&plans.join("stray.md"), "# Stray\n");

    let config = LinterConfig::from_root(root.path());
    let result = plan_lifecycle::check(&config);

    assert_eq!(result.violations.len(), 1);
    assert!(result.violations[0].contains("thoughts/shared/plans/stray.md is a plan file in the root directory."));
    assert!(result.violations[0].contains("git mv thoughts/shared/plans/stray.md thoughts/shared/plans/active/stray.md"));
}

#[test]
fn archive_directories_fail_outside_skipped_trees() {
    let root = tempfile::tempdir().unwrap();
    fs::create_dir_all(root.path().join("docs/Archive")).unwrap();
    fs::create_dir_all(root.path().join("node_modules/pkg/archive")).unwrap();
    fs::create_dir_all(root.path().join("docs/archived-notes")).unwrap();

    let config = LinterConfig::from_root(root.path());
    let result = no_archive_dirs::check(&config);

    assert_eq!(result.violations.len(), 1, "{:?}", result.violations);
    assert!(result.violations[0].contains("docs/Archive exists."));
}

fn seed_calendar_evidence(root: &Path) {
    write_file(
        &root.join("packages/functions/src/services/calendar.service.ts"),
        CALENDAR_SERVICE,
    );
    write_file(
        &root.join("packages/functions/src/services/calendar.service.test.ts"),
        CALENDAR_TESTS,
    );
}

fn seed_test_utils(root: &Path, importers: usize) {
    let src = root.join("packages/functions/src");
    write_file(&src.join("test-utils/index.ts"), "export * from './firestore-mock.js';\n");
    write_file(&src.join("test-utils/firestore-mock.ts"), "export function createMockFirestore() {}\n");
    for i in 0..importers {
        write_file(
            &src.join(format!("services/importer-{i}.test.ts")),
            "import { createMockFirestore } from '../test-utils/index.js';\n",
        );
    }
}

fn write_file(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().expect("parent exists")).unwrap();
    fs::write(path, content).unwrap();
}
