use std::sync::LazyLock;

use regex::Regex;

use crate::checks::violation::Violation;
use crate::checks::{read_source, CheckResult};
use crate::config::LinterConfig;
use crate::scan::routes::{extract_routes, HttpMethod, RouteRegistration};
use crate::walker;

pub const NAME: &str = "Schema-at-boundary";

/// State-transition endpoints that take no request body.
pub const ACTION_SUFFIXES: &[&str] = &[
    "/start",
    "/complete",
    "/skip",
    "/cancel",
    "/unlog",
    "/remove",
    "/finalize",
    "/add",
    "/sync",
    "/generate",
    "/backfill-streams",
];

static VALIDATION_EVIDENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bvalidate\s*\(|\.safeParse\s*\(|\w*[Ss]chema\.parse\s*\(").unwrap()
});

/// Resource routers validate every write route internally.
static RESOURCE_ROUTER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"createResourceRouter").unwrap());

const SCHEMA_DIR: &str = "packages/functions/src/schemas/";

fn is_action_route(path: &str) -> bool {
    ACTION_SUFFIXES.iter().any(|suffix| path.ends_with(suffix))
}

fn unvalidated_routes(content: &str) -> Vec<RouteRegistration> {
    if RESOURCE_ROUTER.is_match(content) {
        return Vec::new();
    }
    extract_routes(content, HttpMethod::is_write)
        .into_iter()
        .filter(|route| !is_action_route(&route.path))
        .filter(|route| !VALIDATION_EVIDENCE.is_match(&content[route.block.clone()]))
        .collect()
}

pub fn check(config: &LinterConfig) -> CheckResult {
    let files = walker::list_files(&config.handlers_dir(), walker::is_ts_source_file);
    let mut violations = Vec::new();

    for file in &files {
        let Some(content) = read_source(config, file, &mut violations) else {
            continue;
        };
        let rel = config.relative(file);

        for route in unvalidated_routes(&content) {
            let verb = route.method.as_lower();
            violations.push(
                Violation::at(
                    format!("{rel}:{}", route.line),
                    format!("has a {} route at '{}' without Zod validation.", route.method, route.path),
                )
                .rule("Every POST/PUT/PATCH handler must validate its request body with a Zod schema at the boundary.")
                .steps([
                    format!("Create or find a Zod schema in {SCHEMA_DIR} (e.g. {SCHEMA_DIR}<resource>.schema.ts)."),
                    "Import { validate } from '../middleware/validate.js' in the handler.".to_string(),
                    format!(
                        "Add validate(yourSchema) as middleware: app.{verb}('{}', validate(yourSchema), asyncHandler(...)).",
                        route.path
                    ),
                ])
                .example([
                    "// packages/functions/src/schemas/exercise.schema.ts",
                    "export const createExerciseSchema = z.object({ name: z.string().min(1) });",
                    "// packages/functions/src/handlers/exercises.ts",
                    "app.post('/exercises', validate(createExerciseSchema), asyncHandler(...));",
                ])
                .see("docs/conventions/api-patterns.md")
                .into(),
            );
        }
    }

    CheckResult::from_violations(NAME, violations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_validate_middleware_and_safe_parse() {
        let content = "\
app.post('/a', validate(aSchema), asyncHandler(a));
app.put('/b/:id', asyncHandler(async (req) => {
  const parsed = bSchema.safeParse(req.body);
}));
app.patch('/c/:id', asyncHandler(async (req) => {
  const body = updateCSchema.parse(req.body);
}));
";
        assert!(unvalidated_routes(content).is_empty());
    }

    #[test]
    fn flags_bare_write_routes_but_not_actions_or_reads() {
        let content = "\
app.get('/a', asyncHandler(list));
app.post('/a', asyncHandler(create));
app.post('/a/:id/start', asyncHandler(start));
app.delete('/a/:id', asyncHandler(remove));
";
        let routes = unvalidated_routes(content);
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].path, "/a");
        assert_eq!(routes[0].line, 2);
    }

    #[test]
    fn resource_router_modules_are_exempt() {
        let content = "createResourceRouter({ resourceName: 'plans' });\napp.post('/x', h);\n";
        assert!(unvalidated_routes(content).is_empty());
    }
}
