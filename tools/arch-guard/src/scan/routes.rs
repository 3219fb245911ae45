use std::fmt;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use super::LineIndex;

static REGISTRATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bapp\.(get|post|put|patch|delete)\(\s*['"`]([^'"`]+)['"`]"#).unwrap()
});

static ANY_REGISTRATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bapp\.(get|post|put|patch|delete)\s*\(").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    fn parse(verb: &str) -> Option<Self> {
        match verb {
            "get" => Some(Self::Get),
            "post" => Some(Self::Post),
            "put" => Some(Self::Put),
            "patch" => Some(Self::Patch),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }

    /// Verbs that carry a request body worth validating.
    pub fn is_write(self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }

    pub fn as_lower(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Patch => "patch",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_lower().to_ascii_uppercase())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRegistration {
    pub method: HttpMethod,
    pub path: String,
    pub line: usize,
    /// Byte range from this registration up to the next one of the same
    /// selection (or end of file). Stands in for the handler body.
    pub block: Range<usize>,
}

/// `app.<verb>('<path>', ...)` registrations accepted by `select`, in source
/// order. Registrations split across statements are not seen.
pub fn extract_routes(content: &str, select: impl Fn(HttpMethod) -> bool) -> Vec<RouteRegistration> {
    let index = LineIndex::new(content);
    let mut routes: Vec<RouteRegistration> = REGISTRATION
        .captures_iter(content)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let method = HttpMethod::parse(caps.get(1)?.as_str())?;
            let path = caps.get(2)?.as_str().to_string();
            Some(RouteRegistration {
                method,
                path,
                line: index.line_of(whole.start()),
                block: whole.start()..content.len(),
            })
        })
        .filter(|r| select(r.method))
        .collect();

    let starts: Vec<usize> = routes.iter().map(|r| r.block.start).collect();
    for (route, next_start) in routes.iter_mut().zip(starts.into_iter().skip(1)) {
        route.block.end = next_start;
    }
    routes
}

/// Whether the module registers any express route at all.
pub fn registers_routes(content: &str) -> bool {
    ANY_REGISTRATION.is_match(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HANDLER: &str = "\
const app = createBaseApp('exercises');
app.get('/exercises', asyncHandler(list));
app.post('/exercises', validate(createExerciseSchema), asyncHandler(create));
app.put(
  '/exercises/:id',
  asyncHandler(update),
);
";

    #[test]
    fn write_routes_get_blocks_up_to_the_next_write_route() {
        let routes = extract_routes(HANDLER, HttpMethod::is_write);
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].method, HttpMethod::Post);
        assert_eq!(routes[0].line, 3);
        assert!(HANDLER[routes[0].block.clone()].contains("validate("));
        assert!(!HANDLER[routes[1].block.clone()].contains("validate("));
        assert_eq!(routes[1].path, "/exercises/:id");
        assert_eq!(routes[1].line, 4);
        assert_eq!(routes[1].block.end, HANDLER.len());
    }

    #[test]
    fn all_verbs_are_selectable() {
        let routes = extract_routes(HANDLER, |_| true);
        let methods: Vec<String> = routes.iter().map(|r| r.method.to_string()).collect();
        assert_eq!(methods, vec!["GET", "POST", "PUT"]);
    }

    #[test]
    fn detects_route_presence() {
        assert!(registers_routes(HANDLER));
        assert!(!registers_routes("export const helper = () => 1;"));
    }
}
