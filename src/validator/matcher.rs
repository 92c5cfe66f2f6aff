//! Content matching for rendered resources.
//!
//! A check is a string whose prefix selects how it matches a line:
//!
//! - `glob:<pattern>` - wildcard pattern (`*`, `?`, `[...]`) found in the line
//! - `regex:<pattern>` - regular expression search
//! - anything else - case-sensitive substring
//!
//! Patterns that fail to compile degrade to substring matching on the raw
//! pattern text instead of failing the run.

use crate::validator::types::{CONTEXT_LINES, Resource, Violation};
use glob::{MatchOptions, Pattern};
use regex::Regex;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

const GLOB_PREFIX: &str = "glob:";
const REGEX_PREFIX: &str = "regex:";

const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// A parsed check expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CheckSpec {
    Literal(String),
    Glob(String),
    Regex(String),
}

impl CheckSpec {
    /// Parse a check expression by its prefix.
    pub fn parse(check: &str) -> Self {
        if let Some(pattern) = check.strip_prefix(GLOB_PREFIX) {
            Self::Glob(pattern.to_string())
        } else if let Some(pattern) = check.strip_prefix(REGEX_PREFIX) {
            Self::Regex(pattern.to_string())
        } else {
            Self::Literal(check.to_string())
        }
    }

    /// The pattern text without its prefix.
    pub fn pattern(&self) -> &str {
        match self {
            Self::Literal(p) | Self::Glob(p) | Self::Regex(p) => p,
        }
    }

    /// Compile into a line matcher.
    pub fn compile(&self) -> Check {
        let matcher = match self {
            Self::Literal(p) => LineMatcher::Literal(p.clone()),
            Self::Glob(p) => LineMatcher::glob(p),
            Self::Regex(p) => LineMatcher::regex(p),
        };
        Check {
            pattern: self.pattern().to_string(),
            matcher,
        }
    }
}

impl FromStr for CheckSpec {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for CheckSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(p) => write!(f, "{}", p),
            Self::Glob(p) => write!(f, "{}{}", GLOB_PREFIX, p),
            Self::Regex(p) => write!(f, "{}{}", REGEX_PREFIX, p),
        }
    }
}

/// A compiled single-line predicate.
#[derive(Debug, Clone)]
pub enum LineMatcher {
    Literal(String),
    Glob(Pattern),
    Regex(Regex),
}

impl LineMatcher {
    fn glob(pattern: &str) -> Self {
        // Surrounding `*` turns the whole-string glob into a search.
        // Star runs collapse to one, `**` is only valid as a path component.
        let mut body = String::with_capacity(pattern.len());
        for c in pattern.trim_matches('*').chars() {
            if c == '*' && body.ends_with('*') {
                continue;
            }
            body.push(c);
        }
        let search = format!("*{}*", body);
        match Pattern::new(&search) {
            Ok(compiled) => Self::Glob(compiled),
            Err(e) => {
                log::debug!("glob '{}' invalid ({}), matching literally", pattern, e);
                Self::Literal(pattern.to_string())
            }
        }
    }

    fn regex(pattern: &str) -> Self {
        match Regex::new(pattern) {
            Ok(compiled) => Self::Regex(compiled),
            Err(e) => {
                log::debug!("regex '{}' invalid ({}), matching literally", pattern, e);
                Self::Literal(pattern.to_string())
            }
        }
    }

    /// Check a single line.
    pub fn matches(&self, line: &str) -> bool {
        match self {
            Self::Literal(p) => line.contains(p.as_str()),
            Self::Glob(p) => p.matches_with(line, GLOB_OPTIONS),
            Self::Regex(re) => re.is_match(line),
        }
    }
}

/// A check ready to run against resources.
#[derive(Debug, Clone)]
pub struct Check {
    /// Pattern text reported in violations.
    pub pattern: String,
    pub matcher: LineMatcher,
}

impl Check {
    /// Find the first line of `resource` matching this check.
    pub fn scan(&self, resource: &Resource) -> Option<Violation> {
        scan(resource, self)
    }
}

/// Compile a check expression such as `PATCH_ME`, `glob:TODO*` or `regex:\bdev\b`.
pub fn compile_check(check: &str) -> Check {
    CheckSpec::parse(check).compile()
}

/// Scan a resource line by line and stop at the first match.
pub fn scan(resource: &Resource, check: &Check) -> Option<Violation> {
    let lines: Vec<&str> = resource.content.split('\n').collect();

    let index = lines.iter().position(|line| check.matcher.matches(line))?;

    Some(Violation {
        resource: resource.clone(),
        pattern: check.pattern.clone(),
        line_number: index + 1,
        matched_line: lines[index].to_string(),
        context: extract_context(&lines, index, CONTEXT_LINES),
    })
}

/// Lines surrounding `target`, clamped to the content bounds.
fn extract_context(lines: &[&str], target: usize, radius: usize) -> Vec<String> {
    let start = target.saturating_sub(radius);
    let end = (target + radius + 1).min(lines.len());
    lines[start..end].iter().map(|l| l.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::types::DEFAULT_NAMESPACE;
    use proptest::prelude::*;
    use std::path::PathBuf;

    const POD: &str = "apiVersion: v1\nkind: Pod\nmetadata:\n  name: my-app\n  labels:\n    app: PATCH_ME\n";

    const SERVICE: &str = "apiVersion: v1\nkind: Service\nmetadata:\n  name: my-service\nspec:\n  selector:\n\tapp: a text with PATCH_ME inside\n";

    const CONFIG_MAP: &str = "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: config\ndata:\n  image: myapp:latest\n  tag: v1.0.0\n  debug: true\n";

    const SECRET: &str = "apiVersion: v1\nkind: Secret\nmetadata:\n  name: credentials\ndata:\n  password: CHANGE_ME_password\n  token: CHANGE_ME_token\n";

    const DEPLOYMENT: &str = "apiVersion: v1\nkind: Deployment\nmetadata:\n  name: app\nspec:\n  template:\n    spec:\n      containers:\n      - name: app-abc\n        image: nginx:latest\n        env:\n        - name: ENV\n          value: dev\n";

    const ANNOTATED: &str = "apiVersion: v1\nkind: Pod\nmetadata:\n  name: test\n  annotations:\n    todo: TODO fix this later\n    note: FIXME before release\ndata:\n  value: PATCH_ME_NOW\n";

    fn resource(content: &str) -> Resource {
        Resource {
            api_version: "v1".to_string(),
            kind: "Pod".to_string(),
            name: "my-app".to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            source_path: PathBuf::from("example"),
            content: content.to_string(),
        }
    }

    fn hits(content: &str, check: &str) -> bool {
        compile_check(check).scan(&resource(content)).is_some()
    }

    #[test]
    fn test_parse_prefixes() {
        assert_eq!(CheckSpec::parse("PATCH_ME"), CheckSpec::Literal("PATCH_ME".into()));
        assert_eq!(CheckSpec::parse("glob:TODO*"), CheckSpec::Glob("TODO*".into()));
        assert_eq!(
            CheckSpec::parse(r"regex:\bdev\b"),
            CheckSpec::Regex(r"\bdev\b".into())
        );
        // Prefix must be at the very start
        assert_eq!(
            CheckSpec::parse(" glob:x"),
            CheckSpec::Literal(" glob:x".into())
        );
        assert_eq!(CheckSpec::parse("glob:TODO*").to_string(), "glob:TODO*");
    }

    #[test]
    fn test_literal_violation_details() {
        let violation = compile_check("PATCH_ME").scan(&resource(POD)).unwrap();
        assert_eq!(violation.pattern, "PATCH_ME");
        assert_eq!(violation.line_number, 6);
        assert!(violation.matched_line.contains("PATCH_ME"));
        assert_eq!(
            violation.context,
            vec!["  name: my-app", "  labels:", "    app: PATCH_ME", ""]
        );
    }

    #[test]
    fn test_context_clamped_at_start() {
        let violation = compile_check("apiVersion").scan(&resource(POD)).unwrap();
        assert_eq!(violation.line_number, 1);
        assert_eq!(violation.context, vec!["apiVersion: v1", "kind: Pod", "metadata:"]);
        assert_eq!(violation.context_start(), 1);
    }

    #[test]
    fn test_first_match_wins() {
        let violation = compile_check("CHANGE_ME").scan(&resource(SECRET)).unwrap();
        assert_eq!(violation.line_number, 6);
        assert!(violation.matched_line.contains("password"));
    }

    #[test]
    fn test_literal_checks() {
        assert!(hits(POD, "PATCH_ME"));
        assert!(!hits(POD, "abcdef"));
        assert!(hits(SERVICE, "PATCH_ME"));
        assert!(hits(ANNOTATED, "TODO"));
        assert!(hits(ANNOTATED, "FIXME"));
        assert!(hits(CONFIG_MAP, "debug: true"));
        assert!(hits(CONFIG_MAP, ":latest"));
        assert!(hits(DEPLOYMENT, "value: dev"));
        assert!(!hits("", "PATCH_ME"));
        assert!(hits("data: PATCH_ME and PATCH_ME again", "PATCH_ME"));
        assert!(hits("PATCH_ME: value", "PATCH_ME"));
        assert!(hits("value: PATCH_ME", "PATCH_ME"));
        assert!(!hits(POD, "patch_me"));
    }

    #[test]
    fn test_glob_checks() {
        assert!(hits(POD, "glob:PAT*_ME"));
        assert!(hits(DEPLOYMENT, "glob:app-*"));
        assert!(hits(SECRET, "glob:CHANGE_ME*"));
        assert!(hits(ANNOTATED, "glob:PATCH_ME*"));
        assert!(!hits(POD, "glob:NOMATCH*"));
        assert!(hits(ANNOTATED, "glob:TODO*"));
        assert!(hits(DEPLOYMENT, "glob:*:latest"));
        assert!(hits(CONFIG_MAP, "glob:tag: v?.0.0"));
        assert!(!hits(POD, "glob:patch*"));
    }

    #[test]
    fn test_repeated_stars_are_collapsed() {
        assert!(matches!(compile_check("glob:PATCH**ME").matcher, LineMatcher::Glob(_)));
        assert!(hits(POD, "glob:PATCH**ME"));
        assert!(hits(POD, "glob:**PATCH***_ME**"));
        assert!(!hits(POD, "glob:PATCH**YOU"));

        let violation = compile_check("glob:PATCH**ME").scan(&resource(POD)).unwrap();
        assert_eq!(violation.pattern, "PATCH**ME");
    }

    #[test]
    fn test_glob_reports_pattern_without_prefix() {
        let violation = compile_check("glob:PAT*_ME").scan(&resource(POD)).unwrap();
        assert_eq!(violation.pattern, "PAT*_ME");
        assert_eq!(violation.line_number, 6);
    }

    #[test]
    fn test_invalid_glob_falls_back_to_literal() {
        assert!(matches!(compile_check("glob:[abc").matcher, LineMatcher::Literal(_)));
        assert!(hits("value: [abc", "glob:[abc"));
        assert!(!hits(POD, "glob:[abc"));
    }

    #[test]
    fn test_regex_checks() {
        assert!(hits(POD, r"regex:\bPATCH_ME\b"));
        assert!(hits(SERVICE, r"regex:\bPATCH_ME\b"));
        assert!(!hits("PATCH_ME_NOW", r"regex:\bPATCH_ME\b"));
        assert!(!hits(ANNOTATED, r"regex:\bPATCH_ME\b"));
        assert!(hits(CONFIG_MAP, r"regex::latest\b"));
        assert!(hits(DEPLOYMENT, r"regex:\bdev\b"));
        assert!(hits(ANNOTATED, r"regex:TODO\s+"));
        assert!(hits(ANNOTATED, r"regex:FIXME\s+"));
        assert!(hits(SECRET, r"regex:CHANGE_ME_\w+"));
        assert!(hits(CONFIG_MAP, r"regex:debug:\s*true"));
        assert!(!hits(POD, r"regex:\bNOMATCH\b"));
        assert!(!hits(POD, "regex:patch_me"));
    }

    #[test]
    fn test_invalid_regex_falls_back_to_literal() {
        let check = compile_check("regex:[invalid");
        assert!(matches!(check.matcher, LineMatcher::Literal(ref p) if p == "[invalid"));
        assert!(!hits(POD, "regex:[invalid"));
        assert!(hits("key: [invalid", "regex:[invalid"));
    }

    #[test]
    fn test_scan_is_repeatable() {
        let check = compile_check("glob:*PATCH*");
        let res = resource(POD);
        assert_eq!(check.scan(&res), check.scan(&res));
    }

    proptest! {
        #[test]
        fn prop_literal_is_substring(line in "[a-zA-Z_: ]{0,40}", needle in "[a-zA-Z_]{1,6}") {
            let check = compile_check(&needle);
            prop_assert_eq!(check.matcher.matches(&line), line.contains(needle.as_str()));
        }

        #[test]
        fn prop_broken_regex_behaves_like_literal(line in "[a-z(\\[ ]{0,30}", body in "[a-z]{0,5}") {
            let pattern = format!("({}", body);
            let as_regex = compile_check(&format!("regex:{}", pattern));
            let as_literal = compile_check(&pattern);
            prop_assert_eq!(as_regex.matcher.matches(&line), as_literal.matcher.matches(&line));
        }

        #[test]
        fn prop_valid_regex_agrees_with_regex_crate(line in "[a-z0-9 ]{0,30}", word in "[a-z]{1,4}") {
            let pattern = format!(r"\b{}\d*", word);
            let check = compile_check(&format!("regex:{}", pattern));
            let re = Regex::new(&pattern).unwrap();
            prop_assert_eq!(check.matcher.matches(&line), re.is_match(&line));
        }
    }
}
