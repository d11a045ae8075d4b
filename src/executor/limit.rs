use once_cell::sync::Lazy;
use regex::Regex;

/// Hard ceiling on rows returned or displayed per query.
pub const MAX_RESULT_ROWS: usize = 1000;

static LIMIT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bLIMIT\s+(\d+)\s*(?:OFFSET\s+\d+\s*|,\s*\d+\s*)?;?\s*$")
        .expect("limit pattern regex is valid")
});

#[derive(Debug, Clone, PartialEq)]
pub struct LimitRewrite {
    pub sql: String,
    /// True when the rewrite constrained the statement below what an
    /// unconstrained run would have returned.
    pub limited: bool,
}

/// Enforce a trailing `LIMIT` ceiling on a statement. This is a textual
/// rewrite of the trailing clause, not a SQL parse: well-formed single
/// statements with conventional `LIMIT n [OFFSET m | , m]` syntax are
/// handled; anything else rides through untouched.
pub fn enforce_limit(sql: &str, max: usize) -> LimitRewrite {
    let trimmed = sql.trim();

    let Some(caps) = LIMIT_PATTERN.captures(trimmed) else {
        let stripped = trimmed.trim_end_matches(';').trim_end();
        return LimitRewrite {
            sql: format!("{} LIMIT {}", stripped, max),
            limited: true,
        };
    };

    let literal = caps.get(1).expect("limit pattern has a capture group");
    let within_cap = literal
        .as_str()
        .parse::<usize>()
        .map(|n| n <= max)
        .unwrap_or(false);

    if within_cap {
        return LimitRewrite {
            sql: trimmed.to_string(),
            limited: false,
        };
    }

    let mut sql = String::with_capacity(trimmed.len());
    sql.push_str(&trimmed[..literal.start()]);
    sql.push_str(&max.to_string());
    sql.push_str(&trimmed[literal.end()..]);
    LimitRewrite { sql, limited: true }
}
