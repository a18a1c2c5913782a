//! Path lookup: `a[b][0][c]` / `0[key6][one]` style traversal.

use crate::Value;

/// Resolves `path` against `root`. Tokenizes on `[`/`]`; a leading bare
/// identifier with no brackets is equivalent to a one-element path. Any
/// failure along the way (no such key, index out of range, non-numeric
/// index into an array, indexing into a scalar) yields `Undefined` rather
/// than an error — path lookup never fails loudly.
#[must_use]
pub fn resolve<'v>(path: &str, root: &'v Value) -> &'v Value {
    resolve_tokens(&tokenize(path), root)
}

/// Resolves an already-tokenized path. Exposed so callers that need to
/// intercept the leading token (e.g. a loop binding a name to a subtree)
/// can split it off and resolve only the remainder against a different
/// starting value.
#[must_use]
pub fn resolve_tokens<'v>(tokens: &[&str], root: &'v Value) -> &'v Value {
    static UNDEFINED: Value = Value::Undefined;

    let mut current = root;
    for token in tokens {
        current = match current {
            Value::Object(fields) => match fields.get(token) {
                Some(value) => value,
                None => return &UNDEFINED,
            },
            Value::Array(items) => match token.parse::<usize>().ok().and_then(|index| items.get(index)) {
                Some(value) => value,
                None => return &UNDEFINED,
            },
            _ => return &UNDEFINED,
        };
    }
    current
}

/// Splits a path into its key/index tokens. `a[b][0]` -> `["a", "b", "0"]`;
/// a bare `a` with no brackets is the single token `["a"]`.
#[must_use]
pub fn tokenize(path: &str) -> Vec<&str> {
    let Some(bracket_start) = path.find('[') else {
        return if path.is_empty() { Vec::new() } else { vec![path] };
    };

    let mut tokens = Vec::new();
    if bracket_start > 0 {
        tokens.push(&path[..bracket_start]);
    }

    let mut rest = &path[bracket_start..];
    while let Some(stripped) = rest.strip_prefix('[') {
        let Some(end) = stripped.find(']') else { break };
        tokens.push(&stripped[..end]);
        rest = &stripped[end + 1..];
    }
    tokens
}
