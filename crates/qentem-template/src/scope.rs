//! Loop-local name bindings. A loop's `value="NAME"` introduces a binding
//! visible to everything in its body, including nested loops and ifs;
//! bindings from enclosing loops stay visible by name (innermost wins on a
//! clash). Bindings own their value rather than borrowing it, since a
//! grouped loop binds a name to a freshly assembled array that has no
//! counterpart anywhere in the original tree.

use qentem_value::{resolve, resolve_tokens, tokenize, Value};

#[derive(Default)]
pub struct Scope {
    bindings: Vec<(String, Value)>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: String, value: Value) {
        self.bindings.push((name, value));
    }

    pub fn pop(&mut self) {
        self.bindings.pop();
    }

    /// Resolves `path` against the innermost binding whose name matches the
    /// path's leading token; falls back to `root` when nothing matches.
    #[must_use]
    pub fn resolve<'v>(&'v self, path: &str, root: &'v Value) -> &'v Value {
        let tokens = tokenize(path);
        let Some((first, rest)) = tokens.split_first() else {
            return root;
        };
        for (name, value) in self.bindings.iter().rev() {
            if name == first {
                return resolve_tokens(rest, value);
            }
        }
        resolve(path, root)
    }
}
