//! Type signature parsing for gocode candidates
//!
//! gocode renders function types as plain text, e.g.
//! `func(a, b int) (c string, err error)`. This module parses that rendering
//! into a structured signature the snippet generator can walk. Parsing is
//! total: anything outside the `func(...)` grammar degrades to an opaque,
//! non-function signature carrying the raw text.
//!
//! The grammar is comma/paren delimited and nests arbitrarily: a parameter or
//! return value may itself be a function type. Splitting on `", "` alone is
//! wrong whenever a nested function type contains commas, so the split is
//! repaired afterwards at matching-paren boundaries.

const FUNC_PREFIX: &str = "func(";

/// Nesting cap for pathological input. Past this depth the parse degrades to
/// an opaque signature instead of recursing further.
const MAX_NESTING_DEPTH: usize = 32;

/// A single parameter or return value in a parsed signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Identifier, empty for anonymous/unnamed parameters.
    pub identifier: String,
    /// The full original text segment for this parameter.
    pub display_name: String,
    /// Plain type text, or a nested signature for function-typed parameters.
    pub kind: ParameterKind,
}

/// Tagged parameter type: plain type text or a nested function signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterKind {
    Plain(String),
    Function(Box<Signature>),
}

impl Parameter {
    pub fn is_function(&self) -> bool {
        matches!(self.kind, ParameterKind::Function(_))
    }

    /// The plain type text, when this parameter is not function-typed.
    pub fn plain_type(&self) -> Option<&str> {
        match &self.kind {
            ParameterKind::Plain(ty) => Some(ty),
            ParameterKind::Function(_) => None,
        }
    }

    /// Whether this parameter's type text begins with the ellipsis token.
    pub fn is_variadic(&self) -> bool {
        self.plain_type().is_some_and(|ty| ty.starts_with("..."))
    }
}

/// A parsed type signature.
///
/// Non-function types are represented as a degenerate signature with
/// `is_function == false`, the raw text in `name`, and empty parameter and
/// return sequences.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Signature {
    pub is_function: bool,
    /// The original type text.
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub returns: Vec<Parameter>,
}

impl Signature {
    fn opaque(name: &str) -> Self {
        Signature {
            is_function: false,
            name: name.to_string(),
            parameters: Vec::new(),
            returns: Vec::new(),
        }
    }
}

/// Parse a raw gocode type string into a structured signature.
///
/// Total function: empty or unparseable input yields a non-function
/// signature whose `name` is the raw input.
pub fn parse_type(raw: &str) -> Signature {
    parse_type_at_depth(raw, 0)
}

fn parse_type_at_depth(raw: &str, depth: usize) -> Signature {
    if raw.is_empty() || !raw.starts_with(FUNC_PREFIX) || depth > MAX_NESTING_DEPTH {
        return Signature::opaque(raw);
    }

    // The paren opening the parameter list is the one in the `func(` token.
    let open = FUNC_PREFIX.len() - 1;
    let Some(close) = matching_paren(raw, open) else {
        return Signature::opaque(raw);
    };
    let params_text = &raw[open + 1..close];

    // Returns are everything after `") "`. A leading paren wraps a tuple of
    // comma-joined returns; a single return has no wrapping parens.
    let rest = &raw[close + 1..];
    let returns_text = rest.strip_prefix(' ').unwrap_or("");
    let returns_text = returns_text
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
        .unwrap_or(returns_text);

    Signature {
        is_function: true,
        name: raw.to_string(),
        parameters: parse_parameter_list(params_text, depth),
        returns: parse_parameter_list(returns_text, depth),
    }
}

/// Find the index of the paren matching the opening paren at `open`.
///
/// The single matching primitive behind every nested paren scan in this
/// module.
pub(crate) fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, b) in text.bytes().enumerate().skip(open) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn parens_balanced(segment: &str) -> bool {
    let mut depth = 0i32;
    for b in segment.bytes() {
        match b {
            b'(' => depth += 1,
            b')' => depth -= 1,
            _ => {}
        }
    }
    depth == 0
}

/// Split a parameter-list text into ordered parameters.
///
/// First approximation splits on the literal `", "`; any split that landed
/// inside a nested `func(...)` leaves unbalanced parens in the preceding
/// segment and is re-joined. Grouped identifiers sharing one type
/// (`a, b int`) stay as two separate segments, matching gocode's own
/// comma-separated rendering.
fn parse_parameter_list(text: &str, depth: usize) -> Vec<Parameter> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut segments: Vec<String> = Vec::new();
    for piece in text.split(", ") {
        match segments.last_mut() {
            Some(last) if !parens_balanced(last) => {
                last.push_str(", ");
                last.push_str(piece);
            }
            _ => segments.push(piece.to_string()),
        }
    }

    segments
        .iter()
        .map(|segment| parse_parameter(segment, depth))
        .collect()
}

fn parse_parameter(segment: &str, depth: usize) -> Parameter {
    // Anonymous function parameter: no identifier, the whole segment is the
    // function type.
    if segment.starts_with(FUNC_PREFIX) {
        return Parameter {
            identifier: String::new(),
            display_name: segment.to_string(),
            kind: ParameterKind::Function(Box::new(parse_type_at_depth(segment, depth + 1))),
        };
    }

    match segment.split_once(' ') {
        // Bare type with no identifier.
        None => Parameter {
            identifier: String::new(),
            display_name: segment.to_string(),
            kind: ParameterKind::Plain(segment.to_string()),
        },
        Some((identifier, type_text)) => {
            let kind = if type_text.starts_with(FUNC_PREFIX) {
                ParameterKind::Function(Box::new(parse_type_at_depth(type_text, depth + 1)))
            } else {
                ParameterKind::Plain(type_text.to_string())
            };
            Parameter {
                identifier: identifier.to_string(),
                display_name: segment.to_string(),
                kind,
            }
        }
    }
}
