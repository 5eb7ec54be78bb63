//! Snippet synthesis for function-typed completion candidates
//!
//! Turns a parsed [`Signature`](super::signature::Signature) and a call name
//! into two aligned strings: an editable snippet with numbered tab-stops
//! (`${1:a}`, `${2:b int}`, ...) and a plain display string. Tab-stop numbers
//! increase monotonically with left-to-right scan order, including through
//! recursive descent into nested function-typed parameters.
//!
//! Escaping: the literal two-character sequence `{}` in any parameter or
//! return type becomes `{\}` in the snippet so the snippet engine does not
//! treat it as an empty placeholder. Display text is never escaped.

use serde::Deserialize;

use super::signature::{Parameter, ParameterKind, Signature};

/// How much per-argument detail a generated snippet carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SnippetMode {
    /// Each argument tab-stop holds the full declared text (`b int`).
    #[default]
    FullNames,
    /// Each argument tab-stop holds just the identifier (`b`).
    IdentifiersOnly,
    /// A single tab-stop inside the parens, no per-argument detail.
    None,
}

/// A generated snippet and its aligned display string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSnippet {
    pub snippet: String,
    pub display_text: String,
}

/// Generate an editable snippet and display text for a call to `name`.
///
/// Without a function signature the snippet is just the call parens with a
/// single trailing cursor stop. The final parameter is elided from the
/// snippet (but kept in the display text) when it is variadic; editors fill
/// those positions manually.
pub fn generate(name: &str, signature: Option<&Signature>, mode: SnippetMode) -> GeneratedSnippet {
    let Some(signature) = signature.filter(|s| s.is_function) else {
        return GeneratedSnippet {
            snippet: format!("{name}()$0"),
            display_text: format!("{name}()"),
        };
    };

    let display_args: Vec<&str> = signature
        .parameters
        .iter()
        .map(|p| p.display_name.as_str())
        .collect();
    let display_text = format!("{name}({})", display_args.join(", "));

    if matches!(mode, SnippetMode::None) {
        return GeneratedSnippet {
            snippet: format!("{name}($1)$0"),
            display_text,
        };
    }

    let mut stop = 0usize;
    let last = signature.parameters.len().saturating_sub(1);
    let mut parts: Vec<String> = Vec::with_capacity(signature.parameters.len());
    for (i, param) in signature.parameters.iter().enumerate() {
        // Variadic final parameter: display only, no tab-stop.
        if i == last && param.is_variadic() {
            continue;
        }
        parts.push(emit_parameter(param, mode, &mut stop));
    }

    GeneratedSnippet {
        snippet: format!("{name}({})$0", parts.join(", ")),
        display_text,
    }
}

/// Render a return list the way gocode displays it: nothing, a single bare
/// type, or a parenthesized comma list.
pub(crate) fn render_returns(returns: &[Parameter]) -> String {
    match returns {
        [] => String::new(),
        [single] => single.display_name.clone(),
        multiple => {
            let joined: Vec<&str> = multiple.iter().map(|r| r.display_name.as_str()).collect();
            format!("({})", joined.join(", "))
        }
    }
}

fn emit_parameter(param: &Parameter, mode: SnippetMode, stop: &mut usize) -> String {
    match &param.kind {
        ParameterKind::Plain(_) => {
            *stop += 1;
            let label = match mode {
                SnippetMode::IdentifiersOnly if !param.identifier.is_empty() => &param.identifier,
                _ => &param.display_name,
            };
            format!("${{{}:{}}}", stop, escape(label))
        }
        ParameterKind::Function(inner) => emit_function(inner, mode, stop),
    }
}

/// Emit a nested function literal: an unescaped `func(` token, the inner
/// parameters as further tab-stops, the return text, and a final tab-stop
/// standing for the function body inside an escaped brace pair.
fn emit_function(signature: &Signature, mode: SnippetMode, stop: &mut usize) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(signature.parameters.len());
    for param in &signature.parameters {
        parts.push(emit_parameter(param, mode, stop));
    }

    let returns = render_returns(&signature.returns);
    let returns = if returns.is_empty() {
        String::new()
    } else {
        format!(" {}", escape(&returns))
    };

    *stop += 1;
    format!("func({}){} {{\n\t${}\n\\}}", parts.join(", "), returns, stop)
}

/// Escape literal `{}` pairs so the snippet engine does not read them as an
/// empty placeholder. Applied as the last step before emission, never to
/// display text.
fn escape(text: &str) -> String {
    text.replace("{}", "{\\}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suggest::signature::parse_type;

    fn full(name: &str, raw: &str) -> GeneratedSnippet {
        generate(name, Some(&parse_type(raw)), SnippetMode::FullNames)
    }

    #[test]
    fn no_signature_yields_bare_call() {
        let generated = generate("Now", None, SnippetMode::FullNames);
        assert_eq!(generated.snippet, "Now()$0");
        assert_eq!(generated.display_text, "Now()");
    }

    #[test]
    fn grouped_parameters_keep_scan_order() {
        let generated = full("Foo", "func(a, b int) string");
        assert_eq!(generated.snippet, "Foo(${1:a}, ${2:b int})$0");
        assert_eq!(generated.display_text, "Foo(a, b int)");
    }

    #[test]
    fn identifiers_only_mode_uses_identifiers() {
        let sig = parse_type("func(a, b int) string");
        let generated = generate("Foo", Some(&sig), SnippetMode::IdentifiersOnly);
        assert_eq!(generated.snippet, "Foo(${1:a}, ${2:b})$0");
    }

    #[test]
    fn none_mode_collapses_to_a_single_stop() {
        let sig = parse_type("func(a, b int) string");
        let generated = generate("Foo", Some(&sig), SnippetMode::None);
        assert_eq!(generated.snippet, "Foo($1)$0");
        assert_eq!(generated.display_text, "Foo(a, b int)");
    }

    #[test]
    fn nested_function_parameter() {
        let generated = full("Walk", "func(cb func(int) string) bool");
        assert_eq!(
            generated.snippet,
            "Walk(func(${1:int}) string {\n\t$2\n\\})$0"
        );
        assert!(generated.snippet.contains("func("));
        assert_eq!(generated.display_text, "Walk(cb func(int) string)");
    }

    #[test]
    fn nested_function_with_sibling_parameter_numbers_monotonically() {
        let generated = full("HandleFunc", "func(pattern string, handler func(w http.ResponseWriter, r *http.Request))");
        assert_eq!(
            generated.snippet,
            "HandleFunc(${1:pattern string}, func(${2:w http.ResponseWriter}, ${3:r *http.Request}) {\n\t$4\n\\})$0"
        );
        assert_eq!(
            generated.display_text,
            "HandleFunc(pattern string, handler func(w http.ResponseWriter, r *http.Request))"
        );
    }

    #[test]
    fn variadic_final_parameter_is_elided_from_snippet_only() {
        let generated = full("Printf", "func(format string, a ...interface{}) (n int, err error)");
        assert_eq!(generated.snippet, "Printf(${1:format string})$0");
        assert_eq!(
            generated.display_text,
            "Printf(format string, a ...interface{})"
        );
    }

    #[test]
    fn variadic_only_parameter_leaves_empty_parens() {
        let generated = full("Println", "func(a ...interface{}) (n int, err error)");
        assert_eq!(generated.snippet, "Println()$0");
        assert_eq!(generated.display_text, "Println(a ...interface{})");
    }

    #[test]
    fn braces_are_escaped_in_snippet_but_not_display() {
        let generated = full("Do", "func(v interface{}) error");
        assert_eq!(generated.snippet, "Do(${1:v interface{\\}})$0");
        assert_eq!(generated.display_text, "Do(v interface{})");
    }

    #[test]
    fn nested_function_return_text_is_escaped() {
        let generated = full("Each", "func(f func(k string) interface{})");
        assert_eq!(
            generated.snippet,
            "Each(func(${1:k string}) interface{\\} {\n\t$2\n\\})$0"
        );
    }

    #[test]
    fn multiple_returns_render_parenthesized() {
        assert_eq!(render_returns(&[]), "");
        let sig = parse_type("func() (n int, err error)");
        assert_eq!(render_returns(&sig.returns), "(n int, err error)");
        let sig = parse_type("func() error");
        assert_eq!(render_returns(&sig.returns), "error");
    }
}
