/// Substitutes `{name}` placeholders in a single left-to-right pass.
///
/// Substituted values are never re-scanned, so a question that itself contains
/// `{context}` is inserted verbatim. Unknown placeholders are left as-is.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];

        let replaced = tail.find('}').and_then(|end| {
            let name = &tail[..end];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, end))
        });

        match replaced {
            Some((value, end)) => {
                out.push_str(value);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_replaces_known_placeholders() {
        let out = render("Q: {question}\nC: {context}", &[("question", "why?"), ("context", "because")]);
        assert_eq!(out, "Q: why?\nC: because");
    }

    #[test]
    fn test_render_does_not_rescan_values() {
        let out = render("{question} / {context}", &[("question", "{context}"), ("context", "ctx")]);
        assert_eq!(out, "{context} / ctx");
    }

    #[test]
    fn test_render_keeps_unknown_and_unbalanced_braces() {
        assert_eq!(render("{nope} {", &[("question", "x")]), "{nope} {");
        assert_eq!(render("json {\"a\": 1}", &[]), "json {\"a\": 1}");
    }
}
