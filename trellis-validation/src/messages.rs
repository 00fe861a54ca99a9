// Message templating

/// Default display label for a raw attribute name
pub fn humanize(attribute: &str) -> String {
    attribute.replace('_', " ")
}

/// Substitute `:attribute` and the rule's named placeholders in one pass.
///
/// A placeholder only matches when it is not followed by another identifier
/// character, so `:min` never eats the front of `:minimum`. Substituted text
/// is never rescanned.
pub fn render(template: &str, label: &str, replacements: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len() + label.len());
    let mut rest = template;

    while let Some(pos) = rest.find(':') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];
        let ident_len = tail
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(tail.len());
        let ident = &tail[..ident_len];

        let value = if ident == "attribute" {
            Some(label)
        } else {
            replacements
                .iter()
                .find(|(key, _)| *key == ident)
                .map(|(_, value)| value.as_str())
        };

        match value {
            Some(value) => {
                out.push_str(value);
                rest = &tail[ident_len..];
            }
            None => {
                out.push(':');
                rest = tail;
            }
        }
    }

    out.push_str(rest);
    out
}
