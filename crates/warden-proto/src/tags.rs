//! Message tag parsing.
//!
//! Tag-prefixed lines carry metadata as semicolon-delimited `key=value`
//! pairs between a leading `@` and the first space. Values use the standard
//! message-tags escaping (`\:` `\s` `\\` `\r` `\n`).

/// One parsed message tag: key and optional value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag(pub String, pub Option<String>);

/// Unescape a tag value from wire format.
pub fn unescape_tag_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(':') => out.push(';'),
            Some('s') => out.push(' '),
            Some('\\') => out.push('\\'),
            Some('r') => out.push('\r'),
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            None => break,
        }
    }
    out
}

/// Parse the tags portion of a line (without the leading `@`).
///
/// Empty pairs are skipped; a pair without `=` yields a tag with no value.
pub fn parse_tags(tags_str: &str) -> Vec<Tag> {
    tags_str
        .split(';')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => Tag(key.to_string(), Some(unescape_tag_value(value))),
            None => Tag(pair.to_string(), None),
        })
        .collect()
}

/// Look up a tag value by key.
pub fn tag_value<'a>(tags: &'a [Tag], key: &str) -> Option<&'a str> {
    tags.iter()
        .find(|tag| tag.0 == key)
        .and_then(|tag| tag.1.as_deref())
}
