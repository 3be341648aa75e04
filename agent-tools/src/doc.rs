//! Structured documentation extraction for toolset methods.
//!
//! Understands rustdoc conventions (`# Arguments` followed by
//! `` * `name` - text `` bullets, `# Returns`) as well as the `Args:` /
//! `Returns:` block style.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Section {
    Summary,
    Body,
    Arguments,
    Returns,
    Other,
}

/// Documentation split into the pieces schema inference cares about.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct DocComment {
    pub(crate) summary: Option<String>,
    pub(crate) params: Vec<(String, String)>,
    pub(crate) returns: Option<String>,
}

impl DocComment {
    pub(crate) fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, description)| description.as_str())
    }
}

pub(crate) fn parse(doc: &str) -> DocComment {
    let mut section = Section::Summary;
    let mut summary: Vec<&str> = Vec::new();
    let mut returns: Vec<&str> = Vec::new();
    let mut params: Vec<(String, String)> = Vec::new();
    let mut entry_indent: Option<usize> = None;

    for line in doc.lines() {
        let trimmed = line.trim();

        if let Some(next) = heading(trimmed) {
            section = next;
            entry_indent = None;
            continue;
        }

        match section {
            Section::Summary => {
                if trimmed.is_empty() {
                    if !summary.is_empty() {
                        section = Section::Body;
                    }
                } else {
                    summary.push(trimmed);
                }
            }
            Section::Arguments => {
                if trimmed.is_empty() {
                    continue;
                }
                let indent = line.len() - line.trim_start().len();
                let bulleted = strip_bullet(trimmed).is_some();
                let may_start_entry = bulleted || entry_indent.is_none_or(|limit| indent <= limit);
                match parse_entry(trimmed).filter(|_| may_start_entry) {
                    Some(entry) => {
                        entry_indent.get_or_insert(indent);
                        params.push(entry);
                    }
                    None => {
                        if let Some((_, description)) = params.last_mut() {
                            if !description.is_empty() {
                                description.push(' ');
                            }
                            description.push_str(trimmed);
                        }
                    }
                }
            }
            Section::Returns => {
                if !trimmed.is_empty() {
                    returns.push(strip_bullet(trimmed).unwrap_or(trimmed));
                }
            }
            Section::Body | Section::Other => {}
        }
    }

    DocComment {
        summary: join(&summary),
        params,
        returns: join(&returns),
    }
}

fn heading(line: &str) -> Option<Section> {
    let label = if let Some(rest) = line.strip_prefix('#') {
        rest.trim_start_matches('#').trim()
    } else if let Some(rest) = line.strip_suffix(':') {
        // Block-style headings are a single bare word such as `Args:`.
        if rest.contains(char::is_whitespace) {
            return None;
        }
        rest
    } else {
        return None;
    };

    let label = label.trim_end_matches(':').to_ascii_lowercase();
    Some(match label.as_str() {
        "arguments" | "args" | "parameters" | "params" => Section::Arguments,
        "returns" | "return" => Section::Returns,
        _ if line.starts_with('#') => Section::Other,
        _ => return None,
    })
}

fn strip_bullet(line: &str) -> Option<&str> {
    line.strip_prefix("* ")
        .or_else(|| line.strip_prefix("- "))
        .or_else(|| line.strip_prefix("+ "))
}

fn parse_entry(line: &str) -> Option<(String, String)> {
    let (bulleted, rest) = match strip_bullet(line) {
        Some(rest) => (true, rest.trim_start()),
        None => (false, line),
    };

    let (name, tail) = if let Some(quoted) = rest.strip_prefix('`') {
        let end = quoted.find('`')?;
        (&quoted[..end], &quoted[end + 1..])
    } else {
        let end = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        (&rest[..end], &rest[end..])
    };

    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }

    let mut tail = tail.trim_start();
    if tail.starts_with('(') {
        if let Some(close) = tail.find(')') {
            tail = tail[close + 1..].trim_start();
        }
    }

    let description = if let Some(rest) = tail.strip_prefix(':') {
        rest
    } else if let Some(rest) = tail.strip_prefix('-').or_else(|| tail.strip_prefix('\u{2013}')) {
        rest
    } else if bulleted {
        tail
    } else {
        return None;
    };

    Some((name.to_owned(), description.trim().to_owned()))
}

fn join(lines: &[&str]) -> Option<String> {
    let joined = lines.join(" ");
    let joined = joined.trim();
    (!joined.is_empty()).then(|| joined.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rustdoc_arguments() {
        let doc = parse(
            "Repeats text.\n\
             \n\
             Longer explanation that is not part of the summary.\n\
             \n\
             # Arguments\n\
             \n\
             * `text` - Text to repeat.\n\
             * `times` - How many times to repeat it,\n\
               defaults to one.\n\
             \n\
             # Returns\n\
             \n\
             The repeated text.\n\
             \n\
             # Errors\n\
             \n\
             Never.",
        );

        assert_eq!(doc.summary.as_deref(), Some("Repeats text."));
        assert_eq!(doc.param("text"), Some("Text to repeat."));
        assert_eq!(
            doc.param("times"),
            Some("How many times to repeat it, defaults to one.")
        );
        assert_eq!(doc.returns.as_deref(), Some("The repeated text."));
    }

    #[test]
    fn parses_block_style_arguments() {
        let doc = parse(
            "Fetches the floor price\nfor a collection.\n\
             \n\
             Args:\n\
             \x20   collection (str): Collection slug.\n\
             \x20       Case sensitive.\n\
             \x20   chain: Chain name.\n\
             Returns:\n\
             \x20   Price in the native token.",
        );

        assert_eq!(
            doc.summary.as_deref(),
            Some("Fetches the floor price for a collection.")
        );
        assert_eq!(doc.param("collection"), Some("Collection slug. Case sensitive."));
        assert_eq!(doc.param("chain"), Some("Chain name."));
        assert_eq!(doc.returns.as_deref(), Some("Price in the native token."));
    }

    #[test]
    fn empty_doc_has_no_summary() {
        let doc = parse("");
        assert!(doc.summary.is_none());
        assert!(doc.params.is_empty());
    }

    #[test]
    fn summary_ends_at_heading() {
        let doc = parse("Does a thing.\n# Arguments\n* `x` - The x.");
        assert_eq!(doc.summary.as_deref(), Some("Does a thing."));
        assert_eq!(doc.param("x"), Some("The x."));
    }
}
