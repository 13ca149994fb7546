//! Parameter descriptions from free-text documentation.
//!
//! Three layouts are recognized, tried in this order:
//!
//! ```text
//! Google                   Sphinx                       NumPy
//!
//! Do foobar stuff.         Do foobar stuff.             Do foobar stuff.
//!
//! Args:                    :param foo: The foo thing.   Parameters
//!     foo: The foo thing.  :param bar: The bar thing.   ----------
//!     bar: The bar thing.                               foo : int
//!                                                           The foo thing.
//! ```
//!
//! Anything else is [`DocstringStyle::Unknown`]: the whole text becomes the
//! description and no parameter is described.

use indexmap::IndexMap;
use regex::Regex;
use std::sync::LazyLock;

static SPHINX_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)^[ \t]*:(?:param|parameter|arg|argument|key|keyword|type|var|ivar|cvar|vartype|returns|return|rtype|raises|raise|except|exception)(?:[ \t]+\w+)*:(?:[ \t]+.*)?$",
    )
    .expect("sphinx field pattern is valid")
});

static NUMPY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)^[ \t]*(?:deprecated|parameters|other parameters|returns|yields|receives|raises|warns|attributes)[ \t]*\n[ \t]*-{3,}[ \t]*$",
    )
    .expect("numpy section pattern is valid")
});

const GOOGLE_SECTIONS: &[&str] = &[
    "args",
    "arguments",
    "params",
    "parameters",
    "keyword args",
    "keyword arguments",
    "other args",
    "other arguments",
    "other params",
    "other parameters",
    "raises",
    "exceptions",
    "returns",
    "yields",
    "receives",
    "examples",
    "attributes",
    "warns",
    "warnings",
];

const GOOGLE_PARAM_SECTIONS: &[&str] = &[
    "args",
    "arguments",
    "params",
    "parameters",
    "keyword args",
    "keyword arguments",
    "other args",
    "other arguments",
    "other params",
    "other parameters",
];

const SPHINX_PARAM_FIELDS: &[&str] = &["param", "parameter", "arg", "argument", "key", "keyword"];

/// Documentation layout detected by [`infer_style`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocstringStyle {
    /// `Args:` followed by indented `name: text` lines.
    Google,
    /// `:param name: text` field lists.
    Sphinx,
    /// `Parameters` over a dashed rule, then `name : type` blocks.
    Numpy,
    /// None of the above.
    Unknown,
}

/// Result of [`parse_docstring`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocstring {
    /// The detected layout.
    pub style: DocstringStyle,
    /// Summary text preceding the first section, if any.
    pub description: Option<String>,
    /// Parameter descriptions in documentation order.
    pub params: IndexMap<String, String>,
}

impl ParsedDocstring {
    /// A docstring with nothing in it.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            style: DocstringStyle::Unknown,
            description: None,
            params: IndexMap::new(),
        }
    }
}

/// Detects the layout of `doc`. The first matching style wins.
#[must_use]
pub fn infer_style(doc: &str) -> DocstringStyle {
    let lines = clean_lines(doc);
    let cleaned = lines.join("\n");
    if (0..lines.len()).any(|i| google_header(&lines, i).is_some()) {
        DocstringStyle::Google
    } else if SPHINX_PATTERN.is_match(&cleaned) {
        DocstringStyle::Sphinx
    } else if NUMPY_PATTERN.is_match(&cleaned) {
        DocstringStyle::Numpy
    } else {
        DocstringStyle::Unknown
    }
}

/// Extracts the function description and parameter descriptions from `doc`.
#[must_use]
pub fn parse_docstring(doc: &str) -> ParsedDocstring {
    let lines = clean_lines(doc);
    if lines.is_empty() {
        return ParsedDocstring::empty();
    }

    let style = infer_style(doc);
    let (summary, params) = match style {
        DocstringStyle::Google => parse_google(&lines),
        DocstringStyle::Sphinx => parse_sphinx(&lines),
        DocstringStyle::Numpy => parse_numpy(&lines),
        DocstringStyle::Unknown => (lines.as_slice(), IndexMap::new()),
    };

    ParsedDocstring {
        style,
        description: join_text(summary),
        params,
    }
}

// ─────────────────────────────────────────────────────────────────────
// Google
// ─────────────────────────────────────────────────────────────────────

fn google_title(line: &str) -> Option<String> {
    let (title, _) = line.trim().split_once(':')?;
    let title = title.trim().to_lowercase();
    GOOGLE_SECTIONS.contains(&title.as_str()).then_some(title)
}

/// Section title when `lines[i]` opens a Google section: a known `Title:`
/// line whose next non-blank line is indented deeper.
fn google_header(lines: &[String], i: usize) -> Option<String> {
    let title = google_title(&lines[i])?;
    let body = lines[i + 1..].iter().find(|line| !is_blank(line))?;
    (indent_of(body) > indent_of(&lines[i])).then_some(title)
}

fn parse_google(lines: &[String]) -> (&[String], IndexMap<String, String>) {
    let summary_end = (0..lines.len())
        .find(|&i| google_header(lines, i).is_some())
        .unwrap_or(lines.len());
    let mut params = IndexMap::new();

    let mut i = summary_end;
    while i < lines.len() {
        let Some(title) = google_header(lines, i) else {
            i += 1;
            continue;
        };
        let header_indent = indent_of(&lines[i]);
        i += 1;
        let start = i;
        while i < lines.len() && (is_blank(&lines[i]) || indent_of(&lines[i]) > header_indent) {
            i += 1;
        }
        if GOOGLE_PARAM_SECTIONS.contains(&title.as_str()) {
            collect_items(&lines[start..i], &mut params, |text| {
                let (head, first) = text.split_once(':')?;
                let name = head.split('(').next().unwrap_or(head);
                Some((vec![strip_stars(name)], first.trim().to_string()))
            });
        }
    }

    (&lines[..summary_end], params)
}

// ─────────────────────────────────────────────────────────────────────
// Sphinx
// ─────────────────────────────────────────────────────────────────────

fn parse_sphinx(lines: &[String]) -> (&[String], IndexMap<String, String>) {
    let summary_end = lines
        .iter()
        .position(|line| line.trim_start().starts_with(':'))
        .unwrap_or(lines.len());
    let mut params = IndexMap::new();
    let mut current: Option<(String, Vec<String>)> = None;

    for line in &lines[summary_end..] {
        let text = line.trim();
        if let Some(field) = text.strip_prefix(':') {
            flush(&mut current, &mut params);
            let Some((head, first)) = field.split_once(':') else {
                continue;
            };
            let words: Vec<&str> = head.split_whitespace().collect();
            if let [directive, .., name] = words.as_slice()
                && SPHINX_PARAM_FIELDS.contains(directive)
            {
                current = Some((strip_stars(name), vec![first.trim().to_string()]));
            }
        } else if let Some((_, description)) = current.as_mut() {
            description.push(text.to_string());
        }
    }
    flush(&mut current, &mut params);

    (&lines[..summary_end], params)
}

// ─────────────────────────────────────────────────────────────────────
// NumPy
// ─────────────────────────────────────────────────────────────────────

fn is_rule(line: &str) -> bool {
    let text = line.trim();
    text.len() >= 3 && text.chars().all(|c| c == '-')
}

fn numpy_headers(lines: &[String]) -> Vec<usize> {
    (0..lines.len().saturating_sub(1))
        .filter(|&i| !is_blank(&lines[i]) && !is_rule(&lines[i]) && is_rule(&lines[i + 1]))
        .collect()
}

fn parse_numpy(lines: &[String]) -> (&[String], IndexMap<String, String>) {
    let headers = numpy_headers(lines);
    let summary_end = headers.first().copied().unwrap_or(lines.len());
    let mut params = IndexMap::new();

    for (n, &header) in headers.iter().enumerate() {
        let title = lines[header].trim().to_lowercase();
        if title != "parameters" && title != "other parameters" {
            continue;
        }
        let end = headers.get(n + 1).copied().unwrap_or(lines.len());
        collect_items(&lines[header + 2..end], &mut params, |text| {
            let head = text.split_once(':').map_or(text, |(head, _)| head);
            let names = head.split(',').map(strip_stars).collect();
            Some((names, String::new()))
        });
    }

    (&lines[..summary_end], params)
}

// ─────────────────────────────────────────────────────────────────────
// Shared
// ─────────────────────────────────────────────────────────────────────

/// Walks an indented item list. Lines at the item indent start a new entry
/// (parsed by `parse_item` into names plus the first line of text); deeper
/// lines continue the current entry.
fn collect_items<F>(body: &[String], params: &mut IndexMap<String, String>, parse_item: F)
where
    F: Fn(&str) -> Option<(Vec<String>, String)>,
{
    let Some(item_indent) = body.iter().find(|l| !is_blank(l)).map(|l| indent_of(l)) else {
        return;
    };
    let mut current: Option<(Vec<String>, Vec<String>)> = None;

    let mut finish = |current: &mut Option<(Vec<String>, Vec<String>)>| {
        if let Some((names, description)) = current.take()
            && let Some(text) = join_text(&description)
        {
            for name in names.into_iter().filter(|name| !name.is_empty()) {
                params.insert(name, text.clone());
            }
        }
    };

    for line in body {
        if is_blank(line) {
            if let Some((_, description)) = current.as_mut() {
                description.push(String::new());
            }
        } else if indent_of(line) <= item_indent {
            finish(&mut current);
            current = parse_item(line.trim()).map(|(names, first)| (names, vec![first]));
        } else if let Some((_, description)) = current.as_mut() {
            description.push(line.trim().to_string());
        }
    }
    finish(&mut current);
}

fn flush(current: &mut Option<(String, Vec<String>)>, params: &mut IndexMap<String, String>) {
    if let Some((name, description)) = current.take()
        && let Some(text) = join_text(&description)
    {
        params.insert(name, text);
    }
}

fn strip_stars(name: &str) -> String {
    name.trim().trim_start_matches('*').to_string()
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}

/// Joins lines and trims surrounding blank space; `None` when nothing is left.
fn join_text(lines: &[String]) -> Option<String> {
    let text = lines.join("\n");
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Normalizes indentation: the first line is left-trimmed, the rest lose
/// their common leading whitespace, and blank edges are dropped.
fn clean_lines(doc: &str) -> Vec<String> {
    let raw: Vec<&str> = doc.lines().collect();
    let margin = raw
        .iter()
        .skip(1)
        .filter(|line| !is_blank(line))
        .map(|line| indent_of(line))
        .min()
        .unwrap_or(0);

    let mut lines: Vec<String> = raw
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let line = if i == 0 {
                line.trim_start()
            } else {
                &line[indent_of(line).min(margin)..]
            };
            line.trim_end().to_string()
        })
        .collect();

    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    let leading = lines.iter().take_while(|line| line.is_empty()).count();
    lines.drain(..leading);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOGLE: &str = "Do foobar stuff, a lot.

    Args:
        foo: The foo thing.
        bar: The bar thing.
    ";

    const SPHINX: &str = "Do foobar stuff, a lot.

    :param foo: The foo thing.
    :param bar: The bar thing.
    :return: The result.
    ";

    const NUMPY: &str = "Do foobar stuff, a lot.

    Parameters
    ----------
    foo : int
        The foo thing.
    bar : str
        The bar thing.
    ";

    fn expected_params() -> IndexMap<String, String> {
        IndexMap::from([
            ("foo".to_string(), "The foo thing.".to_string()),
            ("bar".to_string(), "The bar thing.".to_string()),
        ])
    }

    #[test]
    fn all_styles_agree() {
        for (doc, style) in [
            (GOOGLE, DocstringStyle::Google),
            (SPHINX, DocstringStyle::Sphinx),
            (NUMPY, DocstringStyle::Numpy),
        ] {
            let parsed = parse_docstring(doc);
            assert_eq!(parsed.style, style);
            assert_eq!(parsed.description.as_deref(), Some("Do foobar stuff, a lot."));
            assert_eq!(parsed.params, expected_params(), "style {style:?}");
        }
    }

    #[test]
    fn unknown_style_keeps_whole_text() {
        let parsed = parse_docstring("Unknown style docstring.");
        assert_eq!(parsed.style, DocstringStyle::Unknown);
        assert_eq!(parsed.description.as_deref(), Some("Unknown style docstring."));
        assert!(parsed.params.is_empty());
    }

    #[test]
    fn parameters_only_has_no_description() {
        let doc = "
        Args:
            foo: The foo thing.
            bar: The bar thing.
        ";
        let parsed = parse_docstring(doc);
        assert_eq!(parsed.style, DocstringStyle::Google);
        assert_eq!(parsed.description, None);
        assert_eq!(parsed.params, expected_params());
    }

    #[test]
    fn empty_and_blank_docs() {
        assert_eq!(parse_docstring(""), ParsedDocstring::empty());
        assert_eq!(parse_docstring("  \n \n"), ParsedDocstring::empty());
    }

    #[test]
    fn rustdoc_leading_space_is_handled() {
        // Doc comments arrive with one leading space per line.
        let doc = " Sphinx style docstring.\n\n :param foo: The foo thing.\n :return: The result.";
        let parsed = parse_docstring(doc);
        assert_eq!(parsed.style, DocstringStyle::Sphinx);
        assert_eq!(parsed.description.as_deref(), Some("Sphinx style docstring."));
        assert_eq!(parsed.params["foo"], "The foo thing.");
        assert_eq!(parsed.params.len(), 1);
    }

    #[test]
    fn google_types_stars_and_continuations() {
        let doc = "Summary.

        Args:
            foo (int): The foo thing,
                spanning two lines.
            *args: Extra values.
            **kwargs: Extra options.

        Returns:
            Something else entirely.
        ";
        let parsed = parse_docstring(doc);
        assert_eq!(parsed.params["foo"], "The foo thing,\nspanning two lines.");
        assert_eq!(parsed.params["args"], "Extra values.");
        assert_eq!(parsed.params["kwargs"], "Extra options.");
        assert_eq!(parsed.params.len(), 3);
    }

    #[test]
    fn sphinx_typed_param() {
        let doc = "Summary.\n\n:param int foo: The foo thing.\n    More foo.\n:type foo: int";
        let parsed = parse_docstring(doc);
        assert_eq!(parsed.params["foo"], "The foo thing.\nMore foo.");
    }

    #[test]
    fn numpy_shared_entries_and_other_sections() {
        let doc = "Summary line.

        Second paragraph.

        Parameters
        ----------
        x, y : float
            Coordinates.

        Returns
        -------
        float
            The distance.
        ";
        let parsed = parse_docstring(doc);
        assert_eq!(
            parsed.description.as_deref(),
            Some("Summary line.\n\nSecond paragraph.")
        );
        assert_eq!(parsed.params["x"], "Coordinates.");
        assert_eq!(parsed.params["y"], "Coordinates.");
        assert_eq!(parsed.params.len(), 2);
    }

    #[test]
    fn google_wins_over_later_styles() {
        let doc = "Summary.

        Args:
            foo: From google.

        :param foo: From sphinx.
        ";
        assert_eq!(infer_style(doc), DocstringStyle::Google);
        assert_eq!(parse_docstring(doc).params["foo"], "From google.");
    }

    #[test]
    fn google_title_without_body_stays_in_summary() {
        let doc = "Compute it.\nReturns: nothing much.\n\nArgs:\n    foo: The foo thing.\n    bar: The bar thing.";
        let parsed = parse_docstring(doc);
        assert_eq!(parsed.style, DocstringStyle::Google);
        assert_eq!(
            parsed.description.as_deref(),
            Some("Compute it.\nReturns: nothing much.")
        );
        assert_eq!(parsed.params, expected_params());
    }

    #[test]
    fn google_section_after_blank_line() {
        let doc = "Summary.\n\nArgs:\n\n    foo: The foo thing.\n    bar: The bar thing.";
        let parsed = parse_docstring(doc);
        assert_eq!(parsed.style, DocstringStyle::Google);
        assert_eq!(parsed.description.as_deref(), Some("Summary."));
        assert_eq!(parsed.params, expected_params());
    }

    #[test]
    fn lone_google_title_is_not_a_section() {
        let doc = "Returns: the answer.";
        assert_eq!(infer_style(doc), DocstringStyle::Unknown);
        assert_eq!(parse_docstring(doc).description.as_deref(), Some(doc));
    }
}
