//! Reading-order assembly for a single page.
//!
//! Fragments are ordered top to bottom by sorting on vertical position,
//! highest first. This approximates single-column reading order only:
//! multi-column pages, floating boxes and rotated text interleave by height.

use crate::output::{Fragment, PageOutput};
use std::borrow::Cow;

/// Separator appended to each page of the plain-text output.
pub const TEXT_PAGE_SEPARATOR: &str = "\u{c}\n";

/// Separator appended to each page of the HTML output.
pub const HTML_PAGE_SEPARATOR: &str = "<div style=\"page-break-after: always;\"></div>\n";

/// Line break inserted before every line terminator in the HTML output.
pub const HTML_LINE_BREAK: &str = "<br>";

/// How the HTML rendering treats fragment text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HtmlOptions {
    /// Escape `&`, `<` and `>` before inserting line breaks.
    pub escape: bool,
}

/// Order one page's fragments and render them as text and HTML.
///
/// The sort is stable: fragments at the same vertical position keep their
/// extraction order. Positions compare with [`f32::total_cmp`], so the
/// order is total even if a source reports NaN.
pub fn assemble_page(mut fragments: Vec<Fragment>, options: HtmlOptions) -> PageOutput {
    fragments.sort_by(|a, b| b.vertical_position.total_cmp(&a.vertical_position));

    let text_len: usize = fragments.iter().map(|f| f.text.len()).sum();
    let mut out = PageOutput {
        text: String::with_capacity(text_len + TEXT_PAGE_SEPARATOR.len()),
        html: String::with_capacity(text_len + HTML_PAGE_SEPARATOR.len()),
    };

    for fragment in &fragments {
        out.text.push_str(&fragment.text);
        push_html(&mut out.html, &fragment.text, options);
    }

    out.text.push_str(TEXT_PAGE_SEPARATOR);
    out.html.push_str(HTML_PAGE_SEPARATOR);
    out
}

/// Append `text` to `html`, putting `<br>` in front of every line terminator.
///
/// `\r\n` counts as one terminator; a lone `\r` or `\n` counts as one each.
fn push_html(html: &mut String, text: &str, options: HtmlOptions) {
    let text: Cow<'_, str> = if options.escape {
        html_escape::encode_text(text)
    } else {
        Cow::Borrowed(text)
    };

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                html.push_str(HTML_LINE_BREAK);
                html.push('\r');
                if chars.peek() == Some(&'\n') {
                    chars.next();
                    html.push('\n');
                }
            }
            '\n' => {
                html.push_str(HTML_LINE_BREAK);
                html.push('\n');
            }
            other => html.push(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frags(items: &[(f32, &str)]) -> Vec<Fragment> {
        items.iter().map(|&(y, t)| Fragment::new(y, t)).collect()
    }

    #[test]
    fn higher_fragments_come_first() {
        let page = assemble_page(frags(&[(100.0, "B\n"), (200.0, "A\n")]), HtmlOptions::default());
        assert_eq!(page.text, "A\nB\n\u{c}\n");
        assert_eq!(
            page.html,
            "A<br>\nB<br>\n<div style=\"page-break-after: always;\"></div>\n"
        );
    }

    #[test]
    fn equal_positions_keep_extraction_order() {
        let page = assemble_page(
            frags(&[(50.0, "x"), (300.0, "top\n"), (50.0, "y"), (50.0, "z\n")]),
            HtmlOptions::default(),
        );
        assert_eq!(page.text, "top\nxyz\n\u{c}\n");
    }

    #[test]
    fn empty_page_is_only_separators() {
        let page = assemble_page(Vec::new(), HtmlOptions::default());
        assert_eq!(page.text, TEXT_PAGE_SEPARATOR);
        assert_eq!(page.html, HTML_PAGE_SEPARATOR);
    }

    #[test]
    fn one_br_per_line_terminator() {
        let source = "one\ntwo\r\nthree\rfour\n\n";
        let page = assemble_page(frags(&[(1.0, source)]), HtmlOptions::default());
        let body = page.html.strip_suffix(HTML_PAGE_SEPARATOR).unwrap();
        assert_eq!(body, "one<br>\ntwo<br>\r\nthree<br>\rfour<br>\n<br>\n");
        assert_eq!(body.matches(HTML_LINE_BREAK).count(), 5);
        assert_eq!(body.replace(HTML_LINE_BREAK, ""), source);
    }

    #[test]
    fn fragment_without_terminator_gets_no_br() {
        let page = assemble_page(frags(&[(1.0, "no newline")]), HtmlOptions::default());
        assert!(!page.html.contains(HTML_LINE_BREAK));
        assert_eq!(page.text, "no newline\u{c}\n");
    }

    #[test]
    fn markup_passes_through_unless_escaping() {
        let items = frags(&[(1.0, "a < b & c\n")]);
        let raw = assemble_page(items.clone(), HtmlOptions::default());
        assert!(raw.html.starts_with("a < b & c<br>\n"));

        let escaped = assemble_page(items, HtmlOptions { escape: true });
        assert!(escaped.html.starts_with("a &lt; b &amp; c<br>\n"));
        // The text output is never escaped.
        assert_eq!(escaped.text, "a < b & c\n\u{c}\n");
    }

    #[test]
    fn nan_positions_do_not_break_ordering() {
        let page = assemble_page(
            frags(&[(10.0, "low\n"), (f32::NAN, "nan\n"), (20.0, "high\n")]),
            HtmlOptions::default(),
        );
        assert_eq!(page.text, "nan\nhigh\nlow\n\u{c}\n");
    }

    #[test]
    fn negative_positions_sort_below_positive() {
        let page = assemble_page(
            frags(&[(-5.0, "below\n"), (5.0, "above\n")]),
            HtmlOptions::default(),
        );
        assert_eq!(page.text, "above\nbelow\n\u{c}\n");
    }
}
