//! Post-processes the rendered post:
//!
//! * links that go anywhere other than `#` open in a new tab,
//! * article title links (`title="article_title"`) whose text is a
//!   comma-joined author list read as prose ("A, B and C"), and
//! * the document is pretty-printed, one tag or text node per line.
//!
//! Both passes stream over the document with [`lol_html`]. Pretty-printing
//! relies on explicit end tags for every non-void element, which the post
//! template provides.

use lol_html::html_content::ContentType;
use lol_html::{doc_text, element, rewrite_str, text, RewriteStrSettings};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// The `title` attribute value marking an article title link.
pub const ARTICLE_TITLE_MARKER: &str = "article_title";

/// Elements whose content is written out exactly as rendered.
const VERBATIM: [&str; 4] = ["pre", "textarea", "script", "style"];

/// Replaces the last comma of a name list with "and": `"A, B, C"` becomes
/// `"A, B and C"`, `"A, B"` becomes `"A and B"`. A single name is returned
/// unchanged.
pub fn join_names(text: &str) -> String {
    match text.rsplit_once(',') {
        Some((head, last)) => format!("{} and {}", head.trim_end(), last.trim_start()),
        None => text.to_owned(),
    }
}

/// Rewrites the anchors and pretty-prints the result.
pub fn post_process(html: &str) -> Result<String> {
    pretty_print(&rewrite_anchors(html)?)
}

/// Applies both anchor rewrites to `html`. Markup nested in a title anchor is
/// unwrapped so the names are joined over the anchor's whole text.
pub fn rewrite_anchors(html: &str) -> Result<String> {
    let title_selector = format!("a[title=\"{}\"]", ARTICLE_TITLE_MARKER);
    let nested_selector = format!("{} *", title_selector);
    // Text of the current title anchor, gathered across chunks and nodes.
    let names = Rc::new(RefCell::new(String::new()));
    let names_at_end = Rc::clone(&names);

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("a[href]", |el| {
                    if el.get_attribute("href").as_deref() != Some("#") {
                        el.set_attribute("target", "_blank")?;
                    }
                    Ok(())
                }),
                element!(title_selector.as_str(), move |el| {
                    names_at_end.borrow_mut().clear();
                    let names = Rc::clone(&names_at_end);
                    if let Some(handlers) = el.end_tag_handlers() {
                        handlers.push(Box::new(move |end| {
                            let whole = std::mem::take(&mut *names.borrow_mut());
                            // Raw HTML text, so entities stay encoded.
                            end.before(&join_names(&whole), ContentType::Html);
                            Ok(())
                        }));
                    }
                    Ok(())
                }),
                element!(nested_selector.as_str(), |el| {
                    el.remove_and_keep_content();
                    Ok(())
                }),
                text!(title_selector.as_str(), move |chunk| {
                    names.borrow_mut().push_str(chunk.as_str());
                    chunk.remove();
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|err| Error(err.to_string()))
}

#[derive(Default)]
struct Layout {
    depth: usize,
    // Open verbatim elements; nothing inside them is touched.
    verbatim: usize,
    text: String,
}

impl Layout {
    fn line(&self) -> String {
        format!("\n{}", " ".repeat(self.depth))
    }
}

/// Puts every tag and every non-blank text node of `html` on its own line,
/// indented one space per level of nesting. Whitespace-only text is dropped
/// and other text is trimmed; the contents of `pre`, `textarea`, `script`
/// and `style` are left alone.
pub fn pretty_print(html: &str) -> Result<String> {
    let layout = Rc::new(RefCell::new(Layout::default()));
    let text_layout = Rc::clone(&layout);

    let out = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("*", move |el| {
                let mut current = layout.borrow_mut();
                if current.verbatim > 0 {
                    return Ok(());
                }
                el.before(&current.line(), ContentType::Html);
                if !el.can_have_content() {
                    return Ok(());
                }
                let verbatim = VERBATIM.contains(&el.tag_name().as_str());
                current.depth += 1;
                if verbatim {
                    current.verbatim += 1;
                }
                let layout = Rc::clone(&layout);
                if let Some(handlers) = el.end_tag_handlers() {
                    handlers.push(Box::new(move |end| {
                        let mut current = layout.borrow_mut();
                        current.depth = current.depth.saturating_sub(1);
                        if verbatim {
                            current.verbatim -= 1;
                        } else {
                            end.before(&current.line(), ContentType::Html);
                        }
                        Ok(())
                    }));
                }
                Ok(())
            })],
            document_content_handlers: vec![doc_text!(move |chunk| {
                let mut current = text_layout.borrow_mut();
                if current.verbatim > 0 {
                    return Ok(());
                }
                current.text.push_str(chunk.as_str());
                if !chunk.last_in_text_node() {
                    chunk.remove();
                    return Ok(());
                }
                let whole = std::mem::take(&mut current.text);
                match whole.trim() {
                    "" => chunk.remove(),
                    trimmed => {
                        chunk.replace(&format!("{}{}", current.line(), trimmed), ContentType::Html)
                    }
                }
                Ok(())
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|err| Error(err.to_string()))?;

    let mut pretty = out.trim().to_owned();
    pretty.push('\n');
    Ok(pretty)
}

/// The result of rewriting anchors.
pub type Result<T> = std::result::Result<T, Error>;

/// Returned when the rendered document can't be rewritten.
#[derive(Debug)]
pub struct Error(String);

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Post-processing HTML: {}", self.0)
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_join_names() {
        assert_eq!("Alice, Bob and Carol", join_names("Alice, Bob, Carol"));
        assert_eq!("Alice and Bob", join_names("Alice, Bob"));
        assert_eq!("Alice", join_names("Alice"));
        assert_eq!("", join_names(""));
    }

    #[test]
    fn test_external_links_open_in_new_tab() -> Result<()> {
        let out = rewrite_anchors(r#"<p><a href="https://example.org">x</a></p>"#)?;
        assert_eq!(
            r#"<p><a href="https://example.org" target="_blank">x</a></p>"#,
            out
        );
        Ok(())
    }

    #[test]
    fn test_hash_links_untouched() -> Result<()> {
        let html = r##"<a href="#">top</a><a name="anchor">here</a>"##;
        let once = rewrite_anchors(html)?;
        assert_eq!(html, once);
        assert_eq!(once, rewrite_anchors(&once)?);
        Ok(())
    }

    #[test]
    fn test_article_title_authors() -> Result<()> {
        let out = rewrite_anchors(
            r##"<a href="#" title="article_title">Alice, Bob, Carol</a> <a href="#" title="article_title">Alice, Bob</a> <a href="#" title="article_title">Alice</a> <a href="#" title="other">A, B</a>"##,
        )?;
        assert_eq!(
            r##"<a href="#" title="article_title">Alice, Bob and Carol</a> <a href="#" title="article_title">Alice and Bob</a> <a href="#" title="article_title">Alice</a> <a href="#" title="other">A, B</a>"##,
            out
        );
        Ok(())
    }

    #[test]
    fn test_article_title_keeps_entities() -> Result<()> {
        let out = rewrite_anchors(
            r#"<a href="https://example.org" title="article_title">Smith &amp; Sons, Jones</a>"#,
        )?;
        assert_eq!(
            r#"<a href="https://example.org" title="article_title" target="_blank">Smith &amp; Sons and Jones</a>"#,
            out
        );
        Ok(())
    }

    #[test]
    fn test_article_title_with_nested_markup() -> Result<()> {
        let out = rewrite_anchors(
            r##"<a href="#" title="article_title"><span>Alice, Bob</span>, <em>Carol</em></a>"##,
        )?;
        assert_eq!(
            r##"<a href="#" title="article_title">Alice, Bob and Carol</a>"##,
            out
        );
        Ok(())
    }

    #[test]
    fn test_pretty_print_indents_nested_elements() -> Result<()> {
        let out = pretty_print(
            "<html><body>\n\n  <div class=\"article\"><p>Hi <em>there</em></p><br><a href=\"#\">top</a></div>\n</body></html>",
        )?;
        assert_eq!(
            "<html>\n \
             <body>\n  \
             <div class=\"article\">\n   \
             <p>\n    \
             Hi\n    \
             <em>\n     \
             there\n    \
             </em>\n   \
             </p>\n   \
             <br>\n   \
             <a href=\"#\">\n    \
             top\n   \
             </a>\n  \
             </div>\n \
             </body>\n\
             </html>\n",
            out
        );
        Ok(())
    }

    #[test]
    fn test_pretty_print_keeps_preformatted_text() -> Result<()> {
        let out = pretty_print("<div><pre>  a\n    <b>b</b></pre></div>")?;
        assert_eq!("<div>\n <pre>  a\n    <b>b</b></pre>\n</div>\n", out);
        Ok(())
    }

    #[test]
    fn test_post_process_rewrites_then_indents() -> Result<()> {
        let out = post_process(
            r#"<p><a href="https://example.org" title="article_title">Alice, Bob</a></p>"#,
        )?;
        assert_eq!(
            "<p>\n \
             <a href=\"https://example.org\" title=\"article_title\" target=\"_blank\">\n  \
             Alice and Bob\n \
             </a>\n\
             </p>\n",
            out
        );
        Ok(())
    }
}
