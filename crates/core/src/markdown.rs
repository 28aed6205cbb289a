//! Post body rendering.

use pulldown_cmark::{Options, Parser, html};

/// Render a post body to HTML.
///
/// Markdown bodies go through CommonMark with tables, strikethrough,
/// footnotes and task lists enabled. Bodies that are not Markdown were
/// written in a rich-text editor and are stored as-is.
pub fn render_body(content: &str, is_md: bool) -> String {
    if !is_md {
        return content.to_string();
    }

    let options =
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_FOOTNOTES | Options::ENABLE_TASKLISTS;
    let parser = Parser::new_ext(content, options);

    let mut out = String::with_capacity(content.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
