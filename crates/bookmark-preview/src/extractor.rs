use regex::Regex;
use std::sync::LazyLock;

pub const TITLE_PLACEHOLDER: &str = "Title placeholder";
pub const IMAGE_PLACEHOLDER: &str = "https://via.placeholder.com/150";

static TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>").expect("title pattern compiles")
});

// `src` may sit anywhere in the tag and use either quote style, or none.
static IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<img\b[^>]*?\ssrc\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("image pattern compiles")
});

/// Title and image pulled out of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub title: String,
    pub image: String,
}

/// Scans `html` for its title and first image, falling back to placeholders.
///
/// Values are returned verbatim: entities are not decoded and relative image
/// paths are not resolved.
pub fn extract(html: &str) -> Extracted {
    Extracted {
        title: title(html).unwrap_or(TITLE_PLACEHOLDER).to_string(),
        image: image(html).unwrap_or(IMAGE_PLACEHOLDER).to_string(),
    }
}

fn title(html: &str) -> Option<&str> {
    TITLE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn image(html: &str) -> Option<&str> {
    let caps = IMAGE.captures(html)?;
    (1..=3)
        .find_map(|group| caps.get(group))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_taken_verbatim() {
        let html = "<html><head><TITLE lang=\"en\">Rust &amp; Friends</TITLE></head></html>";
        assert_eq!(extract(html).title, "Rust &amp; Friends");
    }

    #[test]
    fn first_title_wins_and_may_span_lines() {
        let html = "<title>first\nline</title><title>second</title>";
        assert_eq!(extract(html).title, "first\nline");
    }

    #[test]
    fn missing_title_uses_placeholder() {
        assert_eq!(extract("<p>no head</p>").title, TITLE_PLACEHOLDER);
        assert_eq!(extract("<title>unterminated").title, TITLE_PLACEHOLDER);
    }

    #[test]
    fn image_src_in_any_position_and_quote_style() {
        assert_eq!(extract(r#"<img src="/a.png">"#).image, "/a.png");
        assert_eq!(
            extract(r#"<img alt="x" class='y' src='b.jpg' width=3>"#).image,
            "b.jpg"
        );
        assert_eq!(extract("<IMG\nSRC=c.gif>").image, "c.gif");
    }

    #[test]
    fn data_src_is_not_mistaken_for_src() {
        let html = r#"<img data-src="lazy.png" src="real.png">"#;
        assert_eq!(extract(html).image, "real.png");
    }

    #[test]
    fn first_image_with_src_wins() {
        let html = r#"<img alt="none"><img src="one.png"><img src="two.png">"#;
        assert_eq!(extract(html).image, "one.png");
    }

    #[test]
    fn missing_image_uses_placeholder() {
        assert_eq!(extract("<p>text</p>").image, IMAGE_PLACEHOLDER);
        assert_eq!(extract("<image src=\"x\">").image, IMAGE_PLACEHOLDER);
    }
}
