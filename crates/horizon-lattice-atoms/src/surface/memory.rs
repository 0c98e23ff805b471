//! In-memory style surface.

use cssparser::{Delimiter, ParseError as CssParseError, Parser, ParserInput, Token};

use super::{RuleHandle, StyleSurface};
use crate::plugins::MEDIA_MARKER;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
struct StyleEntry {
    handle: RuleHandle,
    selector: String,
    declarations: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SurfaceEntry {
    Style(StyleEntry),
    Media {
        handle: RuleHandle,
        condition: String,
        rules: Vec<StyleEntry>,
    },
}

impl SurfaceEntry {
    fn handle(&self) -> RuleHandle {
        match self {
            SurfaceEntry::Style(entry) => entry.handle,
            SurfaceEntry::Media { handle, .. } => *handle,
        }
    }
}

/// A style surface kept in memory.
///
/// Used for server rendering and tests. Server output can be loaded back with
/// [`from_css`](Self::from_css) to stand in for the client's stylesheet.
///
/// # Example
///
/// ```
/// use horizon_lattice_atoms::prelude::*;
///
/// let mut surface = MemorySurface::new();
/// let media = surface.insert_rule(None, "@media print{}", 0).unwrap();
/// surface.insert_rule(Some(media), ".a{color:red;}", 0).unwrap();
///
/// assert_eq!(surface.text_content(), "@media print{.a{color:red;}}");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    entries: Vec<SurfaceEntry>,
    next_handle: u64,
    insertions: usize,
}

impl MemorySurface {
    /// Create an empty surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load rendered CSS: style rules, and `@media` blocks containing style
    /// rules. Loaded entries do not count as insertions.
    pub fn from_css(css: &str) -> Result<Self> {
        let mut surface = Self::new();
        for rule in parse_css_rules(css)? {
            let entry = surface.entry_from(rule);
            surface.entries.push(entry);
        }
        Ok(surface)
    }

    /// Number of successful [`insert_rule`](StyleSurface::insert_rule) calls.
    pub fn insertions(&self) -> usize {
        self.insertions
    }

    /// Current selector of a style entry.
    pub fn selector_text(&self, handle: RuleHandle) -> Option<&str> {
        self.style_entries()
            .find(|entry| entry.handle == handle)
            .map(|entry| entry.selector.as_str())
    }

    fn allocate(&mut self) -> RuleHandle {
        self.next_handle += 1;
        RuleHandle::new(self.next_handle)
    }

    fn style_entry(&mut self, rule: StyleText) -> StyleEntry {
        StyleEntry {
            handle: self.allocate(),
            selector: rule.selector,
            declarations: rule.declarations,
        }
    }

    fn entry_from(&mut self, rule: ParsedRule) -> SurfaceEntry {
        match rule {
            ParsedRule::Style(rule) => SurfaceEntry::Style(self.style_entry(rule)),
            ParsedRule::Media { condition, rules } => SurfaceEntry::Media {
                handle: self.allocate(),
                condition,
                rules: rules.into_iter().map(|rule| self.style_entry(rule)).collect(),
            },
        }
    }

    fn style_entries(&self) -> impl Iterator<Item = &StyleEntry> {
        self.entries.iter().flat_map(|entry| match entry {
            SurfaceEntry::Style(entry) => std::slice::from_ref(entry).iter(),
            SurfaceEntry::Media { rules, .. } => rules.iter(),
        })
    }

    fn media_rules_mut(&mut self, parent: RuleHandle) -> Result<&mut Vec<StyleEntry>> {
        self.entries
            .iter_mut()
            .find_map(|entry| match entry {
                SurfaceEntry::Media { handle, rules, .. } if *handle == parent => Some(rules),
                _ => None,
            })
            .ok_or_else(|| Error::surface(format!("{parent:?} is not a media container")))
    }

    fn media_rules(&self, parent: RuleHandle) -> Option<&Vec<StyleEntry>> {
        self.entries.iter().find_map(|entry| match entry {
            SurfaceEntry::Media { handle, rules, .. } if *handle == parent => Some(rules),
            _ => None,
        })
    }
}

impl StyleSurface for MemorySurface {
    fn insert_rule(
        &mut self,
        parent: Option<RuleHandle>,
        text: &str,
        position: usize,
    ) -> Result<RuleHandle> {
        let mut parsed = parse_css_rules(text)?;
        if parsed.len() != 1 {
            return Err(Error::surface(format!("expected a single rule, got '{text}'")));
        }
        let rule = parsed.remove(0);

        let handle = match parent {
            None => {
                if position > self.entries.len() {
                    return Err(Error::surface(format!("index {position} is out of range")));
                }
                let entry = self.entry_from(rule);
                let handle = entry.handle();
                self.entries.insert(position, entry);
                handle
            }
            Some(parent) => {
                let ParsedRule::Style(rule) = rule else {
                    return Err(Error::surface("media containers cannot be nested"));
                };
                let len = self.media_rules_mut(parent)?.len();
                if position > len {
                    return Err(Error::surface(format!("index {position} is out of range")));
                }
                let entry = self.style_entry(rule);
                let handle = entry.handle;
                self.media_rules_mut(parent)?.insert(position, entry);
                handle
            }
        };
        self.insertions += 1;
        Ok(handle)
    }

    fn rule_count(&self, parent: Option<RuleHandle>) -> usize {
        match parent {
            None => self.entries.len(),
            Some(parent) => self.media_rules(parent).map_or(0, Vec::len),
        }
    }

    fn rule_at(&self, parent: Option<RuleHandle>, position: usize) -> Option<RuleHandle> {
        match parent {
            None => self.entries.get(position).map(SurfaceEntry::handle),
            Some(parent) => self
                .media_rules(parent)?
                .get(position)
                .map(|entry| entry.handle),
        }
    }

    fn set_selector_text(&mut self, handle: RuleHandle, selector: &str) -> Result<()> {
        let entry = self
            .entries
            .iter_mut()
            .flat_map(|entry| match entry {
                SurfaceEntry::Style(entry) => std::slice::from_mut(entry).iter_mut(),
                SurfaceEntry::Media { rules, .. } => rules.iter_mut(),
            })
            .find(|entry| entry.handle == handle)
            .ok_or_else(|| Error::surface(format!("{handle:?} is not a style entry")))?;
        entry.selector = selector.to_string();
        Ok(())
    }

    fn text_content(&self) -> String {
        let mut css = String::new();
        for entry in &self.entries {
            match entry {
                SurfaceEntry::Style(entry) => push_style(&mut css, entry),
                SurfaceEntry::Media {
                    condition, rules, ..
                } => {
                    css.push_str(condition);
                    css.push('{');
                    for entry in rules {
                        push_style(&mut css, entry);
                    }
                    css.push('}');
                }
            }
        }
        css
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

fn push_style(css: &mut String, entry: &StyleEntry) {
    css.push_str(&entry.selector);
    css.push('{');
    css.push_str(&entry.declarations);
    css.push('}');
}

struct StyleText {
    selector: String,
    declarations: String,
}

enum ParsedRule {
    Style(StyleText),
    Media {
        condition: String,
        rules: Vec<StyleText>,
    },
}

/// Split CSS text into rules, keeping preludes and declarations verbatim.
fn parse_css_rules(css: &str) -> Result<Vec<ParsedRule>> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    parse_stylesheet(&mut parser).map_err(|e| {
        Error::parse(
            format!("{:?}", e.kind),
            e.location.line + 1,
            e.location.column,
        )
    })
}

fn parse_stylesheet<'i>(
    parser: &mut Parser<'i, '_>,
) -> std::result::Result<Vec<ParsedRule>, CssParseError<'i, ()>> {
    let mut rules = vec![];
    while let Some(prelude) = block_prelude(parser)? {
        if prelude.starts_with(MEDIA_MARKER) {
            let nested = parser.parse_nested_block(|p| parse_style_rules(p))?;
            rules.push(ParsedRule::Media {
                condition: prelude,
                rules: nested,
            });
        } else if prelude.starts_with('@') {
            return Err(parser.new_custom_error(()));
        } else {
            let declarations = parser.parse_nested_block(|p| raw_text(p))?;
            rules.push(ParsedRule::Style(StyleText {
                selector: prelude,
                declarations: declarations.trim().to_string(),
            }));
        }
    }
    Ok(rules)
}

fn parse_style_rules<'i>(
    parser: &mut Parser<'i, '_>,
) -> std::result::Result<Vec<StyleText>, CssParseError<'i, ()>> {
    let mut rules = vec![];
    while let Some(selector) = block_prelude(parser)? {
        if selector.starts_with('@') {
            return Err(parser.new_custom_error(()));
        }
        let declarations = parser.parse_nested_block(|p| raw_text(p))?;
        rules.push(StyleText {
            selector,
            declarations: declarations.trim().to_string(),
        });
    }
    Ok(rules)
}

/// Read a rule prelude and consume the opening of its block.
fn block_prelude<'i>(
    parser: &mut Parser<'i, '_>,
) -> std::result::Result<Option<String>, CssParseError<'i, ()>> {
    parser.skip_whitespace();
    if parser.is_exhausted() {
        return Ok(None);
    }
    let prelude = parser.parse_until_before(Delimiter::CurlyBracketBlock, |p| raw_text(p))?;
    let opened = matches!(parser.next(), Ok(Token::CurlyBracketBlock));
    if !opened {
        return Err(parser.new_custom_error(()));
    }
    Ok(Some(prelude.trim().to_string()))
}

/// Consume the rest of the input, returning it verbatim.
fn raw_text<'i>(
    parser: &mut Parser<'i, '_>,
) -> std::result::Result<&'i str, CssParseError<'i, ()>> {
    let start = parser.position();
    while parser.next_including_whitespace_and_comments().is_ok() {}
    Ok(parser.slice_from(start))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSS: &str = ".a{color:red;}.a:hover{color:blue;}@media print{.a{color:black;}.b{margin:0;}}";

    #[test]
    fn from_css_reproduces_text() {
        let surface = MemorySurface::from_css(CSS).unwrap();

        assert_eq!(surface.text_content(), CSS);
        assert_eq!(surface.rule_count(None), 3);
        assert_eq!(surface.insertions(), 0);

        let media = surface.rule_at(None, 2).unwrap();
        assert_eq!(surface.rule_count(Some(media)), 2);
    }

    #[test]
    fn from_css_trims_whitespace() {
        let surface = MemorySurface::from_css(
            "
            .a { color: red; }
            @media (max-width: 10px) {
                .b:hover, .c { margin: 0 }
            }
            ",
        )
        .unwrap();

        assert_eq!(
            surface.text_content(),
            ".a{color: red;}@media (max-width: 10px){.b:hover, .c{margin: 0}}"
        );
    }

    #[test]
    fn from_css_rejects_unterminated_input() {
        assert!(matches!(
            MemorySurface::from_css(".a"),
            Err(Error::Parse { .. })
        ));
        assert!(MemorySurface::from_css("@font-face{src:none;}").is_err());
    }

    #[test]
    fn insert_and_rewrite() {
        let mut surface = MemorySurface::new();
        let b = surface.insert_rule(None, ".b{margin:0;}", 0).unwrap();
        let a = surface.insert_rule(None, ".a{color:red;}", 0).unwrap();

        assert_eq!(surface.rule_at(None, 0), Some(a));
        assert_eq!(surface.insertions(), 2);

        surface.set_selector_text(b, ".b,.b.c").unwrap();
        assert_eq!(surface.selector_text(b), Some(".b,.b.c"));
        assert_eq!(surface.text_content(), ".a{color:red;}.b,.b.c{margin:0;}");
    }

    #[test]
    fn insertion_errors() {
        let mut surface = MemorySurface::new();
        let a = surface.insert_rule(None, ".a{color:red;}", 0).unwrap();

        assert!(surface.insert_rule(None, ".b{}", 5).is_err());
        assert!(surface.insert_rule(Some(a), ".b{}", 0).is_err());
        assert!(surface.insert_rule(None, ".b{}.c{}", 0).is_err());
        assert!(surface.set_selector_text(RuleHandle::new(99), ".x").is_err());
        assert_eq!(surface.insertions(), 1);
    }

    #[test]
    fn clear_removes_everything() {
        let mut surface = MemorySurface::from_css(CSS).unwrap();
        surface.clear();

        assert_eq!(surface.rule_count(None), 0);
        assert_eq!(surface.text_content(), "");
    }
}
