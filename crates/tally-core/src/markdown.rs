//! Small markdown subset for displaying AI analyses
//!
//! Supports `#`..`###` headings, `-`/`*`/`+` bullets, `1.` ordered items,
//! paragraphs and inline `**bold**`. Anything else is shown as plain text.

use std::sync::OnceLock;

use colored::Colorize;
use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, text: String },
    Bullet(String),
    Ordered { number: u32, text: String },
    /// Consecutive text lines joined with a space
    Paragraph(String),
}

impl Block {
    fn is_list_item(&self) -> bool {
        matches!(self, Block::Bullet(_) | Block::Ordered { .. })
    }
}

/// A run of inline text, bold or not
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span<'a> {
    pub text: &'a str,
    pub bold: bool,
}

fn heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(#{1,3})\s+(.*)$").expect("valid regex"))
}

fn bullet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[-*+]\s+(.*)$").expect("valid regex"))
}

fn ordered_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)[.)]\s+(.*)$").expect("valid regex"))
}

fn bold_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid regex"))
}

pub fn parse(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();

    fn flush(paragraph: &mut Vec<&str>, blocks: &mut Vec<Block>) {
        if !paragraph.is_empty() {
            blocks.push(Block::Paragraph(paragraph.join(" ")));
            paragraph.clear();
        }
    }

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            flush(&mut paragraph, &mut blocks);
            continue;
        }

        if let Some(caps) = heading_re().captures(line) {
            flush(&mut paragraph, &mut blocks);
            blocks.push(Block::Heading {
                level: caps[1].len() as u8,
                text: caps[2].trim().to_string(),
            });
        } else if let Some(caps) = bullet_re().captures(line) {
            flush(&mut paragraph, &mut blocks);
            blocks.push(Block::Bullet(caps[1].trim().to_string()));
        } else if let Some(caps) = ordered_re().captures(line) {
            flush(&mut paragraph, &mut blocks);
            match caps[1].parse::<u32>() {
                Ok(number) => blocks.push(Block::Ordered {
                    number,
                    text: caps[2].trim().to_string(),
                }),
                // absurdly long number, keep it as text
                Err(_) => paragraph.push(line),
            }
        } else {
            paragraph.push(line);
        }
    }
    flush(&mut paragraph, &mut blocks);

    blocks
}

/// Split inline text into bold and regular spans
pub fn spans(text: &str) -> Vec<Span<'_>> {
    let mut out = Vec::new();
    let mut last = 0;
    for caps in bold_re().captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            out.push(Span {
                text: &text[last..whole.start()],
                bold: false,
            });
        }
        out.push(Span {
            text: inner.as_str(),
            bold: true,
        });
        last = whole.end();
    }
    if last < text.len() {
        out.push(Span {
            text: &text[last..],
            bold: false,
        });
    }
    out
}

fn render(blocks: &[Block], styled: bool) -> String {
    let inline = |text: &str| -> String {
        spans(text)
            .into_iter()
            .map(|s| {
                if s.bold && styled {
                    s.text.bold().to_string()
                } else {
                    s.text.to_string()
                }
            })
            .collect()
    };

    let mut out = String::new();
    let mut previous: Option<&Block> = None;
    for block in blocks {
        if let Some(prev) = previous {
            out.push('\n');
            if !(prev.is_list_item() && block.is_list_item()) {
                out.push('\n');
            }
        }

        let line = match block {
            Block::Heading { level, text } => {
                let plain: String = spans(text).into_iter().map(|s| s.text).collect();
                if !styled {
                    plain
                } else {
                    match level {
                        1 => plain.bold().underline().to_string(),
                        2 => plain.cyan().bold().to_string(),
                        _ => plain.bold().to_string(),
                    }
                }
            }
            Block::Bullet(text) => format!("  • {}", inline(text)),
            Block::Ordered { number, text } => format!("  {}. {}", number, inline(text)),
            Block::Paragraph(text) => inline(text),
        };
        out.push_str(&line);
        previous = Some(block);
    }
    out
}

/// Render without any styling
pub fn render_plain(blocks: &[Block]) -> String {
    render(blocks, false)
}

/// Render with terminal styling (honors `NO_COLOR` and non-tty output)
pub fn render_terminal(blocks: &[Block]) -> String {
    render(blocks, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# January
## Where it went

You spent **1100.00** this month,
mostly on leisure.

- **Svago**: 500.00
* Spesa: 400.00
+ Other
1. Cook at home
2) Cancel the gym
#### not a heading
";

    #[test]
    fn test_parse_blocks() {
        let blocks = parse(SAMPLE);
        assert_eq!(
            blocks,
            vec![
                Block::Heading {
                    level: 1,
                    text: "January".into()
                },
                Block::Heading {
                    level: 2,
                    text: "Where it went".into()
                },
                Block::Paragraph("You spent **1100.00** this month, mostly on leisure.".into()),
                Block::Bullet("**Svago**: 500.00".into()),
                Block::Bullet("Spesa: 400.00".into()),
                Block::Bullet("Other".into()),
                Block::Ordered {
                    number: 1,
                    text: "Cook at home".into()
                },
                Block::Ordered {
                    number: 2,
                    text: "Cancel the gym".into()
                },
                Block::Paragraph("#### not a heading".into()),
            ]
        );
    }

    #[test]
    fn test_bold_line_is_not_a_bullet() {
        assert_eq!(
            parse("**Total** is fine"),
            vec![Block::Paragraph("**Total** is fine".into())]
        );
    }

    #[test]
    fn test_spans() {
        let spans = spans("a **b** c **d**");
        let parts: Vec<(&str, bool)> = spans.iter().map(|s| (s.text, s.bold)).collect();
        assert_eq!(
            parts,
            vec![("a ", false), ("b", true), (" c ", false), ("d", true)]
        );
        assert_eq!(super::spans("no markup").len(), 1);
        // unmatched markers stay literal
        assert_eq!(super::spans("**open").first().map(|s| s.bold), Some(false));
    }

    #[test]
    fn test_render_plain() {
        let text = render_plain(&parse("## Tips\n\n- **Cook** more\n- Walk\n\nDone."));
        assert_eq!(text, "Tips\n\n  • Cook more\n  • Walk\n\nDone.");
    }

    #[test]
    fn test_render_terminal_without_color_matches_plain() {
        colored::control::set_override(false);
        let blocks = parse(SAMPLE);
        assert_eq!(render_terminal(&blocks), render_plain(&blocks));
        colored::control::unset_override();
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").is_empty());
        assert!(parse("\n  \n").is_empty());
        assert_eq!(render_plain(&[]), "");
    }
}
