//! Block-level syntax tree for markdown bodies.
//!
//! Only the block structure is modelled. Inline content (emphasis, links,
//! code spans) stays as raw text inside paragraphs and headings, since
//! nothing downstream renders it.
//!
//! Every block remembers the source lines it came from, so that later
//! passes can splice content after a block without re-serializing the tree.

/// Half-open range of 0-based line numbers in the parsed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading {
        text: String,
        span: Span,
    },
    /// Fenced code block. `value` is the literal text between the fences.
    Code {
        lang: Option<String>,
        value: String,
        span: Span,
    },
    Paragraph {
        span: Span,
    },
    /// Link reference definition: `[label]: url "title"`.
    Definition {
        label: String,
        url: String,
        title: Option<String>,
        span: Span,
    },
    BlockQuote {
        children: Vec<Block>,
        span: Span,
    },
    List {
        items: Vec<Vec<Block>>,
        span: Span,
    },
    ThematicBreak {
        span: Span,
    },
}

impl Block {
    pub const fn span(&self) -> Span {
        match self {
            Self::Heading { span, .. }
            | Self::Code { span, .. }
            | Self::Paragraph { span, .. }
            | Self::Definition { span, .. }
            | Self::BlockQuote { span, .. }
            | Self::List { span, .. }
            | Self::ThematicBreak { span } => *span,
        }
    }

    fn children(&self) -> Vec<&Block> {
        match self {
            Self::BlockQuote { children, .. } => children.iter().collect(),
            Self::List { items, .. } => items.iter().flatten().collect(),
            _ => Vec::new(),
        }
    }
}

/// Parsed body of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentTree {
    pub blocks: Vec<Block>,
}

impl DocumentTree {
    pub fn parse(text: &str) -> Self {
        let lines: Vec<Line<'_>> = text
            .lines()
            .enumerate()
            .map(|(no, text)| Line { no, text })
            .collect();
        Self {
            blocks: parse_blocks(&lines),
        }
    }

    /// Depth-first, pre-order traversal over all blocks, in document order.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: self.blocks.iter().rev().collect(),
        }
    }
}

pub struct Walk<'a> {
    stack: Vec<&'a Block>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Block;

    fn next(&mut self) -> Option<Self::Item> {
        let block = self.stack.pop()?;
        self.stack.extend(block.children().into_iter().rev());
        Some(block)
    }
}

// ============================================================================
// Parser
// ============================================================================

/// A source line; `no` is always the line number in the original text,
/// also for lines re-sliced out of block quotes and list items.
#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    no: usize,
    text: &'a str,
}

impl<'a> Line<'a> {
    fn indent(&self) -> usize {
        self.text.len() - self.text.trim_start().len()
    }

    fn trimmed(&self) -> &'a str {
        self.text.trim_start()
    }

    fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

fn parse_blocks(lines: &[Line<'_>]) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut para: Vec<Line<'_>> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        if line.is_blank() {
            flush_paragraph(&mut para, &mut blocks);
            i += 1;
            continue;
        }

        let trimmed = line.trimmed();
        if line.indent() > 3 {
            para.push(line);
            i += 1;
            continue;
        }

        if let Some(fence) = open_fence(trimmed) {
            flush_paragraph(&mut para, &mut blocks);
            let (block, next) = parse_fenced_code(lines, i, &fence);
            blocks.push(block);
            i = next;
            continue;
        }

        if let Some(text) = atx_heading(trimmed) {
            flush_paragraph(&mut para, &mut blocks);
            blocks.push(Block::Heading {
                text: text.to_owned(),
                span: Span::new(line.no, line.no + 1),
            });
            i += 1;
            continue;
        }

        if !para.is_empty() && is_setext_underline(trimmed) {
            let start = para[0].no;
            let text = join_trimmed(&para);
            para.clear();
            blocks.push(Block::Heading {
                text,
                span: Span::new(start, line.no + 1),
            });
            i += 1;
            continue;
        }

        if is_thematic_break(trimmed) {
            flush_paragraph(&mut para, &mut blocks);
            blocks.push(Block::ThematicBreak {
                span: Span::new(line.no, line.no + 1),
            });
            i += 1;
            continue;
        }

        if trimmed.starts_with('>') {
            flush_paragraph(&mut para, &mut blocks);
            let (block, next) = parse_block_quote(lines, i);
            blocks.push(block);
            i = next;
            continue;
        }

        if list_marker(trimmed).is_some() {
            flush_paragraph(&mut para, &mut blocks);
            let (block, next) = parse_list(lines, i);
            blocks.push(block);
            i = next;
            continue;
        }

        if para.is_empty()
            && let Some(block) = parse_definition(line)
        {
            blocks.push(block);
            i += 1;
            continue;
        }

        para.push(line);
        i += 1;
    }

    flush_paragraph(&mut para, &mut blocks);
    blocks
}

fn flush_paragraph(para: &mut Vec<Line<'_>>, blocks: &mut Vec<Block>) {
    let (Some(first), Some(last)) = (para.first(), para.last()) else {
        return;
    };
    blocks.push(Block::Paragraph {
        span: Span::new(first.no, last.no + 1),
    });
    para.clear();
}

fn join_trimmed(lines: &[Line<'_>]) -> String {
    lines
        .iter()
        .map(|l| l.text.trim())
        .collect::<Vec<_>>()
        .join("\n")
}

// ----------------------------------------------------------------------------
// Fenced code
// ----------------------------------------------------------------------------

struct Fence<'a> {
    ch: char,
    len: usize,
    info: &'a str,
}

fn open_fence(trimmed: &str) -> Option<Fence<'_>> {
    let ch = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = trimmed.chars().take_while(|c| *c == ch).count();
    if len < 3 {
        return None;
    }
    let info = trimmed[len..].trim();
    if ch == '`' && info.contains('`') {
        return None;
    }
    Some(Fence { ch, len, info })
}

fn closes_fence(line: &Line<'_>, fence: &Fence<'_>) -> bool {
    if line.indent() > 3 {
        return false;
    }
    let trimmed = line.trimmed();
    let run = trimmed.chars().take_while(|c| *c == fence.ch).count();
    run >= fence.len && trimmed[run..].trim().is_empty()
}

fn parse_fenced_code(lines: &[Line<'_>], start: usize, fence: &Fence<'_>) -> (Block, usize) {
    let mut end = start + 1;
    while end < lines.len() && !closes_fence(&lines[end], fence) {
        end += 1;
    }

    let value = lines[start + 1..end]
        .iter()
        .map(|l| l.text)
        .collect::<Vec<_>>()
        .join("\n");

    let lang = fence.info.split_whitespace().next().map(str::to_owned);

    // An unclosed fence runs to the end of its container.
    let next = if end < lines.len() { end + 1 } else { end };
    let last_no = lines[next - 1].no;

    let block = Block::Code {
        lang,
        value,
        span: Span::new(lines[start].no, last_no + 1),
    };
    (block, next)
}

// ----------------------------------------------------------------------------
// Headings and breaks
// ----------------------------------------------------------------------------

fn atx_heading(trimmed: &str) -> Option<&str> {
    let depth = trimmed.chars().take_while(|c| *c == '#').count();
    if !(1..=6).contains(&depth) {
        return None;
    }
    let rest = &trimmed[depth..];
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        return None;
    }

    let mut text = rest.trim();
    // Optional closing sequence: "## Title ##"
    let without_hashes = text.trim_end_matches('#');
    if without_hashes.is_empty() {
        text = "";
    } else if without_hashes.ends_with([' ', '\t']) {
        text = without_hashes.trim_end();
    }
    Some(text)
}

fn is_setext_underline(trimmed: &str) -> bool {
    let text = trimmed.trim_end();
    !text.is_empty() && (text.chars().all(|c| c == '=') || text.chars().all(|c| c == '-'))
}

fn is_thematic_break(trimmed: &str) -> bool {
    let Some(ch) = trimmed.chars().next().filter(|c| matches!(c, '-' | '*' | '_')) else {
        return false;
    };
    let mut count = 0;
    for c in trimmed.chars() {
        match c {
            c if c == ch => count += 1,
            ' ' | '\t' => {}
            _ => return false,
        }
    }
    count >= 3
}

// ----------------------------------------------------------------------------
// Containers
// ----------------------------------------------------------------------------

fn parse_block_quote<'a>(lines: &[Line<'a>], start: usize) -> (Block, usize) {
    let mut inner = Vec::new();
    let mut i = start;
    while i < lines.len() && lines[i].indent() <= 3 {
        let trimmed = lines[i].trimmed();
        let Some(rest) = trimmed.strip_prefix('>') else {
            break;
        };
        let rest = rest.strip_prefix(' ').unwrap_or(rest);
        inner.push(Line {
            no: lines[i].no,
            text: rest,
        });
        i += 1;
    }

    let block = Block::BlockQuote {
        children: parse_blocks(&inner),
        span: Span::new(lines[start].no, lines[i - 1].no + 1),
    };
    (block, i)
}

/// Width of a list marker including the spaces after it, for a line with
/// leading whitespace already removed.
fn list_marker(trimmed: &str) -> Option<usize> {
    if is_thematic_break(trimmed) {
        return None;
    }

    let bytes = trimmed.as_bytes();
    let marker_len = match bytes.first()? {
        b'-' | b'*' | b'+' => 1,
        b'0'..=b'9' => {
            let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
            if digits > 9 || !matches!(bytes.get(digits), Some(b'.' | b')')) {
                return None;
            }
            digits + 1
        }
        _ => return None,
    };

    let rest = &trimmed[marker_len..];
    if rest.is_empty() {
        return Some(marker_len + 1);
    }
    if !rest.starts_with(' ') {
        return None;
    }
    let spaces = rest.chars().take_while(|c| *c == ' ').count();
    if spaces > 4 || spaces == rest.len() {
        Some(marker_len + 1)
    } else {
        Some(marker_len + spaces)
    }
}

/// Whether a non-indented line interrupts a lazy paragraph continuation.
fn starts_block(trimmed: &str) -> bool {
    open_fence(trimmed).is_some()
        || atx_heading(trimmed).is_some()
        || is_thematic_break(trimmed)
        || trimmed.starts_with('>')
        || list_marker(trimmed).is_some()
}

fn parse_list<'a>(lines: &[Line<'a>], start: usize) -> (Block, usize) {
    let base_indent = lines[start].indent();
    let mut items = Vec::new();
    let mut i = start;
    let mut last_content;

    loop {
        let line = lines[i];
        let trimmed = line.trimmed();
        let width = list_marker(trimmed).unwrap_or(trimmed.len());
        let offset = line.indent() + width;

        let mut item = vec![Line {
            no: line.no,
            text: trimmed.get(width..).unwrap_or(""),
        }];
        last_content = i;
        i += 1;

        let mut last_blank = false;
        while i < lines.len() {
            let next = lines[i];
            if next.is_blank() {
                item.push(Line { no: next.no, text: "" });
                last_blank = true;
            } else if next.indent() >= offset {
                item.push(Line {
                    no: next.no,
                    text: next.text.get(offset..).unwrap_or(""),
                });
                last_blank = false;
                last_content = i;
            } else if !last_blank && !starts_block(next.trimmed()) {
                // Lazy paragraph continuation.
                item.push(Line {
                    no: next.no,
                    text: next.trimmed(),
                });
                last_content = i;
            } else {
                break;
            }
            i += 1;
        }

        while item.last().is_some_and(Line::is_blank) {
            item.pop();
        }
        items.push(parse_blocks(&item));

        let continues = lines.get(i).is_some_and(|next| {
            next.indent() == base_indent && list_marker(next.trimmed()).is_some()
        });
        if !continues {
            break;
        }
    }

    let block = Block::List {
        items,
        span: Span::new(lines[start].no, lines[last_content].no + 1),
    };
    (block, i)
}

// ----------------------------------------------------------------------------
// Link reference definitions
// ----------------------------------------------------------------------------

fn parse_definition(line: Line<'_>) -> Option<Block> {
    let trimmed = line.trimmed();
    let rest = trimmed.strip_prefix('[')?;
    let close = rest.find("]:")?;
    let label = &rest[..close];
    if label.trim().is_empty() || label.contains(['[', ']']) {
        return None;
    }

    let after = rest[close + 2..].trim();
    let (url, title_part) = match after.split_once(char::is_whitespace) {
        Some((url, title)) => (url, title.trim()),
        None => (after, ""),
    };
    if url.is_empty() {
        return None;
    }
    let url = url
        .strip_prefix('<')
        .and_then(|u| u.strip_suffix('>'))
        .unwrap_or(url);

    let title = if title_part.is_empty() {
        None
    } else {
        let unquoted = [('"', '"'), ('\'', '\''), ('(', ')')]
            .iter()
            .find_map(|(open, close)| {
                title_part
                    .strip_prefix(*open)
                    .and_then(|t| t.strip_suffix(*close))
            })?;
        Some(unquoted.to_owned())
    };

    Some(Block::Definition {
        label: label.to_owned(),
        url: url.to_owned(),
        title,
        span: Span::new(line.no, line.no + 1),
    })
}
