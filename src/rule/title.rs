//! Plain-text titles from inline markdown.
//!
//! Rule names may contain emphasis and code spans. Page titles must be
//! plain text, so this strips the markup while keeping every character
//! that markdown would render:
//!
//! - code spans keep their content literally (`` `*a*` `` → `*a*`)
//! - matched `*` / `_` delimiter runs are removed, including nested and
//!   adjacent ones (`***a***`, `*a**b**c*`)
//! - a run that can both open and close does not pair with a run when
//!   their lengths add up to a multiple of 3, unless both lengths are
//!   multiples of 3 (`**a*b**` → `a*b`)
//! - `_` inside a word is text (`ACT_taskforce`)
//! - delimiters without a partner stay as text
//! - `\*` escapes a marker
//!
//! Whitespace is collapsed to single spaces and trimmed.

#[derive(Debug)]
enum Token {
    Text(String),
    Delim(Delim),
}

#[derive(Debug)]
struct Delim {
    ch: char,
    count: usize,
    /// Length of the run before any matching.
    len: usize,
    can_open: bool,
    can_close: bool,
}

/// Strip inline markup from `name`.
pub fn strip_markup(name: &str) -> String {
    let mut tokens = tokenize(name);
    match_delimiters(&mut tokens);

    let mut out = String::with_capacity(name.len());
    for token in &tokens {
        match token {
            Token::Text(text) => out.push_str(text),
            Token::Delim(d) => out.extend(std::iter::repeat_n(d.ch, d.count)),
        }
    }
    collapse_whitespace(&out)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_punct(c: char) -> bool {
    c.is_ascii_punctuation() || (!c.is_alphanumeric() && !c.is_whitespace())
}

fn tokenize(input: &str) -> Vec<Token> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\\' if chars.get(i + 1).is_some_and(|n| n.is_ascii_punctuation()) => {
                text.push(chars[i + 1]);
                i += 2;
            }
            '`' => {
                let run = run_length(&chars, i, '`');
                match find_closing_backticks(&chars, i + run, run) {
                    Some(close) => {
                        let code: String = chars[i + run..close].iter().collect();
                        text.push_str(&code);
                        i = close + run;
                    }
                    None => {
                        text.extend(std::iter::repeat_n('`', run));
                        i += run;
                    }
                }
            }
            '*' | '_' => {
                let run = run_length(&chars, i, c);
                let before = i.checked_sub(1).map(|p| chars[p]);
                let after = chars.get(i + run).copied();
                if !text.is_empty() {
                    tokens.push(Token::Text(std::mem::take(&mut text)));
                }
                tokens.push(Token::Delim(flanking(c, run, before, after)));
                i += run;
            }
            _ => {
                text.push(c);
                i += 1;
            }
        }
    }

    if !text.is_empty() {
        tokens.push(Token::Text(text));
    }
    tokens
}

fn run_length(chars: &[char], start: usize, ch: char) -> usize {
    chars[start..].iter().take_while(|c| **c == ch).count()
}

/// Start index of the next backtick run of exactly `len` characters.
fn find_closing_backticks(chars: &[char], from: usize, len: usize) -> Option<usize> {
    let mut i = from;
    while i < chars.len() {
        if chars[i] == '`' {
            let run = run_length(chars, i, '`');
            if run == len {
                return Some(i);
            }
            i += run;
        } else {
            i += 1;
        }
    }
    None
}

/// Classify a delimiter run by the characters around it.
fn flanking(ch: char, count: usize, before: Option<char>, after: Option<char>) -> Delim {
    // Start and end of input count as whitespace.
    let before_ws = before.is_none_or(char::is_whitespace);
    let after_ws = after.is_none_or(char::is_whitespace);
    let before_punct = before.is_some_and(is_punct);
    let after_punct = after.is_some_and(is_punct);

    let left = !after_ws && (!after_punct || before_ws || before_punct);
    let right = !before_ws && (!before_punct || after_ws || after_punct);

    let (can_open, can_close) = if ch == '_' {
        (left && (!right || before_punct), right && (!left || after_punct))
    } else {
        (left, right)
    };

    Delim {
        ch,
        count,
        len: count,
        can_open,
        can_close,
    }
}

/// Pair closers with the nearest compatible opener, consuming matched
/// characters from both runs.
fn match_delimiters(tokens: &mut [Token]) {
    let mut openers: Vec<usize> = Vec::new();

    for i in 0..tokens.len() {
        let Token::Delim(closer) = &tokens[i] else {
            continue;
        };
        let (can_open, can_close) = (closer.can_open, closer.can_close);

        if can_close {
            while delim_count(&tokens[i]) > 0 {
                let Some(pos) = openers
                    .iter()
                    .rposition(|&o| can_pair(&tokens[o], &tokens[i]))
                else {
                    break;
                };
                let opener = openers[pos];
                let used = if delim_count(&tokens[opener]) >= 2 && delim_count(&tokens[i]) >= 2 {
                    2
                } else {
                    1
                };
                consume(&mut tokens[opener], used);
                consume(&mut tokens[i], used);

                // Openers between the pair can no longer match anything.
                openers.truncate(pos + 1);
                if delim_count(&tokens[opener]) == 0 {
                    openers.pop();
                }
            }
        }

        if can_open && delim_count(&tokens[i]) > 0 {
            openers.push(i);
        }
    }
}

fn can_pair(opener: &Token, closer: &Token) -> bool {
    let (Token::Delim(o), Token::Delim(c)) = (opener, closer) else {
        return false;
    };
    if o.ch != c.ch {
        return false;
    }
    let both_ways = o.can_close || c.can_open;
    !(both_ways && (o.len + c.len) % 3 == 0 && !(o.len % 3 == 0 && c.len % 3 == 0))
}

fn delim_count(token: &Token) -> usize {
    match token {
        Token::Delim(d) => d.count,
        Token::Text(_) => 0,
    }
}

fn consume(token: &mut Token, used: usize) {
    if let Token::Delim(d) = token {
        d.count -= used;
    }
}
