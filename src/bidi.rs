//! Directional isolates – wrapping runs so the surrounding paragraph
//! direction can neither leak in nor out.
//!
//! Only the isolate family (LRI/RLI/FSI … PDI) is produced here. The legacy
//! embedding and override controls are recognised so that callers can reject
//! strings that carry them unbalanced.

/// LEFT-TO-RIGHT ISOLATE.
pub const LRI: char = '\u{2066}';
/// RIGHT-TO-LEFT ISOLATE.
pub const RLI: char = '\u{2067}';
/// FIRST STRONG ISOLATE.
pub const FSI: char = '\u{2068}';
/// POP DIRECTIONAL ISOLATE.
pub const PDI: char = '\u{2069}';

/// Legacy embedding/override openers (LRE, RLE, LRO, RLO).
const EMBEDDING_OPENERS: [char; 4] = ['\u{202A}', '\u{202B}', '\u{202D}', '\u{202E}'];
/// POP DIRECTIONAL FORMATTING.
const PDF_CONTROL: char = '\u{202C}';

/// True for LRI, RLI, FSI and PDI.
pub fn is_isolate_control(c: char) -> bool {
    matches!(c, LRI | RLI | FSI | PDI)
}

/// True for every explicit directional formatting character.
pub fn is_directional_control(c: char) -> bool {
    is_isolate_control(c) || EMBEDDING_OPENERS.contains(&c) || c == PDF_CONTROL
}

/// Does `s` contain any isolate control character?
pub fn contains_dir_isolate(s: &str) -> bool {
    s.chars().any(is_isolate_control)
}

/// Wrap `s` in an LRI … PDI pair.
pub fn wrap_ltr(s: &str) -> String {
    wrap(LRI, s)
}

/// Wrap `s` in an RLI … PDI pair.
pub fn wrap_rtl(s: &str) -> String {
    wrap(RLI, s)
}

fn wrap(open: char, s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 6);
    out.push(open);
    out.push_str(s);
    out.push(PDI);
    out
}

/// Remove every isolate control character.
pub fn strip_isolates(s: &str) -> String {
    s.chars().filter(|c| !is_isolate_control(*c)).collect()
}

/// Check that isolates and embeddings nest properly: every opener has a
/// matching closer of its own family and no closer appears without an
/// opener. Nesting depth is unbounded.
pub fn isolates_balanced(s: &str) -> bool {
    let mut stack: Vec<bool> = Vec::new(); // true = isolate, false = embedding
    for c in s.chars() {
        if matches!(c, LRI | RLI | FSI) {
            stack.push(true);
        } else if EMBEDDING_OPENERS.contains(&c) {
            stack.push(false);
        } else if c == PDI {
            // A PDI also closes any embeddings opened inside the isolate.
            while let Some(false) = stack.last() {
                stack.pop();
            }
            if stack.pop() != Some(true) {
                return false;
            }
        } else if c == PDF_CONTROL && stack.pop() != Some(false) {
            return false;
        }
    }
    stack.is_empty()
}

/// Is `s` exactly one isolated run, i.e. it opens with an isolate whose
/// matching PDI is the final character?
pub fn is_isolated_run(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(LRI | RLI | FSI) => {}
        _ => return false,
    }
    let mut depth = 1usize;
    let mut rest = chars.peekable();
    while let Some(c) = rest.next() {
        match c {
            LRI | RLI | FSI => depth += 1,
            PDI => {
                depth -= 1;
                if depth == 0 {
                    return rest.peek().is_none();
                }
            }
            _ => {}
        }
    }
    false
}

/// Contents of a single isolated run with its outer opener and PDI removed.
pub fn isolate_body(s: &str) -> Option<&str> {
    if !is_isolated_run(s) {
        return None;
    }
    let open = s.chars().next()?.len_utf8();
    s.get(open..s.len() - PDI.len_utf8())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_and_detect() {
        let w = wrap_ltr("12");
        assert_eq!(w, "\u{2066}12\u{2069}");
        assert!(contains_dir_isolate(&w));
        assert!(!contains_dir_isolate("12"));
        assert_eq!(strip_isolates(&wrap_rtl("abc")), "abc");
    }

    #[test]
    fn balance_checks() {
        assert!(isolates_balanced("plain"));
        assert!(isolates_balanced(&format!("{} {}", wrap_ltr("1"), wrap_rtl("x"))));
        assert!(isolates_balanced(&wrap_rtl(&wrap_ltr(&wrap_rtl("deep")))));
        assert!(!isolates_balanced("\u{2067}open"));
        assert!(!isolates_balanced("close\u{2069}"));
        assert!(!isolates_balanced("\u{202B}x\u{2069}"));
        // PDI terminates embeddings opened inside its isolate.
        assert!(isolates_balanced("\u{2067}\u{202B}x\u{2069}"));
    }

    #[test]
    fn isolated_run_detection() {
        assert!(is_isolated_run(&wrap_rtl("abc")));
        assert!(is_isolated_run(&wrap_rtl(&wrap_ltr("1"))));
        let siblings = format!("{} {}", wrap_ltr("1"), wrap_rtl("x"));
        assert!(!is_isolated_run(&siblings));
        assert!(!is_isolated_run("abc"));
        assert!(!is_isolated_run(""));
    }

    #[test]
    fn isolate_body_strips_outer_pair_only() {
        assert_eq!(isolate_body(&wrap_rtl("abc")), Some("abc"));
        let nested = wrap_ltr(&wrap_rtl("x"));
        assert_eq!(isolate_body(&nested), Some(wrap_rtl("x").as_str()));
        assert_eq!(isolate_body("abc"), None);
    }
}
