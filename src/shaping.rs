//! Glyph shaper – logical-order Arabic text to presentation-ordered,
//! RTL-isolated text for renderers without bidi or OpenType shaping.
//!
//! Three passes per line:
//!
//! 1. **Forms** – each letter is replaced by its isolated / initial /
//!    medial / final presentation form from the joining types of its nearest
//!    non-transparent neighbours; lam + alef pairs become one ligature.
//! 2. **Reorder** – the line is laid out in visual order at an RTL paragraph
//!    level (`unicode-bidi`); LTR runs keep their order, RTL runs are
//!    reversed with paired brackets mirrored.
//! 3. **Isolate** – the result is wrapped in RLI … PDI.

use std::borrow::Cow;

use unicode_bidi::{BidiInfo, Level};

use crate::bidi::{is_directional_control, isolate_body, isolates_balanced, wrap_rtl, RLI};
use crate::error::ShapingError;

/// How a character takes part in cursive joining.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Joining {
    /// Joins on both sides (beh, seen, lam, …).
    Dual,
    /// Joins only to the preceding letter (alef, dal, reh, waw, …).
    Right,
    /// Never joins (hamza, spaces, digits, Latin, already-shaped forms).
    NonJoining,
    /// Combining marks; skipped when locating neighbours.
    Transparent,
    /// Tatweel and ZWJ: join both sides but have no forms of their own.
    Causing,
}

impl Joining {
    fn links_forward(self) -> bool {
        matches!(self, Joining::Dual | Joining::Causing)
    }

    fn links_backward(self) -> bool {
        matches!(self, Joining::Dual | Joining::Right | Joining::Causing)
    }
}

/// `(base, isolated, final, initial, medial)`; `0` marks an absent form.
/// Sorted by base code point.
const LETTERS: &[(u32, u32, u32, u32, u32)] = &[
    (0x0621, 0xFE80, 0, 0, 0),
    (0x0622, 0xFE81, 0xFE82, 0, 0),
    (0x0623, 0xFE83, 0xFE84, 0, 0),
    (0x0624, 0xFE85, 0xFE86, 0, 0),
    (0x0625, 0xFE87, 0xFE88, 0, 0),
    (0x0626, 0xFE89, 0xFE8A, 0xFE8B, 0xFE8C),
    (0x0627, 0xFE8D, 0xFE8E, 0, 0),
    (0x0628, 0xFE8F, 0xFE90, 0xFE91, 0xFE92),
    (0x0629, 0xFE93, 0xFE94, 0, 0),
    (0x062A, 0xFE95, 0xFE96, 0xFE97, 0xFE98),
    (0x062B, 0xFE99, 0xFE9A, 0xFE9B, 0xFE9C),
    (0x062C, 0xFE9D, 0xFE9E, 0xFE9F, 0xFEA0),
    (0x062D, 0xFEA1, 0xFEA2, 0xFEA3, 0xFEA4),
    (0x062E, 0xFEA5, 0xFEA6, 0xFEA7, 0xFEA8),
    (0x062F, 0xFEA9, 0xFEAA, 0, 0),
    (0x0630, 0xFEAB, 0xFEAC, 0, 0),
    (0x0631, 0xFEAD, 0xFEAE, 0, 0),
    (0x0632, 0xFEAF, 0xFEB0, 0, 0),
    (0x0633, 0xFEB1, 0xFEB2, 0xFEB3, 0xFEB4),
    (0x0634, 0xFEB5, 0xFEB6, 0xFEB7, 0xFEB8),
    (0x0635, 0xFEB9, 0xFEBA, 0xFEBB, 0xFEBC),
    (0x0636, 0xFEBD, 0xFEBE, 0xFEBF, 0xFEC0),
    (0x0637, 0xFEC1, 0xFEC2, 0xFEC3, 0xFEC4),
    (0x0638, 0xFEC5, 0xFEC6, 0xFEC7, 0xFEC8),
    (0x0639, 0xFEC9, 0xFECA, 0xFECB, 0xFECC),
    (0x063A, 0xFECD, 0xFECE, 0xFECF, 0xFED0),
    (0x0641, 0xFED1, 0xFED2, 0xFED3, 0xFED4),
    (0x0642, 0xFED5, 0xFED6, 0xFED7, 0xFED8),
    (0x0643, 0xFED9, 0xFEDA, 0xFEDB, 0xFEDC),
    (0x0644, 0xFEDD, 0xFEDE, 0xFEDF, 0xFEE0),
    (0x0645, 0xFEE1, 0xFEE2, 0xFEE3, 0xFEE4),
    (0x0646, 0xFEE5, 0xFEE6, 0xFEE7, 0xFEE8),
    (0x0647, 0xFEE9, 0xFEEA, 0xFEEB, 0xFEEC),
    (0x0648, 0xFEED, 0xFEEE, 0, 0),
    (0x0649, 0xFEEF, 0xFEF0, 0xFBE8, 0xFBE9),
    (0x064A, 0xFEF1, 0xFEF2, 0xFEF3, 0xFEF4),
    (0x0671, 0xFB50, 0xFB51, 0, 0),
    (0x0679, 0xFB66, 0xFB67, 0xFB68, 0xFB69),
    (0x067E, 0xFB56, 0xFB57, 0xFB58, 0xFB59),
    (0x0686, 0xFB7A, 0xFB7B, 0xFB7C, 0xFB7D),
    (0x0688, 0xFB88, 0xFB89, 0, 0),
    (0x0691, 0xFB8C, 0xFB8D, 0, 0),
    (0x0698, 0xFB8A, 0xFB8B, 0, 0),
    (0x06A4, 0xFB6A, 0xFB6B, 0xFB6C, 0xFB6D),
    (0x06A9, 0xFB8E, 0xFB8F, 0xFB90, 0xFB91),
    (0x06AF, 0xFB92, 0xFB93, 0xFB94, 0xFB95),
    (0x06BE, 0xFBAA, 0xFBAB, 0xFBAC, 0xFBAD),
    (0x06C1, 0xFBA6, 0xFBA7, 0xFBA8, 0xFBA9),
    (0x06CC, 0xFBFC, 0xFBFD, 0xFBFE, 0xFBFF),
    (0x06D2, 0xFBAE, 0xFBAF, 0, 0),
];

const LAM: char = '\u{0644}';
const TATWEEL: char = '\u{0640}';
const ZWJ: char = '\u{200D}';

/// Lam + alef variant → (isolated, final) ligature.
fn lam_alef(alef: char) -> Option<(char, char)> {
    match alef {
        '\u{0622}' => Some(('\u{FEF5}', '\u{FEF6}')),
        '\u{0623}' => Some(('\u{FEF7}', '\u{FEF8}')),
        '\u{0625}' => Some(('\u{FEF9}', '\u{FEFA}')),
        '\u{0627}' => Some(('\u{FEFB}', '\u{FEFC}')),
        _ => None,
    }
}

fn table_entry(c: char) -> Option<&'static (u32, u32, u32, u32, u32)> {
    LETTERS
        .binary_search_by_key(&(c as u32), |e| e.0)
        .ok()
        .map(|i| &LETTERS[i])
}

fn is_transparent(c: char) -> bool {
    matches!(
        c as u32,
        0x0610..=0x061A
            | 0x064B..=0x065F
            | 0x0670
            | 0x06D6..=0x06DC
            | 0x06DF..=0x06E4
            | 0x06E7..=0x06E8
            | 0x06EA..=0x06ED
    )
}

/// Joining type of `c`.
pub fn joining_type(c: char) -> Joining {
    if is_transparent(c) {
        return Joining::Transparent;
    }
    if c == TATWEEL || c == ZWJ {
        return Joining::Causing;
    }
    match table_entry(c) {
        // Hamza is the only tabled letter without a final form.
        Some(&(_, _, 0, _, _)) => Joining::NonJoining,
        Some(&(_, _, _, 0, _)) => Joining::Right,
        Some(_) => Joining::Dual,
        None => Joining::NonJoining,
    }
}

/// Letter of the basic Arabic, Supplement or Presentation Forms blocks.
pub fn is_arabic_letter(c: char) -> bool {
    matches!(
        c as u32,
        0x0600..=0x06FF | 0x0750..=0x077F | 0xFB50..=0xFDFF | 0xFE70..=0xFEFF
    ) && c.is_alphabetic()
}

/// Does `text` need reshaping at all?
pub fn needs_shaping(text: &str) -> bool {
    text.chars().any(is_arabic_letter)
}

fn prev_joining(chars: &[char], i: usize) -> Joining {
    chars[..i]
        .iter()
        .rev()
        .map(|&c| joining_type(c))
        .find(|j| *j != Joining::Transparent)
        .unwrap_or(Joining::NonJoining)
}

fn next_index(chars: &[char], i: usize) -> Option<usize> {
    (i + 1..chars.len()).find(|&j| joining_type(chars[j]) != Joining::Transparent)
}

fn as_char(code: u32) -> Option<char> {
    if code == 0 {
        None
    } else {
        char::from_u32(code)
    }
}

/// Replace letters by their contextual presentation forms.
fn apply_forms(line: &str) -> String {
    let chars: Vec<char> = line.chars().collect();
    let mut out = String::with_capacity(line.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let Some(&(_, iso, fin, ini, med)) = table_entry(c) else {
            out.push(c);
            i += 1;
            continue;
        };
        let own = joining_type(c);
        let joins_prev = own.links_backward() && prev_joining(&chars, i).links_forward();
        let next = next_index(&chars, i);

        if let (LAM, Some(j)) = (c, next) {
            if let Some((lig_iso, lig_fin)) = lam_alef(chars[j]) {
                out.push(if joins_prev { lig_fin } else { lig_iso });
                // Marks on the lam follow the ligature.
                out.extend(&chars[i + 1..j]);
                i = j + 1;
                continue;
            }
        }

        let joins_next = own.links_forward()
            && next.is_some_and(|j| joining_type(chars[j]).links_backward());

        let form = match (joins_prev, joins_next) {
            (true, true) => as_char(med).or(as_char(fin)),
            (true, false) => as_char(fin),
            (false, true) => as_char(ini),
            (false, false) => None,
        };
        out.push(form.or(as_char(iso)).unwrap_or(c));
        i += 1;
    }
    out
}

fn mirror(c: char) -> char {
    match c {
        '(' => ')',
        ')' => '(',
        '[' => ']',
        ']' => '[',
        '{' => '}',
        '}' => '{',
        '<' => '>',
        '>' => '<',
        '«' => '»',
        '»' => '«',
        other => other,
    }
}

/// Lay one line out in visual order at an RTL paragraph level. Explicit
/// directional controls are consumed by the reordering and dropped.
fn visual_line(line: &str) -> String {
    if line.is_empty() {
        return String::new();
    }
    let info = BidiInfo::new(line, Some(Level::rtl()));
    let mut out = String::with_capacity(line.len());
    for para in &info.paragraphs {
        let (levels, runs) = info.visual_runs(para, para.range.clone());
        for run in runs {
            let rtl = levels[run.start].is_rtl();
            let text = &line[run];
            let kept = text.chars().filter(|c| !is_directional_control(*c));
            if rtl {
                let reversed: Vec<char> = kept.collect();
                out.extend(reversed.into_iter().rev().map(mirror));
            } else {
                out.extend(kept);
            }
        }
    }
    out
}

fn validate(text: &str) -> Result<(), ShapingError> {
    for (offset, c) in text.char_indices() {
        if c == char::REPLACEMENT_CHARACTER {
            return Err(ShapingError::ReplacementCharacter(offset));
        }
        if c.is_control() && !matches!(c, '\t' | '\n' | '\r') {
            return Err(ShapingError::ControlCharacter {
                code: c as u32,
                offset,
            });
        }
    }
    if !isolates_balanced(text) {
        return Err(ShapingError::UnbalancedIsolates);
    }
    Ok(())
}

/// Output of an earlier shaping pass: one RLI run with no letter left that
/// the joining table would still replace.
fn is_shaped_run(text: &str) -> bool {
    text.starts_with(RLI)
        && isolate_body(text).is_some_and(|body| !body.chars().any(|c| table_entry(c).is_some()))
}

/// Validate `text` and return what is left to shape once a caller-supplied
/// outer isolate is removed.
fn shaping_body(text: &str) -> Result<&str, ShapingError> {
    validate(text)?;
    Ok(isolate_body(text).unwrap_or(text))
}

/// Fallible shaping. Text without Arabic letters, and text that is already
/// shaped output, is returned borrowed and unchanged.
pub fn try_shape(text: &str) -> Result<Cow<'_, str>, ShapingError> {
    if !needs_shaping(text) || is_shaped_run(text) {
        return Ok(Cow::Borrowed(text));
    }
    let body = shaping_body(text)?;

    let lines: Vec<String> = body
        .split('\n')
        .map(|line| visual_line(&apply_forms(line)))
        .collect();
    Ok(Cow::Owned(wrap_rtl(&lines.join("\n"))))
}

/// Shape `text`, falling back to the input unchanged when it is malformed.
pub fn shape(text: &str) -> String {
    match try_shape(text) {
        Ok(shaped) => shaped.into_owned(),
        Err(e) => {
            log::warn!("Leaving text unshaped — {e}");
            text.to_string()
        }
    }
}

/// Shaper bound to a session. Reordering can be switched off for targets
/// that run their own bidi pass on isolated runs.
#[derive(Debug, Clone, Copy)]
pub struct Shaper {
    pub visual_order: bool,
}

impl Default for Shaper {
    fn default() -> Self {
        Self { visual_order: true }
    }
}

impl Shaper {
    pub fn shape(&self, text: &str) -> String {
        if self.visual_order {
            return shape(text);
        }
        if !needs_shaping(text) || is_shaped_run(text) {
            return text.to_string();
        }
        match shaping_body(text) {
            Ok(body) => {
                let lines: Vec<String> = body.split('\n').map(apply_forms).collect();
                wrap_rtl(&lines.join("\n"))
            }
            Err(e) => {
                log::warn!("Leaving text unshaped — {e}");
                text.to_string()
            }
        }
    }
}
