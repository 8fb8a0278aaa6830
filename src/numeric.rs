//! Numbers, percentages and currency as left-to-right islands.
//!
//! Every digit run is wrapped in an LRI … PDI pair so it keeps its
//! left-to-right order when dropped into right-to-left text.

use crate::bidi::{wrap_ltr, wrap_rtl};

/// Egyptian pound label (ج.م).
pub const EGP_LABEL: &str = "\u{062C}.\u{0645}";

/// Format `value` with en-US grouping and exactly `fraction_digits`
/// decimals, without any directional marks.
pub fn format_grouped(value: f64, fraction_digits: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "∞" } else { "-∞" }.to_string();
    }

    let fixed = format!("{:.*}", fraction_digits, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::with_capacity(fixed.len() + fixed.len() / 3 + 1);
    let is_zero = fixed.bytes().all(|b| b == b'0' || b == b'.');
    if value < 0.0 && !is_zero {
        out.push('-');
    }
    let len = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// `value` with `fraction_digits` decimals inside an LTR isolate.
/// Callers wanting the conventional default pass `2`.
pub fn fmt_number_ltr(value: f64, fraction_digits: usize) -> String {
    wrap_ltr(&format_grouped(value, fraction_digits))
}

/// `value` (already in percent units) followed by `%`, inside one LTR
/// isolate. Conventional default: `1` fraction digit.
pub fn fmt_percent_ltr(value: f64, fraction_digits: usize) -> String {
    let mut s = format_grouped(value, fraction_digits);
    s.push('%');
    wrap_ltr(&s)
}

/// LTR-isolated amount, one space, RTL-isolated `label`. The two isolates
/// are siblings.
pub fn fmt_currency_mix(value: f64, fraction_digits: usize, label: &str) -> String {
    let mut out = fmt_number_ltr(value, fraction_digits);
    out.push(' ');
    out.push_str(&wrap_rtl(label));
    out
}

/// [`fmt_currency_mix`] with the Egyptian pound label.
pub fn fmt_currency_mix_egp(value: f64, fraction_digits: usize) -> String {
    fmt_currency_mix(value, fraction_digits, EGP_LABEL)
}
