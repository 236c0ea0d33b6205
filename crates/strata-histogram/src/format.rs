//! `printf`-compatible number formatting for histogram reports.
//!
//! Report files are consumed by existing post-processing scripts, so
//! numbers are rendered exactly as C's `%g` and `%e` conversions would.

/// Format `x` like C's `%.{precision}g`.
///
/// Uses scientific notation when the decimal exponent is below -4 or at
/// least `precision`, fixed notation otherwise; trailing zeros are removed
/// in both cases. A precision of 0 is treated as 1.
///
/// ```
/// use strata_histogram::format::format_g;
///
/// assert_eq!(format_g(2.0, 6), "2");
/// assert_eq!(format_g(0.1, 6), "0.1");
/// assert_eq!(format_g(1234567.0, 6), "1.23457e+06");
/// assert_eq!(format_g(0.00001, 6), "1e-05");
/// ```
pub fn format_g(x: f64, precision: usize) -> String {
    if let Some(s) = non_finite(x) {
        return s;
    }
    let p = precision.max(1);
    if x == 0.0 {
        return if x.is_sign_negative() { "-0" } else { "0" }.to_string();
    }
    let sci = format!("{:.*e}", p - 1, x);
    let Some((mantissa, exp)) = split_exponent(&sci) else {
        return sci;
    };
    if exp < -4 || exp >= p as i32 {
        format!("{}{}", strip_fraction_zeros(mantissa), exponent_suffix(exp))
    } else {
        let decimals = (p as i32 - 1 - exp) as usize;
        strip_fraction_zeros(&format!("{x:.decimals$}")).to_string()
    }
}

/// Format `x` like C's `%.{precision}e`: one leading digit, `precision`
/// fraction digits, and a signed exponent of at least two digits.
///
/// ```
/// use strata_histogram::format::format_e;
///
/// assert_eq!(format_e(2.0, 6), "2.000000e+00");
/// assert_eq!(format_e(-0.00125, 3), "-1.250e-03");
/// ```
pub fn format_e(x: f64, precision: usize) -> String {
    if let Some(s) = non_finite(x) {
        return s;
    }
    let sci = format!("{x:.precision$e}");
    match split_exponent(&sci) {
        Some((mantissa, exp)) => format!("{mantissa}{}", exponent_suffix(exp)),
        None => sci,
    }
}

fn non_finite(x: f64) -> Option<String> {
    let body = if x.is_nan() {
        "nan"
    } else if x.is_infinite() {
        "inf"
    } else {
        return None;
    };
    let sign = if x.is_sign_negative() { "-" } else { "" };
    Some(format!("{sign}{body}"))
}

fn split_exponent(sci: &str) -> Option<(&str, i32)> {
    let (mantissa, exp) = sci.split_once('e')?;
    Some((mantissa, exp.parse().ok()?))
}

fn exponent_suffix(exp: i32) -> String {
    let sign = if exp < 0 { '-' } else { '+' };
    format!("e{sign}{:02}", exp.unsigned_abs())
}

fn strip_fraction_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
