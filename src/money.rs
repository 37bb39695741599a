//! Amount parsing and money formatting.
//!
//! Amounts are typed as free text and only accepted when they are already
//! in canonical form: parsing the text and rendering the number back must
//! give the same text. Canonical rendering is the shortest digit string
//! that round-trips, written positionally for magnitudes in `[1e-7, 1e21)`
//! and in exponent form (`1e+21`, `1.5e-7`) otherwise.

/// Largest decimal exponent still written positionally.
const MAX_POSITIONAL_EXPONENT: i32 = 21;

/// Smallest decimal exponent still written positionally.
const MIN_POSITIONAL_EXPONENT: i32 = -6;

/// Renders a number in canonical form.
///
/// `NaN`, `Infinity` and `-Infinity` are spelled out; negative zero renders
/// as `"0"`.
///
/// # Examples
///
/// ```
/// use moneyapp_rs::money::number_to_string;
///
/// assert_eq!(number_to_string(12.5), "12.5");
/// assert_eq!(number_to_string(1e21), "1e+21");
/// assert_eq!(number_to_string(0.000_000_15), "1.5e-7");
/// ```
#[must_use]
pub fn number_to_string(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_owned();
    }
    if value == 0.0_f64 {
        return "0".to_owned();
    }
    if value.is_infinite() {
        let spelled = if value > 0.0_f64 { "Infinity" } else { "-Infinity" };
        return spelled.to_owned();
    }
    if value < 0.0_f64 {
        return format!("-{}", number_to_string(-value));
    }

    // `{:e}` yields the shortest round-trip digits, e.g. `1.2345e2`.
    let scientific = format!("{value:e}");
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let exponent: i32 = exponent.parse().unwrap_or_default();
    let digit_count = i32::try_from(digits.len()).unwrap_or(i32::MAX);
    // Position of the decimal point relative to the first digit.
    let point = exponent.saturating_add(1);

    if digit_count <= point && point <= MAX_POSITIONAL_EXPONENT {
        let zeros = usize::try_from(point - digit_count).unwrap_or_default();
        format!("{digits}{}", "0".repeat(zeros))
    } else if 0 < point && point <= MAX_POSITIONAL_EXPONENT {
        let (integer, fraction) = digits.split_at(usize::try_from(point).unwrap_or_default());
        format!("{integer}.{fraction}")
    } else if MIN_POSITIONAL_EXPONENT < point && point <= 0 {
        let zeros = usize::try_from(-point).unwrap_or_default();
        format!("0.{}{digits}", "0".repeat(zeros))
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        let magnitude = exponent.unsigned_abs();
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{first}e{sign}{magnitude}")
        } else {
            format!("{first}.{rest}e{sign}{magnitude}")
        }
    }
}

/// Parses an amount typed into the form.
///
/// Returns `None` unless the text is a finite number written exactly as
/// [`number_to_string`] would write it. `"12.5"` is accepted; `"12.50"`,
/// `"+3"`, `".5"`, `"1E5"`, `""` and `"NaN"` are not.
#[must_use]
pub fn parse_amount(text: &str) -> Option<f64> {
    let value: f64 = text.parse().ok()?;
    (value.is_finite() && number_to_string(value) == text).then_some(value)
}

/// Formats an amount for display with two fraction digits.
///
/// The whole part is `floor(amount)` and the fraction is
/// `floor((amount % 1) * 100)`, right-padded to two characters. This is
/// exact for whole and half amounts but drifts for others: `19.99` shows
/// as `"19.98"` because of binary rounding, and negative amounts carry
/// the sign into the fraction (`-3.07` shows as `"-4.-7"`).
///
/// # Examples
///
/// ```
/// use moneyapp_rs::money::format_money;
///
/// assert_eq!(format_money(12.0), "12.00");
/// assert_eq!(format_money(12.5), "12.50");
/// ```
#[must_use]
pub fn format_money(amount: f64) -> String {
    let whole = amount.floor();
    let cents = ((amount % 1.0_f64) * 100.0_f64).floor();
    let mut fraction = format!(".{}", number_to_string(cents));
    while fraction.chars().count() < 3 {
        fraction.push('0');
    }
    format!("{}{fraction}", number_to_string(whole))
}
