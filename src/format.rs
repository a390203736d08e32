//! Numeric rendering for fact values

/// Digits needed to print any finite f64 exactly.
const EXACT_DIGITS: usize = 1100;

/// Fixed-point rounding to `decimals` fraction digits, then trailing
/// zeros and a trailing decimal point are stripped.
///
/// Rounding works on the exact binary value; exact midpoints round away
/// from zero. Non-finite input renders as zero. Negative zero renders as `"0"`.
pub fn format_decimal(value: f64, decimals: u32) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let mut s = round_fixed(value, decimals as usize);
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}

fn round_fixed(value: f64, decimals: usize) -> String {
    // `{:.N}` breaks exact ties to even; only those need adjusting.
    let probe = format!("{:.*}", decimals + 1, value);
    if !probe.ends_with('5') {
        return format!("{:.*}", decimals, value);
    }
    let exact = format!("{:.*}", EXACT_DIGITS, value);
    if exact.trim_end_matches('0') != probe {
        return format!("{:.*}", decimals, value);
    }

    let mut digits: Vec<char> = probe[..probe.len() - 1].chars().collect();
    if digits.last() == Some(&'.') {
        digits.pop();
    }
    let mut carry = true;
    for ch in digits.iter_mut().rev() {
        match *ch {
            '0'..='8' => {
                *ch = char::from(*ch as u8 + 1);
                carry = false;
                break;
            }
            '9' => *ch = '0',
            _ => {}
        }
    }
    if carry {
        let pos = usize::from(digits.first() == Some(&'-'));
        digits.insert(pos, '1');
    }
    digits.into_iter().collect()
}
