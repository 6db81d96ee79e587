//! ICAO 9303 check digits: 7-3-1 weighted sum modulo 10.

const WEIGHTS: [u32; 3] = [7, 3, 1];

pub fn char_value(c: char) -> Option<u32> {
    match c {
        '0'..='9' => c.to_digit(10),
        'A'..='Z' => Some(c as u32 - 'A' as u32 + 10),
        '<' => Some(0),
        _ => None,
    }
}

pub fn compute(field: &str) -> Option<u32> {
    let mut sum = 0;
    for (i, c) in field.chars().enumerate() {
        sum += char_value(c)? * WEIGHTS[i % 3];
    }
    Some(sum % 10)
}

pub fn verify(field: &str, check: char) -> bool {
    match (compute(field), check.to_digit(10)) {
        (Some(expected), Some(actual)) => expected == actual,
        _ => false,
    }
}

/// Optional fields left entirely blank may carry `<` instead of a digit.
pub fn verify_optional(field: &str, check: char) -> bool {
    if field.chars().all(|c| c == '<') && (check == '<' || check == '0') {
        return true;
    }
    verify(field, check)
}
