//! OCR confusion repair. Latin OCR engines routinely read digits as the
//! letters that look like them; these rewrites are retried in a fixed order.

use crate::domain::model::{Correction, CorrectionSettings, MrzFormat};

pub const CONFUSIONS: [(char, char); 10] = [
    ('O', '0'),
    ('Q', '0'),
    ('D', '0'),
    ('I', '1'),
    ('L', '1'),
    ('T', '7'),
    ('Z', '2'),
    ('S', '5'),
    ('B', '8'),
    ('G', '6'),
];

fn letter_to_digit(c: char) -> char {
    CONFUSIONS
        .iter()
        .find(|(from, _)| *from == c)
        .map(|(_, to)| *to)
        .unwrap_or(c)
}

fn digit_to_letter(c: char) -> char {
    match c {
        '0' => 'O',
        '1' => 'I',
        '2' => 'Z',
        '5' => 'S',
        '6' => 'G',
        '7' => 'T',
        '8' => 'B',
        _ => c,
    }
}

pub fn apply_substitution(s: &str, from: char, to: char) -> String {
    s.chars().map(|c| if c == from { to } else { c }).collect()
}

pub fn aggressive_map(s: &str) -> String {
    s.chars().map(letter_to_digit).collect()
}

#[derive(Clone, Copy)]
enum Kind {
    Numeric,
    Alpha,
}

/// Fixed-kind positions as (line, start, end, kind).
fn positions(format: MrzFormat) -> &'static [(usize, usize, usize, Kind)] {
    use Kind::*;
    match format {
        MrzFormat::Td3 => &[
            (0, 2, 5, Alpha),
            (1, 9, 10, Numeric),
            (1, 10, 13, Alpha),
            (1, 13, 20, Numeric),
            (1, 20, 21, Alpha),
            (1, 21, 28, Numeric),
            (1, 42, 43, Numeric),
        ],
        MrzFormat::Td2 => &[
            (0, 2, 5, Alpha),
            (1, 9, 10, Numeric),
            (1, 10, 13, Alpha),
            (1, 13, 20, Numeric),
            (1, 20, 21, Alpha),
            (1, 21, 28, Numeric),
        ],
        MrzFormat::Td1 => &[
            (0, 2, 5, Alpha),
            (0, 14, 15, Numeric),
            (1, 0, 7, Numeric),
            (1, 7, 8, Alpha),
            (1, 8, 15, Numeric),
            (1, 15, 18, Alpha),
            (1, 29, 30, Numeric),
        ],
    }
}

/// Rewrites only the positions whose kind is fixed by the layout: dates and
/// check digits become digits, country codes and sex become letters.
pub fn repair_positions(format: MrzFormat, lines: &[String]) -> Vec<String> {
    let mut repaired: Vec<Vec<char>> = lines.iter().map(|l| l.chars().collect()).collect();
    for &(line, start, end, kind) in positions(format) {
        let Some(chars) = repaired.get_mut(line) else {
            continue;
        };
        for c in chars.iter_mut().take(end).skip(start) {
            *c = match kind {
                Kind::Numeric => letter_to_digit(*c),
                Kind::Alpha => digit_to_letter(*c),
            };
        }
    }
    let mut out: Vec<String> = repaired.into_iter().map(|l| l.into_iter().collect()).collect();

    // TD2/TD3 carry the final composite digit at the end of line 2.
    if matches!(format, MrzFormat::Td2 | MrzFormat::Td3) {
        if let Some(last) = out.get_mut(1) {
            if let Some(c) = last.pop() {
                last.push(letter_to_digit(c));
            }
        }
    }
    out
}

/// Rewritten row sets in the order they should be tried. Positional repair
/// is not included here because it depends on the layout being attempted.
pub fn candidates(rows: &[String], settings: &CorrectionSettings) -> Vec<(Vec<String>, Correction)> {
    let map_all = |f: &dyn Fn(&str) -> String| rows.iter().map(|r| f(r.as_str())).collect::<Vec<_>>();
    let mut out = Vec::new();

    for &(from, to) in CONFUSIONS.iter() {
        out.push((
            map_all(&|r: &str| apply_substitution(r, from, to)),
            Correction::Substitution { from, to },
        ));
    }

    for i in 0..CONFUSIONS.len() {
        let window_end = (i + settings.pair_window).min(CONFUSIONS.len());
        for j in (i + 1)..window_end {
            let (a_from, a_to) = CONFUSIONS[i];
            let (b_from, b_to) = CONFUSIONS[j];
            out.push((
                map_all(&|r: &str| {
                    apply_substitution(&apply_substitution(r, a_from, a_to), b_from, b_to)
                }),
                Correction::DoubleSubstitution {
                    first: CONFUSIONS[i],
                    second: CONFUSIONS[j],
                },
            ));
        }
    }

    if settings.aggressive {
        out.push((map_all(&aggressive_map), Correction::Aggressive));
    }
    out
}
