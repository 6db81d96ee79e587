//! Field extraction for the three ICAO 9303 layouts.
//!
//! ```text
//! TD3  P<UTOERIKSSON<<ANNA<MARIA<<<<<<<<<<<<<<<<<<<
//!      L898902C36UTO7408122F1204159ZE184226B<<<<<10
//!
//! TD2  I<UTOERIKSSON<<ANNA<MARIA<<<<<<<<<<<
//!      D231458907UTO7408122F1204159<<<<<<<6
//!
//! TD1  I<UTOD231458907<<<<<<<<<<<<<<<
//!      7408122F1204159UTO<<<<<<<<<<<6
//!      ERIKSSON<<ANNA<MARIA<<<<<<<<<<
//! ```

use crate::domain::model::{CheckDigits, MrzFormat, ParsedMrz};
use crate::domain::services::check_digit;
use crate::utils::error::MrzError;

type ParseResult = std::result::Result<ParsedMrz, MrzError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    /// Every check digit must hold.
    Strict,
    /// Check digit failures are only recorded on the result.
    Relaxed,
}

pub fn parse(format: MrzFormat, lines: &[&str], validation: Validation) -> ParseResult {
    if lines.len() != format.line_count() {
        return Err(MrzError::UnrecognizedLayout { lines: lines.len() });
    }
    match format {
        MrzFormat::Td1 => td1(lines[0], lines[1], lines[2], validation),
        MrzFormat::Td2 => td2(lines[0], lines[1], validation),
        MrzFormat::Td3 => td3(lines[0], lines[1], validation),
    }
}

pub fn parse_td3(l1: &str, l2: &str) -> ParseResult {
    td3(l1, l2, Validation::Strict)
}

pub fn parse_td3_relaxed(l1: &str, l2: &str) -> ParseResult {
    td3(l1, l2, Validation::Relaxed)
}

pub fn parse_td2(l1: &str, l2: &str) -> ParseResult {
    td2(l1, l2, Validation::Strict)
}

pub fn parse_td2_relaxed(l1: &str, l2: &str) -> ParseResult {
    td2(l1, l2, Validation::Relaxed)
}

pub fn parse_td1(l1: &str, l2: &str, l3: &str) -> ParseResult {
    td1(l1, l2, l3, Validation::Strict)
}

pub fn parse_td1_relaxed(l1: &str, l2: &str, l3: &str) -> ParseResult {
    td1(l1, l2, l3, Validation::Relaxed)
}

/// Picks the layout from the number of non-blank lines, then parses it.
pub fn auto_detect(lines: &[&str], validation: Validation) -> ParseResult {
    let present: Vec<&str> = lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    let format = match present.len() {
        2 if present[0].len() > 36 => MrzFormat::Td3,
        2 => MrzFormat::Td2,
        3 => MrzFormat::Td1,
        n => return Err(MrzError::UnrecognizedLayout { lines: n }),
    };
    parse(format, &present, validation)
}

fn td3(l1: &str, l2: &str, validation: Validation) -> ParseResult {
    let format = MrzFormat::Td3;
    let l1 = prepare(format, 1, l1)?;
    let l2 = prepare(format, 2, l2)?;
    let (document_type, issuing_country) = header(&l1)?;
    let (surname, given_names) = split_names(&l1[5..44]);

    let document_number = &l2[0..9];
    let nationality = country("nationality", &l2[10..13])?;
    let birth_date = date("birth_date", &l2[13..19])?;
    let sex = sex(&l2[20..21])?;
    let expiry_date = date("expiry_date", &l2[21..27])?;
    let personal_number = &l2[28..42];

    let checks = CheckDigits {
        document_number: check_digit::verify(document_number, at(&l2, 9)),
        birth_date: check_digit::verify(birth_date, at(&l2, 19)),
        expiry_date: check_digit::verify(expiry_date, at(&l2, 27)),
        personal_number: Some(check_digit::verify_optional(personal_number, at(&l2, 42))),
        composite: check_digit::verify(
            &[&l2[0..10], &l2[13..20], &l2[21..43]].concat(),
            at(&l2, 43),
        ),
    };

    finish(
        ParsedMrz {
            format,
            document_type,
            issuing_country,
            name: full_name(&surname, &given_names),
            surname,
            given_names,
            document_number: strip_filler(document_number),
            nationality,
            birth_date: birth_date.to_string(),
            sex,
            expiry_date: expiry_date.to_string(),
            personal_number: strip_filler(personal_number),
            optional_data: String::new(),
            checks,
        },
        validation,
    )
}

fn td2(l1: &str, l2: &str, validation: Validation) -> ParseResult {
    let format = MrzFormat::Td2;
    let l1 = prepare(format, 1, l1)?;
    let l2 = prepare(format, 2, l2)?;
    let (document_type, issuing_country) = header(&l1)?;
    let (surname, given_names) = split_names(&l1[5..36]);

    let document_number = &l2[0..9];
    let nationality = country("nationality", &l2[10..13])?;
    let birth_date = date("birth_date", &l2[13..19])?;
    let sex = sex(&l2[20..21])?;
    let expiry_date = date("expiry_date", &l2[21..27])?;
    let personal_number = &l2[28..35];

    let checks = CheckDigits {
        document_number: check_digit::verify(document_number, at(&l2, 9)),
        birth_date: check_digit::verify(birth_date, at(&l2, 19)),
        expiry_date: check_digit::verify(expiry_date, at(&l2, 27)),
        personal_number: None,
        composite: check_digit::verify(
            &[&l2[0..10], &l2[13..20], &l2[21..35]].concat(),
            at(&l2, 35),
        ),
    };

    finish(
        ParsedMrz {
            format,
            document_type,
            issuing_country,
            name: full_name(&surname, &given_names),
            surname,
            given_names,
            document_number: strip_filler(document_number),
            nationality,
            birth_date: birth_date.to_string(),
            sex,
            expiry_date: expiry_date.to_string(),
            personal_number: strip_filler(personal_number),
            optional_data: String::new(),
            checks,
        },
        validation,
    )
}

fn td1(l1: &str, l2: &str, l3: &str, validation: Validation) -> ParseResult {
    let format = MrzFormat::Td1;
    let l1 = prepare(format, 1, l1)?;
    let l2 = prepare(format, 2, l2)?;
    let l3 = prepare(format, 3, l3)?;
    let (document_type, issuing_country) = header(&l1)?;

    // A `<` in the check position means the number overflows into the
    // optional data; the last character of the overflow is the check digit.
    let (document_number, document_check, optional_data) = if at(&l1, 14) == '<' {
        let optional = &l1[15..30];
        let run = optional.find('<').unwrap_or(optional.len());
        let overflow = &optional[..run];
        match overflow.char_indices().last() {
            Some((last, check)) => (
                format!("{}{}", &l1[5..14], &overflow[..last]),
                check,
                &optional[run..],
            ),
            None => (l1[5..14].to_string(), '<', optional),
        }
    } else {
        (l1[5..14].to_string(), at(&l1, 14), &l1[15..30])
    };

    let birth_date = date("birth_date", &l2[0..6])?;
    let sex = sex(&l2[7..8])?;
    let expiry_date = date("expiry_date", &l2[8..14])?;
    let nationality = country("nationality", &l2[15..18])?;
    let personal_number = &l2[18..29];
    let (surname, given_names) = split_names(&l3);

    let checks = CheckDigits {
        document_number: check_digit::verify(&document_number, document_check),
        birth_date: check_digit::verify(birth_date, at(&l2, 6)),
        expiry_date: check_digit::verify(expiry_date, at(&l2, 14)),
        personal_number: None,
        composite: check_digit::verify(
            &[&l1[5..30], &l2[0..7], &l2[8..15], &l2[18..29]].concat(),
            at(&l2, 29),
        ),
    };

    finish(
        ParsedMrz {
            format,
            document_type,
            issuing_country,
            name: full_name(&surname, &given_names),
            surname,
            given_names,
            document_number: strip_filler(&document_number),
            nationality,
            birth_date: birth_date.to_string(),
            sex,
            expiry_date: expiry_date.to_string(),
            personal_number: strip_filler(personal_number),
            optional_data: strip_filler(optional_data),
            checks,
        },
        validation,
    )
}

fn finish(mrz: ParsedMrz, validation: Validation) -> ParseResult {
    if validation == Validation::Strict {
        if let Some(field) = mrz.checks.first_failure() {
            return Err(MrzError::CheckDigit { field });
        }
    }
    Ok(mrz)
}

/// Truncates to the layout width and rejects anything outside the MRZ charset.
/// After this, byte slicing is safe because every character is ASCII.
fn prepare(format: MrzFormat, line: usize, raw: &str) -> std::result::Result<String, MrzError> {
    let expected = format.line_length();
    let actual = raw.chars().count();
    if actual < expected {
        return Err(MrzError::InvalidLength {
            format: format.name(),
            line,
            expected,
            actual,
        });
    }

    let prepared: String = raw.chars().take(expected).collect();
    if let Some(character) = prepared
        .chars()
        .find(|c| !(c.is_ascii_uppercase() || c.is_ascii_digit() || *c == '<'))
    {
        return Err(MrzError::InvalidCharacter { line, character });
    }
    Ok(prepared)
}

fn header(l1: &str) -> std::result::Result<(String, String), MrzError> {
    let document_type = &l1[0..2];
    if !at(l1, 0).is_ascii_uppercase() {
        return Err(MrzError::InvalidField {
            field: "document_type",
            value: document_type.to_string(),
        });
    }
    let issuing_country = country("issuing_country", &l1[2..5])?;
    Ok((document_type.trim_end_matches('<').to_string(), issuing_country))
}

fn country(field: &'static str, value: &str) -> std::result::Result<String, MrzError> {
    if value.chars().all(|c| c.is_ascii_uppercase() || c == '<') {
        Ok(value.to_string())
    } else {
        Err(MrzError::InvalidField {
            field,
            value: value.to_string(),
        })
    }
}

fn date<'a>(field: &'static str, value: &'a str) -> std::result::Result<&'a str, MrzError> {
    if value.bytes().all(|b| b.is_ascii_digit()) {
        Ok(value)
    } else {
        Err(MrzError::InvalidField {
            field,
            value: value.to_string(),
        })
    }
}

fn sex(value: &str) -> std::result::Result<String, MrzError> {
    match value {
        "M" | "F" | "X" | "<" => Ok(value.to_string()),
        _ => Err(MrzError::InvalidField {
            field: "sex",
            value: value.to_string(),
        }),
    }
}

fn split_names(field: &str) -> (String, String) {
    let field = field.trim_end_matches('<');
    let (surname, given) = field.split_once("<<").unwrap_or((field, ""));
    (words(surname), words(given))
}

fn words(value: &str) -> String {
    value
        .split('<')
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn full_name(surname: &str, given_names: &str) -> String {
    format!("{} {}", surname, given_names).trim().to_string()
}

fn strip_filler(value: &str) -> String {
    value.replace('<', "")
}

fn at(line: &str, index: usize) -> char {
    line.as_bytes()[index] as char
}
