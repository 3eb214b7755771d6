// Decoding of a single line of the nouveau pstate debugfs file, e.g.
// "0f: core 405-1240 MHz memory 810 MHz".
// Tokens outside a known section are skipped one by one.

use crate::errors::ParseError;

use super::PStateRecord;

const CORE_SECTION: &str = "core";
const MEMORY_SECTION: &str = "memory";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Core,
    Memory,
}

impl Section {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            CORE_SECTION => Some(Self::Core),
            MEMORY_SECTION => Some(Self::Memory),
            _ => None,
        }
    }
}

// Parse one line of the pstate report into a record
pub fn parse_line(line: &str) -> Result<PStateRecord, ParseError> {
    let mut tokens = line.split_whitespace();

    let id_token = tokens.next().unwrap_or_default();
    let mut record = PStateRecord::new(parse_id(id_token)?);

    while let Some(token) = tokens.next() {
        let Some(section) = Section::from_token(token) else {
            continue;
        };

        let clock_token = tokens
            .next()
            .ok_or_else(|| ParseError::MissingClock(token.to_string()))?;
        let (min, max) = parse_clock(clock_token)?;

        let unit_token = tokens
            .next()
            .ok_or_else(|| ParseError::MissingUnit(clock_token.to_string()))?;
        let scale = unit_scale(unit_token)?;

        let min = scale_clock(min, scale, clock_token)?;
        let max = scale_clock(max, scale, clock_token)?;

        match section {
            Section::Core => {
                record.core_min_mhz = min.min(max);
                record.core_max_mhz = min.max(max);
            }
            // Only one memory clock is kept, the upper bound of a range
            Section::Memory => {
                record.mem_mhz = min.max(max);
            }
        }
    }

    Ok(record)
}

// Decode the leading id token, e.g. "0f:" or "0xAC".
// Only the low 8 bits of an arbitrarily long id are kept.
fn parse_id(token: &str) -> Result<u8, ParseError> {
    let invalid = || ParseError::InvalidId(token.to_string());

    let digits = token.strip_suffix(':').unwrap_or(token);
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(digits);

    if digits.is_empty() {
        return Err(invalid());
    }

    digits.chars().try_fold(0u8, |id, c| {
        let digit = c.to_digit(16).ok_or_else(invalid)? as u8;
        Ok((id << 4) | digit)
    })
}

// Decode "405" or "405-1240", a single value is both bounds
fn parse_clock(token: &str) -> Result<(i32, i32), ParseError> {
    match token.split_once('-') {
        Some((min, max)) => Ok((parse_decimal(min, token)?, parse_decimal(max, token)?)),
        None => {
            let value = parse_decimal(token, token)?;
            Ok((value, value))
        }
    }
}

fn parse_decimal(digits: &str, token: &str) -> Result<i32, ParseError> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidClock(token.to_string()));
    }

    digits
        .parse()
        .map_err(|_| ParseError::ClockOverflow(token.to_string()))
}

// Units are compared case-sensitively, as the kernel prints them
fn unit_scale(token: &str) -> Result<i32, ParseError> {
    match token {
        "MHz" => Ok(1),
        "GHz" => Ok(1000),
        _ => Err(ParseError::UnknownUnit(token.to_string())),
    }
}

fn scale_clock(value: i32, scale: i32, token: &str) -> Result<i32, ParseError> {
    value
        .checked_mul(scale)
        .ok_or_else(|| ParseError::ClockOverflow(token.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pstate::CLOCK_NOT_REPORTED;
    use pretty_assertions::assert_eq;

    fn record(pstate_id: u8, core: (i32, i32), mem: i32) -> PStateRecord {
        PStateRecord {
            pstate_id,
            core_min_mhz: core.0,
            core_max_mhz: core.1,
            mem_mhz: mem,
        }
    }

    #[test]
    fn parse_core_range() {
        let parsed = parse_line("07: core 405-1240 MHz memory 810 MHz").unwrap();
        assert_eq!(parsed, record(0x07, (405, 1240), 810));
    }

    #[test]
    fn parse_single_core_clock() {
        let parsed = parse_line("0f: core 405 MHz memory 810 MHz\n").unwrap();
        assert_eq!(parsed, record(0x0f, (405, 405), 810));
    }

    #[test]
    fn gigahertz_is_normalized() {
        let parsed = parse_line("03: core 1-2 GHz memory 3 GHz").unwrap();
        assert_eq!(parsed, record(0x03, (1000, 2000), 3000));
    }

    #[test]
    fn trailing_tokens_are_skipped() {
        let parsed = parse_line("AC: core 1240 MHz memory 810 MHz AC:").unwrap();
        assert_eq!(parsed, record(0xac, (1240, 1240), 810));

        let parsed = parse_line("0a: core 405 MHz voltage 900 mV memory 810 MHz *").unwrap();
        assert_eq!(parsed, record(0x0a, (405, 405), 810));
    }

    #[test]
    fn missing_sections_stay_unreported() {
        let parsed = parse_line("0f:").unwrap();
        assert_eq!(
            parsed,
            record(0x0f, (CLOCK_NOT_REPORTED, CLOCK_NOT_REPORTED), CLOCK_NOT_REPORTED)
        );

        let parsed = parse_line("0f: memory 810 MHz").unwrap();
        assert_eq!(
            parsed,
            record(0x0f, (CLOCK_NOT_REPORTED, CLOCK_NOT_REPORTED), 810)
        );
    }

    #[test]
    fn id_forms() {
        assert_eq!(parse_line("0F:").unwrap().pstate_id, 0x0f);
        assert_eq!(parse_line("000f:").unwrap().pstate_id, 0x0f);
        assert_eq!(parse_line("0xAc").unwrap().pstate_id, 0xac);
        assert_eq!(parse_line("1ab:").unwrap().pstate_id, 0xab);
    }

    #[test]
    fn invalid_id() {
        assert_eq!(
            parse_line("garbage line"),
            Err(ParseError::InvalidId("garbage".to_string()))
        );
        assert_eq!(parse_line(""), Err(ParseError::InvalidId(String::new())));
        assert_eq!(parse_line(": core"), Err(ParseError::InvalidId(":".to_string())));
    }

    #[test]
    fn malformed_sections() {
        assert_eq!(
            parse_line("07: core"),
            Err(ParseError::MissingClock("core".to_string()))
        );
        assert_eq!(
            parse_line("07: core 405"),
            Err(ParseError::MissingUnit("405".to_string()))
        );
        assert_eq!(
            parse_line("07: core 405 mhz"),
            Err(ParseError::UnknownUnit("mhz".to_string()))
        );
        assert_eq!(
            parse_line("07: core 405- MHz"),
            Err(ParseError::InvalidClock("405-".to_string()))
        );
        assert_eq!(
            parse_line("07: memory fast MHz"),
            Err(ParseError::InvalidClock("fast".to_string()))
        );
        assert_eq!(
            parse_line("07: core 3000000 GHz"),
            Err(ParseError::ClockOverflow("3000000".to_string()))
        );
    }

    #[test]
    fn reversed_range_is_ordered() {
        let parsed = parse_line("07: core 1240-405 MHz").unwrap();
        assert_eq!((parsed.core_min_mhz, parsed.core_max_mhz), (405, 1240));
    }

    #[test]
    fn memory_range_keeps_upper_bound() {
        let parsed = parse_line("07: memory 405-810 MHz").unwrap();
        assert_eq!(parsed.mem_mhz, 810);
    }
}
