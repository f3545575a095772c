use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{hex_digit1, not_line_ending, space0, space1};
use nom::combinator::{all_consuming, map, map_res, opt};
use nom::sequence::{preceded, terminated, tuple};
use nom::IResult;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) struct Entry {
    pub(crate) reg: u16,
    pub(crate) val: u8,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub(crate) struct LineError {
    pub(crate) line: usize,
    pub(crate) message: &'static str,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum Line {
    Op(Entry),
    Blank,
}

pub(crate) fn parse_table(src: &str) -> Result<Vec<Entry>, LineError> {
    let mut entries = Vec::new();
    for (idx, raw) in src.lines().enumerate() {
        match table_line(raw) {
            Ok((_, Line::Op(entry))) => entries.push(entry),
            Ok((_, Line::Blank)) => {}
            Err(_) => {
                return Err(LineError {
                    line: idx + 1,
                    message: "expected \"0xRRRR 0xVV\" with an optional # comment",
                })
            }
        }
    }
    Ok(entries)
}

fn hex_u16(i: &str) -> IResult<&str, u16> {
    map_res(preceded(tag("0x"), hex_digit1), |s| u16::from_str_radix(s, 16))(i)
}

fn hex_u8(i: &str) -> IResult<&str, u8> {
    map_res(preceded(tag("0x"), hex_digit1), |s| u8::from_str_radix(s, 16))(i)
}

fn comment(i: &str) -> IResult<&str, &str> {
    preceded(tag("#"), not_line_ending)(i)
}

fn reg_op(i: &str) -> IResult<&str, Line> {
    map(
        tuple((space0, hex_u16, space1, hex_u8)),
        |(_, reg, _, val)| Line::Op(Entry { reg, val }),
    )(i)
}

fn table_line(i: &str) -> IResult<&str, Line> {
    all_consuming(terminated(
        alt((reg_op, map(space0, |_| Line::Blank))),
        tuple((space0, opt(comment))),
    ))(i)
}
