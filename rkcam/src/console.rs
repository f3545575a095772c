//! A tiny line-oriented console for peeking and poking sensor registers
//! during board bring-up.
//!
//! Two commands are understood, with numbers in hexadecimal and an
//! optional `0x` prefix:
//!
//! ```text
//! get 3021
//! put 0x3021=0x62
//! ```

use crate::error::Error;
use crate::interface::Interface;
use crate::models::Operations;
use crate::platform::Platform;
use crate::Camera;
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{char, hex_digit1, multispace0, space0};
use nom::combinator::{all_consuming, map, map_res, opt};
use nom::sequence::{delimited, preceded, tuple};
use nom::IResult;

/// A parsed console command.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Get { reg: u16 },
    Put { reg: u16, val: u8 },
}

impl Command {
    /// Parses one console line, returning `None` if it isn't a valid
    /// command. Surrounding whitespace, including a trailing newline, is
    /// ignored.
    pub fn parse(line: &str) -> Option<Self> {
        match all_consuming(delimited(multispace0, command, multispace0))(line) {
            Ok((_, cmd)) => Some(cmd),
            Err(_) => None,
        }
    }
}

/// The outcome of a console command: the register involved and the value
/// that was read from or written to it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Reply {
    Read { reg: u16, val: u8 },
    Written { reg: u16, val: u8 },
}

impl core::fmt::Display for Reply {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let (reg, val) = match *self {
            Reply::Read { reg, val } => (reg, val),
            Reply::Written { reg, val } => (reg, val),
        };
        write!(f, "{:#06x}={:#04x}", reg, val)
    }
}

pub(crate) fn run<I: Interface, P: Platform>(
    cam: &mut Camera<I, P>,
    line: &str,
) -> Result<Reply, Error<I, P>> {
    let desc = cam.bound()?;
    let cmd = match Command::parse(line) {
        Some(cmd) => cmd,
        None => {
            log::debug!("bad console input {:?}", line);
            return Err(Error::InvalidValue);
        }
    };
    match cmd {
        Command::Get { reg } => {
            let val = desc.backend.read(cam, reg)?;
            log::debug!("get {:#06x}={:#04x}", reg, val);
            Ok(Reply::Read { reg, val })
        }
        Command::Put { reg, val } => {
            desc.backend.write(cam, reg, val)?;
            log::debug!("put {:#06x}={:#04x}", reg, val);
            Ok(Reply::Written { reg, val })
        }
    }
}

fn hex_prefix(i: &str) -> IResult<&str, Option<&str>> {
    opt(alt((tag("0x"), tag("0X"))))(i)
}

fn hex_u16(i: &str) -> IResult<&str, u16> {
    map_res(preceded(hex_prefix, hex_digit1), |s| u16::from_str_radix(s, 16))(i)
}

fn hex_u8(i: &str) -> IResult<&str, u8> {
    map_res(preceded(hex_prefix, hex_digit1), |s| u8::from_str_radix(s, 16))(i)
}

fn get(i: &str) -> IResult<&str, Command> {
    map(preceded(tuple((tag("get"), space0)), hex_u16), |reg| {
        Command::Get { reg }
    })(i)
}

fn put(i: &str) -> IResult<&str, Command> {
    map(
        tuple((
            tag("put"),
            space0,
            hex_u16,
            space0,
            char('='),
            space0,
            hex_u8,
        )),
        |(_, _, reg, _, _, _, val)| Command::Put { reg, val },
    )(i)
}

fn command(i: &str) -> IResult<&str, Command> {
    alt((get, put))(i)
}
