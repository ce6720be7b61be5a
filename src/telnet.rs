//! Telnet command and option codes (RFC 854 and friends).
//!
//! Only what the decoder needs to recognize and skip negotiation traffic.

pub const IAC: u8 = 255;
pub const DONT: u8 = 254;
pub const DO: u8 = 253;
pub const WONT: u8 = 252;
pub const WILL: u8 = 251;
/// Sub-negotiation begin.
pub const SB: u8 = 250;
/// Sub-negotiation end.
pub const SE: u8 = 240;

pub const OPT_BINARY: u8 = 0;
pub const OPT_ECHO: u8 = 1;
pub const OPT_EXTENDED_ASCII: u8 = 17;
/// Negotiate About Window Size.
pub const OPT_NAWS: u8 = 31;

/// Returns true for commands that are followed by an option byte.
pub const fn takes_option(cmd: u8) -> bool {
    matches!(cmd, WILL | WONT | DO | DONT | SB)
}

/// Options the console acknowledges without replying.
pub const fn is_passive_option(opt: u8) -> bool {
    matches!(opt, OPT_ECHO | OPT_NAWS | OPT_EXTENDED_ASCII)
}

pub fn command_name(cmd: u8) -> &'static str {
    match cmd {
        IAC => "IAC",
        DONT => "DONT",
        DO => "DO",
        WONT => "WONT",
        WILL => "WILL",
        SB => "SB",
        SE => "SE",
        241 => "NOP",
        242 => "DM",
        243 => "BRK",
        244 => "IP",
        245 => "AO",
        246 => "AYT",
        247 => "EC",
        248 => "EL",
        249 => "GA",
        _ => "?",
    }
}

pub fn option_name(opt: u8) -> &'static str {
    match opt {
        OPT_BINARY => "BINARY",
        OPT_ECHO => "ECHO",
        OPT_EXTENDED_ASCII => "EXTENDED-ASCII",
        OPT_NAWS => "NAWS",
        _ => "?",
    }
}
