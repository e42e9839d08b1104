use crate::modules::error::code::ErrorCode;
use crate::modules::error::MailerResult;
use crate::raise_error;

/// Envelope addresses end up on a single command line, so CR and LF would
/// let a caller inject extra SMTP commands.
pub fn validate_line(value: &str) -> MailerResult<()> {
    if value.contains(['\r', '\n']) {
        return Err(raise_error!(
            format!(
                "smtp: a line must not contain CR or LF: '{}'",
                value.escape_debug()
            ),
            ErrorCode::InvalidParameter
        ));
    }
    Ok(())
}

/// Rewrites bare LF as CRLF, leaving existing CRLF pairs untouched.
pub fn normalize_line_endings(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() + text.len() / 32);
    let mut previous = 0u8;
    for &byte in text.as_bytes() {
        if byte == b'\n' && previous != b'\r' {
            out.push(b'\r');
        }
        out.push(byte);
        previous = byte;
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rejects_cr_and_lf() {
        assert!(validate_line("admin@localhost").is_ok());
        for value in ["a@b\r\nRCPT TO:<c@d>", "a@b\n", "\ra@b"] {
            assert_eq!(
                validate_line(value).unwrap_err().code(),
                ErrorCode::InvalidParameter
            );
        }
    }

    #[test]
    fn normalizes_bare_lf() {
        assert_eq!(
            normalize_line_endings("Subject: hi\n\nbody\r\nend\n"),
            b"Subject: hi\r\n\r\nbody\r\nend\r\n".to_vec()
        );
        assert_eq!(normalize_line_endings(""), Vec::<u8>::new());
    }
}
