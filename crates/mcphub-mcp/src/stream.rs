//! Line readers for server output (non-UTF8-safe).
//!
//! Servers can emit non-UTF8 bytes, and `BufReader::lines()` would end the
//! reader on the first one. Lines are read as bytes and decoded lossily so
//! a bad byte only garbles that line.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Read the next line, without its `\n` / `\r\n` terminator.
///
/// Returns `Ok(None)` at EOF. `buf` is scratch space reused across calls.
pub async fn next_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    if reader.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }

    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    #[tokio::test]
    async fn test_reads_lines_and_strips_terminators() {
        let data: &[u8] = b"one\r\ntwo\nthree";
        let mut reader = BufReader::new(data);
        let mut buf = Vec::new();

        assert_eq!(next_line(&mut reader, &mut buf).await.unwrap().as_deref(), Some("one"));
        assert_eq!(next_line(&mut reader, &mut buf).await.unwrap().as_deref(), Some("two"));
        assert_eq!(
            next_line(&mut reader, &mut buf).await.unwrap().as_deref(),
            Some("three")
        );
        assert_eq!(next_line(&mut reader, &mut buf).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_replaced_not_fatal() {
        let data: &[u8] = b"ok \xff\xfe bytes\nnext\n";
        let mut reader = BufReader::new(data);
        let mut buf = Vec::new();

        let first = next_line(&mut reader, &mut buf).await.unwrap().unwrap();
        assert!(first.starts_with("ok "));
        assert!(first.contains('\u{FFFD}'));
        assert_eq!(next_line(&mut reader, &mut buf).await.unwrap().as_deref(), Some("next"));
    }
}
