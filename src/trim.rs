/// Strips a run of `sentinel` bytes from both ends of the NUL-terminated
/// string held in `buf`, shifting the remainder to the front and
/// re-terminating it. Returns the trimmed length, or `None` when the
/// buffer carries content but no terminator within its capacity.
///
/// A buffer that is sentinel bytes all the way through trims to the empty
/// string. The operation is idempotent.
pub(crate) fn trim_in_place(buf: &mut [u8], sentinel: u8) -> Option<usize> {
    let cap = buf.len();

    // Leading run first, so end-of-string detection stays well defined
    // even when the sentinel is NUL itself.
    let mut start = 0;
    while start < cap && buf[start] == sentinel {
        start += 1;
    }
    if start == cap {
        if cap > 0 {
            buf[0] = 0;
        }
        return Some(0);
    }

    // Logical end: first NUL at or after the leading run.
    let mut end = start;
    loop {
        if end == cap {
            return None;
        }
        if buf[end] == 0 {
            break;
        }
        end += 1;
    }

    // Trailing run, never scanning below the leading trim point.
    while end > start && buf[end - 1] == sentinel {
        end -= 1;
        buf[end] = 0;
    }

    let len = end - start;
    if start > 0 {
        buf.copy_within(start..end, 0);
    }
    buf[len] = 0;
    Some(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trimmed(input: &[u8], cap: usize, sentinel: u8) -> (Vec<u8>, usize) {
        let mut buf = vec![0u8; cap];
        buf[..input.len()].copy_from_slice(input);
        let len = trim_in_place(&mut buf, sentinel).unwrap();
        (buf, len)
    }

    #[test]
    fn strips_trailing_padding() {
        let (buf, len) = trimmed(b"AT\r\x15\x15\0", 8, 0x15);
        assert_eq!(len, 3);
        assert_eq!(&buf[..len], b"AT\r");
        assert_eq!(buf[len], 0);
    }

    #[test]
    fn strips_leading_and_trailing_padding() {
        let (buf, len) = trimmed(b"\x15\x15AT\r\x15\0", 10, 0x15);
        assert_eq!(len, 3);
        assert_eq!(&buf[..len], b"AT\r");
    }

    #[test]
    fn nul_sentinel_leading_run() {
        let (buf, len) = trimmed(b"\0AAA\0\0", 7, 0);
        assert_eq!(len, 3);
        assert_eq!(&buf[..len], b"AAA");
    }

    #[test]
    fn nul_sentinel_both_ends() {
        let (buf, len) = trimmed(b"\0\0hello\0", 9, 0);
        assert_eq!(len, 5);
        assert_eq!(&buf[..len], b"hello");
    }

    #[test]
    fn all_sentinel_buffer_is_empty_string() {
        for cap in 1..12 {
            let mut buf = vec![0x15u8; cap];
            assert_eq!(trim_in_place(&mut buf, 0x15), Some(0));
            assert_eq!(buf[0], 0);
        }
    }

    #[test]
    fn all_nul_buffer_is_empty_string() {
        let mut buf = [0u8; 6];
        assert_eq!(trim_in_place(&mut buf, 0), Some(0));
    }

    #[test]
    fn no_terminator_is_rejected() {
        let mut buf = *b"ABCDEFGH";
        assert_eq!(trim_in_place(&mut buf, 0x15), None);
    }

    #[test]
    fn leading_trim_is_noop_shift_when_clean() {
        let (buf, len) = trimmed(b"ready\0", 8, 0x15);
        assert_eq!(len, 5);
        assert_eq!(&buf[..len], b"ready");
    }

    #[test]
    fn idempotent_across_sentinels_and_inputs() {
        let inputs: &[&[u8]] = &[
            b"\x15\x15AT\r\x15\x15\0",
            b"\x15\0",
            b"x\0",
            b"\0",
            b"\x15mid\x15dle\x15\0",
            b"\0\0data\0",
        ];
        for sentinel in [0u8, 0x15, b' ', 0xFF] {
            for input in inputs {
                let mut first = vec![0u8; input.len() + 4];
                first[..input.len()].copy_from_slice(input);
                let Some(len1) = trim_in_place(&mut first, sentinel) else {
                    continue;
                };
                let mut second = first.clone();
                let len2 = trim_in_place(&mut second, sentinel).unwrap();
                assert_eq!(len1, len2);
                assert_eq!(&first[..=len1], &second[..=len2]);
            }
        }
    }
}
