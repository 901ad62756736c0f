use std::io::Write;

const BUFFER_SIZE: usize = 16 * 1024;

#[doc = r#"
Write-only, buffered text sink over a borrowed byte sink.

Appended characters and numbers accumulate in an internal buffer that is
written out once it reaches 16 KiB, on an explicit [`flush`](Self::flush)
or at the latest when the stream is dropped. Numbers use their canonical
decimal text form; `f64` uses the traditional stream-insertion default of
six significant digits (`3.14`, `-1.79769e+308`, `inf`, `nan`).
"#]
pub struct TextStream<'a, W: Write> {
    device: &'a mut W,
    buf: Vec<u8>,
}

impl<'a, W: Write> TextStream<'a, W> {
    /// Borrow a writable sink.
    pub fn new(device: &'a mut W) -> Self {
        Self {
            device,
            buf: Vec::with_capacity(BUFFER_SIZE),
        }
    }

    /// Write out everything buffered so far.
    pub fn flush(&mut self) -> std::io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }

        self.device.write_all(&self.buf)?;
        self.buf.clear();
        Ok(())
    }

    /// Append a single character.
    pub fn write_char(&mut self, ch: char) -> &mut Self {
        let mut utf8 = [0u8; 4];
        let encoded = ch.encode_utf8(&mut utf8);
        self.buf.extend_from_slice(encoded.as_bytes());
        self.flush_if_full();
        self
    }

    /// Append a string.
    pub fn write_str(&mut self, s: &str) -> &mut Self {
        self.write_bytes(s.as_bytes());
        self
    }

    /// Append the decimal form of a signed 32-bit integer.
    pub fn write_i32(&mut self, val: i32) -> &mut Self {
        let text = val.to_string();
        self.write_bytes(text.as_bytes());
        self
    }

    /// Append the decimal form of an unsigned 32-bit integer.
    pub fn write_u32(&mut self, val: u32) -> &mut Self {
        let text = val.to_string();
        self.write_bytes(text.as_bytes());
        self
    }

    /// Append the decimal form of a signed 64-bit integer.
    pub fn write_i64(&mut self, val: i64) -> &mut Self {
        let text = val.to_string();
        self.write_bytes(text.as_bytes());
        self
    }

    /// Append the decimal form of an unsigned 64-bit integer.
    pub fn write_u64(&mut self, val: u64) -> &mut Self {
        let text = val.to_string();
        self.write_bytes(text.as_bytes());
        self
    }

    /// Append a double in "general, 6 significant digits" form.
    pub fn write_f64(&mut self, val: f64) -> &mut Self {
        let text = format_general(val);
        self.write_bytes(text.as_bytes());
        self
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
        self.flush_if_full();
    }

    fn flush_if_full(&mut self) {
        if self.buf.len() >= BUFFER_SIZE {
            if let Err(e) = self.flush() {
                log::error!("text stream flush failed: {e}");
            }
        }
    }
}

impl<W: Write> Drop for TextStream<'_, W> {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            log::error!("text stream flush failed on drop: {e}");
            debug_assert!(false, "text stream flush failed on drop: {e}");
        }
    }
}

/// Format a double the way `printf("%g")` with six significant digits
/// does: fixed notation for exponents in [-4, 6), scientific otherwise,
/// trailing zeros trimmed, exponent sign always present with at least two
/// digits.
fn format_general(val: f64) -> String {
    if val.is_nan() {
        return "nan".to_owned();
    }
    if val.is_infinite() {
        return if val < 0.0 { "-inf" } else { "inf" }.to_owned();
    }
    if val == 0.0 {
        return if val.is_sign_negative() { "-0" } else { "0" }.to_owned();
    }

    // format scientifically first; the exponent decides the final form
    let scientific = format!("{val:.5e}");
    let (mantissa, exponent) = scientific
        .split_once('e')
        .expect("{:e} always contains an exponent");
    let exponent: i32 = exponent.parse().expect("{:e} exponent is an integer");

    if !(-4..6).contains(&exponent) {
        let mantissa = mantissa.trim_end_matches('0').trim_end_matches('.');
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{mantissa}e{sign}{:02}", exponent.abs());
    }

    let precision = (5 - exponent).max(0) as usize;
    let fixed = format!("{val:.precision$}");
    if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.').to_owned()
    } else {
        fixed
    }
}

#[cfg(test)]
mod tests {
    use super::format_general;
    use pretty_assertions::assert_eq;

    #[test]
    fn general_form_picks_fixed_or_scientific() {
        assert_eq!(format_general(3.14), "3.14");
        assert_eq!(format_general(-2.72), "-2.72");
        assert_eq!(format_general(42.0), "42");
        assert_eq!(format_general(0.0001), "0.0001");
        assert_eq!(format_general(0.00001), "1e-05");
        assert_eq!(format_general(123_456_789.0), "1.23457e+08");
        assert_eq!(format_general(f64::MAX), "1.79769e+308");
        assert_eq!(format_general(f64::MIN), "-1.79769e+308");
    }

    #[test]
    fn general_form_non_finite() {
        assert_eq!(format_general(f64::INFINITY), "inf");
        assert_eq!(format_general(f64::NEG_INFINITY), "-inf");
        assert!(format_general(f64::NAN).starts_with("nan"));
    }

    #[test]
    fn general_form_zero() {
        assert_eq!(format_general(0.0), "0");
        assert_eq!(format_general(-0.0), "-0");
    }
}
