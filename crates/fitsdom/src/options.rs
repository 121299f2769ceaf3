//! Decode-time policy.

/// How a negative `BITPIX` enters the data size computation.
///
/// FITS uses negative `BITPIX` values for IEEE floating-point samples. The
/// element size is computed as `BITPIX / 8` without taking the absolute value,
/// which makes such entries come out with a negative size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NegativeBitpix {
    /// Keep the signed arithmetic and fail the decode with
    /// [`Error::NegativeDataSize`](crate::Error::NegativeDataSize) when the
    /// resulting size is negative.
    #[default]
    Reject,
    /// Use `|BITPIX| / 8` as the element size.
    Magnitude,
}

/// Options controlling a decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeOptions {
    pub negative_bitpix: NegativeBitpix,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the negative `BITPIX` policy.
    pub fn negative_bitpix(mut self, policy: NegativeBitpix) -> Self {
        self.negative_bitpix = policy;
        self
    }

    /// Element size in bytes for the given `BITPIX` under this policy.
    pub fn element_byte_size(&self, bitpix: i64) -> i64 {
        match self.negative_bitpix {
            NegativeBitpix::Reject => bitpix / 8,
            NegativeBitpix::Magnitude => (bitpix / 8).saturating_abs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rejects() {
        assert_eq!(DecodeOptions::default().negative_bitpix, NegativeBitpix::Reject);
    }

    #[test]
    fn literal_element_size() {
        let opts = DecodeOptions::new();
        assert_eq!(opts.element_byte_size(16), 2);
        assert_eq!(opts.element_byte_size(-32), -4);
        assert_eq!(opts.element_byte_size(-64), -8);
    }

    #[test]
    fn magnitude_element_size() {
        let opts = DecodeOptions::new().negative_bitpix(NegativeBitpix::Magnitude);
        assert_eq!(opts.element_byte_size(8), 1);
        assert_eq!(opts.element_byte_size(-32), 4);
        assert_eq!(opts.element_byte_size(-64), 8);
    }
}
