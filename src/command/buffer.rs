//! Fixed-capacity receive buffer
//!
//! Allocated once per client. Each payload is copied in with an explicit bound
//! of `capacity - 1` bytes and terminated, then read back within the same event.

/// Reusable bounded copy target for inbound payloads
#[derive(Debug)]
pub struct ReceiveBuffer {
    data: Box<[u8]>,
}

impl ReceiveBuffer {
    /// Create a buffer holding `capacity` bytes including the terminator
    ///
    /// Capacities below 2 are raised to 2 so at least one byte fits.
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity.max(2)].into_boxed_slice(),
        }
    }

    /// Most payload bytes kept from a single message
    pub fn limit(&self) -> usize {
        self.data.len() - 1
    }

    /// Copy at most `limit()` bytes of `payload` in, returning the kept bytes
    pub fn load(&mut self, payload: &[u8]) -> &[u8] {
        let len = payload.len().min(self.limit());
        self.data[..len].copy_from_slice(&payload[..len]);
        self.data[len] = 0;
        &self.data[..len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_payload_fits() {
        let mut buf = ReceiveBuffer::new(64);
        assert_eq!(buf.load(b"STOP"), b"STOP");
        assert_eq!(buf.limit(), 63);
    }

    #[test]
    fn test_oversized_payload_truncated() {
        let mut buf = ReceiveBuffer::new(64);
        let payload = [b'a'; 500];

        assert_eq!(buf.load(&payload), &payload[..63]);
        assert_eq!(buf.load(&payload[..64]).len(), 63);
        assert_eq!(buf.load(&payload[..63]).len(), 63);
    }

    #[test]
    fn test_reuse_does_not_leak_previous_payload() {
        let mut buf = ReceiveBuffer::new(16);
        buf.load(b"BACKWARD");
        assert_eq!(buf.load(b"UP"), b"UP");
    }

    #[test]
    fn test_minimum_capacity() {
        let mut buf = ReceiveBuffer::new(0);
        assert_eq!(buf.limit(), 1);
        assert_eq!(buf.load(b"xyz"), b"x");
        assert_eq!(buf.load(b""), b"");
    }
}
