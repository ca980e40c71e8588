use rand::RngCore;

/// Replays a fixed sequence of values, starting over once exhausted.
pub struct MockRng {
    values: Vec<u64>,
    position: usize,
}

impl MockRng {
    pub fn new(values: Vec<u64>) -> Self {
        assert!(!values.is_empty(), "MockRng needs at least one value");
        MockRng {
            values,
            position: 0,
        }
    }
}

impl RngCore for MockRng {
    fn next_u32(&mut self) -> u32 {
        self.next_u64() as u32
    }

    fn next_u64(&mut self) -> u64 {
        let value = self.values[self.position];
        self.position = (self.position + 1) % self.values.len();
        value
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}
