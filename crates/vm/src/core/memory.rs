use super::constants::WORD_SIZE;

/// The [`Memory`] struct represents the memory of an EVM call context.
///
/// Memory is a zero-initialized byte buffer that only ever grows, in whole 32-byte words.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Memory {
    /// Vector storing memory data
    pub memory: Vec<u8>,
}

impl Memory {
    /// Creates a new, empty [`Memory`].
    pub fn new() -> Memory {
        Memory { memory: Vec::new() }
    }

    /// Gets the current size of the memory in bytes.
    ///
    /// ```
    /// use tandem_vm::core::memory::Memory;
    ///
    /// let memory = Memory::new();
    /// assert_eq!(memory.size(), 0);
    /// ```
    pub fn size(&self) -> usize {
        self.memory.len()
    }

    /// Grows the memory to `new_size` bytes. Never shrinks.
    ///
    /// Callers are expected to pass a word-aligned size; see [`Memory::words_for`].
    ///
    /// ```
    /// use tandem_vm::core::memory::Memory;
    ///
    /// let mut memory = Memory::new();
    /// memory.resize(64);
    /// assert_eq!(memory.size(), 64);
    /// memory.resize(32);
    /// assert_eq!(memory.size(), 64);
    /// ```
    pub fn resize(&mut self, new_size: usize) {
        if new_size > self.memory.len() {
            self.memory.resize(new_size, 0u8);
        }
    }

    /// Rounds a byte size up to a whole number of 32-byte words, in bytes.
    /// Returns `None` if the rounded size does not fit in a `u64`.
    ///
    /// ```
    /// use tandem_vm::core::memory::Memory;
    ///
    /// assert_eq!(Memory::words_for(0), Some(0));
    /// assert_eq!(Memory::words_for(1), Some(32));
    /// assert_eq!(Memory::words_for(64), Some(64));
    /// assert_eq!(Memory::words_for(u64::MAX), None);
    /// ```
    pub fn words_for(size: u64) -> Option<u64> {
        let word = WORD_SIZE;
        size.checked_add(word - 1).map(|padded| padded / word * word)
    }

    /// Writes `value` at `offset`, growing memory (word-aligned) if necessary.
    ///
    /// ```
    /// use tandem_vm::core::memory::Memory;
    ///
    /// let mut memory = Memory::new();
    /// memory.store(30, &[0xaa, 0xbb, 0xcc]);
    /// assert_eq!(memory.size(), 64);
    /// assert_eq!(memory.read(30, 3), vec![0xaa, 0xbb, 0xcc]);
    /// ```
    pub fn store(&mut self, offset: usize, value: &[u8]) {
        if value.is_empty() {
            return;
        }

        let end = offset.saturating_add(value.len());
        self.extend_to(end);
        self.memory[offset..end].copy_from_slice(value);
    }

    /// Writes exactly `size` bytes at `offset`, taking them from `data` starting at
    /// `data_offset`. Bytes past the end of `data` are written as zero.
    ///
    /// This is the copy semantics shared by CALLDATACOPY, CODECOPY, EXTCODECOPY and
    /// RETURNDATACOPY.
    ///
    /// ```
    /// use tandem_vm::core::memory::Memory;
    ///
    /// let mut memory = Memory::new();
    /// memory.store(0, &[0xff; 4]);
    /// memory.copy_from(0, &[0x01, 0x02, 0x03], 1, 4);
    /// assert_eq!(memory.read(0, 4), vec![0x02, 0x03, 0x00, 0x00]);
    /// ```
    pub fn copy_from(&mut self, offset: usize, data: &[u8], data_offset: usize, size: usize) {
        if size == 0 {
            return;
        }

        let mut chunk = vec![0u8; size];
        if data_offset < data.len() {
            let available = (data.len() - data_offset).min(size);
            chunk[..available].copy_from_slice(&data[data_offset..data_offset + available]);
        }
        self.store(offset, &chunk);
    }

    /// Copies `size` bytes within memory from `source` to `destination`. The regions may
    /// overlap.
    ///
    /// ```
    /// use tandem_vm::core::memory::Memory;
    ///
    /// let mut memory = Memory::new();
    /// memory.store(0, &[0x01, 0x02, 0x03, 0x04]);
    /// memory.copy_within(1, 0, 3);
    /// assert_eq!(memory.read(0, 4), vec![0x01, 0x01, 0x02, 0x03]);
    /// ```
    pub fn copy_within(&mut self, destination: usize, source: usize, size: usize) {
        if size == 0 {
            return;
        }

        let chunk = self.read(source, size);
        self.store(destination, &chunk);
    }

    /// Read the given number of bytes from the memory at the given offset.
    /// Bytes past the end of memory read as zero.
    ///
    /// ```
    /// use tandem_vm::core::memory::Memory;
    ///
    /// let mut memory = Memory::new();
    /// memory.store(0, &[0xff]);
    /// assert_eq!(memory.read(0, 2), vec![0xff, 0x00]);
    /// ```
    pub fn read(&self, offset: usize, size: usize) -> Vec<u8> {
        let mut value = vec![0u8; size];
        if offset < self.memory.len() {
            let available = (self.memory.len() - offset).min(size);
            value[..available].copy_from_slice(&self.memory[offset..offset + available]);
        }
        value
    }

    fn extend_to(&mut self, end: usize) {
        if end > self.memory.len() {
            let aligned = end.div_ceil(WORD_SIZE as usize).saturating_mul(WORD_SIZE as usize);
            self.memory.resize(aligned, 0u8);
        }
    }
}
