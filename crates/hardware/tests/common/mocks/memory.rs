use mockall::mock;
use pipesim_core::soc::{MemoryError, MemoryPort};

mock! {
    /// Memory port whose reads and writes are scripted per test.
    pub Memory {}

    impl MemoryPort for Memory {
        fn read_word(&mut self, addr: u32) -> Result<u32, MemoryError>;
        fn write_word(&mut self, addr: u32, data: u32, byte_enable: u8) -> Result<(), MemoryError>;
        fn fetch_word(&mut self, addr: u32) -> u32;
    }
}

/// Builds a mock that serves `program` from address 0 to Fetch and reads zero
/// data everywhere else.
pub fn program_memory(program: Vec<u32>) -> MockMemory {
    let mut mem = MockMemory::new();
    let _ = mem.expect_fetch_word().returning(move |addr| {
        program
            .get((addr / 4) as usize)
            .copied()
            .unwrap_or_default()
    });
    mem
}
