//! # Register access facade
//!
//! The core never touches the hardware directly. Every access goes through a [RegisterBus],
//! which allows running the core on top of memory-mapped registers ([MmioBus]), behind an
//! operating system specific access layer, or against a simulated register file in tests.
use core::ptr::NonNull;

/// 32-bit register access relative to the base address of a register block.
///
/// Accesses are assumed to be infallible. The methods take `&self` because the safety
/// validator reads registers from a different context than the configuration path.
pub trait RegisterBus {
    fn read32(&self, offset: usize) -> u32;

    fn write32(&self, offset: usize, value: u32);

    /// Read-modify-write helper.
    #[inline]
    fn modify32(&self, offset: usize, f: impl FnOnce(u32) -> u32) {
        let value = self.read32(offset);
        self.write32(offset, f(value));
    }
}

impl<B: RegisterBus + ?Sized> RegisterBus for &B {
    #[inline]
    fn read32(&self, offset: usize) -> u32 {
        (**self).read32(offset)
    }

    #[inline]
    fn write32(&self, offset: usize, value: u32) {
        (**self).write32(offset, value)
    }
}

/// Volatile access to a memory-mapped register block.
#[derive(Debug, Clone, Copy)]
pub struct MmioBus {
    base: NonNull<u8>,
}

unsafe impl Send for MmioBus {}
unsafe impl Sync for MmioBus {}

impl MmioBus {
    /// Create a register bus for the register block at the given base address.
    ///
    /// # Safety
    ///
    /// The address must be the (virtual) address of a mapped register block which stays valid
    /// for the lifetime of the bus. Multiple buses to the same block can be created, and the
    /// user must ensure that concurrent accesses do not interfere with each other.
    #[inline]
    pub const unsafe fn new_at(base_addr: usize) -> Self {
        Self {
            base: unsafe { NonNull::new_unchecked(base_addr as *mut u8) },
        }
    }

    #[inline]
    pub fn base_addr(&self) -> usize {
        self.base.as_ptr() as usize
    }

    #[inline]
    fn register(&self, offset: usize) -> *mut u32 {
        // Safety: The constructor contract guarantees that the block is mapped.
        unsafe { self.base.as_ptr().add(offset).cast::<u32>() }
    }
}

impl RegisterBus for MmioBus {
    #[inline]
    fn read32(&self, offset: usize) -> u32 {
        unsafe { core::ptr::read_volatile(self.register(offset)) }
    }

    #[inline]
    fn write32(&self, offset: usize, value: u32) {
        unsafe { core::ptr::write_volatile(self.register(offset), value) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mmio_bus_accesses_register_block() {
        let mut block = [0u32; 4];
        let bus = unsafe { MmioBus::new_at(block.as_mut_ptr() as usize) };
        bus.write32(0x8, 0xDEAD_BEEF);
        assert_eq!(bus.read32(0x8), 0xDEAD_BEEF);
        bus.modify32(0x8, |val| val & 0xFFFF);
        assert_eq!(bus.read32(0x8), 0xBEEF);
        assert_eq!(bus.read32(0x0), 0);
        assert_eq!(block[2], 0xBEEF);
    }

    #[test]
    fn reference_forwards_to_bus() {
        let mut block = [0u32; 2];
        let bus = unsafe { MmioBus::new_at(block.as_mut_ptr() as usize) };
        let by_ref = &bus;
        by_ref.write32(0x4, 7);
        assert_eq!(bus.read32(0x4), 7);
        assert_eq!(block[1], 7);
    }
}
