//! Well-known C64 memory locations offered for quick navigation

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryLocation {
    pub name: &'static str,
    pub address: u16,
}

pub static MEMORY_LOCATIONS: [MemoryLocation; 12] = [
    MemoryLocation {
        name: "Zero page",
        address: 0x0000,
    },
    MemoryLocation {
        name: "Stack",
        address: 0x0100,
    },
    MemoryLocation {
        name: "Screen RAM",
        address: 0x0400,
    },
    MemoryLocation {
        name: "BASIC program",
        address: 0x0801,
    },
    MemoryLocation {
        name: "BASIC ROM",
        address: 0xA000,
    },
    MemoryLocation {
        name: "Free RAM",
        address: 0xC000,
    },
    MemoryLocation {
        name: "VIC-II",
        address: 0xD000,
    },
    MemoryLocation {
        name: "SID",
        address: 0xD400,
    },
    MemoryLocation {
        name: "Color RAM",
        address: 0xD800,
    },
    MemoryLocation {
        name: "CIA 1",
        address: 0xDC00,
    },
    MemoryLocation {
        name: "CIA 2",
        address: 0xDD00,
    },
    MemoryLocation {
        name: "KERNAL ROM",
        address: 0xE000,
    },
];

/// Location with the given name, case-insensitive
#[must_use]
pub fn find_location(name: &str) -> Option<&'static MemoryLocation> {
    MEMORY_LOCATIONS
        .iter()
        .find(|l| l.name.eq_ignore_ascii_case(name))
}
