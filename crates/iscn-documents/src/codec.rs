//! Codec tags of the ISCN document kinds.

/// ISCN kernel.
pub const KERNEL: u64 = 0x0264;
/// List of rights.
pub const RIGHTS: u64 = 0x0265;
/// List of stakeholders.
pub const STAKEHOLDERS: u64 = 0x0266;
/// Content description.
pub const CONTENT: u64 = 0x0267;
/// Person or organization.
pub const ENTITY: u64 = 0x0268;
/// One right, embedded in a rights list.
pub const RIGHT: u64 = 0x02bd;
/// One stakeholder, embedded in a stakeholders list.
pub const STAKEHOLDER: u64 = 0x02d1;
/// A period of time, embedded in a right.
pub const TIME_PERIOD: u64 = 0x033f;

/// Every tag, ascending.
pub const ALL: [u64; 8] = [
    KERNEL,
    RIGHTS,
    STAKEHOLDERS,
    CONTENT,
    ENTITY,
    RIGHT,
    STAKEHOLDER,
    TIME_PERIOD,
];
