//! Limits, defaults and on-disk tags

// Batch partitioning
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const MAX_CHUNK_SIZE: usize = 1000;

// Identifier limits (LMDB keys are capped at 511 bytes)
pub const MAX_COMPONENT_KEY_LEN: usize = 400;
pub const MAX_UUID_LEN: usize = 50;
pub const MAX_ROLE_LEN: usize = 64;
pub const MAX_NAME_LEN: usize = 255;

// LMDB environment
pub const DEFAULT_MAP_SIZE: usize = 1 << 30;
pub const DEFAULT_MAX_READERS: u32 = 1024;
pub const MAX_DBS: u32 = 11;

// Grant subject tags, first segment of every grant key
pub const TAG_USER: u8 = b'u';
pub const TAG_GROUP: u8 = b'g';
pub const TAG_ANYONE: u8 = b'a';

// Root enumeration checks the deadline every this many rows
pub const DEADLINE_CHECK_INTERVAL: usize = 256;
