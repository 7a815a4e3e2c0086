/*!
 * Core Types
 * Common types used across the coordinator
 */

/// Byte count for memory accounting
pub type Bytes = u64;

/// Component priority (0-100, higher survives longer)
pub type Priority = u8;
