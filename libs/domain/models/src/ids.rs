// [libs/domain/models/src/ids.rs]
//! Stable identifiers. Glyph ids are monotonic and never reused (§3,
//! §9's "object-graph ownership" note) — every reference to a glyph outside
//! the arena is by id, resolved through `arena.get(id) -> Option<&Glyph>`.

/// A glyph's stable identity within one engine's arena.
pub type GlyphId = u64;
