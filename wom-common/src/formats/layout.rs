//! Per-vertex record layout
//!
//! A WOM vertex always starts with position, normal and UV. Color, tangent and
//! binormal follow only when the mesh-level flag is set, in that fixed order.
//! Absent fields are omitted entirely, so the reader has to know the same three
//! flags to step through the vertex block.

/// Floats in the mandatory part of a vertex: position (3) + normal (3) + uv (2)
const BASE_FLOATS: usize = 3 + 3 + 2;

/// Floats added by each optional attribute (color is RGB only)
const OPTIONAL_FLOATS: usize = 3;

/// Mesh-level attribute flags that select the vertex record layout.
///
/// Field order matches the on-disk flag order: tangents, binormals, vertex color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct VertexLayout {
    pub has_tangents: bool,
    pub has_binormals: bool,
    pub has_vertex_color: bool,
}

impl VertexLayout {
    pub const fn new(has_tangents: bool, has_binormals: bool, has_vertex_color: bool) -> Self {
        Self {
            has_tangents,
            has_binormals,
            has_vertex_color,
        }
    }

    /// Flags as written to the mesh header
    pub fn to_bytes(self) -> [u8; 3] {
        [
            self.has_tangents as u8,
            self.has_binormals as u8,
            self.has_vertex_color as u8,
        ]
    }

    /// Parse the three header bytes. Any non-zero byte counts as `true`.
    pub fn from_bytes(bytes: [u8; 3]) -> Self {
        Self::new(bytes[0] != 0, bytes[1] != 0, bytes[2] != 0)
    }

    /// Number of f32 values in one vertex record
    pub fn floats_per_vertex(self) -> usize {
        let optional = [self.has_vertex_color, self.has_tangents, self.has_binormals]
            .iter()
            .filter(|&&present| present)
            .count();
        BASE_FLOATS + optional * OPTIONAL_FLOATS
    }

    /// Size of one vertex record in bytes
    pub fn stride(self) -> usize {
        self.floats_per_vertex() * std::mem::size_of::<f32>()
    }

    /// All eight flag combinations, in flag-bit order
    pub fn all() -> impl Iterator<Item = Self> {
        (0u8..8).map(|bits| Self::new(bits & 1 != 0, bits & 2 != 0, bits & 4 != 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_layout_is_eight_floats() {
        let layout = VertexLayout::default();
        assert_eq!(layout.floats_per_vertex(), 8);
        assert_eq!(layout.stride(), 32);
    }

    #[test]
    fn test_full_layout() {
        let layout = VertexLayout::new(true, true, true);
        assert_eq!(layout.floats_per_vertex(), 17);
        assert_eq!(layout.stride(), 68);
    }

    #[test]
    fn test_every_combination_has_distinct_flags() {
        let layouts: Vec<_> = VertexLayout::all().collect();
        assert_eq!(layouts.len(), 8);
        for (i, a) in layouts.iter().enumerate() {
            for b in &layouts[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_stride_grows_by_twelve_bytes_per_flag() {
        for layout in VertexLayout::all() {
            let set = [layout.has_tangents, layout.has_binormals, layout.has_vertex_color]
                .iter()
                .filter(|&&f| f)
                .count();
            assert_eq!(layout.stride(), 32 + set * 12, "layout {:?}", layout);
        }
    }

    #[test]
    fn test_header_bytes() {
        let layout = VertexLayout::new(true, false, true);
        assert_eq!(layout.to_bytes(), [1, 0, 1]);
        assert_eq!(VertexLayout::from_bytes([1, 0, 1]), layout);
        assert_eq!(VertexLayout::from_bytes([2, 0, 0]), VertexLayout::new(true, false, false));
    }
}
