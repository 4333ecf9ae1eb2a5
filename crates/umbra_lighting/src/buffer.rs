//! GPU Light Buffer
//!
//! Fixed-size light arrays for the lit shaders:
//! - Directional lights: 4
//! - Other (point and spot) lights: 64
//!
//! Arrays are allocated once; each frame only the counts are reset and the
//! first `count` entries rewritten.

use serde::{Serialize, Deserialize};

/// Maximum directional lights
pub const MAX_DIRECTIONAL_LIGHTS: usize = 4;
/// Maximum point and spot lights combined
pub const MAX_OTHER_LIGHTS: usize = 64;

/// GPU-ready directional light arrays
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuDirectionalLights {
    /// Final colors
    pub colors: [[f32; 4]; MAX_DIRECTIONAL_LIGHTS],
    /// Direction xyz, rendering layer mask bits in w
    pub directions_and_masks: [[f32; 4]; MAX_DIRECTIONAL_LIGHTS],
    /// Shadow reservation vectors
    pub shadow_data: [[f32; 4]; MAX_DIRECTIONAL_LIGHTS],
}

/// GPU-ready point and spot light arrays
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuOtherLights {
    /// Final colors
    pub colors: [[f32; 4]; MAX_OTHER_LIGHTS],
    /// Position xyz, 1 / range^2 in w
    pub positions: [[f32; 4]; MAX_OTHER_LIGHTS],
    /// Spot direction xyz (zero for point lights), layer mask bits in w
    pub directions_and_masks: [[f32; 4]; MAX_OTHER_LIGHTS],
    /// Spot angle attenuation scale and offset
    pub spot_angles: [[f32; 4]; MAX_OTHER_LIGHTS],
    /// Shadow reservation vectors
    pub shadow_data: [[f32; 4]; MAX_OTHER_LIGHTS],
}

impl Default for GpuOtherLights {
    fn default() -> Self {
        bytemuck::Zeroable::zeroed()
    }
}

/// Light counts for shader uniform
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightCounts {
    /// Number of active directional lights
    pub directional_count: i32,
    /// Number of active point and spot lights
    pub other_count: i32,
    /// Padding
    pub _pad: [i32; 2],
}

/// Light packing statistics
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightBufferStats {
    /// Lights skipped by the rendering layer mask
    pub filtered_count: u32,
    /// Lights over limit (dropped)
    pub overflow_count: u32,
}

/// CPU-side light buffer collected before GPU upload
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LightBuffer {
    /// Directional lights
    pub directional: GpuDirectionalLights,
    /// Point and spot lights
    pub other: GpuOtherLights,
    counts: LightCounts,
    stats: LightBufferStats,
}

impl LightBuffer {
    /// Create an empty light buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new frame
    ///
    /// Stale entries beyond the counts are left in place.
    pub fn clear(&mut self) {
        self.counts = LightCounts::default();
        self.stats = LightBufferStats::default();
    }

    /// Claim the next directional slot, `None` when full
    pub fn next_directional(&mut self) -> Option<usize> {
        let index = self.counts.directional_count as usize;
        if index >= MAX_DIRECTIONAL_LIGHTS {
            self.stats.overflow_count += 1;
            return None;
        }
        self.counts.directional_count += 1;
        Some(index)
    }

    /// Claim the next point or spot slot, `None` when full
    pub fn next_other(&mut self) -> Option<usize> {
        let index = self.counts.other_count as usize;
        if index >= MAX_OTHER_LIGHTS {
            self.stats.overflow_count += 1;
            return None;
        }
        self.counts.other_count += 1;
        Some(index)
    }

    /// Record a light skipped by the layer mask
    pub fn record_filtered(&mut self) {
        self.stats.filtered_count += 1;
    }

    /// Get light counts for shader
    pub fn counts(&self) -> LightCounts {
        self.counts
    }

    /// Get current statistics
    pub fn stats(&self) -> &LightBufferStats {
        &self.stats
    }

    /// Get directional lights as bytes for GPU upload
    pub fn directional_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(&self.directional)
    }

    /// Get point and spot lights as bytes for GPU upload
    pub fn other_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(&self.other)
    }

    /// Get counts as bytes for GPU upload
    pub fn counts_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(&self.counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_struct_sizes() {
        assert_eq!(std::mem::size_of::<GpuDirectionalLights>(), 3 * 4 * 16);
        assert_eq!(std::mem::size_of::<GpuOtherLights>(), 5 * 64 * 16);
        assert_eq!(std::mem::size_of::<LightCounts>(), 16);
    }

    #[test]
    fn test_directional_limit() {
        let mut buffer = LightBuffer::new();
        for i in 0..MAX_DIRECTIONAL_LIGHTS {
            assert_eq!(buffer.next_directional(), Some(i));
        }
        assert_eq!(buffer.next_directional(), None);
        assert_eq!(buffer.stats().overflow_count, 1);
        assert_eq!(buffer.counts().directional_count, 4);
    }

    #[test]
    fn test_other_limit() {
        let mut buffer = LightBuffer::new();
        for _ in 0..MAX_OTHER_LIGHTS {
            assert!(buffer.next_other().is_some());
        }
        assert_eq!(buffer.next_other(), None);
        assert_eq!(buffer.counts().other_count, 64);
    }

    #[test]
    fn test_clear_keeps_arrays() {
        let mut buffer = LightBuffer::new();
        let index = buffer.next_other().unwrap();
        buffer.other.colors[index] = [1.0, 0.5, 0.25, 1.0];
        buffer.record_filtered();

        buffer.clear();
        assert_eq!(buffer.counts(), LightCounts::default());
        assert_eq!(buffer.stats().filtered_count, 0);
        assert_eq!(buffer.other.colors[0], [1.0, 0.5, 0.25, 1.0]);
    }

    #[test]
    fn test_upload_bytes() {
        let buffer = LightBuffer::new();
        assert_eq!(buffer.directional_bytes().len(), 192);
        assert_eq!(buffer.other_bytes().len(), 5120);
        assert_eq!(buffer.counts_bytes().len(), 16);
    }
}
