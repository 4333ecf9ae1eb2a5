//! Row-major 4x4 matrix helpers
//!
//! Matrices are stored as `m[row][col]`, matching the layout the shadow
//! shaders read. Only the handful of operations the shadow path needs live
//! here.

/// Row-major 4x4 matrix
pub type Mat4 = [[f32; 4]; 4];

/// Identity matrix
pub const IDENTITY: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Multiply two row-major matrices (`a * b`)
pub fn multiply(a: &Mat4, b: &Mat4) -> Mat4 {
    let mut result = [[0.0f32; 4]; 4];

    for row in 0..4 {
        for col in 0..4 {
            result[row][col] = a[row][0] * b[0][col]
                             + a[row][1] * b[1][col]
                             + a[row][2] * b[2][col]
                             + a[row][3] * b[3][col];
        }
    }

    result
}

/// Transform a column vector (`m * v`)
pub fn transform(m: &Mat4, v: [f32; 4]) -> [f32; 4] {
    let mut out = [0.0f32; 4];
    for (row, value) in out.iter_mut().enumerate() {
        *value = m[row][0] * v[0] + m[row][1] * v[1] + m[row][2] * v[2] + m[row][3] * v[3];
    }
    out
}

/// Extract a column as a vec4
pub fn column(m: &Mat4, index: usize) -> [f32; 4] {
    [m[0][index], m[1][index], m[2][index], m[3][index]]
}
