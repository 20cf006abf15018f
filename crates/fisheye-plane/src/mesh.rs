//! Distortion render mesh.
//!
//! A simulator renders each virtual camera as an undistorted pinhole image
//! whose frustum spans the calibrated-plane bounds, then draws this mesh to
//! bend that render into the fisheye image. The mesh is a regular
//! `cols x rows` grid over the output raster: every vertex keeps its output
//! position and gets, as texture coordinate, the location of its ray inside
//! the undistorted render. Cells touching an invalid texel are dropped, which
//! clips the mesh to the lens's usable field of view.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use fisheye_core::{scale_canvas_to_image, Intrinsics};

use crate::builder::CalibratedPlane;
use crate::error::PlaneError;
use crate::mask::MaskTexel;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeshVertex {
    /// Position in the output raster, normalized device coordinates, `y` up.
    pub position: [f32; 2],
    /// Texture coordinate into the undistorted render, origin top-left.
    /// Falls outside `[0, 1]` on dead-zone vertices.
    pub uv: [f32; 2],
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DistortionMesh {
    pub cols: usize,
    pub rows: usize,
    /// `(cols + 1) * (rows + 1)` vertices, row-major.
    pub vertices: Vec<MeshVertex>,
    /// Triangle list, two triangles per valid cell.
    pub indices: Vec<u32>,
    pub valid_cells: usize,
    // Row-major (row * cols + col).
    cell_valid: Vec<bool>,
}

impl DistortionMesh {
    /// Build a mesh for the output raster and bounds of `plane`.
    ///
    /// `intrinsics` must be the calibration `plane` was built from.
    pub fn build(
        plane: &CalibratedPlane,
        intrinsics: &Intrinsics,
        cols: usize,
        rows: usize,
    ) -> Result<Self, PlaneError> {
        if cols == 0 || rows == 0 {
            return Err(PlaneError::EmptyMeshGrid { cols, rows });
        }

        let output = plane.output_size();
        let (out_w, out_h) = (output.width as f64, output.height as f64);
        let bounds = plane.bounds;
        let stride = cols + 1;

        let mut vertices = Vec::with_capacity(stride * (rows + 1));
        let mut vertex_ok = Vec::with_capacity(stride * (rows + 1));
        for j in 0..=rows {
            let v = j as f64 / rows as f64;
            for i in 0..=cols {
                let u = i as f64 / cols as f64;
                let node = Point2::new(u * out_w, v * out_h);
                let cal = intrinsics.unproject(scale_canvas_to_image(
                    node,
                    intrinsics.resolution(),
                    output,
                ));
                let tex = [
                    (cal.x - bounds.top_left.x) / bounds.width(),
                    (cal.y - bounds.top_left.y) / bounds.height(),
                ];

                // Nodes on the far edges belong to the last texel.
                let col = (node.x.floor() as usize).min(plane.mask.width - 1);
                let row = (node.y.floor() as usize).min(plane.mask.height - 1);
                let ok = tex.iter().all(|t| t.is_finite())
                    && plane.mask.get(col, row) != Some(MaskTexel::Invalid);

                vertices.push(MeshVertex {
                    position: [(2.0 * u - 1.0) as f32, (1.0 - 2.0 * v) as f32],
                    uv: [tex[0] as f32, tex[1] as f32],
                });
                vertex_ok.push(ok);
            }
        }

        let mut cell_valid = vec![false; cols * rows];
        let mut indices = Vec::new();
        let mut valid_cells = 0usize;
        for j in 0..rows {
            for i in 0..cols {
                let i00 = j * stride + i;
                let i10 = i00 + 1;
                let i01 = i00 + stride;
                let i11 = i01 + 1;
                if ![i00, i10, i01, i11].iter().all(|&k| vertex_ok[k]) {
                    continue;
                }
                cell_valid[j * cols + i] = true;
                valid_cells += 1;
                indices.extend([i00, i01, i10, i10, i01, i11].map(|k| k as u32));
            }
        }

        if valid_cells == 0 {
            return Err(PlaneError::NoValidCells);
        }

        Ok(Self {
            cols,
            rows,
            vertices,
            indices,
            valid_cells,
            cell_valid,
        })
    }

    /// Whether cell `(col, row)` was emitted.
    pub fn is_cell_valid(&self, col: usize, row: usize) -> bool {
        if col >= self.cols || row >= self.rows {
            return false;
        }
        self.cell_valid[row * self.cols + col]
    }

    /// Vertex at grid node `(i, j)`, `i <= cols`, `j <= rows`.
    pub fn vertex(&self, i: usize, j: usize) -> Option<&MeshVertex> {
        if i > self.cols || j > self.rows {
            return None;
        }
        self.vertices.get(j * (self.cols + 1) + i)
    }
}
