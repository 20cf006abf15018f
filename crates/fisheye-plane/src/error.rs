/// Errors returned by the calibrated-plane builder and the render mesh.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PlaneError {
    #[error("output raster must be non-empty (got {width}x{height})")]
    EmptyRaster { width: u32, height: u32 },
    #[error("zoom must be finite and > 0 (got {0})")]
    InvalidZoom(f64),
    #[error("thresholds must satisfy 0 <= bounds ({bounds}) <= mask ({mask})")]
    InvalidThresholds { bounds: f64, mask: f64 },
    #[error("no texel round-tripped within the bounds threshold")]
    NoValidPixels,
    #[error("mesh grid must have at least 1x1 cells (got {cols}x{rows})")]
    EmptyMeshGrid { cols: usize, rows: usize },
    #[error("no mesh cell has four valid vertices")]
    NoValidCells,
}
