use numpy::PyReadonlyArray2;
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::core::acceptance::{AcceptanceConfig, PatchAcceptanceGate};
use crate::core::contagion::Neighborhood;
use crate::core::geo_grid;
use crate::core::mask_metrics::SpatialMetrics;
use crate::core::reprojection::ReprojectionPlanner;
use crate::types::{BinaryMask, FexError, GeoPosition, PatchGridSpec};

fn to_py_err(e: FexError) -> PyErr {
    match e {
        FexError::InvalidFootprint(_)
        | FexError::InvalidGridSpec(_)
        | FexError::Config(_)
        | FexError::InvalidPatchName(_) => PyValueError::new_err(format!("{}", e)),
        _ => PyErr::new::<PyRuntimeError, _>(format!("{}", e)),
    }
}

fn parse_neighborhood(name: &str) -> PyResult<Neighborhood> {
    match name {
        "queen" => Ok(Neighborhood::Queen),
        "rook" => Ok(Neighborhood::Rook),
        _ => Err(PyValueError::new_err(format!("Invalid neighborhood: {}", name))),
    }
}

/// Patch cell (x, y) owning a geographic position
#[pyfunction]
#[pyo3(signature = (lat, lon, patch_size_pixels=200, pixel_resolution_deg=0.009))]
fn cell_index_of(
    lat: f64,
    lon: f64,
    patch_size_pixels: usize,
    pixel_resolution_deg: f64,
) -> PyResult<(i64, i64)> {
    let spec = PatchGridSpec::new(patch_size_pixels, pixel_resolution_deg).map_err(to_py_err)?;
    let cell = geo_grid::cell_index_of(lat, lon, &spec);
    Ok((cell.x, cell.y))
}

/// Reprojection target for a footprint given as [(lat, lon), ...]
#[pyfunction]
#[pyo3(signature = (footprint, patch_size_pixels=200, pixel_resolution_deg=0.009))]
fn plan_reprojection(
    py: Python,
    footprint: Vec<(f64, f64)>,
    patch_size_pixels: usize,
    pixel_resolution_deg: f64,
) -> PyResult<PyObject> {
    let spec = PatchGridSpec::new(patch_size_pixels, pixel_resolution_deg).map_err(to_py_err)?;
    let polygon: Vec<GeoPosition> = footprint
        .into_iter()
        .map(|(lat, lon)| GeoPosition::new(lat, lon))
        .collect();

    let target = ReprojectionPlanner::new(spec).plan(&polygon).map_err(to_py_err)?;

    let result = PyDict::new(py);
    result.set_item("width", target.width)?;
    result.set_item("height", target.height)?;
    result.set_item("northing", target.northing)?;
    result.set_item("easting", target.easting)?;
    result.set_item("cell_x", target.cell.x)?;
    result.set_item("cell_y", target.cell.y)?;
    result.set_item("name", target.name())?;
    result.set_item("geo_transform", target.geo_transform().to_gdal().to_vec())?;
    Ok(result.into())
}

/// Shape and pattern metrics of a uint8 ROI mask
#[pyfunction]
#[pyo3(signature = (mask, neighborhood="queen"))]
fn spatial_metrics(py: Python, mask: PyReadonlyArray2<u8>, neighborhood: &str) -> PyResult<PyObject> {
    let mask: BinaryMask = mask.as_array().to_owned();
    let metrics = SpatialMetrics::compute(&mask, parse_neighborhood(neighborhood)?);

    let result = PyDict::new(py);
    result.set_item("inside_count", metrics.inside_count)?;
    result.set_item("section_length_ratio", metrics.section_length_ratio)?;
    result.set_item("fractal_index", metrics.fractal_index)?;
    result.set_item("contagion_index", metrics.contagion_index)?;
    result.set_item("clumpiness", metrics.clumpiness)?;
    Ok(result.into())
}

/// Python wrapper for PatchAcceptanceGate
#[pyclass(name = "AcceptanceGate")]
struct PyAcceptanceGate {
    inner: PatchAcceptanceGate,
}

#[pymethods]
impl PyAcceptanceGate {
    #[new]
    #[pyo3(signature = (min_valid_pixel_ratio=0.2, min_clumpiness=0.0, neighborhood="queen"))]
    fn new(min_valid_pixel_ratio: f64, min_clumpiness: f64, neighborhood: &str) -> PyResult<Self> {
        let config = AcceptanceConfig {
            min_valid_pixel_ratio,
            min_clumpiness,
            neighborhood: parse_neighborhood(neighborhood)?,
        };
        let inner = PatchAcceptanceGate::new(config).map_err(to_py_err)?;
        Ok(PyAcceptanceGate { inner })
    }

    /// Evaluate one patch subset; returns a dict with the verdict and descriptors
    fn evaluate(
        &self,
        py: Python,
        required_pixel_count: usize,
        mask: PyReadonlyArray2<u8>,
    ) -> PyResult<PyObject> {
        let mask: BinaryMask = mask.as_array().to_owned();
        let verdict = self
            .inner
            .evaluate(required_pixel_count, mask.dim(), &mask)
            .map_err(to_py_err)?;

        let result = PyDict::new(py);
        result.set_item("accepted", verdict.accepted)?;
        result.set_item("reason", verdict.reason.to_string())?;
        if let Some(d) = verdict.descriptors {
            result.set_item("valid_pixel_ratio", d.valid_pixel_ratio)?;
            result.set_item("section_length_ratio", d.section_length_ratio)?;
            result.set_item("fractal_index", d.fractal_index)?;
            result.set_item("contagion_index", d.contagion_index)?;
            result.set_item("clumpiness", d.clumpiness)?;
        }
        Ok(result.into())
    }
}

#[pymodule]
fn _core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<PyAcceptanceGate>()?;

    m.add_function(wrap_pyfunction!(cell_index_of, m)?)?;
    m.add_function(wrap_pyfunction!(plan_reprojection, m)?)?;
    m.add_function(wrap_pyfunction!(spatial_metrics, m)?)?;

    Ok(())
}
