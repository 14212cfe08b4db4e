//! Projection backend built on top of the `proj` crate.
//!
//! Resolves any definition PROJ understands: EPSG identifiers, Proj4 strings
//! and WKT. UTM descriptors reach PROJ as the Proj4 string of their zone.

use proj::Proj;

use super::{CrsError, Projector, SourceProjection, Transform, WGS84};

/// Projector delegating to the PROJ library.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjProjector;

/// A PROJ pipeline from one source definition into WGS84.
struct ProjTransform {
    proj: Proj,
    definition: String,
}

impl Transform for ProjTransform {
    fn to_wgs84(&self, x: f64, y: f64) -> Result<(f64, f64), CrsError> {
        self.proj
            .convert((x, y))
            .map_err(|e| CrsError::transform(self.definition.clone(), e.to_string()))
    }
}

impl Projector for ProjProjector {
    fn name(&self) -> &'static str {
        "proj"
    }

    fn prepare(&self, source: &SourceProjection) -> Result<Box<dyn Transform>, CrsError> {
        let definition = source.definition();
        let proj = Proj::new_known_crs(&definition, WGS84, None)
            .map_err(|e| CrsError::transform(definition.clone(), e.to_string()))?;
        log::debug!("Prepared PROJ pipeline {} -> {}", definition, WGS84);
        Ok(Box::new(ProjTransform { proj, definition }))
    }
}
