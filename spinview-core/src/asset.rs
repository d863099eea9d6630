//! Model loading: STL bytes in, a ready-to-attach scene node out
use std::path::{Path, PathBuf};

use log::{debug, info};
use thiserror::Error;

use crate::config::ModelSettings;
use crate::scene::{Material, Node};
use crate::stl::{parse_stl, StlError};

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Stl(#[from] StlError),

    #[error("model '{0}' contains no triangles")]
    EmptyMesh(String),
}

/// Decode STL data into a model node with a single surface
pub fn model_from_stl(
    bytes: &[u8],
    name: &str,
    settings: &ModelSettings,
    material: Material,
) -> Result<Node, AssetError> {
    let mut mesh = parse_stl(bytes)?;
    if mesh.is_empty() {
        return Err(AssetError::EmptyMesh(name.to_string()));
    }

    if settings.recenter {
        mesh.recenter();
    }
    if let Some(size) = settings.fit_size {
        mesh.fit_to_size(size);
    }
    debug!("decoded '{}' with {} triangles", name, mesh.triangles.len());

    Ok(Node::with_surface(name, mesh, material))
}

/// Read and decode a model from disk
pub fn load_model(
    path: impl AsRef<Path>,
    settings: &ModelSettings,
    material: Material,
) -> Result<Node, AssetError> {
    let path = path.as_ref();
    info!("loading model from {}", path.display());
    let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string());
    model_from_stl(&bytes, &name, settings, material)
}

#[cfg(test)]
mod tests {
    use super::*;

    const OFFSET_TRIANGLE: &str = "solid t
facet normal 0 0 1
outer loop
vertex 10 10 0
vertex 14 10 0
vertex 10 12 0
endloop
endfacet
endsolid t
";

    #[test]
    fn test_model_is_recentered_and_fitted() {
        let node = model_from_stl(
            OFFSET_TRIANGLE.as_bytes(),
            "t",
            &ModelSettings::default(),
            Material::default(),
        )
        .unwrap();
        let bounds = node.surface.as_ref().unwrap().mesh.bounds().unwrap();
        assert!((bounds.center().x).abs() < 1e-5);
        assert!((bounds.extents().x - 2.0).abs() < 1e-5);
        assert!(node.transform.is_identity());
    }

    #[test]
    fn test_raw_geometry_kept_when_disabled() {
        let settings = ModelSettings {
            recenter: false,
            fit_size: None,
        };
        let node = model_from_stl(OFFSET_TRIANGLE.as_bytes(), "t", &settings, Material::default())
            .unwrap();
        let bounds = node.surface.unwrap().mesh.bounds().unwrap();
        assert_eq!(bounds.min.x, 10.0);
    }

    #[test]
    fn test_empty_model_rejected() {
        let err = model_from_stl(
            b"solid e\nendsolid e\n",
            "e",
            &ModelSettings::default(),
            Material::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AssetError::EmptyMesh(name) if name == "e"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_model(
            "/definitely/not/here.stl",
            &ModelSettings::default(),
            Material::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
    }
}
