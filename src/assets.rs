//! Model assets
//!
//! Uses RON (Rusty Object Notation) for human-readable model files, plus a
//! couple of builtin models for scenes that need no files at all. Asset
//! structs are float-based for readability; everything is converted to
//! fixed-point once, at load time.

use std::fs;
use std::path::Path;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::rasterizer::{Color, Face, Fixed, Model, ModelError, Vec3};

/// Error type for model asset loading
#[derive(Debug)]
pub enum AssetError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    SerializeError(ron::Error),
    /// Geometry failed validation (limits or bad indices).
    ModelError(ModelError),
}

impl From<std::io::Error> for AssetError {
    fn from(e: std::io::Error) -> Self {
        AssetError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for AssetError {
    fn from(e: ron::error::SpannedError) -> Self {
        AssetError::ParseError(e)
    }
}

impl From<ron::Error> for AssetError {
    fn from(e: ron::Error) -> Self {
        AssetError::SerializeError(e)
    }
}

impl From<ModelError> for AssetError {
    fn from(e: ModelError) -> Self {
        AssetError::ModelError(e)
    }
}

impl std::fmt::Display for AssetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetError::IoError(e) => write!(f, "IO error: {}", e),
            AssetError::ParseError(e) => write!(f, "Parse error: {}", e),
            AssetError::SerializeError(e) => write!(f, "Serialize error: {}", e),
            AssetError::ModelError(e) => write!(f, "Model error: {}", e),
        }
    }
}

impl std::error::Error for AssetError {}

/// One face in an asset file: indices, an outward unit normal, and a flat
/// color as 5-bit channels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceAsset {
    pub indices: [usize; 3],
    pub normal: [f32; 3],
    pub color: [u8; 3],
}

/// A whole model as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelAsset {
    pub name: String,
    pub verts: Vec<[f32; 3]>,
    pub faces: Vec<FaceAsset>,
}

impl ModelAsset {
    /// Convert to fixed-point and validate.
    pub fn into_model(self) -> Result<Rc<Model>, AssetError> {
        let verts = self.verts.iter().map(|&v| vec3_from(v)).collect();
        let faces = self
            .faces
            .iter()
            .map(|f| {
                Face::tri(
                    f.indices[0],
                    f.indices[1],
                    f.indices[2],
                    vec3_from(f.normal),
                    Color::rgb15(f.color[0] as u16, f.color[1] as u16, f.color[2] as u16),
                )
            })
            .collect();
        Ok(Rc::new(Model::new(verts, faces)?))
    }
}

fn vec3_from(v: [f32; 3]) -> Vec3 {
    Vec3::new(
        Fixed::from_f32(v[0]),
        Fixed::from_f32(v[1]),
        Fixed::from_f32(v[2]),
    )
}

/// Load a model from a RON file
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<Rc<Model>, AssetError> {
    let contents = fs::read_to_string(path)?;
    model_from_str(&contents)
}

/// Load a model from a RON string (for embedded models or testing)
pub fn model_from_str(s: &str) -> Result<Rc<Model>, AssetError> {
    let asset: ModelAsset = ron::from_str(s)?;
    asset.into_model()
}

/// Save a model asset to a RON file
pub fn save_model<P: AsRef<Path>>(asset: &ModelAsset, path: P) -> Result<(), AssetError> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(3)
        .indentor("  ".to_string());
    let contents = ron::ser::to_string_pretty(asset, config)?;
    fs::write(path, contents)?;
    Ok(())
}

/// Builtin cube, `side` units across, centered on the origin. Clockwise
/// winding, one flat color per side.
pub fn cube_model(side: Fixed) -> Rc<Model> {
    let h = side * Fixed::from_raw(128); // half extent
    let verts = vec![
        // front plane
        Vec3::new(-h, -h, h),
        Vec3::new(-h, h, h),
        Vec3::new(h, h, h),
        Vec3::new(h, -h, h),
        // back plane
        Vec3::new(-h, -h, -h),
        Vec3::new(-h, h, -h),
        Vec3::new(h, h, -h),
        Vec3::new(h, -h, -h),
    ];

    let x = Vec3::from_ints(1, 0, 0);
    let y = Vec3::from_ints(0, 1, 0);
    let z = Vec3::from_ints(0, 0, 1);
    let faces = vec![
        // front
        Face::tri(0, 1, 2, z, Color::CYAN),
        Face::tri(2, 3, 0, z, Color::CYAN),
        // back
        Face::tri(4, 7, 6, -z, Color::RED),
        Face::tri(6, 5, 4, -z, Color::RED),
        // right
        Face::tri(3, 2, 6, x, Color::BLUE),
        Face::tri(6, 7, 3, x, Color::BLUE),
        // left
        Face::tri(4, 5, 1, -x, Color::MAGENTA),
        Face::tri(1, 0, 4, -x, Color::MAGENTA),
        // bottom
        Face::tri(0, 3, 7, -y, Color::GREEN),
        Face::tri(7, 4, 0, -y, Color::GREEN),
        // top
        Face::tri(1, 5, 6, y, Color::YELLOW),
        Face::tri(6, 2, 1, y, Color::YELLOW),
    ];

    Rc::new(Model::new(verts, faces).expect("builtin cube geometry is valid"))
}

/// Builtin square pyramid, `side` units across the base, apex up.
pub fn pyramid_model(side: Fixed) -> Rc<Model> {
    let h = side * Fixed::from_raw(128);
    let verts = vec![
        Vec3::new(Fixed::ZERO, h, Fixed::ZERO), // apex
        Vec3::new(-h, -h, h),
        Vec3::new(h, -h, h),
        Vec3::new(h, -h, -h),
        Vec3::new(-h, -h, -h),
    ];

    // Side normals lean out by atan(1/2): (0, 1, 2) / sqrt(5) and rotations.
    let lean_y = Fixed::from_f32(0.4472);
    let lean_out = Fixed::from_f32(0.8944);
    let faces = vec![
        Face::tri(0, 2, 1, Vec3::new(Fixed::ZERO, lean_y, lean_out), Color::CYAN),
        Face::tri(0, 3, 2, Vec3::new(lean_out, lean_y, Fixed::ZERO), Color::BLUE),
        Face::tri(0, 4, 3, Vec3::new(Fixed::ZERO, lean_y, -lean_out), Color::RED),
        Face::tri(0, 1, 4, Vec3::new(-lean_out, lean_y, Fixed::ZERO), Color::MAGENTA),
        // base
        Face::tri(1, 2, 3, Vec3::from_ints(0, -1, 0), Color::GREEN),
        Face::tri(3, 4, 1, Vec3::from_ints(0, -1, 0), Color::GREEN),
    ];

    Rc::new(Model::new(verts, faces).expect("builtin pyramid geometry is valid"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_cube_shape() {
        let cube = cube_model(Fixed::from_int(2));
        assert_eq!(cube.verts().len(), 8);
        assert_eq!(cube.faces().len(), 12);
        // Half extent of a side-2 cube is one unit.
        assert_eq!(cube.verts()[0], Vec3::from_ints(-1, -1, 1));
    }

    #[test]
    fn test_builtin_pyramid_shape() {
        let pyramid = pyramid_model(Fixed::from_int(4));
        assert_eq!(pyramid.verts().len(), 5);
        assert_eq!(pyramid.faces().len(), 6);
    }

    #[test]
    fn test_ron_roundtrip() {
        let asset = ModelAsset {
            name: "tri".to_string(),
            verts: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            faces: vec![FaceAsset {
                indices: [0, 1, 2],
                normal: [0.0, 0.0, 1.0],
                color: [31, 0, 0],
            }],
        };
        let text = ron::ser::to_string_pretty(&asset, ron::ser::PrettyConfig::default()).unwrap();
        let model = model_from_str(&text).unwrap();
        assert_eq!(model.verts().len(), 3);
        assert_eq!(model.faces()[0].color, Color::RED);
    }

    #[test]
    fn test_save_and_load_file() {
        let path = std::env::temp_dir().join("pocket_engine_model_test.ron");
        let asset = ModelAsset {
            name: "tri".to_string(),
            verts: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            faces: vec![FaceAsset {
                indices: [0, 1, 2],
                normal: [0.0, 0.0, 1.0],
                color: [0, 31, 0],
            }],
        };
        save_model(&asset, &path).unwrap();
        let model = load_model(&path).unwrap();
        assert_eq!(model.verts().len(), 3);
        assert_eq!(model.faces().len(), 1);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_bad_indices_rejected() {
        let text = r#"(
            name: "broken",
            verts: [(0.0, 0.0, 0.0)],
            faces: [(indices: (0, 1, 2), normal: (0.0, 0.0, 1.0), color: (31, 31, 31))],
        )"#;
        assert!(matches!(
            model_from_str(text),
            Err(AssetError::ModelError(ModelError::IndexOutOfBounds(0, _)))
        ));
    }
}
