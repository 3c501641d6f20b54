//! glTF model loader.
//!
//! Decodes a .gltf/.glb file into CPU-side [`ModelData`]: triangle primitives
//! with node transforms baked into the vertices, base-color factors in the
//! vertex color, and RGBA8 base-color images. Nothing here touches the GPU, so
//! it can run on a worker thread; [`crate::Renderer::upload_model`] does the
//! upload afterwards.

use std::path::{Path, PathBuf};

use glam::{Mat3, Mat4, Vec3};

use crate::vertex::Vertex;

/// Error type for model loading.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to load glTF {path}: {source}")]
    Gltf {
        path: PathBuf,
        source: gltf::Error,
    },

    #[error("{0} has no scene to instantiate")]
    NoScene(PathBuf),

    #[error("mesh '{mesh}' primitive {primitive} has no positions")]
    MissingPositions { mesh: String, primitive: usize },

    #[error("{0} contains no triangle geometry")]
    Empty(PathBuf),
}

/// Loading progress in steps (document + buffers, each image, geometry).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadProgress {
    pub loaded: usize,
    pub total: usize,
}

impl LoadProgress {
    /// Percentage in 0..=100.
    pub fn percent(&self) -> f32 {
        if self.total == 0 {
            100.0
        } else {
            self.loaded as f32 / self.total as f32 * 100.0
        }
    }
}

/// Decoded RGBA8 image.
#[derive(Debug, Clone)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// One drawable triangle list.
#[derive(Debug, Clone)]
pub struct PrimitiveData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    /// Index into [`ModelData::images`] for the base color map.
    pub texture: Option<usize>,
}

/// A whole model ready for upload.
#[derive(Debug, Clone)]
pub struct ModelData {
    pub name: String,
    pub primitives: Vec<PrimitiveData>,
    /// Per glTF image; `None` when the image failed to decode or uses a
    /// format we do not convert (those materials fall back to white).
    pub images: Vec<Option<ImageData>>,
}

impl ModelData {
    pub fn vertex_count(&self) -> usize {
        self.primitives.iter().map(|p| p.vertices.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.primitives.iter().map(|p| p.indices.len() / 3).sum()
    }
}

/// Load a glTF/GLB file, reporting progress through `on_progress`.
pub fn load_model_data(
    path: impl AsRef<Path>,
    mut on_progress: impl FnMut(LoadProgress),
) -> Result<ModelData, AssetError> {
    let path = path.as_ref();
    let gltf_err = |source| AssetError::Gltf { path: path.to_path_buf(), source };

    let gltf::Gltf { document, blob } = gltf::Gltf::open(path).map_err(gltf_err)?;
    let base = path.parent();
    let total = document.images().len() + 2;
    let mut loaded = 0;

    let buffers = gltf::import_buffers(&document, base, blob).map_err(gltf_err)?;
    loaded += 1;
    on_progress(LoadProgress { loaded, total });

    let mut images = Vec::with_capacity(document.images().len());
    for image in document.images() {
        let decoded = match gltf::image::Data::from_source(image.source(), base, &buffers) {
            Ok(data) => to_rgba8(data),
            Err(e) => {
                log::warn!("{}: image {} failed to decode: {}", path.display(), image.index(), e);
                None
            }
        };
        images.push(decoded);
        loaded += 1;
        on_progress(LoadProgress { loaded, total });
    }

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| AssetError::NoScene(path.to_path_buf()))?;

    let mut primitives = Vec::new();
    for node in scene.nodes() {
        collect_node(&node, Mat4::IDENTITY, &buffers, &mut primitives)?;
    }
    if primitives.is_empty() {
        return Err(AssetError::Empty(path.to_path_buf()));
    }
    loaded += 1;
    on_progress(LoadProgress { loaded, total });

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string());
    Ok(ModelData { name, primitives, images })
}

/// Walk a node and its children, baking the accumulated transform.
fn collect_node(
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    out: &mut Vec<PrimitiveData>,
) -> Result<(), AssetError> {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        let mesh_name = mesh.name().unwrap_or("unnamed");
        let normal_matrix = Mat3::from_mat4(world).inverse().transpose();

        for (index, primitive) in mesh.primitives().enumerate() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::debug!("Skipping non-triangle primitive {} of mesh '{}'", index, mesh_name);
                continue;
            }
            out.push(extract_primitive(&primitive, world, normal_matrix, buffers).ok_or_else(
                || AssetError::MissingPositions { mesh: mesh_name.to_string(), primitive: index },
            )?);
        }
    }

    for child in node.children() {
        collect_node(&child, world, buffers, out)?;
    }
    Ok(())
}

fn extract_primitive(
    primitive: &gltf::Primitive,
    world: Mat4,
    normal_matrix: Mat3,
    buffers: &[gltf::buffer::Data],
) -> Option<PrimitiveData> {
    let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

    let positions: Vec<Vec3> = reader
        .read_positions()?
        .map(|p| world.transform_point3(Vec3::from(p)))
        .collect();

    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };

    let normals: Vec<Vec3> = match reader.read_normals() {
        Some(normals) => normals
            .map(|n| (normal_matrix * Vec3::from(n)).normalize_or_zero())
            .collect(),
        None => smooth_normals(&positions, &indices),
    };

    let tex_coords: Vec<[f32; 2]> = match reader.read_tex_coords(0) {
        Some(uvs) => uvs.into_f32().collect(),
        None => vec![[0.0, 0.0]; positions.len()],
    };

    let pbr = primitive.material().pbr_metallic_roughness();
    let color = pbr.base_color_factor();
    let texture = pbr.base_color_texture().map(|info| info.texture().source().index());

    let vertices = positions
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let n = normals.get(i).copied().unwrap_or(Vec3::Y);
            let uv = tex_coords.get(i).copied().unwrap_or([0.0, 0.0]);
            Vertex::with_color(p.to_array(), n.to_array(), uv, color)
        })
        .collect();

    Some(PrimitiveData { vertices, indices, texture })
}

/// Area-weighted vertex normals for meshes that ship without them.
fn smooth_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    normals
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y))
        .collect()
}

/// Convert any 8/16-bit glTF image to tightly packed RGBA8.
fn to_rgba8(data: gltf::image::Data) -> Option<ImageData> {
    use gltf::image::Format;
    use image::{DynamicImage, ImageBuffer};

    let (width, height) = (data.width, data.height);
    let wide = |bytes: &[u8]| -> Vec<u16> {
        bytes
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect()
    };

    let image = match data.format {
        Format::R8G8B8A8 => {
            return Some(ImageData { width, height, rgba: data.pixels });
        }
        Format::R8G8B8 => DynamicImage::ImageRgb8(ImageBuffer::from_raw(width, height, data.pixels)?),
        Format::R8G8 => DynamicImage::ImageLumaA8(ImageBuffer::from_raw(width, height, data.pixels)?),
        Format::R8 => DynamicImage::ImageLuma8(ImageBuffer::from_raw(width, height, data.pixels)?),
        Format::R16 => DynamicImage::ImageLuma16(ImageBuffer::from_raw(width, height, wide(&data.pixels))?),
        Format::R16G16 => {
            DynamicImage::ImageLumaA16(ImageBuffer::from_raw(width, height, wide(&data.pixels))?)
        }
        Format::R16G16B16 => {
            DynamicImage::ImageRgb16(ImageBuffer::from_raw(width, height, wide(&data.pixels))?)
        }
        Format::R16G16B16A16 => {
            DynamicImage::ImageRgba16(ImageBuffer::from_raw(width, height, wide(&data.pixels))?)
        }
        other => {
            log::warn!("Unsupported glTF image format {:?}, using white", other);
            return None;
        }
    };
    Some(ImageData { width, height, rgba: image.to_rgba8().into_raw() })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One triangle (0,0,0) (1,0,0) (0,1,0) with u16 indices, embedded as a
    /// data URI, under a node translated by +5 on Z.
    const TRIANGLE_GLTF: &str = r#"{
  "asset": { "version": "2.0" },
  "scene": 0,
  "scenes": [ { "nodes": [0] } ],
  "nodes": [ { "mesh": 0, "translation": [0.0, 0.0, 5.0] } ],
  "meshes": [ { "name": "tri", "primitives": [ { "attributes": { "POSITION": 1 }, "indices": 0 } ] } ],
  "buffers": [ { "byteLength": 44, "uri": "data:application/octet-stream;base64,AAABAAIAAAAAAAAAAAAAAAAAAAAAAIA/AAAAAAAAAAAAAAAAAACAPwAAAAA=" } ],
  "bufferViews": [
    { "buffer": 0, "byteOffset": 0, "byteLength": 6, "target": 34963 },
    { "buffer": 0, "byteOffset": 8, "byteLength": 36, "target": 34962 }
  ],
  "accessors": [
    { "bufferView": 0, "componentType": 5123, "count": 3, "type": "SCALAR" },
    { "bufferView": 1, "componentType": 5126, "count": 3, "type": "VEC3", "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] }
  ]
}"#;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("falcon-gltf-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn loads_triangle_with_baked_node_transform() {
        let path = write_temp("triangle.gltf", TRIANGLE_GLTF);
        let mut reports = Vec::new();
        let model = load_model_data(&path, |p| reports.push(p)).unwrap();

        assert_eq!(model.name, "triangle");
        assert_eq!(model.primitives.len(), 1);
        assert_eq!(model.vertex_count(), 3);
        assert_eq!(model.triangle_count(), 1);
        assert_eq!(model.primitives[0].indices, vec![0, 1, 2]);
        assert_eq!(model.primitives[0].vertices[1].position, [1.0, 0.0, 5.0]);
        // No normals in the file: generated from the winding (+Z).
        assert_eq!(model.primitives[0].vertices[0].normal, [0.0, 0.0, 1.0]);
        assert_eq!(model.primitives[0].texture, None);

        assert!(model.primitives[0].vertices.iter().all(|v| v.position[2] == 5.0));

        assert_eq!(reports.last().map(|p| p.percent()), Some(100.0));
        assert!(reports.windows(2).all(|w| w[0].loaded < w[1].loaded));
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = load_model_data("/definitely/not/here/scene.gltf", |_| {});
        assert!(matches!(result, Err(AssetError::Gltf { .. })));
    }

    #[test]
    fn scene_without_meshes_is_empty() {
        let path = write_temp(
            "empty.gltf",
            r#"{ "asset": { "version": "2.0" }, "scene": 0, "scenes": [ { "nodes": [0] } ], "nodes": [ {} ] }"#,
        );
        assert!(matches!(load_model_data(&path, |_| {}), Err(AssetError::Empty(_))));
    }

    #[test]
    fn rgb_images_gain_opaque_alpha() {
        let data = gltf::image::Data {
            pixels: vec![10, 20, 30],
            format: gltf::image::Format::R8G8B8,
            width: 1,
            height: 1,
        };
        let image = to_rgba8(data).unwrap();
        assert_eq!(image.rgba, vec![10, 20, 30, 255]);
    }

    #[test]
    fn progress_percent() {
        assert_eq!(LoadProgress { loaded: 1, total: 4 }.percent(), 25.0);
        assert_eq!(LoadProgress { loaded: 0, total: 0 }.percent(), 100.0);
    }
}
