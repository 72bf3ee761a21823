//! Subdivided icosahedron (geodesic sphere) with a wireframe edge list.

use std::collections::HashMap;

use glam::Vec3;

use super::Vertex;
use crate::params::ShapeParams;

/// Golden ratio, used for the base icosahedron corners
const PHI: f32 = 1.618_034;

#[rustfmt::skip]
const ICOSAHEDRON_CORNERS: [[f32; 3]; 12] = [
    [-1.0, PHI, 0.0], [1.0, PHI, 0.0], [-1.0, -PHI, 0.0], [1.0, -PHI, 0.0],
    [0.0, -1.0, PHI], [0.0, 1.0, PHI], [0.0, -1.0, -PHI], [0.0, 1.0, -PHI],
    [PHI, 0.0, -1.0], [PHI, 0.0, 1.0], [-PHI, 0.0, -1.0], [-PHI, 0.0, 1.0],
];

#[rustfmt::skip]
const ICOSAHEDRON_FACES: [[u32; 3]; 20] = [
    [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
    [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
    [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
    [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
];

/// Identity of a lattice point, so points on shared edges and corners merge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum LatticeKey {
    Corner(u32),
    /// Point on the edge lo-hi, `step` segments away from `lo`
    Edge { lo: u32, hi: u32, step: u32 },
    Interior { face: usize, i: u32, j: u32 },
}

/// Geodesic sphere mesh
pub struct IcosphereMesh {
    pub vertices: Vec<Vertex>,
    /// Triangle list indices (3 per face)
    pub triangles: Vec<u32>,
    /// Line list indices (2 per unique edge), drawn in wireframe mode
    pub edges: Vec<u32>,
    segments: u32,
}

impl IcosphereMesh {
    /// Build the sphere described by shape parameters
    pub fn new(params: &ShapeParams) -> Self {
        let segments = params.detail + 1;
        let corners: Vec<Vec3> = ICOSAHEDRON_CORNERS
            .iter()
            .map(|c| Vec3::from_array(*c))
            .collect();

        let mut builder = Builder {
            corners: &corners,
            segments,
            radius: params.radius,
            lookup: HashMap::new(),
            vertices: Vec::new(),
        };

        let mut triangles = Vec::with_capacity(20 * (segments * segments) as usize * 3);

        for (face, &[a, b, c]) in ICOSAHEDRON_FACES.iter().enumerate() {
            // Lattice rows run from the a-b edge (i = 0) up to corner c (i = segments)
            let mut lattice: Vec<Vec<u32>> = Vec::with_capacity(segments as usize + 1);
            for i in 0..=segments {
                let rows = segments - i;
                let row = (0..=rows)
                    .map(|j| builder.lattice_vertex(face, [a, b, c], i, j))
                    .collect();
                lattice.push(row);
            }

            for i in 0..segments as usize {
                let rows = segments as usize - i;
                for j in 0..(2 * rows - 1) {
                    let k = j / 2;
                    if j % 2 == 0 {
                        triangles.extend_from_slice(&[
                            lattice[i][k + 1],
                            lattice[i + 1][k],
                            lattice[i][k],
                        ]);
                    } else {
                        triangles.extend_from_slice(&[
                            lattice[i][k + 1],
                            lattice[i + 1][k + 1],
                            lattice[i + 1][k],
                        ]);
                    }
                }
            }
        }

        let edges = unique_edges(&triangles);

        Self {
            vertices: builder.vertices,
            triangles,
            edges,
            segments,
        }
    }

    /// Segments per base icosahedron edge (detail + 1)
    pub fn segments(&self) -> u32 {
        self.segments
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len() / 2
    }
}

struct Builder<'a> {
    corners: &'a [Vec3],
    segments: u32,
    radius: f32,
    lookup: HashMap<LatticeKey, u32>,
    vertices: Vec<Vertex>,
}

impl Builder<'_> {
    /// Index of lattice point (i, j) on a face, creating it on first use
    fn lattice_vertex(&mut self, face: usize, [a, b, c]: [u32; 3], i: u32, j: u32) -> u32 {
        let n = self.segments;
        let rows = n - i;

        let key = if i == n {
            LatticeKey::Corner(c)
        } else if j == 0 {
            edge_key(a, c, i, n)
        } else if j == rows {
            edge_key(b, c, i, n)
        } else if i == 0 {
            edge_key(a, b, j, n)
        } else {
            LatticeKey::Interior { face, i, j }
        };

        if let Some(&index) = self.lookup.get(&key) {
            return index;
        }

        let point = match key {
            LatticeKey::Corner(corner) => self.corners[corner as usize],
            LatticeKey::Edge { lo, hi, step } => self.corners[lo as usize]
                .lerp(self.corners[hi as usize], step as f32 / n as f32),
            LatticeKey::Interior { .. } => {
                let (va, vb, vc) = (
                    self.corners[a as usize],
                    self.corners[b as usize],
                    self.corners[c as usize],
                );
                let aj = va.lerp(vc, i as f32 / n as f32);
                let bj = vb.lerp(vc, i as f32 / n as f32);
                aj.lerp(bj, j as f32 / rows as f32)
            }
        };

        let normal = point.normalize();
        let index = self.vertices.len() as u32;
        self.vertices.push(Vertex {
            position: (normal * self.radius).to_array(),
            normal: normal.to_array(),
        });
        self.lookup.insert(key, index);
        index
    }
}

/// Canonical key for a point `step` segments from `from` along edge from-to
fn edge_key(from: u32, to: u32, step: u32, n: u32) -> LatticeKey {
    if step == 0 {
        return LatticeKey::Corner(from);
    }
    if from < to {
        LatticeKey::Edge {
            lo: from,
            hi: to,
            step,
        }
    } else {
        LatticeKey::Edge {
            lo: to,
            hi: from,
            step: n - step,
        }
    }
}

/// Collapse a triangle list into a line list with each edge drawn once
fn unique_edges(triangles: &[u32]) -> Vec<u32> {
    let mut seen = HashMap::with_capacity(triangles.len());
    let mut edges = Vec::with_capacity(triangles.len());

    for tri in triangles.chunks_exact(3) {
        for (p, q) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
            let key = (p.min(q), p.max(q));
            if seen.insert(key, ()).is_none() {
                edges.extend_from_slice(&[p, q]);
            }
        }
    }

    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh_with_detail(detail: u32) -> IcosphereMesh {
        IcosphereMesh::new(&ShapeParams {
            detail,
            ..Default::default()
        })
    }

    #[test]
    fn test_base_icosahedron() {
        let mesh = mesh_with_detail(0);

        assert_eq!(mesh.vertices.len(), 12);
        assert_eq!(mesh.triangle_count(), 20);
        assert_eq!(mesh.edge_count(), 30);
    }

    #[test]
    fn test_default_mesh_counts() {
        let mesh = IcosphereMesh::new(&ShapeParams::default());
        let n = mesh.segments() as usize;
        assert_eq!(n, 31);

        // Geodesic sphere: V = 10n² + 2, E = 30n², F = 20n²
        assert_eq!(mesh.vertices.len(), 10 * n * n + 2);
        assert_eq!(mesh.edge_count(), 30 * n * n);
        assert_eq!(mesh.triangle_count(), 20 * n * n);
    }

    #[test]
    fn test_euler_characteristic() {
        for detail in [1, 2, 5] {
            let mesh = mesh_with_detail(detail);
            let v = mesh.vertices.len() as i64;
            let e = mesh.edge_count() as i64;
            let f = mesh.triangle_count() as i64;
            assert_eq!(v - e + f, 2, "detail {}", detail);
        }
    }

    #[test]
    fn test_vertices_lie_on_sphere() {
        let params = ShapeParams::default();
        let mesh = IcosphereMesh::new(&params);

        for vertex in &mesh.vertices {
            let position = Vec3::from_array(vertex.position);
            let normal = Vec3::from_array(vertex.normal);

            assert!((position.length() - params.radius).abs() < 1e-4);
            assert!((normal.length() - 1.0).abs() < 1e-5);
            // Normals are radial
            assert!(position.normalize().dot(normal) > 0.9999);
        }
    }

    #[test]
    fn test_indices_in_bounds() {
        let mesh = mesh_with_detail(3);
        let count = mesh.vertices.len() as u32;

        assert!(mesh.triangles.iter().all(|&i| i < count));
        assert!(mesh.edges.iter().all(|&i| i < count));
        assert_eq!(mesh.edges.len() % 2, 0);
    }

    #[test]
    fn test_no_degenerate_edges() {
        let mesh = mesh_with_detail(4);
        for edge in mesh.edges.chunks_exact(2) {
            assert_ne!(edge[0], edge[1]);
        }
    }
}
