//! Cube-sphere sampling grid: six faces split into square tiles.
//!
//! Every vertex is addressed by its point on an integer lattice over the
//! cube's surface, scaled so a face spans `[-cells, cells]`. Tiles that meet
//! along an edge, whether on one face or across a cube edge, reach the same
//! lattice point from different face frames, and the direction is computed
//! from that point alone.

use std::f64::consts::FRAC_PI_4;

use glam::{DVec3, I64Vec3};

/// The six faces of the cube, named by their outward axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CubeFace {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PosX,
        CubeFace::NegX,
        CubeFace::PosY,
        CubeFace::NegY,
        CubeFace::PosZ,
        CubeFace::NegZ,
    ];

    pub fn normal(self) -> DVec3 {
        match self {
            CubeFace::PosX => DVec3::X,
            CubeFace::NegX => DVec3::NEG_X,
            CubeFace::PosY => DVec3::Y,
            CubeFace::NegY => DVec3::NEG_Y,
            CubeFace::PosZ => DVec3::Z,
            CubeFace::NegZ => DVec3::NEG_Z,
        }
    }

    /// Direction of increasing `i` on this face.
    pub fn tangent(self) -> DVec3 {
        match self {
            CubeFace::PosX => DVec3::NEG_Z,
            CubeFace::NegX => DVec3::Z,
            CubeFace::PosY | CubeFace::NegY | CubeFace::PosZ => DVec3::X,
            CubeFace::NegZ => DVec3::NEG_X,
        }
    }

    /// Direction of increasing `j`; `tangent × bitangent = normal`.
    pub fn bitangent(self) -> DVec3 {
        match self {
            CubeFace::PosY => DVec3::NEG_Z,
            CubeFace::NegY => DVec3::Z,
            _ => DVec3::Y,
        }
    }
}

/// One tile of one face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId {
    pub face: CubeFace,
    pub x: u32,
    pub y: u32,
}

/// Address of a grid vertex: its point on the cube-surface lattice.
pub type VertexKey = I64Vec3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grid {
    resolution: u32,
    tiles_per_face: u32,
}

impl Grid {
    /// `resolution` vertices per tile edge (at least 2), `tiles_per_face`
    /// tiles per face edge (at least 1).
    pub fn new(resolution: u32, tiles_per_face: u32) -> Self {
        Self {
            resolution: resolution.max(2),
            tiles_per_face: tiles_per_face.max(1),
        }
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn tiles_per_face(&self) -> u32 {
        self.tiles_per_face
    }

    /// Grid cells along one face edge.
    fn cells(&self) -> u32 {
        self.tiles_per_face * (self.resolution - 1)
    }

    /// Every tile of every face.
    pub fn tiles(&self) -> impl Iterator<Item = TileId> + '_ {
        CubeFace::ALL.into_iter().flat_map(move |face| {
            (0..self.tiles_per_face).flat_map(move |y| {
                (0..self.tiles_per_face).map(move |x| TileId { face, x, y })
            })
        })
    }

    pub fn tile_count(&self) -> u64 {
        6 * u64::from(self.tiles_per_face).pow(2)
    }

    /// Samples taken by a full pass, counting shared edge vertices once per tile.
    pub fn sample_count(&self) -> u64 {
        self.tile_count() * u64::from(self.resolution).pow(2)
    }

    /// Lattice address of vertex `(i, j)` of `tile`.
    pub fn vertex(&self, tile: TileId, i: u32, j: u32) -> VertexKey {
        let step = self.resolution - 1;
        let cells = i64::from(self.cells());
        let along = |tile_index: u32, local: u32| {
            2 * i64::from(tile_index * step + local) - cells
        };
        let face = tile.face;
        face.normal().as_i64vec3() * cells
            + face.tangent().as_i64vec3() * along(tile.x, i)
            + face.bitangent().as_i64vec3() * along(tile.y, j)
    }

    /// Whether vertex `(i, j)` lies on its tile's border.
    pub fn is_border(&self, i: u32, j: u32) -> bool {
        let last = self.resolution - 1;
        i == 0 || j == 0 || i == last || j == last
    }

    /// Unit direction of a vertex, tangent-warped for more even spacing.
    pub fn direction(&self, key: VertexKey) -> DVec3 {
        let cells = self.cells() as f64;
        let warp = |n: i64| (n as f64 / cells * FRAC_PI_4).tan();
        DVec3::new(warp(key.x), warp(key.y), warp(key.z)).normalize()
    }
}
