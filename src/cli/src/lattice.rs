//! A physical model of the cube: 26 cubies, each with a lattice position and
//! an integer rotation, turned layer by layer.

use std::f32::consts::FRAC_PI_2;

use cube_core::{
    Face, FaceletState, Indeterminate, Sticker, Token, extract,
    facelet::{Lattice, normal, rotate_clockwise},
};

/// Sticker colors of the solved cube, in U R F D L B order.
pub const COLOR_SCHEME: [u8; 6] = *b"WRGYOB";

/// A rotation stored as the images of the three unit axes.
type Rotation = [Lattice; 3];

const IDENTITY: Rotation = [[1, 0, 0], [0, 1, 0], [0, 0, 1]];

fn rotate(rotation: &Rotation, v: Lattice) -> Lattice {
    let mut out = [0; 3];
    for (axis, column) in rotation.iter().enumerate() {
        for i in 0..3 {
            out[i] += v[axis] * column[i];
        }
    }
    out
}

fn dot(a: Lattice, b: Lattice) -> i8 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn to_world(v: Lattice) -> [f32; 3] {
    v.map(f32::from)
}

/// Rotates `v` by `angle` radians about the unit axis `k`.
fn rotate_world(v: [f32; 3], k: [f32; 3], angle: f32) -> [f32; 3] {
    let (sin, cos) = angle.sin_cos();
    let k_dot_v = k[0] * v[0] + k[1] * v[1] + k[2] * v[2];
    let cross = [
        k[1] * v[2] - k[2] * v[1],
        k[2] * v[0] - k[0] * v[2],
        k[0] * v[1] - k[1] * v[0],
    ];
    [0, 1, 2].map(|i| v[i] * cos + cross[i] * sin + k[i] * k_dot_v * (1.0 - cos))
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Cubie {
    home: Lattice,
    rotation: Rotation,
}

impl Cubie {
    fn position(&self) -> Lattice {
        rotate(&self.rotation, self.home)
    }

    fn in_layer(&self, face: Face) -> bool {
        dot(self.position(), normal(face)) == 1
    }

    /// The faces this cubie showed when the cube was solved.
    fn home_faces(&self) -> impl Iterator<Item = Face> + '_ {
        Face::ALL
            .into_iter()
            .filter(|&face| dot(self.home, normal(face)) == 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatticeCube {
    cubies: Vec<Cubie>,
    colors: [u8; 6],
}

impl Default for LatticeCube {
    fn default() -> Self {
        Self::solved(COLOR_SCHEME)
    }
}

impl LatticeCube {
    /// A solved cube whose faces carry `colors`, in U R F D L B order.
    #[must_use]
    pub fn solved(colors: [u8; 6]) -> Self {
        let mut cubies = Vec::with_capacity(26);
        for x in -1..=1 {
            for y in -1..=1 {
                for z in -1..=1 {
                    if [x, y, z] != [0, 0, 0] {
                        cubies.push(Cubie {
                            home: [x, y, z],
                            rotation: IDENTITY,
                        });
                    }
                }
            }
        }
        Self { cubies, colors }
    }

    /// Turns the layer under `token.face`, settling every cubie on the
    /// lattice.
    pub fn apply(&mut self, token: Token) {
        for cubie in &mut self.cubies {
            if !cubie.in_layer(token.face) {
                continue;
            }
            for _ in 0..token.turn.quarter_turns() {
                cubie.rotation = cubie.rotation.map(|column| rotate_clockwise(column, token.face));
            }
        }
    }

    pub fn apply_all(&mut self, tokens: impl IntoIterator<Item = Token>) {
        for token in tokens {
            self.apply(token);
        }
    }

    /// Every visible sticker of the settled cube.
    #[must_use]
    pub fn stickers(&self) -> Vec<Sticker> {
        self.cubies
            .iter()
            .flat_map(|cubie| {
                cubie.home_faces().map(|face| Sticker {
                    symbol: self.colors[face.index()],
                    lattice: cubie.position(),
                    normal: to_world(rotate(&cubie.rotation, normal(face))),
                })
            })
            .collect()
    }

    /// Stickers as seen `fraction` of the way through `token`. Cubies keep
    /// their lattice positions until the turn settles; only the normals of
    /// the turning layer move.
    #[must_use]
    pub fn stickers_mid_turn(&self, token: Token, fraction: f32) -> Vec<Sticker> {
        let axis = to_world(normal(token.face));
        let angle = -fraction * f32::from(token.turn.quarter_turns()) * FRAC_PI_2;
        let mut stickers = Vec::with_capacity(54);
        for cubie in &self.cubies {
            let turning = cubie.in_layer(token.face);
            for face in cubie.home_faces() {
                let settled = to_world(rotate(&cubie.rotation, normal(face)));
                stickers.push(Sticker {
                    symbol: self.colors[face.index()],
                    lattice: cubie.position(),
                    normal: if turning {
                        rotate_world(settled, axis, angle)
                    } else {
                        settled
                    },
                });
            }
        }
        stickers
    }

    /// Reads the canonical state through the sticker codec.
    ///
    /// # Errors
    ///
    /// Never for a settled cube; kept fallible since the codec is.
    pub fn state(&self) -> Result<FaceletState, Indeterminate> {
        extract(&self.stickers())
    }
}

#[cfg(test)]
mod tests {
    use cube_core::Turn;

    use super::*;

    #[test]
    fn solved_cube_shows_the_color_scheme() {
        let state = LatticeCube::default().state().unwrap();
        assert_eq!(
            state.to_string(),
            "WWWWWWWWWRRRRRRRRRGGGGGGGGGYYYYYYYYYOOOOOOOOOBBBBBBBBB"
        );
    }

    #[test]
    fn four_quarter_turns_restore_the_cube() {
        for face in Face::ALL {
            let mut cube = LatticeCube::default();
            cube.apply_all([Token::new(face, Turn::Clockwise); 4]);
            assert_eq!(cube, LatticeCube::default(), "{face}");
        }
    }

    #[test]
    fn world_rotation_matches_lattice_rotation() {
        for face in Face::ALL {
            let axis = to_world(normal(face));
            for v in [[1, 0, 0], [0, 1, 0], [0, 0, 1]] {
                let turned = rotate_world(to_world(v), axis, -FRAC_PI_2);
                let expected = to_world(rotate_clockwise(v, face));
                for i in 0..3 {
                    assert!((turned[i] - expected[i]).abs() < 1e-5, "{face} {v:?}");
                }
            }
        }
    }
}
