//! Pure point-in-shape predicates.

/// 2-D point in chart coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Substituted for horizontal-edge denominators in the ray cast so the
/// intersection division never hits zero.
const EDGE_EPSILON: f64 = 1e-12;

/// Geometric region drawn by the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Axis-aligned rectangle; corners may be given in any order.
    Rectangle { corner_a: Point, corner_b: Point },
    Circle { center: Point, radius: f64 },
    Oval {
        center: Point,
        radius_x: f64,
        radius_y: f64,
    },
    /// Ordered vertex loop. Construction guarantees at least three vertices.
    Polygon { vertices: Vec<Point> },
}

impl Shape {
    /// Whether `p` lies inside the region. Boundaries are inclusive for the
    /// rectangle and circle; an oval with a non-positive radius contains
    /// nothing.
    ///
    /// Polygon containment is even-odd ray casting over the vertex loop,
    /// O(vertices) per point. The other shapes are O(1).
    pub fn contains(&self, p: Point) -> bool {
        match self {
            Shape::Rectangle { corner_a, corner_b } => {
                let min_x = corner_a.x.min(corner_b.x);
                let max_x = corner_a.x.max(corner_b.x);
                let min_y = corner_a.y.min(corner_b.y);
                let max_y = corner_a.y.max(corner_b.y);
                p.x >= min_x && p.x <= max_x && p.y >= min_y && p.y <= max_y
            }
            Shape::Circle { center, radius } => {
                let dx = p.x - center.x;
                let dy = p.y - center.y;
                dx * dx + dy * dy <= radius * radius
            }
            Shape::Oval {
                center,
                radius_x,
                radius_y,
            } => {
                if *radius_x <= 0.0 || *radius_y <= 0.0 {
                    return false;
                }
                let nx = (p.x - center.x) / radius_x;
                let ny = (p.y - center.y) / radius_y;
                nx * nx + ny * ny <= 1.0
            }
            Shape::Polygon { vertices } => polygon_contains(vertices, p),
        }
    }
}

fn polygon_contains(vertices: &[Point], p: Point) -> bool {
    if vertices.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let vi = vertices[i];
        let vj = vertices[j];

        if (vi.y > p.y) != (vj.y > p.y) {
            let mut dy = vj.y - vi.y;
            if dy.abs() < EDGE_EPSILON {
                dy = EDGE_EPSILON;
            }
            let x_cross = vi.x + (p.y - vi.y) * (vj.x - vi.x) / dy;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}
