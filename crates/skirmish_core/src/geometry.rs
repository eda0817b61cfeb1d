//! Geometry helpers shared by every system.
//!
//! Containment tests, footprint overlap for placement, and the ring search
//! that spreads attackers around a contested target.

use rand::Rng;

use crate::components::EntityId;
use crate::math::{Fixed, Vec2Fixed};

/// Unit vectors at every multiple of π/8, starting at angle 0, as raw
/// `I32F32` bits `(cos, sin)`.
const RING_DIRECTIONS: [(i64, i64); 16] = [
    (4_294_967_296, 0),
    (3_968_032_378, 1_643_612_827),
    (3_037_000_500, 3_037_000_500),
    (1_643_612_827, 3_968_032_378),
    (0, 4_294_967_296),
    (-1_643_612_827, 3_968_032_378),
    (-3_037_000_500, 3_037_000_500),
    (-3_968_032_378, 1_643_612_827),
    (-4_294_967_296, 0),
    (-3_968_032_378, -1_643_612_827),
    (-3_037_000_500, -3_037_000_500),
    (-1_643_612_827, -3_968_032_378),
    (0, -4_294_967_296),
    (1_643_612_827, -3_968_032_378),
    (3_037_000_500, -3_037_000_500),
    (3_968_032_378, -1_643_612_827),
];

/// Extra clearance between the ring and the target's edge.
const RING_BUFFER: i32 = 10;

/// Extra clearance between a ring sample and any other unit.
const SPACING_MARGIN: i32 = 5;

/// Half-span of the fallback offset when the whole ring is taken.
const FALLBACK_JITTER: i32 = 10;

/// Position and radius of a unit, as seen by the ring search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occupant {
    /// Unit id.
    pub id: EntityId,
    /// Unit centre.
    pub position: Vec2Fixed,
    /// Collision radius.
    pub size: Fixed,
}

/// Euclidean distance between two points.
#[must_use]
pub fn distance(a: Vec2Fixed, b: Vec2Fixed) -> Fixed {
    a.distance(b)
}

/// Whether `point` lies inside (or on the edge of) an axis-aligned rectangle.
#[must_use]
pub fn point_in_rect(point: Vec2Fixed, center: Vec2Fixed, half_w: Fixed, half_h: Fixed) -> bool {
    point.x >= center.x - half_w
        && point.x <= center.x + half_w
        && point.y >= center.y - half_h
        && point.y <= center.y + half_h
}

/// Whether `point` lies within `radius` of `center`, edge included.
#[must_use]
pub fn point_in_circle(point: Vec2Fixed, center: Vec2Fixed, radius: Fixed) -> bool {
    point.distance(center) <= radius
}

/// Whether two axis-aligned rectangles overlap. Touching edges do not count.
#[must_use]
pub fn rects_overlap(
    a: Vec2Fixed,
    a_half_w: Fixed,
    a_half_h: Fixed,
    b: Vec2Fixed,
    b_half_w: Fixed,
    b_half_h: Fixed,
) -> bool {
    a.x + a_half_w > b.x - b_half_w
        && a.x - a_half_w < b.x + b_half_w
        && a.y + a_half_h > b.y - b_half_h
        && a.y - a_half_h < b.y + b_half_h
}

/// Whether a rectangle lies fully inside `[0, width] x [0, height]`.
#[must_use]
pub fn rect_within_bounds(
    center: Vec2Fixed,
    half_w: Fixed,
    half_h: Fixed,
    width: Fixed,
    height: Fixed,
) -> bool {
    center.x - half_w >= Fixed::ZERO
        && center.x + half_w <= width
        && center.y - half_h >= Fixed::ZERO
        && center.y + half_h <= height
}

/// Uniform sample in `[low, high)`. Returns `low` for an empty range.
pub fn random_fixed<R: Rng + ?Sized>(rng: &mut R, low: Fixed, high: Fixed) -> Fixed {
    if high <= low {
        return low;
    }
    Fixed::from_bits(rng.gen_range(low.to_bits()..high.to_bits()))
}

/// Random offset with each axis uniform in `[-half_span, half_span)`.
pub fn jitter<R: Rng + ?Sized>(rng: &mut R, half_span: i32) -> Vec2Fixed {
    let half = Fixed::from_num(half_span);
    let x = random_fixed(rng, -half, half);
    let y = random_fixed(rng, -half, half);
    Vec2Fixed::new(x, y)
}

/// Find an approach point for `mover` around a target.
///
/// Samples 16 points on a ring of radius `target_extent + mover_range + 10`
/// around `center`, starting at angle 0 and turning counter-clockwise in
/// steps of π/8. The first sample that keeps at least
/// `mover_size + other.size + 5` from every other occupant wins. When the
/// whole ring is taken, returns `center` plus a random offset of up to 10
/// on each axis; the caller accepts the overlap.
pub fn free_position_around<R: Rng + ?Sized>(
    center: Vec2Fixed,
    target_extent: Fixed,
    mover_id: EntityId,
    mover_size: Fixed,
    mover_range: Fixed,
    occupants: &[Occupant],
    rng: &mut R,
) -> Vec2Fixed {
    let radius = target_extent
        .saturating_add(mover_range)
        .saturating_add(Fixed::from_num(RING_BUFFER));
    let margin = Fixed::from_num(SPACING_MARGIN);

    for (cos, sin) in RING_DIRECTIONS {
        let direction = Vec2Fixed::new(Fixed::from_bits(cos), Fixed::from_bits(sin));
        let sample = center + direction.scale(radius);

        let is_free = occupants
            .iter()
            .filter(|other| other.id != mover_id)
            .all(|other| sample.distance(other.position) >= mover_size + other.size + margin);

        if is_free {
            return sample;
        }
    }

    center + jitter(rng, FALLBACK_JITTER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(1)
    }

    #[test]
    fn test_ring_directions_are_unit_length() {
        for (cos, sin) in RING_DIRECTIONS {
            let v = Vec2Fixed::new(Fixed::from_bits(cos), Fixed::from_bits(sin));
            let error = (v.length_squared() - Fixed::ONE).abs();
            assert!(error < Fixed::from_num(0.000_001), "{v:?}");
        }
    }

    #[test]
    fn test_empty_ring_picks_angle_zero() {
        let center = Vec2Fixed::from_ints(500, 500);
        let pos = free_position_around(
            center,
            Fixed::from_num(10),
            1,
            Fixed::from_num(10),
            Fixed::from_num(15),
            &[],
            &mut rng(),
        );
        // 10 + 15 + 10 to the right of the target.
        assert_eq!(pos, Vec2Fixed::from_ints(535, 500));
    }

    #[test]
    fn test_mover_itself_does_not_block_the_ring() {
        let center = Vec2Fixed::from_ints(500, 500);
        let me = Occupant {
            id: 7,
            position: Vec2Fixed::from_ints(535, 500),
            size: Fixed::from_num(10),
        };
        let pos = free_position_around(
            center,
            Fixed::from_num(10),
            7,
            Fixed::from_num(10),
            Fixed::from_num(15),
            &[me],
            &mut rng(),
        );
        assert_eq!(pos, Vec2Fixed::from_ints(535, 500));
    }

    #[test]
    fn test_occupied_sample_moves_to_next_angle() {
        let center = Vec2Fixed::from_ints(500, 500);
        let blocker = Occupant {
            id: 2,
            position: Vec2Fixed::from_ints(535, 500),
            size: Fixed::from_num(10),
        };
        let pos = free_position_around(
            center,
            Fixed::from_num(10),
            1,
            Fixed::from_num(10),
            Fixed::from_num(15),
            &[blocker],
            &mut rng(),
        );
        assert_ne!(pos, Vec2Fixed::from_ints(535, 500));
        assert!(pos.y > center.y);
        assert!(pos.distance(blocker.position) >= Fixed::from_num(25));
    }

    #[test]
    fn test_full_ring_falls_back_near_center() {
        let center = Vec2Fixed::from_ints(500, 500);
        let radius = Fixed::from_num(35);
        let occupants: Vec<Occupant> = RING_DIRECTIONS
            .iter()
            .enumerate()
            .map(|(i, &(cos, sin))| Occupant {
                id: i as EntityId + 100,
                position: center
                    + Vec2Fixed::new(Fixed::from_bits(cos), Fixed::from_bits(sin)).scale(radius),
                size: Fixed::from_num(10),
            })
            .collect();

        let pos = free_position_around(
            center,
            Fixed::from_num(10),
            1,
            Fixed::from_num(10),
            Fixed::from_num(15),
            &occupants,
            &mut rng(),
        );
        assert!((pos.x - center.x).abs() <= Fixed::from_num(10));
        assert!((pos.y - center.y).abs() <= Fixed::from_num(10));
    }

    #[test]
    fn test_touching_rects_do_not_overlap() {
        let half = Fixed::from_num(20);
        let a = Vec2Fixed::from_ints(0, 0);
        assert!(!rects_overlap(a, half, half, Vec2Fixed::from_ints(40, 0), half, half));
        assert!(rects_overlap(a, half, half, Vec2Fixed::from_ints(39, 0), half, half));
    }

    #[test]
    fn test_containment_includes_edges() {
        let center = Vec2Fixed::from_ints(100, 100);
        let half = Fixed::from_num(40);
        assert!(point_in_rect(Vec2Fixed::from_ints(140, 60), center, half, half));
        assert!(!point_in_rect(Vec2Fixed::from_ints(141, 100), center, half, half));
        assert!(point_in_circle(Vec2Fixed::from_ints(115, 100), center, Fixed::from_num(15)));
        assert!(!point_in_circle(Vec2Fixed::from_ints(116, 100), center, Fixed::from_num(15)));
    }

    #[test]
    fn test_bounds_check_uses_full_footprint() {
        let size = Fixed::from_num(4000);
        let half = Fixed::from_num(20);
        assert!(rect_within_bounds(Vec2Fixed::from_ints(20, 20), half, half, size, size));
        assert!(!rect_within_bounds(Vec2Fixed::from_ints(19, 20), half, half, size, size));
        assert!(!rect_within_bounds(Vec2Fixed::from_ints(3981, 20), half, half, size, size));
    }

    #[test]
    fn test_random_fixed_stays_in_range() {
        let mut rng = rng();
        let low = Fixed::from_num(-10);
        let high = Fixed::from_num(10);
        for _ in 0..1000 {
            let v = random_fixed(&mut rng, low, high);
            assert!(v >= low && v < high);
        }
        assert_eq!(random_fixed(&mut rng, high, low), high);
    }
}
